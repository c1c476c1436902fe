#![no_main]

use flexrem_core::units::{format_js_number, parse_float_prefix, px_to_rem, rem_to_px};
use flexrem_core::UnitOutput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let value = parse_float_prefix(text);
    if value.is_finite() {
        // Formatting and re-parsing a finite value must be lossless.
        let formatted = format_js_number(value);
        assert_eq!(parse_float_prefix(&formatted), value, "{formatted}");
    }

    let px = rem_to_px(text, 37.5);
    assert_eq!(px.is_text(), text.ends_with("rem"));
    if let UnitOutput::Text(t) = &px {
        assert!(t.ends_with("px"));
    }

    let rem = px_to_rem(text, 37.5);
    assert_eq!(rem.is_text(), text.ends_with("px"));
});
