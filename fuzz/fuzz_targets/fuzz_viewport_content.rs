#![no_main]

use flexrem_core::viewport::parse_initial_scale;
use flexrem_core::{MemoryHost, ScalerConfig, ViewportConfig, ViewportScaler};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let ratio = f64::from(data[0] % 4);
    let Ok(content) = std::str::from_utf8(&data[1..]) else {
        return;
    };

    if let Some(scale) = parse_initial_scale(content) {
        assert!(scale.is_finite() && scale > 0.0);
    }

    let res = ViewportConfig::resolve(Some(content), ratio, "iPhone");
    assert!(res.config.dpr >= 1);
    assert!(!res.needs_declaration());

    let host = MemoryHost::new(375.0).with_viewport_meta(content);
    let scaler = ViewportScaler::init(host, ScalerConfig::default())
        .expect("memory host never rejects writes");
    assert!(scaler.rem() >= 0.0 || scaler.rem().is_nan());
});
