#![forbid(unsafe_code)]

//! Conversion between rem and px lengths.
//!
//! Inputs are either bare numbers or strings. Strings are read with
//! leading-numeric-prefix semantics (the same rules as ECMAScript
//! `parseFloat`), so `"12px"` reads as `12` and `"abc"` reads as NaN rather
//! than failing. A string that carries the source unit suffix produces a
//! string carrying the target unit; everything else produces a bare number.
//!
//! ```
//! use flexrem_core::units::{px_to_rem, rem_to_px, UnitOutput};
//!
//! assert_eq!(rem_to_px("2rem", 37.5), UnitOutput::Text("75px".into()));
//! assert_eq!(rem_to_px(2.0, 37.5), UnitOutput::Number(75.0));
//! assert_eq!(px_to_rem("75px", 37.5), UnitOutput::Text("2rem".into()));
//! ```

use core::fmt;

pub const REM_SUFFIX: &str = "rem";
pub const PX_SUFFIX: &str = "px";

/// A length handed to a conversion helper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitInput<'a> {
    Number(f64),
    Text(&'a str),
}

impl UnitInput<'_> {
    /// Numeric value with leading-prefix parsing for text.
    #[must_use]
    pub fn numeric_value(self) -> f64 {
        match self {
            Self::Number(value) => value,
            Self::Text(text) => parse_float_prefix(text),
        }
    }

    fn is_text_with_suffix(self, suffix: &str) -> bool {
        matches!(self, Self::Text(text) if text.ends_with(suffix))
    }
}

impl From<f64> for UnitInput<'_> {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for UnitInput<'_> {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for UnitInput<'_> {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl<'a> From<&'a str> for UnitInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for UnitInput<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value.as_str())
    }
}

/// Result of a conversion: a bare number, or a unit-suffixed string.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutput {
    Number(f64),
    Text(String),
}

impl UnitOutput {
    /// Numeric part of the result.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Text(text) => parse_float_prefix(text),
        }
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl fmt::Display for UnitOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => f.write_str(&format_js_number(*value)),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Convert a rem length to pixels against `base_px`.
#[must_use]
pub fn rem_to_px<'a>(value: impl Into<UnitInput<'a>>, base_px: f64) -> UnitOutput {
    let input = value.into();
    let px = input.numeric_value() * base_px;
    if input.is_text_with_suffix(REM_SUFFIX) {
        UnitOutput::Text(format!("{}{PX_SUFFIX}", format_js_number(px)))
    } else {
        UnitOutput::Number(px)
    }
}

/// Convert a pixel length to rem against `base_px`.
#[must_use]
pub fn px_to_rem<'a>(value: impl Into<UnitInput<'a>>, base_px: f64) -> UnitOutput {
    let input = value.into();
    let rem = input.numeric_value() / base_px;
    if input.is_text_with_suffix(PX_SUFFIX) {
        UnitOutput::Text(format!("{}{REM_SUFFIX}", format_js_number(rem)))
    } else {
        UnitOutput::Number(rem)
    }
}

/// Render a pixel length as a CSS value, e.g. `37.5px`.
#[must_use]
pub fn css_px(value: f64) -> String {
    format!("{}{PX_SUFFIX}", format_js_number(value))
}

/// ECMAScript `WhiteSpace` and `LineTerminator`: Unicode `White_Space` minus
/// NEL (U+0085), plus the byte-order mark.
fn is_js_whitespace(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{FEFF}'
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Parse the longest decimal-literal prefix of `text`, like `parseFloat`.
///
/// Leading whitespace is skipped. Returns NaN when no numeric prefix exists.
#[must_use]
pub fn parse_float_prefix(text: &str) -> f64 {
    let trimmed = text.trim_start_matches(is_js_whitespace);
    let bytes = trimmed.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if trimmed[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    trimmed[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Format a number the way ECMAScript `Number.prototype.toString` does.
#[must_use]
pub fn format_js_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if value == 0.0 {
        // Covers -0 as well.
        return "0".to_owned();
    }
    if (1e-6..1e21).contains(&value.abs()) {
        return format!("{value}");
    }
    let formatted = format!("{value:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_float_prefix_reads_leading_number() {
        assert_eq!(parse_float_prefix("12px"), 12.0);
        assert_eq!(parse_float_prefix("  -3.5rem"), -3.5);
        assert_eq!(parse_float_prefix("+.25"), 0.25);
        assert_eq!(parse_float_prefix("5."), 5.0);
        assert_eq!(parse_float_prefix("1e3px"), 1000.0);
        assert_eq!(parse_float_prefix("2E-2"), 0.02);
        assert_eq!(parse_float_prefix("0.5.1"), 0.5);
    }

    #[test]
    fn parse_float_prefix_ignores_dangling_exponent() {
        assert_eq!(parse_float_prefix("3e"), 3.0);
        assert_eq!(parse_float_prefix("3e+"), 3.0);
        assert_eq!(parse_float_prefix("3em"), 3.0);
    }

    #[test]
    fn parse_float_prefix_infinity() {
        assert_eq!(parse_float_prefix("Infinitypx"), f64::INFINITY);
        assert_eq!(parse_float_prefix("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float_prefix("inf").is_nan());
    }

    #[test]
    fn parse_float_prefix_without_digits_is_nan() {
        for text in ["", "px", ".", "-", "+.", "abc12", "\u{FEFF}"] {
            assert!(parse_float_prefix(text).is_nan(), "{text:?}");
        }
        assert_eq!(parse_float_prefix("\u{FEFF}\t7"), 7.0);
    }

    #[test]
    fn parse_float_prefix_does_not_skip_next_line() {
        assert!(parse_float_prefix("\u{85}5").is_nan());
        assert_eq!(parse_float_prefix("\u{A0}\u{2028}\u{3000}5"), 5.0);
    }

    #[test]
    fn format_js_number_matches_ecmascript() {
        assert_eq!(format_js_number(37.5), "37.5");
        assert_eq!(format_js_number(75.0), "75");
        assert_eq!(format_js_number(-0.0), "0");
        assert_eq!(format_js_number(1.0 / 3.0), "0.3333333333333333");
        assert_eq!(format_js_number(0.000001), "0.000001");
        assert_eq!(format_js_number(1.5e-7), "1.5e-7");
        assert_eq!(format_js_number(1e21), "1e+21");
        assert_eq!(format_js_number(f64::NAN), "NaN");
        assert_eq!(format_js_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn rem_suffix_yields_px_string() {
        assert_eq!(rem_to_px("2rem", 37.5), UnitOutput::Text("75px".into()));
        assert_eq!(rem_to_px("1.5rem", 54.0), UnitOutput::Text("81px".into()));
    }

    #[test]
    fn numbers_and_unsuffixed_strings_yield_numbers() {
        assert_eq!(rem_to_px(2.0, 37.5), UnitOutput::Number(75.0));
        assert_eq!(rem_to_px(2, 37.5), UnitOutput::Number(75.0));
        assert_eq!(rem_to_px("2", 37.5), UnitOutput::Number(75.0));
        assert_eq!(rem_to_px("2px", 37.5), UnitOutput::Number(75.0));
        assert_eq!(px_to_rem("2rem", 50.0), UnitOutput::Number(0.04));
    }

    #[test]
    fn px_suffix_yields_rem_string() {
        assert_eq!(px_to_rem("75px", 37.5), UnitOutput::Text("2rem".into()));
        assert_eq!(px_to_rem(75.0, 37.5), UnitOutput::Number(2.0));
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        assert_eq!(rem_to_px("2REM", 10.0), UnitOutput::Number(20.0));
        assert_eq!(px_to_rem("20PX", 10.0), UnitOutput::Number(2.0));
    }

    #[test]
    fn non_numeric_input_propagates_nan() {
        assert!(rem_to_px("abc", 37.5).as_f64().is_nan());
        assert_eq!(rem_to_px("remrem", 37.5), UnitOutput::Text("NaNpx".into()));
        assert_eq!(px_to_rem("px", 37.5), UnitOutput::Text("NaNrem".into()));
    }

    #[test]
    fn display_renders_like_js() {
        assert_eq!(UnitOutput::Number(75.0).to_string(), "75");
        assert_eq!(UnitOutput::Text("75px".into()).to_string(), "75px");
        assert_eq!(css_px(37.5), "37.5px");
    }
}
