#![forbid(unsafe_code)]

//! Tunable parameters for [`ViewportScaler`](crate::scaler::ViewportScaler).
//!
//! Every field defaults to the classic flexible-layout constants, so
//! `ScalerConfig::default()` caps the design viewport at 540 CSS pixels,
//! splits it into ten base units, waits 300 ms after the last resize and sets
//! the body font to `12 * dpr` pixels.
//!
//! # Loading
//!
//! With the `config` feature the same struct can be read from JSON or TOML.
//! Missing keys fall back to their defaults.
//!
//! ```toml
//! max_css_width = 750.0
//! debounce_ms = 150
//! publish_globals = false
//! ```
//!
//! ```rust,ignore
//! let config = ScalerConfig::from_toml_file("flexrem.toml")?;
//! let config = ScalerConfig::from_json_str(r#"{"units_per_viewport": 7.5}"#)?;
//! ```

use core::time::Duration;

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{FlexError, Result};

/// Widest design viewport, in CSS pixels, before the base unit stops growing.
pub const DEFAULT_MAX_CSS_WIDTH: f64 = 540.0;
/// Number of base units that span the (capped) viewport width.
pub const DEFAULT_UNITS_PER_VIEWPORT: f64 = 10.0;
/// Quiet period after the last trigger before recomputing.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
/// Body font size per DPR unit, in pixels.
pub const DEFAULT_BODY_FONT_PX: f64 = 12.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ScalerConfig {
    /// Design viewport cap in CSS pixels.
    pub max_css_width: f64,

    /// Base units spanning the viewport width.
    pub units_per_viewport: f64,

    /// Debounce quiet period in milliseconds. Zero recomputes on the next poll.
    pub debounce_ms: u64,

    /// Body font size per DPR unit, in pixels.
    pub body_font_px: f64,

    /// Publish `dpr`/`rem` on the host's global namespaces.
    pub publish_globals: bool,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            max_css_width: DEFAULT_MAX_CSS_WIDTH,
            units_per_viewport: DEFAULT_UNITS_PER_VIEWPORT,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            body_font_px: DEFAULT_BODY_FONT_PX,
            publish_globals: true,
        }
    }
}

impl ScalerConfig {
    /// Debounce quiet period as a [`Duration`].
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of violations; empty means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (name, value) in [
            ("max_css_width", self.max_css_width),
            ("units_per_viewport", self.units_per_viewport),
            ("body_font_px", self.body_font_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("{name} must be finite and > 0, got {value}"));
            }
        }
        errors
    }

    /// Return `self` if valid, otherwise [`FlexError::InvalidConfig`].
    pub fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(FlexError::InvalidConfig(errors))
        }
    }

    /// Load from a JSON string and validate.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    /// Load from a TOML string and validate.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    /// Load from a TOML file on disk and validate.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}
