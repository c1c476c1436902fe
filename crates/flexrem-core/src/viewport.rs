#![forbid(unsafe_code)]

//! Viewport scale and device-pixel-ratio resolution.
//!
//! A page either declares its own zoom through
//! `<meta name="viewport" content="initial-scale=...">`, in which case the DPR
//! follows from that scale, or leaves it to us, in which case the DPR is
//! derived from the platform and the reported device pixel ratio and a
//! declaration is synthesized from it.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::units::{format_js_number, parse_float_prefix};

static INITIAL_SCALE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"initial-scale=([\d.]+)").ok());

/// Zoom scale and DPR chosen for the page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportConfig {
    pub scale: f64,
    pub dpr: u32,
}

/// Outcome of [`ViewportConfig::resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportResolution {
    pub config: ViewportConfig,
    /// Where the values came from.
    pub source: ViewportSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportSource {
    /// Taken from an existing declaration's `initial-scale`.
    Declared,
    /// Derived from the platform; an existing declaration had no usable scale.
    DerivedKeepingDeclaration,
    /// Derived from the platform; no declaration existed and one must be inserted.
    DerivedNeedsDeclaration,
}

impl ViewportResolution {
    /// Whether the host must insert a synthesized viewport declaration.
    #[must_use]
    pub const fn needs_declaration(&self) -> bool {
        matches!(self.source, ViewportSource::DerivedNeedsDeclaration)
    }
}

/// Extract a usable `initial-scale` from viewport `content`.
///
/// Returns `None` when the key is absent or its value is not a finite,
/// strictly positive number.
#[must_use]
pub fn parse_initial_scale(content: &str) -> Option<f64> {
    let re = INITIAL_SCALE.as_ref()?;
    let raw = re.captures(content)?.get(1)?.as_str();
    let scale = parse_float_prefix(raw);
    if scale.is_finite() && scale > 0.0 {
        Some(scale)
    } else {
        tracing::warn!(
            target: "flexrem.viewport",
            raw,
            "ignoring unusable initial-scale"
        );
        None
    }
}

/// Whether a platform string (`navigator.appVersion`) identifies an iPhone.
#[must_use]
pub fn is_iphone(platform: &str) -> bool {
    platform.to_ascii_lowercase().contains("iphone")
}

/// Pick a DPR for pages that do not declare a scale.
///
/// Only iPhones get a DPR above 1; other devices (Android, iPad, desktop)
/// render at scale 1.
#[must_use]
pub fn derive_dpr(platform: &str, device_pixel_ratio: f64) -> u32 {
    if !is_iphone(platform) {
        return 1;
    }
    if device_pixel_ratio >= 3.0 {
        3
    } else if device_pixel_ratio >= 2.0 {
        2
    } else {
        1
    }
}

fn dpr_for_scale(scale: f64) -> u32 {
    (1.0 / scale).round().clamp(1.0, f64::from(u32::MAX)) as u32
}

impl ViewportConfig {
    /// Config for a given DPR, with `scale = 1 / dpr`.
    #[must_use]
    pub fn from_dpr(dpr: u32) -> Self {
        let dpr = dpr.max(1);
        Self {
            scale: 1.0 / f64::from(dpr),
            dpr,
        }
    }

    /// Resolve scale and DPR from the page's current state.
    ///
    /// `existing` is the content of an existing viewport declaration (empty if
    /// the element has no `content`), or `None` when no declaration exists.
    #[must_use]
    pub fn resolve(
        existing: Option<&str>,
        device_pixel_ratio: f64,
        platform: &str,
    ) -> ViewportResolution {
        if let Some(content) = existing {
            tracing::info!(
                target: "flexrem.viewport",
                content,
                "viewport already declared, deriving scale from it"
            );
            if let Some(scale) = parse_initial_scale(content) {
                return ViewportResolution {
                    config: Self {
                        scale,
                        dpr: dpr_for_scale(scale),
                    },
                    source: ViewportSource::Declared,
                };
            }
        }

        let config = Self::from_dpr(derive_dpr(platform, device_pixel_ratio));
        let source = if existing.is_some() {
            ViewportSource::DerivedKeepingDeclaration
        } else {
            ViewportSource::DerivedNeedsDeclaration
        };
        ViewportResolution { config, source }
    }

    /// Content of the synthesized viewport declaration.
    #[must_use]
    pub fn meta_content(&self) -> String {
        let s = format_js_number(self.scale);
        format!("initial-scale={s}, maximum-scale={s}, minimum-scale={s}, user-scalable=no")
    }
}
