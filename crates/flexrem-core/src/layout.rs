#![forbid(unsafe_code)]

//! Base-unit computation from the document width.

use crate::config::ScalerConfig;

/// Result of one base-unit computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutState {
    /// Document width as sampled from the host.
    pub document_width_px: f64,
    /// Width after capping at `max_css_width * dpr`.
    pub effective_width_px: f64,
    /// The base unit ("rem") in pixels.
    pub base_px: f64,
    /// Whether the cap was applied.
    pub clamped: bool,
}

impl LayoutState {
    /// Compute the base unit for a document `width` at `dpr`.
    ///
    /// The effective width is capped so that it never spans more than
    /// `max_css_width` CSS pixels; the base unit is that width divided into
    /// `units_per_viewport` parts.
    #[must_use]
    pub fn compute(document_width_px: f64, dpr: u32, config: &ScalerConfig) -> Self {
        let dpr = f64::from(dpr.max(1));
        let clamped = document_width_px / dpr > config.max_css_width;
        let effective_width_px = if clamped {
            config.max_css_width * dpr
        } else {
            document_width_px
        };
        Self {
            document_width_px,
            effective_width_px,
            base_px: effective_width_px / config.units_per_viewport,
            clamped,
        }
    }
}
