#![forbid(unsafe_code)]

//! The boundary between the scaler and the page it runs in.
//!
//! The scaler never touches a DOM directly. Everything it reads (viewport
//! declaration, device pixel ratio, platform, document width) and everything
//! it writes (root font size, `data-dpr`, synthesized declaration, body font
//! size, published globals) goes through [`ViewportHost`].

use crate::error::HostError;

/// Values published to the host's observable namespaces.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleMetrics {
    pub dpr: u32,
    pub scale: f64,
    /// Current base unit in pixels.
    pub rem: f64,
}

pub trait ViewportHost {
    /// Content of the existing `meta[name="viewport"]` element.
    ///
    /// `None` when no such element exists. An element without a `content`
    /// attribute reports `Some("")`.
    fn viewport_meta_content(&self) -> Option<String>;

    /// Device pixel ratio reported by the runtime.
    fn device_pixel_ratio(&self) -> f64;

    /// Platform identification string (`navigator.appVersion`).
    fn platform(&self) -> String;

    /// Current width of the root element's bounding box, in pixels.
    fn document_width(&self) -> f64;

    /// Set `data-dpr` on the root element.
    fn set_root_dpr_attribute(&mut self, dpr: u32) -> Result<(), HostError>;

    /// Append a `meta[name="viewport"]` element with `content` to the head.
    fn insert_viewport_meta(&mut self, content: &str) -> Result<(), HostError>;

    /// Set the root element's inline font size, in pixels.
    fn set_root_font_size(&mut self, px: f64) -> Result<(), HostError>;

    /// Set the body's inline font size, in pixels.
    fn set_body_font_size(&mut self, px: f64) -> Result<(), HostError>;

    /// Publish the current metrics on the host's global namespaces.
    ///
    /// Hosts without globals keep the default no-op.
    fn publish(&mut self, metrics: &ScaleMetrics) -> Result<(), HostError> {
        let _ = metrics;
        Ok(())
    }
}
