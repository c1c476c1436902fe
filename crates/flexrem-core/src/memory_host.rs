#![forbid(unsafe_code)]

//! In-memory [`ViewportHost`] for native embedders and tests.
//!
//! Models just enough of a mobile browser to make ordering observable: the
//! layout width reported by [`MemoryHost::document_width`] is the device
//! width in CSS pixels divided by the zoom scale of the current viewport
//! declaration. Inserting a declaration with `initial-scale=0.5` therefore
//! doubles the width, exactly as a real layout viewport would.

use crate::error::HostError;
use crate::host::{ScaleMetrics, ViewportHost};
use crate::viewport::parse_initial_scale;

/// One recorded host write.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    SetDprAttribute(u32),
    InsertViewportMeta(String),
    SetRootFontSize(f64),
    SetBodyFontSize(f64),
    Publish(ScaleMetrics),
}

#[derive(Debug, Clone)]
pub struct MemoryHost {
    device_width_css: f64,
    device_pixel_ratio: f64,
    platform: String,
    viewport_meta: Option<String>,
    has_body: bool,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    /// A desktop-like host `device_width_css` pixels wide, DPR 1, no viewport
    /// declaration.
    #[must_use]
    pub fn new(device_width_css: f64) -> Self {
        Self {
            device_width_css,
            device_pixel_ratio: 1.0,
            platform: String::from("5.0 (X11; Linux x86_64)"),
            viewport_meta: None,
            has_body: true,
            ops: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Start with an existing viewport declaration.
    #[must_use]
    pub fn with_viewport_meta(mut self, content: impl Into<String>) -> Self {
        self.viewport_meta = Some(content.into());
        self
    }

    /// Simulate a document whose body has not been parsed.
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.has_body = false;
        self
    }

    /// Change the device width, e.g. to simulate a rotation.
    pub fn set_device_width(&mut self, device_width_css: f64) {
        self.device_width_css = device_width_css;
    }

    /// Attach the body.
    pub fn attach_body(&mut self) {
        self.has_body = true;
    }

    /// Zoom scale of the current declaration, 1 when there is none.
    #[must_use]
    pub fn current_scale(&self) -> f64 {
        self.viewport_meta
            .as_deref()
            .and_then(parse_initial_scale)
            .unwrap_or(1.0)
    }

    #[must_use]
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    #[must_use]
    pub fn viewport_meta(&self) -> Option<&str> {
        self.viewport_meta.as_deref()
    }

    /// Last root font size written.
    #[must_use]
    pub fn root_font_size(&self) -> Option<f64> {
        self.ops.iter().rev().find_map(|op| match op {
            HostOp::SetRootFontSize(px) => Some(*px),
            _ => None,
        })
    }

    /// Last `data-dpr` written.
    #[must_use]
    pub fn data_dpr(&self) -> Option<u32> {
        self.ops.iter().rev().find_map(|op| match op {
            HostOp::SetDprAttribute(dpr) => Some(*dpr),
            _ => None,
        })
    }

    /// Last body font size written.
    #[must_use]
    pub fn body_font_size(&self) -> Option<f64> {
        self.ops.iter().rev().find_map(|op| match op {
            HostOp::SetBodyFontSize(px) => Some(*px),
            _ => None,
        })
    }

    /// Last metrics published.
    #[must_use]
    pub fn published(&self) -> Option<ScaleMetrics> {
        self.ops.iter().rev().find_map(|op| match op {
            HostOp::Publish(metrics) => Some(*metrics),
            _ => None,
        })
    }

    /// Number of root font size writes, i.e. recomputations observed.
    #[must_use]
    pub fn root_font_writes(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, HostOp::SetRootFontSize(_)))
            .count()
    }
}

impl ViewportHost for MemoryHost {
    fn viewport_meta_content(&self) -> Option<String> {
        self.viewport_meta.clone()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn platform(&self) -> String {
        self.platform.clone()
    }

    fn document_width(&self) -> f64 {
        self.device_width_css / self.current_scale()
    }

    fn set_root_dpr_attribute(&mut self, dpr: u32) -> Result<(), HostError> {
        self.ops.push(HostOp::SetDprAttribute(dpr));
        Ok(())
    }

    fn insert_viewport_meta(&mut self, content: &str) -> Result<(), HostError> {
        self.viewport_meta = Some(content.to_owned());
        self.ops.push(HostOp::InsertViewportMeta(content.to_owned()));
        Ok(())
    }

    fn set_root_font_size(&mut self, px: f64) -> Result<(), HostError> {
        self.ops.push(HostOp::SetRootFontSize(px));
        Ok(())
    }

    fn set_body_font_size(&mut self, px: f64) -> Result<(), HostError> {
        if !self.has_body {
            return Err(HostError::MissingNode("body"));
        }
        self.ops.push(HostOp::SetBodyFontSize(px));
        Ok(())
    }

    fn publish(&mut self, metrics: &ScaleMetrics) -> Result<(), HostError> {
        self.ops.push(HostOp::Publish(*metrics));
        Ok(())
    }
}
