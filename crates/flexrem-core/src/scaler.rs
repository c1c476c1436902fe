#![forbid(unsafe_code)]

//! The viewport scaler state object.
//!
//! [`ViewportScaler`] owns everything that used to live in page globals: the
//! resolved [`ViewportConfig`], the latest [`LayoutState`] and the debounce
//! slot. Conversion helpers borrow it and read the live base unit, so they
//! stay correct after every recomputation.
//!
//! # Lifecycle
//!
//! 1. [`ViewportScaler::init`] resolves scale and DPR, writes `data-dpr`,
//!    inserts a viewport declaration when the page has none, then computes and
//!    publishes the first base unit. The declaration is always committed
//!    before the width is sampled.
//! 2. [`ViewportScaler::dom_ready`] sets the body font size once the body
//!    exists.
//! 3. [`ViewportScaler::handle`] feeds resize/pageshow triggers into the
//!    debouncer; [`ViewportScaler::advance`] or [`ViewportScaler::fire`] runs
//!    the recomputation once it comes due.

use core::time::Duration;

use crate::config::ScalerConfig;
use crate::debounce::{Debouncer, PendingTask, Scheduled, Trigger};
use crate::error::Result;
use crate::host::{ScaleMetrics, ViewportHost};
use crate::layout::LayoutState;
use crate::units::{self, UnitInput, UnitOutput};
use crate::viewport::{ViewportConfig, ViewportSource};

#[derive(Debug)]
pub struct ViewportScaler<H> {
    host: H,
    config: ScalerConfig,
    viewport: ViewportConfig,
    source: ViewportSource,
    layout: LayoutState,
    debouncer: Debouncer,
    recomputes: u64,
    body_font_applied: bool,
}

impl<H: ViewportHost> ViewportScaler<H> {
    /// Initialize against `host` and perform the first computation.
    pub fn init(mut host: H, config: ScalerConfig) -> Result<Self> {
        let config = config.validated()?;
        let existing = host.viewport_meta_content();
        let resolution = ViewportConfig::resolve(
            existing.as_deref(),
            host.device_pixel_ratio(),
            &host.platform(),
        );
        let viewport = resolution.config;

        host.set_root_dpr_attribute(viewport.dpr)?;
        if resolution.needs_declaration() {
            let content = viewport.meta_content();
            tracing::debug!(
                target: "flexrem.scaler",
                content = %content,
                "inserting viewport declaration"
            );
            host.insert_viewport_meta(&content)?;
        }

        // Width is sampled only after the declaration is in place.
        let layout = LayoutState::compute(host.document_width(), viewport.dpr, &config);
        let debouncer = Debouncer::new(config.debounce());
        let mut scaler = Self {
            host,
            config,
            viewport,
            source: resolution.source,
            layout,
            debouncer,
            recomputes: 0,
            body_font_applied: false,
        };
        scaler.apply_layout(layout)?;
        Ok(scaler)
    }

    /// Recompute the base unit from the current document width and publish it.
    pub fn refresh_rem(&mut self) -> Result<LayoutState> {
        let layout = LayoutState::compute(
            self.host.document_width(),
            self.viewport.dpr,
            &self.config,
        );
        self.apply_layout(layout)?;
        Ok(layout)
    }

    fn apply_layout(&mut self, layout: LayoutState) -> Result<()> {
        self.layout = layout;
        self.recomputes += 1;
        tracing::debug!(
            target: "flexrem.scaler",
            document_width = layout.document_width_px,
            effective_width = layout.effective_width_px,
            base_px = layout.base_px,
            clamped = layout.clamped,
            "base unit recomputed"
        );
        self.host.set_root_font_size(layout.base_px)?;
        if self.config.publish_globals {
            let metrics = self.metrics();
            self.host.publish(&metrics)?;
        }
        Ok(())
    }

    /// Feed a trigger into the debouncer.
    ///
    /// Returns the newly armed task, or `None` when the trigger does not
    /// request a recomputation (a fresh page load).
    pub fn handle(&mut self, trigger: Trigger, now: Duration) -> Option<Scheduled> {
        if !trigger.requests_recompute() {
            tracing::debug!(
                target: "flexrem.scaler",
                trigger = trigger.label(),
                "trigger ignored"
            );
            return None;
        }
        let scheduled = self.debouncer.schedule(now);
        tracing::debug!(
            target: "flexrem.scaler",
            trigger = trigger.label(),
            generation = scheduled.task.generation,
            cancelled = scheduled.cancelled.map(|task| task.generation),
            "recompute scheduled"
        );
        Some(scheduled)
    }

    /// Run the pending recomputation if it is due at `now`.
    pub fn advance(&mut self, now: Duration) -> Result<bool> {
        match self.debouncer.poll(now) {
            Some(_) => self.refresh_rem().map(|_| true),
            None => Ok(false),
        }
    }

    /// Run the pending recomputation if it is still `generation`.
    pub fn fire(&mut self, generation: u64) -> Result<bool> {
        match self.debouncer.fire(generation) {
            Some(_) => self.refresh_rem().map(|_| true),
            None => Ok(false),
        }
    }

    /// Run whatever recomputation is pending, ignoring its deadline.
    ///
    /// For hosts whose own timer is the authority on when the quiet period
    /// has elapsed.
    pub fn fire_pending(&mut self) -> Result<bool> {
        match self.debouncer.pending() {
            Some(task) => self.fire(task.generation),
            None => Ok(false),
        }
    }

    /// Drop the pending recomputation, if any.
    pub fn cancel_pending(&mut self) -> Option<PendingTask> {
        let cancelled = self.debouncer.cancel();
        if let Some(task) = cancelled {
            tracing::debug!(
                target: "flexrem.scaler",
                generation = task.generation,
                "recompute cancelled"
            );
        }
        cancelled
    }

    /// Apply the body font size. Safe to call more than once.
    pub fn dom_ready(&mut self) -> Result<()> {
        if self.body_font_applied {
            return Ok(());
        }
        self.host.set_body_font_size(self.body_font_px())?;
        self.body_font_applied = true;
        Ok(())
    }
}

impl<H> ViewportScaler<H> {
    #[must_use]
    pub const fn viewport(&self) -> ViewportConfig {
        self.viewport
    }

    #[must_use]
    pub const fn viewport_source(&self) -> ViewportSource {
        self.source
    }

    #[must_use]
    pub const fn dpr(&self) -> u32 {
        self.viewport.dpr
    }

    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.viewport.scale
    }

    /// Current base unit in pixels.
    #[must_use]
    pub const fn rem(&self) -> f64 {
        self.layout.base_px
    }

    #[must_use]
    pub const fn layout(&self) -> LayoutState {
        self.layout
    }

    #[must_use]
    pub const fn config(&self) -> &ScalerConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics(&self) -> ScaleMetrics {
        ScaleMetrics {
            dpr: self.viewport.dpr,
            scale: self.viewport.scale,
            rem: self.layout.base_px,
        }
    }

    /// Body font size applied at DOM-ready.
    #[must_use]
    pub fn body_font_px(&self) -> f64 {
        self.config.body_font_px * f64::from(self.viewport.dpr)
    }

    #[must_use]
    pub const fn pending(&self) -> Option<PendingTask> {
        self.debouncer.pending()
    }

    /// Number of base-unit computations so far, including the initial one.
    #[must_use]
    pub const fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    #[must_use]
    pub const fn is_dom_ready(&self) -> bool {
        self.body_font_applied
    }

    /// Convert rem to px against the live base unit.
    #[must_use]
    pub fn rem_to_px<'a>(&self, value: impl Into<UnitInput<'a>>) -> UnitOutput {
        units::rem_to_px(value, self.rem())
    }

    /// Convert px to rem against the live base unit.
    #[must_use]
    pub fn px_to_rem<'a>(&self, value: impl Into<UnitInput<'a>>) -> UnitOutput {
        units::px_to_rem(value, self.rem())
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlexError;
    use crate::memory_host::{HostOp, MemoryHost};
    use pretty_assertions::assert_eq;

    const IPHONE: &str = "5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn init_on_plain_host_synthesizes_scale_one() {
        let scaler = ViewportScaler::init(MemoryHost::new(375.0), ScalerConfig::default()).unwrap();
        assert_eq!(scaler.dpr(), 1);
        assert_eq!(scaler.scale(), 1.0);
        assert_eq!(scaler.rem(), 37.5);
        assert_eq!(scaler.recompute_count(), 1);
        assert_eq!(scaler.viewport_source(), ViewportSource::DerivedNeedsDeclaration);
    }

    #[test]
    fn init_writes_in_order() {
        let host = MemoryHost::new(375.0)
            .with_platform(IPHONE)
            .with_device_pixel_ratio(2.0);
        let scaler = ViewportScaler::init(host, ScalerConfig::default()).unwrap();
        assert_eq!(
            scaler.host().ops(),
            &[
                HostOp::SetDprAttribute(2),
                HostOp::InsertViewportMeta(
                    "initial-scale=0.5, maximum-scale=0.5, minimum-scale=0.5, user-scalable=no"
                        .into()
                ),
                HostOp::SetRootFontSize(75.0),
                HostOp::Publish(ScaleMetrics {
                    dpr: 2,
                    scale: 0.5,
                    rem: 75.0,
                }),
            ]
        );
    }

    #[test]
    fn tiny_declared_scale_uses_full_dpr() {
        // 1/512: the document is 512 device pixels per CSS pixel.
        let host = MemoryHost::new(375.0).with_viewport_meta("initial-scale=0.001953125");
        let scaler = ViewportScaler::init(host, ScalerConfig::default()).unwrap();
        assert_eq!(scaler.dpr(), 512);
        assert_eq!(scaler.layout().document_width_px, 192_000.0);
        assert!(!scaler.layout().clamped);
        assert_eq!(scaler.rem(), 19_200.0);
    }

    #[test]
    fn existing_declaration_is_not_replaced() {
        let host = MemoryHost::new(375.0).with_viewport_meta("initial-scale=0.5");
        let scaler = ViewportScaler::init(host, ScalerConfig::default()).unwrap();
        assert_eq!(scaler.dpr(), 2);
        assert_eq!(scaler.viewport_source(), ViewportSource::Declared);
        assert!(
            !scaler
                .host()
                .ops()
                .iter()
                .any(|op| matches!(op, HostOp::InsertViewportMeta(_)))
        );
        assert_eq!(scaler.rem(), 75.0);
    }

    #[test]
    fn publishing_can_be_disabled() {
        let config = ScalerConfig {
            publish_globals: false,
            ..ScalerConfig::default()
        };
        let scaler = ViewportScaler::init(MemoryHost::new(375.0), config).unwrap();
        assert_eq!(scaler.host().published(), None);
        assert_eq!(scaler.host().root_font_size(), Some(37.5));
    }

    #[test]
    fn init_rejects_invalid_config() {
        let config = ScalerConfig {
            max_css_width: -1.0,
            ..ScalerConfig::default()
        };
        let err = ViewportScaler::init(MemoryHost::new(375.0), config).unwrap_err();
        assert!(matches!(err, FlexError::InvalidConfig(_)));
    }

    #[test]
    fn refresh_samples_width_fresh() {
        let mut scaler =
            ViewportScaler::init(MemoryHost::new(375.0), ScalerConfig::default()).unwrap();
        scaler.host_mut().set_device_width(414.0);
        let layout = scaler.refresh_rem().unwrap();
        assert_eq!(layout.base_px, 41.4);
        assert_eq!(scaler.host().root_font_size(), Some(41.4));
        // Wider than the cap, then narrow again: the cap never sticks.
        scaler.host_mut().set_device_width(1024.0);
        assert_eq!(scaler.refresh_rem().unwrap().base_px, 54.0);
        scaler.host_mut().set_device_width(320.0);
        assert_eq!(scaler.refresh_rem().unwrap().base_px, 32.0);
    }

    #[test]
    fn conversions_track_live_base() {
        let mut scaler =
            ViewportScaler::init(MemoryHost::new(375.0), ScalerConfig::default()).unwrap();
        assert_eq!(scaler.rem_to_px("2rem"), UnitOutput::Text("75px".into()));
        scaler.host_mut().set_device_width(320.0);
        scaler.refresh_rem().unwrap();
        assert_eq!(scaler.rem_to_px("2rem"), UnitOutput::Text("64px".into()));
        assert_eq!(scaler.px_to_rem(64.0), UnitOutput::Number(2.0));
    }

    #[test]
    fn fresh_pageshow_is_ignored() {
        let mut scaler =
            ViewportScaler::init(MemoryHost::new(375.0), ScalerConfig::default()).unwrap();
        assert_eq!(
            scaler.handle(Trigger::PageShow { persisted: false }, ms(0)),
            None
        );
        assert_eq!(scaler.pending(), None);
    }

    #[test]
    fn fire_pending_runs_without_deadline() {
        let mut scaler =
            ViewportScaler::init(MemoryHost::new(375.0), ScalerConfig::default()).unwrap();
        assert!(!scaler.fire_pending().unwrap());
        scaler.handle(Trigger::Resize, ms(0));
        assert!(scaler.fire_pending().unwrap());
        assert_eq!(scaler.recompute_count(), 2);
        assert!(!scaler.fire_pending().unwrap());
    }

    #[test]
    fn cancel_pending_prevents_recompute() {
        let mut scaler =
            ViewportScaler::init(MemoryHost::new(375.0), ScalerConfig::default()).unwrap();
        scaler.handle(Trigger::Resize, ms(0));
        assert!(scaler.cancel_pending().is_some());
        assert!(!scaler.advance(ms(1_000)).unwrap());
        assert_eq!(scaler.recompute_count(), 1);
    }

    #[test]
    fn dom_ready_sets_body_font_once() {
        let host = MemoryHost::new(375.0)
            .with_platform(IPHONE)
            .with_device_pixel_ratio(3.0);
        let mut scaler = ViewportScaler::init(host, ScalerConfig::default()).unwrap();
        scaler.dom_ready().unwrap();
        scaler.dom_ready().unwrap();
        assert_eq!(scaler.host().body_font_size(), Some(36.0));
        let body_writes = scaler
            .host()
            .ops()
            .iter()
            .filter(|op| matches!(op, HostOp::SetBodyFontSize(_)))
            .count();
        assert_eq!(body_writes, 1);
    }

    #[test]
    fn dom_ready_without_body_can_retry() {
        let host = MemoryHost::new(375.0).without_body();
        let mut scaler = ViewportScaler::init(host, ScalerConfig::default()).unwrap();
        assert!(scaler.dom_ready().is_err());
        assert!(!scaler.is_dom_ready());
        scaler.host_mut().attach_body();
        scaler.dom_ready().unwrap();
        assert_eq!(scaler.host().body_font_size(), Some(12.0));
    }
}
