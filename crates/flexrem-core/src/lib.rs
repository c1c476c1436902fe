#![forbid(unsafe_code)]

//! `flexrem-core` computes a viewport-dependent base font size (the "rem
//! unit") for mobile web pages.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment implements
//!   [`host::ViewportHost`]; the core never touches a DOM.
//! - **Deterministic time**: the debouncer runs on host-supplied monotonic
//!   time, so bursts of resize events can be replayed exactly in tests.
//! - **No globals**: [`scaler::ViewportScaler`] is an explicit state object;
//!   publishing to page globals is one of its outputs, not its storage.
//!
//! ```
//! use flexrem_core::{MemoryHost, ScalerConfig, Trigger, ViewportScaler};
//! use std::time::Duration;
//!
//! let host = MemoryHost::new(375.0);
//! let mut scaler = ViewportScaler::init(host, ScalerConfig::default())?;
//! assert_eq!(scaler.rem(), 37.5);
//!
//! scaler.host_mut().set_device_width(414.0);
//! scaler.handle(Trigger::Resize, Duration::ZERO);
//! assert!(scaler.advance(Duration::from_millis(300))?);
//! assert_eq!(scaler.rem(), 41.4);
//! # Ok::<(), flexrem_core::FlexError>(())
//! ```

pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod host;
pub mod layout;
pub mod memory_host;
pub mod scaler;
pub mod units;
pub mod viewport;

pub use clock::DeterministicClock;
pub use config::ScalerConfig;
pub use debounce::{Debouncer, PendingTask, Scheduled, Trigger};
pub use error::{FlexError, HostError, Result};
pub use host::{ScaleMetrics, ViewportHost};
pub use layout::LayoutState;
pub use memory_host::{HostOp, MemoryHost};
pub use scaler::ViewportScaler;
pub use units::{UnitInput, UnitOutput};
pub use viewport::{ViewportConfig, ViewportResolution, ViewportSource};
