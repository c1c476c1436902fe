#![forbid(unsafe_code)]

//! WASM binding for `flexrem-core`.
//!
//! [`FlexibleRem`] is exported to JavaScript via `wasm-bindgen`. Creating one
//! initializes the page (viewport declaration, `data-dpr`, root font size),
//! subscribes to `resize`, `pageshow` and `DOMContentLoaded`, and publishes
//! `dpr`/`rem` on `window` and `window.lib.flexible` together with the
//! `refreshRem`, `rem2px` and `px2rem` helpers.
//!
//! ```js
//! import init, { FlexibleRem } from "./flexrem_web.js";
//! await init();
//! const flexible = new FlexibleRem();
//! flexible.rem2px("2rem"); // "75px" on a 375px-wide phone
//! ```
//!
//! Only compiled on `wasm32` targets; the platform-independent logic and its
//! tests live in `flexrem-core`.

#[cfg(target_arch = "wasm32")]
mod console;
#[cfg(target_arch = "wasm32")]
pub mod dom_host;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom_host::DomHost;
#[cfg(target_arch = "wasm32")]
pub use wasm::FlexibleRem;

pub use flexrem_core::{ScalerConfig, ScaleMetrics, ViewportConfig};
