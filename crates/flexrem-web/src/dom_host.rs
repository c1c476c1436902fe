//! [`ViewportHost`] over the live browser DOM.

use flexrem_core::units::css_px;
use flexrem_core::{HostError, ScaleMetrics, ViewportHost};
use js_sys::{Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, Window};

/// Global holding the library namespace (`window.lib`).
pub const LIB_NAMESPACE: &str = "lib";
/// Library object inside [`LIB_NAMESPACE`] (`window.lib.flexible`).
pub const FLEXIBLE_NAMESPACE: &str = "flexible";

fn rejected(operation: &'static str) -> impl FnOnce(JsValue) -> HostError {
    move |err| HostError::rejected(operation, err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

pub(crate) fn set_js(obj: &JsValue, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(obj, &JsValue::from_str(key), value).map(|_| ())
}

/// Get `parent[key]`, creating an empty object if it is missing.
///
/// Any existing object or function is reused as the namespace.
fn namespace(parent: &JsValue, key: &str) -> Result<Object, JsValue> {
    let existing = Reflect::get(parent, &JsValue::from_str(key))?;
    if existing.is_object() || existing.is_function() {
        return Ok(existing.unchecked_into());
    }
    let created = Object::new();
    set_js(parent, key, &created)?;
    Ok(created)
}

/// `window.lib.flexible`, created on demand.
pub(crate) fn flexible_namespace(window: &Window) -> Result<Object, JsValue> {
    let lib = namespace(window, LIB_NAMESPACE)?;
    namespace(&lib, FLEXIBLE_NAMESPACE)
}

pub struct DomHost {
    window: Window,
    document: Document,
    root: HtmlElement,
}

impl DomHost {
    pub fn new(window: Window) -> Result<Self, HostError> {
        let document = window.document().ok_or(HostError::MissingNode("document"))?;
        let root = document
            .document_element()
            .ok_or(HostError::MissingNode("documentElement"))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| HostError::MissingNode("documentElement"))?;
        Ok(Self {
            window,
            document,
            root,
        })
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl ViewportHost for DomHost {
    fn viewport_meta_content(&self) -> Option<String> {
        let meta = self
            .document
            .query_selector("meta[name=\"viewport\"]")
            .ok()
            .flatten()?;
        Some(meta.get_attribute("content").unwrap_or_default())
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn platform(&self) -> String {
        self.window.navigator().app_version().unwrap_or_default()
    }

    fn document_width(&self) -> f64 {
        self.root.get_bounding_client_rect().width()
    }

    fn set_root_dpr_attribute(&mut self, dpr: u32) -> Result<(), HostError> {
        self.root
            .set_attribute("data-dpr", &dpr.to_string())
            .map_err(rejected("set data-dpr"))
    }

    fn insert_viewport_meta(&mut self, content: &str) -> Result<(), HostError> {
        let head = self.document.head().ok_or(HostError::MissingNode("head"))?;
        let meta = self
            .document
            .create_element("meta")
            .map_err(rejected("create meta"))?;
        meta.set_attribute("name", "viewport")
            .map_err(rejected("set meta name"))?;
        meta.set_attribute("content", content)
            .map_err(rejected("set meta content"))?;
        head.append_child(&meta)
            .map_err(rejected("append meta"))?;
        Ok(())
    }

    fn set_root_font_size(&mut self, px: f64) -> Result<(), HostError> {
        self.root
            .style()
            .set_property("font-size", &css_px(px))
            .map_err(rejected("set root font-size"))
    }

    fn set_body_font_size(&mut self, px: f64) -> Result<(), HostError> {
        let body = self.document.body().ok_or(HostError::MissingNode("body"))?;
        body.style()
            .set_property("font-size", &css_px(px))
            .map_err(rejected("set body font-size"))
    }

    fn publish(&mut self, metrics: &ScaleMetrics) -> Result<(), HostError> {
        let dpr = JsValue::from(metrics.dpr);
        let rem = JsValue::from_f64(metrics.rem);
        let flexible = flexible_namespace(&self.window).map_err(rejected("publish namespace"))?;
        let targets: [&JsValue; 2] = [self.window.as_ref(), flexible.as_ref()];
        for target in targets {
            set_js(target, "dpr", &dpr).map_err(rejected("publish dpr"))?;
            set_js(target, "rem", &rem).map_err(rejected("publish rem"))?;
        }
        Ok(())
    }
}
