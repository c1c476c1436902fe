//! `wasm-bindgen` exports for [`FlexibleRem`].
//!
//! The exported object owns the scaler, every listener closure and the single
//! debounce timer. Closures share state through one `Rc<Runtime>`; nothing is
//! leaked with `Closure::forget`, so `destroy` (or dropping the object from
//! JS via `free()`) detaches everything.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use flexrem_core::{FlexError, ScalerConfig, Trigger, UnitInput, UnitOutput, ViewportScaler};
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, PageTransitionEvent, Window};

use crate::console::{console_error, install_panic_hook};
use crate::dom_host::{DomHost, flexible_namespace, set_js};

const EXPORTED_HELPERS: [&str; 3] = ["refreshRem", "rem2px", "px2rem"];

fn to_js(err: FlexError) -> JsValue {
    JsValue::from_str(&format!("flexrem: {err}"))
}

/// Strings keep their unit suffix; anything that is not a number reads as NaN.
fn convert(value: &JsValue, f: impl FnOnce(UnitInput<'_>) -> UnitOutput) -> JsValue {
    let text = value.as_string();
    let input = match text.as_deref() {
        Some(text) => UnitInput::Text(text),
        None => UnitInput::Number(value.as_f64().unwrap_or(f64::NAN)),
    };
    match f(input) {
        UnitOutput::Number(n) => JsValue::from_f64(n),
        UnitOutput::Text(t) => JsValue::from_str(&t),
    }
}

/// State shared by the exported object and its listener closures.
struct Runtime {
    scaler: RefCell<ViewportScaler<DomHost>>,
    window: Window,
    origin: web_time::Instant,
    timer_id: Cell<Option<i32>>,
    on_timeout: RefCell<Option<Function>>,
}

impl Runtime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn trigger(&self, trigger: Trigger) {
        let Some(scheduled) = self.scaler.borrow_mut().handle(trigger, self.now()) else {
            return;
        };
        self.clear_timer();
        let callback = self.on_timeout.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        let delay_ms = i32::try_from(scheduled.delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay_ms)
        {
            Ok(id) => self.timer_id.set(Some(id)),
            Err(err) => console_error(&format!("flexrem: failed to arm timer: {err:?}")),
        }
    }

    fn clear_timer(&self) {
        if let Some(id) = self.timer_id.take() {
            self.window.clear_timeout_with_handle(id);
        }
    }

    fn on_timer(&self) {
        self.timer_id.set(None);
        if let Err(err) = self.scaler.borrow_mut().fire_pending() {
            console_error(&format!("flexrem: recompute failed: {err}"));
        }
    }

    fn dom_ready(&self) {
        if let Err(err) = self.scaler.borrow_mut().dom_ready() {
            console_error(&format!("flexrem: body font size not applied: {err}"));
        }
    }

    fn refresh_rem(&self) -> Result<f64, JsValue> {
        let layout = self.scaler.borrow_mut().refresh_rem().map_err(to_js)?;
        Ok(layout.base_px)
    }

    fn rem_to_px(&self, value: &JsValue) -> JsValue {
        let scaler = self.scaler.borrow();
        convert(value, |input| scaler.rem_to_px(input))
    }

    fn px_to_rem(&self, value: &JsValue) -> JsValue {
        let scaler = self.scaler.borrow();
        convert(value, |input| scaler.px_to_rem(input))
    }
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

/// Viewport scaler bound to the current page.
///
/// Construction runs the whole initialization: `data-dpr`, viewport
/// declaration, first base unit, and (once the DOM is ready) the body font
/// size. Resize and back/forward-cache restores recompute after a 300 ms
/// quiet period.
#[wasm_bindgen]
pub struct FlexibleRem {
    runtime: Rc<Runtime>,
    listeners: Vec<Listener>,
    timeout_callback: Option<Closure<dyn FnMut()>>,
    exports: Vec<Closure<dyn Fn(JsValue) -> JsValue>>,
}

#[wasm_bindgen]
impl FlexibleRem {
    /// Initialize against `window`, optionally with a JSON `ScalerConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<FlexibleRem, JsValue> {
        install_panic_hook();
        #[cfg(feature = "console-log")]
        crate::console::install_tracing();

        let config = match config_json.as_deref() {
            Some(json) => ScalerConfig::from_json_str(json).map_err(to_js)?,
            None => ScalerConfig::default(),
        };
        let publish_globals = config.publish_globals;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("flexrem: no window"))?;
        let host = DomHost::new(window.clone()).map_err(|err| to_js(err.into()))?;
        let document = host.document().clone();
        let scaler = ViewportScaler::init(host, config).map_err(to_js)?;

        let runtime = Rc::new(Runtime {
            scaler: RefCell::new(scaler),
            window: window.clone(),
            origin: web_time::Instant::now(),
            timer_id: Cell::new(None),
            on_timeout: RefCell::new(None),
        });
        let mut this = Self {
            runtime,
            listeners: Vec::new(),
            timeout_callback: None,
            exports: Vec::new(),
        };

        this.arm_timeout_callback();
        this.listen(window.as_ref(), "resize", |rt, _| rt.trigger(Trigger::Resize))?;
        this.listen(window.as_ref(), "pageshow", |rt, event| {
            let persisted = event
                .dyn_ref::<PageTransitionEvent>()
                .is_some_and(PageTransitionEvent::persisted);
            rt.trigger(Trigger::PageShow { persisted });
        })?;
        if document.ready_state() == "loading" {
            this.listen(document.as_ref(), "DOMContentLoaded", |rt, _| rt.dom_ready())?;
        } else {
            this.runtime.dom_ready();
        }
        if publish_globals {
            this.export_helpers()?;
        }
        Ok(this)
    }

    pub fn dpr(&self) -> u32 {
        self.runtime.scaler.borrow().dpr()
    }

    pub fn scale(&self) -> f64 {
        self.runtime.scaler.borrow().scale()
    }

    /// Current base unit in pixels.
    pub fn rem(&self) -> f64 {
        self.runtime.scaler.borrow().rem()
    }

    /// Recompute immediately and return the new base unit.
    #[wasm_bindgen(js_name = refreshRem)]
    pub fn refresh_rem(&self) -> Result<f64, JsValue> {
        self.runtime.refresh_rem()
    }

    #[wasm_bindgen(js_name = rem2px)]
    pub fn rem_to_px(&self, value: JsValue) -> JsValue {
        self.runtime.rem_to_px(&value)
    }

    #[wasm_bindgen(js_name = px2rem)]
    pub fn px_to_rem(&self, value: JsValue) -> JsValue {
        self.runtime.px_to_rem(&value)
    }

    /// Whether a debounced recomputation is waiting for its timer.
    #[wasm_bindgen(js_name = hasPendingRecompute)]
    pub fn has_pending_recompute(&self) -> bool {
        self.runtime.scaler.borrow().pending().is_some()
    }

    /// Current state as a plain object.
    pub fn snapshot(&self) -> JsValue {
        let scaler = self.runtime.scaler.borrow();
        let layout = scaler.layout();
        let obj = Object::new();
        let fields = [
            ("dpr", JsValue::from(scaler.dpr())),
            ("scale", JsValue::from_f64(scaler.scale())),
            ("rem", JsValue::from_f64(layout.base_px)),
            ("document_width", JsValue::from_f64(layout.document_width_px)),
            ("effective_width", JsValue::from_f64(layout.effective_width_px)),
            ("clamped", JsValue::from(layout.clamped)),
            ("recomputes", JsValue::from_f64(scaler.recompute_count() as f64)),
            ("pending", JsValue::from(scaler.pending().is_some())),
        ];
        for (key, value) in fields {
            let _ = set_js(&obj, key, &value);
        }
        obj.into()
    }

    /// Detach listeners and cancel any pending recomputation.
    pub fn destroy(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        self.runtime.clear_timer();
        self.runtime.scaler.borrow_mut().cancel_pending();
        self.runtime.on_timeout.borrow_mut().take();
        self.timeout_callback = None;
        if !self.exports.is_empty() {
            if let Ok(flexible) = flexible_namespace(&self.runtime.window) {
                for key in EXPORTED_HELPERS {
                    let _ = Reflect::delete_property(&flexible, &JsValue::from_str(key));
                }
            }
            self.exports.clear();
        }
    }
}

impl FlexibleRem {
    fn arm_timeout_callback(&mut self) {
        let runtime = Rc::clone(&self.runtime);
        let callback = Closure::wrap(Box::new(move || runtime.on_timer()) as Box<dyn FnMut()>);
        let function: &Function = callback.as_ref().unchecked_ref();
        *self.runtime.on_timeout.borrow_mut() = Some(function.clone());
        self.timeout_callback = Some(callback);
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        handler: impl Fn(&Runtime, &web_sys::Event) + 'static,
    ) -> Result<(), JsValue> {
        let runtime = Rc::clone(&self.runtime);
        let callback = Closure::wrap(
            Box::new(move |e: web_sys::Event| handler(&*runtime, &e)) as Box<dyn FnMut(web_sys::Event)>
        );
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            target: target.clone(),
            event,
            callback,
        });
        Ok(())
    }

    /// Attach `refreshRem`, `rem2px` and `px2rem` to `window.lib.flexible`.
    fn export_helpers(&mut self) -> Result<(), JsValue> {
        let flexible: Object = flexible_namespace(&self.runtime.window)?;

        let runtime = Rc::clone(&self.runtime);
        let refresh = Closure::wrap(Box::new(move |_: JsValue| match runtime.refresh_rem() {
            Ok(rem) => JsValue::from_f64(rem),
            Err(err) => {
                console_error(&format!("{err:?}"));
                JsValue::from_f64(runtime.scaler.borrow().rem())
            }
        }) as Box<dyn Fn(JsValue) -> JsValue>);

        let runtime = Rc::clone(&self.runtime);
        let rem2px = Closure::wrap(
            Box::new(move |v: JsValue| runtime.rem_to_px(&v)) as Box<dyn Fn(JsValue) -> JsValue>
        );

        let runtime = Rc::clone(&self.runtime);
        let px2rem = Closure::wrap(
            Box::new(move |v: JsValue| runtime.px_to_rem(&v)) as Box<dyn Fn(JsValue) -> JsValue>
        );

        for (key, closure) in EXPORTED_HELPERS.into_iter().zip([refresh, rem2px, px2rem]) {
            set_js(&flexible, key, closure.as_ref())?;
            self.exports.push(closure);
        }
        Ok(())
    }
}

impl Drop for FlexibleRem {
    fn drop(&mut self) {
        self.destroy();
    }
}
