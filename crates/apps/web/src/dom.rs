use runtime::error_surface::ErrorSurface;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

pub fn document() -> Result<Document, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub fn element_by_id(id: &str) -> Result<Element, JsValue> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))
}

pub fn html_element_by_id(id: &str) -> Result<HtmlElement, JsValue> {
    element_by_id(id)?.dyn_into::<HtmlElement>().map_err(|_| {
        JsValue::from_str(&format!("#{id} is not an HTML element"))
    })
}

/// Shows or hides a view container through its `active` class.
pub fn set_active(element: &Element, active: bool) {
    let classes = element.class_list();
    let result = if active {
        classes.add_1("active")
    } else {
        classes.remove_1("active")
    };
    if let Err(err) = result {
        log_error(&format!("class toggle failed: {err:?}"));
    }
}

/// Full-page navigation.
pub fn navigate(href: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(err) = window.location().set_href(href) {
        log_error(&format!("navigation to {href} failed: {err:?}"));
    }
}

/// Runs `callback` once after `delay_ms`.
pub fn set_timeout(callback: &js_sys::Function, delay_ms: i32) -> Result<i32, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window.set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay_ms)
}

pub fn log_error(message: &str) {
    web_sys::console::error_1(&JsValue::from_str(message));
}

/// Converts a JSON value into a plain JS object graph.
pub fn json_to_js(value: &Value) -> Result<JsValue, JsValue> {
    js_sys::JSON::parse(&value.to_string())
}

/// Converts a JS settings object into JSON. `undefined` and `null` are
/// rejected.
pub fn js_to_json(value: &JsValue) -> Result<Value, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Err(JsValue::from_str("settings object is missing"));
    }
    let text = js_sys::JSON::stringify(value)?
        .as_string()
        .ok_or_else(|| JsValue::from_str("settings are not serializable"))?;
    serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The page's error region: a hidden element revealed on first report.
#[derive(Debug)]
pub struct DomErrorSurface {
    element: Option<HtmlElement>,
}

impl DomErrorSurface {
    /// A missing element is tolerated; reports then only reach the console.
    pub fn new(id: &str) -> Self {
        let element = html_element_by_id(id)
            .inspect_err(|e| log_error(&format!("error region unavailable: {e:?}")))
            .ok();
        Self { element }
    }
}

impl ErrorSurface for DomErrorSurface {
    fn report(&mut self, message: &str) {
        log_error(message);
        let Some(element) = &self.element else {
            return;
        };
        if let Err(err) = element.style().set_property("display", "block") {
            log_error(&format!("error region style failed: {err:?}"));
        }
        element.set_text_content(Some(message));
    }
}
