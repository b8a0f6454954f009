//! Reveal and tilt strategies backed by JS callbacks.
//!
//! The host page passes plain functions (for example thin wrappers around a
//! scroll-animation or tilt library). Each is called once with the options
//! object; a throw is reported as a failure.

use backdrop_core::page::{RevealOptions, RevealStrategy, TiltOptions, TiltStrategy};
use serde::Serialize;
use wasm_bindgen::JsValue;

fn to_js<T: Serialize>(options: &T) -> Result<JsValue, String> {
    let json = serde_json::to_string(options).map_err(|e| e.to_string())?;
    js_sys::JSON::parse(&json).map_err(|e| format!("{e:?}"))
}

fn call_with<T: Serialize>(callback: &js_sys::Function, options: &T) -> Result<(), String> {
    let options = to_js(options)?;
    callback
        .call1(&JsValue::NULL, &options)
        .map(|_| ())
        .map_err(|e| format!("{e:?}"))
}

pub struct JsReveal(pub js_sys::Function);

impl RevealStrategy for JsReveal {
    fn reveal_all(&self, options: &RevealOptions) -> Result<(), String> {
        call_with(&self.0, options)
    }
}

pub struct JsTilt(pub js_sys::Function);

impl TiltStrategy for JsTilt {
    fn tilt_all(&self, options: &TiltOptions) -> Result<(), String> {
        call_with(&self.0, options)
    }
}
