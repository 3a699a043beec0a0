//! Bridge to the wallet-injected `window.ethereum` provider.
//!
//! The object is looked up on every request: some wallets inject it after
//! the page has loaded.

use async_trait::async_trait;
use cd_chain_client::{Eip1193Provider, ProviderError};
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[derive(Debug, Default, Clone, Copy)]
pub struct InjectedProvider;

impl InjectedProvider {
    fn ethereum() -> Result<JsValue, ProviderError> {
        let window = web_sys::window().ok_or_else(|| ProviderError::new(None, "no window"))?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).map_err(js_error)?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return Err(ProviderError::new(None, "no injected wallet (window.ethereum) found"));
        }
        Ok(ethereum)
    }

    pub fn is_available() -> bool {
        Self::ethereum().is_ok()
    }
}

#[async_trait(?Send)]
impl Eip1193Provider for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let ethereum = Self::ethereum()?;
        let request: Function = Reflect::get(&ethereum, &JsValue::from_str("request"))
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| ProviderError::new(None, "window.ethereum.request is not a function"))?;

        let params = params
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| ProviderError::new(None, err.to_string()))?;
        let args = Object::new();
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method)).map_err(js_error)?;
        Reflect::set(&args, &JsValue::from_str("params"), &params).map_err(js_error)?;

        let promise: Promise = request
            .call1(&ethereum, &args)
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| ProviderError::new(None, "request did not return a promise"))?;
        let result = JsFuture::from(promise).await.map_err(js_error)?;

        serde_wasm_bindgen::from_value(result).map_err(|err| ProviderError::new(None, err.to_string()))
    }
}

/// EIP-1193 errors carry a numeric `code` and a `message`.
fn js_error(err: JsValue) -> ProviderError {
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64);
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    ProviderError::new(code, message)
}
