//! Event binding.
//!
//! Each click spawns its flow as an independent local task, so a pending
//! transaction never blocks the poll timers.

use crate::dom::Elements;
use cd_dapp_core::Dapp;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Attach an async click handler that runs `$handler(&Dapp)`.
macro_rules! on_click_async {
    ($el:expr, $dapp:expr, $handler:expr) => {{
        let dapp = $dapp.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let dapp = dapp.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&dapp).await;
            });
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements, dapp: &Rc<Dapp>) -> Result<(), JsValue> {
    on_click_async!(els.connect_btn, dapp, Dapp::connect_wallet);
    on_click_async!(els.start_presale_btn, dapp, Dapp::start_presale);
    on_click_async!(els.presale_mint_btn, dapp, Dapp::presale_mint);
    on_click_async!(els.public_mint_btn, dapp, Dapp::public_mint);
    Ok(())
}
