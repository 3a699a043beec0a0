//! Crypto Devs mint page, Rust + WASM.
//!
//! The core (`cd-dapp-core`) owns state and flows; this crate binds it to
//! the browser: the injected wallet, the DOM, timers and the console.

pub mod dom;
pub mod ethereum;
pub mod events;
pub mod logging;
pub mod platform;
pub mod render;

use cd_api_types::DappConfig;
use cd_dapp_core::Dapp;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let config = DappConfig::from_build_env().map_err(|err| JsValue::from_str(&err.to_string()))?;
    let els = dom::Elements::bind()?;
    dom::set_text(&els.max_supply, &config.max_supply.to_string());

    if !ethereum::InjectedProvider::is_available() {
        tracing::warn!("no injected wallet yet; connecting will fail until one is present");
    }

    let dapp = Rc::new(Dapp::new(
        config,
        Rc::new(ethereum::InjectedProvider),
        Rc::new(platform::BrowserNotifier),
        Rc::new(platform::GlooTimer),
        Rc::new(platform::BrowserClock),
    ));

    render::render(&els, &dapp.store().snapshot());
    {
        let els = els.clone();
        dapp.store().subscribe(move |state| render::render(&els, state));
    }

    events::bind_events(&els, &dapp)?;

    // Initial load and the two poll timers run as independent tasks.
    let mount = dapp.clone();
    wasm_bindgen_futures::spawn_local(async move { mount.mount().await });
    let status = dapp.clone();
    wasm_bindgen_futures::spawn_local(async move { status.run_status_timer().await });
    let supply = dapp.clone();
    wasm_bindgen_futures::spawn_local(async move { supply.run_minted_timer().await });

    Ok(())
}
