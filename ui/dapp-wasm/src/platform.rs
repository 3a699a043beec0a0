//! Browser implementations of the core's platform seams.

use async_trait::async_trait;
use cd_chain_client::{Clock, Timer};
use cd_dapp_core::Notifier;
use std::time::Duration;

/// `window.alert`, blocking like the rest of the page expects.
pub struct BrowserNotifier;

impl Notifier for BrowserNotifier {
    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
}

pub struct GlooTimer;

#[async_trait(?Send)]
impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}

pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_secs(&self) -> u64 {
        (js_sys::Date::now() / 1000.0).floor() as u64
    }
}
