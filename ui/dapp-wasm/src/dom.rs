//! DOM element bindings.
//!
//! Every control for every render state lives in `index.html`; they are
//! resolved once at startup and shown or hidden by `render`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

fn doc() -> Option<Document> {
    web_sys::window()?.document()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

fn required<T: JsCast>(id: &str) -> Result<T, JsValue> {
    by_id_typed(id).ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

#[derive(Clone)]
pub struct Elements {
    pub minted_count: Element,
    pub max_supply: Element,

    // One control per render state
    pub connect_btn: HtmlElement,
    pub loading_btn: HtmlElement,
    pub start_presale_btn: HtmlElement,
    pub presale_not_started: HtmlElement,
    pub presale_panel: HtmlElement,
    pub presale_mint_btn: HtmlElement,
    pub public_mint_btn: HtmlElement,
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        Ok(Self {
            minted_count: required("mintedCount")?,
            max_supply: required("maxSupply")?,
            connect_btn: required("connectWalletBtn")?,
            loading_btn: required("loadingBtn")?,
            start_presale_btn: required("startPresaleBtn")?,
            presale_not_started: required("presaleNotStarted")?,
            presale_panel: required("presalePanel")?,
            presale_mint_btn: required("presaleMintBtn")?,
            public_mint_btn: required("publicMintBtn")?,
        })
    }

    pub fn controls(&self) -> [&HtmlElement; 6] {
        [
            &self.connect_btn,
            &self.loading_btn,
            &self.start_presale_btn,
            &self.presale_not_started,
            &self.presale_panel,
            &self.public_mint_btn,
        ]
    }
}
