//! Render dispatch: one visible control per [`RenderState`].

use crate::dom::{self, Elements};
use cd_dapp_core::{AppState, RenderState};
use web_sys::HtmlElement;

/// The container shown for a state.
fn control(els: &Elements, view: RenderState) -> &HtmlElement {
    match view {
        RenderState::ConnectWallet => &els.connect_btn,
        RenderState::Busy => &els.loading_btn,
        RenderState::StartPresale => &els.start_presale_btn,
        RenderState::PresaleNotStarted => &els.presale_not_started,
        RenderState::PresaleMint => &els.presale_panel,
        RenderState::PublicMint => &els.public_mint_btn,
    }
}

/// The element carrying the state's label. The presale panel also holds a
/// description, so its label goes on the inner button.
fn label_target(els: &Elements, view: RenderState) -> &HtmlElement {
    match view {
        RenderState::PresaleMint => &els.presale_mint_btn,
        other => control(els, other),
    }
}

pub fn render(els: &Elements, state: &AppState) {
    dom::set_text(&els.minted_count, &state.tokens_minted.to_string());

    let view = RenderState::from_flags(state.view_flags());
    let visible = control(els, view);
    for el in els.controls() {
        el.set_hidden(el != visible);
    }
    dom::set_text(label_target(els, view), view.label());
}
