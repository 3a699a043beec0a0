//! Which control the page offers, as a pure function of five flags.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewFlags {
    pub wallet_connected: bool,
    pub loading: bool,
    pub is_owner: bool,
    pub presale_started: bool,
    pub presale_ended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    ConnectWallet,
    Busy,
    StartPresale,
    PresaleNotStarted,
    PresaleMint,
    PublicMint,
}

impl RenderState {
    /// First matching rule wins. Owning the contract only adds the
    /// start-presale control; it never hides the minting controls.
    pub fn from_flags(flags: ViewFlags) -> Self {
        let ViewFlags {
            wallet_connected,
            loading,
            is_owner,
            presale_started,
            presale_ended,
        } = flags;

        if !wallet_connected {
            RenderState::ConnectWallet
        } else if loading {
            RenderState::Busy
        } else if is_owner && !presale_started {
            RenderState::StartPresale
        } else if !presale_started {
            RenderState::PresaleNotStarted
        } else if !presale_ended {
            RenderState::PresaleMint
        } else {
            RenderState::PublicMint
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderState::ConnectWallet => "Connect Your Wallet",
            RenderState::Busy => "Loading",
            RenderState::StartPresale => "Start Presale",
            RenderState::PresaleNotStarted => "Presale has not started!",
            RenderState::PresaleMint => "Presale Mint 🚀",
            RenderState::PublicMint => "Public Mint 🚀",
        }
    }
}
