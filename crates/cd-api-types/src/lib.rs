use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Contract address used when `CRYPTO_DEVS_NFT_ADDRESS` is not set at build time.
pub const DEFAULT_NFT_CONTRACT_ADDRESS: &str = "0x8a3f0c8e1bb9bd7e54c39b9f4e77d3a1c0f4b6a2";

/// Rinkeby.
pub const DEFAULT_CHAIN_ID: u64 = 4;
pub const DEFAULT_NETWORK_NAME: &str = "rinkeby";

/// Price of one token for both presale and public mint, in ether.
pub const MINT_PRICE_ETHER: &str = "0.01";
pub const MAX_SUPPLY: u64 = 20;

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid contract address `{0}`")]
    InvalidAddress(String),
    #[error("invalid chain id `{0}`")]
    InvalidChainId(String),
    #[error("invalid ether amount `{0}`")]
    InvalidAmount(String),
}

/// Everything the page needs to know about its deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DappConfig {
    pub contract_address: Address,
    pub chain_id: ChainId,
    pub network_name: String,
    pub mint_price_wei: U256,
    pub max_supply: u64,
}

impl DappConfig {
    /// Build the configuration baked in at compile time.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_parts(
            option_env!("CRYPTO_DEVS_NFT_ADDRESS").unwrap_or(DEFAULT_NFT_CONTRACT_ADDRESS),
            option_env!("CRYPTO_DEVS_CHAIN_ID"),
            option_env!("CRYPTO_DEVS_NETWORK").unwrap_or(DEFAULT_NETWORK_NAME),
        )
    }

    pub fn from_parts(
        contract_address: &str,
        chain_id: Option<&str>,
        network_name: &str,
    ) -> Result<Self, ConfigError> {
        let contract_address = contract_address
            .trim()
            .parse::<Address>()
            .map_err(|_| ConfigError::InvalidAddress(contract_address.to_owned()))?;

        let chain_id = match chain_id {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(ChainId)
                .map_err(|_| ConfigError::InvalidChainId(raw.to_owned()))?,
            None => ChainId(DEFAULT_CHAIN_ID),
        };

        Ok(Self {
            contract_address,
            chain_id,
            network_name: network_name.to_owned(),
            mint_price_wei: mint_price_wei()?,
            max_supply: MAX_SUPPLY,
        })
    }
}

pub fn mint_price_wei() -> Result<U256, ConfigError> {
    parse_ether(MINT_PRICE_ETHER).map_err(|_| ConfigError::InvalidAmount(MINT_PRICE_ETHER.to_owned()))
}
