use async_trait::async_trait;
use cd_api_types::ChainId;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[cfg(any(test, feature = "test-util"))]
mod test_util;
#[cfg(any(test, feature = "test-util"))]
pub use test_util::{ImmediateTimer, ManualClock};

/// EIP-1193 error code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("provider error ({code:?}): {message}")]
pub struct ProviderError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("wallet is on chain {actual}, expected chain {expected}")]
    WrongNetwork { expected: ChainId, actual: ChainId },
    #[error("`{method}` failed: {message}")]
    ChainCall { method: String, message: String },
    #[error("user rejected the wallet request")]
    UserRejected,
    #[error("wallet returned no authorized account")]
    NoAccount,
}

impl ChainError {
    pub fn call(method: &str, message: impl fmt::Display) -> Self {
        ChainError::ChainCall {
            method: method.to_owned(),
            message: message.to_string(),
        }
    }

    pub fn from_provider(method: &str, err: ProviderError) -> Self {
        if err.is_user_rejection() {
            ChainError::UserRejected
        } else {
            ChainError::call(method, err.message)
        }
    }
}

/// The `request({ method, params })` object a browser wallet injects.
#[async_trait(?Send)]
pub trait Eip1193Provider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
}

#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

pub trait Clock {
    fn now_secs(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_code_maps_to_user_rejected() {
        let err = ProviderError::new(Some(USER_REJECTED_CODE), "User denied account access");
        assert_eq!(ChainError::from_provider("eth_requestAccounts", err), ChainError::UserRejected);
    }

    #[test]
    fn other_codes_map_to_chain_call() {
        let err = ProviderError::new(Some(-32603), "execution reverted");
        assert_eq!(
            ChainError::from_provider("eth_call", err),
            ChainError::ChainCall {
                method: "eth_call".to_owned(),
                message: "execution reverted".to_owned(),
            }
        );
    }
}
