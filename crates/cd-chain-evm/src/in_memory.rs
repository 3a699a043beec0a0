//! In-memory stand-in for an injected wallet talking to a deployed NFT
//! contract. It answers just enough of EIP-1193 for the page's flows and
//! exposes knobs for the failure modes the page has to survive.

use crate::abi::ICryptoDevs::ICryptoDevsCalls;
use alloy_primitives::{Address, B256, Bytes, U64, U256, address, keccak256};
use alloy_sol_types::{SolInterface, SolValue};
use async_trait::async_trait;
use cd_api_types::{ChainId, DEFAULT_CHAIN_ID};
use cd_chain_client::{Eip1193Provider, ProviderError, USER_REJECTED_CODE};
use serde::Deserialize;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;

pub const IN_MEMORY_CONTRACT: Address = address!("00000000000000000000000000000000c0ffee00");

const INTERNAL_ERROR: i64 = -32603;
const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Clone)]
struct ReceiptEntry {
    success: bool,
    block_number: u64,
    polls_left: u32,
}

#[derive(Debug, Clone)]
pub struct ChainState {
    pub chain_id: ChainId,
    pub accounts: Vec<Address>,
    pub authorized: bool,
    pub reject_connect: bool,
    pub reject_sends: bool,
    pub fail_reads: bool,
    pub revert_writes: bool,
    /// Number of `eth_getTransactionReceipt` polls answered with `null`
    /// before a receipt shows up.
    pub receipt_delay_polls: u32,
    pub owner: Address,
    pub presale_started: bool,
    pub presale_ended_at: U256,
    pub token_ids: U256,
    pub block_time: u64,
    pub presale_window_secs: u64,
    /// Every request in arrival order; `eth_call`s are recorded by function name.
    pub calls: Vec<String>,
    pub sent: Vec<(&'static str, U256)>,
    receipts: HashMap<B256, ReceiptEntry>,
    block_number: u64,
}

pub struct InMemoryChain {
    contract: Address,
    state: RefCell<ChainState>,
}

impl InMemoryChain {
    /// A fresh contract owned by `owner`, with `owner` as the wallet's only account.
    pub fn new(owner: Address) -> Self {
        Self {
            contract: IN_MEMORY_CONTRACT,
            state: RefCell::new(ChainState {
                chain_id: ChainId(DEFAULT_CHAIN_ID),
                accounts: vec![owner],
                authorized: false,
                reject_connect: false,
                reject_sends: false,
                fail_reads: false,
                revert_writes: false,
                receipt_delay_polls: 0,
                owner,
                presale_started: false,
                presale_ended_at: U256::ZERO,
                token_ids: U256::ZERO,
                block_time: 1_700_000_000,
                presale_window_secs: 300,
                calls: Vec::new(),
                sent: Vec::new(),
                receipts: HashMap::new(),
                block_number: 0,
            }),
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut ChainState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    /// Contract function names read through `eth_call`, in order.
    pub fn reads(&self) -> Vec<String> {
        self.with_state(|s| {
            s.calls
                .iter()
                .filter(|c| !c.starts_with("eth_"))
                .cloned()
                .collect()
        })
    }

    fn call(&self, params: &Value) -> Result<Value, ProviderError> {
        let mut state = self.state.borrow_mut();
        let (_, call) = self.decode_request(params)?;
        state.calls.push(call_name(&call).to_owned());

        if state.fail_reads {
            return Err(ProviderError::new(Some(INTERNAL_ERROR), "header not found"));
        }

        let output = match call {
            ICryptoDevsCalls::owner(_) => state.owner.abi_encode(),
            ICryptoDevsCalls::tokenIds(_) => state.token_ids.abi_encode(),
            ICryptoDevsCalls::presaleStarted(_) => state.presale_started.abi_encode(),
            ICryptoDevsCalls::presaleEnded(_) => state.presale_ended_at.abi_encode(),
            _ => return Err(ProviderError::new(Some(INTERNAL_ERROR), "execution reverted")),
        };
        Ok(json!(Bytes::from(output)))
    }

    fn send_transaction(&self, params: &Value) -> Result<Value, ProviderError> {
        let mut state = self.state.borrow_mut();
        if state.reject_sends {
            return Err(ProviderError::new(
                Some(USER_REJECTED_CODE),
                "User denied transaction signature",
            ));
        }

        let (tx, call) = self.decode_request(params)?;
        let from = tx
            .from
            .ok_or_else(|| ProviderError::new(Some(INTERNAL_ERROR), "missing from"))?;
        let name = call_name(&call);
        state.sent.push((name, tx.value.unwrap_or_default()));

        let success = !state.revert_writes
            && match call {
                ICryptoDevsCalls::startPresale(_) => from == state.owner && !state.presale_started,
                ICryptoDevsCalls::mint(_) | ICryptoDevsCalls::presaleMint(_) => state.presale_started,
                _ => false,
            };

        if success {
            if let ICryptoDevsCalls::startPresale(_) = call {
                state.presale_started = true;
                state.presale_ended_at = U256::from(state.block_time + state.presale_window_secs);
            } else {
                state.token_ids += U256::from(1u8);
            }
        }

        state.block_number += 1;
        let hash = keccak256(state.block_number.to_be_bytes());
        let entry = ReceiptEntry {
            success,
            block_number: state.block_number,
            polls_left: state.receipt_delay_polls,
        };
        state.receipts.insert(hash, entry);
        Ok(json!(hash))
    }

    fn receipt(&self, params: &Value) -> Result<Value, ProviderError> {
        let mut state = self.state.borrow_mut();
        let hash: B256 = serde_json::from_value(params[0].clone())
            .map_err(|_| ProviderError::new(Some(INTERNAL_ERROR), "bad hash"))?;

        let Some(entry) = state.receipts.get_mut(&hash) else {
            return Ok(Value::Null);
        };
        if entry.polls_left > 0 {
            entry.polls_left -= 1;
            return Ok(Value::Null);
        }

        Ok(json!({
            "transactionHash": hash,
            "status": U64::from(u64::from(entry.success)),
            "blockNumber": U64::from(entry.block_number),
        }))
    }

    fn decode_request(&self, params: &Value) -> Result<(TxRequest, ICryptoDevsCalls), ProviderError> {
        let tx: TxRequest = serde_json::from_value(params[0].clone())
            .map_err(|err| ProviderError::new(Some(INTERNAL_ERROR), err.to_string()))?;
        if tx.to != self.contract {
            return Err(ProviderError::new(Some(INTERNAL_ERROR), "no contract at target"));
        }
        let call = ICryptoDevsCalls::abi_decode(&tx.data, true)
            .map_err(|_| ProviderError::new(Some(INTERNAL_ERROR), "execution reverted"))?;
        Ok((tx, call))
    }
}

#[derive(Debug, Deserialize)]
struct TxRequest {
    #[serde(default)]
    from: Option<Address>,
    to: Address,
    #[serde(default)]
    value: Option<U256>,
    data: Bytes,
}

fn call_name(call: &ICryptoDevsCalls) -> &'static str {
    match call {
        ICryptoDevsCalls::owner(_) => "owner",
        ICryptoDevsCalls::tokenIds(_) => "tokenIds",
        ICryptoDevsCalls::presaleStarted(_) => "presaleStarted",
        ICryptoDevsCalls::presaleEnded(_) => "presaleEnded",
        ICryptoDevsCalls::startPresale(_) => "startPresale",
        ICryptoDevsCalls::mint(_) => "mint",
        ICryptoDevsCalls::presaleMint(_) => "presaleMint",
    }
}

#[async_trait(?Send)]
impl Eip1193Provider for InMemoryChain {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        if method != "eth_call" {
            self.state.borrow_mut().calls.push(method.to_owned());
        }

        match method {
            "eth_requestAccounts" => {
                let mut state = self.state.borrow_mut();
                if state.reject_connect {
                    return Err(ProviderError::new(
                        Some(USER_REJECTED_CODE),
                        "User rejected the request.",
                    ));
                }
                state.authorized = true;
                Ok(json!(state.accounts))
            }
            "eth_accounts" => {
                let state = self.state.borrow();
                if state.authorized {
                    Ok(json!(state.accounts))
                } else {
                    Ok(json!([]))
                }
            }
            "eth_chainId" => Ok(json!(U64::from(self.state.borrow().chain_id.0))),
            "eth_call" => self.call(&params),
            "eth_sendTransaction" => self.send_transaction(&params),
            "eth_getTransactionReceipt" => self.receipt(&params),
            other => Err(ProviderError::new(
                Some(METHOD_NOT_FOUND),
                format!("method {other} not supported"),
            )),
        }
    }
}
