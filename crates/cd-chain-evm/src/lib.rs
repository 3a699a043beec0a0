//! EVM side of the mint page: wallet connection over an injected EIP-1193
//! provider and typed access to the Crypto Devs NFT contract.

pub mod abi;
pub mod connector;
pub mod gateway;
#[cfg(any(test, feature = "test-util"))]
pub mod in_memory;

pub use connector::{ProviderHandle, SignerHandle, WalletConnector, WalletSession};
pub use gateway::{ContractGateway, PendingTx, ReadableContract, Receipt, WritableContract};
#[cfg(any(test, feature = "test-util"))]
pub use in_memory::{ChainState, IN_MEMORY_CONTRACT, InMemoryChain};
