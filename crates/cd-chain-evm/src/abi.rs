//! Interface of the Crypto Devs NFT contract.
//!
//! Only the functions the page touches are declared. None of them take
//! arguments, so calldata is the bare selector.

use alloy_sol_types::{SolCall, sol};

sol! {
    #[derive(Debug)]
    interface ICryptoDevs {
        function owner() external view returns (address);
        function tokenIds() external view returns (uint256);
        function presaleStarted() external view returns (bool);
        function presaleEnded() external view returns (uint256);

        function startPresale() external;
        function mint() external payable;
        function presaleMint() external payable;
    }
}

/// Bare function name of a call, e.g. `presaleMint`, for logs and errors.
pub fn function_name<C: SolCall>() -> &'static str {
    C::SIGNATURE
        .split_once('(')
        .map_or(C::SIGNATURE, |(name, _)| name)
}
