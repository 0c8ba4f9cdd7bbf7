// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Event and call definitions recognised by the classifier
//!
//! The `sol!` macro generates `SIGNATURE_HASH` constants for events and
//! `SELECTOR` constants for calls, so no hashing happens at runtime.
//!
//! # Bridge token contracts
//!
//! - `Transfer(address,address,uint256)`: ERC-20 deposit into the bridge
//! - `LogSwapout(address,address,uint256)`: swap-out with an address-typed bind
//! - `LogSwapout(address,uint256,string)`: swap-out with a string-typed bind (BTC-style)
//!
//! # Router contracts
//!
//! - ERC-20: `LogAnySwapOut`, `LogAnySwapTradeTokensForTokens`, `LogAnySwapTradeTokensForNative`
//! - NFT: `LogNFT721SwapOut`, `LogNFT1155SwapOut`, `LogNFT1155SwapOutBatch`
//!
//! Any-call topics have no Solidity definition here; see
//! [`crate::config::constants::topics`].
//!
//! # Example: decoding a swap-out bind address
//!
//! ```rust,ignore
//! use swapscan::events::address_bind::LogSwapout;
//! use alloy_sol_types::SolEvent;
//!
//! if let Ok(event) = LogSwapout::decode_log(&log.inner) {
//!     println!("bind: {}", event.bindaddr);
//! }
//! ```

use alloy_sol_types::sol;

sol! {
    /// ERC-20 Transfer event.
    #[derive(Debug, PartialEq, Eq)]
    event Transfer(address indexed from, address indexed to, uint256 value);

    /// ERC-20 `transfer(address,uint256)`.
    #[derive(Debug, PartialEq, Eq)]
    function transfer(address to, uint256 amount) returns (bool);

    /// ERC-20 `transferFrom(address,address,uint256)`.
    #[derive(Debug, PartialEq, Eq)]
    function transferFrom(address from, address to, uint256 amount) returns (bool);

    /// Router ERC-20 swap-out.
    #[derive(Debug, PartialEq, Eq)]
    event LogAnySwapOut(
        address indexed token,
        address indexed from,
        address indexed to,
        uint256 amount,
        uint256 fromChainID,
        uint256 toChainID
    );

    /// Router swap-out through a token path, settled in tokens.
    #[derive(Debug, PartialEq, Eq)]
    event LogAnySwapTradeTokensForTokens(
        address[] path,
        address indexed from,
        address indexed to,
        uint256 amountIn,
        uint256 amountOutMin,
        uint256 fromChainID,
        uint256 toChainID
    );

    /// Router swap-out through a token path, settled in native currency.
    #[derive(Debug, PartialEq, Eq)]
    event LogAnySwapTradeTokensForNative(
        address[] path,
        address indexed from,
        address indexed to,
        uint256 amountIn,
        uint256 amountOutMin,
        uint256 fromChainID,
        uint256 toChainID
    );

    /// Router ERC-721 swap-out.
    #[derive(Debug, PartialEq, Eq)]
    event LogNFT721SwapOut(
        address indexed token,
        address indexed from,
        address indexed to,
        uint256 tokenId,
        uint256 fromChainID,
        uint256 toChainID
    );

    /// Router ERC-1155 swap-out.
    #[derive(Debug, PartialEq, Eq)]
    event LogNFT1155SwapOut(
        address indexed token,
        address indexed from,
        address indexed to,
        uint256 tokenId,
        uint256 amount,
        uint256 fromChainID,
        uint256 toChainID
    );

    /// Router ERC-1155 batch swap-out.
    #[derive(Debug, PartialEq, Eq)]
    event LogNFT1155SwapOutBatch(
        address indexed token,
        address indexed from,
        address indexed to,
        uint256[] tokenIds,
        uint256[] amounts,
        uint256 fromChainID,
        uint256 toChainID
    );
}

/// Swap-out with an address-typed bind.
///
/// Lives in its own module because the string-typed variant shares the
/// Solidity name.
pub mod address_bind {
    use alloy_sol_types::sol;

    sol! {
        /// `Swapout(uint256,address)` on a bridge token.
        #[derive(Debug, PartialEq, Eq)]
        function Swapout(uint256 amount, address bindaddr) returns (bool);

        /// `LogSwapout(address,address,uint256)` emitted by a bridge token.
        #[derive(Debug, PartialEq, Eq)]
        event LogSwapout(address indexed account, address indexed bindaddr, uint256 amount);
    }
}

/// Swap-out with a string-typed bind.
pub mod string_bind {
    use alloy_sol_types::sol;

    sol! {
        /// `Swapout(uint256,string)` on a bridge token.
        #[derive(Debug, PartialEq, Eq)]
        function Swapout(uint256 amount, string bindaddr) returns (bool);

        /// `LogSwapout(address,uint256,string)` emitted by a bridge token.
        #[derive(Debug, PartialEq, Eq)]
        event LogSwapout(address indexed account, uint256 amount, string bindaddr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;
    use alloy_sol_types::{SolCall, SolEvent};

    #[test]
    fn transfer_signatures() {
        assert_eq!(Transfer::SIGNATURE, "Transfer(address,address,uint256)");
        assert_eq!(
            Transfer::SIGNATURE_HASH,
            b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        );
        assert_eq!(transferCall::SELECTOR, [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(transferFromCall::SELECTOR, [0x23, 0xb8, 0x72, 0xdd]);
    }

    #[test]
    fn swapout_signatures() {
        assert_eq!(address_bind::SwapoutCall::SELECTOR, [0x62, 0x8d, 0x6c, 0xba]);
        assert_eq!(string_bind::SwapoutCall::SELECTOR, [0xad, 0x54, 0x05, 0x6d]);
        assert_eq!(
            address_bind::LogSwapout::SIGNATURE_HASH,
            b256!("6b616089d04950dc06c45c6dd787d657980543f89651aec47924752c7d16c888")
        );
        assert_eq!(
            string_bind::LogSwapout::SIGNATURE_HASH,
            b256!("9c92ad817e5474d30a4378deface765150479363a897b0590fbb12ae9d89396b")
        );
    }

    #[test]
    fn router_signatures() {
        assert_eq!(
            LogAnySwapOut::SIGNATURE_HASH,
            b256!("97116cf6cd4f6412bb47914d6db18da9e16ab2142f543b86e207c24fbd16b23a")
        );
        assert_eq!(
            LogAnySwapTradeTokensForTokens::SIGNATURE_HASH,
            b256!("fea6abdf4fd32f20966dff7619354cd82cd43dc78a3bee479f04c74dbfc585b3")
        );
        assert_eq!(
            LogAnySwapTradeTokensForNative::SIGNATURE_HASH,
            b256!("278277e0209c347189add7bd92411973b5f6b8644f7ac62ea1be984ce993f8f4")
        );
        assert_eq!(
            LogNFT721SwapOut::SIGNATURE_HASH,
            b256!("0d45b0b9f5add3e1bb841982f1fa9303628b0b619b000cb1f9f1c3903329a4c7")
        );
        assert_eq!(
            LogNFT1155SwapOut::SIGNATURE_HASH,
            b256!("5058b8684cf36ffd9f66bc623fbc617a44dd65cf2273306d03d3104af0995cb0")
        );
        assert_eq!(
            LogNFT1155SwapOutBatch::SIGNATURE_HASH,
            b256!("aa428a5ab688b49b415401782c170d216b33b15711d30cf69482f570eca8db38")
        );
    }
}
