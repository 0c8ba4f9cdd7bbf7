// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Selectors, log topics and protocol constants
//!
//! Everything the classifier compares against lives here so each swap kind's
//! strategy can be assembled from named constants at config-load time.

use alloy_primitives::{b256, B256};
use alloy_sol_types::{SolCall, SolEvent};

use crate::events::{
    address_bind, string_bind, transferCall, transferFromCall, LogAnySwapOut,
    LogAnySwapTradeTokensForNative, LogAnySwapTradeTokensForTokens, LogNFT1155SwapOut,
    LogNFT1155SwapOutBatch, LogNFT721SwapOut, Transfer,
};

/// Token address value that marks a native-currency pair.
pub const NATIVE_TOKEN: &str = "native";

/// Function selectors (first four bytes of call data)
pub mod selectors {
    use super::*;

    /// `transfer(address,uint256)`
    pub const TRANSFER: [u8; 4] = transferCall::SELECTOR;

    /// `transferFrom(address,address,uint256)`
    pub const TRANSFER_FROM: [u8; 4] = transferFromCall::SELECTOR;

    /// `Swapout(uint256,address)`
    pub const SWAPOUT_ADDRESS: [u8; 4] = address_bind::SwapoutCall::SELECTOR;

    /// `Swapout(uint256,string)`
    pub const SWAPOUT_STRING: [u8; 4] = string_bind::SwapoutCall::SELECTOR;
}

/// Log topics (event signature hashes)
pub mod topics {
    use super::*;

    /// ERC-20 `Transfer`, three topics
    pub const TRANSFER: B256 = Transfer::SIGNATURE_HASH;

    /// `LogSwapout(address,address,uint256)`, three topics
    pub const SWAPOUT_ADDRESS: B256 = address_bind::LogSwapout::SIGNATURE_HASH;

    /// `LogSwapout(address,uint256,string)`, two topics
    pub const SWAPOUT_STRING: B256 = string_bind::LogSwapout::SIGNATURE_HASH;

    /// Any-call v6 swap-out
    pub const ANYCALL_SWAP_OUT: B256 =
        b256!("3d1b3d059223895589208a5541dce543eab6d5942b3b1129231a942d1c47bc45");

    /// Any-call v6 transfer swap-out
    pub const ANYCALL_TRANSFER_SWAP_OUT: B256 =
        b256!("caac11c45e5fdb5c513e20ac229a3f9f99143580b5eb08d0fecbdd5ae8c81ef5");

    /// Router ERC-20 swap-out topics
    pub const ROUTER_ERC20: [B256; 3] = [
        LogAnySwapOut::SIGNATURE_HASH,
        LogAnySwapTradeTokensForTokens::SIGNATURE_HASH,
        LogAnySwapTradeTokensForNative::SIGNATURE_HASH,
    ];

    /// Router NFT swap-out topics
    pub const ROUTER_NFT: [B256; 3] = [
        LogNFT721SwapOut::SIGNATURE_HASH,
        LogNFT1155SwapOut::SIGNATURE_HASH,
        LogNFT1155SwapOutBatch::SIGNATURE_HASH,
    ];

    /// Router any-call topics
    pub const ROUTER_ANYCALL: [B256; 2] = [ANYCALL_SWAP_OUT, ANYCALL_TRANSFER_SWAP_OUT];
}

/// Bitcoin-family address versions and script opcodes
pub mod bitcoin {
    /// P2PKH version byte, mainnet
    pub const P2PKH_MAINNET: u8 = 0x00;
    /// P2PKH version byte, testnet
    pub const P2PKH_TESTNET: u8 = 0x6f;
    /// P2SH version byte, mainnet
    pub const P2SH_MAINNET: u8 = 0x05;
    /// P2SH version byte, testnet
    pub const P2SH_TESTNET: u8 = 0xc4;

    pub const OP_DROP: u8 = 0x75;
    pub const OP_DUP: u8 = 0x76;
    pub const OP_HASH160: u8 = 0xa9;
    pub const OP_EQUALVERIFY: u8 = 0x88;
    pub const OP_CHECKSIG: u8 = 0xac;
    pub const OP_PUSHDATA1: u8 = 0x4c;
}
