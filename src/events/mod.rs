// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Solidity event and call definitions

pub mod definitions;

pub use definitions::{
    address_bind, string_bind, transferCall, transferFromCall, LogAnySwapOut,
    LogAnySwapTradeTokensForNative, LogAnySwapTradeTokensForTokens, LogNFT1155SwapOut,
    LogNFT1155SwapOutBatch, LogNFT721SwapOut, Transfer,
};
