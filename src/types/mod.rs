// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared across the pipeline

pub mod chain;
pub mod swap;

pub use chain::{BitcoinNetwork, SwapReceipt, SwapTransaction, UtxoOutput, UtxoTransaction};
pub use swap::{
    address_key, normalize, CandidateRecord, CandidateStatus, ChainFamily, RegisteredSwap,
    RelayMethod, SwapCandidate, SwapKey, SwapKind, SwapMatch, SwapStatus,
};
