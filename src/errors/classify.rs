// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Rejection reasons produced by transaction classification.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Why a transaction does not match a token pair.
///
/// Every variant is terminal for a given `(transaction, pair)` combination:
/// the scanner moves on to the next configured pair instead of retrying.
/// Variants serialize so the last rejection can be stored on the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// Destination (or decoded recipient) is not an accepted address.
    #[error("wrong receiver: expected {expected}, got {}", display_found(.found))]
    WrongReceiver {
        /// Address the pair accepts
        expected: Address,
        /// Address the transaction targeted, if any
        found: Option<Address>,
    },

    /// Call data is too short to carry a function selector.
    #[error("wrong input: {len} bytes of call data")]
    WrongInput {
        /// Call data length
        len: usize,
    },

    /// Function selector is not one this swap kind accepts.
    #[error("function selector mismatch: 0x{}", hex::encode(.selector))]
    FuncHashMismatch {
        /// The selector found in call data
        selector: [u8; 4],
    },

    /// No deposit log from the token contract was found in the receipt.
    #[error("deposit log not found or removed")]
    DepositLogNotFound,

    /// No swap-out log from the token contract was found in the receipt.
    #[error("swapout log not found or removed")]
    SwapoutLogNotFound,

    /// No router log of the configured sub-kind was found in the receipt.
    #[error("router log not found or removed")]
    RouterLogNotFound,

    /// Receipt is missing, pending, or reports a failed execution.
    #[error("receipt unavailable: {reason}")]
    ReceiptUnavailable {
        /// Diagnostic detail
        reason: String,
    },

    /// The configured swap kind has no classification strategy on this chain family.
    #[error("unknown swap kind: {kind}")]
    UnknownSwapKind {
        /// The kind name
        #[serde(rename = "swap_kind")]
        kind: String,
    },

    /// A UTXO transaction is not in a block yet. Unlike the other variants
    /// this clears once the transaction confirms.
    #[error("transaction {txid} is not confirmed")]
    TxNotConfirmed {
        /// The unconfirmed transaction
        txid: String,
    },

    /// No output of a UTXO transaction pays the derived P2SH address.
    #[error("no output pays p2sh address {p2sh_address}")]
    P2shOutputNotFound {
        /// The derived P2SH address
        p2sh_address: String,
    },
}

fn display_found(found: &Option<Address>) -> String {
    found.map_or_else(|| "none".to_string(), |address| address.to_string())
}

impl Rejection {
    /// Helper to create a `ReceiptUnavailable` rejection.
    pub fn receipt_unavailable(reason: impl Into<String>) -> Self {
        Rejection::ReceiptUnavailable {
            reason: reason.into(),
        }
    }
}
