// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

/// Errors from P2SH address derivation and lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum P2shError {
    /// The bind address is not a valid destination-chain address.
    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    /// The bridge deposit address is not a P2PKH address for the configured network.
    #[error("Invalid deposit address {address}: {reason}")]
    InvalidDepositAddress {
        /// The configured address
        address: String,
        /// What is wrong
        reason: String,
    },

    /// No binding is recorded for the P2SH address.
    #[error("No bind address registered for p2sh address {0}")]
    UnknownP2shAddress(String),
}
