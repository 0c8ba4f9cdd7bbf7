// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the swapscan library.
//!
//! Each concern has its own error type, and [`SwapscanError`] unifies them for
//! callers that do not need to tell the sources apart:
//!
//! - [`RpcError`] - chain reads (transactions, receipts)
//! - [`Rejection`] - classification outcomes that mean "no match for this pair"
//! - [`ConfigError`] - chain/token file loading and env overrides
//! - [`StoreError`] - durable swap store
//! - [`RelayError`] / [`RemoteFailure`] - relay endpoint calls
//! - [`P2shError`] - P2SH derivation and lookup
//!
//! Relay results are not errors: see [`crate::relay::RelayOutcome`].

mod classify;
mod config;
mod p2sh;
mod relay;
mod rpc;
mod store;

pub use classify::Rejection;
pub use config::ConfigError;
pub use p2sh::P2shError;
pub use relay::{RelayError, RemoteFailure};
pub use rpc::RpcError;
pub use store::StoreError;

/// Unified error type for swapscan operations.
#[derive(Debug, thiserror::Error)]
pub enum SwapscanError {
    /// Chain read failed.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Transaction did not classify.
    #[error("Rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Relay call could not be attempted.
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    /// P2SH derivation or lookup failed.
    #[error("P2SH error: {0}")]
    P2sh(#[from] P2shError),

    /// Request names a chain that is not configured for the operation.
    #[error("Chain not supported: {0}")]
    UnsupportedChain(String),

    /// Request arguments are malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
