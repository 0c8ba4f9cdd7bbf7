// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain access
//!
//! The scanner only needs two reads per EVM transaction (the transaction and
//! its receipt) and one read per UTXO transaction, so each chain family sits
//! behind a small async trait. Production clients live in [`evm`] and
//! [`utxo`]; tests substitute in-memory fakes.

use alloy_primitives::TxHash;
use async_trait::async_trait;

use crate::errors::RpcError;
use crate::types::{SwapReceipt, SwapTransaction, UtxoTransaction};

pub mod evm;
mod registry;
pub mod utxo;

pub use evm::AlloyChainClient;
pub use registry::{ChainBackend, ChainEntry, ChainRegistry};
pub use utxo::EsploraClient;

/// Read access to an EVM chain.
///
/// `Ok(None)` means the node answered but does not know the transaction.
#[async_trait]
pub trait EvmChainClient: Send + Sync {
    async fn get_transaction(&self, hash: TxHash) -> Result<Option<SwapTransaction>, RpcError>;

    async fn get_receipt(&self, hash: TxHash) -> Result<Option<SwapReceipt>, RpcError>;
}

/// Read access to a Bitcoin-family chain.
#[async_trait]
pub trait UtxoChainClient: Send + Sync {
    async fn get_transaction(&self, txid: &str) -> Result<Option<UtxoTransaction>, RpcError>;
}
