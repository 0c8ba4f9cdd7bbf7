// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared RPC error types for chain read operations.

/// Errors that can occur while reading transactions and receipts from a chain.
///
/// Carries the operation being performed so log lines point at the failing
/// lookup rather than at the transport.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Transaction was not found after every lookup attempt.
    #[error("Transaction not found: {tx_hash}")]
    TransactionNotFound {
        /// The transaction hash that wasn't found
        tx_hash: String,
    },

    /// Receipt was not found for a transaction.
    ///
    /// Usually the transaction is still pending.
    #[error("Receipt not found for transaction: {tx_hash}")]
    ReceiptNotFound {
        /// The transaction hash whose receipt wasn't found
        tx_hash: String,
    },

    /// Failed to connect to the chain or execute an RPC call.
    #[error("Chain connection failed during {operation}")]
    ChainConnectionFailed {
        /// Description of the operation that failed
        operation: String,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The chain answered but the payload could not be interpreted.
    #[error("Malformed chain response during {operation}: {reason}")]
    MalformedResponse {
        /// Description of the operation that failed
        operation: String,
        /// What was wrong with the payload
        reason: String,
    },

    /// No endpoint is configured for the chain.
    #[error("No RPC endpoint configured for chain {chain}")]
    NoEndpoint {
        /// Chain name
        chain: String,
    },
}

impl RpcError {
    /// Helper to create a `ChainConnectionFailed` error from any error type.
    pub fn chain_connection_failed(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::ChainConnectionFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `MalformedResponse` error.
    pub fn malformed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        RpcError::MalformedResponse {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}
