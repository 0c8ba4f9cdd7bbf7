// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Alloy-backed EVM chain client with endpoint failover

use std::future::Future;

use alloy_consensus::{Transaction as _, TxReceipt};
use alloy_network::{AnyNetwork, AnyRpcTransaction, AnyTransactionReceipt, ReceiptResponse, TransactionResponse};
use alloy_primitives::TxHash;
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use alloy_rpc_client::ClientBuilder;
use alloy_transport::TransportResult;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::EvmChainClient;
use crate::errors::RpcError;
use crate::transport::{LoggingLayer, RateLimitLayer, TokenBucket};
use crate::types::{SwapReceipt, SwapTransaction};

struct Endpoint {
    url: String,
    provider: RootProvider<AnyNetwork>,
}

/// Reads transactions and receipts over JSON-RPC.
///
/// Endpoints are tried in configured order. The first endpoint that knows
/// the transaction wins; an endpoint that errors is skipped. All endpoints of
/// one chain share a single rate limit budget.
pub struct AlloyChainClient {
    chain: String,
    endpoints: Vec<Endpoint>,
}

impl std::fmt::Debug for AlloyChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyChainClient")
            .field("chain", &self.chain)
            .field(
                "endpoints",
                &self.endpoints.iter().map(|e| e.url.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl AlloyChainClient {
    /// Builds a client over `rpc_urls`, logging every call and optionally
    /// limiting the request rate.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::NoEndpoint`] for an empty URL list and
    /// [`RpcError::ChainConnectionFailed`] for a URL that does not parse.
    pub fn connect(
        chain: &str,
        rpc_urls: &[String],
        requests_per_second: Option<u32>,
    ) -> Result<Self, RpcError> {
        if rpc_urls.is_empty() {
            return Err(RpcError::NoEndpoint {
                chain: chain.to_string(),
            });
        }

        let bucket = TokenBucket::per_second(requests_per_second);
        let endpoints = rpc_urls
            .iter()
            .map(|raw| {
                let url: url::Url = raw
                    .parse()
                    .map_err(|e| RpcError::chain_connection_failed(format!("parse rpc url {raw}"), e))?;
                let client = ClientBuilder::default()
                    .layer(LoggingLayer::new(chain))
                    .layer(RateLimitLayer::from_bucket(bucket.clone()))
                    .http(url);
                let provider = ProviderBuilder::new()
                    .disable_recommended_fillers()
                    .network::<AnyNetwork>()
                    .connect_client(client);
                Ok(Endpoint {
                    url: raw.clone(),
                    provider,
                })
            })
            .collect::<Result<Vec<_>, RpcError>>()?;

        Ok(Self {
            chain: chain.to_string(),
            endpoints,
        })
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }
}

fn to_swap_transaction(tx: &AnyRpcTransaction) -> SwapTransaction {
    SwapTransaction {
        hash: TransactionResponse::tx_hash(tx),
        from: TransactionResponse::from(tx),
        to: tx.to(),
        input: tx.input().clone(),
        block_number: TransactionResponse::block_number(tx),
    }
}

fn to_swap_receipt(receipt: &AnyTransactionReceipt) -> SwapReceipt {
    SwapReceipt {
        transaction_hash: ReceiptResponse::transaction_hash(receipt),
        status: ReceiptResponse::status(receipt),
        logs: TxReceipt::logs(&receipt.inner.inner).to_vec(),
    }
}

impl AlloyChainClient {
    /// Runs `lookup` against each endpoint in order.
    ///
    /// Returns the first `Some`, `None` if at least one endpoint answered and
    /// none knew the item, and the last error if every endpoint failed.
    async fn first_answer<T, F, Fut>(&self, operation: &str, lookup: F) -> Result<Option<T>, RpcError>
    where
        F: Fn(RootProvider<AnyNetwork>) -> Fut + Sync,
        Fut: Future<Output = TransportResult<Option<T>>> + Send,
        T: Send,
    {
        let mut answered = false;
        let mut last_error = None;
        for endpoint in &self.endpoints {
            match lookup(endpoint.provider.clone()).await {
                Ok(Some(found)) => return Ok(Some(found)),
                Ok(None) => answered = true,
                Err(e) => {
                    warn!(chain = %self.chain, url = %endpoint.url, error = %e, "{operation} failed");
                    last_error = Some(RpcError::chain_connection_failed(operation, e));
                }
            }
        }
        match last_error {
            Some(e) if !answered => Err(e),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl EvmChainClient for AlloyChainClient {
    async fn get_transaction(&self, hash: TxHash) -> Result<Option<SwapTransaction>, RpcError> {
        debug!(chain = %self.chain, %hash, "Fetching transaction");
        self.first_answer("get_transaction_by_hash", |provider| async move {
            provider
                .get_transaction_by_hash(hash)
                .await
                .map(|tx| tx.as_ref().map(to_swap_transaction))
        })
        .await
    }

    async fn get_receipt(&self, hash: TxHash) -> Result<Option<SwapReceipt>, RpcError> {
        debug!(chain = %self.chain, %hash, "Fetching receipt");
        self.first_answer("get_transaction_receipt", |provider| async move {
            provider
                .get_transaction_receipt(hash)
                .await
                .map(|receipt| receipt.as_ref().map(to_swap_receipt))
        })
        .await
    }
}
