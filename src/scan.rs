// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Candidate scanning
//!
//! [`ScanOrchestrator::run_once`] takes a batch of pending candidates, looks
//! each one up on its chain, classifies it against the chain's token pairs in
//! configuration order and records the result. Candidates in a batch are
//! processed concurrently; the call returns once the whole batch is done.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::TxHash;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn, Instrument};

use crate::chain::{ChainEntry, ChainRegistry, EvmChainClient};
use crate::classifier::TransactionClassifier;
use crate::config::ServerConfig;
use crate::errors::{Rejection, StoreError};
use crate::spans;
use crate::store::{SwapStore, UpsertOutcome};
use crate::types::{
    CandidateStatus, RegisteredSwap, SwapCandidate, SwapMatch, SwapReceipt, SwapTransaction,
};

/// What scanning one candidate concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// A pair accepted the transaction
    Matched(SwapMatch),
    /// Every pair rejected it; carries the last rejection, if any pair was tried
    Rejected(Option<Rejection>),
    /// The transaction was not found within the lookup budget
    NotFound,
    /// The candidate names a chain or id that cannot be scanned
    Unscannable(String),
}

impl CandidateOutcome {
    fn status(&self) -> CandidateStatus {
        match self {
            CandidateOutcome::Matched(_) => CandidateStatus::Resolved,
            CandidateOutcome::Rejected(_) | CandidateOutcome::Unscannable(_) => {
                CandidateStatus::Rejected
            }
            CandidateOutcome::NotFound => CandidateStatus::NotFound,
        }
    }
}

/// Counts from one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanPass {
    pub scanned: usize,
    pub matched: usize,
    pub rejected: usize,
    pub not_found: usize,
    pub store_errors: usize,
}

/// Lookup budgets for one chain read.
#[derive(Debug, Clone, Copy)]
struct LookupBudget {
    attempts: usize,
    interval: Duration,
}

/// Drives candidates from `Pending` to a final candidate status.
pub struct ScanOrchestrator {
    registry: Arc<ChainRegistry>,
    store: Arc<dyn SwapStore>,
    batch_size: usize,
    max_concurrency: usize,
    tx_lookup: LookupBudget,
    receipt_lookup: LookupBudget,
}

impl std::fmt::Debug for ScanOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanOrchestrator")
            .field("chains", &self.registry.len())
            .field("store", &self.store.name())
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl ScanOrchestrator {
    pub fn new(registry: Arc<ChainRegistry>, store: Arc<dyn SwapStore>, config: &ServerConfig) -> Self {
        Self {
            registry,
            store,
            batch_size: config.batch_size,
            max_concurrency: config.max_concurrency.max(1),
            tx_lookup: LookupBudget {
                attempts: config.tx_lookup_attempts.max(1),
                interval: config.rpc_interval,
            },
            receipt_lookup: LookupBudget {
                attempts: config.receipt_lookup_attempts.max(1),
                interval: config.rpc_interval,
            },
        }
    }

    /// Scans one batch of pending candidates.
    ///
    /// Fails only if the batch cannot be listed; per-candidate store errors
    /// are logged and counted.
    pub async fn run_once(&self) -> Result<ScanPass, StoreError> {
        let candidates = self.store.list_pending_candidates(self.batch_size).await?;
        if candidates.is_empty() {
            return Ok(ScanPass::default());
        }

        let span = spans::scan_batch(candidates.len());
        async {
            let results: Vec<_> = stream::iter(candidates)
                .map(|candidate| async move {
                    let result = self.scan_candidate(&candidate).await;
                    if let Err(e) = &result {
                        error!(%candidate, error = %e, "Failed to record scan result");
                    }
                    result
                })
                .buffer_unordered(self.max_concurrency)
                .collect()
                .await;

            let mut pass = ScanPass::default();
            for result in results {
                pass.scanned += 1;
                match result {
                    Ok(CandidateOutcome::Matched(_)) => pass.matched += 1,
                    Ok(CandidateOutcome::NotFound) => pass.not_found += 1,
                    Ok(_) => pass.rejected += 1,
                    Err(_) => pass.store_errors += 1,
                }
            }
            info!(
                scanned = pass.scanned,
                matched = pass.matched,
                rejected = pass.rejected,
                not_found = pass.not_found,
                "Scan pass complete"
            );
            Ok(pass)
        }
        .instrument(span)
        .await
    }

    /// Classifies a candidate and records the outcome.
    ///
    /// A match is registered before the candidate is marked resolved, so an
    /// interrupted scan at worst classifies the candidate again, which the
    /// store's dedup absorbs.
    pub async fn scan_candidate(
        &self,
        candidate: &SwapCandidate,
    ) -> Result<CandidateOutcome, StoreError> {
        let outcome = self.classify_candidate(candidate).await;

        let rejection = match &outcome {
            CandidateOutcome::Matched(matched) => {
                let key = matched.key();
                let swap = RegisteredSwap::from_match(matched.clone(), Utc::now());
                match self.store.upsert_registered_swap(swap).await? {
                    UpsertOutcome::Inserted => {
                        info!(%candidate, %key, kind = %matched.kind, "Registered swap")
                    }
                    UpsertOutcome::Existing => {
                        debug!(%candidate, %key, "Swap already registered")
                    }
                }
                None
            }
            CandidateOutcome::Rejected(rejection) => {
                let reason = rejection
                    .as_ref()
                    .map_or_else(|| "no pairs configured".to_string(), ToString::to_string);
                info!(%candidate, %reason, "Candidate rejected");
                rejection.clone()
            }
            CandidateOutcome::NotFound => {
                warn!(%candidate, "Transaction not found");
                None
            }
            CandidateOutcome::Unscannable(reason) => {
                warn!(%candidate, %reason, "Candidate cannot be scanned");
                None
            }
        };

        self.store
            .update_candidate(candidate, outcome.status(), rejection)
            .await?;
        Ok(outcome)
    }

    /// Looks a candidate up and classifies it without touching the store.
    pub async fn classify_candidate(&self, candidate: &SwapCandidate) -> CandidateOutcome {
        let span = spans::scan_candidate(&candidate.chain, &candidate.txid);
        async {
            let Some(chain) = self.registry.get(&candidate.chain) else {
                return CandidateOutcome::Unscannable(format!("unknown chain {}", candidate.chain));
            };
            let Some(client) = chain.evm() else {
                return CandidateOutcome::Unscannable(format!(
                    "chain {} is not an EVM chain",
                    candidate.chain
                ));
            };
            let hash: TxHash = match candidate.txid.parse() {
                Ok(hash) => hash,
                Err(e) => {
                    return CandidateOutcome::Unscannable(format!(
                        "invalid transaction hash {}: {e}",
                        candidate.txid
                    ))
                }
            };

            let Some(tx) = self.lookup_transaction(client.as_ref(), hash).await else {
                return CandidateOutcome::NotFound;
            };
            self.classify_transaction(chain, client.as_ref(), &tx).await
        }
        .instrument(span)
        .await
    }

    /// Tries the chain's pairs in order; the first match wins.
    ///
    /// The receipt is fetched at most once, and only when a pair that
    /// accepted the destination needs it.
    async fn classify_transaction(
        &self,
        chain: &ChainEntry,
        client: &dyn EvmChainClient,
        tx: &SwapTransaction,
    ) -> CandidateOutcome {
        let classifier = TransactionClassifier::new(chain.config.scan_receipt);
        let mut receipt: Option<Option<SwapReceipt>> = None;
        let mut last_rejection = None;

        for pair in &chain.config.pairs {
            let acceptance = match classifier.accept_destination(pair, tx) {
                Ok(acceptance) => acceptance,
                Err(rejection) => {
                    last_rejection = Some(rejection);
                    continue;
                }
            };

            if acceptance.needs_receipt && receipt.is_none() {
                receipt = Some(self.lookup_receipt(client, tx.hash).await);
            }
            let pair_receipt = if acceptance.needs_receipt {
                receipt.as_ref().and_then(Option::as_ref)
            } else {
                None
            };

            let span = spans::classify_pair(pair.kind.as_str(), pair.pair_id().unwrap_or("router"));
            match span.in_scope(|| classifier.classify(chain.name(), pair, tx, pair_receipt)) {
                Ok(matched) => return CandidateOutcome::Matched(matched),
                Err(rejection) => {
                    debug!(kind = %pair.kind, %rejection, "Pair rejected transaction");
                    last_rejection = Some(rejection);
                }
            }
        }
        CandidateOutcome::Rejected(last_rejection)
    }

    /// Fetches a mined transaction, retrying within the lookup budget.
    async fn lookup_transaction(
        &self,
        client: &dyn EvmChainClient,
        hash: TxHash,
    ) -> Option<SwapTransaction> {
        for attempt in 1..=self.tx_lookup.attempts {
            match client.get_transaction(hash).await {
                Ok(Some(tx)) if tx.block_number.is_some() => return Some(tx),
                Ok(Some(_)) => debug!(attempt, "Transaction not mined yet"),
                Ok(None) => debug!(attempt, "Transaction not found"),
                Err(e) => warn!(attempt, error = %e, "Transaction lookup failed"),
            }
            if attempt < self.tx_lookup.attempts {
                tokio::time::sleep(self.tx_lookup.interval).await;
            }
        }
        None
    }

    async fn lookup_receipt(&self, client: &dyn EvmChainClient, hash: TxHash) -> Option<SwapReceipt> {
        for attempt in 1..=self.receipt_lookup.attempts {
            match client.get_receipt(hash).await {
                Ok(Some(receipt)) => return Some(receipt),
                Ok(None) => debug!(attempt, "Receipt not found"),
                Err(e) => warn!(attempt, error = %e, "Receipt lookup failed"),
            }
            if attempt < self.receipt_lookup.attempts {
                tokio::time::sleep(self.receipt_lookup.interval).await;
            }
        }
        None
    }
}
