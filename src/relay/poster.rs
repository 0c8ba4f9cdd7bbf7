// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, error, info, warn, Instrument};

use super::outcome::{classify_failure, classify_status};
use super::retry_cache::{CachedPost, RetryCache};
use super::{RelayArgs, RelayOutcome, RelayTransport};
use crate::config::ServerConfig;
use crate::errors::StoreError;
use crate::spans;
use crate::store::SwapStore;
use crate::types::{RegisteredSwap, RelayMethod, SwapKey, SwapStatus};

/// Counts from one relay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayPass {
    pub posted: usize,
    pub succeeded: usize,
    pub terminal: usize,
    pub retryable: usize,
    /// Posts whose status could not be written back
    pub store_errors: usize,
    /// Swaps left alone because another delivery had them or they were final
    pub skipped: usize,
}

impl RelayPass {
    fn record(&mut self, result: &Result<Option<RelayOutcome>, StoreError>) {
        let status = match result {
            Ok(None) => {
                self.skipped += 1;
                return;
            }
            Ok(Some(outcome)) => Ok(outcome.to_status()),
            Err(_) => Err(()),
        };
        self.posted += 1;
        match status {
            Ok(SwapStatus::Success) => self.succeeded += 1,
            Ok(SwapStatus::Retryable) => self.retryable += 1,
            Ok(SwapStatus::Terminal | SwapStatus::Pending) => self.terminal += 1,
            Err(()) => self.store_errors += 1,
        }
    }

    fn merge(&mut self, other: RelayPass) {
        self.posted += other.posted;
        self.succeeded += other.succeeded;
        self.terminal += other.terminal;
        self.retryable += other.retryable;
        self.store_errors += other.store_errors;
        self.skipped += other.skipped;
    }
}

/// Swap keys with a delivery underway.
#[derive(Debug, Default)]
struct InFlight(Mutex<HashSet<SwapKey>>);

impl InFlight {
    /// Marks `key` in flight, or returns `None` if it already is.
    fn claim(&self, key: &SwapKey) -> Option<InFlightClaim<'_>> {
        let mut keys = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        keys.insert(key.clone()).then(|| InFlightClaim {
            in_flight: self,
            key: key.clone(),
        })
    }
}

/// Releases the key when the delivery ends, however it ends.
struct InFlightClaim<'a> {
    in_flight: &'a InFlight,
    key: SwapKey,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.in_flight
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Delivers registered swaps to their swap servers.
///
/// Each post makes up to `retry_count` attempts spaced by `retry_delay`,
/// stopping early on any non-retryable outcome. The final outcome is written
/// to the store; retryable exhaustion also parks the swap in the retry cache.
/// A swap is never delivered twice at once, whoever asks for it.
pub struct RelayPoster {
    transport: Arc<dyn RelayTransport>,
    store: Arc<dyn SwapStore>,
    cache: RetryCache,
    in_flight: InFlight,
    retry_count: usize,
    retry_delay: Duration,
    batch_size: usize,
    max_concurrency: usize,
}

impl std::fmt::Debug for RelayPoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayPoster")
            .field("store", &self.store.name())
            .field("retry_count", &self.retry_count)
            .field("retry_delay", &self.retry_delay)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl RelayPoster {
    pub fn new(
        transport: Arc<dyn RelayTransport>,
        store: Arc<dyn SwapStore>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            transport,
            store,
            cache: RetryCache::new(config.retry_cache_capacity),
            in_flight: InFlight::default(),
            retry_count: config.relay_retry_count.max(1),
            retry_delay: config.relay_retry_delay,
            batch_size: config.batch_size,
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    pub fn retry_cache(&self) -> &RetryCache {
        &self.cache
    }

    /// Posts one swap and records the outcome.
    ///
    /// Returns `None` without calling the swap server when the swap is
    /// already being delivered, or when the stored record is gone or final.
    /// Only a store failure is an error; every remote failure is an outcome.
    pub async fn post(&self, swap: &RegisteredSwap) -> Result<Option<RelayOutcome>, StoreError> {
        let Some(_claim) = self.in_flight.claim(&swap.key) else {
            debug!(key = %swap.key, "Swap delivery already in progress");
            return Ok(None);
        };

        let current = self
            .store
            .find_swaps_by_txid(swap.key.txid())
            .await?
            .into_iter()
            .find(|stored| stored.key == swap.key && !stored.status.is_final());
        match current {
            Some(current) => self.deliver_and_record(&current).await.map(Some),
            None => {
                debug!(key = %swap.key, "Swap already final or unknown, not posting");
                Ok(None)
            }
        }
    }

    async fn deliver_and_record(&self, swap: &RegisteredSwap) -> Result<RelayOutcome, StoreError> {
        let span = spans::post_swap(&swap.key, swap.method.rpc_method());
        async {
            let outcome = self.deliver(swap).await;
            log_outcome(swap, &outcome);

            self.store
                .update_swap_status(&swap.key, outcome.to_status(), outcome.detail())
                .await?;

            if outcome.is_retryable() {
                let cached = CachedPost {
                    swap: swap.clone(),
                    last_outcome: outcome.clone(),
                    enqueued_at: Utc::now(),
                };
                if let Some(evicted) = self.cache.push(cached).await {
                    warn!(
                        key = %evicted.swap.key,
                        enqueued_at = %evicted.enqueued_at,
                        "Retry cache full, dropped oldest entry"
                    );
                }
            }
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    async fn deliver(&self, swap: &RegisteredSwap) -> RelayOutcome {
        let params = match RelayArgs::from_swap(swap) {
            Ok(args) => args.to_params(),
            Err(e) => return RelayOutcome::Rejected(e.to_string()),
        };
        let method = swap.method.rpc_method();

        let mut last = None;
        for attempt in 1..=self.retry_count {
            let outcome = match self
                .transport
                .call(&swap.swap_server, method, params.clone())
                .await
            {
                Ok(result) => interpret_result(swap, &result),
                Err(failure) => classify_failure(&failure),
            };
            if !outcome.is_retryable() {
                return outcome;
            }

            debug!(attempt, max_attempts = self.retry_count, %outcome, "Relay attempt failed");
            last = Some(outcome);
            if attempt < self.retry_count {
                tokio::time::sleep(self.retry_delay).await;
            }
        }
        last.unwrap_or_else(|| RelayOutcome::Rejected("no delivery attempt made".to_string()))
    }

    /// Re-posts everything in the retry cache with a fresh retry budget.
    pub async fn drain_retry_cache(&self) -> RelayPass {
        let entries = self.cache.drain().await;
        if entries.is_empty() {
            return RelayPass::default();
        }
        let span = spans::drain_retry_cache(entries.len());
        self.post_all(entries.into_iter().map(|entry| entry.swap).collect())
            .instrument(span)
            .await
    }

    /// One relay poll: drain the retry cache, then post up to `batch_size`
    /// pending swaps.
    pub async fn run_once(&self) -> Result<RelayPass, StoreError> {
        let mut pass = self.drain_retry_cache().await;
        let pending = self.store.list_pending_swaps(self.batch_size).await?;
        pass.merge(self.post_all(pending).await);
        if pass.posted > 0 {
            info!(
                posted = pass.posted,
                succeeded = pass.succeeded,
                terminal = pass.terminal,
                retryable = pass.retryable,
                "Relay pass complete"
            );
        }
        Ok(pass)
    }

    async fn post_all(&self, swaps: Vec<RegisteredSwap>) -> RelayPass {
        let results: Vec<_> = stream::iter(swaps)
            .map(|swap| async move {
                let result = self.post(&swap).await;
                if let Err(e) = &result {
                    error!(key = %swap.key, error = %e, "Failed to record relay outcome");
                }
                result
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let mut pass = RelayPass::default();
        for result in &results {
            pass.record(result);
        }
        pass
    }
}

fn interpret_result(swap: &RegisteredSwap, result: &Value) -> RelayOutcome {
    match (swap.method, swap.log_index) {
        (RelayMethod::RouterSwap, Some(log_index)) => decode_router_result(result, log_index),
        (RelayMethod::RouterSwap, None) => {
            RelayOutcome::Malformed("router swap without log index".to_string())
        }
        _ => RelayOutcome::Success,
    }
}

/// Reads the status at `log_index` from a router registration result, a JSON
/// object keyed by log index.
pub fn decode_router_result(result: &Value, log_index: u64) -> RelayOutcome {
    let Some(statuses) = result.as_object() else {
        return RelayOutcome::Malformed(format!("expected map keyed by log index, got {result}"));
    };
    match statuses.get(&log_index.to_string()) {
        Some(Value::String(status)) => classify_status(status),
        Some(other) => RelayOutcome::Malformed(format!("status at log index {log_index} is {other}")),
        None => RelayOutcome::Malformed(format!("no status for log index {log_index} in {result}")),
    }
}

fn log_outcome(swap: &RegisteredSwap, outcome: &RelayOutcome) {
    let server = swap.swap_server.as_str();
    match outcome {
        RelayOutcome::Success => info!(server, "Posted swap"),
        RelayOutcome::AlreadyRegistered => info!(server, "Swap already registered"),
        RelayOutcome::Closed | RelayOutcome::TradeUnsupported | RelayOutcome::WrongContract => {
            info!(server, %outcome, "Swap refused by server")
        }
        RelayOutcome::Retryable { .. } => warn!(server, %outcome, "Swap delivery exhausted retries"),
        RelayOutcome::Malformed(_) | RelayOutcome::Rejected(_) => {
            error!(server, %outcome, "Swap delivery failed")
        }
    }
}
