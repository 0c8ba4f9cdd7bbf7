// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Durable swap store
//!
//! The store is the single arbiter of dedup and status. Two backends:
//!
//! - [`MemorySwapStore`]: process-local, for tests and dry runs
//! - [`JsonFileSwapStore`]: versioned JSON file with atomic rewrites
//!
//! Every operation is atomic per key and safe to call concurrently.
//!
//! # Examples
//!
//! ```rust,ignore
//! use swapscan::store::{JsonFileSwapStore, MemorySwapStore, SwapStore};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn SwapStore> = Arc::new(JsonFileSwapStore::open("swapscan.json").await?);
//! let store: Arc<dyn SwapStore> = Arc::new(MemorySwapStore::new());
//! ```

use async_trait::async_trait;

use crate::errors::{Rejection, StoreError};
use crate::types::{
    CandidateRecord, CandidateStatus, RegisteredSwap, SwapCandidate, SwapKey, SwapStatus,
};

mod json_file;
mod memory;
mod state;

pub use json_file::JsonFileSwapStore;
pub use memory::MemorySwapStore;

/// Result of registering a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new record was stored
    Inserted,
    /// A record with the same key already existed and was left untouched
    Existing,
}

/// Persistence for candidates, registered swaps and P2SH bindings.
///
/// Implementations must be `Send + Sync`; the scan loop, the relay loop and
/// service callers share one instance.
#[async_trait]
pub trait SwapStore: Send + Sync {
    /// Records a candidate as pending. Returns `false` if it was already known.
    async fn add_candidate(&self, candidate: SwapCandidate) -> Result<bool, StoreError>;

    /// Up to `limit` pending candidates, oldest first.
    async fn list_pending_candidates(&self, limit: usize)
        -> Result<Vec<SwapCandidate>, StoreError>;

    /// Moves a candidate to `status`, keeping the last rejection for diagnostics.
    async fn update_candidate(
        &self,
        candidate: &SwapCandidate,
        status: CandidateStatus,
        rejection: Option<Rejection>,
    ) -> Result<(), StoreError>;

    async fn find_candidate(
        &self,
        candidate: &SwapCandidate,
    ) -> Result<Option<CandidateRecord>, StoreError>;

    /// Stores `swap` unless its key exists. Re-registration is a no-op, not an error.
    async fn upsert_registered_swap(&self, swap: RegisteredSwap)
        -> Result<UpsertOutcome, StoreError>;

    /// Up to `limit` swaps waiting to be posted, least recently updated first.
    async fn list_pending_swaps(&self, limit: usize) -> Result<Vec<RegisteredSwap>, StoreError>;

    /// Sets the relay status of a swap. `detail` replaces the stored last error.
    async fn update_swap_status(
        &self,
        key: &SwapKey,
        status: SwapStatus,
        detail: Option<String>,
    ) -> Result<(), StoreError>;

    /// Every registered swap of a transaction (several for multi-log router swaps).
    async fn find_swaps_by_txid(&self, txid: &str) -> Result<Vec<RegisteredSwap>, StoreError>;

    /// Returns `Retryable` swaps to `Pending`. Called once at startup.
    async fn requeue_retryable(&self) -> Result<usize, StoreError>;

    /// Remembers which bind address a P2SH address was derived from.
    async fn add_p2sh_binding(&self, p2sh_address: &str, bind: &str) -> Result<(), StoreError>;

    async fn find_p2sh_bind(&self, p2sh_address: &str) -> Result<Option<String>, StoreError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
