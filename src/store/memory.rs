// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory store

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::state::StoreState;
use super::{SwapStore, UpsertOutcome};
use crate::errors::{Rejection, StoreError};
use crate::types::{
    CandidateRecord, CandidateStatus, RegisteredSwap, SwapCandidate, SwapKey, SwapStatus,
};

/// Store that keeps everything in process memory.
///
/// Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySwapStore {
    state: Mutex<StoreState>,
}

impl MemorySwapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered swaps.
    pub async fn swap_count(&self) -> usize {
        self.state.lock().await.swap_count()
    }
}

#[async_trait]
impl SwapStore for MemorySwapStore {
    async fn add_candidate(&self, candidate: SwapCandidate) -> Result<bool, StoreError> {
        Ok(self.state.lock().await.add_candidate(candidate))
    }

    async fn list_pending_candidates(
        &self,
        limit: usize,
    ) -> Result<Vec<SwapCandidate>, StoreError> {
        Ok(self.state.lock().await.list_pending_candidates(limit))
    }

    async fn update_candidate(
        &self,
        candidate: &SwapCandidate,
        status: CandidateStatus,
        rejection: Option<Rejection>,
    ) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .update_candidate(candidate, status, rejection)
    }

    async fn find_candidate(
        &self,
        candidate: &SwapCandidate,
    ) -> Result<Option<CandidateRecord>, StoreError> {
        Ok(self.state.lock().await.find_candidate(candidate))
    }

    async fn upsert_registered_swap(
        &self,
        swap: RegisteredSwap,
    ) -> Result<UpsertOutcome, StoreError> {
        let key = swap.key.clone();
        let outcome = self.state.lock().await.upsert_swap(swap);
        debug!(key = %key, outcome = ?outcome, "Upserted registered swap");
        Ok(outcome)
    }

    async fn list_pending_swaps(&self, limit: usize) -> Result<Vec<RegisteredSwap>, StoreError> {
        Ok(self.state.lock().await.list_pending_swaps(limit))
    }

    async fn update_swap_status(
        &self,
        key: &SwapKey,
        status: SwapStatus,
        detail: Option<String>,
    ) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .update_swap_status(key, status, detail)
    }

    async fn find_swaps_by_txid(&self, txid: &str) -> Result<Vec<RegisteredSwap>, StoreError> {
        Ok(self.state.lock().await.find_swaps_by_txid(txid))
    }

    async fn requeue_retryable(&self) -> Result<usize, StoreError> {
        Ok(self.state.lock().await.requeue_retryable())
    }

    async fn add_p2sh_binding(&self, p2sh_address: &str, bind: &str) -> Result<(), StoreError> {
        self.state.lock().await.add_p2sh_binding(p2sh_address, bind);
        Ok(())
    }

    async fn find_p2sh_bind(&self, p2sh_address: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state.lock().await.find_p2sh_bind(p2sh_address))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
