// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Store state shared by the memory and JSON file backends

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::UpsertOutcome;
use crate::errors::{Rejection, StoreError};
use crate::types::{
    normalize, CandidateRecord, CandidateStatus, RegisteredSwap, SwapCandidate, SwapKey,
    SwapStatus,
};

/// Current on-disk format version
pub(crate) const STORE_VERSION: u32 = 1;

#[derive(Debug, Default, Clone)]
pub(crate) struct StoreState {
    candidates: HashMap<SwapCandidate, CandidateRecord>,
    swaps: HashMap<SwapKey, RegisteredSwap>,
    p2sh_bindings: HashMap<String, String>,
}

/// Serialized store (versioned)
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoreSnapshot {
    pub(crate) version: u32,
    candidates: Vec<CandidateRecord>,
    swaps: Vec<RegisteredSwap>,
    p2sh_bindings: BTreeMap<String, String>,
}

impl StoreState {
    pub(crate) fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            candidates: snapshot
                .candidates
                .into_iter()
                .map(|record| (record.candidate.clone(), record))
                .collect(),
            swaps: snapshot
                .swaps
                .into_iter()
                .map(|swap| (swap.key.clone(), swap))
                .collect(),
            p2sh_bindings: snapshot.p2sh_bindings.into_iter().collect(),
        }
    }

    pub(crate) fn snapshot(&self) -> StoreSnapshot {
        let mut candidates: Vec<_> = self.candidates.values().cloned().collect();
        candidates.sort_by(|a, b| a.candidate.cmp(&b.candidate));
        let mut swaps: Vec<_> = self.swaps.values().cloned().collect();
        swaps.sort_by(|a, b| a.key.cmp(&b.key));
        StoreSnapshot {
            version: STORE_VERSION,
            candidates,
            swaps,
            p2sh_bindings: self
                .p2sh_bindings
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub(crate) fn add_candidate(&mut self, candidate: SwapCandidate) -> bool {
        if self.candidates.contains_key(&candidate) {
            return false;
        }
        let now = Utc::now();
        self.candidates.insert(
            candidate.clone(),
            CandidateRecord {
                candidate,
                status: CandidateStatus::Pending,
                rejection: None,
                created_at: now,
                updated_at: now,
            },
        );
        true
    }

    pub(crate) fn list_pending_candidates(&self, limit: usize) -> Vec<SwapCandidate> {
        let mut pending: Vec<_> = self
            .candidates
            .values()
            .filter(|record| record.status == CandidateStatus::Pending)
            .collect();
        pending.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.candidate.cmp(&b.candidate))
        });
        pending
            .into_iter()
            .take(limit)
            .map(|record| record.candidate.clone())
            .collect()
    }

    pub(crate) fn update_candidate(
        &mut self,
        candidate: &SwapCandidate,
        status: CandidateStatus,
        rejection: Option<Rejection>,
    ) -> Result<(), StoreError> {
        let record = self
            .candidates
            .get_mut(candidate)
            .ok_or_else(|| StoreError::not_found(candidate))?;
        record.status = status;
        record.rejection = rejection;
        record.updated_at = Utc::now();
        Ok(())
    }

    pub(crate) fn find_candidate(&self, candidate: &SwapCandidate) -> Option<CandidateRecord> {
        self.candidates.get(candidate).cloned()
    }

    pub(crate) fn upsert_swap(&mut self, swap: RegisteredSwap) -> UpsertOutcome {
        if self.swaps.contains_key(&swap.key) {
            return UpsertOutcome::Existing;
        }
        self.swaps.insert(swap.key.clone(), swap);
        UpsertOutcome::Inserted
    }

    pub(crate) fn list_pending_swaps(&self, limit: usize) -> Vec<RegisteredSwap> {
        let mut pending: Vec<_> = self
            .swaps
            .values()
            .filter(|swap| swap.status == SwapStatus::Pending)
            .collect();
        pending.sort_by(|a, b| a.updated_at.cmp(&b.updated_at).then_with(|| a.key.cmp(&b.key)));
        pending.into_iter().take(limit).cloned().collect()
    }

    pub(crate) fn update_swap_status(
        &mut self,
        key: &SwapKey,
        status: SwapStatus,
        detail: Option<String>,
    ) -> Result<(), StoreError> {
        let swap = self
            .swaps
            .get_mut(key)
            .ok_or_else(|| StoreError::not_found(key))?;
        swap.status = status;
        swap.last_error = detail;
        swap.updated_at = Utc::now();
        Ok(())
    }

    pub(crate) fn find_swaps_by_txid(&self, txid: &str) -> Vec<RegisteredSwap> {
        let txid = normalize(txid);
        let mut found: Vec<_> = self
            .swaps
            .values()
            .filter(|swap| swap.txid() == txid)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.key.cmp(&b.key));
        found
    }

    pub(crate) fn requeue_retryable(&mut self) -> usize {
        let now = Utc::now();
        let mut count = 0;
        for swap in self
            .swaps
            .values_mut()
            .filter(|swap| swap.status == SwapStatus::Retryable)
        {
            swap.status = SwapStatus::Pending;
            swap.updated_at = now;
            count += 1;
        }
        count
    }

    pub(crate) fn add_p2sh_binding(&mut self, p2sh_address: &str, bind: &str) -> bool {
        if self.p2sh_bindings.contains_key(p2sh_address) {
            return false;
        }
        self.p2sh_bindings
            .insert(p2sh_address.to_string(), bind.to_string());
        true
    }

    pub(crate) fn find_p2sh_bind(&self, p2sh_address: &str) -> Option<String> {
        self.p2sh_bindings.get(p2sh_address).cloned()
    }

    pub(crate) fn swap_count(&self) -> usize {
        self.swaps.len()
    }
}
