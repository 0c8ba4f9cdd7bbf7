// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON file store with file locking and versioning

use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::state::{StoreSnapshot, StoreState, STORE_VERSION};
use super::{SwapStore, UpsertOutcome};
use crate::errors::{Rejection, StoreError};
use crate::types::{
    CandidateRecord, CandidateStatus, RegisteredSwap, SwapCandidate, SwapKey, SwapStatus,
};

/// Store persisted as one versioned JSON document.
///
/// State is held in memory and the whole document is rewritten after every
/// mutation: written to a temp file, locked, then renamed over the old file,
/// so a crash leaves either the old or the new version on disk. A mutation
/// only reaches memory once its document is on disk; a failed write leaves
/// both untouched.
///
/// # Examples
///
/// ```rust,ignore
/// use swapscan::store::JsonFileSwapStore;
///
/// let store = JsonFileSwapStore::open("/var/lib/swapscan/store.json").await?;
/// ```
#[derive(Debug)]
pub struct JsonFileSwapStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileSwapStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    ///
    /// A file written by a different format version is an error rather than
    /// being discarded, since it holds relay state that must not be lost.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = match load(&path)? {
            Some(snapshot) => StoreState::from_snapshot(snapshot),
            None => {
                debug!(path = %path.display(), "Store file does not exist, starting empty");
                StoreState::default()
            }
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `apply` to a copy of the state, saves the copy if `apply`
    /// reports a change, and only then makes it the live state.
    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut StoreState) -> Result<(T, bool), StoreError>,
    ) -> Result<T, StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let (value, changed) = apply(&mut next)?;
        if changed {
            self.save(&next).await?;
            *state = next;
        }
        Ok(value)
    }

    async fn save(&self, state: &StoreState) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&state.snapshot()).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::io(parent, e))?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| StoreError::io(&temp_path, e))?;

        let file = File::open(&temp_path).map_err(|e| StoreError::io(&temp_path, e))?;
        file.lock().map_err(|e| StoreError::io(&temp_path, e))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        drop(file);

        debug!(path = %self.path.display(), bytes = json.len(), "Saved swap store");
        Ok(())
    }
}

fn load(path: &Path) -> Result<Option<StoreSnapshot>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    file.lock_shared().map_err(|e| StoreError::io(path, e))?;

    let snapshot: StoreSnapshot =
        serde_json::from_reader(&file).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    drop(file);

    if snapshot.version != STORE_VERSION {
        return Err(StoreError::VersionMismatch {
            expected: STORE_VERSION,
            found: snapshot.version,
        });
    }

    info!(path = %path.display(), version = snapshot.version, "Loaded swap store");
    Ok(Some(snapshot))
}

#[async_trait]
impl SwapStore for JsonFileSwapStore {
    async fn add_candidate(&self, candidate: SwapCandidate) -> Result<bool, StoreError> {
        self.mutate(|state| {
            let inserted = state.add_candidate(candidate);
            Ok((inserted, inserted))
        })
        .await
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
        self.mutate(|state| {
            state.update_candidate(candidate, status, rejection)?;
            Ok(((), true))
        })
        .await
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
        self.mutate(|state| {
            let outcome = state.upsert_swap(swap);
            Ok((outcome, outcome == UpsertOutcome::Inserted))
        })
        .await
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
        self.mutate(|state| {
            state.update_swap_status(key, status, detail)?;
            Ok(((), true))
        })
        .await
    }

    async fn find_swaps_by_txid(&self, txid: &str) -> Result<Vec<RegisteredSwap>, StoreError> {
        Ok(self.state.lock().await.find_swaps_by_txid(txid))
    }

    async fn requeue_retryable(&self) -> Result<usize, StoreError> {
        self.mutate(|state| {
            let count = state.requeue_retryable();
            Ok((count, count > 0))
        })
        .await
    }

    async fn add_p2sh_binding(&self, p2sh_address: &str, bind: &str) -> Result<(), StoreError> {
        self.mutate(|state| Ok(((), state.add_p2sh_binding(p2sh_address, bind))))
            .await
    }

    async fn find_p2sh_bind(&self, p2sh_address: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state.lock().await.find_p2sh_bind(p2sh_address))
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}
