// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Operations exposed to a request routing layer
//!
//! [`SwapService`] validates requests against the configured chains and
//! drives the store, scanner and poster. Loops in [`crate::worker`] do the
//! same work in the background; the service is for requests that should not
//! wait for the next poll.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::chain::{ChainEntry, ChainRegistry};
use crate::classifier::{utxo::match_p2sh_output, TransactionClassifier};
use crate::errors::{P2shError, RpcError, SwapscanError};
use crate::p2sh::{P2shAddressInfo, P2shAddressRegistry};
use crate::relay::{RelayOutcome, RelayPoster};
use crate::scan::{CandidateOutcome, ScanOrchestrator};
use crate::store::{SwapStore, UpsertOutcome};
use crate::types::{
    address_key, normalize, CandidateRecord, ChainFamily, RegisteredSwap, SwapCandidate, SwapKey,
    SwapMatch,
};

/// Candidate and registered swaps known for a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapStatusReport {
    pub candidate: Option<CandidateRecord>,
    pub swaps: Vec<RegisteredSwap>,
}

/// Result of [`SwapService::scan_now`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub outcome: CandidateOutcome,
    /// Present when the match was posted here; `None` when it was already
    /// final or the relay loop was delivering it
    pub relay: Option<RelayOutcome>,
}

/// Result of a direct registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub key: SwapKey,
    pub outcome: UpsertOutcome,
}

pub struct SwapService {
    registry: Arc<ChainRegistry>,
    store: Arc<dyn SwapStore>,
    scanner: Arc<ScanOrchestrator>,
    poster: Arc<RelayPoster>,
}

impl std::fmt::Debug for SwapService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapService")
            .field("chains", &self.registry.len())
            .field("store", &self.store.name())
            .finish_non_exhaustive()
    }
}

/// `0x` followed by 64 hex digits.
fn is_evm_txid(txid: &str) -> bool {
    txid.strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// 64 hex digits, no prefix.
fn is_utxo_txid(txid: &str) -> bool {
    txid.len() == 64 && txid.bytes().all(|b| b.is_ascii_hexdigit())
}

impl SwapService {
    pub fn new(
        registry: Arc<ChainRegistry>,
        store: Arc<dyn SwapStore>,
        scanner: Arc<ScanOrchestrator>,
        poster: Arc<RelayPoster>,
    ) -> Self {
        Self {
            registry,
            store,
            scanner,
            poster,
        }
    }

    fn chain(&self, chain: &str, family: ChainFamily) -> Result<&Arc<ChainEntry>, SwapscanError> {
        self.registry
            .get(&normalize(chain))
            .filter(|entry| entry.config.family == family)
            .ok_or_else(|| SwapscanError::UnsupportedChain(chain.to_string()))
    }

    fn evm_txid(txid: &str) -> Result<String, SwapscanError> {
        let txid = normalize(txid);
        if is_evm_txid(&txid) {
            Ok(txid)
        } else {
            Err(SwapscanError::InvalidArgument(format!("invalid transaction hash {txid}")))
        }
    }

    fn p2sh_registry(&self, chain: &str) -> Result<(&Arc<ChainEntry>, &Arc<P2shAddressRegistry>), SwapscanError> {
        let entry = self.chain(chain, ChainFamily::Utxo)?;
        let registry = entry
            .p2sh
            .as_ref()
            .ok_or_else(|| SwapscanError::UnsupportedChain(format!("{chain} has no p2sh bridge")))?;
        Ok((entry, registry))
    }

    /// Queues a transaction for scanning. Returns false if it was already queued.
    pub async fn register_candidate(&self, chain: &str, txid: &str) -> Result<bool, SwapscanError> {
        let entry = self.chain(chain, ChainFamily::Evm)?;
        let txid = Self::evm_txid(txid)?;
        let added = self
            .store
            .add_candidate(SwapCandidate::new(entry.name(), &txid))
            .await?;
        if added {
            info!(chain = %entry.name(), %txid, "Queued candidate");
        }
        Ok(added)
    }

    async fn register(&self, matched: SwapMatch) -> Result<Registration, SwapscanError> {
        let key = matched.key();
        let outcome = self
            .store
            .upsert_registered_swap(RegisteredSwap::from_match(matched, Utc::now()))
            .await?;
        info!(%key, ?outcome, "Registered swap directly");
        Ok(Registration { key, outcome })
    }

    /// Registers a bridge swap for a configured pair without classifying it.
    pub async fn register_bridge_swap(
        &self,
        chain: &str,
        txid: &str,
        pair_id: &str,
    ) -> Result<Registration, SwapscanError> {
        let entry = self.chain(chain, ChainFamily::Evm)?;
        let txid = Self::evm_txid(txid)?;
        let pair = entry
            .config
            .pairs
            .iter()
            .find(|pair| pair.pair_id().is_some_and(|id| id.eq_ignore_ascii_case(pair_id)))
            .ok_or_else(|| SwapscanError::InvalidArgument(format!("unknown pair id {pair_id}")))?;

        self.register(SwapMatch {
            chain: entry.name().to_string(),
            txid,
            kind: pair.kind,
            method: pair.kind.relay_method(),
            tx_to: address_key(&TransactionClassifier::comparison_address(pair)),
            bind: None,
            pair_id: pair.pair_id().map(str::to_string),
            chain_id: None,
            log_index: None,
            swap_server: pair.swap_server.clone(),
        })
        .await
    }

    /// Registers one router log of a transaction without classifying it.
    pub async fn register_router_swap(
        &self,
        chain: &str,
        chain_id: u64,
        txid: &str,
        log_index: u64,
    ) -> Result<Registration, SwapscanError> {
        let entry = self.chain(chain, ChainFamily::Evm)?;
        let txid = Self::evm_txid(txid)?;
        let pair = entry
            .config
            .pairs
            .iter()
            .find(|pair| pair.chain_id() == Some(chain_id))
            .ok_or_else(|| SwapscanError::InvalidArgument(format!("no router for chain id {chain_id}")))?;

        self.register(SwapMatch {
            chain: entry.name().to_string(),
            txid,
            kind: pair.kind,
            method: pair.kind.relay_method(),
            tx_to: address_key(&TransactionClassifier::comparison_address(pair)),
            bind: None,
            pair_id: None,
            chain_id: Some(chain_id),
            log_index: Some(log_index),
            swap_server: pair.swap_server.clone(),
        })
        .await
    }

    /// Everything recorded for a transaction.
    pub async fn swap_status(&self, chain: &str, txid: &str) -> Result<SwapStatusReport, SwapscanError> {
        let candidate = SwapCandidate::new(chain, txid);
        let record = self.store.find_candidate(&candidate).await?;
        let swaps = self
            .store
            .find_swaps_by_txid(&candidate.txid)
            .await?
            .into_iter()
            .filter(|swap| swap.chain == candidate.chain)
            .collect();
        Ok(SwapStatusReport {
            candidate: record,
            swaps,
        })
    }

    /// Derives (or recalls) the P2SH deposit address for a bind address and
    /// records the binding.
    pub async fn register_p2sh_address(
        &self,
        chain: &str,
        bind: &str,
    ) -> Result<Arc<P2shAddressInfo>, SwapscanError> {
        let (entry, registry) = self.p2sh_registry(chain)?;
        let info = registry.derive(bind).await?;
        self.store
            .add_p2sh_binding(&info.p2sh_address, &info.bind_address)
            .await?;
        info!(chain = %entry.name(), p2sh = %info.p2sh_address, bind = %info.bind_address, "Registered p2sh address");
        Ok(info)
    }

    /// Details of a previously registered P2SH address.
    pub async fn p2sh_address_info(
        &self,
        chain: &str,
        p2sh_address: &str,
    ) -> Result<Arc<P2shAddressInfo>, SwapscanError> {
        let (_, registry) = self.p2sh_registry(chain)?;
        let p2sh_address = p2sh_address.trim();
        let bind = match registry.bind_for(p2sh_address).await {
            Some(bind) => bind,
            None => self
                .store
                .find_p2sh_bind(p2sh_address)
                .await?
                .ok_or_else(|| P2shError::UnknownP2shAddress(p2sh_address.to_string()))?,
        };
        Ok(registry.derive(&bind).await?)
    }

    /// Verifies that a UTXO transaction pays the P2SH address of `bind` and
    /// registers it for relay.
    pub async fn p2sh_swapin(
        &self,
        chain: &str,
        txid: &str,
        bind: &str,
    ) -> Result<Registration, SwapscanError> {
        let (entry, registry) = self.p2sh_registry(chain)?;
        let txid = normalize(txid);
        if !is_utxo_txid(&txid) {
            return Err(SwapscanError::InvalidArgument(format!("invalid transaction id {txid}")));
        }
        let (Some(config), Some(client)) = (entry.config.p2sh.as_ref(), entry.utxo()) else {
            return Err(SwapscanError::UnsupportedChain(entry.name().to_string()));
        };

        let info = registry.derive(bind).await?;
        self.store
            .add_p2sh_binding(&info.p2sh_address, &info.bind_address)
            .await?;

        let tx = client
            .get_transaction(&txid)
            .await?
            .ok_or_else(|| RpcError::TransactionNotFound { tx_hash: txid.clone() })?;
        let matched = match_p2sh_output(entry.name(), config, &tx, &info)?;
        self.register(matched).await
    }

    /// Scans a transaction immediately and posts any match without waiting
    /// for the background loops.
    pub async fn scan_now(&self, chain: &str, txid: &str) -> Result<ScanReport, SwapscanError> {
        self.register_candidate(chain, txid).await?;
        let candidate = SwapCandidate::new(chain, txid);
        let outcome = self.scanner.scan_candidate(&candidate).await?;

        let relay = match &outcome {
            CandidateOutcome::Matched(matched) => {
                let key = matched.key();
                let pending = self
                    .store
                    .find_swaps_by_txid(key.txid())
                    .await?
                    .into_iter()
                    .find(|swap| swap.key == key && !swap.status.is_final());
                match pending {
                    Some(swap) => self.poster.post(&swap).await?,
                    None => None,
                }
            }
            _ => None,
        };
        Ok(ScanReport { outcome, relay })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txid_formats() {
        let evm = format!("0x{}", "ab".repeat(32));
        assert!(is_evm_txid(&evm));
        assert!(!is_evm_txid(&evm[2..]));
        assert!(!is_evm_txid("0x1234"));
        assert!(!is_evm_txid(&format!("0x{}", "zz".repeat(32))));

        assert!(is_utxo_txid(&"cd".repeat(32)));
        assert!(!is_utxo_txid(&evm));
    }
}
