// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span creation helpers for pipeline stages.
//!
//! Telemetry stays out of business logic: each instrumented stage has a span
//! helper here, attached with `tracing::Instrument` so spans survive awaits.
//!
//! Usage pattern:
//! ```rust,ignore
//! async fn scan_candidate(&self, candidate: &SwapCandidate) -> Outcome {
//!     async { /* business logic */ }
//!         .instrument(spans::scan_candidate(&candidate.chain, &candidate.txid))
//!         .await
//! }
//! ```

use tracing::{Level, Span};

use crate::types::SwapKey;

/// Span for one scan poll.
///
/// Parent: None (root span for a poll)
/// Children: scan_candidate spans (one per candidate)
#[inline]
pub(crate) fn scan_batch(batch_size: usize) -> Span {
    tracing::span!(Level::INFO, "swapscan.scan_batch", batch_size = batch_size)
}

/// Span for resolving and classifying one candidate.
///
/// Parent: scan_batch span
/// Children: classify_pair spans, chain RPC calls
#[inline]
pub(crate) fn scan_candidate(chain: &str, txid: &str) -> Span {
    tracing::debug_span!("swapscan.scan_candidate", chain = %chain, txid = %txid)
}

/// Span for classifying a transaction against one token pair.
///
/// Parent: scan_candidate span
#[inline]
pub(crate) fn classify_pair(kind: &str, pair: &str) -> Span {
    tracing::trace_span!("swapscan.classify_pair", kind = %kind, pair = %pair)
}

/// Span for relaying one registered swap.
///
/// Parent: relay poll or drain_retry_cache span
/// Children: remote relay calls
#[inline]
pub(crate) fn post_swap(key: &SwapKey, method: &str) -> Span {
    tracing::debug_span!("swapscan.post_swap", key = %key, method = %method)
}

/// Span for re-attempting items from the retry cache.
///
/// Parent: None (root span for a drain pass)
/// Children: post_swap spans
#[inline]
pub(crate) fn drain_retry_cache(entries: usize) -> Span {
    tracing::span!(Level::INFO, "swapscan.drain_retry_cache", entries = entries)
}

/// Span for deriving a P2SH address from a bind address.
#[inline]
pub(crate) fn derive_p2sh(bind: &str) -> Span {
    tracing::trace_span!("swapscan.derive_p2sh", bind = %bind)
}
