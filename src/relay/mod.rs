// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Relaying registered swaps to swap servers
//!
//! - [`RelayPoster`]: posts with a fixed retry budget and records outcomes
//! - [`outcome`]: maps swap server replies onto [`RelayOutcome`]
//! - [`RelayTransport`] / [`JsonRpcRelayClient`]: the remote call itself
//! - [`RetryCache`]: bounded ring of posts that exhausted their retries

mod args;
mod client;
pub mod outcome;
mod poster;
mod retry_cache;

pub use args::RelayArgs;
pub use client::{JsonRpcRelayClient, RelayTransport};
pub use outcome::{classify_failure, classify_status, RelayOutcome, RetryKind};
pub use poster::{decode_router_result, RelayPass, RelayPoster};
pub use retry_cache::{CachedPost, RetryCache, RingBuffer};
