// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # swapscan
//!
//! Cross-chain swap relay. Transactions submitted as candidates are looked up
//! on their source chain, classified against per-chain token pair
//! configuration, recorded exactly once, and posted to the pair's swap
//! server with bounded retries.
//!
//! ## Pipeline
//!
//! ```text
//! SwapStore ──candidates──▶ ScanOrchestrator ──▶ TransactionClassifier
//!     ▲                         │  (chain clients)         │
//!     │                         ▼                          ▼
//!     └──────── RegisteredSwap ◀──────────── SwapMatch
//!                    │
//!                    ▼
//!               RelayPoster ──JSON-RPC──▶ swap server
//!                    │
//!                    └──▶ RetryCache (bounded, in memory)
//! ```
//!
//! Bitcoin-family deposits bound to an EVM address through a P2SH script are
//! handled by [`p2sh`] and [`service::SwapService::p2sh_swapin`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use swapscan::{ChainRegistry, MemorySwapStore, ScanOrchestrator, ServerConfig, TokensConfig};
//!
//! let config = ServerConfig::default();
//! let tokens = TokensConfig::load_dir(&config.tokens_dir)?;
//! let registry = Arc::new(ChainRegistry::connect(&tokens, None)?);
//! let store = Arc::new(MemorySwapStore::new());
//! let scanner = ScanOrchestrator::new(registry, store, &config);
//! let pass = scanner.run_once().await?;
//! ```

pub mod bootstrap;
pub mod chain;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod events;
pub mod p2sh;
pub mod relay;
pub mod scan;
pub mod service;
mod spans;
pub mod store;
pub mod transport;
pub mod types;
pub mod worker;

pub use chain::{ChainBackend, ChainEntry, ChainRegistry, EvmChainClient, UtxoChainClient};
pub use classifier::TransactionClassifier;
pub use config::{ServerConfig, ServerConfigBuilder, TokensConfig};
pub use errors::{Rejection, SwapscanError};
pub use p2sh::{P2shAddressInfo, P2shAddressRegistry};
pub use relay::{RelayOutcome, RelayPoster, RelayTransport};
pub use scan::{CandidateOutcome, ScanOrchestrator};
pub use service::SwapService;
pub use store::{JsonFileSwapStore, MemorySwapStore, SwapStore};
pub use types::{RegisteredSwap, SwapCandidate, SwapKey, SwapKind, SwapMatch, SwapStatus};
pub use worker::{spawn_workers, Shutdown};
