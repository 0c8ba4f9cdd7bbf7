// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for the swap relay
//!
//! Two layers:
//!
//! - [`ServerConfig`]: poll intervals, batch sizes, retry budgets and
//!   file locations, with defaults, a builder and `SWAPSCAN_*` env overrides
//! - [`tokens::TokensConfig`]: per-chain TOML files describing token pairs
//!
//! # Example: custom configuration
//!
//! ```rust
//! use swapscan::ServerConfigBuilder;
//! use std::time::Duration;
//!
//! let config = ServerConfigBuilder::new()
//!     .batch_size(20)
//!     .relay_retry_count(5)
//!     .relay_retry_delay(Duration::from_millis(500))
//!     .build();
//! assert_eq!(config.batch_size, 20);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;

pub mod constants;
pub mod tokens;

pub use tokens::{ChainConfig, P2shConfig, SwapTarget, TokenPairConfig, TokenRef, TokensConfig};

/// Runtime settings of the scan and relay loops.
///
/// Use [`ServerConfigBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Sleep between scan polls
    /// Default: 3 seconds
    pub scan_interval: Duration,

    /// Sleep between relay polls
    /// Default: 1 second
    pub relay_interval: Duration,

    /// Items pulled from the store per poll
    /// Default: 10
    pub batch_size: usize,

    /// Items processed concurrently within one batch
    /// Default: 10
    pub max_concurrency: usize,

    /// Transaction lookups before a candidate is marked not found
    /// Default: 5
    pub tx_lookup_attempts: usize,

    /// Receipt lookups before a receipt is treated as unavailable
    /// Default: 5
    pub receipt_lookup_attempts: usize,

    /// Sleep between chain lookup attempts
    /// Default: 1 second
    pub rpc_interval: Duration,

    /// Delivery attempts per relay pass
    /// Default: 3
    pub relay_retry_count: usize,

    /// Sleep between delivery attempts
    /// Default: 1 second
    pub relay_retry_delay: Duration,

    /// Deadline for one remote relay call
    /// Default: 300 seconds
    pub relay_timeout: Duration,

    /// Capacity of the in-memory retry cache
    /// Default: 100
    pub retry_cache_capacity: usize,

    /// Outgoing chain RPC requests per second, per endpoint
    /// Default: None (unlimited)
    pub rpc_requests_per_second: Option<u32>,

    /// Directory holding one TOML file per chain
    /// Default: `./tokens`
    pub tokens_dir: PathBuf,

    /// JSON store file; `None` keeps state in memory
    /// Default: None
    pub store_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(3),
            relay_interval: Duration::from_secs(1),
            batch_size: 10,
            max_concurrency: 10,
            tx_lookup_attempts: 5,
            receipt_lookup_attempts: 5,
            rpc_interval: Duration::from_secs(1),
            relay_retry_count: 3,
            relay_retry_delay: Duration::from_secs(1),
            relay_timeout: Duration::from_secs(300),
            retry_cache_capacity: 100,
            rpc_requests_per_second: None,
            tokens_dir: PathBuf::from("tokens"),
            store_path: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `SWAPSCAN_*` environment variables.
    ///
    /// Durations are given in milliseconds. Unset variables keep the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ServerConfigBuilder::new();

        if let Some(ms) = parse_var::<u64>(&lookup, "SWAPSCAN_SCAN_INTERVAL_MS")? {
            builder = builder.scan_interval(Duration::from_millis(ms));
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "SWAPSCAN_RELAY_INTERVAL_MS")? {
            builder = builder.relay_interval(Duration::from_millis(ms));
        }
        if let Some(n) = parse_var(&lookup, "SWAPSCAN_BATCH_SIZE")? {
            builder = builder.batch_size(n);
        }
        if let Some(n) = parse_var(&lookup, "SWAPSCAN_MAX_CONCURRENCY")? {
            builder = builder.max_concurrency(n);
        }
        if let Some(n) = parse_var(&lookup, "SWAPSCAN_TX_LOOKUP_ATTEMPTS")? {
            builder = builder.tx_lookup_attempts(n);
        }
        if let Some(n) = parse_var(&lookup, "SWAPSCAN_RECEIPT_LOOKUP_ATTEMPTS")? {
            builder = builder.receipt_lookup_attempts(n);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "SWAPSCAN_RPC_INTERVAL_MS")? {
            builder = builder.rpc_interval(Duration::from_millis(ms));
        }
        if let Some(n) = parse_var(&lookup, "SWAPSCAN_RELAY_RETRY_COUNT")? {
            builder = builder.relay_retry_count(n);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "SWAPSCAN_RELAY_RETRY_DELAY_MS")? {
            builder = builder.relay_retry_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "SWAPSCAN_RELAY_TIMEOUT_MS")? {
            builder = builder.relay_timeout(Duration::from_millis(ms));
        }
        if let Some(n) = parse_var(&lookup, "SWAPSCAN_RETRY_CACHE_CAPACITY")? {
            builder = builder.retry_cache_capacity(n);
        }
        if let Some(rps) = parse_var(&lookup, "SWAPSCAN_RPC_REQUESTS_PER_SECOND")? {
            builder = builder.rpc_requests_per_second(rps);
        }
        if let Some(dir) = lookup("SWAPSCAN_TOKENS_DIR") {
            builder = builder.tokens_dir(dir);
        }
        if let Some(path) = lookup("SWAPSCAN_STORE_PATH") {
            builder = builder.store_path(path);
        }

        Ok(builder.build())
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                name: name.to_string(),
                value,
            }),
    }
}

/// Builder for [`ServerConfig`]
///
/// Zero values for counts are raised to one so loops always make progress.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan_interval(mut self, interval: Duration) -> Self {
        self.config.scan_interval = interval;
        self
    }

    pub fn relay_interval(mut self, interval: Duration) -> Self {
        self.config.relay_interval = interval;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size.max(1);
        self
    }

    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.config.max_concurrency = limit.max(1);
        self
    }

    pub fn tx_lookup_attempts(mut self, attempts: usize) -> Self {
        self.config.tx_lookup_attempts = attempts.max(1);
        self
    }

    pub fn receipt_lookup_attempts(mut self, attempts: usize) -> Self {
        self.config.receipt_lookup_attempts = attempts.max(1);
        self
    }

    pub fn rpc_interval(mut self, interval: Duration) -> Self {
        self.config.rpc_interval = interval;
        self
    }

    pub fn relay_retry_count(mut self, count: usize) -> Self {
        self.config.relay_retry_count = count.max(1);
        self
    }

    pub fn relay_retry_delay(mut self, delay: Duration) -> Self {
        self.config.relay_retry_delay = delay;
        self
    }

    pub fn relay_timeout(mut self, timeout: Duration) -> Self {
        self.config.relay_timeout = timeout;
        self
    }

    pub fn retry_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.retry_cache_capacity = capacity.max(1);
        self
    }

    pub fn rpc_requests_per_second(mut self, rps: u32) -> Self {
        self.config.rpc_requests_per_second = Some(rps).filter(|rps| *rps > 0);
        self
    }

    pub fn tokens_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.tokens_dir = dir.into();
        self
    }

    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store_path = Some(path.into());
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}
