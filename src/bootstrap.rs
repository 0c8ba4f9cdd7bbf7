// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Binary entry point: configuration, wiring and worker lifecycle

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::chain::ChainRegistry;
use crate::config::{ServerConfig, TokensConfig};
use crate::relay::{JsonRpcRelayClient, RelayPoster};
use crate::scan::ScanOrchestrator;
use crate::store::{JsonFileSwapStore, MemorySwapStore, SwapStore};
use crate::worker::{spawn_workers, Shutdown};

const LOG_JSON_ENV: &str = "SWAPSCAN_LOG_JSON";

/// Installs the global tracing subscriber.
///
/// Filtering follows `RUST_LOG` (default `info`). Output is JSON when
/// `SWAPSCAN_LOG_JSON=true`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = dotenvy::var(LOG_JSON_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("true"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn open_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn SwapStore>> {
    let store: Arc<dyn SwapStore> = match &config.store_path {
        Some(path) => Arc::new(
            JsonFileSwapStore::open(path.clone())
                .await
                .with_context(|| format!("opening store {}", path.display()))?,
        ),
        None => Arc::new(MemorySwapStore::new()),
    };
    Ok(store)
}

/// Runs the relay until ctrl-c.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env().context("loading server config")?;
    let tokens = TokensConfig::load_dir(&config.tokens_dir)
        .with_context(|| format!("loading token configs from {}", config.tokens_dir.display()))?;
    let registry = Arc::new(
        ChainRegistry::connect(&tokens, config.rpc_requests_per_second)
            .context("connecting chain clients")?,
    );

    let store = open_store(&config).await?;
    let requeued = store.requeue_retryable().await?;
    info!(
        chains = registry.len(),
        store = store.name(),
        requeued,
        "Swap relay starting"
    );

    let scanner = Arc::new(ScanOrchestrator::new(registry, store.clone(), &config));
    let transport = Arc::new(
        JsonRpcRelayClient::new(config.relay_timeout).context("building relay client")?,
    );
    let poster = Arc::new(RelayPoster::new(transport, store, &config));

    let shutdown = Shutdown::new();
    let workers = spawn_workers(
        scanner,
        poster,
        config.scan_interval,
        config.relay_interval,
        &shutdown,
    );

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    info!("Shutdown requested");
    shutdown.trigger();
    workers.join().await;
    info!("Swap relay stopped");
    Ok(())
}
