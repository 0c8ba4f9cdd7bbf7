// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Background scan and relay loops

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::relay::RelayPoster;
use crate::scan::ScanOrchestrator;

/// Cooperative stop signal shared by the worker loops.
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Sleeps for `duration`, returning early with `true` if shutdown fires.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_triggered() {
            return true;
        }
        let stopped = tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.receiver.wait_for(|stopped| *stopped) => true,
        };
        stopped || self.is_triggered()
    }
}

/// Handles of the running loops.
#[derive(Debug)]
pub struct Workers {
    pub scan: JoinHandle<()>,
    pub relay: JoinHandle<()>,
}

impl Workers {
    /// Waits for both loops to finish.
    pub async fn join(self) {
        for (name, handle) in [("scan", self.scan), ("relay", self.relay)] {
            if let Err(e) = handle.await {
                error!(worker = name, error = %e, "Worker task panicked");
            }
        }
    }
}

/// Runs scan passes until shutdown, sleeping `interval` between passes.
pub async fn scan_loop(scanner: Arc<ScanOrchestrator>, interval: Duration, mut shutdown: Shutdown) {
    info!(interval_ms = interval.as_millis() as u64, "Scan loop started");
    while !shutdown.is_triggered() {
        if let Err(e) = scanner.run_once().await {
            error!(error = %e, "Scan pass failed");
        }
        if shutdown.sleep(interval).await {
            break;
        }
    }
    info!("Scan loop stopped");
}

/// Runs relay passes until shutdown, sleeping `interval` between passes.
pub async fn relay_loop(poster: Arc<RelayPoster>, interval: Duration, mut shutdown: Shutdown) {
    info!(interval_ms = interval.as_millis() as u64, "Relay loop started");
    while !shutdown.is_triggered() {
        if let Err(e) = poster.run_once().await {
            error!(error = %e, "Relay pass failed");
        }
        if shutdown.sleep(interval).await {
            break;
        }
    }
    info!("Relay loop stopped");
}

/// Spawns the scan and relay loops on the current runtime.
pub fn spawn_workers(
    scanner: Arc<ScanOrchestrator>,
    poster: Arc<RelayPoster>,
    scan_interval: Duration,
    relay_interval: Duration,
    shutdown: &Shutdown,
) -> Workers {
    Workers {
        scan: tokio::spawn(scan_loop(scanner, scan_interval, shutdown.clone())),
        relay: tokio::spawn(relay_loop(poster, relay_interval, shutdown.clone())),
    }
}
