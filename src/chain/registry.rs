// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use super::{AlloyChainClient, EsploraClient, EvmChainClient, UtxoChainClient};
use crate::config::{ChainConfig, TokensConfig};
use crate::errors::{RpcError, SwapscanError};
use crate::p2sh::P2shAddressRegistry;
use crate::types::ChainFamily;

/// Client for one chain, by family.
#[derive(Clone)]
pub enum ChainBackend {
    Evm(Arc<dyn EvmChainClient>),
    Utxo(Arc<dyn UtxoChainClient>),
}

impl std::fmt::Debug for ChainBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainBackend::Evm(_) => f.write_str("ChainBackend::Evm"),
            ChainBackend::Utxo(_) => f.write_str("ChainBackend::Utxo"),
        }
    }
}

/// Everything the relay knows about one chain.
#[derive(Debug)]
pub struct ChainEntry {
    pub config: ChainConfig,
    pub backend: ChainBackend,
    /// Present when the chain accepts P2SH-bound deposits
    pub p2sh: Option<Arc<P2shAddressRegistry>>,
}

impl ChainEntry {
    pub fn new(config: ChainConfig, backend: ChainBackend) -> Result<Self, SwapscanError> {
        let p2sh = config
            .p2sh
            .as_ref()
            .map(|p2sh| P2shAddressRegistry::new(&p2sh.deposit_address, p2sh.network).map(Arc::new))
            .transpose()?;
        Ok(Self {
            config,
            backend,
            p2sh,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn evm(&self) -> Option<&Arc<dyn EvmChainClient>> {
        match &self.backend {
            ChainBackend::Evm(client) => Some(client),
            ChainBackend::Utxo(_) => None,
        }
    }

    pub fn utxo(&self) -> Option<&Arc<dyn UtxoChainClient>> {
        match &self.backend {
            ChainBackend::Utxo(client) => Some(client),
            ChainBackend::Evm(_) => None,
        }
    }
}

/// Chain entries by name, built once at startup and shared read-only.
#[derive(Debug, Default, Clone)]
pub struct ChainRegistry {
    chains: BTreeMap<String, Arc<ChainEntry>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a client for every configured chain.
    ///
    /// # Errors
    ///
    /// Fails if an EVM chain has no usable RPC URL, a UTXO chain has no API
    /// URL, or a P2SH deposit address does not decode.
    pub fn connect(
        tokens: &TokensConfig,
        requests_per_second: Option<u32>,
    ) -> Result<Self, SwapscanError> {
        let mut registry = Self::new();
        for chain in &tokens.chains {
            let backend = match chain.family {
                ChainFamily::Evm => ChainBackend::Evm(Arc::new(AlloyChainClient::connect(
                    &chain.name,
                    &chain.rpc_urls,
                    requests_per_second,
                )?)),
                ChainFamily::Utxo => {
                    let api_url = chain.api_url.as_deref().ok_or_else(|| RpcError::NoEndpoint {
                        chain: chain.name.clone(),
                    })?;
                    ChainBackend::Utxo(Arc::new(EsploraClient::new(api_url)?))
                }
            };
            info!(
                chain = %chain.name,
                family = ?chain.family,
                pairs = chain.pairs.len(),
                p2sh = chain.p2sh.is_some(),
                "Registered chain"
            );
            registry.insert(ChainEntry::new(chain.clone(), backend)?);
        }
        Ok(registry)
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, entry: ChainEntry) {
        self.chains.insert(entry.config.name.clone(), Arc::new(entry));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ChainEntry>> {
        self.chains.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
