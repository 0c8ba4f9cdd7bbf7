// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Bind-address to P2SH derivation
//!
//! A Bitcoin-family bridge shares one key among all depositors. Each
//! depositor gets a distinct P2SH address whose redeem script commits to
//! their destination-chain bind address, so a payment to that address
//! identifies who to credit.
//!
//! [`P2shAddressRegistry`] derives the address once per bind and serves
//! later lookups (by bind or by P2SH address) from its cache.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::P2shError;
use crate::spans;
use crate::types::{address_key, BitcoinNetwork};

pub mod script;

/// Derived P2SH details for a bind address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct P2shAddressInfo {
    /// Lowercase destination-chain address
    pub bind_address: String,
    pub p2sh_address: String,
    /// Redeem script, hex
    pub redeem_script: String,
    pub redeem_script_disasm: String,
}

/// Cached P2SH derivation for one bridge key.
#[derive(Debug)]
pub struct P2shAddressRegistry {
    network: BitcoinNetwork,
    pubkey_hash: [u8; 20],
    by_bind: RwLock<HashMap<String, Arc<P2shAddressInfo>>>,
    by_p2sh: RwLock<HashMap<String, String>>,
}

impl P2shAddressRegistry {
    /// Registry for the bridge whose P2PKH deposit address is `deposit_address`.
    pub fn new(deposit_address: &str, network: BitcoinNetwork) -> Result<Self, P2shError> {
        Ok(Self {
            network,
            pubkey_hash: script::decode_p2pkh(deposit_address, network)?,
            by_bind: RwLock::new(HashMap::new()),
            by_p2sh: RwLock::new(HashMap::new()),
        })
    }

    pub fn network(&self) -> BitcoinNetwork {
        self.network
    }

    /// P2SH details for `bind`, derived on first request and cached after.
    pub async fn derive(&self, bind: &str) -> Result<Arc<P2shAddressInfo>, P2shError> {
        let bind = Address::from_str(bind.trim())
            .map_err(|_| P2shError::InvalidBindAddress(bind.to_string()))?;
        let key = address_key(&bind);

        if let Some(info) = self.by_bind.read().await.get(&key) {
            return Ok(Arc::clone(info));
        }

        let mut by_bind = self.by_bind.write().await;
        // Another task may have derived it while we waited for the lock.
        if let Some(info) = by_bind.get(&key) {
            return Ok(Arc::clone(info));
        }

        let info = spans::derive_p2sh(&key).in_scope(|| {
            let redeem_script = script::redeem_script(bind.as_slice(), &self.pubkey_hash);
            let info = Arc::new(P2shAddressInfo {
                bind_address: key.clone(),
                p2sh_address: script::p2sh_address(&redeem_script, self.network),
                redeem_script: hex::encode(&redeem_script),
                redeem_script_disasm: script::disassemble(&redeem_script),
            });
            debug!(p2sh = %info.p2sh_address, "Derived p2sh address");
            info
        });

        self.by_p2sh
            .write()
            .await
            .insert(info.p2sh_address.clone(), key.clone());
        by_bind.insert(key, Arc::clone(&info));
        Ok(info)
    }

    /// Bind address behind a P2SH address, if it was derived by this registry.
    pub async fn bind_for(&self, p2sh_address: &str) -> Option<String> {
        self.by_p2sh.read().await.get(p2sh_address.trim()).cloned()
    }

    /// Number of cached derivations.
    pub async fn len(&self) -> usize {
        self.by_bind.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.by_bind.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPOSIT: &str = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";
    const BIND: &str = "0x7CDA1B5F2CBB8D5D8C2B11BD93DD1BAB7EE6FB5C";

    #[tokio::test]
    async fn derives_once_per_bind() {
        let registry = P2shAddressRegistry::new(DEPOSIT, BitcoinNetwork::Mainnet).unwrap();
        let first = registry.derive(BIND).await.unwrap();
        let second = registry.derive(&BIND.to_lowercase()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
        assert_eq!(first.p2sh_address, "3341vcpFdMTz6EhBc4dpMqAaHP1Frza4JP");
        assert_eq!(
            first.bind_address,
            "0x7cda1b5f2cbb8d5d8c2b11bd93dd1bab7ee6fb5c"
        );
        assert!(first.redeem_script_disasm.ends_with("OP_EQUALVERIFY OP_CHECKSIG"));
    }

    #[tokio::test]
    async fn reverse_lookup_after_derivation() {
        let registry = P2shAddressRegistry::new(DEPOSIT, BitcoinNetwork::Mainnet).unwrap();
        assert_eq!(registry.bind_for("3341vcpFdMTz6EhBc4dpMqAaHP1Frza4JP").await, None);
        registry.derive(BIND).await.unwrap();
        assert_eq!(
            registry
                .bind_for("3341vcpFdMTz6EhBc4dpMqAaHP1Frza4JP")
                .await
                .as_deref(),
            Some("0x7cda1b5f2cbb8d5d8c2b11bd93dd1bab7ee6fb5c")
        );
    }

    #[tokio::test]
    async fn rejects_non_evm_bind() {
        let registry = P2shAddressRegistry::new(DEPOSIT, BitcoinNetwork::Mainnet).unwrap();
        assert!(matches!(
            registry.derive("bc1qnotanevmaddress").await,
            Err(P2shError::InvalidBindAddress(_))
        ));
        assert!(registry.is_empty().await);
    }
}
