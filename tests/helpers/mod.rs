// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for swapscan integration tests
//!
//! In-memory chain clients and a scripted swap server transport, so the scan
//! and relay pipelines can run without network access.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{address, Address, Bytes, LogData, TxHash, B256};
use alloy_rpc_types::Log;
use async_trait::async_trait;
use serde_json::Value;
use swapscan::chain::{ChainBackend, ChainEntry, ChainRegistry, EvmChainClient, UtxoChainClient};
use swapscan::errors::{RemoteFailure, RpcError};
use swapscan::types::{SwapReceipt, SwapTransaction, UtxoTransaction};
use swapscan::{RelayTransport, ServerConfig, ServerConfigBuilder, TokensConfig};

pub const SWAP_SERVER: &str = "http://swap.local/rpc";

/// EVM chain config: a token swap-in (`0xaaa` → `0xbbb`), a native swap-in to
/// the same deposit, and an ERC20 router at `0xddd` bridging to chain 56.
pub const ETH_CHAIN: &str = r#"
[chain]
name = "ETH"
family = "evm"
rpc_urls = ["http://localhost:8545"]

[[tokens]]
tx_type = "swapin"
swap_server = "http://swap.local/rpc"
pair_id = "usdc"
token_address = "0x0000000000000000000000000000000000000aaa"
deposit_address = "0x0000000000000000000000000000000000000bbb"

[[tokens]]
tx_type = "swapin"
swap_server = "http://swap.local/rpc"
pair_id = "eth"
token_address = "native"
deposit_address = "0x0000000000000000000000000000000000000bbb"

[[tokens]]
tx_type = "routerswap"
swap_server = "http://swap.local/rpc"
router_contract = "0x0000000000000000000000000000000000000ddd"
chain_id = "56"
"#;

pub const BTC_CHAIN: &str = r#"
[chain]
name = "BTC"
family = "utxo"
api_url = "https://esplora.local/api"
network = "mainnet"

[p2sh]
pair_id = "btc"
deposit_address = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"
swap_server = "http://swap.local/rpc"
"#;

pub const TOKEN: Address = address!("0000000000000000000000000000000000000aaa");
pub const DEPOSIT: Address = address!("0000000000000000000000000000000000000bbb");
pub const OTHER: Address = address!("0000000000000000000000000000000000000ccc");
pub const ROUTER: Address = address!("0000000000000000000000000000000000000ddd");

/// Deterministic transaction hash ending in `n`.
pub fn tx_hash(n: u8) -> TxHash {
    let mut bytes = [0u8; 32];
    bytes[31] = n;
    B256::new(bytes)
}

/// Lowercase `0x` form of [`tx_hash`].
pub fn txid(n: u8) -> String {
    tx_hash(n).to_string()
}

/// Config with no waiting between attempts.
pub fn fast_config() -> ServerConfig {
    ServerConfigBuilder::new()
        .rpc_interval(Duration::ZERO)
        .relay_retry_delay(Duration::ZERO)
        .tx_lookup_attempts(2)
        .receipt_lookup_attempts(2)
        .build()
}

pub fn create_test_log(address: Address, topics: Vec<B256>, data: Vec<u8>, removed: bool) -> Log {
    Log {
        inner: alloy_primitives::Log {
            address,
            data: LogData::new_unchecked(topics, Bytes::from(data)),
        },
        block_hash: Some(B256::ZERO),
        block_number: Some(1),
        block_timestamp: None,
        transaction_hash: None,
        transaction_index: Some(0),
        log_index: None,
        removed,
    }
}

/// Mined transaction from [`OTHER`] to `to`.
pub fn transaction(hash: TxHash, to: Address, input: Vec<u8>) -> SwapTransaction {
    SwapTransaction {
        hash,
        from: OTHER,
        to: Some(to),
        input: Bytes::from(input),
        block_number: Some(100),
    }
}

pub fn receipt(hash: TxHash, logs: Vec<Log>) -> SwapReceipt {
    SwapReceipt {
        transaction_hash: hash,
        status: true,
        logs,
    }
}

/// In-memory EVM chain counting lookups.
#[derive(Debug, Default)]
pub struct FakeEvmChain {
    transactions: Mutex<HashMap<TxHash, SwapTransaction>>,
    receipts: Mutex<HashMap<TxHash, SwapReceipt>>,
    tx_calls: AtomicUsize,
    receipt_calls: AtomicUsize,
}

impl FakeEvmChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transaction(self, tx: SwapTransaction) -> Self {
        self.transactions.lock().unwrap().insert(tx.hash, tx);
        self
    }

    pub fn with_receipt(self, receipt: SwapReceipt) -> Self {
        self.receipts
            .lock()
            .unwrap()
            .insert(receipt.transaction_hash, receipt);
        self
    }

    pub fn tx_calls(&self) -> usize {
        self.tx_calls.load(Ordering::SeqCst)
    }

    pub fn receipt_calls(&self) -> usize {
        self.receipt_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EvmChainClient for FakeEvmChain {
    async fn get_transaction(&self, hash: TxHash) -> Result<Option<SwapTransaction>, RpcError> {
        self.tx_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transactions.lock().unwrap().get(&hash).cloned())
    }

    async fn get_receipt(&self, hash: TxHash) -> Result<Option<SwapReceipt>, RpcError> {
        self.receipt_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.receipts.lock().unwrap().get(&hash).cloned())
    }
}

/// In-memory Bitcoin-family chain.
#[derive(Debug, Default)]
pub struct FakeUtxoChain {
    transactions: Mutex<HashMap<String, UtxoTransaction>>,
}

impl FakeUtxoChain {
    pub fn with_transaction(self, tx: UtxoTransaction) -> Self {
        self.transactions
            .lock()
            .unwrap()
            .insert(tx.txid.clone(), tx);
        self
    }
}

#[async_trait]
impl UtxoChainClient for FakeUtxoChain {
    async fn get_transaction(&self, txid: &str) -> Result<Option<UtxoTransaction>, RpcError> {
        Ok(self.transactions.lock().unwrap().get(txid).cloned())
    }
}

/// Registry with the ETH chain backed by `evm` and, if given, BTC backed by `utxo`.
pub fn registry(evm: Arc<FakeEvmChain>, utxo: Option<Arc<FakeUtxoChain>>) -> Arc<ChainRegistry> {
    let tokens = TokensConfig::from_toml_strs([("eth.toml", ETH_CHAIN), ("btc.toml", BTC_CHAIN)])
        .expect("test chains are valid");
    let mut registry = ChainRegistry::new();
    for chain in tokens.chains {
        let backend = match chain.name.as_str() {
            "eth" => ChainBackend::Evm(evm.clone()),
            _ => match &utxo {
                Some(utxo) => ChainBackend::Utxo(utxo.clone()),
                None => continue,
            },
        };
        registry.insert(ChainEntry::new(chain, backend).expect("valid chain entry"));
    }
    Arc::new(registry)
}

/// A recorded swap server call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub method: &'static str,
    pub params: Value,
}

/// Swap server that replays scripted replies, then repeats the fallback.
#[derive(Debug)]
pub struct ScriptedRelayTransport {
    replies: Mutex<VecDeque<Result<Value, RemoteFailure>>>,
    fallback: Result<Value, RemoteFailure>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRelayTransport {
    /// Answers every call with `fallback`.
    pub fn always(fallback: Result<Value, RemoteFailure>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers with `replies` in order, then with `fallback`.
    pub fn scripted(
        replies: Vec<Result<Value, RemoteFailure>>,
        fallback: Result<Value, RemoteFailure>,
    ) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RelayTransport for ScriptedRelayTransport {
    async fn call(
        &self,
        endpoint: &str,
        method: &'static str,
        params: Value,
    ) -> Result<Value, RemoteFailure> {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: endpoint.to_string(),
            method,
            params,
        });
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}
