// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Request-level operations of the swap service

mod helpers;

use std::sync::Arc;

use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use helpers::*;
use serde_json::Value;
use swapscan::errors::{P2shError, RpcError};
use swapscan::events::transferCall;
use swapscan::store::UpsertOutcome;
use swapscan::types::{
    CandidateStatus, RelayMethod, SwapKey, SwapStatus, UtxoOutput, UtxoTransaction,
};
use swapscan::{
    CandidateOutcome, MemorySwapStore, Rejection, RelayOutcome, RelayPoster, ScanOrchestrator,
    SwapService, SwapscanError,
};

const BIND: &str = "0x7cda1b5f2cbb8d5d8c2b11bd93dd1bab7ee6fb5c";
const BIND_P2SH: &str = "3341vcpFdMTz6EhBc4dpMqAaHP1Frza4JP";

struct Harness {
    service: SwapService,
    transport: Arc<ScriptedRelayTransport>,
}

fn harness(evm: FakeEvmChain, utxo: FakeUtxoChain) -> Harness {
    let registry = registry(Arc::new(evm), Some(Arc::new(utxo)));
    let store = Arc::new(MemorySwapStore::new());
    let config = fast_config();
    let transport = Arc::new(ScriptedRelayTransport::always(Ok(Value::Null)));
    let scanner = Arc::new(ScanOrchestrator::new(registry.clone(), store.clone(), &config));
    let poster = Arc::new(RelayPoster::new(transport.clone(), store.clone(), &config));
    Harness {
        service: SwapService::new(registry, store, scanner, poster),
        transport,
    }
}

fn empty() -> Harness {
    harness(FakeEvmChain::new(), FakeUtxoChain::default())
}

fn utxo_txid(n: u8) -> String {
    format!("{:064x}", n)
}

fn paying(txid: &str, address: &str) -> UtxoTransaction {
    UtxoTransaction {
        txid: txid.to_string(),
        outputs: vec![
            UtxoOutput {
                address: Some("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH".to_string()),
                value: 1_000,
            },
            UtxoOutput {
                address: Some(address.to_string()),
                value: 50_000,
            },
        ],
        confirmed: true,
    }
}

#[tokio::test]
async fn register_candidate_validates_chain_and_hash() {
    let h = empty();

    assert!(matches!(
        h.service.register_candidate("bsc", &txid(1)).await,
        Err(SwapscanError::UnsupportedChain(_))
    ));
    assert!(matches!(
        h.service.register_candidate("btc", &txid(1)).await,
        Err(SwapscanError::UnsupportedChain(_))
    ));
    assert!(matches!(
        h.service.register_candidate("eth", "0x1234").await,
        Err(SwapscanError::InvalidArgument(_))
    ));

    assert!(h.service.register_candidate("ETH", &txid(1)).await.unwrap());
    assert!(!h
        .service
        .register_candidate("eth", &txid(1).to_uppercase().replace("0X", "0x"))
        .await
        .unwrap());

    let report = h.service.swap_status("eth", &txid(1)).await.unwrap();
    assert_eq!(report.candidate.unwrap().status, CandidateStatus::Pending);
    assert!(report.swaps.is_empty());
}

#[tokio::test]
async fn direct_bridge_registration_is_idempotent() {
    let h = empty();

    let first = h.service.register_bridge_swap("eth", &txid(2), "USDC").await.unwrap();
    assert_eq!(first.key, SwapKey::bridge(&txid(2)));
    assert_eq!(first.outcome, UpsertOutcome::Inserted);

    let second = h.service.register_bridge_swap("eth", &txid(2), "usdc").await.unwrap();
    assert_eq!(second.outcome, UpsertOutcome::Existing);

    assert!(matches!(
        h.service.register_bridge_swap("eth", &txid(2), "dai").await,
        Err(SwapscanError::InvalidArgument(_))
    ));

    let report = h.service.swap_status("eth", &txid(2)).await.unwrap();
    assert!(report.candidate.is_none());
    assert_eq!(report.swaps.len(), 1);
    assert_eq!(report.swaps[0].pair_id.as_deref(), Some("usdc"));
    assert_eq!(report.swaps[0].status, SwapStatus::Pending);
}

#[tokio::test]
async fn direct_router_registration_keys_by_log() {
    let h = empty();

    let reg = h.service.register_router_swap("eth", 56, &txid(3), 4).await.unwrap();
    assert_eq!(reg.key, SwapKey::router(56, &txid(3), 4));
    assert_eq!(reg.outcome, UpsertOutcome::Inserted);

    let other_log = h.service.register_router_swap("eth", 56, &txid(3), 5).await.unwrap();
    assert_eq!(other_log.outcome, UpsertOutcome::Inserted);

    assert!(matches!(
        h.service.register_router_swap("eth", 1, &txid(3), 4).await,
        Err(SwapscanError::InvalidArgument(_))
    ));

    let swaps = h.service.swap_status("eth", &txid(3)).await.unwrap().swaps;
    assert_eq!(swaps.len(), 2);
    assert!(swaps.iter().all(|s| s.method == RelayMethod::RouterSwap));
}

#[tokio::test]
async fn p2sh_address_is_derived_and_recalled() {
    let h = empty();

    let info = h.service.register_p2sh_address("btc", BIND).await.unwrap();
    assert_eq!(info.p2sh_address, BIND_P2SH);
    assert_eq!(info.bind_address, BIND);

    let recalled = h.service.p2sh_address_info("btc", BIND_P2SH).await.unwrap();
    assert_eq!(recalled.redeem_script, info.redeem_script);

    assert!(matches!(
        h.service.p2sh_address_info("btc", "3Jy1r7aEGvzRXeEMtsWZ7fXXF7Mf5AuWyQ").await,
        Err(SwapscanError::P2sh(P2shError::UnknownP2shAddress(_)))
    ));
    assert!(matches!(
        h.service.register_p2sh_address("eth", BIND).await,
        Err(SwapscanError::UnsupportedChain(_))
    ));
}

#[tokio::test]
async fn p2sh_swapin_registers_paying_transaction() {
    let paid = utxo_txid(7);
    let h = harness(
        FakeEvmChain::new(),
        FakeUtxoChain::default().with_transaction(paying(&paid, BIND_P2SH)),
    );

    let reg = h.service.p2sh_swapin("btc", &paid, BIND).await.unwrap();
    assert_eq!(reg.key, SwapKey::bridge(&paid));
    assert_eq!(reg.outcome, UpsertOutcome::Inserted);

    let swaps = h.service.swap_status("btc", &paid).await.unwrap().swaps;
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].method, RelayMethod::P2shSwapin);
    assert_eq!(swaps[0].bind.as_deref(), Some(BIND));
    assert_eq!(swaps[0].pair_id.as_deref(), Some("btc"));
}

#[tokio::test]
async fn p2sh_swapin_rejects_unrelated_or_missing_transactions() {
    let unrelated = utxo_txid(8);
    let h = harness(
        FakeEvmChain::new(),
        FakeUtxoChain::default()
            .with_transaction(paying(&unrelated, "3Jy1r7aEGvzRXeEMtsWZ7fXXF7Mf5AuWyQ")),
    );

    assert!(matches!(
        h.service.p2sh_swapin("btc", &unrelated, BIND).await,
        Err(SwapscanError::Rejected(Rejection::P2shOutputNotFound { .. }))
    ));
    assert!(matches!(
        h.service.p2sh_swapin("btc", &utxo_txid(9), BIND).await,
        Err(SwapscanError::Rpc(RpcError::TransactionNotFound { .. }))
    ));
    assert!(matches!(
        h.service.p2sh_swapin("btc", &txid(9), BIND).await,
        Err(SwapscanError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn p2sh_swapin_waits_for_confirmation() {
    let pending = utxo_txid(6);
    let mut tx = paying(&pending, BIND_P2SH);
    tx.confirmed = false;
    let h = harness(FakeEvmChain::new(), FakeUtxoChain::default().with_transaction(tx));

    assert!(matches!(
        h.service.p2sh_swapin("btc", &pending, BIND).await,
        Err(SwapscanError::Rejected(Rejection::TxNotConfirmed { .. }))
    ));
    assert!(h.service.swap_status("btc", &pending).await.unwrap().swaps.is_empty());
}

#[tokio::test]
async fn scan_now_posts_the_match() {
    let input = transferCall {
        to: DEPOSIT,
        amount: U256::from(10u64),
    }
    .abi_encode();
    let h = harness(
        FakeEvmChain::new().with_transaction(transaction(tx_hash(4), TOKEN, input)),
        FakeUtxoChain::default(),
    );

    let report = h.service.scan_now("eth", &txid(4)).await.unwrap();
    assert!(matches!(report.outcome, CandidateOutcome::Matched(_)));
    assert_eq!(report.relay, Some(RelayOutcome::Success));
    assert_eq!(h.transport.call_count(), 1);

    let status = h.service.swap_status("eth", &txid(4)).await.unwrap();
    assert_eq!(status.candidate.unwrap().status, CandidateStatus::Resolved);
    assert_eq!(status.swaps[0].status, SwapStatus::Success);

    let again = h.service.scan_now("eth", &txid(4)).await.unwrap();
    assert_eq!(again.relay, None);
    assert_eq!(h.transport.call_count(), 1);
}

#[tokio::test]
async fn scan_now_reports_rejections_without_posting() {
    let h = harness(
        FakeEvmChain::new().with_transaction(transaction(tx_hash(5), OTHER, Vec::new())),
        FakeUtxoChain::default(),
    );

    let report = h.service.scan_now("eth", &txid(5)).await.unwrap();
    assert!(matches!(
        report.outcome,
        CandidateOutcome::Rejected(Some(Rejection::WrongReceiver { .. }))
    ));
    assert_eq!(report.relay, None);
    assert_eq!(h.transport.call_count(), 0);
}
