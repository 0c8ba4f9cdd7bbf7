// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transaction classification
//!
//! [`TransactionClassifier`] decides whether a transaction matches a token
//! pair and, if so, produces the [`SwapMatch`] to register. It is pure: the
//! same `(transaction, receipt, pair)` always gives the same answer, and
//! "no match" is an ordinary [`Rejection`] value.
//!
//! Classification is split in two so the caller can decide whether a receipt
//! must be fetched before paying for the lookup:
//!
//! 1. [`TransactionClassifier::accept_destination`] checks where the
//!    transaction went and reports whether a receipt is required.
//! 2. [`TransactionClassifier::classify`] runs the pair's [`Strategy`]
//!    against call data or receipt logs.
//!
//! P2SH-bound swap-ins on Bitcoin-family chains are matched by
//! [`utxo::match_p2sh_output`].

use alloy_primitives::Address;
use tracing::trace;

use crate::config::TokenPairConfig;
use crate::errors::Rejection;
use crate::types::{address_key, SwapMatch, SwapReceipt, SwapTransaction};

mod input;
mod logs;
pub mod strategy;
pub mod utxo;

pub use strategy::{BindEncoding, LogSignature, Strategy};

use logs::DepositLog;

/// How a transaction's destination was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptedBy {
    /// The destination is the pair's comparison address
    Destination,
    /// The destination is on the pair's whitelist
    Whitelist,
}

/// Result of the destination check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acceptance {
    pub accepted_by: AcceptedBy,
    /// The strategy has to look at receipt logs
    pub needs_receipt: bool,
}

/// Stateless classifier for EVM transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionClassifier {
    scan_receipt: bool,
}

impl TransactionClassifier {
    /// Classifier for a chain. With `scan_receipt` every pair classifies from logs.
    pub const fn new(scan_receipt: bool) -> Self {
        Self { scan_receipt }
    }

    /// Address a pair's transactions must target.
    pub fn comparison_address(pair: &TokenPairConfig) -> Address {
        match (&pair.strategy, pair.call_by_contract) {
            (Strategy::TokenSwapin { .. } | Strategy::Swapout { .. }, Some(contract)) => contract,
            (strategy, _) => strategy.destination(),
        }
    }

    /// Checks the transaction's destination against the pair.
    ///
    /// Router pairs, `call_by_contract` pairs and whitelist hits always need
    /// the receipt. Native swap-ins ignore the whitelist.
    pub fn accept_destination(
        &self,
        pair: &TokenPairConfig,
        tx: &SwapTransaction,
    ) -> Result<Acceptance, Rejection> {
        let expected = Self::comparison_address(pair);
        let Some(to) = tx.to else {
            return Err(Rejection::WrongReceiver {
                expected,
                found: None,
            });
        };

        let base_receipt = self.scan_receipt
            || pair.strategy.is_router()
            || (pair.call_by_contract.is_some() && !pair.strategy.is_native());

        if to == expected {
            return Ok(Acceptance {
                accepted_by: AcceptedBy::Destination,
                needs_receipt: base_receipt && !pair.strategy.is_native(),
            });
        }
        if !pair.strategy.is_native() && pair.whitelist.contains(&to) {
            return Ok(Acceptance {
                accepted_by: AcceptedBy::Whitelist,
                needs_receipt: true,
            });
        }
        Err(Rejection::WrongReceiver {
            expected,
            found: Some(to),
        })
    }

    /// Classifies `tx` against `pair`.
    ///
    /// `receipt` should be the transaction's receipt when
    /// [`Acceptance::needs_receipt`] is set, and `None` otherwise. A pair that
    /// needs a receipt and gets none is rejected with `ReceiptUnavailable`.
    pub fn classify(
        &self,
        chain: &str,
        pair: &TokenPairConfig,
        tx: &SwapTransaction,
        receipt: Option<&SwapReceipt>,
    ) -> Result<SwapMatch, Rejection> {
        let acceptance = self.accept_destination(pair, tx)?;
        let receipt = match receipt {
            Some(receipt) if !receipt.status => {
                return Err(Rejection::receipt_unavailable("transaction execution failed"));
            }
            Some(receipt) => Some(receipt),
            None if acceptance.needs_receipt => {
                return Err(Rejection::receipt_unavailable("receipt required but not provided"));
            }
            None => None,
        };

        let tx_to = tx.to.map(|to| address_key(&to)).unwrap_or_default();
        let mut matched = SwapMatch {
            chain: chain.to_string(),
            txid: tx.hash.to_string().to_ascii_lowercase(),
            kind: pair.kind,
            method: pair.kind.relay_method(),
            tx_to,
            bind: None,
            pair_id: pair.pair_id().map(str::to_string),
            chain_id: pair.chain_id(),
            log_index: None,
            swap_server: pair.swap_server.clone(),
        };

        match &pair.strategy {
            Strategy::NativeSwapin { deposit } => {
                matched.bind = Some(address_key(deposit));
            }
            Strategy::TokenSwapin {
                token,
                deposit,
                log,
            } => {
                let receiver = match receipt {
                    None => {
                        let recipient = input::erc20_recipient(&tx.input)?;
                        if recipient != *deposit {
                            return Err(Rejection::WrongReceiver {
                                expected: *deposit,
                                found: Some(recipient),
                            });
                        }
                        recipient
                    }
                    Some(receipt) => match logs::find_deposit(&receipt.logs, *token, *log, *deposit) {
                        DepositLog::Found(receiver) => receiver,
                        DepositLog::WrongReceiver(found) => {
                            return Err(Rejection::WrongReceiver {
                                expected: *deposit,
                                found: Some(found),
                            });
                        }
                        DepositLog::Missing => return Err(Rejection::DepositLogNotFound),
                    },
                };
                matched.bind = Some(address_key(&receiver));
            }
            Strategy::Swapout {
                token,
                selector,
                log,
                bind,
            } => {
                matched.bind = match receipt {
                    None => {
                        let found = input::selector(&tx.input)?;
                        if found != *selector {
                            return Err(Rejection::FuncHashMismatch { selector: found });
                        }
                        input::swapout_bind(&tx.input, *bind)
                    }
                    Some(receipt) => logs::find_swapout(&receipt.logs, *token, *log, *bind)
                        .ok_or(Rejection::SwapoutLogNotFound)?,
                };
            }
            Strategy::Router { router, topics } => {
                let receipt = receipt.ok_or_else(|| {
                    Rejection::receipt_unavailable("router swaps are classified from logs")
                })?;
                let index = logs::find_router_log(&receipt.logs, *router, topics)
                    .ok_or(Rejection::RouterLogNotFound)?;
                matched.log_index = Some(index as u64);
            }
        }

        trace!(chain, txid = %matched.txid, kind = %pair.kind, "Transaction classified");
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, Bytes, LogData, B256, U256};
    use alloy_rpc_types::Log;
    use alloy_sol_types::SolCall;

    use crate::config::constants::topics;
    use crate::config::{SwapTarget, TokenRef};
    use crate::events::{address_bind, transferCall};
    use crate::types::SwapKind;

    const TOKEN: Address = address!("0000000000000000000000000000000000000aaa");
    const DEPOSIT: Address = address!("0000000000000000000000000000000000000bbb");
    const OTHER: Address = address!("0000000000000000000000000000000000000ccc");
    const ROUTER: Address = address!("0000000000000000000000000000000000000ddd");
    const TX: B256 = b256!("00000000000000000000000000000000000000000000000000000000000000ab");

    fn bridge_pair(kind: SwapKind) -> TokenPairConfig {
        TokenPairConfig {
            kind,
            swap_server: "http://swap".to_string(),
            whitelist: vec![],
            call_by_contract: None,
            target: SwapTarget::Bridge {
                pair_id: "usdc".to_string(),
                token: TokenRef::Contract(TOKEN),
                deposit_address: Some(DEPOSIT),
            },
            strategy: Strategy::bridge(kind, Some(TOKEN), Some(DEPOSIT)).unwrap(),
        }
    }

    fn router_pair(kind: SwapKind) -> TokenPairConfig {
        TokenPairConfig {
            kind,
            swap_server: "http://swap".to_string(),
            whitelist: vec![],
            call_by_contract: None,
            target: SwapTarget::Router {
                chain_id: 56,
                router_contract: ROUTER,
            },
            strategy: Strategy::router(kind, ROUTER).unwrap(),
        }
    }

    fn tx(to: Address, input: Vec<u8>) -> SwapTransaction {
        SwapTransaction {
            hash: TX,
            from: OTHER,
            to: Some(to),
            input: Bytes::from(input),
            block_number: Some(1),
        }
    }

    fn log(address: Address, topics: Vec<B256>, removed: bool) -> Log {
        Log {
            inner: alloy_primitives::Log {
                address,
                data: LogData::new_unchecked(topics, Bytes::from(vec![0u8; 32])),
            },
            block_hash: Some(B256::ZERO),
            block_number: Some(1),
            block_timestamp: None,
            transaction_hash: Some(TX),
            transaction_index: Some(0),
            log_index: Some(0),
            removed,
        }
    }

    fn receipt(logs: Vec<Log>) -> SwapReceipt {
        SwapReceipt {
            transaction_hash: TX,
            status: true,
            logs,
        }
    }

    fn transfer_input(to: Address) -> Vec<u8> {
        transferCall {
            to,
            amount: U256::from(10),
        }
        .abi_encode()
    }

    #[test]
    fn token_swapin_from_call_data() {
        let classifier = TransactionClassifier::default();
        let pair = bridge_pair(SwapKind::Swapin);
        let tx = tx(TOKEN, transfer_input(DEPOSIT));

        let acceptance = classifier.accept_destination(&pair, &tx).unwrap();
        assert!(!acceptance.needs_receipt);

        let matched = classifier.classify("eth", &pair, &tx, None).unwrap();
        assert_eq!(matched.pair_id.as_deref(), Some("usdc"));
        assert_eq!(matched.tx_to, address_key(&TOKEN));
        assert_eq!(matched.bind, Some(address_key(&DEPOSIT)));
        assert_eq!(matched.method.rpc_method(), "swap.Swapin");
    }

    #[test]
    fn contract_creation_is_wrong_receiver() {
        let classifier = TransactionClassifier::default();
        let mut tx = tx(TOKEN, transfer_input(DEPOSIT));
        tx.to = None;
        assert!(matches!(
            classifier.classify("eth", &bridge_pair(SwapKind::Swapin), &tx, None),
            Err(Rejection::WrongReceiver { found: None, .. })
        ));
    }

    #[test]
    fn whitelist_hit_forces_receipt() {
        let classifier = TransactionClassifier::default();
        let mut pair = bridge_pair(SwapKind::Swapin);
        pair.whitelist.push(OTHER);
        let tx = tx(OTHER, transfer_input(DEPOSIT));

        let acceptance = classifier.accept_destination(&pair, &tx).unwrap();
        assert_eq!(acceptance.accepted_by, AcceptedBy::Whitelist);
        assert!(acceptance.needs_receipt);
        assert!(matches!(
            classifier.classify("eth", &pair, &tx, None),
            Err(Rejection::ReceiptUnavailable { .. })
        ));
    }

    #[test]
    fn call_by_contract_overrides_token_destination() {
        let classifier = TransactionClassifier::default();
        let mut pair = bridge_pair(SwapKind::Swapin);
        pair.call_by_contract = Some(OTHER);

        assert!(classifier
            .accept_destination(&pair, &tx(TOKEN, transfer_input(DEPOSIT)))
            .is_err());
        let acceptance = classifier
            .accept_destination(&pair, &tx(OTHER, vec![]))
            .unwrap();
        assert!(acceptance.needs_receipt);
    }

    #[test]
    fn token_swapin_from_logs() {
        let classifier = TransactionClassifier::default();
        let pair = bridge_pair(SwapKind::Swapin);
        let tx = tx(TOKEN, vec![]);
        let good = receipt(vec![log(
            TOKEN,
            vec![topics::TRANSFER, OTHER.into_word(), DEPOSIT.into_word()],
            false,
        )]);
        let matched = classifier.classify("eth", &pair, &tx, Some(&good)).unwrap();
        assert_eq!(matched.bind, Some(address_key(&DEPOSIT)));

        let wrong = receipt(vec![log(
            TOKEN,
            vec![topics::TRANSFER, OTHER.into_word(), OTHER.into_word()],
            false,
        )]);
        assert!(matches!(
            classifier.classify("eth", &pair, &tx, Some(&wrong)),
            Err(Rejection::WrongReceiver { .. })
        ));

        let foreign = receipt(vec![log(
            OTHER,
            vec![topics::TRANSFER, OTHER.into_word(), DEPOSIT.into_word()],
            false,
        )]);
        assert_eq!(
            classifier.classify("eth", &pair, &tx, Some(&foreign)),
            Err(Rejection::DepositLogNotFound)
        );
    }

    #[test]
    fn failed_receipt_is_unavailable() {
        let classifier = TransactionClassifier::new(true);
        let pair = bridge_pair(SwapKind::Swapin);
        let mut failed = receipt(vec![]);
        failed.status = false;
        assert!(matches!(
            classifier.classify("eth", &pair, &tx(TOKEN, vec![]), Some(&failed)),
            Err(Rejection::ReceiptUnavailable { .. })
        ));
    }

    #[test]
    fn swapout_checks_selector_and_decodes_bind() {
        let classifier = TransactionClassifier::default();
        let pair = bridge_pair(SwapKind::Swapout);
        let input = address_bind::SwapoutCall {
            amount: U256::from(1),
            bindaddr: OTHER,
        }
        .abi_encode();

        let matched = classifier
            .classify("eth", &pair, &tx(TOKEN, input), None)
            .unwrap();
        assert_eq!(matched.bind, Some(address_key(&OTHER)));
        assert_eq!(matched.method.rpc_method(), "swap.Swapout");

        assert!(matches!(
            classifier.classify("eth", &pair, &tx(TOKEN, transfer_input(DEPOSIT)), None),
            Err(Rejection::FuncHashMismatch { .. })
        ));
    }

    #[test]
    fn swapout2_log_needs_two_topics() {
        let classifier = TransactionClassifier::new(true);
        let pair = bridge_pair(SwapKind::Swapout2);
        let tx = tx(TOKEN, vec![]);

        let three_topics = receipt(vec![log(
            TOKEN,
            vec![topics::SWAPOUT_STRING, OTHER.into_word(), OTHER.into_word()],
            false,
        )]);
        assert_eq!(
            classifier.classify("eth", &pair, &tx, Some(&three_topics)),
            Err(Rejection::SwapoutLogNotFound)
        );

        let two_topics = receipt(vec![log(
            TOKEN,
            vec![topics::SWAPOUT_STRING, OTHER.into_word()],
            false,
        )]);
        let matched = classifier
            .classify("eth", &pair, &tx, Some(&two_topics))
            .unwrap();
        assert_eq!(matched.kind, SwapKind::Swapout2);
    }

    #[test]
    fn router_lowest_live_index_wins() {
        let classifier = TransactionClassifier::default();
        let pair = router_pair(SwapKind::RouterErc20);
        let tx = tx(ROUTER, vec![]);
        let any_swap_out = topics::ROUTER_ERC20[0];
        let logs = vec![
            log(ROUTER, vec![any_swap_out], true),
            log(TOKEN, vec![any_swap_out], false),
            log(ROUTER, vec![any_swap_out], false),
            log(ROUTER, vec![topics::TRANSFER], false),
            log(ROUTER, vec![topics::ROUTER_ANYCALL[0]], false),
            log(ROUTER, vec![topics::ROUTER_ERC20[1]], false),
        ];
        let matched = classifier
            .classify("eth", &pair, &tx, Some(&receipt(logs)))
            .unwrap();
        assert_eq!(matched.log_index, Some(2));
        assert_eq!(matched.chain_id, Some(56));
        assert_eq!(matched.key().to_string(), format!("56:{}:2", matched.txid));
    }

    #[test]
    fn router_without_receipt_is_unavailable() {
        let classifier = TransactionClassifier::default();
        assert!(matches!(
            classifier.classify("eth", &router_pair(SwapKind::RouterNft), &tx(ROUTER, vec![]), None),
            Err(Rejection::ReceiptUnavailable { .. })
        ));
    }

    #[test]
    fn native_swapin_needs_only_destination() {
        let classifier = TransactionClassifier::new(true);
        let pair = TokenPairConfig {
            kind: SwapKind::Swapin,
            swap_server: "http://swap".to_string(),
            whitelist: vec![OTHER],
            call_by_contract: None,
            target: SwapTarget::Bridge {
                pair_id: "eth".to_string(),
                token: TokenRef::Native,
                deposit_address: Some(DEPOSIT),
            },
            strategy: Strategy::bridge(SwapKind::Swapin, None, Some(DEPOSIT)).unwrap(),
        };
        let matched = classifier
            .classify("eth", &pair, &tx(DEPOSIT, vec![]), None)
            .unwrap();
        assert_eq!(matched.tx_to, address_key(&DEPOSIT));
        assert!(matches!(
            classifier.accept_destination(&pair, &tx(OTHER, vec![])),
            Err(Rejection::WrongReceiver { .. })
        ));
    }
}
