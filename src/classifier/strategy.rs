// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-kind classification strategies
//!
//! A [`Strategy`] is resolved once per token pair when configuration loads.
//! It carries the addresses, selectors and topics its kind compares against,
//! so classification never branches on kind names at runtime.

use alloy_primitives::{Address, B256};

use crate::config::constants::{selectors, topics};
use crate::types::SwapKind;

/// How the bind of a swap-out is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindEncoding {
    /// `Swapout(uint256,address)` / three-topic `LogSwapout`
    Address,
    /// `Swapout(uint256,string)` / two-topic `LogSwapout`
    String,
}

/// Log shape a bridge token emits for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSignature {
    pub topic: B256,
    pub topics_len: usize,
}

/// Resolved matching rule for one token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Native currency paid straight to the deposit address.
    NativeSwapin { deposit: Address },
    /// ERC-20 transfer of `token` to the deposit address.
    TokenSwapin {
        token: Address,
        deposit: Address,
        log: LogSignature,
    },
    /// Bridge token burn carrying a destination-chain bind.
    Swapout {
        token: Address,
        selector: [u8; 4],
        log: LogSignature,
        bind: BindEncoding,
    },
    /// Router event from a fixed contract.
    Router {
        router: Address,
        topics: &'static [B256],
    },
}

impl Strategy {
    /// Strategy for a bridge kind.
    ///
    /// `token` is `None` for native pairs; only swap-in supports those.
    pub fn bridge(kind: SwapKind, token: Option<Address>, deposit: Option<Address>) -> Option<Self> {
        match (kind, token, deposit) {
            (SwapKind::Swapin, None, Some(deposit)) => Some(Strategy::NativeSwapin { deposit }),
            (SwapKind::Swapin, Some(token), Some(deposit)) => Some(Strategy::TokenSwapin {
                token,
                deposit,
                log: LogSignature {
                    topic: topics::TRANSFER,
                    topics_len: 3,
                },
            }),
            (SwapKind::Swapout, Some(token), _) => Some(Strategy::Swapout {
                token,
                selector: selectors::SWAPOUT_ADDRESS,
                log: LogSignature {
                    topic: topics::SWAPOUT_ADDRESS,
                    topics_len: 3,
                },
                bind: BindEncoding::Address,
            }),
            (SwapKind::Swapout2, Some(token), _) => Some(Strategy::Swapout {
                token,
                selector: selectors::SWAPOUT_STRING,
                log: LogSignature {
                    topic: topics::SWAPOUT_STRING,
                    topics_len: 2,
                },
                bind: BindEncoding::String,
            }),
            _ => None,
        }
    }

    /// Strategy for a router kind.
    pub fn router(kind: SwapKind, router: Address) -> Option<Self> {
        let topics: &'static [B256] = match kind {
            SwapKind::RouterErc20 => &topics::ROUTER_ERC20,
            SwapKind::RouterNft => &topics::ROUTER_NFT,
            SwapKind::RouterAnycall => &topics::ROUTER_ANYCALL,
            _ => return None,
        };
        Some(Strategy::Router { router, topics })
    }

    /// Address the transaction must target, before any `call_by_contract` override.
    pub fn destination(&self) -> Address {
        match self {
            Strategy::NativeSwapin { deposit } => *deposit,
            Strategy::TokenSwapin { token, .. } | Strategy::Swapout { token, .. } => *token,
            Strategy::Router { router, .. } => *router,
        }
    }

    pub const fn is_native(&self) -> bool {
        matches!(self, Strategy::NativeSwapin { .. })
    }

    pub const fn is_router(&self) -> bool {
        matches!(self, Strategy::Router { .. })
    }
}
