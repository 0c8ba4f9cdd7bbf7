// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Swap identities, statuses and records
//!
//! - [`SwapKind`] / [`ChainFamily`]: closed sets replacing string dispatch
//! - [`SwapCandidate`]: a transaction submitted for scanning
//! - [`SwapMatch`]: what a successful classification produces
//! - [`RegisteredSwap`]: the durable record the relay loop posts from
//! - [`SwapKey`]: dedup identity of a registered swap

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Rejection;

/// Swap pattern a token pair is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapKind {
    /// Deposit into the bridge (native currency or ERC-20 transfer)
    #[serde(rename = "swapin")]
    Swapin,
    /// Bridge token burn with an address-typed bind
    #[serde(rename = "swapout")]
    Swapout,
    /// Bridge token burn with a string-typed bind
    #[serde(rename = "swapout2")]
    Swapout2,
    /// Router ERC-20 swap-out
    #[serde(rename = "routerswap", alias = "router-erc20")]
    RouterErc20,
    /// Router NFT swap-out
    #[serde(rename = "nftswap", alias = "router-nft")]
    RouterNft,
    /// Router any-call swap-out
    #[serde(rename = "anycallswap", alias = "router-anycall")]
    RouterAnycall,
}

impl SwapKind {
    /// Config name of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SwapKind::Swapin => "swapin",
            SwapKind::Swapout => "swapout",
            SwapKind::Swapout2 => "swapout2",
            SwapKind::RouterErc20 => "routerswap",
            SwapKind::RouterNft => "nftswap",
            SwapKind::RouterAnycall => "anycallswap",
        }
    }

    /// True for the router variants.
    pub const fn is_router(&self) -> bool {
        matches!(
            self,
            SwapKind::RouterErc20 | SwapKind::RouterNft | SwapKind::RouterAnycall
        )
    }

    /// Remote method a match of this kind is relayed with.
    pub const fn relay_method(&self) -> RelayMethod {
        match self {
            SwapKind::Swapin => RelayMethod::Swapin,
            SwapKind::Swapout | SwapKind::Swapout2 => RelayMethod::Swapout,
            SwapKind::RouterErc20 | SwapKind::RouterNft | SwapKind::RouterAnycall => {
                RelayMethod::RouterSwap
            }
        }
    }
}

impl FromStr for SwapKind {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "swapin" => Ok(SwapKind::Swapin),
            "swapout" => Ok(SwapKind::Swapout),
            "swapout2" => Ok(SwapKind::Swapout2),
            "routerswap" | "router-erc20" => Ok(SwapKind::RouterErc20),
            "nftswap" | "router-nft" => Ok(SwapKind::RouterNft),
            "anycallswap" | "router-anycall" => Ok(SwapKind::RouterAnycall),
            other => Err(Rejection::UnknownSwapKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SwapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chain family, deciding which client and which matching rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Account-based chains with EVM receipts and logs
    Evm,
    /// Bitcoin-family chains (outputs, P2SH)
    Utxo,
}

/// Remote JSON-RPC method used to relay a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayMethod {
    Swapin,
    Swapout,
    RouterSwap,
    P2shSwapin,
}

impl RelayMethod {
    /// Method name on the remote swap server.
    pub const fn rpc_method(&self) -> &'static str {
        match self {
            RelayMethod::Swapin => "swap.Swapin",
            RelayMethod::Swapout => "swap.Swapout",
            RelayMethod::RouterSwap => "swap.RegisterRouterSwap",
            RelayMethod::P2shSwapin => "swap.P2shSwapin",
        }
    }
}

/// Lowercases a chain name or transaction id for use as an identity.
pub fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Lowercase `0x`-prefixed form of an address, used in stored records.
pub fn address_key(address: &Address) -> String {
    address.to_string().to_ascii_lowercase()
}

/// A transaction id submitted for scanning on a chain.
///
/// Identity is the case-normalized `(chain, txid)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwapCandidate {
    pub chain: String,
    pub txid: String,
}

impl SwapCandidate {
    pub fn new(chain: &str, txid: &str) -> Self {
        Self {
            chain: normalize(chain),
            txid: normalize(txid),
        }
    }
}

impl fmt::Display for SwapCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.txid)
    }
}

/// Where a candidate is in the scan lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    /// Waiting for the scan loop
    Pending,
    /// Classified; a registered swap exists
    Resolved,
    /// Every configured pair rejected it
    Rejected,
    /// Transaction lookup exhausted its attempts
    NotFound,
}

/// Stored state of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate: SwapCandidate,
    pub status: CandidateStatus,
    /// Last rejection seen, kept for diagnostics
    pub rejection: Option<Rejection>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dedup identity of a registered swap.
///
/// Bridge swaps are unique per transaction; router swaps add the target chain
/// and the receipt log position because one transaction can carry several.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SwapKey {
    Bridge {
        txid: String,
    },
    Router {
        chain_id: u64,
        txid: String,
        log_index: u64,
    },
}

impl SwapKey {
    pub fn bridge(txid: &str) -> Self {
        SwapKey::Bridge {
            txid: normalize(txid),
        }
    }

    pub fn router(chain_id: u64, txid: &str, log_index: u64) -> Self {
        SwapKey::Router {
            chain_id,
            txid: normalize(txid),
            log_index,
        }
    }

    pub fn txid(&self) -> &str {
        match self {
            SwapKey::Bridge { txid } | SwapKey::Router { txid, .. } => txid,
        }
    }
}

impl fmt::Display for SwapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapKey::Bridge { txid } => f.write_str(txid),
            SwapKey::Router {
                chain_id,
                txid,
                log_index,
            } => write!(f, "{chain_id}:{txid}:{log_index}"),
        }
    }
}

/// Relay status of a registered swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    /// Registered, not yet posted
    Pending,
    /// Posted; the remote accepted it or already had it
    Success,
    /// Posted; the remote refused it or failed in a way retrying will not fix
    Terminal,
    /// Delivery failed with a transient error after the retry budget
    Retryable,
}

impl SwapStatus {
    /// True once no further relay attempt will be made.
    pub const fn is_final(&self) -> bool {
        matches!(self, SwapStatus::Success | SwapStatus::Terminal)
    }
}

/// Result of a successful classification.
///
/// Carries no wall-clock data so that classifying the same inputs twice
/// yields equal values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapMatch {
    pub chain: String,
    pub txid: String,
    pub kind: SwapKind,
    pub method: RelayMethod,
    /// Lowercase destination the transaction paid or called
    pub tx_to: String,
    /// Receiver (swap-in) or destination-chain bind (swap-out, P2SH), when known
    pub bind: Option<String>,
    pub pair_id: Option<String>,
    pub chain_id: Option<u64>,
    /// Position of the matching log in the receipt (router kinds)
    pub log_index: Option<u64>,
    pub swap_server: String,
}

impl SwapMatch {
    pub fn key(&self) -> SwapKey {
        match (self.chain_id, self.log_index) {
            (Some(chain_id), Some(log_index)) if self.kind.is_router() => {
                SwapKey::router(chain_id, &self.txid, log_index)
            }
            _ => SwapKey::bridge(&self.txid),
        }
    }
}

/// Durable record of a matched swap awaiting or past relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredSwap {
    pub key: SwapKey,
    pub chain: String,
    pub kind: SwapKind,
    pub method: RelayMethod,
    pub tx_to: String,
    pub bind: Option<String>,
    pub pair_id: Option<String>,
    pub chain_id: Option<u64>,
    pub log_index: Option<u64>,
    pub swap_server: String,
    pub status: SwapStatus,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RegisteredSwap {
    /// New `Pending` record for a match.
    pub fn from_match(swap: SwapMatch, now: DateTime<Utc>) -> Self {
        Self {
            key: swap.key(),
            chain: swap.chain,
            kind: swap.kind,
            method: swap.method,
            tx_to: swap.tx_to,
            bind: swap.bind,
            pair_id: swap.pair_id,
            chain_id: swap.chain_id,
            log_index: swap.log_index,
            swap_server: swap.swap_server,
            status: SwapStatus::Pending,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn txid(&self) -> &str {
        self.key.txid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router_match(log_index: u64) -> SwapMatch {
        SwapMatch {
            chain: "eth".to_string(),
            txid: "0xABC".to_string(),
            kind: SwapKind::RouterErc20,
            method: RelayMethod::RouterSwap,
            tx_to: "0xddd".to_string(),
            bind: None,
            pair_id: None,
            chain_id: Some(56),
            log_index: Some(log_index),
            swap_server: "http://swap".to_string(),
        }
    }

    #[test]
    fn swap_kind_parses_config_names_and_aliases() {
        assert_eq!("SwapIn".parse::<SwapKind>().unwrap(), SwapKind::Swapin);
        assert_eq!("router-nft".parse::<SwapKind>().unwrap(), SwapKind::RouterNft);
        assert_eq!("anycallswap".parse::<SwapKind>().unwrap(), SwapKind::RouterAnycall);
        assert!(matches!(
            "swapsideways".parse::<SwapKind>(),
            Err(Rejection::UnknownSwapKind { .. })
        ));
    }

    #[test]
    fn router_keys_include_chain_and_log_index() {
        let key = router_match(5).key();
        assert_eq!(key, SwapKey::router(56, "0xabc", 5));
        assert_eq!(key.to_string(), "56:0xabc:5");
        assert_ne!(router_match(2).key(), key);
    }

    #[test]
    fn bridge_keys_are_lowercase_txids() {
        let key = SwapKey::bridge("0xAbC");
        assert_eq!(key.to_string(), "0xabc");
        assert_eq!(key.txid(), "0xabc");
    }

    #[test]
    fn candidates_normalize_case() {
        assert_eq!(SwapCandidate::new("ETH", "0xABC"), SwapCandidate::new("eth", "0xabc"));
    }

    #[test]
    fn relay_methods_match_remote_names() {
        assert_eq!(SwapKind::Swapin.relay_method().rpc_method(), "swap.Swapin");
        assert_eq!(SwapKind::Swapout2.relay_method().rpc_method(), "swap.Swapout");
        assert_eq!(
            SwapKind::RouterNft.relay_method().rpc_method(),
            "swap.RegisterRouterSwap"
        );
    }
}
