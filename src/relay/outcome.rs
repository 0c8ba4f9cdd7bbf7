// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Classification of swap server replies
//!
//! Swap servers report outcomes as free text, so classification is a
//! case-insensitive substring match against the phrases they are known to
//! produce. All of the matching lives here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::RemoteFailure;
use crate::types::SwapStatus;

const ALREADY_REGISTERED: &[&str] = &["already registered", "alreday registered", "item is duplicate"];
const SWAP_CLOSED: &str = "swap is closed";
const TRADE_UNSUPPORTED: &str = "swap trade not support";
const WRONG_CONTRACT: &str = "tx with wrong contract";
const TX_NOT_FOUND: &[&str] = &["tx not found", "deposit log not found"];
const TIMEOUT: &[&str] = &["timeout", "timed out", "awaiting headers"];
const UNREACHABLE: &[&str] = &["connection refused", "error trying to connect", "dns error"];
const RATE_LIMITED: &str = "maximum request limit";
const ROUTER_SUCCESS: &str = "success";

const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Why a delivery attempt may succeed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryKind {
    /// The swap server has not seen the transaction yet
    TxNotFound,
    Unreachable,
    Timeout,
    RateLimited,
}

impl fmt::Display for RetryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RetryKind::TxNotFound => "tx_not_found",
            RetryKind::Unreachable => "remote_unreachable",
            RetryKind::Timeout => "remote_timeout",
            RetryKind::RateLimited => "remote_rate_limited",
        })
    }
}

/// Result of posting one swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum RelayOutcome {
    Success,
    /// The server already has the swap
    AlreadyRegistered,
    /// The server refuses the pair: swap is closed
    Closed,
    /// The server refuses the pair: trade not supported
    TradeUnsupported,
    /// The server refuses the transaction's contract
    WrongContract,
    /// Transient failure; the message is the last one seen
    Retryable { kind: RetryKind, message: String },
    /// The call succeeded but the result could not be read
    Malformed(String),
    /// Any other remote error, kept verbatim
    Rejected(String),
}

impl RelayOutcome {
    /// Store status this outcome leads to.
    pub fn to_status(&self) -> SwapStatus {
        match self {
            RelayOutcome::Success | RelayOutcome::AlreadyRegistered => SwapStatus::Success,
            RelayOutcome::Retryable { .. } => SwapStatus::Retryable,
            RelayOutcome::Closed
            | RelayOutcome::TradeUnsupported
            | RelayOutcome::WrongContract
            | RelayOutcome::Malformed(_)
            | RelayOutcome::Rejected(_) => SwapStatus::Terminal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, RelayOutcome::Retryable { .. })
    }

    /// True for outcomes operators must look at.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, RelayOutcome::Malformed(_) | RelayOutcome::Rejected(_))
    }

    /// Text stored alongside the status, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            RelayOutcome::Success => None,
            RelayOutcome::Retryable { kind, message } => Some(format!("{kind}: {message}")),
            RelayOutcome::Malformed(message) | RelayOutcome::Rejected(message) => {
                Some(message.clone())
            }
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for RelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayOutcome::Success => f.write_str("success"),
            RelayOutcome::AlreadyRegistered => f.write_str("already registered"),
            RelayOutcome::Closed => f.write_str("swap is closed"),
            RelayOutcome::TradeUnsupported => f.write_str("swap trade not supported"),
            RelayOutcome::WrongContract => f.write_str("tx with wrong contract"),
            RelayOutcome::Retryable { kind, message } => write!(f, "retryable ({kind}): {message}"),
            RelayOutcome::Malformed(message) => write!(f, "malformed result: {message}"),
            RelayOutcome::Rejected(message) => write!(f, "rejected: {message}"),
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Outcomes recognizable from text regardless of where the text came from.
fn classify_text(text: &str) -> Option<RelayOutcome> {
    let lower = text.to_ascii_lowercase();
    let outcome = if contains_any(&lower, ALREADY_REGISTERED) {
        RelayOutcome::AlreadyRegistered
    } else if lower.contains(SWAP_CLOSED) {
        RelayOutcome::Closed
    } else if lower.contains(TRADE_UNSUPPORTED) {
        RelayOutcome::TradeUnsupported
    } else if lower.contains(WRONG_CONTRACT) {
        RelayOutcome::WrongContract
    } else if contains_any(&lower, TX_NOT_FOUND) {
        retryable(RetryKind::TxNotFound, text)
    } else if lower.contains(RATE_LIMITED) {
        retryable(RetryKind::RateLimited, text)
    } else if contains_any(&lower, TIMEOUT) {
        retryable(RetryKind::Timeout, text)
    } else if contains_any(&lower, UNREACHABLE) {
        retryable(RetryKind::Unreachable, text)
    } else {
        return None;
    };
    Some(outcome)
}

fn retryable(kind: RetryKind, message: &str) -> RelayOutcome {
    RelayOutcome::Retryable {
        kind,
        message: message.to_string(),
    }
}

/// Classifies a failed relay call.
///
/// Known phrases win over transport signals, so a swap server that answers
/// "already registered" with an HTTP error still counts as success.
pub fn classify_failure(failure: &RemoteFailure) -> RelayOutcome {
    if let Some(outcome) = classify_text(&failure.message) {
        return outcome;
    }
    if failure.timed_out {
        return retryable(RetryKind::Timeout, &failure.message);
    }
    if failure.unreachable {
        return retryable(RetryKind::Unreachable, &failure.message);
    }
    if failure.http_status == Some(HTTP_TOO_MANY_REQUESTS) {
        return retryable(RetryKind::RateLimited, &failure.message);
    }
    RelayOutcome::Rejected(failure.message.clone())
}

/// Classifies the per-log status string of a router registration result.
pub fn classify_status(status: &str) -> RelayOutcome {
    if status.to_ascii_lowercase().contains(ROUTER_SUCCESS) {
        return RelayOutcome::Success;
    }
    classify_text(status).unwrap_or_else(|| RelayOutcome::Rejected(status.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn duplicate_phrases_are_already_registered() {
        for text in [
            "json-rpc error -32099, swap already registered",
            "swap alreday registered",
            "mgoError: Item is duplicate",
            "ALREADY REGISTERED",
        ] {
            assert_eq!(
                classify_failure(&RemoteFailure::message(text)),
                RelayOutcome::AlreadyRegistered,
                "{text}"
            );
        }
    }

    #[test]
    fn refusals_are_terminal() {
        assert_eq!(classify_failure(&RemoteFailure::message("swap is closed")), RelayOutcome::Closed);
        assert_eq!(
            classify_failure(&RemoteFailure::message("swap trade not support")),
            RelayOutcome::TradeUnsupported
        );
        assert_eq!(RelayOutcome::Closed.to_status(), SwapStatus::Terminal);
        assert!(!RelayOutcome::Closed.is_hard_failure());
    }

    #[test]
    fn transient_failures_are_retryable() {
        let cases = [
            (RemoteFailure::message("verify swap failed! deposit log not found or removed"), RetryKind::TxNotFound),
            (RemoteFailure::message("Client.Timeout exceeded while awaiting headers"), RetryKind::Timeout),
            (RemoteFailure::message("dial tcp: connect: connection refused"), RetryKind::Unreachable),
            (RemoteFailure::message("You have reached maximum request limit"), RetryKind::RateLimited),
            (RemoteFailure::http(429, "slow down"), RetryKind::RateLimited),
            (RemoteFailure::timeout(Duration::from_secs(300)), RetryKind::Timeout),
        ];
        for (failure, expected) in cases {
            match classify_failure(&failure) {
                RelayOutcome::Retryable { kind, .. } => assert_eq!(kind, expected, "{failure}"),
                other => panic!("{failure}: expected retryable, got {other:?}"),
            }
        }
    }

    #[test]
    fn transport_flags_apply_when_text_is_unrecognized() {
        let unreachable = RemoteFailure::unreachable("error sending request for url (http://10.0.0.9:11556/)");
        assert_eq!(
            classify_failure(&unreachable),
            retryable(RetryKind::Unreachable, "error sending request for url (http://10.0.0.9:11556/)")
        );

        // A recognized phrase still wins over the flag.
        let registered = RemoteFailure::unreachable("swap already registered");
        assert_eq!(classify_failure(&registered), RelayOutcome::AlreadyRegistered);
    }

    #[test]
    fn unknown_errors_are_kept_verbatim() {
        let outcome = classify_failure(&RemoteFailure::http(500, "Internal Server Error: boom"));
        assert_eq!(outcome, RelayOutcome::Rejected("Internal Server Error: boom".into()));
        assert!(outcome.is_hard_failure());
        assert_eq!(outcome.detail().as_deref(), Some("Internal Server Error: boom"));
    }

    #[test]
    fn router_status_strings() {
        assert_eq!(classify_status("Success"), RelayOutcome::Success);
        assert_eq!(classify_status("already registered"), RelayOutcome::AlreadyRegistered);
        assert_eq!(classify_status("tx with wrong contract"), RelayOutcome::WrongContract);
        assert_eq!(
            classify_status("verify failed: bad amount"),
            RelayOutcome::Rejected("verify failed: bad amount".into())
        );
    }
}
