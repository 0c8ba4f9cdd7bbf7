// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

/// Failure of a single call to a remote relay endpoint.
///
/// This is the raw failure before it is classified into a relay outcome;
/// classification works on `message` first, then on the transport flags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteFailure {
    /// Error text as reported by the remote side or the transport
    pub message: String,
    /// HTTP status, when the transport saw a non-success response
    pub http_status: Option<u16>,
    /// True when the call was abandoned by a deadline
    pub timed_out: bool,
    /// True when no connection to the endpoint could be made
    pub unreachable: bool,
}

impl RemoteFailure {
    /// Failure carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            http_status: None,
            timed_out: false,
            unreachable: false,
        }
    }

    /// Failure from a non-success HTTP response.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self {
            message: body.into(),
            http_status: Some(status),
            timed_out: false,
            unreachable: false,
        }
    }

    /// Failure from the local call deadline expiring.
    pub fn timeout(after: std::time::Duration) -> Self {
        Self {
            message: format!("relay call timed out after {after:?}"),
            http_status: None,
            timed_out: true,
            unreachable: false,
        }
    }

    /// Failure to connect to the endpoint at all.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            unreachable: true,
            ..Self::message(message)
        }
    }
}

/// Errors that stop a relay call from being attempted at all.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The swap server URL cannot be parsed.
    #[error("Invalid swap server URL {url}")]
    InvalidEndpoint {
        /// The configured URL
        url: String,
        /// Parse error
        #[source]
        source: url::ParseError,
    },

    /// The shared HTTP client could not be built.
    #[error("Failed to build swap server HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The record lacks a field its relay method needs.
    #[error("Swap {key} cannot be relayed: {reason}")]
    IncompleteRecord {
        /// Display form of the swap key
        key: String,
        /// Missing field
        reason: String,
    },
}
