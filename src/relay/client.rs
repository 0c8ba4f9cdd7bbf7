// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::error::Error as StdError;
use std::time::Duration;

use alloy_json_rpc::RpcError as JsonRpcError;
use alloy_rpc_client::{ClientBuilder, RpcClient};
use alloy_transport::{TransportError, TransportErrorKind};
use alloy_transport_http::Http;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::errors::{RelayError, RemoteFailure};
use crate::transport::LoggingLayer;

/// One JSON-RPC call to a swap server.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn call(
        &self,
        endpoint: &str,
        method: &'static str,
        params: Value,
    ) -> Result<Value, RemoteFailure>;
}

/// HTTP JSON-RPC transport with one cached client per swap server and a
/// per-call deadline.
///
/// All swap servers share one connection pool.
#[derive(Debug)]
pub struct JsonRpcRelayClient {
    timeout: Duration,
    http: reqwest::Client,
    clients: RwLock<HashMap<String, RpcClient>>,
}

impl JsonRpcRelayClient {
    pub fn new(timeout: Duration) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(RelayError::HttpClient)?;
        Ok(Self {
            timeout,
            http,
            clients: RwLock::new(HashMap::new()),
        })
    }

    async fn client_for(&self, endpoint: &str) -> Result<RpcClient, RelayError> {
        if let Some(client) = self.clients.read().await.get(endpoint) {
            return Ok(client.clone());
        }

        let url: url::Url = endpoint.parse().map_err(|source| RelayError::InvalidEndpoint {
            url: endpoint.to_string(),
            source,
        })?;
        let mut clients = self.clients.write().await;
        let client = clients
            .entry(endpoint.to_string())
            .or_insert_with(|| {
                ClientBuilder::default()
                    .layer(LoggingLayer::new(endpoint))
                    .transport(Http::with_client(self.http.clone(), url), false)
            })
            .clone();
        Ok(client)
    }
}

/// Flattens a transport error into the text, status and flags the
/// classifier reads.
///
/// Send failures from the HTTP client arrive boxed inside
/// `TransportErrorKind::Custom`; their top-level text says little, so the
/// whole cause chain is kept and the client's own connect/timeout flags are
/// carried over.
fn remote_failure(err: TransportError) -> RemoteFailure {
    match err {
        JsonRpcError::ErrorResp(payload) => RemoteFailure::message(format!(
            "json-rpc error {}, {}",
            payload.code, payload.message
        )),
        JsonRpcError::Transport(TransportErrorKind::HttpError(http)) => {
            RemoteFailure::http(http.status, http.body)
        }
        JsonRpcError::Transport(TransportErrorKind::Custom(source)) => {
            let mut failure = RemoteFailure::message(error_chain(source.as_ref()));
            if let Some(e) = source.downcast_ref::<reqwest::Error>() {
                failure.timed_out = e.is_timeout();
                failure.unreachable = e.is_connect();
            }
            failure
        }
        other => RemoteFailure::message(other.to_string()),
    }
}

/// Joins an error with its causes, skipping causes already spelled out.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut next = err.source();
    while let Some(cause) = next {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        next = cause.source();
    }
    message
}

#[async_trait]
impl RelayTransport for JsonRpcRelayClient {
    async fn call(
        &self,
        endpoint: &str,
        method: &'static str,
        params: Value,
    ) -> Result<Value, RemoteFailure> {
        let client = self
            .client_for(endpoint)
            .await
            .map_err(|e| RemoteFailure::message(e.to_string()))?;

        let call = client.request::<Value, Value>(method, params);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(remote_failure),
            Err(_) => Err(RemoteFailure::timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::outcome::{classify_failure, RetryKind};
    use crate::relay::RelayOutcome;
    use alloy_json_rpc::ErrorPayload;
    use alloy_transport::HttpError;

    #[test]
    fn error_responses_keep_code_and_message() {
        let payload: ErrorPayload = serde_json::from_value(serde_json::json!({
            "code": -32099,
            "message": "verify swap failed! deposit log not found or removed"
        }))
        .unwrap();
        let failure = remote_failure(JsonRpcError::ErrorResp(payload));
        assert_eq!(
            failure.message,
            "json-rpc error -32099, verify swap failed! deposit log not found or removed"
        );
        assert_eq!(failure.http_status, None);
    }

    #[test]
    fn http_errors_keep_status() {
        let failure = remote_failure(JsonRpcError::Transport(TransportErrorKind::HttpError(
            HttpError {
                status: 429,
                body: "Too Many Requests".into(),
            },
        )));
        assert_eq!(failure.http_status, Some(429));
        assert_eq!(failure.message, "Too Many Requests");
    }

    #[test]
    fn custom_errors_keep_their_causes() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused");
        let failure = remote_failure(TransportErrorKind::custom(io));
        assert!(failure.message.contains("Connection refused"), "{failure}");
        assert!(!failure.unreachable);
    }

    /// A port nothing listens on: bind, read the port, release it.
    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn refused_connection_is_retryable_unreachable() {
        let client = JsonRpcRelayClient::new(Duration::from_secs(5)).unwrap();
        let endpoint = format!("http://127.0.0.1:{}", closed_port());

        let failure = client
            .call(&endpoint, "swap.Swapin", serde_json::json!([{"txid": "0x01"}]))
            .await
            .unwrap_err();

        assert!(failure.unreachable, "{failure:?}");
        let outcome = classify_failure(&failure);
        assert!(outcome.is_retryable(), "{outcome:?}");
        assert!(
            matches!(outcome, RelayOutcome::Retryable { kind: RetryKind::Unreachable, .. }),
            "{outcome:?}"
        );
    }

    #[tokio::test]
    async fn silent_server_hits_the_call_deadline() {
        // Connections complete in the backlog but nothing ever answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let client = JsonRpcRelayClient::new(Duration::from_millis(200)).unwrap();

        let failure = client
            .call(&endpoint, "swap.Swapin", serde_json::json!([{"txid": "0x01"}]))
            .await
            .unwrap_err();

        assert!(failure.timed_out, "{failure:?}");
        assert!(matches!(
            classify_failure(&failure),
            RelayOutcome::Retryable { kind: RetryKind::Timeout, .. }
        ));
        drop(listener);
    }

    #[tokio::test]
    async fn bad_endpoint_is_a_failure_not_a_panic() {
        let client = JsonRpcRelayClient::new(Duration::from_secs(1)).unwrap();
        let failure = client
            .call("not a url", "swap.Swapin", Value::Array(vec![]))
            .await
            .unwrap_err();
        assert!(failure.message.contains("Invalid swap server URL"));
    }
}
