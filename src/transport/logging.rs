// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower layer recording every JSON-RPC call made against a chain node or a
//! swap server.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket};
use alloy_transport::TransportError;
use tower::Layer;
use tracing::{debug, trace, warn, Instrument};

/// Records method, endpoint label and latency of each RPC call.
///
/// The label names the remote side (a chain name or a swap server) so that
/// logs from several endpoints can be told apart.
///
/// ```rust,ignore
/// let client = ClientBuilder::default()
///     .layer(LoggingLayer::new("eth"))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug)]
pub struct LoggingLayer {
    endpoint: Arc<str>,
    log_payloads: bool,
}

impl LoggingLayer {
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        Self {
            endpoint: Arc::from(endpoint.as_ref()),
            log_payloads: false,
        }
    }

    /// Also log request and response bodies at trace level.
    pub fn with_payloads(mut self) -> Self {
        self.log_payloads = true;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        LoggingService {
            service,
            endpoint: self.endpoint.clone(),
            log_payloads: self.log_payloads,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoggingService<S> {
    service: S,
    endpoint: Arc<str>,
    log_payloads: bool,
}

impl<S> tower::Service<RequestPacket> for LoggingService<S>
where
    S: tower::Service<RequestPacket, Response = ResponsePacket, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let log_payloads = self.log_payloads;
        let mut service = self.service.clone();
        let method = method_label(&request);
        let span = tracing::debug_span!(
            target: "swapscan.rpc",
            "rpc_call",
            endpoint = %self.endpoint,
            method = %method,
        );

        Box::pin(
            async move {
                if log_payloads {
                    trace!(target: "swapscan.rpc", request = ?request, "RPC request");
                }

                let start = Instant::now();
                let result = service.call(request).await;
                let elapsed_ms = start.elapsed().as_millis() as u64;

                match &result {
                    Ok(response) if log_payloads => {
                        trace!(target: "swapscan.rpc", elapsed_ms, response = ?response, "RPC response");
                    }
                    Ok(_) => debug!(target: "swapscan.rpc", elapsed_ms, "RPC response"),
                    Err(e) => warn!(target: "swapscan.rpc", elapsed_ms, error = %e, "RPC call failed"),
                }
                result
            }
            .instrument(span),
        )
    }
}

fn method_label(request: &RequestPacket) -> String {
    match request {
        RequestPacket::Single(req) => req.method().to_string(),
        RequestPacket::Batch(reqs) => match reqs.as_slice() {
            [] => "batch(empty)".to_string(),
            [only] => only.method().to_string(),
            many => format!("batch({})", many.len()),
        },
    }
}
