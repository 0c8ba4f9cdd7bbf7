// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token bucket rate limiting as a Tower layer.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use tokio::sync::Mutex;
use tower::Layer;

/// Shared token bucket. Clones draw from the same budget.
#[derive(Clone, Debug)]
pub struct TokenBucket {
    /// `None` never throttles
    state: Option<Arc<Mutex<BucketState>>>,
}

#[derive(Debug)]
struct BucketState {
    capacity: f64,
    tokens: f64,
    /// Tokens per nanosecond
    refill_rate: f64,
    last_refill: Instant,
}

impl BucketState {
    fn take(&mut self) -> Option<Duration> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_nanos() as f64;
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return None;
        }
        let wait_nanos = (1.0 - self.tokens) / self.refill_rate;
        Some(Duration::from_nanos(wait_nanos.ceil() as u64))
    }
}

impl TokenBucket {
    /// `requests` per `period`, starting full. A zero request count is
    /// treated as one.
    pub fn new(requests: u32, period: Duration) -> Self {
        let capacity = f64::from(requests.max(1));
        let period_nanos = period.as_nanos().max(1) as f64;
        Self {
            state: Some(Arc::new(Mutex::new(BucketState {
                capacity,
                tokens: capacity,
                refill_rate: capacity / period_nanos,
                last_refill: Instant::now(),
            }))),
        }
    }

    pub fn unlimited() -> Self {
        Self { state: None }
    }

    /// Bucket for an optional per-second limit.
    pub fn per_second(requests: Option<u32>) -> Self {
        match requests {
            Some(rps) => Self::new(rps, Duration::from_secs(1)),
            None => Self::unlimited(),
        }
    }

    /// Waits until a token is available and consumes it.
    pub async fn acquire(&self) {
        let Some(state) = &self.state else {
            return;
        };
        loop {
            let wait = state.lock().await.take();
            match wait {
                None => return,
                Some(duration) => tokio::time::sleep(duration).await,
            }
        }
    }

    /// Consumes a token if one is available right now.
    pub async fn try_acquire(&self) -> bool {
        match &self.state {
            Some(state) => state.lock().await.take().is_none(),
            None => true,
        }
    }
}

/// Limits requests passing through the wrapped transport.
///
/// ```rust,ignore
/// let client = ClientBuilder::default()
///     .layer(RateLimitLayer::per_second(25))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug)]
pub struct RateLimitLayer {
    bucket: TokenBucket,
}

impl RateLimitLayer {
    pub fn new(requests: u32, period: Duration) -> Self {
        Self {
            bucket: TokenBucket::new(requests, period),
        }
    }

    pub fn per_second(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(1))
    }

    /// Shares an existing bucket, e.g. one budget across several endpoints
    /// of the same provider.
    pub fn from_bucket(bucket: TokenBucket) -> Self {
        Self { bucket }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimitService {
            service,
            bucket: self.bucket.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RateLimitService<S> {
    service: S,
    bucket: TokenBucket,
}

impl<S, Request> tower::Service<Request> for RateLimitService<S>
where
    S: tower::Service<Request> + Clone + Send + 'static,
    S::Future: Send,
    Request: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let bucket = self.bucket.clone();
        let mut service = self.service.clone();
        Box::pin(async move {
            bucket.acquire().await;
            service.call(request).await
        })
    }
}
