// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower middleware for the JSON-RPC transports used to reach chain nodes and
//! swap servers.
//!
//! ```rust,ignore
//! let client = ClientBuilder::default()
//!     .layer(LoggingLayer::new("eth"))
//!     .layer(RateLimitLayer::per_second(10))
//!     .http(rpc_url);
//! let provider = ProviderBuilder::new()
//!     .disable_recommended_fillers()
//!     .connect_client(client);
//! ```

mod logging;
mod rate_limit;

pub use logging::{LoggingLayer, LoggingService};
pub use rate_limit::{RateLimitLayer, RateLimitService, TokenBucket};
