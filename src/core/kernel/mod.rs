//! Exchange-agnostic request pipeline.
//!
//! The kernel owns everything between a logical request and the wire:
//!
//! - [`NonceGenerator`]: strictly increasing nonce per credential
//! - [`Signer`]: pluggable request authentication
//! - [`RateLimiter`]: independent budgets for authenticated and public traffic
//! - [`HttpTransport`]: the HTTP seam, [`ReqwestTransport`] in production
//! - [`GatewayClient`]: ties the above together for one set of credentials
//!
//! Venue specifics (paths, signature layout, wire types) live under
//! `crate::exchanges`.
//!
//! ```rust,no_run
//! use bitmex_gateway::core::kernel::*;
//!
//! # async fn example() -> Result<(), bitmex_gateway::ExchangeError> {
//! let config = RestClientConfig::new(
//!     "https://testnet.bitmex.com/api/v1".to_string(),
//!     "bitmex".to_string(),
//! );
//! let client = GatewayClientBuilder::new(config).build()?;
//!
//! let spec = RequestSpec::get("instrument").param("symbol", "XBTUSD");
//! let rows: Vec<serde_json::Value> = client.call_json(&spec).await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```
pub mod nonce;
pub mod rate_limit;
pub mod rest;
pub mod signer;
pub mod transport;

pub use nonce::{NonceGenerator, MAX_NONCE_FLOOR};
pub use rate_limit::{Permit, RateBudget, RateLimitConfig, RateLimiter, RateMode};
pub use rest::{GatewayClient, GatewayClientBuilder, RequestSpec, RestClientConfig};
pub use signer::{SignedHeaders, Signer, CONTENT_TYPE_FORM};
pub use transport::{HttpTransport, RawResponse, ReqwestTransport};
