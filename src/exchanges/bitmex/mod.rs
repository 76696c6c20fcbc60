pub mod builder;
pub mod connector;
pub mod endpoints;
pub mod normalize;
pub mod rest;
pub mod signer;
pub mod types;

/// Path segment between the host and every endpoint; part of the signed message.
pub const API_VERSION: &str = "api/v1";

pub const EXCHANGE_NAME: &str = "bitmex";

// Re-export main types for easier importing
pub use builder::{build_connector, build_connector_with_transport, build_rest_client};
pub use connector::{Account, BitmexConnector, MarketData, Trading};
pub use rest::BitmexRestClient;
pub use signer::BitmexSigner;
pub use types::BitmexResultExt;
