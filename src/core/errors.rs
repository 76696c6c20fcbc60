use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The request could not be attempted with the current configuration,
    /// e.g. an authenticated call on a client without credentials.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    /// The venue could not be reached or the response body could not be read.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The venue answered with a non-success HTTP status.
    #[error("API error: {status} {name} - {message}")]
    ApiError {
        status: u16,
        name: String,
        message: String,
    },

    /// The venue answered, but the body does not have the expected shape.
    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Rate limit wait exceeded {0:?}")]
    RateLimitTimeout(Duration),
}

impl ExchangeError {
    /// True for failures of the transport leg: unreachable venue or a venue
    /// that rejected the request with a non-success status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::ApiError { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::DecodeError(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError(_) | Self::ConfigError(_))
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkError(err.to_string())
    }
}
