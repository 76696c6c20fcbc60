use std::fmt;

pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Authentication headers for exactly one request.
///
/// Built fresh for every dispatch and consumed by it; never cached.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub api_key: String,
    pub nonce: u64,
    pub signature: String,
    pub content_type: Option<&'static str>,
}

impl SignedHeaders {
    pub fn into_header_pairs(self) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Api-Key".to_string(), self.api_key),
            ("Api-Nonce".to_string(), self.nonce.to_string()),
            ("Api-Signature".to_string(), self.signature),
        ];
        if let Some(content_type) = self.content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        headers
    }
}

impl fmt::Debug for SignedHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedHeaders")
            .field("api_key", &"[REDACTED]")
            .field("nonce", &self.nonce)
            .field("signature", &"[REDACTED]")
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Signer trait for request authentication
///
/// Implementations are pure: the same inputs always produce the same headers.
pub trait Signer: Send + Sync {
    /// Sign a request
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, etc.)
    /// * `path` - endpoint path relative to the API root, including the query
    ///   string for requests that carry their parameters in the URL
    /// * `nonce` - the nonce this request commits to
    /// * `body` - form-encoded body, empty when the request has none
    fn sign_request(&self, method: &str, path: &str, nonce: u64, body: &str) -> SignedHeaders;
}
