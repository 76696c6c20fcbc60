use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::{SignedHeaders, Signer, CONTENT_TYPE_FORM};
use crate::exchanges::bitmex::API_VERSION;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// BitMEX nonce-based HMAC-SHA256 signer.
///
/// Signed message: `METHOD + "/api/v1/" + PATH + NONCE + BODY`, where `PATH`
/// carries the query string for `GET` and `BODY` is the form-encoded body of
/// every other method.
#[derive(Clone)]
pub struct BitmexSigner {
    api_key: String,
    // keyed once; cloned per signature
    mac: HmacSha256,
}

impl BitmexSigner {
    pub fn new(api_key: &Secret<String>, secret_key: &Secret<String>) -> Result<Self, ExchangeError> {
        let secret = secret_key.expose_secret();
        if secret.is_empty() {
            return Err(ExchangeError::AuthError("API secret is empty".to_string()));
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| ExchangeError::AuthError("Invalid secret key".to_string()))?;

        Ok(Self {
            api_key: api_key.expose_secret().clone(),
            mac,
        })
    }

    /// Lowercase hex HMAC of the message for one request.
    pub fn sign(&self, method: &str, path: &str, nonce: u64, params: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(method.as_bytes());
        mac.update(b"/");
        mac.update(API_VERSION.as_bytes());
        mac.update(b"/");
        mac.update(path.trim_start_matches('/').as_bytes());
        mac.update(nonce.to_string().as_bytes());
        mac.update(params.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for BitmexSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmexSigner")
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Signer for BitmexSigner {
    fn sign_request(&self, method: &str, path: &str, nonce: u64, body: &str) -> SignedHeaders {
        SignedHeaders {
            api_key: self.api_key.clone(),
            nonce,
            signature: self.sign(method, path, nonce, body),
            content_type: (method != "GET").then_some(CONTENT_TYPE_FORM),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // secret from the venue's API key documentation
    const SECRET: &str = "chNOOS4KvNXR_Xq4k4c9qsfoKWvnDecLATCRlcBwyKDYnWgO";

    fn signer() -> BitmexSigner {
        BitmexSigner::new(
            &Secret::new("LAqUlngMIQkIUjXMUreyu3qn".to_string()),
            &Secret::new(SECRET.to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_documented_vector() {
        assert_eq!(
            signer().sign("GET", "instrument", 1_518_064_236, ""),
            "c7682d435d0cfe87c16098df34ef2eb5a549d4c5a3c2b1f0f77b8af73423bf00"
        );
    }

    #[test]
    fn test_query_and_body_placement() {
        let signer = signer();
        assert_eq!(
            signer.sign("GET", "order?symbol=XBTUSD&count=10&reverse=true", 1000, ""),
            "5a0745db896c450c5af243f6e2626a07783e3abd44fcd606bb438489ad2100be"
        );
        assert_eq!(
            signer.sign(
                "POST",
                "order",
                1_518_064_238,
                "symbol=XBTUSD&side=Buy&price=9500.5&orderQty=100&ordType=Limit"
            ),
            "652a7a974e429b0b1364035a004cc7530baa738e683e7a6f56bfd83de3f0f7d5"
        );
    }

    #[test]
    fn test_every_input_changes_signature() {
        let signer = signer();
        let base = signer.sign("POST", "order", 42, "symbol=XBTUSD");

        assert_eq!(base, signer.sign("POST", "order", 42, "symbol=XBTUSD"));
        assert_ne!(base, signer.sign("PUT", "order", 42, "symbol=XBTUSD"));
        assert_ne!(base, signer.sign("POST", "order/all", 42, "symbol=XBTUSD"));
        assert_ne!(base, signer.sign("POST", "order", 43, "symbol=XBTUSD"));
        assert_ne!(base, signer.sign("POST", "order", 42, "symbol=XBTUSDT"));

        let other_key = BitmexSigner::new(
            &Secret::new("key".to_string()),
            &Secret::new("another-secret".to_string()),
        )
        .unwrap();
        assert_ne!(base, other_key.sign("POST", "order", 42, "symbol=XBTUSD"));
    }

    #[test]
    fn test_signed_headers() {
        let headers = signer().sign_request("GET", "instrument", 1_518_064_236, "");
        assert_eq!(headers.api_key, "LAqUlngMIQkIUjXMUreyu3qn");
        assert_eq!(headers.nonce, 1_518_064_236);
        assert_eq!(headers.content_type, None);

        let headers = signer().sign_request("DELETE", "order/all", 7, "symbol=XBTUSD");
        assert_eq!(headers.content_type, Some(CONTENT_TYPE_FORM));
        assert_eq!(headers.signature.len(), 64);
        assert!(headers.signature.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = BitmexSigner::new(&Secret::new("key".to_string()), &Secret::new(String::new()));
        assert!(matches!(result, Err(ExchangeError::AuthError(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", signer());
        assert!(!rendered.contains("LAqUlngMIQkIUjXMUreyu3qn"));
        assert!(!rendered.contains(SECRET));
    }
}
