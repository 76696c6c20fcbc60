use crate::core::errors::ExchangeError;
use crate::core::kernel::nonce::NonceGenerator;
use crate::core::kernel::rate_limit::{Permit, RateLimitConfig, RateLimiter, RateMode};
use crate::core::kernel::signer::Signer;
use crate::core::kernel::transport::{HttpTransport, RawResponse, ReqwestTransport};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

/// One logical request: what to call, with which parameters, and whether it
/// must be signed. Built once per call and not changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    method: Method,
    path: String,
    params: Vec<(String, String)>,
    authenticated: bool,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into().trim_start_matches('/').to_string(),
            params: Vec::new(),
            authenticated: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn param_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    #[must_use]
    pub const fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn encoded_params(&self) -> Result<String, ExchangeError> {
        serde_urlencoded::to_string(&self.params)
            .map_err(|e| ExchangeError::InvalidParameters(format!("{}: {}", self.path, e)))
    }

    /// Request target and body as they go on the wire. `GET` carries its
    /// parameters in the query string, every other method in a form body.
    pub fn wire_parts(&self) -> Result<(String, Option<String>), ExchangeError> {
        let encoded = self.encoded_params()?;
        if self.method == Method::GET {
            let target = if encoded.is_empty() {
                self.path.clone()
            } else {
                format!("{}?{}", self.path, encoded)
            };
            Ok((target, None))
        } else {
            let body = (!encoded.is_empty()).then_some(encoded);
            Ok((self.path.clone(), body))
        }
    }
}

/// Configuration for the gateway client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// API root every request path is appended to, e.g. `https://bitmex.com/api/v1`
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Log every dispatch at debug instead of trace level
    pub verbose: bool,
    pub rate_limits: RateLimitConfig,
    pub nonce_floor: Option<u64>,
}

impl RestClientConfig {
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            exchange_name,
            timeout: Duration::from_secs(15),
            user_agent: concat!("bitmex-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
            verbose: false,
            rate_limits: RateLimitConfig::default(),
            nonce_floor: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_rate_limits(mut self, rate_limits: RateLimitConfig) -> Self {
        self.rate_limits = rate_limits;
        self
    }

    pub fn with_nonce_floor(mut self, floor: Option<u64>) -> Self {
        self.nonce_floor = floor;
        self
    }
}

/// Builder for creating gateway client instances
pub struct GatewayClientBuilder {
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl GatewayClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            signer: None,
        }
    }

    /// Set the signer for authenticated requests
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Build a client on top of reqwest
    pub fn build(self) -> Result<GatewayClient<ReqwestTransport>, ExchangeError> {
        let transport = ReqwestTransport::new(self.config.timeout, &self.config.user_agent)?;
        self.build_with_transport(transport)
    }

    pub fn build_with_transport<T: HttpTransport>(
        self,
        transport: T,
    ) -> Result<GatewayClient<T>, ExchangeError> {
        self.config.rate_limits.validate()?;

        let nonces = self
            .config
            .nonce_floor
            .map_or_else(NonceGenerator::new, NonceGenerator::starting_after);

        Ok(GatewayClient {
            transport,
            limiter: RateLimiter::new(self.config.rate_limits),
            config: self.config,
            signer: self.signer,
            nonces,
            dispatch_gate: tokio::sync::Mutex::new(()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    name: String,
}

/// Authenticated, rate-limited request pipeline for one set of credentials.
///
/// Owns the nonce sequence and the rate budgets of its credentials; share it
/// behind an `Arc` rather than building a second client for the same key.
pub struct GatewayClient<T = ReqwestTransport> {
    transport: T,
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
    nonces: NonceGenerator,
    limiter: RateLimiter,
    // held from nonce allocation until the response arrives, so nonces reach
    // the venue in the order they were issued
    dispatch_gate: tokio::sync::Mutex<()>,
}

impl<T> std::fmt::Debug for GatewayClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("config", &self.config)
            .field("has_signer", &self.signer.is_some())
            .field("last_nonce", &self.nonces.last_issued())
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> GatewayClient<T> {
    pub fn exchange_name(&self) -> &str {
        &self.config.exchange_name
    }

    pub fn can_authenticate(&self) -> bool {
        self.signer.is_some()
    }

    /// Highest nonce this client has signed with, for callers that persist it.
    pub fn last_nonce(&self) -> Option<u64> {
        self.nonces.last_issued()
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one request through the pipeline and return the venue's answer.
    ///
    /// Budget is acquired before a nonce is taken, so a caller that abandons
    /// the call while it waits for budget leaves the nonce sequence untouched.
    #[instrument(skip(self, spec), fields(exchange = %self.config.exchange_name, method = %spec.method(), path = %spec.path()))]
    pub async fn call(&self, spec: &RequestSpec) -> Result<RawResponse, ExchangeError> {
        let (target, body) = self.prepare(spec)?;
        let permit = self
            .limiter
            .acquire(RateMode::for_request(spec.is_authenticated()))
            .await;
        self.dispatch(spec, permit, target, body).await
    }

    /// [`call`](Self::call) with an upper bound on the time spent waiting for budget.
    #[instrument(skip(self, spec), fields(exchange = %self.config.exchange_name, method = %spec.method(), path = %spec.path()))]
    pub async fn call_within(
        &self,
        spec: &RequestSpec,
        max_wait: Duration,
    ) -> Result<RawResponse, ExchangeError> {
        let (target, body) = self.prepare(spec)?;
        let permit = self
            .limiter
            .acquire_within(RateMode::for_request(spec.is_authenticated()), max_wait)
            .await?;
        self.dispatch(spec, permit, target, body).await
    }

    /// Call and decode the body into `R`.
    pub async fn call_json<R: DeserializeOwned>(&self, spec: &RequestSpec) -> Result<R, ExchangeError> {
        let response = self.call(spec).await?;
        decode(spec, &response)
    }

    fn prepare(&self, spec: &RequestSpec) -> Result<(String, Option<String>), ExchangeError> {
        if spec.is_authenticated() && self.signer.is_none() {
            return Err(ExchangeError::ConfigurationError(format!(
                "{} {} requires credentials, but none are configured",
                spec.method(),
                spec.path()
            )));
        }
        spec.wire_parts()
    }

    async fn dispatch(
        &self,
        spec: &RequestSpec,
        permit: Permit,
        target: String,
        body: Option<String>,
    ) -> Result<RawResponse, ExchangeError> {
        if !permit.waited.is_zero() {
            warn!(
                mode = ?permit.mode,
                waited_ms = permit.waited.as_millis() as u64,
                "request delayed by rate limit"
            );
        }

        let url = format!("{}/{}", self.config.base_url, target);
        let mut headers = vec![
            ("Connection".to_string(), "keep-alive".to_string()),
            ("Keep-Alive".to_string(), "90".to_string()),
        ];

        let response = match &self.signer {
            Some(signer) if spec.is_authenticated() => {
                let _gate = self.dispatch_gate.lock().await;
                let nonce = self.nonces.next();
                let signed = signer.sign_request(
                    spec.method().as_str(),
                    &target,
                    nonce,
                    body.as_deref().unwrap_or_default(),
                );
                headers.extend(signed.into_header_pairs());
                self.log_dispatch(spec, Some(nonce));
                self.transport
                    .send(spec.method().clone(), &url, &headers, body)
                    .await
            }
            _ => {
                self.log_dispatch(spec, None);
                self.transport
                    .send(spec.method().clone(), &url, &headers, body)
                    .await
            }
        }?;

        check_status(response)
    }

    fn log_dispatch(&self, spec: &RequestSpec, nonce: Option<u64>) {
        let params = spec.params().len();
        if self.config.verbose {
            debug!(method = %spec.method(), path = %spec.path(), ?nonce, params, "dispatching request");
        } else {
            trace!(method = %spec.method(), path = %spec.path(), ?nonce, params, "dispatching request");
        }
    }
}

/// Turn a non-success status into [`ExchangeError::ApiError`], using the
/// venue's `{"error": {"name", "message"}}` body when it has one.
fn check_status(response: RawResponse) -> Result<RawResponse, ExchangeError> {
    if response.is_success() {
        return Ok(response);
    }

    let (name, message) = match serde_json::from_slice::<ErrorEnvelope>(&response.body) {
        Ok(envelope) => (envelope.error.name, envelope.error.message),
        Err(_) => ("HTTPError".to_string(), response.text()),
    };

    Err(ExchangeError::ApiError {
        status: response.status,
        name,
        message,
    })
}

pub fn decode<R: DeserializeOwned>(spec: &RequestSpec, response: &RawResponse) -> Result<R, ExchangeError> {
    serde_json::from_slice(&response.body).map_err(|e| {
        ExchangeError::DecodeError(format!("{} {}: {}", spec.method(), spec.path(), e))
    })
}
