use crate::core::kernel::nonce::MAX_NONCE_FLOOR;
use crate::core::kernel::rate_limit::RateLimitConfig;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::time::Duration;

pub const BITMEX_API_URL: &str = "https://bitmex.com";
pub const BITMEX_TESTNET_API_URL: &str = "https://testnet.bitmex.com";

const DEFAULT_POLLING_DELAY: Duration = Duration::from_secs(10);
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub api_key: Secret<String>,
    pub secret_key: Secret<String>,
    pub testnet: bool,
    pub base_url: Option<String>,
    /// Master switch for private endpoints, independent of whether keys are present.
    pub authenticated_api_support: bool,
    pub verbose: bool,
    /// How often a polling strategy should refresh REST data. The gateway
    /// itself never polls; it only carries the setting for its callers.
    pub rest_polling_delay: Duration,
    pub http_timeout: Duration,
    pub rate_limits: RateLimitConfig,
    /// Last nonce known to have been used with these credentials, if any.
    pub nonce_floor: Option<u64>,
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for ExchangeConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ExchangeConfig", 10)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("secret_key", "[REDACTED]")?;
        state.serialize_field("testnet", &self.testnet)?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("authenticated_api_support", &self.authenticated_api_support)?;
        state.serialize_field("verbose", &self.verbose)?;
        state.serialize_field("rest_polling_delay_secs", &self.rest_polling_delay.as_secs())?;
        state.serialize_field("http_timeout_secs", &self.http_timeout.as_secs())?;
        state.serialize_field("rate_limits", &self.rate_limits)?;
        state.serialize_field("nonce_floor", &self.nonce_floor)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ExchangeConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        const fn default_true() -> bool {
            true
        }

        #[derive(Deserialize)]
        struct ExchangeConfigHelper {
            api_key: String,
            secret_key: String,
            #[serde(default)]
            testnet: bool,
            base_url: Option<String>,
            #[serde(default = "default_true")]
            authenticated_api_support: bool,
            #[serde(default)]
            verbose: bool,
            rest_polling_delay_secs: Option<u64>,
            http_timeout_secs: Option<u64>,
            #[serde(default)]
            rate_limits: RateLimitConfig,
            nonce_floor: Option<u64>,
        }

        let helper = ExchangeConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            api_key: Secret::new(helper.api_key),
            secret_key: Secret::new(helper.secret_key),
            testnet: helper.testnet,
            base_url: helper.base_url,
            authenticated_api_support: helper.authenticated_api_support,
            verbose: helper.verbose,
            rest_polling_delay: helper
                .rest_polling_delay_secs
                .map_or(DEFAULT_POLLING_DELAY, Duration::from_secs),
            http_timeout: helper
                .http_timeout_secs
                .map_or(DEFAULT_HTTP_TIMEOUT, Duration::from_secs),
            rate_limits: helper.rate_limits,
            nonce_floor: helper.nonce_floor,
        })
    }
}

impl ExchangeConfig {
    /// Create a new configuration with API credentials
    #[must_use]
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            testnet: false,
            base_url: None,
            authenticated_api_support: true,
            verbose: false,
            rest_polling_delay: DEFAULT_POLLING_DELAY,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            rate_limits: RateLimitConfig::default(),
            nonce_floor: None,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_API_KEY` (e.g., `BITMEX_API_KEY`)
    /// - `{PREFIX}_SECRET_KEY` (e.g., `BITMEX_SECRET_KEY`)
    /// - `{PREFIX}_TESTNET` (optional, defaults to false)
    /// - `{PREFIX}_BASE_URL` (optional)
    /// - `{PREFIX}_VERBOSE` (optional, defaults to false)
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let api_key_var = format!("{}_API_KEY", prefix);
        let secret_key_var = format!("{}_SECRET_KEY", prefix);

        let api_key = env::var(&api_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(api_key_var))?;

        let secret_key = env::var(&secret_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(secret_key_var))?;

        let testnet = parse_bool_var(&format!("{}_TESTNET", prefix))?;
        let verbose = parse_bool_var(&format!("{}_VERBOSE", prefix))?;
        let base_url = env::var(format!("{}_BASE_URL", prefix)).ok();

        let mut config = Self::new(api_key, secret_key)
            .testnet(testnet)
            .verbose(verbose);
        config.base_url = base_url;
        Ok(config)
    }

    /// Create configuration from .env file and environment variables
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// Create configuration from a specific .env file path
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // no .env file, fall back to the process environment
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(prefix)
    }

    /// Configuration for public endpoints only.
    #[must_use]
    pub fn read_only() -> Self {
        let mut config = Self::new(String::new(), String::new());
        config.authenticated_api_support = false;
        config
    }

    /// Check if this configuration has valid credentials for authenticated operations
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.secret_key.expose_secret().is_empty()
    }

    /// Credentials are present and private endpoints are enabled.
    #[must_use]
    pub fn can_authenticate(&self) -> bool {
        self.authenticated_api_support && self.has_credentials()
    }

    /// REST root for this configuration, without a trailing slash.
    #[must_use]
    pub fn api_url(&self) -> String {
        let url = match (&self.base_url, self.testnet) {
            (Some(url), _) => url.as_str(),
            (None, true) => BITMEX_TESTNET_API_URL,
            (None, false) => BITMEX_API_URL,
        };
        url.trim_end_matches('/').to_string()
    }

    /// Check the values that cannot be expressed in the type system.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidConfiguration(
                "http_timeout must be greater than zero".to_string(),
            ));
        }
        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "base_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }
        if let Some(floor) = self.nonce_floor {
            if floor > MAX_NONCE_FLOOR {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "nonce_floor must not exceed {}, got {}",
                    MAX_NONCE_FLOOR, floor
                )));
            }
        }
        self.rate_limits.validate()
    }

    /// Set testnet mode
    #[must_use]
    pub const fn testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// Set custom base URL
    #[must_use]
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub const fn authenticated_api_support(mut self, enabled: bool) -> Self {
        self.authenticated_api_support = enabled;
        self
    }

    #[must_use]
    pub const fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn rest_polling_delay(mut self, delay: Duration) -> Self {
        self.rest_polling_delay = delay;
        self
    }

    #[must_use]
    pub const fn rate_limits(mut self, rate_limits: RateLimitConfig) -> Self {
        self.rate_limits = rate_limits;
        self
    }

    /// Resume the nonce sequence strictly above a previously persisted value.
    #[must_use]
    pub const fn nonce_floor(mut self, floor: u64) -> Self {
        self.nonce_floor = Some(floor);
        self
    }

    /// Get API key (use carefully - exposes secret)
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get secret key (use carefully - exposes secret)
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

fn parse_bool_var(name: &str) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<bool>().map_err(|_| {
            ConfigError::InvalidConfiguration(format!(
                "{} must be 'true' or 'false', got '{}'",
                name, value
            ))
        }),
        Err(_) => Ok(false),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_selection() {
        let config = ExchangeConfig::new("key".to_string(), "secret".to_string());
        assert_eq!(config.api_url(), BITMEX_API_URL);

        let config = config.testnet(true);
        assert_eq!(config.api_url(), BITMEX_TESTNET_API_URL);

        let config = config.base_url("http://127.0.0.1:8080/".to_string());
        assert_eq!(config.api_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_read_only_cannot_authenticate() {
        let config = ExchangeConfig::read_only();
        assert!(!config.has_credentials());
        assert!(!config.can_authenticate());

        let disabled = ExchangeConfig::new("key".to_string(), "secret".to_string())
            .authenticated_api_support(false);
        assert!(disabled.has_credentials());
        assert!(!disabled.can_authenticate());
    }

    #[test]
    fn test_serialize_redacts_secrets() {
        let config = ExchangeConfig::new("visible-key".to_string(), "hidden-secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("visible-key"));
        assert!(!json.contains("hidden-secret"));
        assert!(json.contains("[REDACTED]"));
        assert!(!format!("{:?}", config).contains("hidden-secret"));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: ExchangeConfig =
            serde_json::from_str(r#"{"api_key":"k","secret_key":"s"}"#).unwrap();
        assert!(config.authenticated_api_support);
        assert_eq!(config.rest_polling_delay, Duration::from_secs(10));
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.rate_limits, RateLimitConfig::default());
        assert_eq!(config.api_key(), "k");
    }

    #[test]
    fn test_from_env() {
        env::set_var("CFGTEST_API_KEY", "env-key");
        env::set_var("CFGTEST_SECRET_KEY", "env-secret");
        env::set_var("CFGTEST_TESTNET", "true");

        let config = ExchangeConfig::from_env("cfgtest").unwrap();
        assert_eq!(config.api_key(), "env-key");
        assert!(config.testnet);
        assert!(!config.verbose);

        env::set_var("CFGTEST_VERBOSE", "loud");
        assert!(matches!(
            ExchangeConfig::from_env("cfgtest"),
            Err(ConfigError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_from_env_missing_key() {
        let err = ExchangeConfig::from_env("CFGTEST_ABSENT").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvironmentVariable(ref v) if v == "CFGTEST_ABSENT_API_KEY"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ExchangeConfig::read_only().http_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = ExchangeConfig::read_only().base_url("ftp://bitmex.com".to_string());
        assert!(config.validate().is_err());

        assert!(ExchangeConfig::read_only().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nonce_floor_without_headroom() {
        let config = ExchangeConfig::read_only().nonce_floor(u64::MAX);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfiguration(_))
        ));

        let config = ExchangeConfig::read_only().nonce_floor(MAX_NONCE_FLOOR);
        assert!(config.validate().is_ok());
    }
}
