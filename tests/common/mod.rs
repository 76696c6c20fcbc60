#![allow(dead_code)]

use async_trait::async_trait;
use bitmex_gateway::core::config::ExchangeConfig;
use bitmex_gateway::core::errors::ExchangeError;
use bitmex_gateway::core::kernel::{HttpTransport, RawResponse};
use bitmex_gateway::exchanges::bitmex::{build_connector_with_transport, BitmexConnector};
use parking_lot::Mutex;
use reqwest::Method;
use std::sync::Arc;

pub const API_KEY: &str = "test_api_key";
pub const API_SECRET: &str = "test_secret_key";
pub const MOCK_URL: &str = "http://mock.bitmex.test";

/// One request as it reached the transport
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl SentRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Request target relative to the API root, query string included
    pub fn target(&self) -> &str {
        self.url
            .split_once("/api/v1/")
            .map_or(self.url.as_str(), |(_, target)| target)
    }

    pub fn path(&self) -> &str {
        self.target().split('?').next().unwrap_or_default()
    }

    pub fn query(&self) -> Option<&str> {
        self.target().split_once('?').map(|(_, query)| query)
    }

    pub fn nonce(&self) -> Option<u64> {
        self.header("Api-Nonce").and_then(|n| n.parse().ok())
    }
}

#[derive(Default)]
struct MockState {
    routes: Vec<(Method, String, RawResponse)>,
    sent: Vec<SentRequest>,
    unreachable: bool,
}

/// Scripted transport: answers by method and path, records every request.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.state
            .lock()
            .routes
            .push((method, path.to_string(), RawResponse::new(status, body)));
        self
    }

    pub fn json(&self, method: Method, path: &str, body: serde_json::Value) -> &Self {
        self.route(method, path, 200, &body.to_string())
    }

    pub fn unreachable(&self) -> &Self {
        self.state.lock().unreachable = true;
        self
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.state.lock().sent.clone()
    }

    pub fn last(&self) -> SentRequest {
        self.sent().pop().expect("no request was sent")
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<String>,
    ) -> Result<RawResponse, ExchangeError> {
        let request = SentRequest {
            method: method.clone(),
            url: url.to_string(),
            headers: headers.to_vec(),
            body,
        };
        let path = request.path().to_string();

        let mut state = self.state.lock();
        state.sent.push(request);
        if state.unreachable {
            return Err(ExchangeError::NetworkError("connection refused".to_string()));
        }

        Ok(state
            .routes
            .iter()
            .find(|(m, p, _)| *m == method && *p == path)
            .map(|(_, _, response)| response.clone())
            .unwrap_or_else(|| {
                RawResponse::new(
                    404,
                    r#"{"error":{"message":"Not Found","name":"HTTPError"}}"#,
                )
            }))
    }
}

pub fn signed_config() -> ExchangeConfig {
    ExchangeConfig::new(API_KEY.to_string(), API_SECRET.to_string()).base_url(MOCK_URL.to_string())
}

pub fn read_only_config() -> ExchangeConfig {
    ExchangeConfig::read_only().base_url(MOCK_URL.to_string())
}

pub fn connector(config: ExchangeConfig, transport: &MockTransport) -> BitmexConnector<MockTransport> {
    build_connector_with_transport(config, transport.clone()).expect("connector builds")
}

pub fn order_json(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "orderID": id,
        "symbol": "XBTUSD",
        "side": "Buy",
        "orderQty": 100,
        "price": 9500.5,
        "ordType": "Limit",
        "ordStatus": status,
        "timestamp": "2019-03-05T12:00:00.000Z"
    })
}

pub fn position_json(symbol: &str, is_open: bool) -> serde_json::Value {
    let current_qty = if is_open { 100 } else { 0 };
    serde_json::json!({
        "account": 1,
        "symbol": symbol,
        "currency": "XBt",
        "isOpen": is_open,
        "currentQty": current_qty,
        "leverage": 10
    })
}

pub fn candle_json(timestamp: &str, close: f64) -> serde_json::Value {
    serde_json::json!({
        "timestamp": timestamp,
        "symbol": "XBTUSD",
        "open": close,
        "high": close,
        "low": close,
        "close": close,
        "trades": 10,
        "volume": 1000,
        "vwap": close
    })
}
