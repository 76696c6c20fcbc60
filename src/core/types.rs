use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Typed errors for the types subsystem
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Unsupported bin size: {0} (expected 1m, 5m, 1h or 1d)")]
    InvalidBinSize(String),
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
}

impl From<TypesError> for crate::core::errors::ExchangeError {
    fn from(err: TypesError) -> Self {
        Self::InvalidParameters(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
    Stop,
    StopLimit,
    MarketIfTouched,
    LimitIfTouched,
    Pegged,
    #[serde(other)]
    Unknown,
}

impl OrderType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Limit => "Limit",
            Self::Market => "Market",
            Self::Stop => "Stop",
            Self::StopLimit => "StopLimit",
            Self::MarketIfTouched => "MarketIfTouched",
            Self::LimitIfTouched => "LimitIfTouched",
            Self::Pegged => "Pegged",
            Self::Unknown => "Unknown",
        }
    }
}

/// Lifecycle state of an order as reported by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    DoneForDay,
    Canceled,
    PendingCancel,
    PendingNew,
    Rejected,
    Expired,
    Stopped,
    Untriggered,
    Triggered,
    #[default]
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Open orders still rest on the book.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::New | Self::PartiallyFilled)
    }
}

/// Candle width accepted by `trade/bucketed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinSize {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl BinSize {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
        }
    }
}

impl fmt::Display for BinSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BinSize {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Self::OneMinute),
            "5m" => Ok(Self::FiveMinutes),
            "1h" => Ok(Self::OneHour),
            "1d" => Ok(Self::OneDay),
            other => Err(TypesError::InvalidBinSize(other.to_string())),
        }
    }
}

/// One OHLCV bucket from `trade/bucketed`. `timestamp` is the open time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    #[serde(default)]
    pub trades: u64,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub vwap: Option<Decimal>,
    #[serde(default)]
    pub last_size: Option<u64>,
    #[serde(default)]
    pub turnover: Option<i64>,
    #[serde(default)]
    pub home_notional: Option<Decimal>,
    #[serde(default)]
    pub foreign_notional: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "orderID")]
    pub order_id: String,
    #[serde(rename = "clOrdID", default)]
    pub cl_ord_id: Option<String>,
    #[serde(default)]
    pub account: Option<i64>,
    pub symbol: String,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default)]
    pub order_qty: Option<i64>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub display_qty: Option<i64>,
    #[serde(default)]
    pub stop_px: Option<Decimal>,
    #[serde(default)]
    pub ord_type: Option<OrderType>,
    #[serde(default)]
    pub time_in_force: Option<String>,
    #[serde(default)]
    pub exec_inst: Option<String>,
    #[serde(default)]
    pub ord_status: OrderStatus,
    #[serde(default)]
    pub leaves_qty: Option<i64>,
    #[serde(default)]
    pub cum_qty: Option<i64>,
    #[serde(default)]
    pub avg_px: Option<Decimal>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub transact_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_open(&self) -> bool {
        self.ord_status.is_open()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default)]
    pub account: Option<i64>,
    pub symbol: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub current_qty: i64,
    #[serde(default)]
    pub leverage: Option<Decimal>,
    #[serde(default)]
    pub cross_margin: Option<bool>,
    #[serde(default)]
    pub avg_entry_price: Option<Decimal>,
    #[serde(default)]
    pub mark_price: Option<Decimal>,
    #[serde(default)]
    pub liquidation_price: Option<Decimal>,
    #[serde(default)]
    pub unrealised_pnl: Option<i64>,
    #[serde(default)]
    pub realised_pnl: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Instrument snapshot from `instrument`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub symbol: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub last_price: Option<Decimal>,
    #[serde(default)]
    pub bid_price: Option<Decimal>,
    #[serde(default)]
    pub ask_price: Option<Decimal>,
    #[serde(default)]
    pub mark_price: Option<Decimal>,
    #[serde(default)]
    pub high_price: Option<Decimal>,
    #[serde(default)]
    pub low_price: Option<Decimal>,
    #[serde(rename = "volume24h", default)]
    pub volume_24h: Option<i64>,
    #[serde(default)]
    pub open_interest: Option<i64>,
    #[serde(default)]
    pub funding_rate: Option<Decimal>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Wallet summary; amounts are in satoshi (`XBt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub account: i64,
    pub currency: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub deposited: Option<i64>,
    #[serde(default)]
    pub withdrawn: Option<i64>,
    #[serde(default)]
    pub prev_amount: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Margin {
    pub account: i64,
    pub currency: String,
    #[serde(default)]
    pub wallet_balance: Option<i64>,
    #[serde(default)]
    pub margin_balance: Option<i64>,
    #[serde(default)]
    pub available_margin: Option<i64>,
    #[serde(default)]
    pub excess_margin: Option<i64>,
    #[serde(default)]
    pub margin_leverage: Option<Decimal>,
    #[serde(default)]
    pub unrealised_pnl: Option<i64>,
    #[serde(default)]
    pub realised_pnl: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// One price level of `orderBook/L2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub symbol: String,
    pub id: u64,
    pub side: Side,
    #[serde(default)]
    pub size: i64,
    pub price: Decimal,
}

/// A new order as the caller describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Decimal,
    /// Number of contracts
    pub quantity: i64,
    /// Rest on the book as maker only (`ParticipateDoNotInitiate`)
    pub post_only: bool,
}

impl OrderRequest {
    pub fn limit(symbol: impl Into<String>, side: Side, price: Decimal, quantity: i64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            price,
            quantity,
            post_only: false,
        }
    }

    #[must_use]
    pub fn post_only(mut self) -> Self {
        self.post_only = true;
        self
    }

    pub fn validate(&self) -> Result<(), TypesError> {
        if self.price <= Decimal::ZERO {
            return Err(TypesError::InvalidPrice(format!(
                "{} order price must be positive, got {}",
                self.symbol, self.price
            )));
        }
        if self.quantity <= 0 {
            return Err(TypesError::InvalidQuantity(format!(
                "{} order quantity must be positive, got {}",
                self.symbol, self.quantity
            )));
        }
        Ok(())
    }
}

/// Result of cancelling every open order for a symbol.
///
/// The venue answers with a list of cancelled orders, an empty list, or an
/// error object; anything else is kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelAllOutcome {
    Empty,
    Canceled(Vec<Order>),
    Rejected { name: String, message: String },
    Raw(Value),
}

impl CancelAllOutcome {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(ref items) if items.is_empty() => Self::Empty,
            Value::Array(_) => match serde_json::from_value::<Vec<Order>>(value.clone()) {
                Ok(orders) => Self::Canceled(orders),
                Err(_) => Self::Raw(value),
            },
            Value::Object(ref map) => match map.get("error") {
                Some(error) => Self::Rejected {
                    name: string_field(error, "name"),
                    message: string_field(error, "message"),
                },
                None => Self::Raw(value),
            },
            other => Self::Raw(other),
        }
    }

    pub fn canceled_count(&self) -> usize {
        match self {
            Self::Canceled(orders) => orders.len(),
            _ => 0,
        }
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
