use crate::core::errors::ExchangeError;
use crate::core::kernel::{HttpTransport, ReqwestTransport};
use crate::core::traits::{AccountInfo, ExchangeConnector, MarketDataSource, OrderPlacer};
use crate::core::types::{
    BinSize, CancelAllOutcome, Candle, Margin, Order, OrderBookLevel, OrderRequest, Position,
    Ticker, Wallet,
};
use crate::exchanges::bitmex::rest::BitmexRestClient;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;

pub mod account;
pub mod market_data;
pub mod trading;

pub use account::Account;
pub use market_data::MarketData;
pub use trading::Trading;

/// BitMEX connector that composes all sub-trait implementations
pub struct BitmexConnector<T: HttpTransport = ReqwestTransport> {
    pub market: MarketData<T>,
    pub trading: Trading<T>,
    pub account: Account<T>,
    rest: BitmexRestClient<T>,
    polling_delay: Duration,
}

impl<T: HttpTransport> BitmexConnector<T> {
    pub fn new(rest: BitmexRestClient<T>, polling_delay: Duration) -> Self {
        Self {
            market: MarketData::new(&rest),
            trading: Trading::new(&rest),
            account: Account::new(&rest),
            rest,
            polling_delay,
        }
    }

    /// The typed REST client shared by all components
    pub fn rest(&self) -> &BitmexRestClient<T> {
        &self.rest
    }

    /// Suggested pause between polls of the same endpoint
    pub fn polling_delay(&self) -> Duration {
        self.polling_delay
    }

    pub fn can_authenticate(&self) -> bool {
        self.rest.gateway().can_authenticate()
    }
}

// Implement traits for the connector by delegating to sub-components
#[async_trait]
impl<T: HttpTransport> MarketDataSource for BitmexConnector<T> {
    async fn get_ticker(&self, symbol: Option<&str>) -> Result<Vec<Ticker>, ExchangeError> {
        self.market.get_ticker(symbol).await
    }

    async fn get_candles(
        &self,
        symbol: &str,
        bin_size: BinSize,
        count: u32,
    ) -> Result<Vec<Candle>, ExchangeError> {
        self.market.get_candles(symbol, bin_size, count).await
    }

    async fn get_order_book(
        &self,
        symbol: &str,
        depth: u32,
    ) -> Result<Vec<OrderBookLevel>, ExchangeError> {
        self.market.get_order_book(symbol, depth).await
    }
}

#[async_trait]
impl<T: HttpTransport> OrderPlacer for BitmexConnector<T> {
    async fn place_order(&self, order: OrderRequest) -> Result<Order, ExchangeError> {
        self.trading.place_order(order).await
    }

    async fn edit_order_price(&self, order_id: &str, price: Decimal) -> Result<Order, ExchangeError> {
        self.trading.edit_order_price(order_id, price).await
    }

    async fn cancel_all_orders(
        &self,
        symbol: &str,
        text: &str,
    ) -> Result<CancelAllOutcome, ExchangeError> {
        self.trading.cancel_all_orders(symbol, text).await
    }

    async fn close_position(&self, symbol: &str, price: Option<Decimal>) -> Result<Order, ExchangeError> {
        self.trading.close_position(symbol, price).await
    }

    async fn get_order(
        &self,
        symbol: &str,
        order_id: &str,
        count: u32,
    ) -> Result<Option<Order>, ExchangeError> {
        self.trading.get_order(symbol, order_id, count).await
    }

    async fn get_orders(&self, symbol: &str, count: u32) -> Result<Vec<Order>, ExchangeError> {
        self.trading.get_orders(symbol, count).await
    }

    async fn get_open_orders(&self, symbol: &str, count: u32) -> Result<Vec<Order>, ExchangeError> {
        self.trading.get_open_orders(symbol, count).await
    }
}

#[async_trait]
impl<T: HttpTransport> AccountInfo for BitmexConnector<T> {
    async fn get_wallet(&self) -> Result<Wallet, ExchangeError> {
        self.account.get_wallet().await
    }

    async fn get_margin(&self) -> Result<Margin, ExchangeError> {
        self.account.get_margin().await
    }

    async fn get_positions(&self, symbol: &str) -> Result<Vec<Position>, ExchangeError> {
        self.account.get_positions(symbol).await
    }

    async fn get_open_positions(&self, symbol: &str) -> Result<Vec<Position>, ExchangeError> {
        self.account.get_open_positions(symbol).await
    }

    async fn get_closed_positions(&self, symbol: &str) -> Result<Vec<Position>, ExchangeError> {
        self.account.get_closed_positions(symbol).await
    }

    async fn set_leverage(&self, symbol: &str, leverage: Decimal) -> Result<Position, ExchangeError> {
        self.account.set_leverage(symbol, leverage).await
    }
}

impl<T: HttpTransport> ExchangeConnector for BitmexConnector<T> {}
