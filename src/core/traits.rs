use crate::core::{
    errors::ExchangeError,
    types::{
        BinSize, CancelAllOutcome, Candle, Margin, Order, OrderBookLevel, OrderRequest, Position,
        Ticker, Wallet,
    },
};
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait MarketDataSource {
    /// Instrument snapshots, for one symbol or all of them
    async fn get_ticker(&self, symbol: Option<&str>) -> Result<Vec<Ticker>, ExchangeError>;

    /// Completed candles, oldest first
    async fn get_candles(
        &self,
        symbol: &str,
        bin_size: BinSize,
        count: u32,
    ) -> Result<Vec<Candle>, ExchangeError>;

    /// Level 2 book; a depth of 0 means the default of 25 levels per side
    async fn get_order_book(
        &self,
        symbol: &str,
        depth: u32,
    ) -> Result<Vec<OrderBookLevel>, ExchangeError>;
}

#[async_trait]
pub trait OrderPlacer {
    async fn place_order(&self, order: OrderRequest) -> Result<Order, ExchangeError>;

    async fn edit_order_price(&self, order_id: &str, price: Decimal) -> Result<Order, ExchangeError>;

    async fn cancel_all_orders(
        &self,
        symbol: &str,
        text: &str,
    ) -> Result<CancelAllOutcome, ExchangeError>;

    /// Close the whole position; without a price a market order is submitted
    async fn close_position(&self, symbol: &str, price: Option<Decimal>) -> Result<Order, ExchangeError>;

    async fn get_order(
        &self,
        symbol: &str,
        order_id: &str,
        count: u32,
    ) -> Result<Option<Order>, ExchangeError>;

    async fn get_orders(&self, symbol: &str, count: u32) -> Result<Vec<Order>, ExchangeError>;

    async fn get_open_orders(&self, symbol: &str, count: u32) -> Result<Vec<Order>, ExchangeError>;
}

#[async_trait]
pub trait AccountInfo {
    async fn get_wallet(&self) -> Result<Wallet, ExchangeError>;
    async fn get_margin(&self) -> Result<Margin, ExchangeError>;
    async fn get_positions(&self, symbol: &str) -> Result<Vec<Position>, ExchangeError>;
    async fn get_open_positions(&self, symbol: &str) -> Result<Vec<Position>, ExchangeError>;
    async fn get_closed_positions(&self, symbol: &str) -> Result<Vec<Position>, ExchangeError>;

    /// A leverage of 0 switches the position to cross margin
    async fn set_leverage(&self, symbol: &str, leverage: Decimal) -> Result<Position, ExchangeError>;
}

// Composite trait for callers that need the whole surface
#[async_trait]
pub trait ExchangeConnector: MarketDataSource + OrderPlacer + AccountInfo {}
