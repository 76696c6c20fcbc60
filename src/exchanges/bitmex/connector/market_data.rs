use crate::core::errors::ExchangeError;
use crate::core::kernel::HttpTransport;
use crate::core::traits::MarketDataSource;
use crate::core::types::{BinSize, Candle, OrderBookLevel, Ticker};
use crate::exchanges::bitmex::normalize::{duplicate_timestamps, sort_candles};
use crate::exchanges::bitmex::rest::BitmexRestClient;
use crate::exchanges::bitmex::types::BitmexResultExt;
use async_trait::async_trait;
use tracing::{instrument, warn};

/// Market data implementation for BitMEX
pub struct MarketData<T: HttpTransport> {
    rest: BitmexRestClient<T>,
}

impl<T: HttpTransport> MarketData<T> {
    pub fn new(rest: &BitmexRestClient<T>) -> Self {
        Self { rest: rest.clone() }
    }
}

#[async_trait]
impl<T: HttpTransport> MarketDataSource for MarketData<T> {
    #[instrument(skip(self), fields(exchange = "bitmex"))]
    async fn get_ticker(&self, symbol: Option<&str>) -> Result<Vec<Ticker>, ExchangeError> {
        self.rest
            .get_ticker(symbol)
            .await
            .with_symbol_context(symbol.unwrap_or("*"))
    }

    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %symbol, bin_size = %bin_size))]
    async fn get_candles(
        &self,
        symbol: &str,
        bin_size: BinSize,
        count: u32,
    ) -> Result<Vec<Candle>, ExchangeError> {
        let candles = self
            .rest
            .get_candles(symbol, bin_size, count)
            .await
            .with_symbol_context(symbol)?;

        let candles = sort_candles(candles);
        let duplicates = duplicate_timestamps(&candles);
        if !duplicates.is_empty() {
            warn!(
                symbol = %symbol,
                count = duplicates.len(),
                first = %duplicates[0],
                "candles with duplicate open time"
            );
        }
        Ok(candles)
    }

    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %symbol))]
    async fn get_order_book(
        &self,
        symbol: &str,
        depth: u32,
    ) -> Result<Vec<OrderBookLevel>, ExchangeError> {
        self.rest
            .get_order_book(symbol, depth)
            .await
            .with_symbol_context(symbol)
    }
}
