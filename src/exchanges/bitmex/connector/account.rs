use crate::core::errors::ExchangeError;
use crate::core::kernel::HttpTransport;
use crate::core::traits::AccountInfo;
use crate::core::types::{Margin, Position, Wallet};
use crate::exchanges::bitmex::normalize::{filter_closed_positions, filter_open_positions};
use crate::exchanges::bitmex::rest::BitmexRestClient;
use crate::exchanges::bitmex::types::BitmexResultExt;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::instrument;

/// Account implementation for BitMEX
pub struct Account<T: HttpTransport> {
    rest: BitmexRestClient<T>,
}

impl<T: HttpTransport> Account<T> {
    pub fn new(rest: &BitmexRestClient<T>) -> Self {
        Self { rest: rest.clone() }
    }
}

#[async_trait]
impl<T: HttpTransport> AccountInfo for Account<T> {
    #[instrument(skip(self), fields(exchange = "bitmex"))]
    async fn get_wallet(&self) -> Result<Wallet, ExchangeError> {
        self.rest.get_wallet().await
    }

    #[instrument(skip(self), fields(exchange = "bitmex"))]
    async fn get_margin(&self) -> Result<Margin, ExchangeError> {
        self.rest.get_margin().await
    }

    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %symbol))]
    async fn get_positions(&self, symbol: &str) -> Result<Vec<Position>, ExchangeError> {
        let symbol = (!symbol.is_empty()).then_some(symbol);
        self.rest
            .get_positions(symbol)
            .await
            .with_symbol_context(symbol.unwrap_or("*"))
    }

    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %symbol))]
    async fn get_open_positions(&self, symbol: &str) -> Result<Vec<Position>, ExchangeError> {
        let positions = self.get_positions(symbol).await?;
        Ok(filter_open_positions(positions))
    }

    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %symbol))]
    async fn get_closed_positions(&self, symbol: &str) -> Result<Vec<Position>, ExchangeError> {
        let positions = self.get_positions(symbol).await?;
        Ok(filter_closed_positions(positions))
    }

    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %symbol, leverage = %leverage))]
    async fn set_leverage(&self, symbol: &str, leverage: Decimal) -> Result<Position, ExchangeError> {
        self.rest
            .set_leverage(symbol, leverage)
            .await
            .with_symbol_context(symbol)
    }
}
