use crate::core::errors::ExchangeError;
use crate::core::kernel::HttpTransport;
use crate::core::traits::OrderPlacer;
use crate::core::types::{CancelAllOutcome, Order, OrderRequest};
use crate::exchanges::bitmex::normalize::{filter_open_orders, find_order_by_id};
use crate::exchanges::bitmex::rest::BitmexRestClient;
use crate::exchanges::bitmex::types::BitmexResultExt;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{info, instrument};

/// Trading implementation for BitMEX
pub struct Trading<T: HttpTransport> {
    rest: BitmexRestClient<T>,
}

impl<T: HttpTransport> Trading<T> {
    pub fn new(rest: &BitmexRestClient<T>) -> Self {
        Self { rest: rest.clone() }
    }
}

#[async_trait]
impl<T: HttpTransport> OrderPlacer for Trading<T> {
    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %order.symbol, side = %order.side, post_only = order.post_only))]
    async fn place_order(&self, order: OrderRequest) -> Result<Order, ExchangeError> {
        let placed = self
            .rest
            .create_order(&order)
            .await
            .with_symbol_context(&order.symbol)?;
        info!(order_id = %placed.order_id, status = ?placed.ord_status, "order placed");
        Ok(placed)
    }

    #[instrument(skip(self), fields(exchange = "bitmex", order_id = %order_id))]
    async fn edit_order_price(&self, order_id: &str, price: Decimal) -> Result<Order, ExchangeError> {
        self.rest
            .amend_order_price(order_id, price)
            .await
            .with_order_context(order_id)
    }

    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %symbol))]
    async fn cancel_all_orders(
        &self,
        symbol: &str,
        text: &str,
    ) -> Result<CancelAllOutcome, ExchangeError> {
        let raw = self
            .rest
            .cancel_all_orders(symbol, text)
            .await
            .with_symbol_context(symbol)?;
        let outcome = CancelAllOutcome::from_value(raw);
        info!(canceled = outcome.canceled_count(), "cancel all completed");
        Ok(outcome)
    }

    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %symbol))]
    async fn close_position(&self, symbol: &str, price: Option<Decimal>) -> Result<Order, ExchangeError> {
        self.rest
            .close_position(symbol, price)
            .await
            .with_symbol_context(symbol)
    }

    /// Searches the `count` most recent orders of `symbol`.
    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %symbol, order_id = %order_id))]
    async fn get_order(
        &self,
        symbol: &str,
        order_id: &str,
        count: u32,
    ) -> Result<Option<Order>, ExchangeError> {
        let orders = self
            .rest
            .get_orders(symbol, count)
            .await
            .with_symbol_context(symbol)?;
        Ok(find_order_by_id(&orders, order_id).cloned())
    }

    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %symbol))]
    async fn get_orders(&self, symbol: &str, count: u32) -> Result<Vec<Order>, ExchangeError> {
        self.rest
            .get_orders(symbol, count)
            .await
            .with_symbol_context(symbol)
    }

    #[instrument(skip(self), fields(exchange = "bitmex", symbol = %symbol))]
    async fn get_open_orders(&self, symbol: &str, count: u32) -> Result<Vec<Order>, ExchangeError> {
        let orders = self.get_orders(symbol, count).await?;
        Ok(filter_open_orders(orders))
    }
}
