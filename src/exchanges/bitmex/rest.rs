use crate::core::errors::ExchangeError;
use crate::core::kernel::{GatewayClient, HttpTransport, RequestSpec, ReqwestTransport};
use crate::core::types::{
    BinSize, Candle, Margin, Order, OrderBookLevel, OrderRequest, Position, Ticker, Wallet,
};
use crate::exchanges::bitmex::endpoints;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;

/// Thin typed wrapper around the gateway client, one method per endpoint.
///
/// Returns venue data as received; ordering and filtering happen in the
/// connector components.
pub struct BitmexRestClient<T: HttpTransport = ReqwestTransport> {
    client: Arc<GatewayClient<T>>,
}

impl<T: HttpTransport> Clone for BitmexRestClient<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

/// Decimal as the venue expects it: plain notation, no trailing zeros.
fn decimal_param(value: Decimal) -> String {
    value.normalize().to_string()
}

impl<T: HttpTransport> BitmexRestClient<T> {
    pub fn new(client: Arc<GatewayClient<T>>) -> Self {
        Self { client }
    }

    pub fn gateway(&self) -> &GatewayClient<T> {
        &self.client
    }

    pub async fn get_ticker(&self, symbol: Option<&str>) -> Result<Vec<Ticker>, ExchangeError> {
        let spec = RequestSpec::get(endpoints::INSTRUMENT).param_opt("symbol", symbol);
        self.client.call_json(&spec).await
    }

    /// Most recent completed candles, newest first as the venue sends them.
    pub async fn get_candles(
        &self,
        symbol: &str,
        bin_size: BinSize,
        count: u32,
    ) -> Result<Vec<Candle>, ExchangeError> {
        let spec = RequestSpec::get(endpoints::TRADE_BUCKETED)
            .param("symbol", symbol)
            .param("count", count)
            .param("binSize", bin_size)
            .param("partial", false)
            .param("reverse", true);
        self.client.call_json(&spec).await
    }

    pub async fn get_orders(&self, symbol: &str, count: u32) -> Result<Vec<Order>, ExchangeError> {
        let spec = RequestSpec::get(endpoints::ORDER)
            .param("symbol", symbol)
            .param("count", count)
            .param("reverse", true)
            .authenticated();
        self.client.call_json(&spec).await
    }

    pub async fn get_positions(&self, symbol: Option<&str>) -> Result<Vec<Position>, ExchangeError> {
        let spec = RequestSpec::get(endpoints::POSITION)
            .param_opt("symbol", symbol)
            .authenticated();
        self.client.call_json(&spec).await
    }

    pub async fn close_position(
        &self,
        symbol: &str,
        price: Option<Decimal>,
    ) -> Result<Order, ExchangeError> {
        let spec = RequestSpec::post(endpoints::ORDER_CLOSE_POSITION)
            .param("symbol", symbol)
            // a zero price means a market close, same as no price
            .param_opt("price", price.filter(|p| !p.is_zero()).map(decimal_param))
            .authenticated();
        self.client.call_json(&spec).await
    }

    pub async fn amend_order_price(&self, order_id: &str, price: Decimal) -> Result<Order, ExchangeError> {
        if price <= Decimal::ZERO {
            return Err(ExchangeError::InvalidParameters(format!(
                "price {} is not valid for order {}",
                price, order_id
            )));
        }

        let spec = RequestSpec::put(endpoints::ORDER)
            .param("orderID", order_id)
            .param("price", decimal_param(price))
            .authenticated();
        self.client.call_json(&spec).await
    }

    pub async fn create_order(&self, order: &OrderRequest) -> Result<Order, ExchangeError> {
        order.validate()?;

        let mut spec = RequestSpec::post(endpoints::ORDER)
            .param("symbol", &order.symbol)
            .param("side", order.side)
            .param("price", decimal_param(order.price))
            .param("orderQty", order.quantity)
            .param("ordType", order.order_type.as_str());
        if order.post_only {
            spec = spec.param("execInst", endpoints::EXEC_INST_POST_ONLY);
        }
        self.client.call_json(&spec.authenticated()).await
    }

    /// Raw answer of `DELETE order/all`; its shape depends on the outcome.
    pub async fn cancel_all_orders(&self, symbol: &str, text: &str) -> Result<Value, ExchangeError> {
        let spec = RequestSpec::delete(endpoints::ORDER_ALL)
            .param("symbol", symbol)
            .param("text", text)
            .authenticated();
        self.client.call_json(&spec).await
    }

    pub async fn get_wallet(&self) -> Result<Wallet, ExchangeError> {
        let spec = RequestSpec::get(endpoints::USER_WALLET)
            .param("currency", endpoints::ACCOUNT_CURRENCY)
            .authenticated();
        self.client.call_json(&spec).await
    }

    pub async fn get_margin(&self) -> Result<Margin, ExchangeError> {
        let spec = RequestSpec::get(endpoints::USER_MARGIN)
            .param("currency", endpoints::ACCOUNT_CURRENCY)
            .authenticated();
        self.client.call_json(&spec).await
    }

    pub async fn get_order_book(
        &self,
        symbol: &str,
        depth: u32,
    ) -> Result<Vec<OrderBookLevel>, ExchangeError> {
        let depth = if depth == 0 {
            endpoints::DEFAULT_ORDER_BOOK_DEPTH
        } else {
            depth
        };
        let spec = RequestSpec::get(endpoints::ORDER_BOOK_L2)
            .param("symbol", symbol)
            .param("depth", depth);
        self.client.call_json(&spec).await
    }

    pub async fn set_leverage(&self, symbol: &str, leverage: Decimal) -> Result<Position, ExchangeError> {
        if leverage < Decimal::ZERO {
            return Err(ExchangeError::InvalidParameters(format!(
                "leverage {} for {} must not be negative",
                leverage, symbol
            )));
        }

        let spec = RequestSpec::post(endpoints::POSITION_LEVERAGE)
            .param("symbol", symbol)
            .param("leverage", decimal_param(leverage))
            .authenticated();
        self.client.call_json(&spec).await
    }
}
