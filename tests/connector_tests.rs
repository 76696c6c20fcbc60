mod common;

use bitmex_gateway::core::traits::{AccountInfo, MarketDataSource, OrderPlacer};
use bitmex_gateway::core::types::{BinSize, CancelAllOutcome, OrderStatus, Side};
use common::*;
use reqwest::Method;
use rust_decimal::Decimal;
use serde_json::json;

#[cfg(test)]
mod market_data_tests {
    use super::*;

    #[tokio::test]
    async fn test_candles_come_back_oldest_first() {
        let transport = MockTransport::new();
        // the venue answers newest first because of reverse=true
        transport.json(
            Method::GET,
            "trade/bucketed",
            json!([
                candle_json("2019-03-05T12:03:00.000Z", 3.0),
                candle_json("2019-03-05T12:01:00.000Z", 1.0),
                candle_json("2019-03-05T12:02:00.000Z", 2.0),
            ]),
        );
        let connector = connector(read_only_config(), &transport);

        let candles = connector
            .get_candles("XBTUSD", BinSize::OneMinute, 3)
            .await
            .unwrap();
        let minutes: Vec<String> = candles
            .iter()
            .map(|c| c.timestamp.format("%H:%M").to_string())
            .collect();
        assert_eq!(minutes, vec!["12:01", "12:02", "12:03"]);

        let sent = transport.last();
        assert_eq!(
            sent.query(),
            Some("symbol=XBTUSD&count=3&binSize=1m&partial=false&reverse=true")
        );
    }

    #[tokio::test]
    async fn test_duplicate_candles_are_kept() {
        let transport = MockTransport::new();
        transport.json(
            Method::GET,
            "trade/bucketed",
            json!([
                candle_json("2019-03-05T13:00:00.000Z", 2.0),
                candle_json("2019-03-05T13:00:00.000Z", 3.0),
                candle_json("2019-03-05T12:00:00.000Z", 1.0),
            ]),
        );
        let connector = connector(read_only_config(), &transport);

        let candles = connector
            .get_candles("XBTUSD", BinSize::OneHour, 3)
            .await
            .unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[1].timestamp, candles[2].timestamp);
    }

    #[tokio::test]
    async fn test_order_book_default_depth() {
        let transport = MockTransport::new();
        transport.json(
            Method::GET,
            "orderBook/L2",
            json!([
                {"symbol": "XBTUSD", "id": 8799049950u64, "side": "Sell", "size": 200, "price": 9500.5},
                {"symbol": "XBTUSD", "id": 8799050000u64, "side": "Buy", "size": 150, "price": 9500}
            ]),
        );
        let connector = connector(read_only_config(), &transport);

        let book = connector.get_order_book("XBTUSD", 0).await.unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(book[0].side, Side::Sell);
        assert_eq!(transport.last().query(), Some("symbol=XBTUSD&depth=25"));

        connector.get_order_book("XBTUSD", 10).await.unwrap();
        assert_eq!(transport.last().query(), Some("symbol=XBTUSD&depth=10"));
    }

    #[tokio::test]
    async fn test_ticker_without_symbol_lists_everything() {
        let transport = MockTransport::new();
        transport.json(
            Method::GET,
            "instrument",
            json!([{"symbol": "XBTUSD"}, {"symbol": "ETHUSD"}]),
        );
        let connector = connector(read_only_config(), &transport);

        let tickers = connector.get_ticker(None).await.unwrap();
        assert_eq!(tickers.len(), 2);
        assert_eq!(transport.last().query(), None);
    }
}

#[cfg(test)]
mod trading_tests {
    use super::*;

    fn mixed_orders() -> serde_json::Value {
        json!([
            order_json("a", "New"),
            order_json("b", "Filled"),
            order_json("c", "PartiallyFilled"),
            order_json("d", "Canceled"),
        ])
    }

    #[tokio::test]
    async fn test_open_orders_filtered() {
        let transport = MockTransport::new();
        transport.json(Method::GET, "order", mixed_orders());
        let connector = connector(signed_config(), &transport);

        let open = connector.get_open_orders("XBTUSD", 4).await.unwrap();
        let ids: Vec<&str> = open.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let all = connector.get_orders("XBTUSD", 4).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_get_order_by_id() {
        let transport = MockTransport::new();
        transport.json(Method::GET, "order", mixed_orders());
        let connector = connector(signed_config(), &transport);

        let found = connector.get_order("XBTUSD", "b", 4).await.unwrap();
        assert_eq!(found.map(|o| o.ord_status), Some(OrderStatus::Filled));

        let missing = connector.get_order("XBTUSD", "zzz", 4).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_edit_order_price_is_put() {
        let transport = MockTransport::new();
        transport.json(Method::PUT, "order", order_json("abc", "New"));
        let connector = connector(signed_config(), &transport);

        let price: Decimal = "9601.0".parse().unwrap();
        connector.edit_order_price("abc", price).await.unwrap();

        let sent = transport.last();
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.body.as_deref(), Some("orderID=abc&price=9601"));
    }

    #[tokio::test]
    async fn test_close_position_with_and_without_price() {
        let transport = MockTransport::new();
        transport.json(Method::POST, "order/closePosition", order_json("close", "Filled"));
        let connector = connector(signed_config(), &transport);

        connector.close_position("XBTUSD", None).await.unwrap();
        assert_eq!(transport.last().body.as_deref(), Some("symbol=XBTUSD"));

        connector
            .close_position("XBTUSD", Some("9800".parse().unwrap()))
            .await
            .unwrap();
        assert_eq!(
            transport.last().body.as_deref(),
            Some("symbol=XBTUSD&price=9800")
        );

        // zero falls back to a market close
        connector
            .close_position("XBTUSD", Some(Decimal::ZERO))
            .await
            .unwrap();
        assert_eq!(transport.last().body.as_deref(), Some("symbol=XBTUSD"));
    }

    #[tokio::test]
    async fn test_cancel_all_outcomes() {
        let transport = MockTransport::new();
        transport.json(
            Method::DELETE,
            "order/all",
            json!([order_json("a", "Canceled"), order_json("c", "Canceled")]),
        );
        let connector = connector(signed_config(), &transport);

        let outcome = connector
            .cancel_all_orders("XBTUSD", "shutting down")
            .await
            .unwrap();
        assert_eq!(outcome.canceled_count(), 2);

        let sent = transport.last();
        assert_eq!(sent.method, Method::DELETE);
        assert_eq!(sent.body.as_deref(), Some("symbol=XBTUSD&text=shutting+down"));

        let transport = MockTransport::new();
        transport.json(Method::DELETE, "order/all", json!([]));
        let connector = common::connector(signed_config(), &transport);
        let outcome = connector.cancel_all_orders("XBTUSD", "").await.unwrap();
        assert_eq!(outcome, CancelAllOutcome::Empty);
    }
}

#[cfg(test)]
mod account_tests {
    use super::*;

    #[tokio::test]
    async fn test_open_and_closed_positions() {
        let transport = MockTransport::new();
        transport.json(
            Method::GET,
            "position",
            json!([
                position_json("A", true),
                position_json("B", false),
                position_json("C", true),
            ]),
        );
        let connector = connector(signed_config(), &transport);

        let open: Vec<String> = connector
            .get_open_positions("")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.symbol)
            .collect();
        assert_eq!(open, vec!["A", "C"]);
        // an empty symbol asks for every position
        assert_eq!(transport.last().query(), None);

        let closed = connector.get_closed_positions("").await.unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].symbol, "B");
    }

    #[tokio::test]
    async fn test_wallet_and_margin_use_xbt() {
        let transport = MockTransport::new();
        transport.json(
            Method::GET,
            "user/wallet",
            json!({"account": 42, "currency": "XBt", "amount": 150000, "timestamp": "2019-03-05T12:00:00.000Z"}),
        );
        transport.json(
            Method::GET,
            "user/margin",
            json!({"account": 42, "currency": "XBt", "walletBalance": 150000, "availableMargin": 120000}),
        );
        let connector = connector(signed_config(), &transport);

        let wallet = connector.get_wallet().await.unwrap();
        assert_eq!(wallet.amount, 150_000);
        assert_eq!(transport.last().query(), Some("currency=XBt"));

        let margin = connector.get_margin().await.unwrap();
        assert_eq!(margin.available_margin, Some(120_000));
        assert_eq!(transport.last().query(), Some("currency=XBt"));
    }

    #[tokio::test]
    async fn test_set_leverage() {
        let transport = MockTransport::new();
        transport.json(Method::POST, "position/leverage", position_json("XBTUSD", true));
        let connector = connector(signed_config(), &transport);

        let position = connector
            .set_leverage("XBTUSD", "25.0".parse().unwrap())
            .await
            .unwrap();
        assert!(position.is_open);
        assert_eq!(
            transport.last().body.as_deref(),
            Some("symbol=XBTUSD&leverage=25")
        );

        // cross margin
        connector.set_leverage("XBTUSD", Decimal::ZERO).await.unwrap();
        assert_eq!(
            transport.last().body.as_deref(),
            Some("symbol=XBTUSD&leverage=0")
        );
    }
}
