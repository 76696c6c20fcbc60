use anyhow::Context;
use bitmex_gateway::core::config::{ConfigError, ExchangeConfig};
use bitmex_gateway::core::traits::{AccountInfo, MarketDataSource};
use bitmex_gateway::{build_connector, BinSize};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config("BITMEX")?;
    let connector = build_connector(config).context("building BitMEX connector")?;

    let symbol = "XBTUSD";

    let tickers = connector
        .get_ticker(Some(symbol))
        .await
        .context("fetching ticker")?;
    for ticker in &tickers {
        println!(
            "{}: last {:?} bid {:?} ask {:?}",
            ticker.symbol, ticker.last_price, ticker.bid_price, ticker.ask_price
        );
    }

    let candles = connector
        .get_candles(symbol, BinSize::OneHour, 5)
        .await
        .context("fetching candles")?;
    for candle in &candles {
        println!(
            "{} O {:?} H {:?} L {:?} C {:?} V {}",
            candle.timestamp, candle.open, candle.high, candle.low, candle.close, candle.volume
        );
    }

    let book = connector
        .get_order_book(symbol, 5)
        .await
        .context("fetching order book")?;
    println!("order book: {} levels", book.len());

    if connector.can_authenticate() {
        let wallet = connector.get_wallet().await.context("fetching wallet")?;
        println!("wallet: {} {}", wallet.amount, wallet.currency);

        let open = connector
            .get_open_positions(symbol)
            .await
            .context("fetching positions")?;
        println!("open positions: {}", open.len());
    }

    Ok(())
}

/// `{PREFIX}_API_KEY` / `{PREFIX}_SECRET_KEY` enable the account section; without
/// them the demo runs read-only against testnet. Malformed values are an error.
fn load_config(prefix: &str) -> anyhow::Result<ExchangeConfig> {
    match ExchangeConfig::from_env(prefix) {
        Ok(config) => Ok(config),
        Err(ConfigError::MissingEnvironmentVariable(_)) => {
            Ok(ExchangeConfig::read_only().testnet(true))
        }
        Err(err) => Err(err).with_context(|| format!("loading {}_* configuration", prefix)),
    }
}
