use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    GatewayClientBuilder, HttpTransport, ReqwestTransport, RestClientConfig,
};
use crate::exchanges::bitmex::{
    connector::BitmexConnector, rest::BitmexRestClient, signer::BitmexSigner, API_VERSION,
    EXCHANGE_NAME,
};
use std::sync::Arc;
use tracing::info;

fn rest_config(config: &ExchangeConfig) -> RestClientConfig {
    RestClientConfig::new(
        format!("{}/{}", config.api_url(), API_VERSION),
        EXCHANGE_NAME.to_string(),
    )
    .with_timeout(config.http_timeout)
    .with_verbose(config.verbose)
    .with_rate_limits(config.rate_limits)
    .with_nonce_floor(config.nonce_floor)
}

fn gateway_builder(config: &ExchangeConfig) -> Result<GatewayClientBuilder, ExchangeError> {
    config.validate()?;

    let mut builder = GatewayClientBuilder::new(rest_config(config));

    // Without a signer every authenticated call fails with a configuration error
    if config.can_authenticate() {
        let signer = BitmexSigner::new(&config.api_key, &config.secret_key)?;
        builder = builder.with_signer(Arc::new(signer));
    }

    info!(
        exchange = EXCHANGE_NAME,
        url = %config.api_url(),
        testnet = config.testnet,
        authenticated = config.can_authenticate(),
        "building connector"
    );
    Ok(builder)
}

/// Create a BitMEX connector on top of reqwest
pub fn build_connector(config: ExchangeConfig) -> Result<BitmexConnector, ExchangeError> {
    let client = gateway_builder(&config)?.build()?;
    Ok(BitmexConnector::new(
        BitmexRestClient::new(Arc::new(client)),
        config.rest_polling_delay,
    ))
}

/// Create a BitMEX connector over a caller-supplied transport
pub fn build_connector_with_transport<T: HttpTransport>(
    config: ExchangeConfig,
    transport: T,
) -> Result<BitmexConnector<T>, ExchangeError> {
    let client = gateway_builder(&config)?.build_with_transport(transport)?;
    Ok(BitmexConnector::new(
        BitmexRestClient::new(Arc::new(client)),
        config.rest_polling_delay,
    ))
}

/// Create only the typed REST client, without the connector components
pub fn build_rest_client(config: &ExchangeConfig) -> Result<BitmexRestClient<ReqwestTransport>, ExchangeError> {
    let client = gateway_builder(config)?.build()?;
    Ok(BitmexRestClient::new(Arc::new(client)))
}
