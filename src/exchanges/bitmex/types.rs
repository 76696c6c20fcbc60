use crate::core::errors::ExchangeError;

/// Extension trait for attaching breadcrumb context to failed calls
pub trait BitmexResultExt<T> {
    fn with_symbol_context(self, symbol: &str) -> Result<T, ExchangeError>;
    fn with_order_context(self, order_id: &str) -> Result<T, ExchangeError>;
}

impl<T, E> BitmexResultExt<T> for Result<T, E>
where
    E: Into<ExchangeError>,
{
    fn with_symbol_context(self, symbol: &str) -> Result<T, ExchangeError> {
        self.map_err(|e| {
            let error = e.into();
            match &error {
                ExchangeError::ApiError { status, name, message } => {
                    tracing::error!(symbol = %symbol, status, name = %name, message = %message, "Venue rejected request");
                }
                ExchangeError::DecodeError(reason) => {
                    tracing::error!(symbol = %symbol, error = %reason, "Unexpected response shape");
                }
                _ => {
                    tracing::error!(symbol = %symbol, error = %error, "BitMEX operation failed");
                }
            }
            error
        })
    }

    fn with_order_context(self, order_id: &str) -> Result<T, ExchangeError> {
        self.map_err(|e| {
            let error = e.into();
            tracing::error!(order_id = %order_id, error = %error, "Order operation failed");
            error
        })
    }
}
