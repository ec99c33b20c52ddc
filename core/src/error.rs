// salesdesk/core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SalesError {
  #[error("Invalid order request: {message}")]
  Validation { message: String },

  #[error("Stock insufficient for product ID: {product_id} (requested {requested}, available {available})")]
  StockInsufficient {
    product_id: i64,
    requested: i32,
    available: i32,
  },

  #[error("Product not found: {product_id}")]
  ProductNotFound { product_id: i64 },

  #[error("Order not found: {order_id}")]
  OrderNotFound { order_id: i64 },

  #[error("Storage operation '{operation}' failed. Source: {source}")]
  Storage {
    operation: &'static str,
    #[source]
    source: AnyhowError,
  },

  #[error("Internal sales error: {0}")]
  Internal(String),
}

impl SalesError {
  pub fn validation(message: impl Into<String>) -> Self {
    SalesError::Validation { message: message.into() }
  }

  /// Wraps any driver error as a `Storage` failure for the named operation.
  pub fn storage<E>(operation: &'static str, err: E) -> Self
  where
    E: Into<AnyhowError>,
  {
    SalesError::Storage {
      operation,
      source: err.into(),
    }
  }

  /// True for rejections caused by the request itself rather than the store.
  pub fn is_business_rejection(&self) -> bool {
    matches!(
      self,
      SalesError::Validation { .. } | SalesError::StockInsufficient { .. } | SalesError::ProductNotFound { .. }
    )
  }
}

impl From<AnyhowError> for SalesError {
  fn from(err: AnyhowError) -> Self {
    // Unwrap a SalesError that travelled through anyhow instead of nesting it.
    match err.downcast::<SalesError>() {
      Ok(sales_err) => sales_err,
      Err(other) => SalesError::Storage {
        operation: "unknown",
        source: other,
      },
    }
  }
}

pub type SalesResult<T, E = SalesError> = std::result::Result<T, E>;
