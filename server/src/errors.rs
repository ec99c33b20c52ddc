// salesdesk/server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use salesdesk::SalesError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("{0}")]
  StockInsufficient(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Order Storage Error: {0}")]
  OrderStorage(#[source] SalesError),

  #[error("Internal Server Error: {0}")]
  Internal(String), // For miscellaneous errors
}

// Keep the core's classification: business rejections become 4xx, storage failures 5xx.
impl From<SalesError> for AppError {
  fn from(err: SalesError) -> Self {
    match err {
      SalesError::Validation { message } => AppError::Validation(message),
      e @ SalesError::StockInsufficient { .. } => AppError::StockInsufficient(e.to_string()),
      e @ (SalesError::ProductNotFound { .. } | SalesError::OrderNotFound { .. }) => AppError::NotFound(e.to_string()),
      e @ SalesError::Storage { .. } => AppError::OrderStorage(e),
      SalesError::Internal(m) => AppError::Internal(m),
    }
  }
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience in handlers
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::StockInsufficient(_) => StatusCode::CONFLICT,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::OrderStorage(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    match self {
      AppError::Validation(m) => {
        tracing::warn!(application_error = %self, "Responding with error");
        HttpResponse::BadRequest().json(json!({"error": m}))
      }
      AppError::NotFound(m) => {
        tracing::warn!(application_error = %self, "Responding with error");
        HttpResponse::NotFound().json(json!({"error": m}))
      }
      AppError::StockInsufficient(m) => {
        tracing::warn!(application_error = %self, "Responding with error");
        HttpResponse::Conflict().json(json!({"error": m}))
      }
      AppError::Config(m) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Sqlx(_) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"}))
      }
      AppError::OrderStorage(source) => {
        tracing::error!(application_error = %self, order_error_source = ?source, "Responding with error");
        HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"}))
      }
      AppError::Internal(m) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
