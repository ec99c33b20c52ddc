// salesdesk/server/src/models/product.rs

use crate::errors::AppError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{non_blank, STATUS_ACTIVE, STATUS_INACTIVE};

pub const DEFAULT_MINIMUM_STOCK: i32 = 5;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: i64,
  pub code: String,
  pub name: String,
  pub category: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub cost: Option<Decimal>,
  pub stock_level: i32,
  pub minimum_stock: i32,
  pub view_count: i32,
  pub average_rating: Option<Decimal>,
  pub status: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductRequest {
  pub name: Option<String>,
  pub category: Option<String>,
  pub description: Option<String>,
  pub price: Option<Decimal>,
  pub cost: Option<Decimal>,
  pub stock_level: Option<i32>,
  pub minimum_stock: Option<i32>,
}

/// A validated product ready to insert; the code is assigned at insert time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
  pub name: String,
  pub category: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub cost: Option<Decimal>,
  pub stock_level: i32,
  pub minimum_stock: i32,
}

impl CreateProductRequest {
  pub fn into_new_product(self) -> Result<NewProduct, AppError> {
    let (name, category, price, stock_level) =
      match (non_blank(self.name), non_blank(self.category), self.price, self.stock_level) {
        (Some(name), Some(category), Some(price), Some(stock_level)) => (name, category, price, stock_level),
        _ => {
          return Err(AppError::Validation(
            "Missing required fields: name, category, price, stock_level".into(),
          ))
        }
      };
    if price < Decimal::ZERO {
      return Err(AppError::Validation("Price cannot be negative".into()));
    }
    if stock_level < 0 {
      return Err(AppError::Validation("Stock level cannot be negative".into()));
    }
    if self.cost.is_some_and(|cost| cost < Decimal::ZERO) {
      return Err(AppError::Validation("Cost cannot be negative".into()));
    }
    let minimum_stock = self.minimum_stock.unwrap_or(DEFAULT_MINIMUM_STOCK);
    if minimum_stock < 0 {
      return Err(AppError::Validation("Minimum stock cannot be negative".into()));
    }
    Ok(NewProduct {
      name,
      category,
      description: non_blank(self.description),
      price,
      cost: self.cost,
      stock_level,
      minimum_stock,
    })
  }
}

/// Partial update: `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductRequest {
  pub name: Option<String>,
  pub category: Option<String>,
  pub description: Option<String>,
  pub price: Option<Decimal>,
  pub cost: Option<Decimal>,
  pub stock_level: Option<i32>,
  pub minimum_stock: Option<i32>,
  pub status: Option<String>,
}

impl UpdateProductRequest {
  pub fn validate(&self) -> Result<(), AppError> {
    if self.price.is_some_and(|p| p < Decimal::ZERO) {
      return Err(AppError::Validation("Price cannot be negative".into()));
    }
    if self.cost.is_some_and(|c| c < Decimal::ZERO) {
      return Err(AppError::Validation("Cost cannot be negative".into()));
    }
    if self.stock_level.is_some_and(|s| s < 0) {
      return Err(AppError::Validation("Stock level cannot be negative".into()));
    }
    if self.minimum_stock.is_some_and(|s| s < 0) {
      return Err(AppError::Validation("Minimum stock cannot be negative".into()));
    }
    if let Some(status) = self.status.as_deref() {
      if status != STATUS_ACTIVE && status != STATUS_INACTIVE {
        return Err(AppError::Validation(format!("Invalid status '{}'", status)));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  fn full_request() -> CreateProductRequest {
    CreateProductRequest {
      name: Some("Robot Arm Kit".into()),
      category: Some("Kits".into()),
      price: Some(dec!(199.90)),
      stock_level: Some(12),
      ..Default::default()
    }
  }

  #[test]
  fn minimum_stock_defaults_to_five() {
    let product = full_request().into_new_product().unwrap();
    assert_eq!(product.minimum_stock, DEFAULT_MINIMUM_STOCK);
    assert_eq!(product.price, dec!(199.90));
  }

  #[test]
  fn required_fields_are_enforced() {
    let mut request = full_request();
    request.category = None;
    match request.into_new_product() {
      Err(AppError::Validation(msg)) => assert!(msg.contains("category")),
      other => panic!("Expected validation error, got {:?}", other),
    }
  }

  #[test]
  fn zero_stock_is_allowed_but_negative_values_are_not() {
    let mut request = full_request();
    request.stock_level = Some(0);
    assert!(request.into_new_product().is_ok());

    let mut request = full_request();
    request.price = Some(dec!(-0.01));
    assert!(request.into_new_product().is_err());

    let mut request = full_request();
    request.stock_level = Some(-1);
    assert!(request.into_new_product().is_err());
  }

  #[test]
  fn partial_update_checks_only_present_fields() {
    assert!(UpdateProductRequest::default().validate().is_ok());
    let bad = UpdateProductRequest {
      status: Some("archived".into()),
      ..Default::default()
    };
    assert!(bad.validate().is_err());
  }
}
