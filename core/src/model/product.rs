// salesdesk/core/src/model/product.rs

use rust_decimal::Decimal;
use serde::Serialize;

/// The two product fields the placement service needs, taken from one locked read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSnapshot {
  pub product_id: i64,
  pub stock_level: i32,
  pub price: Decimal,
}

impl ProductSnapshot {
  pub fn covers(&self, quantity: i32) -> bool {
    self.stock_level >= quantity
  }
}
