// salesdesk/core/src/model/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle tag of an order. Only `Pending` is ever written by the placement service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Invoiced,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Invoiced => "invoiced",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(OrderStatus::Pending),
      "invoiced" => Ok(OrderStatus::Invoiced),
      "cancelled" => Ok(OrderStatus::Cancelled),
      other => Err(format!("unknown order status '{}'", other)),
    }
  }
}

/// One `{product_id, quantity}` entry of an incoming purchase request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRequest {
  pub product_id: i64,
  pub quantity: i32,
}

/// Incoming purchase request, as accepted by `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
  #[serde(default)]
  pub customer_id: Option<i64>,
  #[serde(default)]
  pub salesperson_id: Option<i64>,
  pub items: Vec<LineItemRequest>,
  #[serde(default)]
  pub discount: Option<Decimal>,
}

impl PlaceOrderRequest {
  pub fn new(customer_id: Option<i64>, salesperson_id: Option<i64>, items: Vec<LineItemRequest>) -> Self {
    Self {
      customer_id,
      salesperson_id,
      items,
      discount: None,
    }
  }

  pub fn with_discount(mut self, discount: Decimal) -> Self {
    self.discount = Some(discount);
    self
  }

  /// Discount with the "absent means zero" default applied.
  pub fn effective_discount(&self) -> Decimal {
    self.discount.unwrap_or(Decimal::ZERO)
  }
}

/// Header row written at step 3 of order placement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderHeader {
  pub code: String,
  pub customer_id: Option<i64>,
  pub salesperson_id: Option<i64>,
  pub discount: Decimal,
}

/// Line row written once per item, carrying the snapshot price.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
  pub order_id: i64,
  pub product_id: i64,
  pub quantity: i32,
  pub unit_price: Decimal,
}

impl NewOrderLine {
  pub fn subtotal(&self) -> Decimal {
    self.unit_price * Decimal::from(self.quantity)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
  pub id: i64,
  pub order_id: i64,
  pub product_id: i64,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub subtotal: Decimal,
}

/// A persisted order, enriched with the denormalized customer and salesperson names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
  pub id: i64,
  pub code: String,
  pub customer_id: Option<i64>,
  pub customer_name: Option<String>,
  pub salesperson_id: Option<i64>,
  pub salesperson_name: Option<String>,
  pub discount: Decimal,
  pub status: OrderStatus,
  pub total_value: Decimal,
  pub created_at: DateTime<Utc>,
  pub lines: Vec<OrderLine>,
}
