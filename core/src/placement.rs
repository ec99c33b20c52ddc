// salesdesk/core/src/placement.rs

//! The order placement service: validates a purchase request, then writes the
//! order header and its lines as a single all-or-nothing transaction.

use crate::codes::format_order_code;
use crate::error::{SalesError, SalesResult};
use crate::model::{NewOrderHeader, NewOrderLine, Order, PlaceOrderRequest};
use crate::store::{OrderStore, OrderTransaction};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Money columns are `NUMERIC(12,2)`: two fractional digits, ten integral ones.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a money column can hold.
pub fn max_money() -> Decimal {
  Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Whether `amount` fits a money column without rounding or overflow.
pub fn fits_money_column(amount: Decimal) -> bool {
  amount.normalize().scale() <= MONEY_SCALE && amount.abs() <= max_money()
}

/// What happens to a product's stock when an order line is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
  /// Stock is checked against the requested quantity but left untouched.
  /// Accounting is deferred to a separate fulfilment step.
  #[default]
  CheckOnly,
  /// Stock is decremented under the same row lock as the check.
  Reserve,
}

pub struct OrderPlacementService {
  store: Arc<dyn OrderStore>,
  stock_policy: StockPolicy,
}

impl OrderPlacementService {
  pub fn new(store: Arc<dyn OrderStore>) -> Self {
    Self {
      store,
      stock_policy: StockPolicy::default(),
    }
  }

  pub fn with_stock_policy(mut self, stock_policy: StockPolicy) -> Self {
    self.stock_policy = stock_policy;
    self
  }

  pub fn stock_policy(&self) -> StockPolicy {
    self.stock_policy
  }

  /// Places an order. On success the committed order is returned with its lines and
  /// denormalized names; on any failure nothing the attempt wrote survives.
  #[instrument(
    name = "OrderPlacementService::place_order",
    skip_all,
    fields(
      customer_id = ?request.customer_id,
      salesperson_id = ?request.salesperson_id,
      items = request.items.len(),
    )
  )]
  pub async fn place_order(&self, request: PlaceOrderRequest) -> SalesResult<Order> {
    if let Err(e) = validate_request(&request) {
      warn!(error = %e, "Order request rejected.");
      return Err(e);
    }

    let mut tx = self.store.begin().await.map_err(|e| {
      error!(error = %e, "Could not start order transaction.");
      e
    })?;
    let order_id = match self.write_order(tx.as_mut(), &request).await {
      Ok(order_id) => order_id,
      Err(e) => {
        if e.is_business_rejection() {
          warn!(error = %e, "Order rejected, rolling back.");
        } else {
          error!(error = %e, "Order placement failed, rolling back.");
        }
        if let Err(rollback_err) = tx.rollback().await {
          // The connection is discarded either way; report the triggering error.
          error!(error = %rollback_err, "Rollback failed.");
        }
        return Err(e);
      }
    };
    tx.commit().await.map_err(|e| {
      error!(error = %e, order_id, "Order commit failed.");
      e
    })?;

    let order = self
      .store
      .find_order(order_id)
      .await
      .and_then(|found| {
        found.ok_or_else(|| SalesError::Internal(format!("order {} vanished right after commit", order_id)))
      })
      .map_err(|e| {
        error!(error = %e, order_id, "Committed order could not be read back.");
        e
      })?;
    info!(order_id = order.id, code = %order.code, total = %order.total_value, "Order placed.");
    Ok(order)
  }

  /// Reads one committed order.
  #[instrument(name = "OrderPlacementService::get_order", skip(self), err(level = "warn", Display))]
  pub async fn get_order(&self, order_id: i64) -> SalesResult<Order> {
    self
      .store
      .find_order(order_id)
      .await?
      .ok_or(SalesError::OrderNotFound { order_id })
  }

  async fn write_order(&self, tx: &mut dyn OrderTransaction, request: &PlaceOrderRequest) -> SalesResult<i64> {
    let discount = request.effective_discount();

    let sequence = tx.next_order_sequence().await?;
    let code = format_order_code(sequence);
    let order_id = tx
      .insert_order_header(&NewOrderHeader {
        code: code.clone(),
        customer_id: request.customer_id,
        salesperson_id: request.salesperson_id,
        discount,
      })
      .await?;
    debug!(order_id, code = %code, "Order header inserted.");

    let mut subtotal = Decimal::ZERO;
    for item in &request.items {
      let product = tx
        .lock_product(item.product_id)
        .await?
        .ok_or(SalesError::ProductNotFound {
          product_id: item.product_id,
        })?;

      if !product.covers(item.quantity) {
        return Err(SalesError::StockInsufficient {
          product_id: item.product_id,
          requested: item.quantity,
          available: product.stock_level,
        });
      }

      let line = NewOrderLine {
        order_id,
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price: product.price,
      };
      let line_subtotal = line.subtotal();
      if !fits_money_column(line_subtotal) {
        return Err(SalesError::validation(format!(
          "line subtotal {} for product {} exceeds the largest storable amount",
          line_subtotal, item.product_id
        )));
      }
      tx.insert_order_line(&line).await?;
      subtotal += line_subtotal;
      if !fits_money_column(subtotal) {
        return Err(SalesError::validation(format!(
          "order subtotal {} exceeds the largest storable amount",
          subtotal
        )));
      }

      if self.stock_policy == StockPolicy::Reserve {
        tx.decrement_stock(item.product_id, item.quantity).await?;
      }
      debug!(
        order_id,
        product_id = item.product_id,
        quantity = item.quantity,
        unit_price = %product.price,
        "Order line inserted."
      );
    }

    if discount > subtotal {
      return Err(SalesError::validation(format!(
        "discount {} exceeds order subtotal {}",
        discount, subtotal
      )));
    }
    tx.set_order_total(order_id, subtotal - discount).await?;

    Ok(order_id)
  }
}

/// Rejections that need no storage access: empty orders, non-positive quantities
/// and discounts that are negative or do not fit a money column.
pub fn validate_request(request: &PlaceOrderRequest) -> SalesResult<()> {
  if request.items.is_empty() {
    return Err(SalesError::validation("an order needs at least one item"));
  }
  if let Some(item) = request.items.iter().find(|item| item.quantity <= 0) {
    return Err(SalesError::validation(format!(
      "quantity for product {} must be a positive integer, got {}",
      item.product_id, item.quantity
    )));
  }
  let discount = request.effective_discount();
  if discount < Decimal::ZERO {
    return Err(SalesError::validation("discount cannot be negative"));
  }
  if !fits_money_column(discount) {
    return Err(SalesError::validation(format!(
      "discount {} must have at most {} decimal places and not exceed {}",
      discount,
      MONEY_SCALE,
      max_money()
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::LineItemRequest;

  fn item(product_id: i64, quantity: i32) -> LineItemRequest {
    LineItemRequest { product_id, quantity }
  }

  #[test]
  fn validation_rejects_empty_orders() {
    let err = validate_request(&PlaceOrderRequest::new(None, None, vec![])).unwrap_err();
    assert!(matches!(err, SalesError::Validation { .. }));
  }

  #[test]
  fn validation_rejects_zero_and_negative_quantities() {
    for quantity in [0, -3] {
      let request = PlaceOrderRequest::new(Some(1), Some(1), vec![item(1, 1), item(9, quantity)]);
      match validate_request(&request).unwrap_err() {
        SalesError::Validation { message } => assert!(message.contains("product 9")),
        other => panic!("Expected Validation, got {:?}", other),
      }
    }
  }

  #[test]
  fn validation_rejects_negative_discount() {
    let request = PlaceOrderRequest::new(None, None, vec![item(1, 1)]).with_discount(Decimal::new(-1, 0));
    assert!(validate_request(&request).is_err());
  }

  #[test]
  fn validation_rejects_sub_cent_and_oversized_discounts() {
    for discount in [Decimal::new(5, 3), Decimal::new(1, 10), Decimal::new(10_000_000_000, 0)] {
      let request = PlaceOrderRequest::new(None, None, vec![item(1, 1)]).with_discount(discount);
      assert!(
        matches!(validate_request(&request), Err(SalesError::Validation { .. })),
        "discount {} should be rejected",
        discount
      );
    }
  }

  #[test]
  fn trailing_zeros_do_not_count_as_precision() {
    let request = PlaceOrderRequest::new(None, None, vec![item(1, 1)]).with_discount(Decimal::new(1500, 3));
    assert!(validate_request(&request).is_ok());
    assert!(fits_money_column(max_money()));
    assert!(!fits_money_column(max_money() + Decimal::new(1, 2)));
  }

  #[test]
  fn validation_accepts_a_plain_order() {
    let request = PlaceOrderRequest::new(None, None, vec![item(1, 1)]);
    assert!(validate_request(&request).is_ok());
    assert_eq!(StockPolicy::default(), StockPolicy::CheckOnly);
  }
}
