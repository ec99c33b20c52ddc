// salesdesk/core/src/store/mod.rs

//! Storage seams of the placement service.
//!
//! An [`OrderStore`] hands out [`OrderTransaction`]s. A transaction is a scoped
//! acquisition: whatever it wrote is discarded unless [`OrderTransaction::commit`]
//! is called, and dropping it (including dropping the future that owns it)
//! must roll back and release the underlying connection.

pub mod in_memory;

use crate::error::SalesResult;
use crate::model::{NewOrderHeader, NewOrderLine, Order, ProductSnapshot};
use async_trait::async_trait;
use rust_decimal::Decimal;

pub use in_memory::InMemoryStore;

#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
  /// Begins a transaction holding one exclusive connection.
  async fn begin(&self) -> SalesResult<Box<dyn OrderTransaction>>;

  /// Reads a committed order with its lines and the customer/salesperson names (left-joined).
  async fn find_order(&self, order_id: i64) -> SalesResult<Option<Order>>;
}

#[async_trait]
pub trait OrderTransaction: Send {
  /// Atomically reserves the next order number. Rolled back with the transaction.
  async fn next_order_sequence(&mut self) -> SalesResult<i64>;

  /// Inserts the header with status `pending` and returns its id.
  async fn insert_order_header(&mut self, header: &NewOrderHeader) -> SalesResult<i64>;

  /// Reads stock level and price in one read, locking the product row until commit/rollback.
  /// `None` when the product does not exist.
  async fn lock_product(&mut self, product_id: i64) -> SalesResult<Option<ProductSnapshot>>;

  async fn insert_order_line(&mut self, line: &NewOrderLine) -> SalesResult<()>;

  /// Only called under `StockPolicy::Reserve`, after `lock_product` for the same id.
  async fn decrement_stock(&mut self, product_id: i64, quantity: i32) -> SalesResult<()>;

  async fn set_order_total(&mut self, order_id: i64, total_value: Decimal) -> SalesResult<()>;

  async fn commit(self: Box<Self>) -> SalesResult<()>;

  async fn rollback(self: Box<Self>) -> SalesResult<()>;
}
