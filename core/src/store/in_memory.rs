// salesdesk/core/src/store/in_memory.rs

//! In-memory [`OrderStore`] used by tests, benchmarks and local runs without Postgres.
//!
//! Transactions are serialized by an async writer lock held for the whole life of
//! the transaction. A transaction buffers its order rows and stock movements and
//! merges only those into the committed tables on commit; dropping it discards
//! the buffer. Product, customer and employee rows are always read live, so the
//! seeding helpers may run while a transaction is open without losing writes.

use crate::error::{SalesError, SalesResult};
use crate::model::{NewOrderHeader, NewOrderLine, Order, OrderLine, OrderStatus, ProductSnapshot};
use crate::store::{OrderStore, OrderTransaction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct ProductRow {
  stock_level: i32,
  price: Decimal,
}

#[derive(Debug, Clone)]
struct OrderRow {
  id: i64,
  code: String,
  customer_id: Option<i64>,
  salesperson_id: Option<i64>,
  discount: Decimal,
  status: OrderStatus,
  total_value: Decimal,
  created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
  products: HashMap<i64, ProductRow>,
  customers: HashMap<i64, String>,
  employees: HashMap<i64, String>,
  orders: BTreeMap<i64, OrderRow>,
  lines: Vec<OrderLine>,
  order_sequence: i64,
  last_order_id: i64,
  last_line_id: i64,
}

/// Everything a transaction writes, kept apart from the committed tables.
#[derive(Debug, Default)]
struct Pending {
  orders: BTreeMap<i64, OrderRow>,
  lines: Vec<OrderLine>,
  stock_taken: HashMap<i64, i32>,
  order_sequence: i64,
  last_order_id: i64,
  last_line_id: i64,
}

#[derive(Debug, Default)]
struct Shared {
  committed: RwLock<Tables>,
  writer: Arc<AsyncMutex<()>>,
  fail_line_inserts: AtomicBool,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
  shared: Arc<Shared>,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_product(&self, product_id: i64, stock_level: i32, price: Decimal) {
    self
      .shared
      .committed
      .write()
      .products
      .insert(product_id, ProductRow { stock_level, price });
  }

  /// Changes a product's live price. Existing order lines keep their snapshot.
  pub fn set_product_price(&self, product_id: i64, price: Decimal) {
    if let Some(row) = self.shared.committed.write().products.get_mut(&product_id) {
      row.price = price;
    }
  }

  pub fn product_stock(&self, product_id: i64) -> Option<i32> {
    self.shared.committed.read().products.get(&product_id).map(|p| p.stock_level)
  }

  pub fn insert_customer(&self, customer_id: i64, name: impl Into<String>) {
    self.shared.committed.write().customers.insert(customer_id, name.into());
  }

  pub fn insert_employee(&self, employee_id: i64, name: impl Into<String>) {
    self.shared.committed.write().employees.insert(employee_id, name.into());
  }

  pub fn order_count(&self) -> usize {
    self.shared.committed.read().orders.len()
  }

  pub fn line_count(&self) -> usize {
    self.shared.committed.read().lines.len()
  }

  /// Codes of all committed orders, in id order.
  pub fn order_codes(&self) -> Vec<String> {
    self.shared.committed.read().orders.values().map(|o| o.code.clone()).collect()
  }

  /// Makes every subsequent `insert_order_line` fail with a storage error.
  pub fn fail_line_inserts(&self, enabled: bool) {
    self.shared.fail_line_inserts.store(enabled, Ordering::SeqCst);
  }
}

#[async_trait]
impl OrderStore for InMemoryStore {
  async fn begin(&self) -> SalesResult<Box<dyn OrderTransaction>> {
    let writer_guard = self.shared.writer.clone().lock_owned().await;
    let pending = {
      let tables = self.shared.committed.read();
      Pending {
        order_sequence: tables.order_sequence,
        last_order_id: tables.last_order_id,
        last_line_id: tables.last_line_id,
        ..Pending::default()
      }
    };
    trace!("In-memory transaction started.");
    Ok(Box::new(InMemoryTransaction {
      shared: self.shared.clone(),
      pending,
      _writer_guard: writer_guard,
    }))
  }

  async fn find_order(&self, order_id: i64) -> SalesResult<Option<Order>> {
    let tables = self.shared.committed.read();
    let row = match tables.orders.get(&order_id) {
      Some(row) => row,
      None => return Ok(None),
    };
    let lines = tables.lines.iter().filter(|l| l.order_id == order_id).cloned().collect();
    Ok(Some(Order {
      id: row.id,
      code: row.code.clone(),
      customer_id: row.customer_id,
      customer_name: row.customer_id.and_then(|id| tables.customers.get(&id).cloned()),
      salesperson_id: row.salesperson_id,
      salesperson_name: row.salesperson_id.and_then(|id| tables.employees.get(&id).cloned()),
      discount: row.discount,
      status: row.status,
      total_value: row.total_value,
      created_at: row.created_at,
      lines,
    }))
  }
}

struct InMemoryTransaction {
  shared: Arc<Shared>,
  pending: Pending,
  _writer_guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl OrderTransaction for InMemoryTransaction {
  async fn next_order_sequence(&mut self) -> SalesResult<i64> {
    self.pending.order_sequence += 1;
    Ok(self.pending.order_sequence)
  }

  async fn insert_order_header(&mut self, header: &NewOrderHeader) -> SalesResult<i64> {
    self.pending.last_order_id += 1;
    let id = self.pending.last_order_id;
    self.pending.orders.insert(
      id,
      OrderRow {
        id,
        code: header.code.clone(),
        customer_id: header.customer_id,
        salesperson_id: header.salesperson_id,
        discount: header.discount,
        status: OrderStatus::Pending,
        total_value: Decimal::ZERO,
        created_at: Utc::now(),
      },
    );
    Ok(id)
  }

  async fn lock_product(&mut self, product_id: i64) -> SalesResult<Option<ProductSnapshot>> {
    let taken = self.pending.stock_taken.get(&product_id).copied().unwrap_or(0);
    Ok(self.shared.committed.read().products.get(&product_id).map(|row| ProductSnapshot {
      product_id,
      stock_level: row.stock_level - taken,
      price: row.price,
    }))
  }

  async fn insert_order_line(&mut self, line: &NewOrderLine) -> SalesResult<()> {
    if self.shared.fail_line_inserts.load(Ordering::SeqCst) {
      return Err(SalesError::storage(
        "insert_order_line",
        anyhow::anyhow!("injected line insert failure"),
      ));
    }
    self.pending.last_line_id += 1;
    self.pending.lines.push(OrderLine {
      id: self.pending.last_line_id,
      order_id: line.order_id,
      product_id: line.product_id,
      quantity: line.quantity,
      unit_price: line.unit_price,
      subtotal: line.subtotal(),
    });
    Ok(())
  }

  async fn decrement_stock(&mut self, product_id: i64, quantity: i32) -> SalesResult<()> {
    if !self.shared.committed.read().products.contains_key(&product_id) {
      return Err(SalesError::ProductNotFound { product_id });
    }
    *self.pending.stock_taken.entry(product_id).or_insert(0) += quantity;
    Ok(())
  }

  async fn set_order_total(&mut self, order_id: i64, total_value: Decimal) -> SalesResult<()> {
    let row = self
      .pending
      .orders
      .get_mut(&order_id)
      .ok_or(SalesError::OrderNotFound { order_id })?;
    row.total_value = total_value;
    Ok(())
  }

  async fn commit(self: Box<Self>) -> SalesResult<()> {
    let InMemoryTransaction {
      shared,
      pending,
      _writer_guard,
    } = *self;
    let mut tables = shared.committed.write();
    for (product_id, quantity) in &pending.stock_taken {
      if let Some(row) = tables.products.get_mut(product_id) {
        row.stock_level -= quantity;
      }
    }
    tables.orders.extend(pending.orders);
    tables.lines.extend(pending.lines);
    tables.order_sequence = pending.order_sequence;
    tables.last_order_id = pending.last_order_id;
    tables.last_line_id = pending.last_line_id;
    debug!(stock_movements = pending.stock_taken.len(), "In-memory transaction committed.");
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> SalesResult<()> {
    debug!("In-memory transaction rolled back.");
    Ok(())
  }
}
