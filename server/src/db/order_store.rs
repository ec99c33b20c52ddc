// salesdesk/server/src/db/order_store.rs

//! Postgres implementation of the core's storage traits.
//!
//! A `PgOrderTransaction` owns a `sqlx::Transaction`; if it is dropped without
//! `commit`, sqlx rolls it back and returns the connection to the pool.

use crate::db::counters::{next_counter_value, ORDER_COUNTER};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use salesdesk::{
  NewOrderHeader, NewOrderLine, Order, OrderLine, OrderStatus, OrderStore, OrderTransaction, ProductSnapshot,
  SalesError, SalesResult,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[derive(Debug, FromRow)]
struct OrderRow {
  id: i64,
  code: String,
  customer_id: Option<i64>,
  customer_name: Option<String>,
  salesperson_id: Option<i64>,
  salesperson_name: Option<String>,
  discount: Decimal,
  status: String,
  total_value: Decimal,
  created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct OrderLineRow {
  id: i64,
  order_id: i64,
  product_id: i64,
  quantity: i32,
  unit_price: Decimal,
  subtotal: Decimal,
}

impl From<OrderLineRow> for OrderLine {
  fn from(row: OrderLineRow) -> Self {
    OrderLine {
      id: row.id,
      order_id: row.order_id,
      product_id: row.product_id,
      quantity: row.quantity,
      unit_price: row.unit_price,
      subtotal: row.subtotal,
    }
  }
}

#[derive(Debug, FromRow)]
struct ProductLockRow {
  id: i64,
  stock_level: i32,
  price: Decimal,
}

#[async_trait]
impl OrderStore for PgOrderStore {
  async fn begin(&self) -> SalesResult<Box<dyn OrderTransaction>> {
    let tx = self.pool.begin().await.map_err(|e| SalesError::storage("begin", e))?;
    Ok(Box::new(PgOrderTransaction { tx }))
  }

  #[instrument(name = "PgOrderStore::find_order", skip(self), err(Display))]
  async fn find_order(&self, order_id: i64) -> SalesResult<Option<Order>> {
    let header: Option<OrderRow> = sqlx::query_as(
      "SELECT o.id, o.code, o.customer_id, c.name AS customer_name, \
              o.salesperson_id, e.name AS salesperson_name, \
              o.discount, o.status, o.total_value, o.created_at \
       FROM orders o \
       LEFT JOIN customers c ON o.customer_id = c.id \
       LEFT JOIN employees e ON o.salesperson_id = e.id \
       WHERE o.id = $1",
    )
    .bind(order_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| SalesError::storage("find_order", e))?;

    let header = match header {
      Some(header) => header,
      None => return Ok(None),
    };

    let lines: Vec<OrderLineRow> = sqlx::query_as(
      "SELECT id, order_id, product_id, quantity, unit_price, subtotal \
       FROM order_lines WHERE order_id = $1 ORDER BY id ASC",
    )
    .bind(order_id)
    .fetch_all(&self.pool)
    .await
    .map_err(|e| SalesError::storage("find_order_lines", e))?;

    let status = header
      .status
      .parse::<OrderStatus>()
      .map_err(|e| SalesError::Internal(format!("order {}: {}", header.id, e)))?;

    Ok(Some(Order {
      id: header.id,
      code: header.code,
      customer_id: header.customer_id,
      customer_name: header.customer_name,
      salesperson_id: header.salesperson_id,
      salesperson_name: header.salesperson_name,
      discount: header.discount,
      status,
      total_value: header.total_value,
      created_at: header.created_at,
      lines: lines.into_iter().map(OrderLine::from).collect(),
    }))
  }
}

struct PgOrderTransaction {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTransaction for PgOrderTransaction {
  async fn next_order_sequence(&mut self) -> SalesResult<i64> {
    next_counter_value(&mut *self.tx, ORDER_COUNTER)
      .await
      .map_err(|e| SalesError::storage("next_order_sequence", e))
  }

  async fn insert_order_header(&mut self, header: &NewOrderHeader) -> SalesResult<i64> {
    let order_id: i64 = sqlx::query_scalar(
      "INSERT INTO orders (code, customer_id, salesperson_id, discount, status) \
       VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&header.code)
    .bind(header.customer_id)
    .bind(header.salesperson_id)
    .bind(header.discount)
    .bind(OrderStatus::Pending.as_str())
    .fetch_one(&mut *self.tx)
    .await
    .map_err(|e| SalesError::storage("insert_order_header", e))?;
    debug!(order_id, code = %header.code, "Inserted order header.");
    Ok(order_id)
  }

  async fn lock_product(&mut self, product_id: i64) -> SalesResult<Option<ProductSnapshot>> {
    let row: Option<ProductLockRow> =
      sqlx::query_as("SELECT id, stock_level, price FROM products WHERE id = $1 FOR UPDATE")
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| SalesError::storage("lock_product", e))?;
    Ok(row.map(|r| ProductSnapshot {
      product_id: r.id,
      stock_level: r.stock_level,
      price: r.price,
    }))
  }

  async fn insert_order_line(&mut self, line: &NewOrderLine) -> SalesResult<()> {
    sqlx::query(
      "INSERT INTO order_lines (order_id, product_id, quantity, unit_price) \
       VALUES ($1, $2, $3, $4)",
    )
    .bind(line.order_id)
    .bind(line.product_id)
    .bind(line.quantity)
    .bind(line.unit_price)
    .execute(&mut *self.tx)
    .await
    .map_err(|e| SalesError::storage("insert_order_line", e))?;
    Ok(())
  }

  async fn decrement_stock(&mut self, product_id: i64, quantity: i32) -> SalesResult<()> {
    let result = sqlx::query("UPDATE products SET stock_level = stock_level - $1 WHERE id = $2")
      .bind(quantity)
      .bind(product_id)
      .execute(&mut *self.tx)
      .await
      .map_err(|e| SalesError::storage("decrement_stock", e))?;
    if result.rows_affected() != 1 {
      return Err(SalesError::ProductNotFound { product_id });
    }
    Ok(())
  }

  async fn set_order_total(&mut self, order_id: i64, total_value: Decimal) -> SalesResult<()> {
    sqlx::query("UPDATE orders SET total_value = $1 WHERE id = $2")
      .bind(total_value)
      .bind(order_id)
      .execute(&mut *self.tx)
      .await
      .map_err(|e| SalesError::storage("set_order_total", e))?;
    Ok(())
  }

  async fn commit(self: Box<Self>) -> SalesResult<()> {
    self.tx.commit().await.map_err(|e| SalesError::storage("commit", e))
  }

  async fn rollback(self: Box<Self>) -> SalesResult<()> {
    self.tx.rollback().await.map_err(|e| SalesError::storage("rollback", e))
  }
}
