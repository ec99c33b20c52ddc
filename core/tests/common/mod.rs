// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fixture

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use salesdesk::{
  InMemoryStore, LineItemRequest, NewOrderHeader, NewOrderLine, Order, OrderPlacementService, OrderStore,
  OrderTransaction, PlaceOrderRequest, ProductSnapshot, SalesResult,
};
use std::sync::Arc;
use tracing::Level;

pub const CUSTOMER_C1: i64 = 1;
pub const SALESPERSON_S1: i64 = 1;
pub const PRODUCT_P1: i64 = 1;
pub const PRODUCT_P2: i64 = 2;

/// Store with customer C1, salesperson S1 and no products.
pub fn directory_store() -> InMemoryStore {
  let store = InMemoryStore::new();
  store.insert_customer(CUSTOMER_C1, "Ana Souza");
  store.insert_employee(SALESPERSON_S1, "Carlos Lima");
  store
}

/// Directory plus P1 (stock 5, price 10.00) and P2 (stock 1, price 4.50).
pub fn seeded_store() -> InMemoryStore {
  let store = directory_store();
  store.insert_product(PRODUCT_P1, 5, dec!(10.00));
  store.insert_product(PRODUCT_P2, 1, dec!(4.50));
  store
}

pub fn service_for(store: &InMemoryStore) -> OrderPlacementService {
  OrderPlacementService::new(Arc::new(store.clone()))
}

pub fn item(product_id: i64, quantity: i32) -> LineItemRequest {
  LineItemRequest { product_id, quantity }
}

pub fn request(items: Vec<LineItemRequest>) -> PlaceOrderRequest {
  PlaceOrderRequest::new(Some(CUSTOMER_C1), Some(SALESPERSON_S1), items)
}

pub fn request_with_discount(items: Vec<LineItemRequest>, discount: Decimal) -> PlaceOrderRequest {
  request(items).with_discount(discount)
}

pub fn line_prices(order: &Order) -> Vec<Decimal> {
  order.lines.iter().map(|l| l.unit_price).collect()
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Layer that keeps the level of every event it sees, for asserting what a call logged.
#[derive(Clone, Default)]
pub struct LevelRecorder {
  levels: Arc<parking_lot::Mutex<Vec<Level>>>,
}

impl LevelRecorder {
  pub fn levels(&self) -> Vec<Level> {
    self.levels.lock().clone()
  }

  pub fn saw(&self, level: Level) -> bool {
    self.levels.lock().contains(&level)
  }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LevelRecorder {
  fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
    self.levels.lock().push(*event.metadata().level());
  }
}

/// Routes this thread's events to a fresh [`LevelRecorder`] until the guard drops.
pub fn record_levels() -> (LevelRecorder, tracing::subscriber::DefaultGuard) {
  use tracing_subscriber::layer::SubscriberExt;
  let recorder = LevelRecorder::default();
  let subscriber = tracing_subscriber::registry().with(recorder.clone());
  let guard = tracing::subscriber::set_default(subscriber);
  (recorder, guard)
}

// --- A store whose transactions never get past the first product read ---

/// Wraps an [`InMemoryStore`]; `lock_product` never completes, so a placement
/// running against it can only end by being dropped.
#[derive(Clone)]
pub struct StallingStore {
  pub inner: InMemoryStore,
}

#[async_trait]
impl OrderStore for StallingStore {
  async fn begin(&self) -> SalesResult<Box<dyn OrderTransaction>> {
    let inner = self.inner.begin().await?;
    Ok(Box::new(StallingTransaction { inner }))
  }

  async fn find_order(&self, order_id: i64) -> SalesResult<Option<Order>> {
    self.inner.find_order(order_id).await
  }
}

struct StallingTransaction {
  inner: Box<dyn OrderTransaction>,
}

#[async_trait]
impl OrderTransaction for StallingTransaction {
  async fn next_order_sequence(&mut self) -> SalesResult<i64> {
    self.inner.next_order_sequence().await
  }

  async fn insert_order_header(&mut self, header: &NewOrderHeader) -> SalesResult<i64> {
    self.inner.insert_order_header(header).await
  }

  async fn lock_product(&mut self, _product_id: i64) -> SalesResult<Option<ProductSnapshot>> {
    std::future::pending().await
  }

  async fn insert_order_line(&mut self, line: &NewOrderLine) -> SalesResult<()> {
    self.inner.insert_order_line(line).await
  }

  async fn decrement_stock(&mut self, product_id: i64, quantity: i32) -> SalesResult<()> {
    self.inner.decrement_stock(product_id, quantity).await
  }

  async fn set_order_total(&mut self, order_id: i64, total_value: Decimal) -> SalesResult<()> {
    self.inner.set_order_total(order_id, total_value).await
  }

  async fn commit(self: Box<Self>) -> SalesResult<()> {
    self.inner.commit().await
  }

  async fn rollback(self: Box<Self>) -> SalesResult<()> {
    self.inner.rollback().await
  }
}
