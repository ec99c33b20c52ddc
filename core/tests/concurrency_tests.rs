// tests/concurrency_tests.rs
mod common;
use common::*;
use rust_decimal_macros::dec;
use salesdesk::{NewOrderHeader, OrderPlacementService, OrderStore, PlaceOrderRequest, SalesError, StockPolicy};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_placements_get_unique_gapless_codes() {
  setup_tracing();
  let store = directory_store();
  store.insert_product(PRODUCT_P1, 1_000, dec!(2.00));
  let service = Arc::new(service_for(&store));

  let mut handles = Vec::new();
  for _ in 0..20 {
    let service = service.clone();
    handles.push(tokio::spawn(async move {
      service.place_order(request(vec![item(PRODUCT_P1, 1)])).await
    }));
  }

  let mut codes = BTreeSet::new();
  for handle in handles {
    let order = handle.await.expect("task panicked").expect("placement failed");
    assert!(codes.insert(order.code), "duplicate order code");
  }

  let expected: BTreeSet<String> = (1001..=1020).map(|n| format!("#PED-{}", n)).collect();
  assert_eq!(codes, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reserve_policy_never_oversells_under_contention() {
  setup_tracing();
  let store = directory_store();
  store.insert_product(PRODUCT_P1, 10, dec!(1.00));
  let service = Arc::new(service_for(&store).with_stock_policy(StockPolicy::Reserve));

  let mut handles = Vec::new();
  for _ in 0..15 {
    let service = service.clone();
    handles.push(tokio::spawn(async move {
      service.place_order(request(vec![item(PRODUCT_P1, 1)])).await
    }));
  }

  let mut placed = 0;
  let mut rejected = 0;
  for handle in handles {
    match handle.await.expect("task panicked") {
      Ok(_) => placed += 1,
      Err(SalesError::StockInsufficient { .. }) => rejected += 1,
      Err(other) => panic!("unexpected error: {:?}", other),
    }
  }

  assert_eq!(placed, 10);
  assert_eq!(rejected, 5);
  assert_eq!(store.product_stock(PRODUCT_P1), Some(0));
}

#[tokio::test]
async fn reserve_policy_decrements_stock_inside_the_transaction() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store).with_stock_policy(StockPolicy::Reserve);

  service.place_order(request(vec![item(PRODUCT_P1, 3)])).await.unwrap();
  assert_eq!(store.product_stock(PRODUCT_P1), Some(2));

  let err = service.place_order(request(vec![item(PRODUCT_P1, 3)])).await.unwrap_err();
  match err {
    SalesError::StockInsufficient { available, .. } => assert_eq!(available, 2),
    other => panic!("Expected StockInsufficient, got {:?}", other),
  }
  assert_eq!(store.product_stock(PRODUCT_P1), Some(2));
}

#[tokio::test]
async fn reserve_policy_restores_stock_when_a_later_line_fails() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store).with_stock_policy(StockPolicy::Reserve);

  let result = service
    .place_order(request(vec![item(PRODUCT_P1, 4), item(PRODUCT_P2, 2)]))
    .await;

  assert!(result.is_err());
  assert_eq!(store.product_stock(PRODUCT_P1), Some(5));
  assert_eq!(store.product_stock(PRODUCT_P2), Some(1));
}

#[tokio::test]
async fn dropped_placement_rolls_back_and_releases_the_store() {
  setup_tracing();
  let inner = seeded_store();
  let stalling = StallingStore { inner: inner.clone() };
  let stalled_service = OrderPlacementService::new(Arc::new(stalling));

  // The header is already written when the placement stalls on the product read.
  let timed_out = tokio::time::timeout(
    Duration::from_millis(50),
    stalled_service.place_order(request(vec![item(PRODUCT_P1, 1)])),
  )
  .await;
  assert!(timed_out.is_err(), "placement should have been cancelled");
  assert_eq!(inner.order_count(), 0);

  // The writer lock was released with the dropped transaction.
  let order = tokio::time::timeout(
    Duration::from_secs(1),
    service_for(&inner).place_order(request(vec![item(PRODUCT_P1, 1)])),
  )
  .await
  .expect("store still locked by the cancelled transaction")
  .unwrap();
  assert_eq!(order.code, "#PED-1001");
}

#[tokio::test]
async fn catalog_writes_during_an_open_transaction_survive_its_commit() {
  setup_tracing();
  let store = seeded_store();

  let mut tx = store.begin().await.unwrap();
  let sequence = tx.next_order_sequence().await.unwrap();
  let order_id = tx
    .insert_order_header(&NewOrderHeader {
      code: salesdesk::format_order_code(sequence),
      customer_id: Some(CUSTOMER_C1),
      salesperson_id: Some(SALESPERSON_S1),
      discount: dec!(0),
    })
    .await
    .unwrap();
  tx.decrement_stock(PRODUCT_P1, 2).await.unwrap();

  store.set_product_price(PRODUCT_P1, dec!(12.00));
  store.insert_product(3, 7, dec!(1.25));
  store.insert_customer(2, "Beatriz Reis");

  // The open transaction reads the new price and keeps its own stock movement.
  let snapshot = tx.lock_product(PRODUCT_P1).await.unwrap().unwrap();
  assert_eq!(snapshot.price, dec!(12.00));
  assert_eq!(snapshot.stock_level, 3);

  tx.set_order_total(order_id, dec!(0)).await.unwrap();
  tx.commit().await.unwrap();

  assert_eq!(store.order_count(), 1);
  assert_eq!(store.product_stock(PRODUCT_P1), Some(3));
  assert_eq!(store.product_stock(3), Some(7));

  let service = service_for(&store);
  let order = service
    .place_order(PlaceOrderRequest::new(Some(2), Some(SALESPERSON_S1), vec![item(PRODUCT_P1, 1), item(3, 1)]))
    .await
    .unwrap();
  assert_eq!(line_prices(&order), vec![dec!(12.00), dec!(1.25)]);
  assert_eq!(order.customer_name.as_deref(), Some("Beatriz Reis"));
  assert_eq!(order.code, "#PED-1002");
}
