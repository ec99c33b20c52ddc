// tests/placement_tests.rs
mod common;
use common::*;
use rust_decimal_macros::dec;
use salesdesk::{OrderStatus, SalesError};

#[tokio::test]
async fn places_order_with_snapshot_price_and_names() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store);

  let order = service
    .place_order(request_with_discount(vec![item(PRODUCT_P1, 2)], dec!(0)))
    .await
    .expect("order should be placed");

  assert_eq!(order.code, "#PED-1001");
  assert_eq!(order.status, OrderStatus::Pending);
  assert_eq!(order.total_value, dec!(20.00));
  assert_eq!(order.discount, dec!(0));
  assert_eq!(order.customer_name.as_deref(), Some("Ana Souza"));
  assert_eq!(order.salesperson_name.as_deref(), Some("Carlos Lima"));
  assert_eq!(order.lines.len(), 1);
  assert_eq!(order.lines[0].unit_price, dec!(10.00));
  assert_eq!(order.lines[0].subtotal, dec!(20.00));
  assert_eq!(store.order_count(), 1);
  assert_eq!(store.line_count(), 1);
}

#[tokio::test]
async fn total_subtracts_discount() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store);

  let order = service
    .place_order(request_with_discount(
      vec![item(PRODUCT_P1, 3), item(PRODUCT_P2, 1)],
      dec!(5.25),
    ))
    .await
    .unwrap();

  // 3 * 10.00 + 1 * 4.50 - 5.25
  assert_eq!(order.total_value, dec!(29.25));
  assert_eq!(line_prices(&order), vec![dec!(10.00), dec!(4.50)]);
}

#[tokio::test]
async fn unit_price_is_not_affected_by_later_price_changes() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store);

  let order = service.place_order(request(vec![item(PRODUCT_P1, 1)])).await.unwrap();
  store.set_product_price(PRODUCT_P1, dec!(99.90));

  let reread = service.get_order(order.id).await.unwrap();
  assert_eq!(line_prices(&reread), vec![dec!(10.00)]);
  assert_eq!(reread.total_value, dec!(10.00));

  let second = service.place_order(request(vec![item(PRODUCT_P1, 1)])).await.unwrap();
  assert_eq!(line_prices(&second), vec![dec!(99.90)]);
}

#[tokio::test]
async fn sequential_orders_get_consecutive_codes() {
  setup_tracing();
  let store = directory_store();
  store.insert_product(PRODUCT_P1, 100, dec!(1.00));
  let service = service_for(&store);

  let mut codes = Vec::new();
  for _ in 0..5 {
    codes.push(service.place_order(request(vec![item(PRODUCT_P1, 1)])).await.unwrap().code);
  }

  assert_eq!(codes, vec!["#PED-1001", "#PED-1002", "#PED-1003", "#PED-1004", "#PED-1005"]);
}

#[tokio::test]
async fn rejected_attempts_do_not_consume_order_codes() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store);

  service.place_order(request(vec![item(PRODUCT_P1, 1)])).await.unwrap();
  assert!(service.place_order(request(vec![item(PRODUCT_P2, 2)])).await.is_err());
  let next = service.place_order(request(vec![item(PRODUCT_P1, 1)])).await.unwrap();

  assert_eq!(next.code, "#PED-1002");
  assert_eq!(store.order_codes(), vec!["#PED-1001", "#PED-1002"]);
}

#[tokio::test]
async fn ordering_exactly_the_stock_level_succeeds() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store);

  let order = service.place_order(request(vec![item(PRODUCT_P1, 5)])).await;
  assert!(order.is_ok());
}

#[tokio::test]
async fn ordering_one_more_than_stock_fails_naming_the_product() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store);

  let err = service.place_order(request(vec![item(PRODUCT_P1, 6)])).await.unwrap_err();
  assert!(err.to_string().contains("product ID: 1"));
  match err {
    SalesError::StockInsufficient {
      product_id,
      requested,
      available,
    } => {
      assert_eq!(product_id, PRODUCT_P1);
      assert_eq!(requested, 6);
      assert_eq!(available, 5);
    }
    other => panic!("Expected StockInsufficient, got {:?}", other),
  }
  assert_eq!(store.order_count(), 0);
  assert_eq!(store.line_count(), 0);
}

#[tokio::test]
async fn insufficient_stock_persists_nothing() {
  setup_tracing();
  let store = directory_store();
  store.insert_product(PRODUCT_P1, 1, dec!(10.00));
  let service = service_for(&store);

  let err = service
    .place_order(request_with_discount(vec![item(PRODUCT_P1, 2)], dec!(0)))
    .await
    .unwrap_err();

  assert!(matches!(err, SalesError::StockInsufficient { product_id: PRODUCT_P1, .. }));
  assert_eq!(store.order_count(), 0);
  assert_eq!(store.line_count(), 0);
}

#[tokio::test]
async fn failure_on_second_item_rolls_back_the_first_line() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store);

  let err = service
    .place_order(request(vec![item(PRODUCT_P1, 2), item(PRODUCT_P2, 3)]))
    .await
    .unwrap_err();

  assert!(matches!(err, SalesError::StockInsufficient { product_id: PRODUCT_P2, .. }));
  assert_eq!(store.order_count(), 0);
  assert_eq!(store.line_count(), 0);
}

#[tokio::test]
async fn absent_customer_and_salesperson_yield_null_names() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store);

  let anonymous = salesdesk::PlaceOrderRequest::new(None, Some(77), vec![item(PRODUCT_P1, 1)]);
  let order = service.place_order(anonymous).await.unwrap();

  assert_eq!(order.customer_id, None);
  assert_eq!(order.customer_name, None);
  // Unknown salesperson id: the left join finds no name, which is not an error.
  assert_eq!(order.salesperson_id, Some(77));
  assert_eq!(order.salesperson_name, None);
}

#[tokio::test]
async fn check_only_policy_leaves_stock_untouched() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store);

  service.place_order(request(vec![item(PRODUCT_P1, 4)])).await.unwrap();
  service.place_order(request(vec![item(PRODUCT_P1, 4)])).await.unwrap();

  assert_eq!(store.product_stock(PRODUCT_P1), Some(5));
}

#[tokio::test]
async fn get_order_reports_missing_orders() {
  setup_tracing();
  let store = seeded_store();
  let service = service_for(&store);

  match service.get_order(404).await.unwrap_err() {
    SalesError::OrderNotFound { order_id } => assert_eq!(order_id, 404),
    other => panic!("Expected OrderNotFound, got {:?}", other),
  }
}
