// salesdesk/server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use salesdesk::PlaceOrderRequest;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(
  name = "handler::place_order",
  skip(app_state, payload),
  fields(items = payload.items.len())
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.place_order(payload.into_inner()).await?;
  info!(order_id = order.id, code = %order.code, "Order placed.");
  Ok(HttpResponse::Created().json(order))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.get_order(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[cfg(test)]
mod tests {
  use crate::state::AppState;
  use crate::web::configure_app_routes;
  use actix_web::http::StatusCode;
  use actix_web::{test, web, App};
  use rust_decimal_macros::dec;
  use salesdesk::{InMemoryStore, StockPolicy};
  use serde_json::{json, Value};
  use std::sync::Arc;

  fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.insert_customer(1, "Ana Souza");
    store.insert_employee(1, "Carlos Lima");
    store.insert_product(1, 5, dec!(10.00));
    store.insert_product(2, 1, dec!(4.50));
    store
  }

  macro_rules! app_for {
    ($store:expr, $policy:expr) => {
      test::init_service(
        App::new()
          .app_data(web::Data::new(AppState::for_tests(Arc::new($store.clone()), $policy)))
          .configure(configure_app_routes),
      )
      .await
    };
  }

  #[actix_web::test]
  async fn placing_an_order_returns_201_with_the_enriched_order() {
    let store = seeded_store();
    let app = app_for!(store, StockPolicy::CheckOnly);

    let req = test::TestRequest::post()
      .uri("/api/orders")
      .set_json(json!({
        "customer_id": 1,
        "salesperson_id": 1,
        "items": [{"product_id": 1, "quantity": 2}, {"product_id": 2, "quantity": 1}],
        "discount": "1.50"
      }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "#PED-1001");
    assert_eq!(body["customer_name"], "Ana Souza");
    assert_eq!(body["salesperson_name"], "Carlos Lima");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["lines"].as_array().map(Vec::len), Some(2));
    assert_eq!(store.order_count(), 1);

    let order_id = body["id"].as_i64().unwrap();
    let req = test::TestRequest::get().uri(&format!("/api/orders/{}", order_id)).to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["code"], "#PED-1001");
  }

  #[actix_web::test]
  async fn insufficient_stock_is_a_409_and_writes_nothing() {
    let store = seeded_store();
    let app = app_for!(store, StockPolicy::CheckOnly);

    let req = test::TestRequest::post()
      .uri("/api/orders")
      .set_json(json!({"items": [{"product_id": 1, "quantity": 1}, {"product_id": 2, "quantity": 2}]}))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("product ID: 2"));
    assert_eq!(store.order_count(), 0);
    assert_eq!(store.line_count(), 0);
  }

  #[actix_web::test]
  async fn client_errors_map_to_400_and_404() {
    let store = seeded_store();
    let app = app_for!(store, StockPolicy::Reserve);

    let empty = test::TestRequest::post()
      .uri("/api/orders")
      .set_json(json!({"customer_id": 1, "items": []}))
      .to_request();
    assert_eq!(test::call_service(&app, empty).await.status(), StatusCode::BAD_REQUEST);

    let malformed = test::TestRequest::post()
      .uri("/api/orders")
      .insert_header(("content-type", "application/json"))
      .set_payload("{\"items\": [{\"product_id\": \"one\"}]}")
      .to_request();
    assert_eq!(test::call_service(&app, malformed).await.status(), StatusCode::BAD_REQUEST);

    let unknown_product = test::TestRequest::post()
      .uri("/api/orders")
      .set_json(json!({"items": [{"product_id": 42, "quantity": 1}]}))
      .to_request();
    assert_eq!(test::call_service(&app, unknown_product).await.status(), StatusCode::NOT_FOUND);

    let missing_order = test::TestRequest::get().uri("/api/orders/999").to_request();
    assert_eq!(test::call_service(&app, missing_order).await.status(), StatusCode::NOT_FOUND);

    assert_eq!(store.order_count(), 0);
    assert_eq!(store.product_stock(1), Some(5));
  }
}
