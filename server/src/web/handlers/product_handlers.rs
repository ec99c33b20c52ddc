// salesdesk/server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use salesdesk::EntityCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use crate::db::counters::next_counter_value;
use crate::db::filters::{product_list_query, ProductFilter, PRODUCT_COLUMNS};
use crate::db::statements::{
  ensure_no_pending_orders, product_update_sql, Deactivation, BUMP_VIEW_COUNT_SQL, CUSTOMER_EXISTS_SQL,
  RECORD_VIEW_SQL,
};
use crate::errors::AppError;
use crate::models::{CreateProductRequest, Product, UpdateProductRequest, STATUS_ACTIVE};
use crate::reports::products::{best_sellers, most_viewed, product_statistics, BestSellersQuery};
use crate::state::AppState;

fn not_found(product_id: i64) -> AppError {
  warn!("Product with ID {} not found.", product_id);
  AppError::NotFound(format!("Product with ID {} not found.", product_id))
}

#[instrument(name = "handler::list_products", skip(app_state, query_params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ProductFilter>,
) -> Result<HttpResponse, AppError> {
  let mut query = product_list_query(&query_params);
  let products: Vec<Product> = query
    .build_query_as()
    .fetch_all(&app_state.db_pool)
    .await
    .map_err(|e| {
      error!("Failed to fetch products from database: {}", e);
      AppError::Sqlx(e)
    })?;

  info!("Successfully fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product: Option<Product> = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
    .bind(product_id)
    .fetch_optional(&app_state.db_pool)
    .await
    .map_err(|e| {
      error!("Database error while fetching product {}: {}", product_id, e);
      AppError::Sqlx(e)
    })?;

  product
    .map(|p| HttpResponse::Ok().json(p))
    .ok_or_else(|| not_found(product_id))
}

/// Active products at or under their minimum, scarcest first.
#[instrument(name = "handler::low_stock_products", skip(app_state))]
pub async fn low_stock_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products: Vec<Product> = sqlx::query_as(&format!(
    "SELECT {} FROM products \
     WHERE stock_level <= minimum_stock AND status = 'active' \
     ORDER BY (stock_level::float8 / NULLIF(minimum_stock, 0)) ASC NULLS FIRST, name ASC",
    PRODUCT_COLUMNS
  ))
  .fetch_all(&app_state.db_pool)
  .await?;
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::create_product", skip(app_state, payload))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
  let new_product = payload.into_inner().into_new_product()?;

  let mut tx = app_state.db_pool.begin().await?;
  let sequence = next_counter_value(&mut *tx, EntityCode::Product.counter_key()).await?;
  let code = EntityCode::Product.format(sequence);

  let product: Product = sqlx::query_as(&format!(
    "INSERT INTO products (code, name, category, description, price, cost, stock_level, minimum_stock, status) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
    PRODUCT_COLUMNS
  ))
  .bind(&code)
  .bind(&new_product.name)
  .bind(&new_product.category)
  .bind(&new_product.description)
  .bind(new_product.price)
  .bind(new_product.cost)
  .bind(new_product.stock_level)
  .bind(new_product.minimum_stock)
  .bind(STATUS_ACTIVE)
  .fetch_one(&mut *tx)
  .await?;
  tx.commit().await?;

  info!(product_id = product.id, code = %product.code, "Product created.");
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::update_product", skip(app_state, path, payload), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  payload: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let changes = payload.into_inner();
  changes.validate()?;

  let updated: Option<Product> = sqlx::query_as(&product_update_sql())
  .bind(&changes.name)
  .bind(&changes.category)
  .bind(&changes.description)
  .bind(changes.price)
  .bind(changes.cost)
  .bind(changes.stock_level)
  .bind(changes.minimum_stock)
  .bind(&changes.status)
  .bind(product_id)
  .fetch_optional(&app_state.db_pool)
  .await?;

  updated
    .map(|p| HttpResponse::Ok().json(p))
    .ok_or_else(|| not_found(product_id))
}

/// Soft delete. A product still on a pending order stays active.
#[instrument(name = "handler::deactivate_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn deactivate_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1")
    .bind(product_id)
    .fetch_optional(&app_state.db_pool)
    .await?;
  if exists.is_none() {
    return Err(not_found(product_id));
  }

  let pending: i64 = sqlx::query_scalar(Deactivation::Product.pending_orders_sql())
    .bind(product_id)
    .fetch_one(&app_state.db_pool)
    .await?;
  ensure_no_pending_orders(Deactivation::Product, product_id, pending)?;

  sqlx::query(Deactivation::Product.deactivate_sql())
    .bind(product_id)
    .execute(&app_state.db_pool)
    .await?;
  info!("Product {} deactivated.", product_id);
  Ok(HttpResponse::Ok().json(json!({ "message": "Product deactivated successfully." })))
}

/// Top sellers by units over the last `days` (default 30).
#[instrument(name = "handler::best_sellers", skip(app_state))]
pub async fn best_sellers_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<BestSellersQuery>,
) -> Result<HttpResponse, AppError> {
  let ranking = best_sellers(&app_state.db_pool, &query_params).await?;
  Ok(HttpResponse::Ok().json(ranking))
}

#[instrument(name = "handler::most_viewed", skip(app_state))]
pub async fn most_viewed_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = most_viewed(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(products))
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewRequest {
  pub customer_id: Option<i64>,
}

/// Logs one view and bumps the product's running total in the same transaction.
/// The body is optional.
#[instrument(name = "handler::register_view", skip(app_state, path, payload), fields(product_id = %path.as_ref()))]
pub async fn register_view_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  payload: Option<web::Json<ViewRequest>>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let customer_id = payload.and_then(|p| p.into_inner().customer_id);

  let mut tx = app_state.db_pool.begin().await?;
  let bumped = sqlx::query(BUMP_VIEW_COUNT_SQL)
    .bind(product_id)
    .execute(&mut *tx)
    .await?;
  if bumped.rows_affected() == 0 {
    return Err(not_found(product_id));
  }
  if let Some(customer_id) = customer_id {
    let known: bool = sqlx::query_scalar(CUSTOMER_EXISTS_SQL)
      .bind(customer_id)
      .fetch_one(&mut *tx)
      .await?;
    if !known {
      return Err(AppError::Validation(format!("Customer with ID {} does not exist.", customer_id)));
    }
  }
  sqlx::query(RECORD_VIEW_SQL)
    .bind(product_id)
    .bind(customer_id)
    .execute(&mut *tx)
    .await?;
  tx.commit().await?;

  debug!(?customer_id, "Product view registered.");
  Ok(HttpResponse::Ok().json(json!({ "message": "View registered." })))
}

#[instrument(name = "handler::product_statistics", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn product_statistics_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  product_statistics(&app_state.db_pool, product_id)
    .await?
    .map(|stats| HttpResponse::Ok().json(stats))
    .ok_or_else(|| not_found(product_id))
}
