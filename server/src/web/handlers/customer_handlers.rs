// salesdesk/server/src/web/handlers/customer_handlers.rs

use actix_web::{web, HttpResponse};
use salesdesk::EntityCode;
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::db::counters::next_counter_value;
use crate::db::filters::CUSTOMER_COLUMNS;
use crate::db::statements::customer_update_sql;
use crate::errors::AppError;
use crate::models::{Customer, CustomerPayload, STATUS_ACTIVE};
use crate::state::AppState;

fn not_found(customer_id: i64) -> AppError {
  warn!("Customer with ID {} not found.", customer_id);
  AppError::NotFound(format!("Customer with ID {} not found.", customer_id))
}

#[instrument(name = "handler::list_customers", skip(app_state))]
pub async fn list_customers_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let customers: Vec<Customer> =
    sqlx::query_as(&format!("SELECT {} FROM customers ORDER BY id DESC", CUSTOMER_COLUMNS))
      .fetch_all(&app_state.db_pool)
      .await
      .map_err(|e| {
        error!("Failed to fetch customers from database: {}", e);
        AppError::Sqlx(e)
      })?;
  info!("Fetched {} customers.", customers.len());
  Ok(HttpResponse::Ok().json(customers))
}

#[instrument(name = "handler::get_customer", skip(app_state, path), fields(customer_id = %path.as_ref()))]
pub async fn get_customer_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let customer_id = path.into_inner();
  let customer: Option<Customer> =
    sqlx::query_as(&format!("SELECT {} FROM customers WHERE id = $1", CUSTOMER_COLUMNS))
      .bind(customer_id)
      .fetch_optional(&app_state.db_pool)
      .await?;
  customer
    .map(|c| HttpResponse::Ok().json(c))
    .ok_or_else(|| not_found(customer_id))
}

#[instrument(name = "handler::create_customer", skip(app_state, payload))]
pub async fn create_customer_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CustomerPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner().validated()?;

  let mut tx = app_state.db_pool.begin().await?;
  let sequence = next_counter_value(&mut *tx, EntityCode::Customer.counter_key()).await?;
  let code = EntityCode::Customer.format(sequence);

  let customer: Customer = sqlx::query_as(&format!(
    "INSERT INTO customers (code, name, email, phone, document, address, city, state, status) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
    CUSTOMER_COLUMNS
  ))
  .bind(&code)
  .bind(&payload.name)
  .bind(&payload.email)
  .bind(&payload.phone)
  .bind(&payload.document)
  .bind(&payload.address)
  .bind(&payload.city)
  .bind(&payload.state)
  .bind(payload.status.as_deref().unwrap_or(STATUS_ACTIVE))
  .fetch_one(&mut *tx)
  .await?;
  tx.commit().await?;

  info!(customer_id = customer.id, code = %customer.code, "Customer created.");
  Ok(HttpResponse::Created().json(customer))
}

#[instrument(name = "handler::update_customer", skip(app_state, path, payload), fields(customer_id = %path.as_ref()))]
pub async fn update_customer_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  payload: web::Json<CustomerPayload>,
) -> Result<HttpResponse, AppError> {
  let customer_id = path.into_inner();
  let payload = payload.into_inner().validated()?;

  let updated: Option<Customer> = sqlx::query_as(&customer_update_sql())
  .bind(&payload.name)
  .bind(&payload.email)
  .bind(&payload.phone)
  .bind(&payload.document)
  .bind(&payload.address)
  .bind(&payload.city)
  .bind(&payload.state)
  .bind(&payload.status)
  .bind(customer_id)
  .fetch_optional(&app_state.db_pool)
  .await?;

  match updated {
    Some(customer) => {
      info!("Customer {} updated.", customer_id);
      Ok(HttpResponse::Ok().json(customer))
    }
    None => Err(not_found(customer_id)),
  }
}

#[instrument(name = "handler::delete_customer", skip(app_state, path), fields(customer_id = %path.as_ref()))]
pub async fn delete_customer_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let customer_id = path.into_inner();
  let result = sqlx::query("DELETE FROM customers WHERE id = $1")
    .bind(customer_id)
    .execute(&app_state.db_pool)
    .await?;
  if result.rows_affected() == 0 {
    return Err(not_found(customer_id));
  }
  info!("Customer {} deleted.", customer_id);
  Ok(HttpResponse::Ok().json(json!({ "message": "Customer deleted successfully." })))
}
