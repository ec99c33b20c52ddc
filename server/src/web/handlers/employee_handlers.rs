// salesdesk/server/src/web/handlers/employee_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use salesdesk::EntityCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::db::counters::next_counter_value;
use crate::db::filters::{active_employees_query, employee_list_query, ActiveEmployeeFilter, EmployeeFilter, EMPLOYEE_COLUMNS};
use crate::db::statements::{employee_update_sql, ensure_no_pending_orders, Deactivation};
use crate::errors::AppError;
use crate::models::employee::{month_bounds, SalaryPeriod};
use crate::reports::performance::{salesperson_performance, PerformanceQuery};
use crate::models::{
  ActiveEmployee, ContractType, CreateEmployeeRequest, Employee, SalaryBreakdown, UpdateEmployeeRequest, STATUS_ACTIVE,
};
use crate::state::AppState;

fn not_found(employee_id: i64) -> AppError {
  warn!("Employee with ID {} not found.", employee_id);
  AppError::NotFound(format!("Employee with ID {} not found.", employee_id))
}

async fn fetch_employee(app_state: &AppState, employee_id: i64) -> Result<Employee, AppError> {
  let employee: Option<Employee> =
    sqlx::query_as(&format!("SELECT {} FROM employees WHERE id = $1", EMPLOYEE_COLUMNS))
      .bind(employee_id)
      .fetch_optional(&app_state.db_pool)
      .await?;
  employee.ok_or_else(|| not_found(employee_id))
}

#[instrument(name = "handler::list_employees", skip(app_state))]
pub async fn list_employees_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<EmployeeFilter>,
) -> Result<HttpResponse, AppError> {
  let mut query = employee_list_query(&query_params);
  let employees: Vec<Employee> = query.build_query_as().fetch_all(&app_state.db_pool).await?;
  info!("Fetched {} employees.", employees.len());
  Ok(HttpResponse::Ok().json(employees))
}

#[instrument(name = "handler::list_active_employees", skip(app_state))]
pub async fn list_active_employees_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ActiveEmployeeFilter>,
) -> Result<HttpResponse, AppError> {
  let mut query = active_employees_query(&query_params);
  let employees: Vec<ActiveEmployee> = query.build_query_as().fetch_all(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(employees))
}

#[instrument(name = "handler::get_employee", skip(app_state, path), fields(employee_id = %path.as_ref()))]
pub async fn get_employee_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let employee = fetch_employee(&app_state, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(employee))
}

#[instrument(name = "handler::create_employee", skip(app_state, payload))]
pub async fn create_employee_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateEmployeeRequest>,
) -> Result<HttpResponse, AppError> {
  let new_employee = payload.into_inner().into_new_employee()?;

  let mut tx = app_state.db_pool.begin().await?;
  let sequence = next_counter_value(&mut *tx, EntityCode::Employee.counter_key()).await?;
  let code = EntityCode::Employee.format(sequence);

  let employee: Employee = sqlx::query_as(&format!(
    "INSERT INTO employees (code, name, role, contract_type, base_salary, commission_rate, email, phone, status) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
    EMPLOYEE_COLUMNS
  ))
  .bind(&code)
  .bind(&new_employee.name)
  .bind(&new_employee.role)
  .bind(new_employee.contract_type.as_str())
  .bind(new_employee.base_salary)
  .bind(new_employee.commission_rate)
  .bind(&new_employee.email)
  .bind(&new_employee.phone)
  .bind(STATUS_ACTIVE)
  .fetch_one(&mut *tx)
  .await?;
  tx.commit().await?;

  info!(employee_id = employee.id, code = %employee.code, "Employee created.");
  Ok(HttpResponse::Created().json(employee))
}

#[instrument(name = "handler::update_employee", skip(app_state, path, payload), fields(employee_id = %path.as_ref()))]
pub async fn update_employee_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  payload: web::Json<UpdateEmployeeRequest>,
) -> Result<HttpResponse, AppError> {
  let employee_id = path.into_inner();
  let changes = payload.into_inner();
  changes.validate()?;

  let updated: Option<Employee> = sqlx::query_as(&employee_update_sql())
  .bind(&changes.name)
  .bind(&changes.role)
  .bind(changes.contract_type.map(|c| c.as_str()))
  .bind(changes.base_salary)
  .bind(changes.commission_rate)
  .bind(&changes.email)
  .bind(&changes.phone)
  .bind(&changes.status)
  .bind(employee_id)
  .fetch_optional(&app_state.db_pool)
  .await?;

  updated
    .map(|e| HttpResponse::Ok().json(e))
    .ok_or_else(|| not_found(employee_id))
}

/// Soft delete. An employee who is the salesperson on a pending order stays active.
#[instrument(name = "handler::deactivate_employee", skip(app_state, path), fields(employee_id = %path.as_ref()))]
pub async fn deactivate_employee_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let employee_id = path.into_inner();
  fetch_employee(&app_state, employee_id).await?;

  let pending: i64 = sqlx::query_scalar(Deactivation::Employee.pending_orders_sql())
    .bind(employee_id)
    .fetch_one(&app_state.db_pool)
    .await?;
  ensure_no_pending_orders(Deactivation::Employee, employee_id, pending)?;

  sqlx::query(Deactivation::Employee.deactivate_sql())
    .bind(employee_id)
    .execute(&app_state.db_pool)
    .await?;
  info!("Employee {} deactivated.", employee_id);
  Ok(HttpResponse::Ok().json(json!({ "message": "Employee deactivated successfully." })))
}

#[derive(Debug, Deserialize)]
pub struct SalaryQuery {
  pub month: Option<u32>,
  pub year: Option<i32>,
}

#[instrument(name = "handler::calculate_salary", skip(app_state, path), fields(employee_id = %path.as_ref()))]
pub async fn calculate_salary_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  query_params: web::Query<SalaryQuery>,
) -> Result<HttpResponse, AppError> {
  let employee_id = path.into_inner();
  let today = Utc::now().date_naive();
  let period = SalaryPeriod {
    month: query_params.month.unwrap_or_else(|| today.month()),
    year: query_params.year.unwrap_or_else(|| today.year()),
  };
  let (start, end) = month_bounds(period)?;

  let employee = fetch_employee(&app_state, employee_id).await?;
  let invoiced_sales = match employee.contract_type {
    ContractType::Commissioned => {
      let total: Option<Decimal> = sqlx::query_scalar(
        "SELECT SUM(total_value) FROM orders \
         WHERE salesperson_id = $1 AND status = 'invoiced' \
           AND created_at >= $2 AND created_at < $3",
      )
      .bind(employee_id)
      .bind(start)
      .bind(end)
      .fetch_one(&app_state.db_pool)
      .await?;
      total.unwrap_or(Decimal::ZERO)
    }
    ContractType::Fixed => Decimal::ZERO,
  };

  Ok(HttpResponse::Ok().json(SalaryBreakdown::compute(&employee, period, invoiced_sales)))
}

/// Invoiced sales, commission and salary per salesperson over the last `days`.
#[instrument(name = "handler::salesperson_performance", skip(app_state))]
pub async fn salesperson_performance_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<PerformanceQuery>,
) -> Result<HttpResponse, AppError> {
  let ranking = salesperson_performance(&app_state.db_pool, &query_params).await?;
  Ok(HttpResponse::Ok().json(ranking))
}
