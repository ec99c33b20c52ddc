// salesdesk/server/src/reports/performance.rs

//! Salesperson performance over a trailing window of invoiced orders.

use super::window_days;
use crate::errors::AppError;
use crate::models::employee::commission_for;
use crate::models::ContractType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformanceQuery {
  pub days: Option<i32>,
  pub contract_type: Option<ContractType>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PerformanceRow {
  pub id: i64,
  pub code: String,
  pub name: String,
  pub role: String,
  #[sqlx(try_from = "String")]
  pub contract_type: ContractType,
  pub base_salary: Decimal,
  pub commission_rate: Decimal,
  pub order_count: i64,
  pub total_sales: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalespersonPerformance {
  pub id: i64,
  pub code: String,
  pub name: String,
  pub role: String,
  pub contract_type: ContractType,
  pub commission_rate: Decimal,
  pub order_count: i64,
  pub total_sales: Decimal,
  pub total_commission: Decimal,
  pub total_salary: Decimal,
}

impl From<PerformanceRow> for SalespersonPerformance {
  fn from(row: PerformanceRow) -> Self {
    let total_commission = commission_for(row.contract_type, row.commission_rate, row.total_sales);
    Self {
      id: row.id,
      code: row.code,
      name: row.name,
      role: row.role,
      contract_type: row.contract_type,
      commission_rate: row.commission_rate,
      order_count: row.order_count,
      total_sales: row.total_sales,
      total_commission,
      total_salary: row.base_salary + total_commission,
    }
  }
}

pub fn performance_query(query: &PerformanceQuery) -> Result<QueryBuilder<'static, Postgres>, AppError> {
  let days = window_days(query.days)?;
  let mut qb = QueryBuilder::new(
    "SELECT e.id, e.code, e.name, e.role, e.contract_type, e.base_salary, e.commission_rate, \
     COUNT(DISTINCT o.id) AS order_count, SUM(o.total_value) AS total_sales \
     FROM orders o \
     JOIN employees e ON o.salesperson_id = e.id \
     WHERE o.status = 'invoiced' AND o.created_at >= NOW() - make_interval(days => ",
  );
  qb.push_bind(days).push(")");
  if let Some(contract_type) = query.contract_type {
    qb.push(" AND e.contract_type = ").push_bind(contract_type.as_str());
  }
  qb.push(
    " GROUP BY e.id, e.code, e.name, e.role, e.contract_type, e.base_salary, e.commission_rate \
     ORDER BY total_sales DESC",
  );
  Ok(qb)
}

#[instrument(name = "report::performance", skip(pool))]
pub async fn salesperson_performance(
  pool: &PgPool,
  query: &PerformanceQuery,
) -> Result<Vec<SalespersonPerformance>, AppError> {
  let mut qb = performance_query(query)?;
  let rows: Vec<PerformanceRow> = qb.build_query_as().fetch_all(pool).await?;
  Ok(rows.into_iter().map(SalespersonPerformance::from).collect())
}
