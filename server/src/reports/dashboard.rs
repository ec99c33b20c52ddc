// salesdesk/server/src/reports/dashboard.rs

use crate::errors::AppError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

/// Trailing window for the sales cards and the salesperson ranking.
pub const DASHBOARD_WINDOW_DAYS: i32 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardCards {
  pub active_customers: i64,
  pub active_products: i64,
  pub active_employees: i64,
  pub sales_last_30_days: Decimal,
  pub orders_last_30_days: i64,
  pub low_stock_products: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopSalesperson {
  pub name: String,
  pub orders: i64,
  pub sales: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecentCustomer {
  pub name: String,
  pub email: Option<String>,
  pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
  pub cards: DashboardCards,
  pub top_salespeople: Vec<TopSalesperson>,
  pub recent_customers: Vec<RecentCustomer>,
  pub window_days: i32,
}

async fn count(pool: &PgPool, sql: &'static str) -> Result<i64, sqlx::Error> {
  sqlx::query_scalar(sql).fetch_one(pool).await
}

/// All eight queries run concurrently on separate pool connections.
#[instrument(name = "report::dashboard", skip(pool), err(Display))]
pub async fn dashboard(pool: &PgPool) -> Result<Dashboard, AppError> {
  let (
    active_customers,
    active_products,
    active_employees,
    sales_last_30_days,
    orders_last_30_days,
    low_stock_products,
    top_salespeople,
    recent_customers,
  ) = futures_util::try_join!(
    count(pool, "SELECT COUNT(*) FROM customers WHERE status = 'active'"),
    count(pool, "SELECT COUNT(*) FROM products WHERE status = 'active'"),
    count(pool, "SELECT COUNT(*) FROM employees WHERE status = 'active'"),
    sqlx::query_scalar::<_, Decimal>(
      "SELECT COALESCE(SUM(total_value), 0) FROM orders \
       WHERE status = 'invoiced' AND created_at >= NOW() - make_interval(days => $1)",
    )
    .bind(DASHBOARD_WINDOW_DAYS)
    .fetch_one(pool),
    sqlx::query_scalar::<_, i64>(
      "SELECT COUNT(*) FROM orders \
       WHERE status = 'invoiced' AND created_at >= NOW() - make_interval(days => $1)",
    )
    .bind(DASHBOARD_WINDOW_DAYS)
    .fetch_one(pool),
    count(
      pool,
      "SELECT COUNT(*) FROM products WHERE stock_level <= minimum_stock AND status = 'active'"
    ),
    sqlx::query_as::<_, TopSalesperson>(
      "SELECT e.name, COUNT(o.id) AS orders, SUM(o.total_value) AS sales \
       FROM orders o JOIN employees e ON o.salesperson_id = e.id \
       WHERE o.status = 'invoiced' AND o.created_at >= NOW() - make_interval(days => $1) \
       GROUP BY e.id, e.name ORDER BY sales DESC LIMIT 5",
    )
    .bind(DASHBOARD_WINDOW_DAYS)
    .fetch_all(pool),
    sqlx::query_as::<_, RecentCustomer>(
      "SELECT name, email, registered_at FROM customers \
       WHERE status = 'active' ORDER BY registered_at DESC LIMIT 5",
    )
    .fetch_all(pool),
  )?;

  Ok(Dashboard {
    cards: DashboardCards {
      active_customers,
      active_products,
      active_employees,
      sales_last_30_days,
      orders_last_30_days,
      low_stock_products,
    },
    top_salespeople,
    recent_customers,
    window_days: DASHBOARD_WINDOW_DAYS,
  })
}
