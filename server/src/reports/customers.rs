// salesdesk/server/src/reports/customers.rs

//! Per-customer purchase history with a recency segment.

use crate::errors::AppError;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

/// No purchase for longer than this and the customer is at risk.
pub const AT_RISK_AFTER_DAYS: i64 = 30;
/// No purchase for longer than this and the customer is inactive.
pub const INACTIVE_AFTER_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerSegment {
  /// Never bought anything.
  New,
  Active,
  AtRisk,
  Inactive,
}

impl CustomerSegment {
  pub fn classify(last_purchase_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
    match last_purchase_at {
      None => CustomerSegment::New,
      Some(last) if last < now - Duration::days(INACTIVE_AFTER_DAYS) => CustomerSegment::Inactive,
      Some(last) if last < now - Duration::days(AT_RISK_AFTER_DAYS) => CustomerSegment::AtRisk,
      Some(_) => CustomerSegment::Active,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CustomerSort {
  #[default]
  TotalSpent,
  Name,
  Orders,
  Recency,
}

impl CustomerSort {
  /// Unknown or missing values sort by total spent.
  pub fn parse(value: Option<&str>) -> Self {
    match value.map(str::trim) {
      Some("name") => CustomerSort::Name,
      Some("orders") => CustomerSort::Orders,
      Some("recency") => CustomerSort::Recency,
      _ => CustomerSort::TotalSpent,
    }
  }

  fn order_by(&self) -> &'static str {
    match self {
      CustomerSort::TotalSpent => "total_spent DESC, c.name ASC",
      CustomerSort::Name => "c.name ASC",
      CustomerSort::Orders => "order_count DESC, c.name ASC",
      CustomerSort::Recency => "last_purchase_at DESC NULLS LAST, c.name ASC",
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerReportQuery {
  #[serde(default = "default_status")]
  pub status: String,
  pub sort: Option<String>,
}

fn default_status() -> String {
  "active".to_string()
}

impl Default for CustomerReportQuery {
  fn default() -> Self {
    Self {
      status: default_status(),
      sort: None,
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerActivityRow {
  pub id: i64,
  pub code: String,
  pub name: String,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub city: Option<String>,
  pub state: Option<String>,
  pub registered_at: DateTime<Utc>,
  pub loyalty_points: i32,
  pub status: String,
  pub order_count: i64,
  pub total_spent: Decimal,
  pub last_purchase_at: Option<DateTime<Utc>>,
  pub average_ticket: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerActivity {
  #[serde(flatten)]
  pub customer: CustomerActivityRow,
  pub segment: CustomerSegment,
}

pub fn customer_report_query(query: &CustomerReportQuery) -> QueryBuilder<'static, Postgres> {
  let mut qb = QueryBuilder::new(
    "SELECT c.id, c.code, c.name, c.email, c.phone, c.city, c.state, c.registered_at, \
     c.loyalty_points, c.status, \
     COUNT(o.id) AS order_count, \
     COALESCE(SUM(o.total_value), 0) AS total_spent, \
     MAX(o.created_at) AS last_purchase_at, \
     ROUND(COALESCE(AVG(o.total_value), 0), 2) AS average_ticket \
     FROM customers c \
     LEFT JOIN orders o ON o.customer_id = c.id AND o.status = 'invoiced' \
     WHERE c.status = ",
  );
  qb.push_bind(query.status.clone());
  qb.push(" GROUP BY c.id ORDER BY ");
  qb.push(CustomerSort::parse(query.sort.as_deref()).order_by());
  qb
}

pub fn segment_customers(rows: Vec<CustomerActivityRow>, now: DateTime<Utc>) -> Vec<CustomerActivity> {
  rows
    .into_iter()
    .map(|customer| CustomerActivity {
      segment: CustomerSegment::classify(customer.last_purchase_at, now),
      customer,
    })
    .collect()
}

#[instrument(name = "report::customers", skip(pool), err(Display))]
pub async fn customer_report(pool: &PgPool, query: &CustomerReportQuery) -> Result<Vec<CustomerActivity>, AppError> {
  let mut qb = customer_report_query(query);
  let rows: Vec<CustomerActivityRow> = qb.build_query_as().fetch_all(pool).await?;
  Ok(segment_customers(rows, Utc::now()))
}
