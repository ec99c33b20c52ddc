// salesdesk/server/src/reports/export.rs

use crate::errors::AppError;
use crate::reports::csv::{render_csv, CsvRecord, CsvValue};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
  Sales,
  Products,
  Customers,
}

impl ExportKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ExportKind::Sales => "sales",
      ExportKind::Products => "products",
      ExportKind::Customers => "customers",
    }
  }

  /// `<kind>_<YYYY-MM-DD>.csv`
  pub fn file_name(&self, day: NaiveDate) -> String {
    format!("{}_{}.csv", self.as_str(), day.format("%Y-%m-%d"))
  }
}

impl FromStr for ExportKind {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "sales" => Ok(ExportKind::Sales),
      "products" => Ok(ExportKind::Products),
      "customers" => Ok(ExportKind::Customers),
      other => Err(AppError::Validation(format!("Invalid report type '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
  #[default]
  Csv,
  Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
  #[serde(default)]
  pub format: ExportFormat,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SalesExportRow {
  pub order_code: String,
  pub customer: Option<String>,
  pub salesperson: Option<String>,
  pub created_at: DateTime<Utc>,
  pub total_value: Decimal,
  pub status: String,
  pub item_count: i64,
}

impl CsvRecord for SalesExportRow {
  fn headers() -> &'static [&'static str] {
    &["order_code", "customer", "salesperson", "created_at", "total_value", "status", "item_count"]
  }

  fn values(&self) -> Vec<CsvValue> {
    vec![
      (&self.order_code).into(),
      self.customer.as_deref().into(),
      self.salesperson.as_deref().into(),
      self.created_at.into(),
      self.total_value.into(),
      (&self.status).into(),
      self.item_count.into(),
    ]
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductExportRow {
  pub code: String,
  pub name: String,
  pub category: String,
  pub price: Decimal,
  pub stock_level: i32,
  pub minimum_stock: i32,
  pub view_count: i32,
  pub average_rating: Option<Decimal>,
  pub status: String,
}

impl CsvRecord for ProductExportRow {
  fn headers() -> &'static [&'static str] {
    &[
      "code",
      "name",
      "category",
      "price",
      "stock_level",
      "minimum_stock",
      "view_count",
      "average_rating",
      "status",
    ]
  }

  fn values(&self) -> Vec<CsvValue> {
    vec![
      (&self.code).into(),
      (&self.name).into(),
      (&self.category).into(),
      self.price.into(),
      self.stock_level.into(),
      self.minimum_stock.into(),
      self.view_count.into(),
      self.average_rating.into(),
      (&self.status).into(),
    ]
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerExportRow {
  pub code: String,
  pub name: String,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub city: Option<String>,
  pub state: Option<String>,
  pub registered_at: DateTime<Utc>,
  pub loyalty_points: i32,
  pub status: String,
}

impl CsvRecord for CustomerExportRow {
  fn headers() -> &'static [&'static str] {
    &[
      "code",
      "name",
      "email",
      "phone",
      "city",
      "state",
      "registered_at",
      "loyalty_points",
      "status",
    ]
  }

  fn values(&self) -> Vec<CsvValue> {
    vec![
      (&self.code).into(),
      (&self.name).into(),
      self.email.as_deref().into(),
      self.phone.as_deref().into(),
      self.city.as_deref().into(),
      self.state.as_deref().into(),
      self.registered_at.into(),
      self.loyalty_points.into(),
      (&self.status).into(),
    ]
  }
}

/// One export, still typed so the caller picks CSV or JSON.
pub enum ExportRows {
  Sales(Vec<SalesExportRow>),
  Products(Vec<ProductExportRow>),
  Customers(Vec<CustomerExportRow>),
}

impl ExportRows {
  pub fn len(&self) -> usize {
    match self {
      ExportRows::Sales(rows) => rows.len(),
      ExportRows::Products(rows) => rows.len(),
      ExportRows::Customers(rows) => rows.len(),
    }
  }

  pub fn to_csv(&self) -> String {
    match self {
      ExportRows::Sales(rows) => render_csv(rows),
      ExportRows::Products(rows) => render_csv(rows),
      ExportRows::Customers(rows) => render_csv(rows),
    }
  }

  pub fn to_json(&self) -> Result<serde_json::Value, AppError> {
    let value = match self {
      ExportRows::Sales(rows) => serde_json::to_value(rows),
      ExportRows::Products(rows) => serde_json::to_value(rows),
      ExportRows::Customers(rows) => serde_json::to_value(rows),
    };
    value.map_err(|e| AppError::Internal(format!("Failed to serialize export: {}", e)))
  }
}

#[instrument(name = "report::export", skip(pool), err(Display))]
pub async fn fetch_export(pool: &PgPool, kind: ExportKind) -> Result<ExportRows, AppError> {
  let rows = match kind {
    ExportKind::Sales => ExportRows::Sales(
      sqlx::query_as(
        "SELECT o.code AS order_code, c.name AS customer, e.name AS salesperson, o.created_at, \
                o.total_value, o.status, COUNT(ol.id) AS item_count \
         FROM orders o \
         LEFT JOIN customers c ON o.customer_id = c.id \
         LEFT JOIN employees e ON o.salesperson_id = e.id \
         LEFT JOIN order_lines ol ON o.id = ol.order_id \
         WHERE o.status = 'invoiced' \
         GROUP BY o.id, c.name, e.name \
         ORDER BY o.created_at DESC",
      )
      .fetch_all(pool)
      .await?,
    ),
    ExportKind::Products => ExportRows::Products(
      sqlx::query_as(
        "SELECT code, name, category, price, stock_level, minimum_stock, view_count, average_rating, status \
         FROM products ORDER BY name",
      )
      .fetch_all(pool)
      .await?,
    ),
    ExportKind::Customers => ExportRows::Customers(
      sqlx::query_as(
        "SELECT code, name, email, phone, city, state, registered_at, loyalty_points, status \
         FROM customers ORDER BY name",
      )
      .fetch_all(pool)
      .await?,
    ),
  };
  Ok(rows)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn unknown_kind_is_a_validation_error() {
    assert_eq!("sales".parse::<ExportKind>().unwrap(), ExportKind::Sales);
    assert!(matches!("invoices".parse::<ExportKind>(), Err(AppError::Validation(_))));
  }

  #[test]
  fn file_name_carries_kind_and_day() {
    let day = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
    assert_eq!(ExportKind::Customers.file_name(day), "customers_2025-03-07.csv");
  }

  #[test]
  fn product_rows_render_with_empty_missing_rating() {
    let rows = ExportRows::Products(vec![ProductExportRow {
      code: "#PROD-001".into(),
      name: "Servo".into(),
      category: "Parts".into(),
      price: dec!(4.50),
      stock_level: 10,
      minimum_stock: 5,
      view_count: 0,
      average_rating: None,
      status: "active".into(),
    }]);
    assert_eq!(rows.len(), 1);
    let csv = rows.to_csv();
    let mut lines = csv.lines();
    assert_eq!(
      lines.next(),
      Some("code;name;category;price;stock_level;minimum_stock;view_count;average_rating;status")
    );
    assert_eq!(lines.next(), Some("\"#PROD-001\";\"Servo\";\"Parts\";4.50;10;5;0;;\"active\""));
  }

  #[test]
  fn format_defaults_to_csv() {
    let query: ExportQuery = serde_json::from_str("{}").unwrap();
    assert_eq!(query.format, ExportFormat::Csv);
  }
}
