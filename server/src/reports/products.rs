// salesdesk/server/src/reports/products.rs

//! Product-level reports: sales against stock, best sellers, most viewed and
//! the statistics of a single product.

use super::stock::{stock_percentage, RestockStatus};
use super::window_days;
use crate::db::filters::PRODUCT_COLUMNS;
use crate::errors::AppError;
use crate::models::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

/// Rows kept in the best-seller and most-viewed rankings.
pub const RANKING_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
  #[default]
  Name,
  UnitsSold,
  Stock,
  Revenue,
}

impl ProductSort {
  /// Unknown or missing values sort by name.
  pub fn parse(value: Option<&str>) -> Self {
    match value.map(str::trim) {
      Some("units_sold") => ProductSort::UnitsSold,
      Some("stock") => ProductSort::Stock,
      Some("revenue") => ProductSort::Revenue,
      _ => ProductSort::Name,
    }
  }

  fn order_by(&self) -> &'static str {
    match self {
      ProductSort::Name => "p.name ASC",
      ProductSort::UnitsSold => "units_sold DESC, p.name ASC",
      ProductSort::Stock => "p.stock_level ASC, p.name ASC",
      ProductSort::Revenue => "revenue DESC, p.name ASC",
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductReportQuery {
  #[serde(default = "default_status")]
  pub status: String,
  pub sort: Option<String>,
}

fn default_status() -> String {
  "active".to_string()
}

impl Default for ProductReportQuery {
  fn default() -> Self {
    Self {
      status: default_status(),
      sort: None,
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductSalesRow {
  pub id: i64,
  pub code: String,
  pub name: String,
  pub category: String,
  pub price: Decimal,
  pub stock_level: i32,
  pub minimum_stock: i32,
  pub view_count: i32,
  pub average_rating: Option<Decimal>,
  pub status: String,
  pub units_sold: i64,
  pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductSales {
  #[serde(flatten)]
  pub product: ProductSalesRow,
  pub restock_status: RestockStatus,
  pub stock_percentage: Option<Decimal>,
}

impl From<ProductSalesRow> for ProductSales {
  fn from(product: ProductSalesRow) -> Self {
    Self {
      restock_status: RestockStatus::classify(product.stock_level, product.minimum_stock),
      stock_percentage: stock_percentage(product.stock_level, product.minimum_stock),
      product,
    }
  }
}

pub fn product_report_query(query: &ProductReportQuery) -> QueryBuilder<'static, Postgres> {
  let mut qb = QueryBuilder::new(
    "SELECT p.id, p.code, p.name, p.category, p.price, p.stock_level, p.minimum_stock, \
     p.view_count, p.average_rating, p.status, \
     COALESCE(SUM(ol.quantity) FILTER (WHERE o.status = 'invoiced'), 0)::BIGINT AS units_sold, \
     COALESCE(SUM(ol.subtotal) FILTER (WHERE o.status = 'invoiced'), 0) AS revenue \
     FROM products p \
     LEFT JOIN order_lines ol ON ol.product_id = p.id \
     LEFT JOIN orders o ON ol.order_id = o.id \
     WHERE p.status = ",
  );
  qb.push_bind(query.status.clone());
  qb.push(" GROUP BY p.id ORDER BY ");
  qb.push(ProductSort::parse(query.sort.as_deref()).order_by());
  qb
}

#[instrument(name = "report::products", skip(pool), err(Display))]
pub async fn product_report(pool: &PgPool, query: &ProductReportQuery) -> Result<Vec<ProductSales>, AppError> {
  let mut qb = product_report_query(query);
  let rows: Vec<ProductSalesRow> = qb.build_query_as().fetch_all(pool).await?;
  Ok(rows.into_iter().map(ProductSales::from).collect())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BestSellersQuery {
  pub days: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BestSeller {
  pub id: i64,
  pub code: String,
  pub name: String,
  pub category: String,
  pub units_sold: i64,
  pub revenue: Decimal,
}

pub fn best_sellers_query(query: &BestSellersQuery) -> Result<QueryBuilder<'static, Postgres>, AppError> {
  let days = window_days(query.days)?;
  let mut qb = QueryBuilder::new(
    "SELECT p.id, p.code, p.name, p.category, \
     SUM(ol.quantity)::BIGINT AS units_sold, SUM(ol.subtotal) AS revenue \
     FROM order_lines ol \
     JOIN products p ON ol.product_id = p.id \
     JOIN orders o ON ol.order_id = o.id \
     WHERE o.status = 'invoiced' AND o.created_at >= NOW() - make_interval(days => ",
  );
  qb.push_bind(days);
  qb.push(") GROUP BY p.id, p.code, p.name, p.category ORDER BY units_sold DESC LIMIT ");
  qb.push_bind(RANKING_LIMIT);
  Ok(qb)
}

#[instrument(name = "report::best_sellers", skip(pool))]
pub async fn best_sellers(pool: &PgPool, query: &BestSellersQuery) -> Result<Vec<BestSeller>, AppError> {
  let mut qb = best_sellers_query(query)?;
  Ok(qb.build_query_as().fetch_all(pool).await?)
}

pub fn most_viewed_sql() -> String {
  format!(
    "SELECT {} FROM products WHERE status = 'active' ORDER BY view_count DESC, name ASC LIMIT $1",
    PRODUCT_COLUMNS
  )
}

#[instrument(name = "report::most_viewed", skip(pool), err(Display))]
pub async fn most_viewed(pool: &PgPool) -> Result<Vec<Product>, AppError> {
  Ok(
    sqlx::query_as(&most_viewed_sql())
      .bind(RANKING_LIMIT)
      .fetch_all(pool)
      .await?,
  )
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductSalesStats {
  pub order_count: i64,
  pub units_sold: i64,
  pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductViewStats {
  pub total_views: i64,
  pub views_last_30_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductStatistics {
  pub product_id: i64,
  pub sales: ProductSalesStats,
  pub views: ProductViewStats,
}

const PRODUCT_SALES_STATS_SQL: &str = "SELECT COUNT(DISTINCT ol.order_id) AS order_count, \
   COALESCE(SUM(ol.quantity), 0)::BIGINT AS units_sold, \
   COALESCE(SUM(ol.subtotal), 0) AS revenue \
   FROM order_lines ol \
   JOIN orders o ON ol.order_id = o.id \
   WHERE ol.product_id = $1 AND o.status = 'invoiced'";

const PRODUCT_VIEW_STATS_SQL: &str = "SELECT COUNT(*) AS total_views, \
   COUNT(*) FILTER (WHERE viewed_at >= NOW() - INTERVAL '30 days') AS views_last_30_days \
   FROM product_views WHERE product_id = $1";

/// Sales and view counters for one product; `None` when the product does not exist.
#[instrument(name = "report::product_statistics", skip(pool), err(Display))]
pub async fn product_statistics(pool: &PgPool, product_id: i64) -> Result<Option<ProductStatistics>, AppError> {
  let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1")
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
  if exists.is_none() {
    return Ok(None);
  }

  let (sales, views) = futures_util::try_join!(
    sqlx::query_as::<_, ProductSalesStats>(PRODUCT_SALES_STATS_SQL)
      .bind(product_id)
      .fetch_one(pool),
    sqlx::query_as::<_, ProductViewStats>(PRODUCT_VIEW_STATS_SQL)
      .bind(product_id)
      .fetch_one(pool),
  )?;
  Ok(Some(ProductStatistics {
    product_id,
    sales,
    views,
  }))
}
