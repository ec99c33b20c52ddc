// salesdesk/server/src/reports/stock.rs

use crate::errors::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

/// Declared from most to least pressing; the report sorts on this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestockStatus {
  OutOfStock,
  RestockUrgent,
  RestockSoon,
  Normal,
}

impl RestockStatus {
  pub fn classify(stock_level: i32, minimum_stock: i32) -> Self {
    if stock_level <= 0 {
      RestockStatus::OutOfStock
    } else if stock_level <= minimum_stock {
      RestockStatus::RestockUrgent
    } else if stock_level <= minimum_stock.saturating_mul(2) {
      RestockStatus::RestockSoon
    } else {
      RestockStatus::Normal
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockReportQuery {
  #[serde(default = "default_status")]
  pub status: String,
}

fn default_status() -> String {
  "active".to_string()
}

impl Default for StockReportQuery {
  fn default() -> Self {
    Self { status: default_status() }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockRow {
  pub id: i64,
  pub code: String,
  pub name: String,
  pub category: String,
  pub price: Decimal,
  pub cost: Option<Decimal>,
  pub stock_level: i32,
  pub minimum_stock: i32,
  pub status: String,
  pub sold_last_30_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockEntry {
  #[serde(flatten)]
  pub product: StockRow,
  pub stock_value_at_cost: Decimal,
  pub stock_value_at_price: Decimal,
  pub restock_status: RestockStatus,
  /// Stock as a percentage of the minimum; absent when the minimum is zero.
  pub stock_percentage: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockTotals {
  pub product_count: usize,
  pub total_units: i64,
  pub total_cost_value: Decimal,
  pub total_price_value: Decimal,
  pub restock_urgent_count: usize,
  pub out_of_stock_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LowStockAlert {
  pub code: String,
  pub name: String,
  pub stock_level: i32,
  pub minimum_stock: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutOfStockAlert {
  pub code: String,
  pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StockAlerts {
  pub restock_urgent: Vec<LowStockAlert>,
  pub out_of_stock: Vec<OutOfStockAlert>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockReport {
  pub products: Vec<StockEntry>,
  pub totals: StockTotals,
  pub alerts: StockAlerts,
}

/// Stock as a percentage of the minimum, to two places. `None` without a minimum.
pub fn stock_percentage(stock_level: i32, minimum_stock: i32) -> Option<Decimal> {
  (minimum_stock > 0).then(|| {
    (Decimal::from(stock_level) * Decimal::ONE_HUNDRED / Decimal::from(minimum_stock)).round_dp(2)
  })
}

impl StockEntry {
  fn from_row(product: StockRow) -> Self {
    let units = Decimal::from(product.stock_level);
    Self {
      stock_value_at_cost: product.cost.unwrap_or(Decimal::ZERO) * units,
      stock_value_at_price: product.price * units,
      restock_status: RestockStatus::classify(product.stock_level, product.minimum_stock),
      stock_percentage: stock_percentage(product.stock_level, product.minimum_stock),
      product,
    }
  }
}

/// Classifies each product and adds up the totals and alerts.
pub fn build_stock_report(rows: Vec<StockRow>) -> StockReport {
  let mut products: Vec<StockEntry> = rows.into_iter().map(StockEntry::from_row).collect();
  products.sort_by(|a, b| {
    a.restock_status
      .cmp(&b.restock_status)
      .then(a.product.stock_level.cmp(&b.product.stock_level))
  });

  let mut totals = StockTotals {
    product_count: products.len(),
    ..Default::default()
  };
  let mut alerts = StockAlerts::default();
  for entry in &products {
    let p = &entry.product;
    totals.total_units += i64::from(p.stock_level);
    totals.total_cost_value += entry.stock_value_at_cost;
    totals.total_price_value += entry.stock_value_at_price;
    if p.stock_level <= p.minimum_stock {
      totals.restock_urgent_count += 1;
    }
    if p.stock_level == 0 {
      totals.out_of_stock_count += 1;
      alerts.out_of_stock.push(OutOfStockAlert {
        code: p.code.clone(),
        name: p.name.clone(),
      });
    } else if p.stock_level <= p.minimum_stock {
      alerts.restock_urgent.push(LowStockAlert {
        code: p.code.clone(),
        name: p.name.clone(),
        stock_level: p.stock_level,
        minimum_stock: p.minimum_stock,
      });
    }
  }

  StockReport {
    products,
    totals,
    alerts,
  }
}

#[instrument(name = "report::stock", skip(pool), err(Display))]
pub async fn stock_report(pool: &PgPool, query: &StockReportQuery) -> Result<StockReport, AppError> {
  let rows: Vec<StockRow> = sqlx::query_as(
    "SELECT p.id, p.code, p.name, p.category, p.price, p.cost, p.stock_level, p.minimum_stock, p.status, \
            COALESCE(SUM(ol.quantity) FILTER ( \
              WHERE o.status = 'invoiced' AND o.created_at >= NOW() - INTERVAL '30 days' \
            ), 0)::BIGINT AS sold_last_30_days \
     FROM products p \
     LEFT JOIN order_lines ol ON ol.product_id = p.id \
     LEFT JOIN orders o ON ol.order_id = o.id \
     WHERE p.status = $1 \
     GROUP BY p.id",
  )
  .bind(&query.status)
  .fetch_all(pool)
  .await?;
  Ok(build_stock_report(rows))
}
