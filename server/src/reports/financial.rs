// salesdesk/server/src/reports/financial.rs

//! Financial overview of invoiced orders in an optional date range: sales per
//! day and per category, the best products and customers, and how each
//! salesperson did.

use super::push_date_range;
use crate::errors::AppError;
use crate::models::ContractType;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

/// Rows kept in the top products and top customers rankings.
pub const TOP_LIMIT: i64 = 10;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinancialQuery {
  pub start: Option<NaiveDate>,
  /// Inclusive.
  pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailySales {
  pub day: NaiveDate,
  pub order_count: i64,
  pub total_sales: Decimal,
  pub total_discounts: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategorySales {
  pub category: String,
  pub order_count: i64,
  pub units_sold: i64,
  pub total_sales: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopProduct {
  pub code: String,
  pub name: String,
  pub category: String,
  pub units_sold: i64,
  pub total_sales: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopCustomer {
  pub code: String,
  pub name: String,
  pub city: Option<String>,
  pub state: Option<String>,
  pub order_count: i64,
  pub total_spent: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SalespersonSales {
  pub code: String,
  pub name: String,
  #[sqlx(try_from = "String")]
  pub contract_type: ContractType,
  pub commission_rate: Decimal,
  pub order_count: i64,
  pub total_sales: Decimal,
  pub total_commission: Decimal,
}

/// Requested bounds, echoed back; `null` means open-ended.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialPeriod {
  pub start: Option<NaiveDate>,
  pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
  pub order_count: i64,
  pub total_sales: Decimal,
  pub total_discounts: Decimal,
  pub average_ticket: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialReport {
  pub period: FinancialPeriod,
  pub daily_sales: Vec<DailySales>,
  pub category_sales: Vec<CategorySales>,
  pub top_products: Vec<TopProduct>,
  pub top_customers: Vec<TopCustomer>,
  pub salesperson_sales: Vec<SalespersonSales>,
  pub summary: FinancialSummary,
}

/// Adds the day rows up. The average ticket is total sales over total orders,
/// not the mean of the daily averages.
pub fn summarize(days: &[DailySales]) -> FinancialSummary {
  let mut summary = days.iter().fold(FinancialSummary::default(), |mut acc, day| {
    acc.order_count += day.order_count;
    acc.total_sales += day.total_sales;
    acc.total_discounts += day.total_discounts;
    acc
  });
  if summary.order_count > 0 {
    summary.average_ticket = (summary.total_sales / Decimal::from(summary.order_count)).round_dp(2);
  }
  summary
}

fn invoiced(select: &str, query: &FinancialQuery) -> Result<QueryBuilder<'static, Postgres>, AppError> {
  let mut qb = QueryBuilder::new(select);
  qb.push(" WHERE o.status = 'invoiced'");
  push_date_range(&mut qb, "o.created_at", query.start, query.end)?;
  Ok(qb)
}

pub fn daily_sales_query(query: &FinancialQuery) -> Result<QueryBuilder<'static, Postgres>, AppError> {
  let mut qb = invoiced(
    "SELECT o.created_at::date AS day, COUNT(*) AS order_count, \
     SUM(o.total_value) AS total_sales, SUM(o.discount) AS total_discounts \
     FROM orders o",
    query,
  )?;
  qb.push(" GROUP BY o.created_at::date ORDER BY o.created_at::date DESC");
  Ok(qb)
}

pub fn category_sales_query(query: &FinancialQuery) -> Result<QueryBuilder<'static, Postgres>, AppError> {
  let mut qb = invoiced(
    "SELECT p.category, COUNT(DISTINCT o.id) AS order_count, \
     SUM(ol.quantity)::BIGINT AS units_sold, SUM(ol.subtotal) AS total_sales \
     FROM orders o \
     JOIN order_lines ol ON ol.order_id = o.id \
     JOIN products p ON ol.product_id = p.id",
    query,
  )?;
  qb.push(" GROUP BY p.category ORDER BY total_sales DESC");
  Ok(qb)
}

pub fn top_products_query(query: &FinancialQuery) -> Result<QueryBuilder<'static, Postgres>, AppError> {
  let mut qb = invoiced(
    "SELECT p.code, p.name, p.category, \
     SUM(ol.quantity)::BIGINT AS units_sold, SUM(ol.subtotal) AS total_sales \
     FROM orders o \
     JOIN order_lines ol ON ol.order_id = o.id \
     JOIN products p ON ol.product_id = p.id",
    query,
  )?;
  qb.push(" GROUP BY p.id, p.code, p.name, p.category ORDER BY units_sold DESC LIMIT ")
    .push_bind(TOP_LIMIT);
  Ok(qb)
}

pub fn top_customers_query(query: &FinancialQuery) -> Result<QueryBuilder<'static, Postgres>, AppError> {
  let mut qb = invoiced(
    "SELECT c.code, c.name, c.city, c.state, \
     COUNT(o.id) AS order_count, SUM(o.total_value) AS total_spent \
     FROM orders o \
     JOIN customers c ON o.customer_id = c.id",
    query,
  )?;
  qb.push(" GROUP BY c.id, c.code, c.name, c.city, c.state ORDER BY total_spent DESC LIMIT ")
    .push_bind(TOP_LIMIT);
  Ok(qb)
}

pub fn salesperson_sales_query(query: &FinancialQuery) -> Result<QueryBuilder<'static, Postgres>, AppError> {
  let mut qb = invoiced(
    "SELECT e.code, e.name, e.contract_type, e.commission_rate, \
     COUNT(o.id) AS order_count, SUM(o.total_value) AS total_sales, \
     CASE WHEN e.contract_type = 'Commissioned' \
       THEN ROUND(SUM(o.total_value) * e.commission_rate / 100, 2) ELSE 0 END AS total_commission \
     FROM orders o \
     JOIN employees e ON o.salesperson_id = e.id",
    query,
  )?;
  qb.push(" GROUP BY e.id, e.code, e.name, e.contract_type, e.commission_rate ORDER BY total_sales DESC");
  Ok(qb)
}

/// The five sections are independent and run concurrently.
#[instrument(name = "report::financial", skip(pool))]
pub async fn financial_report(pool: &PgPool, query: &FinancialQuery) -> Result<FinancialReport, AppError> {
  let mut daily = daily_sales_query(query)?;
  let mut categories = category_sales_query(query)?;
  let mut products = top_products_query(query)?;
  let mut customers = top_customers_query(query)?;
  let mut salespeople = salesperson_sales_query(query)?;

  let (daily_sales, category_sales, top_products, top_customers, salesperson_sales) = futures_util::try_join!(
    daily.build_query_as::<DailySales>().fetch_all(pool),
    categories.build_query_as::<CategorySales>().fetch_all(pool),
    products.build_query_as::<TopProduct>().fetch_all(pool),
    customers.build_query_as::<TopCustomer>().fetch_all(pool),
    salespeople.build_query_as::<SalespersonSales>().fetch_all(pool),
  )?;

  let summary = summarize(&daily_sales);
  Ok(FinancialReport {
    period: FinancialPeriod {
      start: query.start,
      end: query.end,
    },
    daily_sales,
    category_sales,
    top_products,
    top_customers,
    salesperson_sales,
    summary,
  })
}
