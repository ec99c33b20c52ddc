// salesdesk/server/src/reports/sales.rs

use super::push_date_range;
use crate::errors::AppError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SalesGrouping {
  #[default]
  Day,
  Week,
  Month,
}

impl SalesGrouping {
  /// Unknown or missing values group by day.
  pub fn parse(value: Option<&str>) -> Self {
    match value.map(str::trim) {
      Some("week") => SalesGrouping::Week,
      Some("month") => SalesGrouping::Month,
      _ => SalesGrouping::Day,
    }
  }

  fn trunc_unit(&self) -> &'static str {
    match self {
      SalesGrouping::Day => "day",
      SalesGrouping::Week => "week",
      SalesGrouping::Month => "month",
    }
  }

  fn label_format(&self) -> &'static str {
    match self {
      SalesGrouping::Day => "YYYY-MM-DD",
      SalesGrouping::Week => "IYYY-\"W\"IW",
      SalesGrouping::Month => "YYYY-MM",
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesReportQuery {
  pub start: Option<NaiveDate>,
  /// Inclusive.
  pub end: Option<NaiveDate>,
  pub group: Option<String>,
  pub customer_id: Option<i64>,
  pub salesperson_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SalesPeriod {
  pub period: String,
  pub order_count: i64,
  pub total_sales: Decimal,
  pub average_ticket: Decimal,
  pub distinct_customers: i64,
}

pub fn sales_report_query(query: &SalesReportQuery) -> Result<QueryBuilder<'static, Postgres>, AppError> {
  let grouping = SalesGrouping::parse(query.group.as_deref());
  let bucket = format!("DATE_TRUNC('{}', o.created_at)", grouping.trunc_unit());

  let mut qb = QueryBuilder::new(format!(
    "SELECT TO_CHAR({bucket}, '{label}') AS period, \
     COUNT(*) AS order_count, \
     SUM(o.total_value) AS total_sales, \
     ROUND(AVG(o.total_value), 2) AS average_ticket, \
     COUNT(DISTINCT o.customer_id) AS distinct_customers \
     FROM orders o WHERE o.status = 'invoiced'",
    bucket = bucket,
    label = grouping.label_format()
  ));
  push_date_range(&mut qb, "o.created_at", query.start, query.end)?;
  if let Some(customer_id) = query.customer_id {
    qb.push(" AND o.customer_id = ").push_bind(customer_id);
  }
  if let Some(salesperson_id) = query.salesperson_id {
    qb.push(" AND o.salesperson_id = ").push_bind(salesperson_id);
  }
  qb.push(format!(" GROUP BY {bucket} ORDER BY {bucket} DESC", bucket = bucket));
  Ok(qb)
}

#[instrument(name = "report::sales", skip(pool))]
pub async fn sales_report(pool: &PgPool, query: &SalesReportQuery) -> Result<Vec<SalesPeriod>, AppError> {
  let mut qb = sales_report_query(query)?;
  Ok(qb.build_query_as().fetch_all(pool).await?)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_grouping_falls_back_to_day() {
    assert_eq!(SalesGrouping::parse(Some("fortnight")), SalesGrouping::Day);
    assert_eq!(SalesGrouping::parse(None), SalesGrouping::Day);
    assert_eq!(SalesGrouping::parse(Some("month")), SalesGrouping::Month);
  }

  #[test]
  fn filters_are_bound_and_end_date_is_inclusive() {
    let query = SalesReportQuery {
      start: NaiveDate::from_ymd_opt(2025, 1, 1),
      end: NaiveDate::from_ymd_opt(2025, 1, 31),
      group: Some("week".into()),
      customer_id: None,
      salesperson_id: Some(4),
    };
    let qb = sales_report_query(&query).unwrap();
    let sql = qb.sql();
    assert!(sql.contains("DATE_TRUNC('week', o.created_at)"));
    assert!(sql.contains(
      "WHERE o.status = 'invoiced' AND o.created_at >= $1 AND o.created_at < $2 AND o.salesperson_id = $3"
    ));
    assert!(sql.ends_with("ORDER BY DATE_TRUNC('week', o.created_at) DESC"));
  }

  #[test]
  fn reversed_range_is_rejected() {
    let query = SalesReportQuery {
      start: NaiveDate::from_ymd_opt(2025, 2, 1),
      end: NaiveDate::from_ymd_opt(2025, 1, 1),
      ..Default::default()
    };
    assert!(matches!(sales_report_query(&query), Err(AppError::Validation(_))));
  }
}
