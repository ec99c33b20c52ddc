// salesdesk/server/src/reports/mod.rs

//! Read-only reports. Only `invoiced` orders count as sales.

pub mod csv;
pub mod customers;
pub mod dashboard;
pub mod export;
pub mod financial;
pub mod performance;
pub mod products;
pub mod sales;
pub mod stock;

use crate::errors::AppError;
use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};

/// Look-back used by trailing-window reports when the caller gives none.
pub const DEFAULT_WINDOW_DAYS: i32 = 30;
pub const MAX_WINDOW_DAYS: i32 = 3650;

/// Validates a `days` query parameter for a trailing window.
pub fn window_days(days: Option<i32>) -> Result<i32, AppError> {
  let days = days.unwrap_or(DEFAULT_WINDOW_DAYS);
  if !(1..=MAX_WINDOW_DAYS).contains(&days) {
    return Err(AppError::Validation(format!(
      "days must be between 1 and {}, got {}",
      MAX_WINDOW_DAYS, days
    )));
  }
  Ok(days)
}

/// Appends `AND <column> >= start AND <column> < end + 1 day`; both bounds are optional
/// and the end date is inclusive.
pub(crate) fn push_date_range(
  qb: &mut QueryBuilder<'static, Postgres>,
  column: &str,
  start: Option<NaiveDate>,
  end: Option<NaiveDate>,
) -> Result<(), AppError> {
  if let (Some(start), Some(end)) = (start, end) {
    if start > end {
      return Err(AppError::Validation(format!("Start date {} is after end date {}", start, end)));
    }
  }
  if let Some(start) = start {
    qb.push(format!(" AND {} >= ", column)).push_bind(start);
  }
  if let Some(end) = end {
    let after_end = end
      .succ_opt()
      .ok_or_else(|| AppError::Validation(format!("End date {} is out of range", end)))?;
    qb.push(format!(" AND {} < ", column)).push_bind(after_end);
  }
  Ok(())
}
