// salesdesk/server/src/reports/csv.rs

//! Semicolon-separated export format: a header row of column names, string
//! values in double quotes (inner quotes doubled), numbers and timestamps bare,
//! missing values empty.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub const SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq)]
pub enum CsvValue {
  Text(String),
  Bare(String),
  Empty,
}

impl CsvValue {
  fn render(&self, out: &mut String) {
    match self {
      CsvValue::Text(s) => {
        out.push('"');
        out.push_str(&s.replace('"', "\"\""));
        out.push('"');
      }
      CsvValue::Bare(s) => out.push_str(s),
      CsvValue::Empty => {}
    }
  }
}

impl From<&str> for CsvValue {
  fn from(value: &str) -> Self {
    CsvValue::Text(value.to_string())
  }
}

impl From<&String> for CsvValue {
  fn from(value: &String) -> Self {
    CsvValue::Text(value.clone())
  }
}

impl From<i32> for CsvValue {
  fn from(value: i32) -> Self {
    CsvValue::Bare(value.to_string())
  }
}

impl From<i64> for CsvValue {
  fn from(value: i64) -> Self {
    CsvValue::Bare(value.to_string())
  }
}

impl From<Decimal> for CsvValue {
  fn from(value: Decimal) -> Self {
    CsvValue::Bare(value.to_string())
  }
}

impl From<DateTime<Utc>> for CsvValue {
  fn from(value: DateTime<Utc>) -> Self {
    CsvValue::Bare(value.to_rfc3339())
  }
}

impl<T> From<Option<T>> for CsvValue
where
  T: Into<CsvValue>,
{
  fn from(value: Option<T>) -> Self {
    value.map_or(CsvValue::Empty, Into::into)
  }
}

/// A row that can be written as one CSV line.
pub trait CsvRecord {
  fn headers() -> &'static [&'static str];
  fn values(&self) -> Vec<CsvValue>;
}

pub fn render_csv<T: CsvRecord>(rows: &[T]) -> String {
  let sep = SEPARATOR.to_string();
  let mut out = T::headers().join(&sep);
  for row in rows {
    out.push('\n');
    for (i, value) in row.values().iter().enumerate() {
      if i > 0 {
        out.push(SEPARATOR);
      }
      value.render(&mut out);
    }
  }
  out
}
