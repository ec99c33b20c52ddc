// salesdesk/server/src/db/filters.rs

//! List queries with optional filters. Every value goes through `push_bind`;
//! only fixed column names and clauses are pushed as SQL text.

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

pub const CUSTOMER_COLUMNS: &str =
  "id, code, name, email, phone, document, address, city, state, status, loyalty_points, registered_at";

pub const PRODUCT_COLUMNS: &str = "id, code, name, category, description, price, cost, stock_level, minimum_stock, \
   view_count, average_rating, status, created_at";

pub const EMPLOYEE_COLUMNS: &str =
  "id, code, name, role, contract_type, base_salary, commission_rate, email, phone, status, hired_at";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
  pub category: Option<String>,
  pub status: Option<String>,
  /// Case-insensitive match on name or code.
  pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilter {
  pub status: Option<String>,
  pub role: Option<String>,
  pub contract_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActiveEmployeeFilter {
  pub role: Option<String>,
}

fn present(value: &Option<String>) -> Option<String> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// `%term%` for `ILIKE ... ESCAPE '\'`, with the term's own `%`, `_` and `\`
/// matched literally.
pub fn like_pattern(term: &str) -> String {
  let mut pattern = String::with_capacity(term.len() + 2);
  pattern.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

pub fn product_list_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
  let mut qb = QueryBuilder::new(format!("SELECT {} FROM products WHERE 1=1", PRODUCT_COLUMNS));
  if let Some(category) = present(&filter.category) {
    qb.push(" AND category = ").push_bind(category);
  }
  if let Some(status) = present(&filter.status) {
    qb.push(" AND status = ").push_bind(status);
  }
  if let Some(search) = present(&filter.search) {
    let pattern = like_pattern(&search);
    qb.push(" AND (name ILIKE ")
      .push_bind(pattern.clone())
      .push(" ESCAPE '\\' OR code ILIKE ")
      .push_bind(pattern)
      .push(" ESCAPE '\\')");
  }
  qb.push(" ORDER BY name ASC");
  qb
}

pub fn employee_list_query(filter: &EmployeeFilter) -> QueryBuilder<'static, Postgres> {
  let mut qb = QueryBuilder::new(format!("SELECT {} FROM employees WHERE 1=1", EMPLOYEE_COLUMNS));
  if let Some(status) = present(&filter.status) {
    qb.push(" AND status = ").push_bind(status);
  }
  if let Some(role) = present(&filter.role) {
    qb.push(" AND role = ").push_bind(role);
  }
  if let Some(contract_type) = present(&filter.contract_type) {
    qb.push(" AND contract_type = ").push_bind(contract_type);
  }
  qb.push(" ORDER BY name ASC");
  qb
}

pub fn active_employees_query(filter: &ActiveEmployeeFilter) -> QueryBuilder<'static, Postgres> {
  let mut qb = QueryBuilder::new("SELECT id, code, name, role FROM employees WHERE status = 'active'");
  if let Some(role) = present(&filter.role) {
    qb.push(" AND role = ").push_bind(role);
  }
  qb.push(" ORDER BY name ASC");
  qb
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unfiltered_product_list_is_sorted_by_name() {
    let qb = product_list_query(&ProductFilter::default());
    assert_eq!(
      qb.sql(),
      format!("SELECT {} FROM products WHERE 1=1 ORDER BY name ASC", PRODUCT_COLUMNS)
    );
  }

  #[test]
  fn product_search_binds_the_pattern_for_name_and_code() {
    let filter = ProductFilter {
      category: Some("Kits".into()),
      status: None,
      search: Some("arm'; DROP TABLE products; --".into()),
    };
    let qb = product_list_query(&filter);
    let sql = qb.sql();
    assert!(sql.ends_with(
      " AND category = $1 AND (name ILIKE $2 ESCAPE '\\' OR code ILIKE $3 ESCAPE '\\') ORDER BY name ASC"
    ));
    assert!(!sql.contains("DROP"));
  }

  #[test]
  fn search_wildcards_are_matched_literally() {
    assert_eq!(like_pattern("arm"), "%arm%");
    assert_eq!(like_pattern("50%"), "%50\\%%");
    assert_eq!(like_pattern("a_b"), "%a\\_b%");
    assert_eq!(like_pattern(r"c:\kits"), r"%c:\\kits%");
    assert_eq!(like_pattern("%"), "%\\%%");
  }

  #[test]
  fn blank_filters_are_ignored() {
    let filter = EmployeeFilter {
      status: Some("  ".into()),
      role: Some("Seller".into()),
      contract_type: Some("Commissioned".into()),
    };
    let qb = employee_list_query(&filter);
    assert!(qb
      .sql()
      .ends_with("WHERE 1=1 AND role = $1 AND contract_type = $2 ORDER BY name ASC"));
  }

  #[test]
  fn active_employees_only_filter_by_role() {
    let none = active_employees_query(&ActiveEmployeeFilter::default());
    assert_eq!(
      none.sql(),
      "SELECT id, code, name, role FROM employees WHERE status = 'active' ORDER BY name ASC"
    );
    let seller = active_employees_query(&ActiveEmployeeFilter {
      role: Some("Seller".into()),
    });
    assert!(seller.sql().contains("AND role = $1"));
  }
}
