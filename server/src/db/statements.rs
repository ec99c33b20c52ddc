// salesdesk/server/src/db/statements.rs

//! Write statements for the catalog handlers: updates by id, product view
//! registration and the soft-delete guard that refuses to deactivate anything
//! still referenced by a pending order.

use crate::db::filters::{CUSTOMER_COLUMNS, EMPLOYEE_COLUMNS, PRODUCT_COLUMNS};
use crate::errors::AppError;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assign {
  /// The bound value is written as is, null included.
  Replace,
  /// A null bind keeps the stored value.
  KeepWhenNull,
}

use Assign::{KeepWhenNull, Replace};

const CUSTOMER_UPDATE: &[(&str, Assign)] = &[
  ("name", Replace),
  ("email", Replace),
  ("phone", Replace),
  ("document", Replace),
  ("address", Replace),
  ("city", Replace),
  ("state", Replace),
  ("status", KeepWhenNull),
];

const PRODUCT_UPDATE: &[(&str, Assign)] = &[
  ("name", KeepWhenNull),
  ("category", KeepWhenNull),
  ("description", KeepWhenNull),
  ("price", KeepWhenNull),
  ("cost", KeepWhenNull),
  ("stock_level", KeepWhenNull),
  ("minimum_stock", KeepWhenNull),
  ("status", KeepWhenNull),
];

const EMPLOYEE_UPDATE: &[(&str, Assign)] = &[
  ("name", KeepWhenNull),
  ("role", KeepWhenNull),
  ("contract_type", KeepWhenNull),
  ("base_salary", KeepWhenNull),
  ("commission_rate", KeepWhenNull),
  ("email", KeepWhenNull),
  ("phone", KeepWhenNull),
  ("status", KeepWhenNull),
];

/// `UPDATE <table> SET ... WHERE id = $n RETURNING <returning>`.
///
/// Placeholders follow `assignments` in order and the id is bound last, so
/// callers bind the fields in the same order as the table lists them.
pub fn update_by_id(table: &str, assignments: &[(&str, Assign)], returning: &str) -> String {
  let set = assignments
    .iter()
    .enumerate()
    .map(|(i, (column, assign))| match assign {
      Replace => format!("{} = ${}", column, i + 1),
      KeepWhenNull => format!("{} = COALESCE(${}, {})", column, i + 1, column),
    })
    .collect::<Vec<_>>()
    .join(", ");
  format!(
    "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
    table,
    set,
    assignments.len() + 1,
    returning
  )
}

/// Full replace of a customer; a missing status keeps the stored one.
pub fn customer_update_sql() -> String {
  update_by_id("customers", CUSTOMER_UPDATE, CUSTOMER_COLUMNS)
}

pub fn product_update_sql() -> String {
  update_by_id("products", PRODUCT_UPDATE, PRODUCT_COLUMNS)
}

pub fn employee_update_sql() -> String {
  update_by_id("employees", EMPLOYEE_UPDATE, EMPLOYEE_COLUMNS)
}

/// Bumps the running view total; no row affected means no such product.
pub const BUMP_VIEW_COUNT_SQL: &str = "UPDATE products SET view_count = view_count + 1 WHERE id = $1";

/// One row per registered view; the customer is optional.
pub const RECORD_VIEW_SQL: &str = "INSERT INTO product_views (product_id, customer_id) VALUES ($1, $2)";

pub const CUSTOMER_EXISTS_SQL: &str = "SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1)";

/// Entities that are soft deleted, and only when no pending order needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deactivation {
  Product,
  Employee,
}

impl Deactivation {
  /// Counts pending orders referencing the entity bound as `$1`.
  pub fn pending_orders_sql(self) -> &'static str {
    match self {
      Deactivation::Product => {
        "SELECT COUNT(*) FROM order_lines ol \
         JOIN orders o ON ol.order_id = o.id \
         WHERE ol.product_id = $1 AND o.status = 'pending'"
      }
      Deactivation::Employee => "SELECT COUNT(*) FROM orders WHERE salesperson_id = $1 AND status = 'pending'",
    }
  }

  pub fn deactivate_sql(self) -> &'static str {
    match self {
      Deactivation::Product => "UPDATE products SET status = 'inactive' WHERE id = $1",
      Deactivation::Employee => "UPDATE employees SET status = 'inactive' WHERE id = $1",
    }
  }

  fn refusal(self) -> &'static str {
    match self {
      Deactivation::Product => "Product is on pending orders. Cancel those orders first.",
      Deactivation::Employee => "Employee has pending orders. Transfer the orders first.",
    }
  }
}

/// Turns the pending-order count into the go/no-go for a soft delete.
pub fn ensure_no_pending_orders(entity: Deactivation, entity_id: i64, pending: i64) -> Result<(), AppError> {
  if pending > 0 {
    warn!(?entity, entity_id, pending, "Refusing to deactivate with pending orders.");
    return Err(AppError::Validation(entity.refusal().into()));
  }
  Ok(())
}
