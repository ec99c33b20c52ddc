// salesdesk/core/src/codes.rs

//! Human-readable codes handed out to orders and catalogue entities.
//!
//! The numeric part always comes from an atomic counter owned by the store
//! (see [`OrderTransaction::next_order_sequence`](crate::store::OrderTransaction::next_order_sequence));
//! this module only formats it.

/// Offset added to the order sequence, so the first order is `#PED-1001`.
pub const ORDER_CODE_OFFSET: i64 = 1000;

/// Code families for entities created through the CRUD endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCode {
  Customer,
  Product,
  Employee,
}

impl EntityCode {
  pub fn prefix(&self) -> &'static str {
    match self {
      EntityCode::Customer => "#CLI-",
      EntityCode::Product => "#PROD-",
      EntityCode::Employee => "#FUNC-",
    }
  }

  /// Key of this family's row in the store's counter table.
  pub fn counter_key(&self) -> &'static str {
    match self {
      EntityCode::Customer => "customer",
      EntityCode::Product => "product",
      EntityCode::Employee => "employee",
    }
  }

  /// `#CLI-001`, `#PROD-042`, ... Numbers wider than three digits are kept whole.
  pub fn format(&self, sequence: i64) -> String {
    format!("{}{:03}", self.prefix(), sequence)
  }
}

/// `#PED-<1000 + sequence>`.
pub fn format_order_code(sequence: i64) -> String {
  format!("#PED-{}", ORDER_CODE_OFFSET + sequence)
}
