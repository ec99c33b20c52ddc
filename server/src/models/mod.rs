// salesdesk/server/src/models/mod.rs

//! Rows and request payloads for the catalogue and people endpoints.
//! Orders live in the `salesdesk` core crate.

pub mod customer;
pub mod employee;
pub mod product;

pub use customer::{Customer, CustomerPayload};
pub use employee::{
  ActiveEmployee, ContractType, CreateEmployeeRequest, Employee, NewEmployee, SalaryBreakdown, UpdateEmployeeRequest,
};
pub use product::{CreateProductRequest, NewProduct, Product, UpdateProductRequest};

/// Status shared by customers, products and employees.
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";

/// Trims an optional text field and turns blank input into `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
