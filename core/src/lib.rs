// src/lib.rs

//! SalesDesk: the order placement core of a small-business sales backend.
//!
//! An order is accepted only as a whole:
//!  - every line item is checked against the product's stock level,
//!  - each line records the product price at the moment of the order,
//!  - header and lines are committed in one transaction, or not at all.
//!
//! Storage is reached through the [`OrderStore`] / [`OrderTransaction`] traits.
//! The server crate implements them over Postgres; [`InMemoryStore`] implements
//! them for tests and local runs.

pub mod codes;
pub mod error;
pub mod model;
pub mod placement;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::codes::{format_order_code, EntityCode, ORDER_CODE_OFFSET};
pub use crate::error::{SalesError, SalesResult};
pub use crate::model::{
  LineItemRequest, NewOrderHeader, NewOrderLine, Order, OrderLine, OrderStatus, PlaceOrderRequest, ProductSnapshot,
};
pub use crate::placement::{fits_money_column, max_money, validate_request, OrderPlacementService, StockPolicy, MONEY_SCALE};
pub use crate::store::{InMemoryStore, OrderStore, OrderTransaction};

// Re-exported so callers share the exact money type used in the model.
pub use rust_decimal::Decimal;
