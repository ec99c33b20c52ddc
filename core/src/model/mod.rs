// salesdesk/core/src/model/mod.rs

//! Data structures shared by the placement service and its stores.

pub mod order;
pub mod product;

pub use order::{LineItemRequest, NewOrderHeader, NewOrderLine, Order, OrderLine, OrderStatus, PlaceOrderRequest};
pub use product::ProductSnapshot;
