// salesdesk/server/src/web/handlers/mod.rs

pub mod customer_handlers;
pub mod employee_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod report_handlers;
