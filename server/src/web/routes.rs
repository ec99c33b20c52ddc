// salesdesk/server/src/web/routes.rs

use actix_web::{web, HttpResponse};
use salesdesk::StockPolicy;
use serde_json::json;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::handlers::{customer_handlers, employee_handlers, order_handlers, product_handlers, report_handlers};

async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let stock_policy = match app_state.config.stock_policy {
    StockPolicy::CheckOnly => "check_only",
    StockPolicy::Reserve => "reserve",
  };
  HttpResponse::Ok().json(json!({ "status": "ok", "stock_policy": stock_policy }))
}

/// Malformed bodies, query strings and path ids answer 400 with the usual `{"error": ...}` body.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::PathConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()));
}

// Called from `main.rs` (and endpoint tests) to mount everything under /api.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  extractor_configs(cfg);
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::place_order_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler)),
      )
      .service(
        web::scope("/customers")
          .route("", web::get().to(customer_handlers::list_customers_handler))
          .route("", web::post().to(customer_handlers::create_customer_handler))
          .route("/{customer_id}", web::get().to(customer_handlers::get_customer_handler))
          .route("/{customer_id}", web::put().to(customer_handlers::update_customer_handler))
          .route("/{customer_id}", web::delete().to(customer_handlers::delete_customer_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          // Literal segments go before `{product_id}`.
          .route("/low-stock", web::get().to(product_handlers::low_stock_products_handler))
          .route("/best-sellers", web::get().to(product_handlers::best_sellers_handler))
          .route("/most-viewed", web::get().to(product_handlers::most_viewed_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
          .route("/{product_id}", web::delete().to(product_handlers::deactivate_product_handler))
          .route("/{product_id}/view", web::post().to(product_handlers::register_view_handler))
          .route("/{product_id}/statistics", web::get().to(product_handlers::product_statistics_handler)),
      )
      .service(
        web::scope("/employees")
          .route("", web::get().to(employee_handlers::list_employees_handler))
          .route("", web::post().to(employee_handlers::create_employee_handler))
          .route("/active", web::get().to(employee_handlers::list_active_employees_handler))
          .route("/performance", web::get().to(employee_handlers::salesperson_performance_handler))
          .route("/{employee_id}", web::get().to(employee_handlers::get_employee_handler))
          .route("/{employee_id}", web::put().to(employee_handlers::update_employee_handler))
          .route("/{employee_id}", web::delete().to(employee_handlers::deactivate_employee_handler))
          .route("/{employee_id}/salary", web::get().to(employee_handlers::calculate_salary_handler)),
      )
      .service(
        web::scope("/reports")
          .route("/sales", web::get().to(report_handlers::sales_report_handler))
          .route("/stock", web::get().to(report_handlers::stock_report_handler))
          .route("/financial", web::get().to(report_handlers::financial_report_handler))
          .route("/customers", web::get().to(report_handlers::customer_report_handler))
          .route("/products", web::get().to(report_handlers::product_report_handler))
          .route("/dashboard", web::get().to(report_handlers::dashboard_handler))
          .route("/export/{kind}", web::get().to(report_handlers::export_report_handler)),
      ),
  );
}
