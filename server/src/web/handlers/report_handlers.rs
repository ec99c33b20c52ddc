// salesdesk/server/src/web/handlers/report_handlers.rs

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::reports::customers::{customer_report, CustomerReportQuery};
use crate::reports::dashboard::dashboard;
use crate::reports::export::{fetch_export, ExportFormat, ExportKind, ExportQuery};
use crate::reports::financial::{financial_report, FinancialQuery};
use crate::reports::products::{product_report, ProductReportQuery};
use crate::reports::sales::{sales_report, SalesReportQuery};
use crate::reports::stock::{stock_report, StockReportQuery};
use crate::state::AppState;

#[instrument(name = "handler::sales_report", skip(app_state))]
pub async fn sales_report_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<SalesReportQuery>,
) -> Result<HttpResponse, AppError> {
  let periods = sales_report(&app_state.db_pool, &query_params).await?;
  Ok(HttpResponse::Ok().json(periods))
}

#[instrument(name = "handler::stock_report", skip(app_state))]
pub async fn stock_report_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<StockReportQuery>,
) -> Result<HttpResponse, AppError> {
  let report = stock_report(&app_state.db_pool, &query_params).await?;
  Ok(HttpResponse::Ok().json(report))
}

#[instrument(name = "handler::financial_report", skip(app_state))]
pub async fn financial_report_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<FinancialQuery>,
) -> Result<HttpResponse, AppError> {
  let report = financial_report(&app_state.db_pool, &query_params).await?;
  Ok(HttpResponse::Ok().json(report))
}

#[instrument(name = "handler::customer_report", skip(app_state))]
pub async fn customer_report_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<CustomerReportQuery>,
) -> Result<HttpResponse, AppError> {
  let customers = customer_report(&app_state.db_pool, &query_params).await?;
  info!(customers = customers.len(), "Customer report ready.");
  Ok(HttpResponse::Ok().json(customers))
}

#[instrument(name = "handler::product_report", skip(app_state))]
pub async fn product_report_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ProductReportQuery>,
) -> Result<HttpResponse, AppError> {
  let products = product_report(&app_state.db_pool, &query_params).await?;
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::dashboard", skip(app_state))]
pub async fn dashboard_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let summary = dashboard(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(summary))
}

#[instrument(name = "handler::export_report", skip(app_state, path), fields(kind = %path.as_ref()))]
pub async fn export_report_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  query_params: web::Query<ExportQuery>,
) -> Result<HttpResponse, AppError> {
  // Reject unknown kinds before touching the database.
  let kind: ExportKind = path.into_inner().parse()?;
  let rows = fetch_export(&app_state.db_pool, kind).await?;
  info!(rows = rows.len(), "Export ready.");

  match query_params.format {
    ExportFormat::Json => Ok(HttpResponse::Ok().json(rows.to_json()?)),
    ExportFormat::Csv => {
      let file_name = kind.file_name(Utc::now().date_naive());
      Ok(
        HttpResponse::Ok()
          .content_type("text/csv")
          .insert_header((header::CONTENT_DISPOSITION, format!("attachment; filename={}", file_name)))
          .body(rows.to_csv()),
      )
    }
  }
}
