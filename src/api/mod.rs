pub mod handlers;

pub use handlers::{download_report_csv, health_check, process_report};

use crate::service::ReportService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 路由
///
/// - `GET  /health`
/// - `POST /api/report`      JSON 表格
/// - `POST /api/report/csv`  下载 processed_data.csv
pub fn router(service: Arc<ReportService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/report", post(process_report))
        .route("/api/report/csv", post(download_report_csv))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}
