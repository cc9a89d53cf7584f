use crate::error::ReportError;
use crate::models::{Report, ReportStats, ReportVariant};
use crate::service::ReportService;
use crate::sheet::{to_csv_string, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME};
use axum::{
    extract::{Json, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

// multipart 字段名
pub const REGISTER_FIELD: &str = "sales_register";
pub const PROFITABILITY_FIELD: &str = "sales_profitability";
pub const VARIANT_FIELD: &str = "variant";

/// 报表响应体 (表格视图)
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub success: bool,
    pub message: String,
    pub variant: ReportVariant,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub stats: ReportStats,
    pub generated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            success: true,
            message: format!("Processed {} purchase orders", report.rows.len()),
            variant: report.variant,
            columns: report.columns(),
            rows: report.display_rows(),
            stats: report.stats,
            generated_at: report.generated_at,
        }
    }
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.into(),
        }),
    )
}

fn report_error(e: ReportError) -> ApiError {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    tracing::error!("Report processing failed: {}", e);
    api_error(status, format!("Error: {}", e))
}

/// 上传表单
struct UploadForm {
    register: Vec<u8>,
    profitability: Vec<u8>,
    variant: Option<ReportVariant>,
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut register = None;
    let mut profitability = None;
    let mut variant = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            REGISTER_FIELD | PROFITABILITY_FIELD => {
                let file_name = field.file_name().unwrap_or("unknown").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Read error: {}", e)))?;
                tracing::info!("收到上传 {}: {} ({} bytes)", name, file_name, bytes.len());

                if name == REGISTER_FIELD {
                    register = Some(bytes.to_vec());
                } else {
                    profitability = Some(bytes.to_vec());
                }
            }
            VARIANT_FIELD => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Read error: {}", e)))?;
                if !text.trim().is_empty() {
                    variant = Some(text.parse::<ReportVariant>().map_err(report_error)?);
                }
            }
            other => tracing::debug!("忽略未知字段 {}", other),
        }
    }

    let register = register.ok_or_else(|| {
        api_error(StatusCode::BAD_REQUEST, format!("Missing file field '{}'", REGISTER_FIELD))
    })?;
    let profitability = profitability.ok_or_else(|| {
        api_error(StatusCode::BAD_REQUEST, format!("Missing file field '{}'", PROFITABILITY_FIELD))
    })?;

    Ok(UploadForm {
        register,
        profitability,
        variant,
    })
}

/// 在阻塞线程池中执行处理 (表格解析为 CPU 密集)
async fn run_report(service: Arc<ReportService>, form: UploadForm) -> Result<Report, ApiError> {
    tokio::task::spawn_blocking(move || {
        service.process(&form.register, &form.profitability, form.variant)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)))?
    .map_err(report_error)
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 处理并返回 JSON 表格
pub async fn process_report(
    State(service): State<Arc<ReportService>>,
    multipart: Multipart,
) -> Response {
    let result: Result<Report, ApiError> = async {
        let form = read_upload(multipart).await?;
        run_report(service, form).await
    }
    .await;

    match result {
        Ok(report) => (StatusCode::OK, Json(ReportResponse::from(report))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 处理并下载 processed_data.csv
pub async fn download_report_csv(
    State(service): State<Arc<ReportService>>,
    multipart: Multipart,
) -> Response {
    let result: Result<String, ApiError> = async {
        let form = read_upload(multipart).await?;
        let report = run_report(service, form).await?;
        to_csv_string(&report.rows, report.variant).map_err(report_error)
    }
    .await;

    match result {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
