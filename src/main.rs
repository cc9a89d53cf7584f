use po_profit_report::{api, AppConfig, ReportService};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    let service = Arc::new(ReportService::from_config(&config.report)?);
    info!(
        "Report service ready: 默认报表类型 {}, 本位币 {}, {} 个汇率",
        service.default_variant(),
        service.rates().base_currency(),
        service.rates().len()
    );

    let app = api::router(service, config.server.max_upload_bytes);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /health          - Health check");
    info!("  POST /api/report      - Process uploads, JSON table");
    info!("  POST /api/report/csv  - Process uploads, download processed_data.csv");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
