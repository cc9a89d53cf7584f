use thiserror::Error;

/// 报表处理错误
///
/// 任何一步失败都会中止整个批次，不做逐行隔离。
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// 跳过前导行后没有表头
    #[error("Sheet '{sheet}' has no header row")]
    EmptySheet { sheet: String },

    #[error("Sheet '{sheet}' is missing required column '{column}'")]
    MissingColumn { sheet: String, column: String },

    /// `row` 为表格中的物理行号 (从 1 开始)
    #[error("Sheet '{sheet}', row {row}, column '{column}': invalid amount '{value}'")]
    InvalidAmount {
        sheet: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Invalid conversion rate for {currency}: {value}")]
    InvalidRate { currency: String, value: String },

    #[error("Unknown report variant: {0}")]
    UnknownVariant(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ReportError {
    /// 是否为上传数据本身的问题 (HTTP 400)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ReportError::Workbook(_)
                | ReportError::Csv(_)
                | ReportError::EmptySheet { .. }
                | ReportError::MissingColumn { .. }
                | ReportError::InvalidAmount { .. }
                | ReportError::UnknownVariant(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
