use crate::error::Result;
use crate::models::{ProfitRow, ReportVariant};
use std::io::Write;
use std::path::Path;

/// 下载文件名
pub const EXPORT_FILE_NAME: &str = "processed_data.csv";
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";

/// 写出 CSV: 表头 + 每个 PO 一行, 无行索引
pub fn write_csv<W: Write>(rows: &[ProfitRow], variant: ReportVariant, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(variant.columns())?;
    for row in rows {
        writer.write_record(row.cells(variant))?;
    }

    writer.flush()?;
    Ok(())
}

pub fn to_csv_string(rows: &[ProfitRow], variant: ReportVariant) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(rows, variant, &mut buffer)?;
    // csv 写出的都是 UTF-8 字符串
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// 导出到文件
pub fn export_to_csv(rows: &[ProfitRow], variant: ReportVariant, output_path: &Path) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    write_csv(rows, variant, file)?;
    tracing::info!("已导出 {} 行到 {}", rows.len(), output_path.display());
    Ok(())
}
