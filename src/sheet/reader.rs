use crate::error::{ReportError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// 默认跳过的前导元数据行数
pub const DEFAULT_SKIP_ROWS: usize = 3;

/// 读取选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetOptions {
    pub skip_rows: usize,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            skip_rows: DEFAULT_SKIP_ROWS,
        }
    }
}

/// 单元格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::Int(v) => Cell::Int(*v),
            Data::Float(v) => Cell::Float(*v),
            Data::String(s) => Cell::from_text(s),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::Empty | Data::Error(_) => Cell::Empty,
            other => Cell::from_text(&other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// 标识符文本: 整数值的浮点数不带小数点 (12345.0 -> "12345")
    pub fn as_key(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Int(v) => Some(v.to_string()),
            Cell::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => Some((*v as i64).to_string()),
            Cell::Float(v) => Some(v.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

/// 数据行及其物理行号 (从 1 开始)
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub line: usize,
    pub cells: Vec<Cell>,
}

/// 跳过前导行后的表格: 表头 + 数据行
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl RawSheet {
    /// 按表头精确查找列
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.find_column(column).ok_or_else(|| ReportError::MissingColumn {
            sheet: self.name.clone(),
            column: column.to_string(),
        })
    }

    pub fn find_column(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }
}

pub fn cell(row: &SheetRow, index: usize) -> &Cell {
    row.cells.get(index).unwrap_or(&Cell::Empty)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetFormat {
    Workbook,
    Csv,
}

fn detect_format(bytes: &[u8]) -> SheetFormat {
    const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
    const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

    if bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&OLE_MAGIC) {
        SheetFormat::Workbook
    } else {
        SheetFormat::Csv
    }
}

/// 解析上传内容 (xlsx/xls 或 CSV)，跳过前导行后第一行为表头
pub fn read_sheet(name: &str, bytes: &[u8], options: &SheetOptions) -> Result<RawSheet> {
    let format = detect_format(bytes);
    tracing::debug!("读取 {}: {} bytes, 格式 {:?}", name, bytes.len(), format);

    let lines = match format {
        SheetFormat::Workbook => workbook_lines(bytes)?,
        SheetFormat::Csv => csv_lines(bytes)?,
    };

    // 全空行 (含前导行之后的空白分隔行) 不参与表头和数据
    let mut lines = lines
        .into_iter()
        .filter(|row| row.line > options.skip_rows)
        .filter(|row| !row.cells.iter().all(Cell::is_empty));

    let header = lines.next().ok_or_else(|| ReportError::EmptySheet {
        sheet: name.to_string(),
    })?;

    let headers: Vec<String> = header
        .cells
        .iter()
        .map(|c| c.as_key().unwrap_or_default())
        .collect();

    let rows: Vec<SheetRow> = lines.collect();

    tracing::info!("{}: 表头 {} 列, 数据 {} 行", name, headers.len(), rows.len());

    Ok(RawSheet {
        name: name.to_string(),
        headers,
        rows,
    })
}

/// 读取第一个工作表。行号从表顶部计算，即使已用区域不从第一行开始。
fn workbook_lines(bytes: &[u8]) -> Result<Vec<SheetRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };

    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let first_col = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    Ok(range
        .rows()
        .enumerate()
        .map(|(idx, row)| {
            let mut cells = vec![Cell::Empty; first_col];
            cells.extend(row.iter().map(Cell::from_data));
            SheetRow {
                line: first_row + idx + 1,
                cells,
            }
        })
        .collect())
}

fn csv_lines(bytes: &[u8]) -> Result<Vec<SheetRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut lines = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 1);
        lines.push(SheetRow {
            line,
            cells: record.iter().map(Cell::from_text).collect(),
        });
    }
    Ok(lines)
}
