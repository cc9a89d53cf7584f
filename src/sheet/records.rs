use crate::error::{ReportError, Result};
use crate::models::{decimal_from_f64, parse_decimal, ProfitabilityRecord, RegisterRecord, ReportVariant};
use crate::sheet::reader::{cell, Cell, RawSheet, SheetRow};
use bigdecimal::BigDecimal;

// 列名
pub const PO_NO: &str = "PONo";
pub const DOC_NO: &str = "DocNo";
pub const CURRENCY: &str = "Currency";
pub const INV_NO: &str = "InvNo";
pub const BILL_TO: &str = "BillTo";
pub const PURCHASE_AMOUNT: &str = "PurchaseAmount";

/// 登记表 -> RegisterRecord
///
/// converted 报表要求 Currency 列; after_tax 报表中该列可有可无。
pub fn register_records(sheet: &RawSheet, variant: ReportVariant) -> Result<Vec<RegisterRecord>> {
    let po_col = sheet.column_index(PO_NO)?;
    let doc_col = sheet.column_index(DOC_NO)?;
    let currency_col = if variant.converts_currency() {
        Some(sheet.column_index(CURRENCY)?)
    } else {
        sheet.find_column(CURRENCY)
    };

    Ok(sheet
        .rows
        .iter()
        .map(|row| RegisterRecord {
            po_no: cell(row, po_col).as_key(),
            doc_no: cell(row, doc_col).as_key(),
            currency: currency_col
                .and_then(|col| cell(row, col).as_key())
                .map(|c| c.to_uppercase()),
        })
        .collect())
}

/// 利润表 -> ProfitabilityRecord; 收入列由报表类型决定
pub fn profitability_records(
    sheet: &RawSheet,
    variant: ReportVariant,
) -> Result<Vec<ProfitabilityRecord>> {
    let inv_col = sheet.column_index(INV_NO)?;
    let bill_col = sheet.column_index(BILL_TO)?;
    let revenue_col = sheet.column_index(variant.revenue_column())?;
    let purchase_col = sheet.column_index(PURCHASE_AMOUNT)?;

    sheet
        .rows
        .iter()
        .map(|row| {
            Ok(ProfitabilityRecord {
                inv_no: cell(row, inv_col).as_key(),
                bill_to: cell(row, bill_col).as_key(),
                revenue: amount(sheet, row, revenue_col)?,
                purchase_amount: amount(sheet, row, purchase_col)?,
            })
        })
        .collect()
}

fn amount(sheet: &RawSheet, row: &SheetRow, col: usize) -> Result<Option<BigDecimal>> {
    let value = cell(row, col);
    let parsed = match value {
        Cell::Empty => return Ok(None),
        Cell::Int(v) => Some(BigDecimal::from(*v)),
        Cell::Float(v) => decimal_from_f64(*v),
        Cell::Text(s) => parse_decimal(s),
    };

    parsed.map(Some).ok_or_else(|| ReportError::InvalidAmount {
        sheet: sheet.name.clone(),
        row: row.line,
        column: sheet.headers[col].clone(),
        value: value.as_key().unwrap_or_default(),
    })
}
