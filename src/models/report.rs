use crate::error::ReportError;
use crate::models::amount::format_decimal;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 报表类型
///
/// - `AfterTax`: 收入列 AmountAfterTax, 不折算币种
/// - `Converted`: 收入列 Amount, 按登记表币种折算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportVariant {
    #[default]
    AfterTax,
    Converted,
}

impl ReportVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportVariant::AfterTax => "after_tax",
            ReportVariant::Converted => "converted",
        }
    }

    /// 利润表中的收入列名
    pub fn revenue_column(self) -> &'static str {
        match self {
            ReportVariant::AfterTax => "AmountAfterTax",
            ReportVariant::Converted => "Amount",
        }
    }

    pub fn revenue_sum_column(self) -> &'static str {
        match self {
            ReportVariant::AfterTax => "AmountAfterTax_Sum",
            ReportVariant::Converted => "Amount_Sum",
        }
    }

    pub fn converts_currency(self) -> bool {
        matches!(self, ReportVariant::Converted)
    }

    /// 输出列
    pub fn columns(self) -> Vec<&'static str> {
        let mut columns = vec!["PONo", "InvoiceNos_List"];
        if self.converts_currency() {
            columns.push("Currency");
        }
        columns.extend([self.revenue_sum_column(), "PurchaseAmount_Sum", "BillTo", "Profit"]);
        columns
    }
}

impl fmt::Display for ReportVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportVariant {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "after_tax" | "aftertax" => Ok(ReportVariant::AfterTax),
            "converted" => Ok(ReportVariant::Converted),
            other => Err(ReportError::UnknownVariant(other.to_string())),
        }
    }
}

/// PO -> 发票号列表 (保序去重) 及首个币种
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOrderInvoices {
    pub po_no: String,
    pub invoice_nos: IndexSet<String>,
    pub currency: Option<String>,
}

impl PurchaseOrderInvoices {
    pub fn new(po_no: String) -> Self {
        Self {
            po_no,
            invoice_nos: IndexSet::new(),
            currency: None,
        }
    }
}

/// 输出行 - 每个 PO 一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitRow {
    pub po_no: String,
    pub invoice_nos: Vec<String>,
    pub currency: Option<String>,
    pub revenue_sum: BigDecimal,
    pub purchase_amount_sum: BigDecimal,
    pub bill_to: Option<String>,
    pub profit: BigDecimal,
}

impl ProfitRow {
    /// 发票号列表的显示形式 "A, B"
    pub fn invoice_list_display(&self) -> String {
        self.invoice_nos.join(", ")
    }

    /// 按列顺序输出显示单元格; 空值为 ""
    pub fn cells(&self, variant: ReportVariant) -> Vec<String> {
        let mut cells = vec![self.po_no.clone(), self.invoice_list_display()];
        if variant.converts_currency() {
            cells.push(self.currency.clone().unwrap_or_default());
        }
        cells.push(format_decimal(&self.revenue_sum));
        cells.push(format_decimal(&self.purchase_amount_sum));
        cells.push(self.bill_to.clone().unwrap_or_default());
        cells.push(format_decimal(&self.profit));
        cells
    }
}

/// 处理统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    pub register_rows: usize,
    pub profitability_rows: usize,
    pub invoice_groups: usize,
    pub purchase_orders: usize,
    pub unmatched_invoices: usize, // 登记表中有、利润表中无的发票号
    pub total_profit: BigDecimal,
}

/// 一次处理的完整结果
#[derive(Debug, Clone)]
pub struct Report {
    pub variant: ReportVariant,
    pub rows: Vec<ProfitRow>,
    pub stats: ReportStats,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn columns(&self) -> Vec<&'static str> {
        self.variant.columns()
    }

    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(|row| row.cells(self.variant)).collect()
    }
}
