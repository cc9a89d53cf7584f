use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// 销售利润表行 (Sales Profitability)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityRecord {
    pub inv_no: Option<String>,
    pub bill_to: Option<String>,
    pub revenue: Option<BigDecimal>,         // Amount 或 AmountAfterTax
    pub purchase_amount: Option<BigDecimal>, // 成本
}

impl ProfitabilityRecord {
    pub fn new(inv_no: &str, bill_to: &str, revenue: BigDecimal, purchase_amount: BigDecimal) -> Self {
        Self {
            inv_no: Some(inv_no.to_string()),
            bill_to: Some(bill_to.to_string()),
            revenue: Some(revenue),
            purchase_amount: Some(purchase_amount),
        }
    }
}

/// 发票汇总 - 按 (InvNo, BillTo) 分组求和; 两个键都非空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceGroup {
    pub inv_no: String,
    pub bill_to: String,
    pub revenue: BigDecimal,
    pub purchase_amount: BigDecimal,
    pub record_count: usize,
}

impl InvoiceGroup {
    pub fn new(inv_no: String, bill_to: String) -> Self {
        Self {
            inv_no,
            bill_to,
            revenue: BigDecimal::zero(),
            purchase_amount: BigDecimal::zero(),
            record_count: 0,
        }
    }

    /// 累加一行; 空金额不计入
    pub fn add_record(&mut self, record: &ProfitabilityRecord) {
        if let Some(revenue) = &record.revenue {
            self.revenue += revenue;
        }
        if let Some(purchase_amount) = &record.purchase_amount {
            self.purchase_amount += purchase_amount;
        }
        self.record_count += 1;
    }
}
