use serde::{Deserialize, Serialize};

/// 销售登记表行 (Sales Register)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRecord {
    pub po_no: Option<String>,    // 采购订单号 PONo
    pub doc_no: Option<String>,   // 发票号 DocNo
    pub currency: Option<String>, // 币种 (仅 converted 报表)
}

impl RegisterRecord {
    pub fn new(po_no: &str, doc_no: &str) -> Self {
        Self {
            po_no: Some(po_no.to_string()),
            doc_no: Some(doc_no.to_string()),
            currency: None,
        }
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = Some(currency.to_string());
        self
    }
}
