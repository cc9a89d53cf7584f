pub mod amount;
pub mod profitability;
pub mod rates;
pub mod register;
pub mod report;

pub use amount::{decimal_from_f64, format_decimal, parse_decimal};
pub use profitability::{InvoiceGroup, ProfitabilityRecord};
pub use rates::CurrencyRates;
pub use register::RegisterRecord;
pub use report::{ProfitRow, PurchaseOrderInvoices, Report, ReportStats, ReportVariant};
