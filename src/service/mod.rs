pub mod aggregator;
pub mod report;

pub use aggregator::{
    aggregate_profitability, build_invoice_lists, calculate_profit, cross_aggregate,
    CrossAggregation,
};
pub use report::{ReportService, PROFITABILITY_SHEET, REGISTER_SHEET};
