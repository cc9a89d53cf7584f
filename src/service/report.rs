use crate::config::ReportConfig;
use crate::error::Result;
use crate::models::{CurrencyRates, Report, ReportStats, ReportVariant};
use crate::service::aggregator::{
    aggregate_profitability, build_invoice_lists, cross_aggregate,
};
use crate::sheet::{profitability_records, read_sheet, register_records, SheetOptions};
use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;

pub const REGISTER_SHEET: &str = "Sales Register";
pub const PROFITABILITY_SHEET: &str = "Sales Profitability";

/// 报表服务: 读取两张表 -> 分组 -> 交叉汇总 -> 利润
///
/// 只持有不可变配置, 每次调用互不影响。
pub struct ReportService {
    default_variant: ReportVariant,
    sheet_options: SheetOptions,
    rates: CurrencyRates,
}

impl ReportService {
    pub fn new(default_variant: ReportVariant, sheet_options: SheetOptions, rates: CurrencyRates) -> Self {
        Self {
            default_variant,
            sheet_options,
            rates,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        Ok(Self::new(
            config.variant,
            config.sheet_options(),
            config.currency_rates()?,
        ))
    }

    pub fn default_variant(&self) -> ReportVariant {
        self.default_variant
    }

    pub fn rates(&self) -> &CurrencyRates {
        &self.rates
    }

    /// 处理两份上传文件; `variant` 为 None 时使用默认报表类型
    pub fn process(
        &self,
        register_bytes: &[u8],
        profitability_bytes: &[u8],
        variant: Option<ReportVariant>,
    ) -> Result<Report> {
        let variant = variant.unwrap_or(self.default_variant);
        tracing::info!("[Report] 开始处理, 报表类型 {}", variant);

        let register_sheet = read_sheet(REGISTER_SHEET, register_bytes, &self.sheet_options)?;
        let profitability_sheet =
            read_sheet(PROFITABILITY_SHEET, profitability_bytes, &self.sheet_options)?;

        let register = register_records(&register_sheet, variant)?;
        let profitability = profitability_records(&profitability_sheet, variant)?;

        // Phase 1: 利润表分组
        let groups = aggregate_profitability(&profitability);

        // Phase 2: PO -> 发票号列表
        let orders = build_invoice_lists(&register);

        // Phase 3: 交叉汇总 + 利润
        let rates = variant.converts_currency().then_some(&self.rates);
        let aggregation = cross_aggregate(&orders, &groups, rates);

        let mut total_profit = BigDecimal::zero();
        for row in &aggregation.rows {
            total_profit += &row.profit;
        }

        let stats = ReportStats {
            register_rows: register.len(),
            profitability_rows: profitability.len(),
            invoice_groups: groups.len(),
            purchase_orders: aggregation.rows.len(),
            unmatched_invoices: aggregation.unmatched_invoices,
            total_profit,
        };

        tracing::info!(
            "[Report] 处理完成 - PO: {}, 发票组: {}, 未匹配发票: {}",
            stats.purchase_orders, stats.invoice_groups, stats.unmatched_invoices
        );

        Ok(Report {
            variant,
            rows: aggregation.rows,
            stats,
            generated_at: Utc::now(),
        })
    }
}

impl Default for ReportService {
    fn default() -> Self {
        Self::new(ReportVariant::default(), SheetOptions::default(), CurrencyRates::default())
    }
}
