use crate::models::{
    CurrencyRates, InvoiceGroup, ProfitRow, ProfitabilityRecord, PurchaseOrderInvoices,
    RegisterRecord,
};
use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// 利润表按 (InvNo, BillTo) 分组求和
///
/// InvNo 或 BillTo 为空的行不参与分组。输出按键排序。
pub fn aggregate_profitability(records: &[ProfitabilityRecord]) -> Vec<InvoiceGroup> {
    let mut groups: BTreeMap<(String, String), InvoiceGroup> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let (Some(inv_no), Some(bill_to)) = (&record.inv_no, &record.bill_to) else {
            skipped += 1;
            continue;
        };

        groups
            .entry((inv_no.clone(), bill_to.clone()))
            .or_insert_with(|| InvoiceGroup::new(inv_no.clone(), bill_to.clone()))
            .add_record(record);
    }

    if skipped > 0 {
        tracing::debug!("利润表中 {} 行缺少 InvNo 或 BillTo, 已跳过", skipped);
    }
    tracing::info!(
        "利润表分组完成: {} 行 -> {} 个 (InvNo, BillTo) 组",
        records.len(),
        groups.len()
    );

    groups.into_values().collect()
}

/// 登记表按 PONo 分组，收集去重保序的发票号
///
/// 输出按 PONo 首次出现顺序。币种取该 PO 首个非空值。
pub fn build_invoice_lists(records: &[RegisterRecord]) -> Vec<PurchaseOrderInvoices> {
    let mut orders: IndexMap<String, PurchaseOrderInvoices> = IndexMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(po_no) = &record.po_no else {
            skipped += 1;
            continue;
        };

        let entry = orders
            .entry(po_no.clone())
            .or_insert_with(|| PurchaseOrderInvoices::new(po_no.clone()));

        if let Some(doc_no) = &record.doc_no {
            entry.invoice_nos.insert(doc_no.clone());
        }
        if entry.currency.is_none() {
            entry.currency = record.currency.clone();
        }
    }

    if skipped > 0 {
        tracing::debug!("登记表中 {} 行没有 PONo, 已跳过", skipped);
    }
    tracing::info!(
        "登记表分组完成: {} 行 -> {} 个 PO",
        records.len(),
        orders.len()
    );

    orders.into_values().collect()
}

/// 利润 = 收入合计 - 成本合计 (不舍入)
pub fn calculate_profit(revenue_sum: &BigDecimal, purchase_amount_sum: &BigDecimal) -> BigDecimal {
    revenue_sum - purchase_amount_sum
}

/// 交叉汇总结果
#[derive(Debug, Clone)]
pub struct CrossAggregation {
    pub rows: Vec<ProfitRow>,
    pub unmatched_invoices: usize,
}

/// 对每个 PO 的发票列表汇总利润表分组
///
/// - 发票号在任一分组中不存在时贡献 0 (计入 `unmatched_invoices`)
/// - 传入汇率表且 PO 有币种时, 收入与成本均乘以折算系数
/// - BillTo 取选中分组中 (InvNo, BillTo) 最小的一个; 没有选中分组则为 `None`
pub fn cross_aggregate(
    orders: &[PurchaseOrderInvoices],
    groups: &[InvoiceGroup],
    rates: Option<&CurrencyRates>,
) -> CrossAggregation {
    // 倒排索引: InvNo -> 分组 (保持分组的键顺序)
    let mut invoice_index: HashMap<&str, Vec<&InvoiceGroup>> = HashMap::new();
    for group in groups {
        invoice_index.entry(group.inv_no.as_str()).or_default().push(group);
    }

    let mut rows = Vec::with_capacity(orders.len());
    let mut unmatched_invoices = 0usize;

    for order in orders {
        let mut selected: Vec<&InvoiceGroup> = Vec::new();
        for inv_no in &order.invoice_nos {
            match invoice_index.get(inv_no.as_str()) {
                Some(matches) => selected.extend(matches.iter().copied()),
                None => unmatched_invoices += 1,
            }
        }

        let mut revenue_sum = BigDecimal::zero();
        let mut purchase_amount_sum = BigDecimal::zero();
        for group in &selected {
            revenue_sum += &group.revenue;
            purchase_amount_sum += &group.purchase_amount;
        }

        if let (Some(rates), Some(currency)) = (rates, order.currency.as_deref()) {
            let rate = rates.rate_for(currency);
            revenue_sum = &revenue_sum * &rate;
            purchase_amount_sum = &purchase_amount_sum * &rate;
        }

        let bill_to = resolve_bill_to(&order.po_no, &selected);
        let profit = calculate_profit(&revenue_sum, &purchase_amount_sum);

        rows.push(ProfitRow {
            po_no: order.po_no.clone(),
            invoice_nos: order.invoice_nos.iter().cloned().collect(),
            currency: order.currency.clone(),
            revenue_sum,
            purchase_amount_sum,
            bill_to,
            profit,
        });
    }

    if unmatched_invoices > 0 {
        tracing::warn!("{} 个发票号在利润表中没有匹配记录, 按 0 计", unmatched_invoices);
    }

    CrossAggregation {
        rows,
        unmatched_invoices,
    }
}

fn resolve_bill_to(po_no: &str, selected: &[&InvoiceGroup]) -> Option<String> {
    let chosen = selected
        .iter()
        .min_by(|a, b| (&a.inv_no, &a.bill_to).cmp(&(&b.inv_no, &b.bill_to)))
        .map(|g| g.bill_to.clone());

    if let Some(chosen) = &chosen {
        if selected.iter().any(|g| &g.bill_to != chosen) {
            tracing::debug!("PO {} 对应多个 BillTo, 取 {}", po_no, chosen);
        }
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn profitability(inv: &str, bill: &str, amount: &str, cost: &str) -> ProfitabilityRecord {
        ProfitabilityRecord::new(inv, bill, dec(amount), dec(cost))
    }

    #[test]
    fn test_aggregate_profitability_groups_by_invoice_and_bill_to() {
        let records = vec![
            profitability("B", "X", "50", "10"),
            profitability("A", "X", "100", "40"),
            profitability("A", "X", "20", "5"),
            profitability("A", "Y", "1", "1"),
        ];
        let groups = aggregate_profitability(&records);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].inv_no, "A");
        assert_eq!(groups[0].bill_to, "X");
        assert_eq!(groups[0].revenue, dec("120"));
        assert_eq!(groups[0].purchase_amount, dec("45"));
        assert_eq!(groups[0].record_count, 2);
        assert_eq!(groups[1].bill_to, "Y");
        assert_eq!(groups[2].inv_no, "B");
    }

    #[test]
    fn test_aggregate_profitability_drops_missing_keys() {
        let mut no_bill = profitability("C", "X", "7", "2");
        no_bill.bill_to = None;
        let mut no_inv = profitability("C", "X", "9", "3");
        no_inv.inv_no = None;
        let mut blank_amount = profitability("C", "X", "3", "1");
        blank_amount.revenue = None;

        let groups = aggregate_profitability(&[no_bill, no_inv, blank_amount]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].bill_to, "X");
        assert_eq!(groups[0].revenue, dec("0"));
        assert_eq!(groups[0].purchase_amount, dec("1"));
        assert_eq!(groups[0].record_count, 1);
    }

    #[test]
    fn test_missing_bill_to_contributes_nothing() {
        let register = vec![RegisterRecord::new("1", "A")];
        let mut no_bill = profitability("A", "", "50", "10");
        no_bill.bill_to = None;
        let profit = vec![profitability("A", "X", "100", "40"), no_bill];

        let orders = build_invoice_lists(&register);
        let groups = aggregate_profitability(&profit);
        let result = cross_aggregate(&orders, &groups, None);

        let row = &result.rows[0];
        assert_eq!(row.revenue_sum, dec("100"));
        assert_eq!(row.purchase_amount_sum, dec("40"));
        assert_eq!(row.profit, dec("60"));
        assert_eq!(row.bill_to.as_deref(), Some("X"));
    }

    #[test]
    fn test_aggregate_profitability_empty() {
        assert!(aggregate_profitability(&[]).is_empty());
    }

    #[test]
    fn test_build_invoice_lists_dedup_in_first_seen_order() {
        let records = vec![
            RegisterRecord::new("7", "B").with_currency("USD"),
            RegisterRecord::new("3", "Q"),
            RegisterRecord::new("7", "A").with_currency("AED"),
            RegisterRecord::new("7", "B"),
        ];
        let orders = build_invoice_lists(&records);

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].po_no, "7");
        assert_eq!(
            orders[0].invoice_nos.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["B", "A"]
        );
        assert_eq!(orders[0].currency.as_deref(), Some("USD"));
        assert_eq!(orders[1].po_no, "3");
        assert_eq!(orders[1].invoice_nos.len(), 1);
        assert_eq!(orders[1].currency, None);
    }

    #[test]
    fn test_build_invoice_lists_skips_rows_without_po() {
        let mut no_po = RegisterRecord::new("1", "A");
        no_po.po_no = None;
        let mut no_doc = RegisterRecord::new("2", "B");
        no_doc.doc_no = None;

        let orders = build_invoice_lists(&[no_po, no_doc]);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].po_no, "2");
        assert!(orders[0].invoice_nos.is_empty());
    }

    #[test]
    fn test_cross_aggregate_with_conversion() {
        let register = vec![
            RegisterRecord::new("1", "A").with_currency("USD"),
            RegisterRecord::new("1", "B").with_currency("USD"),
        ];
        let profit = vec![
            profitability("A", "X", "100", "40"),
            profitability("B", "X", "50", "10"),
        ];
        let orders = build_invoice_lists(&register);
        let groups = aggregate_profitability(&profit);
        let rates = CurrencyRates::default();

        let result = cross_aggregate(&orders, &groups, Some(&rates));
        let row = &result.rows[0];
        assert_eq!(row.po_no, "1");
        assert_eq!(row.invoice_nos, vec!["A", "B"]);
        assert_eq!(row.currency.as_deref(), Some("USD"));
        assert_eq!(row.revenue_sum, dec("57"));
        assert_eq!(row.purchase_amount_sum, dec("19"));
        assert_eq!(row.bill_to.as_deref(), Some("X"));
        assert_eq!(row.profit, dec("38"));
        assert_eq!(result.unmatched_invoices, 0);
    }

    #[test]
    fn test_cross_aggregate_without_rates_ignores_currency() {
        let register = vec![RegisterRecord::new("1", "A").with_currency("USD")];
        let orders = build_invoice_lists(&register);
        let groups = aggregate_profitability(&[profitability("A", "X", "100", "40")]);

        let result = cross_aggregate(&orders, &groups, None);
        assert_eq!(result.rows[0].revenue_sum, dec("100"));
        assert_eq!(result.rows[0].profit, dec("60"));
    }

    #[test]
    fn test_cross_aggregate_empty_match() {
        let register = vec![RegisterRecord::new("2", "Z").with_currency("OMR")];
        let orders = build_invoice_lists(&register);
        let groups = aggregate_profitability(&[profitability("A", "X", "100", "40")]);

        let result = cross_aggregate(&orders, &groups, Some(&CurrencyRates::default()));
        let row = &result.rows[0];
        assert_eq!(row.invoice_nos, vec!["Z"]);
        assert_eq!(row.revenue_sum, dec("0"));
        assert_eq!(row.purchase_amount_sum, dec("0"));
        assert_eq!(row.bill_to, None);
        assert_eq!(row.profit, dec("0"));
        assert_eq!(result.unmatched_invoices, 1);
    }

    #[test]
    fn test_cross_aggregate_unknown_currency_is_unchanged() {
        let register = vec![RegisterRecord::new("5", "A").with_currency("EUR")];
        let orders = build_invoice_lists(&register);
        let groups = aggregate_profitability(&[profitability("A", "X", "10.5", "0.5")]);

        let result = cross_aggregate(&orders, &groups, Some(&CurrencyRates::default()));
        assert_eq!(result.rows[0].revenue_sum, dec("10.5"));
        assert_eq!(result.rows[0].profit, dec("10"));
    }

    #[test]
    fn test_bill_to_tie_break_is_smallest_key() {
        let register = vec![RegisterRecord::new("9", "B"), RegisterRecord::new("9", "A")];
        let profit = vec![
            profitability("B", "Alpha", "1", "0"),
            profitability("A", "Zeta", "1", "0"),
            profitability("A", "Mid", "1", "0"),
            profitability("A", "Mid", "1", "0"),
        ];
        let orders = build_invoice_lists(&register);
        let groups = aggregate_profitability(&profit);

        let result = cross_aggregate(&orders, &groups, None);
        assert_eq!(result.rows[0].bill_to.as_deref(), Some("Mid"));
        assert_eq!(result.rows[0].revenue_sum, dec("4"));
    }

    #[test]
    fn test_calculate_profit_exact() {
        assert_eq!(calculate_profit(&dec("0.3"), &dec("0.1")), dec("0.2"));
        assert_eq!(calculate_profit(&dec("10"), &dec("12.25")), dec("-2.25"));
    }
}
