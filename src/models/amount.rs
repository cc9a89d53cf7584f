use bigdecimal::BigDecimal;
use std::str::FromStr;

/// f64 -> BigDecimal, 经最短十进制表示转换 (0.38 保持为 0.38)
pub fn decimal_from_f64(value: f64) -> Option<BigDecimal> {
    if !value.is_finite() {
        return None;
    }
    BigDecimal::from_str(&value.to_string()).ok()
}

/// 文本金额解析: 去掉空白和千分位逗号
pub fn parse_decimal(text: &str) -> Option<BigDecimal> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    BigDecimal::from_str(&cleaned).ok()
}

/// 普通十进制表示，去掉小数部分末尾的 0
pub fn format_decimal(value: &BigDecimal) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
