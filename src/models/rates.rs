use crate::error::{ReportError, Result};
use crate::models::amount::decimal_from_f64;
use bigdecimal::{BigDecimal, One};
use std::collections::{BTreeMap, HashMap};

/// 汇率表 - 币种 -> 折算系数 (乘法)
///
/// 本位币和未配置的币种系数均为 1。币种代码统一转为大写匹配。
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRates {
    base_currency: String,
    rates: BTreeMap<String, BigDecimal>,
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl CurrencyRates {
    pub fn new(base_currency: &str) -> Self {
        Self {
            base_currency: normalize_code(base_currency),
            rates: BTreeMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: &str, rate: BigDecimal) -> Self {
        self.rates.insert(normalize_code(currency), rate);
        self
    }

    /// 从配置构建 (配置中的系数为浮点数)
    pub fn from_config(base_currency: &str, rates: &HashMap<String, f64>) -> Result<Self> {
        let mut table = Self::new(base_currency);
        for (currency, value) in rates {
            let rate = decimal_from_f64(*value).ok_or_else(|| ReportError::InvalidRate {
                currency: currency.clone(),
                value: value.to_string(),
            })?;
            table = table.with_rate(currency, rate);
        }
        Ok(table)
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// 查询折算系数，本位币/未知币种返回 1
    pub fn rate_for(&self, currency: &str) -> BigDecimal {
        let code = normalize_code(currency);
        if code == self.base_currency {
            return BigDecimal::one();
        }
        self.rates.get(&code).cloned().unwrap_or_else(BigDecimal::one)
    }

    pub fn is_configured(&self, currency: &str) -> bool {
        self.rates.contains_key(&normalize_code(currency))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for CurrencyRates {
    /// 本位币 OMR; USD、AED 折算为 OMR
    fn default() -> Self {
        Self::new("OMR")
            .with_rate("USD", BigDecimal::new(38.into(), 2))
            .with_rate("AED", BigDecimal::new(105.into(), 3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_base_and_unknown_currency_use_one() {
        let rates = CurrencyRates::default();
        assert_eq!(rates.rate_for("OMR"), BigDecimal::one());
        assert_eq!(rates.rate_for("EUR"), BigDecimal::one());
        assert_eq!(rates.rate_for(""), BigDecimal::one());
    }

    #[test]
    fn test_default_rates_are_exact() {
        let rates = CurrencyRates::default();
        assert_eq!(rates.rate_for("USD"), BigDecimal::from_str("0.38").unwrap());
        assert_eq!(rates.rate_for("AED"), BigDecimal::from_str("0.105").unwrap());
        assert_eq!(rates.len(), 2);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let rates = CurrencyRates::default();
        assert_eq!(rates.rate_for(" usd "), BigDecimal::from_str("0.38").unwrap());
        assert!(rates.is_configured("aed"));
        assert!(!rates.is_configured("OMR"));
    }

    #[test]
    fn test_from_config() {
        let mut raw = HashMap::new();
        raw.insert("usd".to_string(), 0.385);
        let rates = CurrencyRates::from_config("omr", &raw).unwrap();
        assert_eq!(rates.base_currency(), "OMR");
        assert_eq!(rates.len(), 1);
        assert_eq!(rates.rate_for("USD"), BigDecimal::from_str("0.385").unwrap());
    }

    #[test]
    fn test_from_config_rejects_nan() {
        let mut raw = HashMap::new();
        raw.insert("USD".to_string(), f64::NAN);
        let err = CurrencyRates::from_config("OMR", &raw).unwrap_err();
        assert!(matches!(err, ReportError::InvalidRate { .. }));
    }
}
