use crate::error::Result;
use crate::models::{CurrencyRates, ReportVariant};
use crate::sheet::{SheetOptions, DEFAULT_SKIP_ROWS};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

/// 报表配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub variant: ReportVariant,
    pub skip_rows: usize,
    pub base_currency: String,
    pub rates: HashMap<String, f64>, // 币种 -> 折算为本位币的系数
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_upload_bytes: 32 * 1024 * 1024,
            },
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), 0.38);
        rates.insert("AED".to_string(), 0.105);
        Self {
            variant: ReportVariant::AfterTax,
            skip_rows: DEFAULT_SKIP_ROWS,
            base_currency: "OMR".to_string(),
            rates,
        }
    }
}

impl ReportConfig {
    pub fn sheet_options(&self) -> SheetOptions {
        SheetOptions {
            skip_rows: self.skip_rows,
        }
    }

    pub fn currency_rates(&self) -> Result<CurrencyRates> {
        CurrencyRates::from_config(&self.base_currency, &self.rates)
    }
}

impl AppConfig {
    /// 加载配置: 默认值 < ./config.{toml,json,yaml} < APP__* 环境变量 < SERVER_HOST/SERVER_PORT
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host.clone())?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("server.max_upload_bytes", defaults.server.max_upload_bytes as i64)?
            .set_default("report.variant", defaults.report.variant.as_str())?
            .set_default("report.skip_rows", defaults.report.skip_rows as i64)?
            .set_default("report.base_currency", defaults.report.base_currency.clone())?;

        for (currency, rate) in &defaults.report.rates {
            // 环境变量键名为小写, 默认值同样用小写键, 避免同一币种出现两个键
            builder = builder.set_default(format!("report.rates.{}", currency.to_lowercase()), *rate)?;
        }

        builder = builder
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true));

        if let Ok(host) = std::env::var("SERVER_HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}
