//! Layered configuration: built-in defaults, an optional TOML file, then
//! `SNAPX__*` environment variables (e.g. `SNAPX__EXECUTOR__MAX_ATTEMPTS=5`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::market_data::adapters::coingecko::DEFAULT_BASE_URL;
use crate::market_data::executor::ExecutorConfig;

pub const ENV_PREFIX: &str = "SNAPX";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from(".") }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DexConfig {
    pub per_page: u32,
    /// Fixed BTC/USD rate used for the volume conversion.
    pub btc_price_usd: f64,
    pub chart: bool,
    pub chart_top: usize,
    pub chart_width: u16,
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            per_page: 100,
            btc_price_usd: 110_000.0,
            chart: true,
            chart_top: 15,
            chart_width: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoversConfig {
    pub vs_currency: String,
    pub per_page: u32,
    pub page: u32,
    pub top_n: usize,
    pub summary_rows: usize,
    pub timeframes: Vec<String>,
}

impl Default for MoversConfig {
    fn default() -> Self {
        Self {
            vs_currency: "usd".into(),
            per_page: 50,
            page: 1,
            top_n: 10,
            summary_rows: 3,
            timeframes: vec!["24h".into(), "7d".into()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub executor: ExecutorConfig,
    pub output: OutputConfig,
    pub dex: DexConfig,
    pub movers: MoversConfig,
}

// CoinGecko rejects larger pages.
const MAX_PER_PAGE: u32 = 250;

impl AppConfig {
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            debug!(path = %path.display(), "loading config file");
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("movers.timeframes"),
            )
            .build()?;

        let cfg: AppConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.executor.max_attempts == 0 {
            return invalid("executor.max_attempts must be at least 1");
        }
        if let Err(msg) = self.executor.backoff.check() {
            return invalid(msg);
        }
        if self.executor.timeout_ms == 0 {
            return invalid("executor.timeout_ms must be positive");
        }
        let page_range = 1..=MAX_PER_PAGE;
        if !page_range.contains(&self.dex.per_page) || !page_range.contains(&self.movers.per_page) {
            return invalid("per_page must be between 1 and 250");
        }
        if self.movers.page == 0 {
            return invalid("movers.page starts at 1");
        }
        if !self.dex.btc_price_usd.is_finite() || self.dex.btc_price_usd <= 0.0 {
            return invalid("dex.btc_price_usd must be a positive number");
        }
        if self.movers.top_n == 0 {
            return invalid("movers.top_n must be at least 1");
        }
        let timeframes = &self.movers.timeframes;
        if timeframes.is_empty() || timeframes.iter().any(|t| t.trim().is_empty()) {
            return invalid("movers.timeframes must list at least one timeframe");
        }
        if self.api.base_url.trim().is_empty() {
            return invalid("api.base_url is empty");
        }
        Ok(())
    }
}
