//! Environment-driven configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::models::market::{Granularity, HistoryWindow};
use crate::models::symbol::SymbolSet;
use crate::screener::FilterCriteria;
use crate::services::yahoo::DEFAULT_BASE_URL;

/// Tickers shown when `SYMBOLS` is not set.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "NVDA", "TSLA", "AMZN", "GOOGL", "META", "BRK-B", "LLY", "JPM", "AMD", "NFLX",
    "ADBE", "CRM", "INTC", "PYPL", "DIS", "KO", "PFE", "XOM", "SOXL", "TQQQ", "SPY", "QQQ", "VOO",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Everything the pipeline needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub symbols: SymbolSet,
    pub cache_ttl: Duration,
    pub rsi_period: usize,
    pub criteria: FilterCriteria,
    pub history: HistoryWindow,
    pub request_timeout: Duration,
    pub market_data_base_url: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            symbols: SymbolSet::from_raw(DEFAULT_SYMBOLS),
            cache_ttl: Duration::from_secs(300),
            rsi_period: 14,
            criteria: FilterCriteria::default(),
            history: HistoryWindow::default(),
            request_timeout: Duration::from_secs(10),
            market_data_base_url: DEFAULT_BASE_URL.to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let symbols = match lookup("SYMBOLS") {
            Some(raw) => SymbolSet::from_csv(&raw),
            None => defaults.symbols,
        };

        let cache_ttl_secs: u64 = parse_or(&lookup, "CACHE_TTL_SECONDS", defaults.cache_ttl.as_secs())?;
        let timeout_secs: u64 = parse_or(
            &lookup,
            "REQUEST_TIMEOUT_SECONDS",
            defaults.request_timeout.as_secs(),
        )?;
        let lookback_days: u32 = parse_or(
            &lookup,
            "HISTORY_LOOKBACK_DAYS",
            defaults.history.lookback_days,
        )?;

        let rsi_period: usize = parse_or(&lookup, "RSI_PERIOD", defaults.rsi_period)?;
        if rsi_period == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RSI_PERIOD",
                value: "0".to_string(),
            });
        }

        let criteria = FilterCriteria {
            max_valuation_ratio: parse_or(
                &lookup,
                "MAX_VALUATION_RATIO",
                defaults.criteria.max_valuation_ratio,
            )?,
            min_volume_millions: parse_or(
                &lookup,
                "MIN_VOLUME_MILLIONS",
                defaults.criteria.min_volume_millions,
            )?,
            max_rsi: parse_or(&lookup, "MAX_RSI", defaults.criteria.max_rsi)?,
        };
        if let Err(e) = criteria.validate() {
            return Err(ConfigError::InvalidValue {
                key: threshold_key(e.name),
                value: e.value.to_string(),
            });
        }

        Ok(Self {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            symbols,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            rsi_period,
            criteria,
            history: HistoryWindow::new(lookback_days, Granularity::Daily),
            request_timeout: Duration::from_secs(timeout_secs),
            market_data_base_url: lookup("MARKET_DATA_BASE_URL")
                .unwrap_or(defaults.market_data_base_url),
            port: parse_or(&lookup, "PORT", defaults.port)?,
        })
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn threshold_key(name: &str) -> &'static str {
    match name {
        "max_valuation_ratio" => "MAX_VALUATION_RATIO",
        "min_volume_millions" => "MIN_VOLUME_MILLIONS",
        _ => "MAX_RSI",
    }
}
