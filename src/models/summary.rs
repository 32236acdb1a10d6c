use serde::{Deserialize, Serialize};

use super::indicators::NEUTRAL_RSI;
use super::market::QuoteSnapshot;
use super::symbol::Symbol;

/// Why fields of a [`SummaryRecord`] may be degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Ok,
    /// Quote succeeded but history was missing, empty or too short.
    PartialFailure,
    /// Quote failed; every numeric field is unavailable.
    Unavailable,
}

/// One screener row per requested symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub symbol: Symbol,
    pub price: Option<f64>,
    pub change_percent: Option<f64>,
    pub valuation_ratio: Option<f64>,
    pub volume_millions: Option<f64>,
    pub market_cap_billions: Option<f64>,
    pub rsi: f64,
    pub fetch_status: FetchStatus,
}

impl SummaryRecord {
    pub fn from_quote(symbol: Symbol, quote: &QuoteSnapshot, rsi: f64, status: FetchStatus) -> Self {
        Self {
            symbol,
            price: quote.price(),
            change_percent: quote.change_percent(),
            valuation_ratio: quote.valuation_ratio(),
            volume_millions: quote.volume_millions(),
            market_cap_billions: quote.market_cap_billions(),
            rsi: round2(rsi),
            fetch_status: status,
        }
    }

    /// Row for a symbol whose quote could not be fetched at all.
    pub fn unavailable(symbol: Symbol) -> Self {
        Self {
            symbol,
            price: None,
            change_percent: None,
            valuation_ratio: None,
            volume_millions: None,
            market_cap_billions: None,
            rsi: NEUTRAL_RSI,
            fetch_status: FetchStatus::Unavailable,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
