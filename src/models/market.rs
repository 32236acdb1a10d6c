//! Upstream market data shapes: OHLCV bars, price series and quote snapshots.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::symbol::Symbol;

/// One OHLCV observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Bars for one symbol in ascending time order.
///
/// Construction sorts by timestamp, keeps the last bar seen for a repeated
/// timestamp and drops bars without a finite close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, bars: Vec<PriceBar>) -> Self {
        let mut bars: Vec<PriceBar> = bars.into_iter().filter(|b| b.close.is_finite()).collect();
        // stable: equal timestamps keep arrival order, so the later bar wins below
        bars.sort_by_key(|b| b.timestamp);

        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol,
            bars: deduped,
        }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
        }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }
}

/// Point-in-time quote fields. Every field may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub last_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub change_percent: Option<f64>,
    pub forward_pe: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
}

impl QuoteSnapshot {
    /// Last traded price, else the previous close.
    pub fn price(&self) -> Option<f64> {
        finite(self.last_price).or_else(|| finite(self.previous_close))
    }

    /// Forward P/E, else trailing P/E. Never defaults to zero.
    pub fn valuation_ratio(&self) -> Option<f64> {
        finite(self.forward_pe).or_else(|| finite(self.trailing_pe))
    }

    pub fn volume_millions(&self) -> Option<f64> {
        finite(self.volume).map(|v| v / 1_000_000.0)
    }

    pub fn market_cap_billions(&self) -> Option<f64> {
        finite(self.market_cap).map(|v| v / 1_000_000_000.0)
    }

    pub fn change_percent(&self) -> Option<f64> {
        finite(self.change_percent)
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Bar size requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Hourly,
    Daily,
    Weekly,
}

impl Granularity {
    /// Interval token used by chart endpoints.
    pub fn as_interval(&self) -> &'static str {
        match self {
            Granularity::Hourly => "1h",
            Granularity::Daily => "1d",
            Granularity::Weekly => "1wk",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_interval())
    }
}

/// Lookback window and bar size for a history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub lookback_days: u32,
    pub granularity: Granularity,
}

impl HistoryWindow {
    pub fn new(lookback_days: u32, granularity: Granularity) -> Self {
        Self {
            lookback_days,
            granularity,
        }
    }

    pub fn lookback(&self) -> Duration {
        Duration::days(i64::from(self.lookback_days))
    }
}

impl Default for HistoryWindow {
    /// One year of daily bars.
    fn default() -> Self {
        Self::new(365, Granularity::Daily)
    }
}
