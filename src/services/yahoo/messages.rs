//! Response payloads of the Yahoo Finance quote and chart endpoints.

use chrono::DateTime;
use serde::Deserialize;

use crate::models::market::{PriceBar, QuoteSnapshot};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEnvelope {
    pub quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
pub struct QuoteResponse {
    #[serde(default)]
    pub result: Vec<QuoteResult>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub symbol: String,
    pub regular_market_price: Option<f64>,
    pub regular_market_previous_close: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    pub regular_market_volume: Option<f64>,
    pub market_cap: Option<f64>,
}

impl From<QuoteResult> for QuoteSnapshot {
    fn from(quote: QuoteResult) -> Self {
        QuoteSnapshot {
            last_price: quote.regular_market_price,
            previous_close: quote.regular_market_previous_close,
            change_percent: quote.regular_market_change_percent,
            forward_pe: quote.forward_pe,
            trailing_pe: quote.trailing_pe,
            volume: quote.regular_market_volume,
            market_cap: quote.market_cap,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartResponse,
}

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

/// Column-oriented OHLCV arrays; any cell may be null.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub description: String,
}

impl ChartResult {
    /// Zip the columns into bars, skipping rows with no close.
    ///
    /// Missing open/high/low fall back to the close; missing volume is 0.
    pub fn into_bars(self) -> Vec<PriceBar> {
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        let cell = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let close = cell(&quote.close, i)?;
                let timestamp = DateTime::from_timestamp(ts, 0)?;
                Some(PriceBar::new(
                    cell(&quote.open, i).unwrap_or(close),
                    cell(&quote.high, i).unwrap_or(close),
                    cell(&quote.low, i).unwrap_or(close),
                    close,
                    cell(&quote.volume, i).unwrap_or(0.0),
                    timestamp,
                ))
            })
            .collect()
    }
}
