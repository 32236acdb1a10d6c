//! Per-symbol summary rows built from a quote and a price history.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::indicators::registry::{Indicator, Rsi};
use crate::metrics::Metrics;
use crate::models::indicators::{IndicatorResult, NEUTRAL_RSI};
use crate::models::market::{HistoryWindow, PriceSeries};
use crate::models::summary::{FetchStatus, SummaryRecord};
use crate::models::symbol::{Symbol, SymbolSet};
use crate::services::market_data::{MarketDataError, MarketDataProvider};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds one [`SummaryRecord`] per symbol and never fails: upstream errors
/// degrade the row instead.
pub struct SnapshotBuilder {
    provider: Arc<dyn MarketDataProvider + Send + Sync>,
    rsi: Rsi,
    history: HistoryWindow,
    request_timeout: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl SnapshotBuilder {
    pub fn new(provider: Arc<dyn MarketDataProvider + Send + Sync>) -> Self {
        Self {
            provider,
            rsi: Rsi::default(),
            history: HistoryWindow::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            metrics: None,
        }
    }

    pub fn with_rsi(mut self, rsi: Rsi) -> Self {
        self.rsi = rsi;
        self
    }

    pub fn with_history_window(mut self, window: HistoryWindow) -> Self {
        self.history = window;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn provider(&self) -> &Arc<dyn MarketDataProvider + Send + Sync> {
        &self.provider
    }

    /// Summary row for one symbol.
    pub async fn build(&self, symbol: &Symbol) -> SummaryRecord {
        let (quote, history) = tokio::join!(
            self.timed(self.provider.get_quote(symbol)),
            self.timed(self.provider.get_history(symbol, self.history)),
        );

        let quote = match quote {
            Ok(quote) => quote,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Quote fetch failed for {}", symbol);
                self.record_failure("quote");
                if let Err(e) = &history {
                    debug!(symbol = %symbol, error = %e, "History fetch also failed for {}", symbol);
                    self.record_failure("history");
                }
                return SummaryRecord::unavailable(symbol.clone());
            }
        };

        let (rsi, status) = match history {
            Ok(series) if series.is_empty() => {
                warn!(symbol = %symbol, "Empty price history for {}, using neutral RSI", symbol);
                (NEUTRAL_RSI, FetchStatus::PartialFailure)
            }
            Ok(series) => match self.rsi.compute(&series) {
                IndicatorResult::Value { value } => (value, FetchStatus::Ok),
                IndicatorResult::InsufficientData {
                    required,
                    available,
                } => {
                    warn!(
                        symbol = %symbol,
                        required = required,
                        available = available,
                        "Not enough closes for RSI on {} ({} < {}), using neutral RSI",
                        symbol,
                        available,
                        required
                    );
                    (NEUTRAL_RSI, FetchStatus::PartialFailure)
                }
            },
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "History fetch failed for {}, using neutral RSI", symbol);
                self.record_failure("history");
                (NEUTRAL_RSI, FetchStatus::PartialFailure)
            }
        };

        SummaryRecord::from_quote(symbol.clone(), &quote, rsi, status)
    }

    /// Rows for every symbol, fetched concurrently, in input order.
    pub async fn build_all(&self, symbols: &SymbolSet) -> Vec<SummaryRecord> {
        join_all(symbols.iter().map(|symbol| self.build(symbol))).await
    }

    /// Price history under the same timeout, for chart rendering.
    pub async fn fetch_history(&self, symbol: &Symbol) -> Result<PriceSeries, MarketDataError> {
        self.timed(self.provider.get_history(symbol, self.history))
            .await
            .inspect_err(|_| self.record_failure("history"))
    }

    async fn timed<T, F>(&self, call: F) -> Result<T, MarketDataError>
    where
        F: Future<Output = Result<T, MarketDataError>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout(self.request_timeout)),
        }
    }

    fn record_failure(&self, call: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.upstream_failures_total.with_label_values(&[call]).inc();
        }
    }
}
