//! Market data provider interface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use thiserror::Error;

use crate::models::market::{HistoryWindow, PriceSeries, QuoteSnapshot};
use crate::models::symbol::Symbol;

/// Failures talking to the upstream quote/history source.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned an error: {0}")]
    Api(String),

    #[error("no data for symbol {0}")]
    NotFound(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("invalid provider url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl MarketDataError {
    /// Worth retrying: network faults and server-side errors.
    pub fn is_transient(&self) -> bool {
        match self {
            MarketDataError::Request(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map(|s| s.is_server_error()).unwrap_or(false)
            }
            MarketDataError::Timeout(_) => true,
            MarketDataError::Api(_)
            | MarketDataError::NotFound(_)
            | MarketDataError::Decode(_)
            | MarketDataError::InvalidUrl(_) => false,
        }
    }
}

#[async_trait::async_trait]
pub trait MarketDataProvider {
    /// Latest quote snapshot for a symbol
    async fn get_quote(&self, symbol: &Symbol) -> Result<QuoteSnapshot, MarketDataError>;

    /// Historical bars for a symbol. An empty series is not an error.
    async fn get_history(
        &self,
        symbol: &Symbol,
        window: HistoryWindow,
    ) -> Result<PriceSeries, MarketDataError>;
}

/// In-memory provider with scripted responses.
///
/// Symbols without a scripted quote fail with [`MarketDataError::NotFound`];
/// symbols without scripted history get an empty series.
#[derive(Default)]
pub struct StaticMarketDataProvider {
    quotes: RwLock<HashMap<Symbol, QuoteSnapshot>>,
    histories: RwLock<HashMap<Symbol, PriceSeries>>,
    failing_history: RwLock<Vec<Symbol>>,
    delays: RwLock<HashMap<Symbol, Duration>>,
    quote_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl StaticMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(self, symbol: Symbol, quote: QuoteSnapshot) -> Self {
        self.set_quote(symbol, quote);
        self
    }

    pub fn with_history(self, series: PriceSeries) -> Self {
        self.set_history(series);
        self
    }

    /// Make history requests for `symbol` fail.
    pub fn with_failing_history(self, symbol: Symbol) -> Self {
        if let Ok(mut failing) = self.failing_history.write() {
            failing.push(symbol);
        }
        self
    }

    /// Delay every response for `symbol`.
    pub fn with_delay(self, symbol: Symbol, delay: Duration) -> Self {
        if let Ok(mut delays) = self.delays.write() {
            delays.insert(symbol, delay);
        }
        self
    }

    pub fn set_quote(&self, symbol: Symbol, quote: QuoteSnapshot) {
        if let Ok(mut quotes) = self.quotes.write() {
            quotes.insert(symbol, quote);
        }
    }

    pub fn set_history(&self, series: PriceSeries) {
        if let Ok(mut histories) = self.histories.write() {
            histories.insert(series.symbol.clone(), series);
        }
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self, symbol: &Symbol) {
        let delay = self
            .delays
            .read()
            .ok()
            .and_then(|delays| delays.get(symbol).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for StaticMarketDataProvider {
    async fn get_quote(&self, symbol: &Symbol) -> Result<QuoteSnapshot, MarketDataError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency(symbol).await;
        let quotes = self
            .quotes
            .read()
            .map_err(|e| MarketDataError::Api(e.to_string()))?;
        quotes
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
    }

    async fn get_history(
        &self,
        symbol: &Symbol,
        _window: HistoryWindow,
    ) -> Result<PriceSeries, MarketDataError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency(symbol).await;
        let failing = self
            .failing_history
            .read()
            .map_err(|e| MarketDataError::Api(e.to_string()))?;
        if failing.contains(symbol) {
            return Err(MarketDataError::Api(format!("history unavailable for {}", symbol)));
        }
        drop(failing);

        let histories = self
            .histories
            .read()
            .map_err(|e| MarketDataError::Api(e.to_string()))?;
        Ok(histories
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| PriceSeries::empty(symbol.clone())))
    }
}
