//! Yahoo Finance market data provider implementation

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::models::market::{HistoryWindow, PriceSeries, QuoteSnapshot};
use crate::models::symbol::Symbol;
use crate::services::market_data::{MarketDataError, MarketDataProvider};

use super::messages::{ChartEnvelope, QuoteEnvelope};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; mooviz/0.1)";

pub struct YahooMarketDataProvider {
    client: Client,
    base_url: Url,
    backoff: ExponentialBuilder,
}

impl YahooMarketDataProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: Client) -> Result<Self, MarketDataError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            backoff: ExponentialBuilder::default()
                .with_min_delay(Duration::from_millis(200))
                .with_max_times(2),
        })
    }

    /// Override the retry policy for transient failures.
    pub fn with_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.backoff = backoff;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, MarketDataError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MarketDataError::Api(format!("base url {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch_quote_once(&self, symbol: &Symbol) -> Result<QuoteSnapshot, MarketDataError> {
        let url = self.endpoint(&["v7", "finance", "quote"])?;
        let response = self
            .client
            .get(url)
            .query(&[("symbols", symbol.as_str())])
            .send()
            .await?;
        let response = check_status(response, symbol)?;

        let envelope: QuoteEnvelope = response
            .json()
            .await
            .map_err(|e| MarketDataError::Decode(e.to_string()))?;

        if let Some(err) = envelope.quote_response.error {
            return Err(MarketDataError::Api(format!("{}: {}", err.code, err.description)));
        }

        envelope
            .quote_response
            .result
            .into_iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol.as_str()))
            .map(QuoteSnapshot::from)
            .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
    }

    async fn fetch_history_once(
        &self,
        symbol: &Symbol,
        window: HistoryWindow,
    ) -> Result<PriceSeries, MarketDataError> {
        let url = self.endpoint(&["v8", "finance", "chart", symbol.as_str()])?;
        let period2 = Utc::now();
        let period1 = period2 - window.lookback();

        let response = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.timestamp().to_string()),
                ("period2", period2.timestamp().to_string()),
                ("interval", window.granularity.as_interval().to_string()),
            ])
            .send()
            .await?;
        let response = check_status(response, symbol)?;

        let envelope: ChartEnvelope = response
            .json()
            .await
            .map_err(|e| MarketDataError::Decode(e.to_string()))?;

        if let Some(err) = envelope.chart.error {
            return Err(MarketDataError::Api(format!("{}: {}", err.code, err.description)));
        }

        let bars = envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|result| result.into_bars())
            .unwrap_or_default();

        debug!(symbol = %symbol, count = bars.len(), "Fetched {} bars for {}", bars.len(), symbol);
        Ok(PriceSeries::new(symbol.clone(), bars))
    }
}

/// 404 means the ticker is unknown upstream; other error statuses pass
/// through as request errors so 5xx stays retryable.
fn check_status(response: Response, symbol: &Symbol) -> Result<Response, MarketDataError> {
    if response.status() == StatusCode::NOT_FOUND {
        return Err(MarketDataError::NotFound(symbol.to_string()));
    }
    Ok(response.error_for_status()?)
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooMarketDataProvider {
    async fn get_quote(&self, symbol: &Symbol) -> Result<QuoteSnapshot, MarketDataError> {
        (|| self.fetch_quote_once(symbol))
            .retry(self.backoff)
            .when(MarketDataError::is_transient)
            .notify(|e, delay| {
                warn!(symbol = %symbol, error = %e, "Quote request failed, retrying in {:?}", delay);
            })
            .await
    }

    async fn get_history(
        &self,
        symbol: &Symbol,
        window: HistoryWindow,
    ) -> Result<PriceSeries, MarketDataError> {
        (|| self.fetch_history_once(symbol, window))
            .retry(self.backoff)
            .when(MarketDataError::is_transient)
            .notify(|e, delay| {
                warn!(symbol = %symbol, error = %e, "History request failed, retrying in {:?}", delay);
            })
            .await
    }
}
