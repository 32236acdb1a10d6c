//! Test utilities for API server integration tests

use std::sync::Arc;

use axum_test::TestServer;
use chrono::{Duration, Utc};
use mooviz::config::Config;
use mooviz::core::http::{create_router, AppState};
use mooviz::metrics::Metrics;
use mooviz::models::{PriceBar, PriceSeries, QuoteSnapshot, Symbol, SymbolSet};
use mooviz::services::StaticMarketDataProvider;

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
    pub provider: Arc<StaticMarketDataProvider>,
}

pub fn symbol(s: &str) -> Symbol {
    Symbol::parse(s).expect("valid symbol")
}

pub fn quote(price: f64, change: f64, pe: Option<f64>, volume: f64, cap: f64) -> QuoteSnapshot {
    QuoteSnapshot {
        last_price: Some(price),
        change_percent: Some(change),
        forward_pe: pe,
        volume: Some(volume),
        market_cap: Some(cap),
        ..Default::default()
    }
}

/// Daily closes moving by `step` per bar.
pub fn trending_history(s: &str, count: usize, step: f64) -> PriceSeries {
    let start = Utc::now() - Duration::days(count as i64);
    let bars = (0..count)
        .map(|i| {
            let close = 200.0 + step * i as f64;
            PriceBar::new(close, close + 1.0, close - 1.0, close, 1.0e6, start + Duration::days(i as i64))
        })
        .collect();
    PriceSeries::new(symbol(s), bars)
}

/// Three tickers:
/// - `KO` passes every rule (P/E 22, 15M volume, falling closes)
/// - `AAPL` fails on valuation (P/E 28)
/// - `NVDA` has no quote at all
pub fn seeded_provider() -> StaticMarketDataProvider {
    StaticMarketDataProvider::new()
        .with_quote(symbol("KO"), quote(60.0, 0.5, Some(22.0), 15_000_000.0, 260_000_000_000.0))
        .with_history(trending_history("KO", 40, -1.0))
        .with_quote(
            symbol("AAPL"),
            quote(190.0, 1.25, Some(28.0), 50_000_000.0, 2_900_000_000_000.0),
        )
        .with_history(trending_history("AAPL", 40, 1.0))
}

impl TestApiServer {
    pub async fn new() -> Self {
        Self::with_provider(seeded_provider()).await
    }

    pub async fn with_provider(provider: StaticMarketDataProvider) -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let provider = Arc::new(provider);
        let config = Config {
            symbols: SymbolSet::from_csv("AAPL,KO,NVDA"),
            ..Config::default()
        };

        let state = AppState::from_config(&config, provider.clone(), metrics.clone())
            .expect("state from config");
        let app = create_router(state);
        let server = TestServer::new(app).expect("start test server");

        Self {
            server,
            metrics,
            provider,
        }
    }
}
