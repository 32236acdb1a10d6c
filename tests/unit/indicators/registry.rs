//! Unit tests for the indicator registry

use chrono::{Duration, Utc};
use mooviz::indicators::{Indicator, IndicatorCategory, IndicatorError, IndicatorRegistry, Rsi};
use mooviz::models::{PriceBar, PriceSeries, Symbol};

fn rising_series(count: usize) -> PriceSeries {
    let start = Utc::now() - Duration::days(count as i64);
    let bars = (0..count)
        .map(|i| {
            let price = 100.0 + i as f64;
            PriceBar::new(price, price, price, price, 1000.0, start + Duration::days(i as i64))
        })
        .collect();
    PriceSeries::new(Symbol::parse("AAPL").unwrap(), bars)
}

#[test]
fn test_default_registry_contains_rsi() {
    let registry = IndicatorRegistry::default();
    assert_eq!(registry.names(), vec!["rsi"]);
    let rsi = registry.get("rsi").unwrap();
    assert_eq!(rsi.category(), IndicatorCategory::Momentum);
    assert_eq!(rsi.min_bars(), 15);
}

#[test]
fn test_rsi_rejects_zero_period() {
    assert_eq!(
        Rsi::new(0),
        Err(IndicatorError::InvalidPeriod {
            indicator: "rsi",
            period: 0
        })
    );
    assert!(IndicatorRegistry::with_rsi_period(0).is_err());
}

#[test]
fn test_compute_all_uses_configured_period() {
    let registry = IndicatorRegistry::with_rsi_period(5).unwrap();
    let results = registry.compute_all(&rising_series(6));
    assert_eq!(results["rsi"].as_value(), Some(100.0));

    let results = registry.compute_all(&rising_series(5));
    assert!(results["rsi"].is_insufficient());
}

#[test]
fn test_by_category() {
    let registry = IndicatorRegistry::default();
    assert_eq!(registry.by_category(IndicatorCategory::Momentum).len(), 1);
    assert!(registry.by_category(IndicatorCategory::Trend).is_empty());
}

#[test]
fn test_maximal_period_does_not_overflow() {
    let rsi = Rsi::new(usize::MAX).unwrap();
    assert_eq!(rsi.min_bars(), usize::MAX);
    assert!(rsi.compute(&rising_series(30)).is_insufficient());
}
