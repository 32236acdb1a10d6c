//! Indicator registry and trait system

use std::collections::BTreeMap;

use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::rsi::{calculate_rsi, DEFAULT_RSI_PERIOD};
use crate::models::indicators::IndicatorResult;
use crate::models::market::PriceSeries;

/// Indicator category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorCategory {
    Momentum,
    Trend,
    Volatility,
    Volume,
}

/// Trait for all indicators
pub trait Indicator: Send + Sync {
    /// Get the category this indicator belongs to
    fn category(&self) -> IndicatorCategory;

    /// Get the name of the indicator
    fn name(&self) -> &'static str;

    /// Minimum number of bars needed for a value
    fn min_bars(&self) -> usize;

    fn compute(&self, series: &PriceSeries) -> IndicatorResult;
}

/// RSI over a configurable window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidPeriod {
                indicator: "rsi",
                period,
            });
        }
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            period: DEFAULT_RSI_PERIOD,
        }
    }
}

impl Indicator for Rsi {
    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn name(&self) -> &'static str {
        "rsi"
    }

    fn min_bars(&self) -> usize {
        self.period.saturating_add(1)
    }

    fn compute(&self, series: &PriceSeries) -> IndicatorResult {
        calculate_rsi(series, self.period)
    }
}

/// Indicators available to the snapshot builder, keyed by name
pub struct IndicatorRegistry {
    indicators: BTreeMap<&'static str, Box<dyn Indicator>>,
}

impl IndicatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            indicators: BTreeMap::new(),
        }
    }

    /// Registry holding RSI with the given period
    pub fn with_rsi_period(period: usize) -> Result<Self, IndicatorError> {
        let mut registry = Self::new();
        registry.register(Box::new(Rsi::new(period)?));
        Ok(registry)
    }

    /// Add an indicator, replacing any with the same name
    pub fn register(&mut self, indicator: Box<dyn Indicator>) {
        self.indicators.insert(indicator.name(), indicator);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Indicator> {
        self.indicators.get(name).map(|i| i.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.indicators.keys().copied().collect()
    }

    /// Run every registered indicator over the series
    pub fn compute_all(&self, series: &PriceSeries) -> BTreeMap<&'static str, IndicatorResult> {
        self.indicators
            .iter()
            .map(|(name, indicator)| (*name, indicator.compute(series)))
            .collect()
    }

    /// Get all indicators in a category
    pub fn by_category(&self, category: IndicatorCategory) -> Vec<&dyn Indicator> {
        self.indicators
            .values()
            .filter(|i| i.category() == category)
            .map(|i| i.as_ref())
            .collect()
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(Rsi::default()));
        registry
    }
}
