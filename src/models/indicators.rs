use serde::{Deserialize, Serialize};

/// Neutral RSI used whenever the indicator cannot be computed.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Output of an indicator over a price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorResult {
    Value { value: f64 },
    InsufficientData { required: usize, available: usize },
}

impl IndicatorResult {
    pub fn value(value: f64) -> Self {
        IndicatorResult::Value { value }
    }

    pub fn as_value(&self) -> Option<f64> {
        match self {
            IndicatorResult::Value { value } => Some(*value),
            IndicatorResult::InsufficientData { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, IndicatorResult::InsufficientData { .. })
    }

    /// The computed value, or [`NEUTRAL_RSI`] when there was not enough data.
    pub fn value_or_neutral(&self) -> f64 {
        self.as_value().unwrap_or(NEUTRAL_RSI)
    }
}
