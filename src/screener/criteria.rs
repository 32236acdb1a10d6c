use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A threshold that no comparison can honour.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("threshold {name} must be a finite number, got {value}")]
pub struct NonFiniteThreshold {
    pub name: &'static str,
    pub value: f64,
}

/// Inclusive filter thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub max_valuation_ratio: f64,
    pub min_volume_millions: f64,
    pub max_rsi: f64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            max_valuation_ratio: 25.0,
            min_volume_millions: 10.0,
            max_rsi: 40.0,
        }
    }
}

impl FilterCriteria {
    /// Every bound must be finite.
    pub fn validate(&self) -> Result<(), NonFiniteThreshold> {
        for (name, value) in [
            ("max_valuation_ratio", self.max_valuation_ratio),
            ("min_volume_millions", self.min_volume_millions),
            ("max_rsi", self.max_rsi),
        ] {
            if !value.is_finite() {
                return Err(NonFiniteThreshold { name, value });
            }
        }
        Ok(())
    }
}

/// First rule a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rejection {
    ValuationUnavailable,
    ValuationAboveMax { value: f64, max: f64 },
    VolumeUnavailable,
    VolumeBelowMin { value: f64, min: f64 },
    RsiAboveMax { value: f64, max: f64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ValuationUnavailable => write!(f, "valuation ratio unavailable"),
            Rejection::ValuationAboveMax { value, max } => {
                write!(f, "valuation ratio {:.2} above {:.2}", value, max)
            }
            Rejection::VolumeUnavailable => write!(f, "volume unavailable"),
            Rejection::VolumeBelowMin { value, min } => {
                write!(f, "volume {:.2}M below {:.2}M", value, min)
            }
            Rejection::RsiAboveMax { value, max } => write!(f, "RSI {:.2} above {:.2}", value, max),
        }
    }
}
