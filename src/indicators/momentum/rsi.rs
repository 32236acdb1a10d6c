//! RSI (Relative Strength Index) indicator

use crate::models::indicators::{IndicatorResult, NEUTRAL_RSI};
use crate::models::market::PriceSeries;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Calculate RSI over the last `period` close-to-close changes.
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = mean gain / mean loss (simple means over the window)
///
/// | mean loss | mean gain | RSI                  |
/// |-----------|-----------|----------------------|
/// | 0         | > 0       | 100                  |
/// | 0         | 0         | 50                   |
/// | > 0       | any       | 100 - 100 / (1 + RS) |
///
/// Needs `period + 1` closes; shorter series yield
/// [`IndicatorResult::InsufficientData`].
pub fn calculate_rsi(series: &PriceSeries, period: usize) -> IndicatorResult {
    calculate_rsi_from_closes(&series.closes(), period)
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(series: &PriceSeries) -> IndicatorResult {
    calculate_rsi(series, DEFAULT_RSI_PERIOD)
}

pub fn calculate_rsi_from_closes(closes: &[f64], period: usize) -> IndicatorResult {
    let required = period.saturating_add(1);
    if period == 0 || period == usize::MAX || closes.len() < required {
        return IndicatorResult::InsufficientData {
            required,
            available: closes.len(),
        };
    }

    let window = &closes[closes.len() - required..];
    let (gain_sum, loss_sum) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0_f64, 0.0_f64), |(gain, loss), change| {
            if change > 0.0 {
                (gain + change, loss)
            } else {
                (gain, loss - change)
            }
        });

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    let rsi = if avg_loss == 0.0 {
        if avg_gain > 0.0 {
            100.0
        } else {
            NEUTRAL_RSI
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    };

    if rsi.is_finite() {
        IndicatorResult::value(rsi.clamp(0.0, 100.0))
    } else {
        IndicatorResult::value(NEUTRAL_RSI)
    }
}
