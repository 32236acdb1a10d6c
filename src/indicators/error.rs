use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("invalid period {period} for {indicator}")]
    InvalidPeriod {
        indicator: &'static str,
        period: usize,
    },
}
