//! Shared data models spanning the pipeline layers.

pub mod indicators;
pub mod market;
pub mod summary;
pub mod symbol;

pub use indicators::{IndicatorResult, NEUTRAL_RSI};
pub use market::{Granularity, HistoryWindow, PriceBar, PriceSeries, QuoteSnapshot};
pub use summary::{FetchStatus, SummaryRecord};
pub use symbol::{Symbol, SymbolError, SymbolSet};
