//! Filter/rank stage of the pipeline.

pub mod criteria;
pub mod pipeline;

pub use criteria::{FilterCriteria, NonFiniteThreshold, Rejection};
pub use pipeline::{ScreenerPipeline, ScreenerView, ViewSummary};
