pub mod error;
pub mod registry;

pub mod momentum;

pub use error::IndicatorError;
pub use momentum::*;
pub use registry::*;
