//! Quote + indicator aggregation into summary rows.

pub mod builder;

pub use builder::{SnapshotBuilder, DEFAULT_REQUEST_TIMEOUT};
