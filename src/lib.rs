//! Mooviz: a small stock screener.
//!
//! Symbols flow through the pipeline in one direction:
//! market data → [`snapshot::SnapshotBuilder`] (quote + RSI) →
//! [`cache::AggregationCache`] → [`screener::ScreenerPipeline`] →
//! [`presentation::Presentation`].

pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod presentation;
pub mod screener;
pub mod services;
pub mod snapshot;

pub use error::ScreenerError;
