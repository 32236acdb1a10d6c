pub mod messages;
pub mod provider;

pub use provider::{YahooMarketDataProvider, DEFAULT_BASE_URL};
