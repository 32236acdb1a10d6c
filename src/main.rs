//! Mooviz one-shot screener
//!
//! Fetches the configured symbols (or a comma separated list given as the
//! first argument), prints the filtered and raw tables and a treemap summary.

use dotenvy::dotenv;
use mooviz::cache::AggregationCache;
use mooviz::config::Config;
use mooviz::indicators::Rsi;
use mooviz::logging;
use mooviz::models::SymbolSet;
use mooviz::presentation::{Presentation, RecordField, TextPresenter};
use mooviz::screener::ScreenerPipeline;
use mooviz::services::YahooMarketDataProvider;
use mooviz::snapshot::SnapshotBuilder;
use mooviz::ScreenerError;
use std::env;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let mut config = Config::from_env()?;
    logging::init_logging(&config.environment);

    if let Some(raw) = env::args().nth(1) {
        config.symbols = SymbolSet::from_csv(&raw);
    }

    info!(
        symbols = config.symbols.len(),
        ttl_secs = config.cache_ttl.as_secs(),
        "Screening {} symbols",
        config.symbols.len()
    );

    let provider = Arc::new(YahooMarketDataProvider::new(
        &config.market_data_base_url,
        config.request_timeout,
    )?);
    let builder = SnapshotBuilder::new(provider)
        .with_rsi(Rsi::new(config.rsi_period)?)
        .with_history_window(config.history)
        .with_request_timeout(config.request_timeout);
    let cache = AggregationCache::new(Arc::new(builder), config.cache_ttl);

    let entry = match cache.get(&config.symbols).await {
        Ok(entry) => entry,
        Err(ScreenerError::InvalidSymbolSet) => {
            println!("Nothing to display: no symbols given.");
            return Ok(());
        }
    };

    let view = ScreenerPipeline::apply(&entry.records, &config.criteria);
    let summary = view.summary();
    let presenter = TextPresenter;

    println!(
        "Screener (P/E <= {}, volume >= {}M, RSI <= {}): {} of {} passed\n",
        config.criteria.max_valuation_ratio,
        config.criteria.min_volume_millions,
        config.criteria.max_rsi,
        summary.passed,
        summary.total
    );
    print!("{}", presenter.render_table(&view.filtered));
    println!();
    print!(
        "{}",
        presenter.render_treemap(
            &view.filtered,
            RecordField::MarketCapBillions,
            RecordField::ChangePercent
        )
    );
    println!("\nAll symbols:");
    print!("{}", presenter.render_table(&view.raw));

    for (record, why) in ScreenerPipeline::rejections(&entry.records, &config.criteria) {
        info!(symbol = %record.symbol, reason = %why, "{} excluded: {}", record.symbol, why);
    }

    Ok(())
}
