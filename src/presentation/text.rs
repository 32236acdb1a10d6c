use std::fmt::Write;

use crate::models::market::PriceSeries;
use crate::models::summary::{FetchStatus, SummaryRecord};
use crate::models::symbol::Symbol;

use super::{treemap_nodes, Presentation, RecordField};

/// Fixed-width terminal output. Missing values print as `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPresenter;

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn status(status: FetchStatus) -> &'static str {
    match status {
        FetchStatus::Ok => "ok",
        FetchStatus::PartialFailure => "partial",
        FetchStatus::Unavailable => "unavailable",
    }
}

impl Presentation for TextPresenter {
    type Output = String;

    fn render_table(&self, records: &[SummaryRecord]) -> String {
        let mut out = format!(
            "{:<8} {:>10} {:>9} {:>8} {:>11} {:>13} {:>7}  {}\n",
            "Ticker", "Price", "Change %", "P/E", "Volume (M)", "Mkt Cap (B)", "RSI", "Status"
        );
        for r in records {
            let _ = writeln!(
                out,
                "{:<8} {:>10} {:>9} {:>8} {:>11} {:>13} {:>7.2}  {}",
                r.symbol.as_str(),
                cell(r.price),
                cell(r.change_percent),
                cell(r.valuation_ratio),
                cell(r.volume_millions),
                cell(r.market_cap_billions),
                r.rsi,
                status(r.fetch_status)
            );
        }
        out
    }

    fn render_treemap(
        &self,
        records: &[SummaryRecord],
        value: RecordField,
        color: RecordField,
    ) -> String {
        let nodes = treemap_nodes(records, value, color);
        let total: f64 = nodes.iter().map(|n| n.value).sum();

        let mut out = format!("Treemap ({} by {}, colour {})\n", nodes.len(), value, color);
        for node in &nodes {
            let share = if total > 0.0 { node.value / total * 100.0 } else { 0.0 };
            let _ = writeln!(
                out,
                "{:<8} {:>6.2}%  {}={:.2}  {}={}",
                node.symbol.as_str(),
                share,
                value,
                node.value,
                color,
                cell(node.color)
            );
        }
        out
    }

    fn render_candlestick(&self, symbol: &Symbol, series: &PriceSeries) -> String {
        let mut out = format!("{} ({} bars)\n", symbol, series.len());
        for bar in series.bars() {
            let _ = writeln!(
                out,
                "{}  O {:.2}  H {:.2}  L {:.2}  C {:.2}  V {:.0}",
                bar.timestamp.format("%Y-%m-%d"),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume
            );
        }
        out
    }
}
