use serde_json::{json, Value};

use crate::models::market::PriceSeries;
use crate::models::summary::SummaryRecord;
use crate::models::symbol::Symbol;

use super::{treemap_nodes, Presentation, RecordField};

/// Renders to JSON payloads for the HTTP API.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPresenter;

impl Presentation for JsonPresenter {
    type Output = Value;

    fn render_table(&self, records: &[SummaryRecord]) -> Value {
        json!(records)
    }

    fn render_treemap(
        &self,
        records: &[SummaryRecord],
        value: RecordField,
        color: RecordField,
    ) -> Value {
        json!({
            "value_field": value,
            "color_field": color,
            "nodes": treemap_nodes(records, value, color),
        })
    }

    fn render_candlestick(&self, symbol: &Symbol, series: &PriceSeries) -> Value {
        json!({
            "symbol": symbol,
            "bars": series.bars(),
        })
    }
}
