//! Rendering seam. The pipeline hands plain records and series to a
//! [`Presentation`]; it owns no rendering logic itself.

pub mod json;
pub mod text;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::market::PriceSeries;
use crate::models::summary::SummaryRecord;
use crate::models::symbol::Symbol;

pub use json::JsonPresenter;
pub use text::TextPresenter;

pub trait Presentation {
    type Output;

    fn render_table(&self, records: &[SummaryRecord]) -> Self::Output;

    /// Tiles sized by `value` and coloured by `color`.
    fn render_treemap(
        &self,
        records: &[SummaryRecord],
        value: RecordField,
        color: RecordField,
    ) -> Self::Output;

    fn render_candlestick(&self, symbol: &Symbol, series: &PriceSeries) -> Self::Output;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown record field {0:?}")]
pub struct UnknownField(pub String);

/// Numeric columns of a [`SummaryRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Price,
    ChangePercent,
    ValuationRatio,
    VolumeMillions,
    MarketCapBillions,
    Rsi,
}

impl RecordField {
    pub fn name(&self) -> &'static str {
        match self {
            RecordField::Price => "price",
            RecordField::ChangePercent => "change_percent",
            RecordField::ValuationRatio => "valuation_ratio",
            RecordField::VolumeMillions => "volume_millions",
            RecordField::MarketCapBillions => "market_cap_billions",
            RecordField::Rsi => "rsi",
        }
    }

    pub fn value(&self, record: &SummaryRecord) -> Option<f64> {
        match self {
            RecordField::Price => record.price,
            RecordField::ChangePercent => record.change_percent,
            RecordField::ValuationRatio => record.valuation_ratio,
            RecordField::VolumeMillions => record.volume_millions,
            RecordField::MarketCapBillions => record.market_cap_billions,
            RecordField::Rsi => Some(record.rsi),
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price" => Ok(RecordField::Price),
            "change_percent" => Ok(RecordField::ChangePercent),
            "valuation_ratio" => Ok(RecordField::ValuationRatio),
            "volume_millions" => Ok(RecordField::VolumeMillions),
            "market_cap_billions" => Ok(RecordField::MarketCapBillions),
            "rsi" => Ok(RecordField::Rsi),
            _ => Err(UnknownField(s.to_string())),
        }
    }
}

/// One treemap tile. Rows whose size value is missing or not positive have
/// no tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapNode {
    pub symbol: Symbol,
    pub value: f64,
    pub color: Option<f64>,
    pub price: Option<f64>,
    pub valuation_ratio: Option<f64>,
    pub rsi: f64,
}

pub fn treemap_nodes(
    records: &[SummaryRecord],
    value: RecordField,
    color: RecordField,
) -> Vec<TreemapNode> {
    records
        .iter()
        .filter_map(|record| {
            let size = value.value(record).filter(|v| *v > 0.0)?;
            Some(TreemapNode {
                symbol: record.symbol.clone(),
                value: size,
                color: color.value(record),
                price: record.price,
                valuation_ratio: record.valuation_ratio,
                rsi: record.rsi,
            })
        })
        .collect()
}
