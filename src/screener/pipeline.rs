//! Threshold filtering and ranking over cached summary rows.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::summary::SummaryRecord;

use super::criteria::{FilterCriteria, Rejection};

/// Filtered and raw views of the same rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenerView {
    /// Rows passing every bound, ranked.
    pub filtered: Vec<SummaryRecord>,
    /// Every row, ranked the same way.
    pub raw: Vec<SummaryRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    pub total: usize,
    pub passed: usize,
    pub excluded: usize,
}

impl ScreenerView {
    pub fn summary(&self) -> ViewSummary {
        ViewSummary {
            total: self.raw.len(),
            passed: self.filtered.len(),
            excluded: self.raw.len() - self.filtered.len(),
        }
    }
}

pub struct ScreenerPipeline;

impl ScreenerPipeline {
    /// Check one row against the criteria.
    ///
    /// A row with no valuation ratio or no volume is rejected: a missing
    /// value never satisfies a bound.
    pub fn evaluate(record: &SummaryRecord, criteria: &FilterCriteria) -> Result<(), Rejection> {
        let ratio = record
            .valuation_ratio
            .ok_or(Rejection::ValuationUnavailable)?;
        if ratio > criteria.max_valuation_ratio {
            return Err(Rejection::ValuationAboveMax {
                value: ratio,
                max: criteria.max_valuation_ratio,
            });
        }

        let volume = record.volume_millions.ok_or(Rejection::VolumeUnavailable)?;
        if volume < criteria.min_volume_millions {
            return Err(Rejection::VolumeBelowMin {
                value: volume,
                min: criteria.min_volume_millions,
            });
        }

        if record.rsi > criteria.max_rsi {
            return Err(Rejection::RsiAboveMax {
                value: record.rsi,
                max: criteria.max_rsi,
            });
        }

        Ok(())
    }

    /// Partition and rank. Pure: the same input always gives the same view.
    pub fn apply(records: &[SummaryRecord], criteria: &FilterCriteria) -> ScreenerView {
        let mut raw = records.to_vec();
        rank(&mut raw);

        let filtered = raw
            .iter()
            .filter(|r| Self::evaluate(r, criteria).is_ok())
            .cloned()
            .collect();

        ScreenerView { filtered, raw }
    }

    /// Rows that failed, with the first rule each one broke, in input order.
    pub fn rejections(
        records: &[SummaryRecord],
        criteria: &FilterCriteria,
    ) -> Vec<(SummaryRecord, Rejection)> {
        records
            .iter()
            .filter_map(|r| Self::evaluate(r, criteria).err().map(|why| (r.clone(), why)))
            .collect()
    }
}

/// Change percent descending, missing values last. Stable, so ties keep
/// input order.
fn rank(records: &mut [SummaryRecord]) {
    records.sort_by(|a, b| match (a.change_percent, b.change_percent) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
