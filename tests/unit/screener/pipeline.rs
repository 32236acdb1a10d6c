//! Unit tests for the screener pipeline

use mooviz::models::{FetchStatus, Symbol, SummaryRecord, SymbolSet};
use mooviz::screener::{FilterCriteria, NonFiniteThreshold, Rejection, ScreenerPipeline};

fn record(
    symbol: &str,
    change: Option<f64>,
    ratio: Option<f64>,
    volume: Option<f64>,
    rsi: f64,
) -> SummaryRecord {
    SummaryRecord {
        symbol: Symbol::parse(symbol).unwrap(),
        price: Some(100.0),
        change_percent: change,
        valuation_ratio: ratio,
        volume_millions: volume,
        market_cap_billions: Some(500.0),
        rsi,
        fetch_status: FetchStatus::Ok,
    }
}

fn criteria() -> FilterCriteria {
    FilterCriteria {
        max_valuation_ratio: 30.0,
        min_volume_millions: 5.0,
        max_rsi: 70.0,
    }
}

fn symbols(records: &[SummaryRecord]) -> Vec<&str> {
    records.iter().map(|r| r.symbol.as_str()).collect()
}

#[test]
fn test_worked_example() {
    let set = SymbolSet::from_raw(["AAPL", "NVDA", "TSLA", "", ""]);
    let names: Vec<&str> = set.iter().map(Symbol::as_str).collect();
    assert_eq!(names, vec!["AAPL", "NVDA", "TSLA"]);

    let records = vec![
        record("AAPL", Some(2.0), Some(28.0), Some(50.0), 40.0),
        record("NVDA", Some(1.0), Some(45.0), Some(200.0), 55.0),
        record("TSLA", Some(-3.0), None, Some(90.0), 35.0),
    ];
    let view = ScreenerPipeline::apply(&records, &criteria());

    assert_eq!(symbols(&view.filtered), vec!["AAPL"]);
    assert_eq!(symbols(&view.raw), vec!["AAPL", "NVDA", "TSLA"]);
    let summary = view.summary();
    assert_eq!((summary.total, summary.passed, summary.excluded), (3, 1, 2));
}

#[test]
fn test_unavailable_ratio_never_passes() {
    let records = vec![record("TSLA", Some(5.0), None, Some(90.0), 10.0)];
    let generous = FilterCriteria {
        max_valuation_ratio: f64::MAX,
        min_volume_millions: 0.0,
        max_rsi: 100.0,
    };
    let view = ScreenerPipeline::apply(&records, &generous);
    assert!(view.filtered.is_empty());
    assert_eq!(view.raw.len(), 1);
    assert_eq!(
        ScreenerPipeline::evaluate(&records[0], &generous),
        Err(Rejection::ValuationUnavailable)
    );
}

#[test]
fn test_unavailable_volume_never_passes() {
    let r = record("KO", Some(0.1), Some(20.0), None, 30.0);
    assert_eq!(
        ScreenerPipeline::evaluate(&r, &criteria()),
        Err(Rejection::VolumeUnavailable)
    );
}

#[test]
fn test_bounds_are_inclusive() {
    let r = record("KO", Some(0.1), Some(30.0), Some(5.0), 70.0);
    assert_eq!(ScreenerPipeline::evaluate(&r, &criteria()), Ok(()));
}

#[test]
fn test_first_failing_rule_is_reported() {
    let r = record("AMD", Some(0.1), Some(20.0), Some(2.0), 90.0);
    assert_eq!(
        ScreenerPipeline::evaluate(&r, &criteria()),
        Err(Rejection::VolumeBelowMin { value: 2.0, min: 5.0 })
    );

    let r = record("AMD", Some(0.1), Some(20.0), Some(20.0), 90.0);
    assert_eq!(
        ScreenerPipeline::evaluate(&r, &criteria()),
        Err(Rejection::RsiAboveMax { value: 90.0, max: 70.0 })
    );
}

#[test]
fn test_ranking_is_stable_and_missing_change_sorts_last() {
    let records = vec![
        record("A", None, Some(10.0), Some(10.0), 30.0),
        record("B", Some(1.0), Some(10.0), Some(10.0), 30.0),
        record("C", Some(3.0), Some(10.0), Some(10.0), 30.0),
        record("D", Some(1.0), Some(10.0), Some(10.0), 30.0),
    ];
    let view = ScreenerPipeline::apply(&records, &criteria());
    assert_eq!(symbols(&view.raw), vec!["C", "B", "D", "A"]);
    assert_eq!(symbols(&view.filtered), vec!["C", "B", "D", "A"]);
}

#[test]
fn test_apply_is_idempotent() {
    let records = vec![
        record("AAPL", Some(2.0), Some(28.0), Some(50.0), 40.0),
        record("NVDA", Some(2.0), Some(25.0), Some(200.0), 55.0),
        record("TSLA", Some(-3.0), None, Some(90.0), 35.0),
        record("KO", Some(0.5), Some(22.0), Some(12.0), 61.0),
    ];
    let first = ScreenerPipeline::apply(&records, &criteria());
    let second = ScreenerPipeline::apply(&records, &criteria());
    assert_eq!(first, second);

    let reapplied = ScreenerPipeline::apply(&first.raw, &criteria());
    assert_eq!(reapplied, first);
}

#[test]
fn test_rejections_list_every_excluded_row() {
    let records = vec![
        record("AAPL", Some(2.0), Some(28.0), Some(50.0), 40.0),
        record("NVDA", Some(1.0), Some(45.0), Some(200.0), 55.0),
        record("TSLA", Some(-3.0), None, Some(90.0), 35.0),
    ];
    let rejected: Vec<(String, Rejection)> = ScreenerPipeline::rejections(&records, &criteria())
        .into_iter()
        .map(|(r, why)| (r.symbol.to_string(), why))
        .collect();
    assert_eq!(
        rejected,
        vec![
            (
                "NVDA".to_string(),
                Rejection::ValuationAboveMax { value: 45.0, max: 30.0 }
            ),
            ("TSLA".to_string(), Rejection::ValuationUnavailable),
        ]
    );
}

#[test]
fn test_criteria_reject_non_finite_bounds() {
    assert!(FilterCriteria::default().validate().is_ok());

    let criteria = FilterCriteria {
        max_rsi: f64::NAN,
        ..FilterCriteria::default()
    };
    let err = criteria.validate().unwrap_err();
    assert_eq!(err.name, "max_rsi");
    assert!(err.value.is_nan());

    let criteria = FilterCriteria {
        min_volume_millions: f64::NEG_INFINITY,
        ..FilterCriteria::default()
    };
    assert_eq!(
        criteria.validate(),
        Err(NonFiniteThreshold {
            name: "min_volume_millions",
            value: f64::NEG_INFINITY,
        })
    );
}
