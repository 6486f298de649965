use std::sync::Arc;
use std::time::Duration;

use workforce_risk::ruleset::{Actor, ConfigStore, InMemoryConfigRepository};
use workforce_risk::scoring::{
    Grade, KeyPersonnelReason, MonthlyScore, PerformanceRecord, TrainingRecord, ViolationRecord,
    YearMonth,
};
use workforce_risk::{EmployeeRecords, ScoringEngine};

fn month(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).expect("valid month")
}

fn store() -> Arc<ConfigStore<InMemoryConfigRepository>> {
    let store = ConfigStore::new(Arc::new(InMemoryConfigRepository::new()), Duration::ZERO);
    store
        .bootstrap("standard", &Actor::system())
        .expect("bootstrap");
    Arc::new(store)
}

/// A steady operator with two findings in the closing month.
fn quarter_with_late_findings() -> EmployeeRecords {
    let mut records = EmployeeRecords::new("OP-2207", month(2025, 4), month(2025, 6));
    for offset in 0..3 {
        records.performance.push(PerformanceRecord {
            month: month(2025, 4).shift(offset),
            grade: Some(Grade::A),
            raw_score: None,
        });
    }
    for _ in 0..2 {
        records.violations.push(ViolationRecord {
            month: month(2025, 6),
            severity: 1.0,
        });
    }
    records.training = vec![
        TrainingRecord::passed(92.0),
        TrainingRecord::passed(88.0),
        TrainingRecord::passed(95.0),
    ];
    records.cert_years = Some(4.0);
    records.comprehensive_history = vec![
        MonthlyScore {
            month: month(2025, 4),
            score: 91.0,
        },
        MonthlyScore {
            month: month(2025, 5),
            score: 90.0,
        },
    ];
    records
}

#[test]
fn every_dimension_is_scored_within_bounds() {
    let engine = ScoringEngine::new(store());

    let card = engine
        .score(&quarter_with_late_findings())
        .expect("scorecard");

    // Straight A grades sit above the 95 anchor in period mode.
    assert!((card.performance.value - 104.5).abs() < 1e-9);
    for (name, result) in [
        ("safety", &card.safety),
        ("training", &card.training),
        ("learning", &card.learning),
        ("stability", &card.stability),
    ] {
        assert!(
            (0.0..=100.0).contains(&result.value),
            "{name} out of range: {}",
            result.value
        );
    }
    assert!(card.composite.comprehensive > 0.0);
    assert_eq!(card.performance.evidence_str("mode"), Some("period"));
    assert!(card.learning_risk_level.is_some());
    assert_eq!(card.learning.evidence_f64("months"), Some(3.0));
}

#[test]
fn applying_a_stricter_preset_changes_the_key_personnel_verdict() {
    let store = store();
    let engine = ScoringEngine::new(Arc::clone(&store));
    let records = quarter_with_late_findings();

    let standard = engine.score(&records).expect("standard scorecard");
    assert!(!standard
        .composite
        .key_personnel_reasons
        .contains(&KeyPersonnelReason::FrequentViolations));

    let applied = store
        .apply_preset("strict", &Actor::new(7, "safety-manager"), "incident review")
        .expect("apply");
    assert!(applied.success);

    let strict = engine.score(&records).expect("strict scorecard");
    assert!(strict.composite.key_personnel);
    assert!(strict
        .composite
        .key_personnel_reasons
        .contains(&KeyPersonnelReason::FrequentViolations));
}

#[test]
fn scorecards_serialize_for_reporting() {
    let engine = ScoringEngine::new(store());

    let card = engine
        .score(&quarter_with_late_findings())
        .expect("scorecard");
    let document = serde_json::to_value(&card).expect("scorecard serializes");

    assert_eq!(document["employee_id"], "OP-2207");
    assert!(document["composite"]["nine_grid"]["cell"]["label"].is_string());
    assert!(document["learning"]["evidence"].is_object());

    let decoded: workforce_risk::Scorecard =
        serde_json::from_value(document).expect("scorecard deserializes");
    assert_eq!(decoded.employee_id, card.employee_id);
}

#[test]
fn uninitialized_store_surfaces_a_store_error() {
    let store = ConfigStore::new(Arc::new(InMemoryConfigRepository::new()), Duration::ZERO);
    let engine = ScoringEngine::new(store);

    assert!(engine.score(&quarter_with_late_findings()).is_err());
}
