use std::sync::Arc;

use super::common::*;
use crate::ruleset::FixedConfig;
use crate::scoring::domain::{ColorTier, Grade, TrainingRecord};
use crate::scoring::engine::{EmployeeRecords, PerformanceRecord, ScoringEngine, ViolationRecord};
use crate::scoring::learning::RiskLevel;

fn single_month() -> EmployeeRecords {
    let mut records = EmployeeRecords::new("E-1001", month(2025, 6), month(2025, 6));
    records.performance.push(PerformanceRecord {
        month: month(2025, 6),
        grade: Some(Grade::D),
        raw_score: Some(150.0),
    });
    records
}

#[test]
fn single_month_uses_the_monthly_performance_mode() {
    let engine = ScoringEngine::new(FixedConfig::new(standard()));

    let card = engine.score(&single_month()).expect("scorecard");

    assert_close(card.performance.value, 50.0);
    assert_eq!(card.performance.evidence_str("mode"), Some("monthly"));
    assert_eq!(card.learning_risk_level, None);
    assert_eq!(card.learning.evidence_str("zone"), Some("SAFE"));
}

#[test]
fn multi_month_span_uses_period_and_long_term_modes() {
    let engine = ScoringEngine::new(Arc::new(FixedConfig::new(standard())));
    let mut records = EmployeeRecords::new("E-1002", month(2025, 1), month(2025, 6));
    for offset in 0..6 {
        records.performance.push(PerformanceRecord {
            month: month(2025, 1).shift(offset),
            grade: Some(Grade::BPlus),
            raw_score: None,
        });
    }

    let card = engine.score(&records).expect("scorecard");

    assert_eq!(card.performance.evidence_str("mode"), Some("period"));
    assert_eq!(card.learning.evidence_str("mode"), Some("long_term"));
    assert_eq!(card.learning_risk_level, Some(RiskLevel::Safe));
    assert_eq!(card.learning.evidence_f64("months"), Some(6.0));
}

#[test]
fn missing_performance_records_score_zero() {
    let engine = ScoringEngine::new(FixedConfig::new(standard()));
    let records = EmployeeRecords::new("E-1003", month(2025, 6), month(2025, 6));

    let card = engine.score(&records).expect("scorecard");

    assert_close(card.performance.value, 0.0);
    assert_eq!(card.performance.color_tier, ColorTier::Gray);
}

#[test]
fn period_length_drives_training_and_safety_denominators() {
    let records = EmployeeRecords::new("E-1004", month(2025, 1), month(2025, 3));

    assert_eq!(records.duration_days(), 90);
    // 59 days between the first of January and the first of March.
    assert_eq!(records.months_active(), 2);

    let single = EmployeeRecords::new("E-1004", month(2024, 2), month(2024, 2));
    assert_eq!(single.duration_days(), 29);
    assert_eq!(single.months_active(), 1);
}

#[test]
fn zero_severity_findings_are_not_violations() {
    let engine = ScoringEngine::new(FixedConfig::new(standard()));
    let mut records = single_month();
    records.violations.push(ViolationRecord {
        month: month(2025, 6),
        severity: 0.0,
    });
    records.training.push(TrainingRecord::passed(90.0));

    let card = engine.score(&records).expect("scorecard");

    assert_eq!(card.safety.evidence_f64("violation_count"), Some(0.0));
    assert_close(card.safety.value, 100.0);
}

#[test]
fn latest_month_violations_feed_the_key_personnel_flag() {
    let engine = ScoringEngine::new(FixedConfig::new(standard()));
    let mut records = single_month();
    for _ in 0..3 {
        records.violations.push(ViolationRecord {
            month: month(2025, 6),
            severity: 1.0,
        });
    }

    let card = engine.score(&records).expect("scorecard");

    assert!(card.composite.key_personnel);
    assert_eq!(card.dimensions().safety, card.safety.value);
}
