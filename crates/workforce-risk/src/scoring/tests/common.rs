use crate::ruleset::{builtin_presets, LearningConfig, ScoringConfig};
use crate::scoring::domain::TrainingRecord;
use crate::scoring::period::YearMonth;

pub(super) fn preset(key: &str) -> ScoringConfig {
    builtin_presets()
        .into_iter()
        .find(|preset| preset.key == key)
        .map(|preset| preset.config)
        .expect("builtin preset")
}

pub(super) fn standard() -> ScoringConfig {
    preset("standard")
}

/// Risk-inertia parameters with the documented defaults (step 0.15, max 0.6).
pub(super) fn learning_defaults() -> LearningConfig {
    LearningConfig::default()
}

pub(super) fn month(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).expect("valid month")
}

pub(super) fn training_records(passed: usize, failed: usize) -> Vec<TrainingRecord> {
    let mut records: Vec<TrainingRecord> = (0..passed).map(|_| TrainingRecord::passed(90.0)).collect();
    records.extend((0..failed).map(|_| TrainingRecord::failed(60.0)));
    records
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
