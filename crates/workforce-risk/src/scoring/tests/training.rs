use super::common::*;
use crate::scoring::domain::{ColorTier, TrainingRecord};
use crate::scoring::training::score_training;

#[test]
fn no_training_is_graded_by_how_long_the_gap_is() {
    let config = standard();

    let short = score_training(&[], 30, None, &config.training);
    assert_close(short.value, 65.0);
    assert_eq!(short.color_tier, ColorTier::Green);
    assert_eq!(short.alert_tag, "no training scheduled");

    let mid = score_training(&[], 120, None, &config.training);
    assert_close(mid.value, 50.0);
    assert_eq!(mid.color_tier, ColorTier::Yellow);

    let long = score_training(&[], 200, None, &config.training);
    assert_close(long.value, 0.0);
    assert_eq!(long.color_tier, ColorTier::Red);
    assert_eq!(long.evidence_str("alert_level"), Some("CRITICAL"));
}

#[test]
fn absolute_failure_count_overrides_everything() {
    let config = standard();
    let records = training_records(2, 3);

    let result = score_training(&records, 365, Some(5.0), &config.training);

    // (2 * 90 + 3 * 60) / 5 = 72, halved.
    assert_close(result.value, 36.0);
    assert_eq!(result.color_tier, ColorTier::Red);
    assert_eq!(result.alert_tag, "frequent disqualification (3 failures)");
    assert_eq!(result.evidence_f64("penalty_coefficient"), Some(0.5));
}

#[test]
fn failure_in_a_small_sample_needs_mentoring() {
    let config = standard();
    let records = vec![
        TrainingRecord::failed(70.0),
        TrainingRecord::passed(90.0),
        TrainingRecord::passed(80.0),
    ];

    let result = score_training(&records, 90, None, &config.training);

    assert_close(result.value, 68.0);
    assert_eq!(result.color_tier, ColorTier::Purple);
    assert_eq!(result.evidence_str("alert_level"), Some("HIGH_RISK"));
}

#[test]
fn clean_small_sample_is_competent() {
    let config = standard();
    let records = training_records(4, 0);

    let result = score_training(&records, 90, None, &config.training);

    assert_close(result.value, 90.0);
    assert_eq!(result.color_tier, ColorTier::Green);
    assert_eq!(result.alert_tag, "competent");
}

#[test]
fn annualized_rate_uses_the_new_employee_ladder_without_certification() {
    let config = standard();
    let records = training_records(8, 2);

    let result = score_training(&records, 30, None, &config.training);

    // 2 / 30 * 365 = 24.3, above the top rung of 15.
    assert_close(result.value, 58.8);
    assert_eq!(result.color_tier, ColorTier::Orange);
    assert_eq!(result.alert_tag, "high-frequency failure (annualized 24.3)");
    assert_eq!(result.evidence_str("cohort"), Some("new_employee"));
    assert_eq!(result.evidence_f64("matched_threshold"), Some(15.0));
}

#[test]
fn experienced_staff_face_a_stricter_ladder() {
    let config = standard();
    let records = training_records(8, 2);

    let newcomer = score_training(&records, 365, Some(0.5), &config.training);
    let veteran = score_training(&records, 365, Some(3.0), &config.training);

    // An annualized rate of 2.0 clears every new-employee rung.
    assert_close(newcomer.value, 84.0);
    assert_eq!(newcomer.alert_tag, "competent");
    assert_eq!(newcomer.evidence_str("cohort"), Some("new_employee"));
    assert!(newcomer.evidence.get("matched_threshold").is_some_and(|value| value.is_null()));

    assert_close(veteran.value, 75.6);
    assert_eq!(veteran.evidence_str("cohort"), Some("experienced"));
    assert_eq!(veteran.evidence_f64("matched_threshold"), Some(2.0));
}

#[test]
fn shared_ladder_applies_when_cohort_ladders_are_absent() {
    let mut config = standard();
    config.training.penalty_rules.afr_thresholds_new_employee = None;
    config.training.penalty_rules.afr_thresholds_experienced = None;
    let records = training_records(8, 2);

    let result = score_training(&records, 365, Some(3.0), &config.training);

    // Rate 2.0 meets the 1.5 rung of the shared ladder.
    assert_close(result.value, 58.8);
    assert_eq!(result.evidence_f64("matched_threshold"), Some(1.5));
}
