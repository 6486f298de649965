use super::common::*;
use crate::scoring::domain::{ColorTier, Grade, PerformanceEntry};
use crate::scoring::performance::{score_monthly, score_period};

#[test]
fn d_grade_is_locked_to_the_override_whatever_the_raw_score() {
    let config = standard();

    let result = score_monthly(Grade::D, 150.0, &config.performance);

    assert_close(result.value, 50.0);
    assert_eq!(result.color_tier, ColorTier::Red);
    assert_eq!(result.evidence_str("grade"), Some("D"));
}

#[test]
fn other_grades_clamp_into_their_band() {
    let config = standard();

    assert_close(score_monthly(Grade::C, 95.0, &config.performance).value, 89.9);
    assert_close(score_monthly(Grade::B, 10.0, &config.performance).value, 90.0);
    assert_close(score_monthly(Grade::A, 130.0, &config.performance).value, 110.0);

    let on_target = score_monthly(Grade::BPlus, 97.0, &config.performance);
    assert_close(on_target.value, 97.0);
    assert_eq!(on_target.color_tier, ColorTier::Green);
}

#[test]
fn empty_period_is_neutral() {
    let config = standard();

    let result = score_period(&[], month(2025, 6), &config.performance);

    assert_close(result.value, 95.0);
    assert_eq!(result.color_tier, ColorTier::Green);
    assert_eq!(result.alert_tag, "no data");
}

#[test]
fn period_averages_grade_coefficients() {
    let config = standard();
    let entries = vec![
        PerformanceEntry::undated(Grade::A),
        PerformanceEntry::undated(Grade::A),
        PerformanceEntry::undated(Grade::BPlus),
    ];

    let result = score_period(&entries, month(2025, 6), &config.performance);

    assert_close(result.value, 101.3);
    assert_eq!(result.color_tier, ColorTier::Green);
    assert_eq!(result.evidence_bool("time_decay_applied"), Some(false));
}

#[test]
fn single_d_grade_caps_an_otherwise_perfect_period() {
    let config = standard();
    let mut entries: Vec<PerformanceEntry> = (0..10).map(|_| PerformanceEntry::undated(Grade::A)).collect();
    entries.push(PerformanceEntry::undated(Grade::D));

    let result = score_period(&entries, month(2025, 6), &config.performance);

    assert_close(result.value, 90.0);
    assert_eq!(result.color_tier, ColorTier::Red);
    assert_eq!(result.alert_tag, "D grade on record");
    assert_eq!(result.evidence_str("contamination"), Some("D"));
}

#[test]
fn repeated_c_grades_cap_below_target() {
    let config = standard();
    let mut entries: Vec<PerformanceEntry> = (0..8).map(|_| PerformanceEntry::undated(Grade::A)).collect();
    entries.push(PerformanceEntry::undated(Grade::C));
    entries.push(PerformanceEntry::undated(Grade::C));

    let result = score_period(&entries, month(2025, 6), &config.performance);

    assert_close(result.value, 94.9);
    assert_eq!(result.color_tier, ColorTier::Orange);
    assert_eq!(result.alert_tag, "repeated C grades");
}

#[test]
fn old_d_grades_decay_out_of_the_contamination_window() {
    let config = standard();
    let entries = vec![
        PerformanceEntry::new(Grade::D, "2024-01"),
        PerformanceEntry::new(Grade::A, "2024-07"),
        PerformanceEntry::new(Grade::A, "2024-08"),
        PerformanceEntry::new(Grade::A, "2024-09"),
    ];

    let decayed = score_period(&entries, month(2024, 9), &config.performance);
    assert_eq!(decayed.evidence_bool("time_decay_applied"), Some(true));
    assert_eq!(decayed.evidence_f64("d_count_effective"), Some(0.0));
    assert_eq!(decayed.evidence_f64("d_count_raw"), Some(1.0));
    assert_eq!(decayed.alert_tag, "failed overall");

    let mut without_decay = config.performance.clone();
    without_decay.time_decay.enabled = false;
    let raw = score_period(&entries, month(2024, 9), &without_decay);
    assert_eq!(raw.alert_tag, "D grade on record");
    assert_close(raw.value, decayed.value);
}

#[test]
fn missing_month_disables_decay_for_the_whole_period() {
    let config = standard();
    let entries = vec![
        PerformanceEntry::new(Grade::D, "2024-01"),
        PerformanceEntry::undated(Grade::A),
    ];

    let result = score_period(&entries, month(2024, 9), &config.performance);

    assert_eq!(result.evidence_bool("time_decay_applied"), Some(false));
    assert_eq!(result.alert_tag, "D grade on record");
}

#[test]
fn unparsable_month_keeps_full_weight() {
    let config = standard();
    let entries = vec![
        PerformanceEntry::new(Grade::D, "sometime"),
        PerformanceEntry::new(Grade::A, "2024-09"),
    ];

    let result = score_period(&entries, month(2024, 9), &config.performance);

    assert_eq!(result.evidence_f64("d_count_effective"), Some(1.0));
    assert_eq!(result.alert_tag, "D grade on record");
}
