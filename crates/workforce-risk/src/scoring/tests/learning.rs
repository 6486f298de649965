use super::common::*;
use crate::scoring::domain::{ColorTier, ZoneState};
use crate::scoring::learning::{
    classify_month, inertia_penalty, score_long_term, score_monthly, water_lines, RiskLevel,
    TrendType,
};

#[test]
fn momentum_rewards_top_performers_holding_level() {
    let result = score_monthly(96.0, 95.0);

    assert_close(result.value, 100.0);
    assert_eq!(result.color_tier, ColorTier::Gold);
    assert_eq!(result.evidence_str("tier"), Some("HIGH_PLATEAU"));
}

#[test]
fn momentum_punishes_low_and_sliding() {
    let result = score_monthly(60.0, 65.0);

    // (60 - 7.5) * 0.8
    assert_close(result.value, 42.0);
    assert_eq!(result.color_tier, ColorTier::Red);
}

#[test]
fn momentum_tiers_follow_the_delta() {
    assert_eq!(score_monthly(80.0, 68.0).color_tier, ColorTier::Gold);
    assert_eq!(score_monthly(75.0, 88.0).color_tier, ColorTier::Red);
    assert_eq!(score_monthly(82.0, 80.0).color_tier, ColorTier::Green);
    assert_eq!(score_monthly(80.0, 82.0).color_tier, ColorTier::Yellow);

    let new_hire = score_monthly(80.0, 80.0);
    assert_close(new_hire.value, 80.0);
    assert_eq!(new_hire.evidence_str("tier"), Some("FLAT"));
}

#[test]
fn water_lines_respect_floors_and_ceiling() {
    let config = learning_defaults();

    let (warning, critical) = water_lines(1.0, &config);
    assert_close(warning, 3.0);
    assert_close(critical, 5.0);

    // A noisy team cannot push the warning line past the ceiling.
    let (warning, critical) = water_lines(4.0, &config);
    assert_close(warning, 5.0);
    assert_close(critical, 12.0);
}

#[test]
fn danger_zone_trends_scale_the_base_score() {
    let config = learning_defaults();

    let mitigating = classify_month(4, Some(5), 1.0, &config);
    assert_eq!(mitigating.zone, ZoneState::Danger);
    assert_eq!(mitigating.trend, TrendType::HighImprovement);
    assert_close(mitigating.score, 48.0);

    let solidifying = classify_month(4, Some(4), 1.0, &config);
    assert_eq!(solidifying.trend, TrendType::Solidification);
    assert_close(solidifying.score, 24.0);

    let worsening = classify_month(4, Some(2), 1.0, &config);
    assert_eq!(worsening.trend, TrendType::Deterioration);
    assert_close(worsening.score, 18.0);
    assert_eq!(worsening.color_tier, ColorTier::Red);

    let cold = classify_month(4, None, 1.0, &config);
    assert_eq!(cold.trend, TrendType::ColdStartWarning);
    assert_close(cold.score, 36.0);
}

#[test]
fn safe_zone_rewards_improvement_and_clamps_at_one_hundred() {
    let config = learning_defaults();

    let improving = classify_month(1, Some(2), 1.0, &config);
    assert_eq!(improving.zone, ZoneState::Safe);
    assert_eq!(improving.trend, TrendType::Improvement);
    assert_close(improving.score, 100.0);

    let fluctuating = classify_month(2, Some(1), 1.0, &config);
    assert_eq!(fluctuating.trend, TrendType::SafeFluctuation);
    assert_close(fluctuating.score, 85.5);
    assert_eq!(fluctuating.color_tier, ColorTier::Yellow);
}

#[test]
fn group_calibration_bonus_applies_below_the_team_average() {
    let config = learning_defaults();

    let steady = classify_month(1, Some(1), 2.0, &config);

    assert_close(steady.score, 100.0);
    let at_average = classify_month(2, Some(2), 2.0, &config);
    assert_close(at_average.score, 95.0);
}

#[test]
fn reaching_the_critical_line_is_a_meltdown() {
    let config = learning_defaults();

    let decision = classify_month(5, Some(0), 1.0, &config);

    assert_eq!(decision.zone, ZoneState::Critical);
    assert_eq!(decision.trend, TrendType::Meltdown);
    assert_close(decision.score, 0.0);
    assert_eq!(decision.to_score_result().evidence_str("zone"), Some("CRITICAL"));
}

#[test]
fn three_consecutive_danger_months_cost_thirty_percent() {
    let config = learning_defaults();
    let zones = [
        ZoneState::Safe,
        ZoneState::Danger,
        ZoneState::Danger,
        ZoneState::Danger,
        ZoneState::Safe,
    ];

    let inertia = inertia_penalty(&zones, &config);

    assert_eq!(inertia.max_consecutive, 3);
    assert!(inertia.triggered);
    assert_close(inertia.penalty_rate, 0.30);
}

#[test]
fn inertia_penalty_is_capped() {
    let config = learning_defaults();
    let zones = [ZoneState::Danger; 8];

    let inertia = inertia_penalty(&zones, &config);

    assert_close(inertia.penalty_rate, 0.6);
}

#[test]
fn isolated_danger_month_carries_no_inertia() {
    let config = learning_defaults();
    let zones = [ZoneState::Danger, ZoneState::Safe, ZoneState::Critical];

    let inertia = inertia_penalty(&zones, &config);

    assert_eq!(inertia.max_consecutive, 1);
    assert!(!inertia.triggered);
    assert_close(inertia.penalty_rate, 0.0);
}

#[test]
fn sustained_danger_run_is_penalized_in_the_long_term_score() {
    let config = learning_defaults();

    let outcome = score_long_term(&[0, 3, 3, 3, 0], 1.0, None, &config);

    assert_eq!(
        outcome.zones,
        vec![
            ZoneState::Safe,
            ZoneState::Danger,
            ZoneState::Danger,
            ZoneState::Danger,
            ZoneState::Safe
        ]
    );
    assert_eq!(outcome.monthly_scores, vec![100.0, 18.0, 24.0, 24.0, 100.0]);
    assert_close(outcome.inertia.penalty_rate, 0.30);
    assert_close(outcome.result.value, 37.4);
    assert_eq!(outcome.risk_level, RiskLevel::HighRisk);
    assert_eq!(outcome.result.color_tier, ColorTier::Red);
}

#[test]
fn single_meltdown_caps_the_whole_series() {
    let config = learning_defaults();

    let outcome = score_long_term(&[0, 0, 0, 0, 0, 6], 1.0, Some(0), &config);

    assert!(outcome.meltdown);
    assert!(outcome.base_score > 40.0);
    assert!(outcome.result.value <= 40.0);
    assert_eq!(outcome.risk_level, RiskLevel::PreAccident);
    assert_eq!(outcome.result.evidence_bool("has_meltdown"), Some(true));
}

#[test]
fn recent_danger_month_lands_on_the_watch_list() {
    let config = learning_defaults();

    let outcome = score_long_term(&[0, 0, 0, 0, 3], 1.0, Some(0), &config);

    assert_eq!(outcome.risk_level, RiskLevel::WatchList);
    assert_eq!(outcome.result.color_tier, ColorTier::Yellow);
}

#[test]
fn clean_series_is_safe() {
    let config = learning_defaults();

    let outcome = score_long_term(&[1, 1, 0, 0], 2.0, Some(1), &config);

    assert_eq!(outcome.risk_level, RiskLevel::Safe);
    assert_eq!(outcome.result.color_tier, ColorTier::Green);
    assert!(outcome.result.evidence_f64("slope").is_some_and(|slope| slope < 0.0));
}

#[test]
fn empty_series_is_unknown() {
    let config = learning_defaults();

    let outcome = score_long_term(&[], 1.0, None, &config);

    assert_close(outcome.result.value, 0.0);
    assert_eq!(outcome.result.color_tier, ColorTier::Gray);
    assert_eq!(outcome.risk_level, RiskLevel::Unknown);
}
