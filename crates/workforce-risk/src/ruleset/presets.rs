use serde::{Deserialize, Serialize};

use super::schema::*;
use super::ScoringConfig;

/// Keys of the presets created at bootstrap, in display order.
pub const PRESET_KEYS: [&str; 3] = ["strict", "standard", "lenient"];

/// Named, editable rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetDefinition {
    pub key: String,
    pub name: String,
    pub description: String,
    pub config: ScoringConfig,
}

pub fn builtin_presets() -> Vec<PresetDefinition> {
    vec![
        PresetDefinition {
            key: "strict".to_string(),
            name: "Strict".to_string(),
            description: "Heavier penalties for high-assurance rosters.".to_string(),
            config: strict(),
        },
        PresetDefinition {
            key: "standard".to_string(),
            name: "Standard".to_string(),
            description: "Balanced penalties between fairness and incentive.".to_string(),
            config: standard(),
        },
        PresetDefinition {
            key: "lenient".to_string(),
            name: "Lenient".to_string(),
            description: "Softer penalties for trainees and onboarding cohorts.".to_string(),
            config: lenient(),
        },
    ]
}

fn afr(threshold: f64, coefficient: f64, label: &str) -> AfrRule {
    AfrRule {
        threshold,
        coefficient,
        label: Some(label.to_string()),
    }
}

fn ladder(thresholds: [f64; 3], coefficients: [f64; 3]) -> Vec<AfrRule> {
    let labels = [
        "high-frequency failure",
        "elevated failure rate",
        "occasional failure",
    ];
    thresholds
        .into_iter()
        .zip(coefficients)
        .zip(labels)
        .map(|((threshold, coefficient), label)| afr(threshold, coefficient, label))
        .collect()
}

fn severity_bands(multipliers: [f64; 3]) -> Vec<SeverityBand> {
    vec![
        SeverityBand {
            min: None,
            max: Some(3.0),
            multiplier: multipliers[0],
        },
        SeverityBand {
            min: Some(3.0),
            max: Some(5.0),
            multiplier: multipliers[1],
        },
        SeverityBand {
            min: Some(5.0),
            max: None,
            multiplier: multipliers[2],
        },
    ]
}

fn standard() -> ScoringConfig {
    ScoringConfig {
        performance: PerformanceConfig {
            grade_coefficients: GradeCoefficients {
                d: 0.0,
                c: 0.6,
                b: 0.9,
                b_plus: 1.0,
                a: 1.1,
            },
            grade_ranges: GradeRanges {
                d: LockedGradeRange {
                    min: 0.0,
                    max: 79.9,
                    radar_override: 50.0,
                },
                c: GradeRange { min: 80.0, max: 89.9 },
                b: GradeRange { min: 90.0, max: 94.9 },
                b_plus: GradeRange { min: 95.0, max: 99.9 },
                a: GradeRange {
                    min: 100.0,
                    max: 110.0,
                },
            },
            contamination_rules: ContaminationRules {
                d_count_threshold: 1.0,
                c_count_threshold: 2.0,
                d_cap_score: 90.0,
                c_cap_score: 94.9,
            },
            time_decay: TimeDecay::default(),
        },
        safety: SafetyConfig {
            behavior_track: BehaviorTrack {
                freq_thresholds: [2.0, 5.0, 6.0],
                freq_multipliers: [1.2, 3.0, 6.0],
            },
            severity_track: SeverityTrack {
                score_ranges: severity_bands([1.3, 3.25, 6.5]),
                critical_threshold: 12.0,
            },
            thresholds: SafetyThresholds {
                fail_score: 60.0,
                warning_score: 90.0,
            },
        },
        training: TrainingConfig {
            penalty_rules: PenaltyRules {
                absolute_threshold: AbsoluteThreshold {
                    fail_count: 3,
                    coefficient: 0.5,
                },
                small_sample: SmallSample {
                    sample_size: 10,
                    coefficient: 0.85,
                },
                afr_thresholds: ladder([2.5, 1.5, 0.5], [0.5, 0.7, 0.9]),
                afr_thresholds_new_employee: Some(ladder([15.0, 8.0, 4.0], [0.70, 0.80, 0.90])),
                afr_thresholds_experienced: Some(ladder([10.0, 5.0, 2.0], [0.60, 0.75, 0.90])),
            },
            duration_thresholds: DurationThresholds {
                short_term_days: 60,
                mid_term_days: 180,
                default_scores: DefaultScores {
                    short: 65.0,
                    mid: 50.0,
                    long: 0.0,
                },
            },
        },
        comprehensive: ComprehensiveConfig {
            score_weights: ScoreWeights {
                performance: 0.35,
                safety: 0.30,
                training: 0.20,
                stability: 0.10,
                learning: 0.05,
            },
        },
        key_personnel: KeyPersonnelConfig {
            comprehensive_threshold: 70.0,
            monthly_violation_threshold: 3,
        },
        learning: LearningConfig {
            trend_ceiling_floor: 5.0,
            trend_warning_ratio: 1.5,
            trend_warning_floor: 4.0,
            trend_critical_ratio: 3.0,
            trend_critical_floor: 6.0,
            historical_baseline: 3.0,
            factor_reward: Some(1.2),
            factor_stable: 1.0,
            factor_safe_fluctuation: 0.9,
            factor_mitigation: Some(0.8),
            factor_warning: 0.6,
            factor_improvement: None,
            factor_high_improvement: None,
            factor_solidification: 0.4,
            factor_deterioration: 0.3,
            inertia_start_months: 2,
            inertia_step: 0.05,
            inertia_max_penalty: 0.40,
            time_decay_rate: 0.2,
        },
        stability: StabilityConfig::default(),
        nine_grid: NineGridConfig::default(),
    }
}

fn strict() -> ScoringConfig {
    let mut config = standard();
    config.performance.contamination_rules = ContaminationRules {
        d_count_threshold: 1.0,
        c_count_threshold: 2.0,
        d_cap_score: 85.0,
        c_cap_score: 92.0,
    };
    config.safety.severity_track.score_ranges = severity_bands([1.5, 3.75, 7.5]);

    let rules = &mut config.training.penalty_rules;
    rules.absolute_threshold.coefficient = 0.45;
    rules.small_sample.coefficient = 0.80;
    rules.afr_thresholds = ladder([2.5, 1.5, 0.5], [0.4, 0.6, 0.85]);
    rules.afr_thresholds_new_employee = Some(ladder([15.0, 8.0, 4.0], [0.65, 0.75, 0.85]));
    rules.afr_thresholds_experienced = Some(ladder([10.0, 5.0, 2.0], [0.55, 0.70, 0.85]));

    config.key_personnel = KeyPersonnelConfig {
        comprehensive_threshold: 75.0,
        monthly_violation_threshold: 2,
    };
    config.learning.inertia_step = 0.10;
    config
}

fn lenient() -> ScoringConfig {
    let mut config = standard();
    config.performance.contamination_rules = ContaminationRules {
        d_count_threshold: 1.0,
        c_count_threshold: 3.0,
        d_cap_score: 95.0,
        c_cap_score: 97.0,
    };
    config.safety.severity_track.score_ranges = severity_bands([0.8, 2.0, 4.0]);

    let rules = &mut config.training.penalty_rules;
    rules.absolute_threshold = AbsoluteThreshold {
        fail_count: 4,
        coefficient: 0.60,
    };
    rules.small_sample.coefficient = 0.90;
    rules.afr_thresholds = ladder([3.0, 2.0, 0.8], [0.6, 0.8, 0.95]);
    rules.afr_thresholds_new_employee = Some(ladder([15.0, 8.0, 4.0], [0.75, 0.85, 0.95]));
    rules.afr_thresholds_experienced = Some(ladder([10.0, 5.0, 2.0], [0.70, 0.80, 0.95]));

    config.key_personnel = KeyPersonnelConfig {
        comprehensive_threshold: 65.0,
        monthly_violation_threshold: 4,
    };
    config.learning.inertia_start_months = 4;
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::validate_config;

    #[test]
    fn every_builtin_preset_passes_validation() {
        for preset in builtin_presets() {
            if let Err(err) = validate_config(&preset.config) {
                panic!("preset {} rejected: {err}", preset.key);
            }
        }
    }

    #[test]
    fn preset_keys_match_definitions() {
        let keys: Vec<String> = builtin_presets().into_iter().map(|preset| preset.key).collect();
        assert_eq!(keys, PRESET_KEYS.map(str::to_string).to_vec());
    }

    #[test]
    fn strict_is_harsher_than_lenient() {
        let strict = strict();
        let lenient = lenient();
        assert!(
            strict.performance.contamination_rules.d_cap_score
                < lenient.performance.contamination_rules.d_cap_score
        );
        assert!(
            strict.training.penalty_rules.absolute_threshold.coefficient
                < lenient.training.penalty_rules.absolute_threshold.coefficient
        );
        assert!(
            strict.key_personnel.comprehensive_threshold
                > lenient.key_personnel.comprehensive_threshold
        );
    }
}
