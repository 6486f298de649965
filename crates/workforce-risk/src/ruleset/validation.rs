use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ScoringConfig;
use crate::scoring::domain::Grade;

/// Reason a configuration document was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("missing required section `{0}`")]
    MissingSection(&'static str),
    #[error("configuration is malformed: {0}")]
    Malformed(String),
    #[error("{field} must be a finite number")]
    NotANumber { field: String },
    #[error("{field} out of range [{min}, {max}]: {value}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("score weights must sum to 1.0, got {total}")]
    WeightSum { total: f64 },
    #[error("{field}: lower bound {low} exceeds upper bound {high}")]
    InvertedRange { field: String, low: f64, high: f64 },
}

/// `(is_valid, reason)` pair reported to operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub reason: String,
}

impl ValidationVerdict {
    pub fn of(document: &Value) -> Self {
        match validate_document(document) {
            Ok(_) => Self {
                is_valid: true,
                reason: "configuration is valid".to_string(),
            },
            Err(err) => Self {
                is_valid: false,
                reason: err.to_string(),
            },
        }
    }
}

/// Parse and validate a document in one step.
pub fn validate_document(document: &Value) -> Result<ScoringConfig, ConfigValidationError> {
    let config = ScoringConfig::from_value(document)?;
    validate_config(&config)?;
    Ok(config)
}

const WEIGHT_TOLERANCE: f64 = 0.01;

pub fn validate_config(config: &ScoringConfig) -> Result<(), ConfigValidationError> {
    let performance = &config.performance;
    for grade in Grade::ALL {
        let field = format!("grade coefficient {grade}");
        within(&field, performance.grade_coefficients.for_grade(grade), 0.0, 2.0)?;
        let band = performance.grade_ranges.band(grade);
        ordered(&format!("grade range {grade}"), band.min, band.max)?;
    }
    finite(
        "grade range D radar_override",
        performance.grade_ranges.d.radar_override,
    )?;
    for (field, value) in [
        ("contamination d_cap_score", performance.contamination_rules.d_cap_score),
        ("contamination c_cap_score", performance.contamination_rules.c_cap_score),
    ] {
        within(field, value, 0.0, 110.0)?;
    }
    within("time_decay decay_rate", performance.time_decay.decay_rate, 0.0, 1.0)?;

    let safety = &config.safety;
    within(
        "critical_threshold",
        safety.severity_track.critical_threshold,
        1.0,
        50.0,
    )?;
    for (index, band) in safety.severity_track.score_ranges.iter().enumerate() {
        finite(&format!("score_ranges[{index}] multiplier"), band.multiplier)?;
        if let (Some(min), Some(max)) = (band.min, band.max) {
            ordered(&format!("score_ranges[{index}]"), min, max)?;
        }
    }
    for (index, multiplier) in safety.behavior_track.freq_multipliers.iter().enumerate() {
        finite(&format!("freq_multipliers[{index}]"), *multiplier)?;
    }
    ordered(
        "safety thresholds",
        safety.thresholds.fail_score,
        safety.thresholds.warning_score,
    )?;

    let rules = &config.training.penalty_rules;
    within(
        "absolute fail_count",
        f64::from(rules.absolute_threshold.fail_count),
        1.0,
        10.0,
    )?;
    within(
        "absolute_threshold coefficient",
        rules.absolute_threshold.coefficient,
        0.0,
        2.0,
    )?;
    within("small_sample coefficient", rules.small_sample.coefficient, 0.0, 2.0)?;
    for (name, ladder) in rules.all_ladders() {
        for (index, rule) in ladder.iter().enumerate() {
            within(&format!("{name}[{index}] threshold"), rule.threshold, 0.0, 50.0)?;
            finite(&format!("{name}[{index}] coefficient"), rule.coefficient)?;
        }
    }
    let durations = &config.training.duration_thresholds;
    ordered(
        "duration thresholds",
        f64::from(durations.short_term_days),
        f64::from(durations.mid_term_days),
    )?;

    let weights = &config.comprehensive.score_weights;
    for (name, weight) in weights.entries() {
        within(&format!("score weight {name}"), weight, 0.0, 1.0)?;
    }
    let total = weights.total();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ConfigValidationError::WeightSum { total });
    }

    within(
        "key_personnel comprehensive_threshold",
        config.key_personnel.comprehensive_threshold,
        0.0,
        100.0,
    )?;

    let learning = &config.learning;
    for (name, factor) in learning.factors() {
        within(name, factor, 0.0, 2.0)?;
    }
    within("inertia_step", learning.inertia_step, 0.0, 1.0)?;
    within("inertia_max_penalty", learning.inertia_max_penalty, 0.0, 1.0)?;
    within("time_decay_rate", learning.time_decay_rate, 0.0, 1.0)?;

    let stability = &config.stability;
    ordered(
        "stability score bounds",
        stability.score_floor,
        stability.score_ceiling,
    )?;
    if stability.min_effective_months < 1 {
        return Err(ConfigValidationError::OutOfRange {
            field: "min_effective_months".to_string(),
            value: f64::from(stability.min_effective_months),
            min: 1.0,
            max: f64::from(u32::MAX),
        });
    }
    Ok(())
}

fn finite(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigValidationError::NotANumber {
            field: field.to_string(),
        })
    }
}

fn within(field: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigValidationError> {
    finite(field, value)?;
    if value < min || value > max {
        return Err(ConfigValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn ordered(field: &str, low: f64, high: f64) -> Result<(), ConfigValidationError> {
    finite(field, low)?;
    finite(field, high)?;
    if low > high {
        return Err(ConfigValidationError::InvertedRange {
            field: field.to_string(),
            low,
            high,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::builtin_presets;

    fn standard() -> ScoringConfig {
        builtin_presets()
            .into_iter()
            .find(|preset| preset.key == "standard")
            .map(|preset| preset.config)
            .expect("standard preset exists")
    }

    #[test]
    fn grade_coefficient_above_two_is_rejected() {
        let mut config = standard();
        config.performance.grade_coefficients.a = 2.5;

        match validate_config(&config) {
            Err(ConfigValidationError::OutOfRange { field, value, .. }) => {
                assert_eq!(field, "grade coefficient A");
                assert_eq!(value, 2.5);
            }
            other => panic!("expected out of range, got {other:?}"),
        }
    }

    #[test]
    fn weights_off_by_more_than_tolerance_are_rejected() {
        let mut config = standard();
        config.comprehensive.score_weights.learning = 0.2;

        match validate_config(&config) {
            Err(ConfigValidationError::WeightSum { total }) => {
                assert!((total - 1.15).abs() < 1e-9);
            }
            other => panic!("expected weight sum error, got {other:?}"),
        }
    }

    #[test]
    fn weights_within_tolerance_are_accepted() {
        let mut config = standard();
        config.comprehensive.score_weights.learning = 0.055;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn nan_coefficient_is_not_a_number() {
        let mut config = standard();
        config.performance.grade_coefficients.c = f64::NAN;

        match validate_config(&config) {
            Err(ConfigValidationError::NotANumber { field }) => {
                assert_eq!(field, "grade coefficient C");
            }
            other => panic!("expected not-a-number, got {other:?}"),
        }
    }

    #[test]
    fn critical_threshold_and_fail_count_bounds() {
        let mut config = standard();
        config.safety.severity_track.critical_threshold = 0.5;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigValidationError::OutOfRange { .. })
        ));

        let mut config = standard();
        config.training.penalty_rules.absolute_threshold.fail_count = 11;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn inverted_safety_thresholds_are_rejected() {
        let mut config = standard();
        config.safety.thresholds.fail_score = 95.0;

        match validate_config(&config) {
            Err(ConfigValidationError::InvertedRange { field, .. }) => {
                assert_eq!(field, "safety thresholds");
            }
            other => panic!("expected inverted range, got {other:?}"),
        }
    }

    #[test]
    fn verdict_reports_reason_text() {
        let verdict = ValidationVerdict::of(&serde_json::json!({"performance": {}}));
        assert!(!verdict.is_valid);
        assert_eq!(verdict.reason, "missing required section `safety`");

        let verdict = ValidationVerdict::of(&standard().to_value());
        assert!(verdict.is_valid);
    }
}
