use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{round_to, ColorTier, ScoreResult, TrainingRecord};
use super::rules::{descending_by, first_admitting};
use crate::ruleset::{Cohort, TrainingConfig};

/// Alert level reported alongside the training score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    Normal,
    Notice,
    Warning,
    HighRisk,
    Critical,
}

impl AlertLevel {
    pub const fn label(self) -> &'static str {
        match self {
            AlertLevel::Normal => "NORMAL",
            AlertLevel::Notice => "NOTICE",
            AlertLevel::Warning => "WARNING",
            AlertLevel::HighRisk => "HIGH_RISK",
            AlertLevel::Critical => "CRITICAL",
        }
    }

    fn from_coefficient(coefficient: f64) -> Self {
        if coefficient <= 0.5 {
            AlertLevel::Critical
        } else if coefficient <= 0.8 {
            AlertLevel::Warning
        } else {
            AlertLevel::Notice
        }
    }

    fn tier(self) -> ColorTier {
        match self {
            AlertLevel::Normal => ColorTier::Green,
            AlertLevel::Notice => ColorTier::Yellow,
            AlertLevel::Warning => ColorTier::Orange,
            AlertLevel::HighRisk => ColorTier::Purple,
            AlertLevel::Critical => ColorTier::Red,
        }
    }

    fn default_label(self) -> &'static str {
        match self {
            AlertLevel::Critical => "high-frequency failure",
            AlertLevel::Warning => "elevated failure rate",
            _ => "occasional failure",
        }
    }
}

struct Penalty {
    coefficient: f64,
    level: AlertLevel,
    tag: String,
    ladder: Option<LadderHit>,
}

struct LadderHit {
    cohort: Cohort,
    afr: f64,
    threshold: Option<f64>,
}

impl Penalty {
    fn none() -> Self {
        Self {
            coefficient: 1.0,
            level: AlertLevel::Normal,
            tag: "competent".to_string(),
            ladder: None,
        }
    }
}

/// Training score with failure penalties and tenure-aware annualization.
///
/// `duration_days` is the length of the reporting period; `cert_years` the
/// years since certification, unknown for new hires.
pub fn score_training(
    records: &[TrainingRecord],
    duration_days: u32,
    cert_years: Option<f64>,
    config: &TrainingConfig,
) -> ScoreResult {
    if records.is_empty() {
        return score_absence(duration_days, config);
    }

    let total_ops = records.len();
    let fail_count = records.iter().filter(|record| record.is_failure()).count();
    let avg_score =
        records.iter().map(TrainingRecord::score_value).sum::<f64>() / total_ops as f64;

    let penalty = select_penalty(total_ops, fail_count, duration_days, cert_years, config);
    let final_score = avg_score * penalty.coefficient;

    let mut result = ScoreResult::new(final_score, penalty.level.tier(), penalty.tag)
        .with_evidence("total_ops", total_ops)
        .with_evidence("fail_count", fail_count)
        .with_evidence("duration_days", duration_days)
        .with_evidence("penalty_coefficient", penalty.coefficient)
        .with_evidence("original_score", round_to(avg_score, 1))
        .with_evidence("alert_level", penalty.level.label());
    if let Some(hit) = penalty.ladder {
        result = result
            .with_evidence("cohort", hit.cohort.label())
            .with_evidence("afr", round_to(hit.afr, 2))
            .with_evidence(
                "matched_threshold",
                hit.threshold.map_or(Value::Null, Value::from),
            );
    }
    result
}

fn score_absence(duration_days: u32, config: &TrainingConfig) -> ScoreResult {
    let thresholds = config.duration_thresholds;
    let defaults = thresholds.default_scores;
    let (value, level, tag) = if duration_days <= thresholds.short_term_days {
        (defaults.short, AlertLevel::Normal, "no training scheduled")
    } else if duration_days <= thresholds.mid_term_days {
        (defaults.mid, AlertLevel::Notice, "training overdue")
    } else {
        (defaults.long, AlertLevel::Critical, "prolonged training gap")
    };

    ScoreResult::new(value, level.tier(), tag)
        .with_evidence("total_ops", 0)
        .with_evidence("fail_count", 0)
        .with_evidence("duration_days", duration_days)
        .with_evidence("penalty_coefficient", 1.0)
        .with_evidence("original_score", value)
        .with_evidence("alert_level", level.label())
}

fn select_penalty(
    total_ops: usize,
    fail_count: usize,
    duration_days: u32,
    cert_years: Option<f64>,
    config: &TrainingConfig,
) -> Penalty {
    let rules = &config.penalty_rules;
    let sample_size = rules.small_sample.sample_size as usize;

    if fail_count >= rules.absolute_threshold.fail_count as usize {
        return Penalty {
            coefficient: rules.absolute_threshold.coefficient,
            level: AlertLevel::Critical,
            tag: format!("frequent disqualification ({fail_count} failures)"),
            ladder: None,
        };
    }

    if total_ops < sample_size {
        if fail_count == 0 {
            return Penalty::none();
        }
        return Penalty {
            coefficient: rules.small_sample.coefficient,
            level: AlertLevel::HighRisk,
            tag: "failure in small sample, needs mentoring".to_string(),
            ladder: None,
        };
    }

    let afr = fail_count as f64 / f64::from(duration_days.max(1)) * 365.0;
    let cohort = Cohort::from_cert_years(cert_years);
    let ladder = descending_by(rules.ladder_for(cohort), |rule| rule.threshold);

    match first_admitting(ladder, afr) {
        Some(rule) => {
            let level = AlertLevel::from_coefficient(rule.coefficient);
            let label = rule.label.as_deref().unwrap_or(level.default_label());
            Penalty {
                coefficient: rule.coefficient,
                level,
                tag: format!("{label} (annualized {afr:.1})"),
                ladder: Some(LadderHit {
                    cohort,
                    afr,
                    threshold: Some(rule.threshold),
                }),
            }
        }
        None => Penalty {
            ladder: Some(LadderHit {
                cohort,
                afr,
                threshold: None,
            }),
            ..Penalty::none()
        },
    }
}
