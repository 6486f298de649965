//! What-if scoring of hand-written samples against a candidate configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{round_to, Grade, ScoreResult, TrainingRecord};
use super::{performance, safety, training};
use crate::ruleset::{ScoreWeights, ScoringConfig};

const SAMPLE_RAW_SCORE: f64 = 95.0;
const SAMPLE_TRAINING_DAYS: u32 = 90;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationSample {
    #[serde(default)]
    pub performance: Option<PerformanceSample>,
    #[serde(default)]
    pub safety: Option<SafetySample>,
    #[serde(default)]
    pub training: Option<TrainingSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    #[serde(default)]
    pub grades: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetySample {
    #[serde(default)]
    pub violations: Vec<f64>,
}

/// `is_qualified` accepts booleans or legacy 0/1 flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    #[serde(default)]
    pub scores: Vec<f64>,
    #[serde(default)]
    pub is_qualified: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedGrade {
    pub grade: String,
    pub score: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedViolation {
    pub violation_score: f64,
    pub score: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedTraining {
    pub index: usize,
    pub input_score: f64,
    pub is_qualified: bool,
    pub final_score: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedComprehensive {
    pub score: f64,
    pub weights: ScoreWeights,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub performance: Vec<SimulatedGrade>,
    pub safety: Vec<SimulatedViolation>,
    pub training: Vec<SimulatedTraining>,
    pub comprehensive: Option<SimulatedComprehensive>,
    pub errors: Vec<String>,
}

/// Score each sample item on its own. Bad items are reported in `errors` and
/// skipped; nothing is persisted.
pub fn simulate(config: &ScoringConfig, sample: &SimulationSample) -> SimulationReport {
    let mut report = SimulationReport::default();

    if let Some(sample) = &sample.performance {
        for grade in &sample.grades {
            let parsed = Grade::parse_lenient(grade);
            if !grade.trim().is_empty() && !parsed.label().eq_ignore_ascii_case(grade.trim()) {
                report.errors.push(format!("performance: unknown grade `{grade}`"));
                continue;
            }
            let result = performance::score_monthly(parsed, SAMPLE_RAW_SCORE, &config.performance);
            report.performance.push(SimulatedGrade {
                grade: grade.clone(),
                score: result.value,
                label: result.alert_tag,
            });
        }
    }

    if let Some(sample) = &sample.safety {
        for &violation in &sample.violations {
            if !violation.is_finite() || violation < 0.0 {
                report.errors.push(format!("safety: invalid violation score {violation}"));
                continue;
            }
            let result = safety::score_dual_track(&[violation], 1, &config.safety);
            report.safety.push(SimulatedViolation {
                violation_score: violation,
                score: result.value,
                label: result.alert_tag,
            });
        }
    }

    if let Some(sample) = &sample.training {
        simulate_training(sample, config, &mut report);
    }

    if let (Some(grade), Some(violation), Some(trained)) = (
        report.performance.first(),
        report.safety.first(),
        report.training.first(),
    ) {
        let weights = config.comprehensive.score_weights;
        let score = grade.score * weights.performance
            + violation.score * weights.safety
            + trained.final_score * weights.training;
        report.comprehensive = Some(SimulatedComprehensive {
            score: round_to(score, 1),
            weights,
        });
    }

    report
}

fn simulate_training(sample: &TrainingSample, config: &ScoringConfig, report: &mut SimulationReport) {
    if sample.scores.len() != sample.is_qualified.len() {
        report.errors.push(format!(
            "training: {} scores but {} qualification flags",
            sample.scores.len(),
            sample.is_qualified.len()
        ));
        return;
    }

    for (index, (&score, flag)) in sample.scores.iter().zip(&sample.is_qualified).enumerate() {
        let Some(qualified) = qualification(flag) else {
            report
                .errors
                .push(format!("training: sample {} has an unreadable qualification flag", index + 1));
            continue;
        };
        if !score.is_finite() {
            report
                .errors
                .push(format!("training: sample {} has an invalid score", index + 1));
            continue;
        }
        let record = TrainingRecord {
            score: Some(score),
            is_qualified: Some(qualified),
            is_disqualified: Some(!qualified),
            date: None,
        };
        let result: ScoreResult = training::score_training(
            std::slice::from_ref(&record),
            SAMPLE_TRAINING_DAYS,
            None,
            &config.training,
        );
        report.training.push(SimulatedTraining {
            index: index + 1,
            input_score: score,
            is_qualified: qualified,
            final_score: result.value,
            label: result.alert_tag,
        });
    }
}

fn qualification(flag: &Value) -> Option<bool> {
    match flag {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|value| value != 0.0),
        _ => None,
    }
}
