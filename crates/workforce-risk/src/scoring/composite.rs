use serde::{Deserialize, Serialize};

use super::domain::{round_to, ColorTier};
use crate::ruleset::ScoringConfig;

/// Final values of the five dimensions for one employee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub performance: f64,
    pub safety: f64,
    pub training: f64,
    pub stability: f64,
    pub learning: f64,
}

/// `Σ score × weight` over the five dimensions.
pub fn comprehensive_score(scores: &DimensionScores, config: &ScoringConfig) -> f64 {
    let weights = config.comprehensive.score_weights;
    let total = scores.performance * weights.performance
        + scores.safety * weights.safety
        + scores.training * weights.training
        + scores.stability * weights.stability
        + scores.learning * weights.learning;
    round_to(total, 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisLevel {
    Low,
    Mid,
    High,
}

impl AxisLevel {
    pub fn of(value: f64) -> Self {
        if value >= 90.0 {
            AxisLevel::High
        } else if value >= 75.0 {
            AxisLevel::Mid
        } else {
            AxisLevel::Low
        }
    }

    const fn rank(self) -> u8 {
        match self {
            AxisLevel::Low => 1,
            AxisLevel::Mid => 2,
            AxisLevel::High => 3,
        }
    }
}

/// A cell of the 3x3 talent matrix. Row 1 is the top (high Y), column 3 the
/// right (high X).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NineGridCell {
    pub row: u8,
    pub column: u8,
    pub x_level: AxisLevel,
    pub y_level: AxisLevel,
    pub label: String,
}

impl NineGridCell {
    pub fn locate(x_level: AxisLevel, y_level: AxisLevel) -> Self {
        Self {
            row: 4 - y_level.rank(),
            column: x_level.rank(),
            x_level,
            y_level,
            label: cell_label(x_level, y_level).to_string(),
        }
    }
}

fn cell_label(x_level: AxisLevel, y_level: AxisLevel) -> &'static str {
    use AxisLevel::{High, Low, Mid};
    match (y_level, x_level) {
        (High, High) => "core talent",
        (High, Mid) => "high potential",
        (High, Low) => "raw potential",
        (Mid, High) => "solid performer",
        (Mid, Mid) => "steady contributor",
        (Mid, Low) => "needs coaching",
        (Low, High) => "volatile expert",
        (Low, Mid) => "watch list",
        (Low, Low) => "at-risk",
    }
}

/// Placement of one employee on the nine-grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NineGridPlacement {
    pub x: f64,
    pub y: f64,
    pub cell: NineGridCell,
}

/// X is the weighted mean of performance, safety and training; Y the weighted
/// mean of stability and learning. Weights are renormalized within each axis.
pub fn nine_grid(scores: &DimensionScores, config: &ScoringConfig) -> NineGridPlacement {
    let weights = config.comprehensive.score_weights;
    let x = weighted_mean(&[
        (scores.performance, weights.performance),
        (scores.safety, weights.safety),
        (scores.training, weights.training),
    ]);
    let y_weights = config.nine_grid.y_axis_weights;
    let y = weighted_mean(&[
        (scores.stability, y_weights.stability),
        (scores.learning, y_weights.learning),
    ]);

    NineGridPlacement {
        x: round_to(x, 1),
        y: round_to(y, 1),
        cell: NineGridCell::locate(AxisLevel::of(x), AxisLevel::of(y)),
    }
}

/// Falls back to the plain mean when the weights do not sum to anything positive.
fn weighted_mean(pairs: &[(f64, f64)]) -> f64 {
    let total: f64 = pairs.iter().map(|(_, weight)| weight).sum();
    if total > 0.0 {
        pairs.iter().map(|(value, weight)| value * weight).sum::<f64>() / total
    } else if pairs.is_empty() {
        0.0
    } else {
        pairs.iter().map(|(value, _)| value).sum::<f64>() / pairs.len() as f64
    }
}

/// Why an employee was flagged for key-personnel follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPersonnelReason {
    LowComprehensive,
    FrequentViolations,
}

/// Composite outcome: the weighted score, its tier, the grid placement and
/// any key-personnel flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeOutcome {
    pub comprehensive: f64,
    pub color_tier: ColorTier,
    pub nine_grid: NineGridPlacement,
    pub key_personnel: bool,
    pub key_personnel_reasons: Vec<KeyPersonnelReason>,
}

/// Aggregate the five dimensions. `latest_month_violations` is the count of
/// safety violations in the most recent month of the period.
pub fn aggregate(
    scores: &DimensionScores,
    latest_month_violations: u32,
    config: &ScoringConfig,
) -> CompositeOutcome {
    let comprehensive = comprehensive_score(scores, config);
    let thresholds = config.key_personnel;

    let mut reasons = Vec::new();
    if comprehensive < thresholds.comprehensive_threshold {
        reasons.push(KeyPersonnelReason::LowComprehensive);
    }
    if latest_month_violations >= thresholds.monthly_violation_threshold {
        reasons.push(KeyPersonnelReason::FrequentViolations);
    }
    let key_personnel = !reasons.is_empty();

    let color_tier = if key_personnel {
        ColorTier::Red
    } else if comprehensive >= 90.0 {
        ColorTier::Green
    } else if comprehensive >= 75.0 {
        ColorTier::Yellow
    } else {
        ColorTier::Orange
    };

    CompositeOutcome {
        comprehensive,
        color_tier,
        nine_grid: nine_grid(scores, config),
        key_personnel,
        key_personnel_reasons: reasons,
    }
}
