//! Learning-ability models.
//!
//! The monthly model scores momentum between two consecutive composite
//! scores. The long-term model classifies each month's violation count into a
//! risk zone against dynamic water-lines, then aggregates with a recency
//! weighting and a penalty for sustained time in danger.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{round_to, ColorTier, ScoreResult, ZoneState};
use crate::ruleset::LearningConfig;

const MOMENTUM_GAIN: f64 = 1.5;
const MELTDOWN_CAP: f64 = 40.0;
const PRE_ACCIDENT_PENALTY: f64 = 0.4;
const DANGER_BASE: f64 = 60.0;
const SAFE_BASE: f64 = 95.0;
const GROUP_CALIBRATION_BONUS: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MomentumTier {
    HighPlateau,
    LowPlateau,
    BigGain,
    BigLoss,
    SmallGain,
    Flat,
    SmallLoss,
}

impl MomentumTier {
    pub const fn label(self) -> &'static str {
        match self {
            MomentumTier::HighPlateau => "HIGH_PLATEAU",
            MomentumTier::LowPlateau => "LOW_PLATEAU",
            MomentumTier::BigGain => "BIG_GAIN",
            MomentumTier::BigLoss => "BIG_LOSS",
            MomentumTier::SmallGain => "SMALL_GAIN",
            MomentumTier::Flat => "FLAT",
            MomentumTier::SmallLoss => "SMALL_LOSS",
        }
    }
}

/// Momentum score: current position plus 1.5x the month-over-month change.
/// New hires pass `previous == current`.
pub fn score_monthly(current: f64, previous: f64) -> ScoreResult {
    let delta = current - previous;
    let mut score = current + delta * MOMENTUM_GAIN;

    let (tier, color, tag) = if current >= 95.0 && delta >= -2.0 {
        score = score.max(100.0);
        (MomentumTier::HighPlateau, ColorTier::Gold, "top performer holding level".to_string())
    } else if current < 70.0 && delta <= 0.0 {
        score *= 0.8;
        (MomentumTier::LowPlateau, ColorTier::Red, "low and not improving".to_string())
    } else if delta > 10.0 {
        (MomentumTier::BigGain, ColorTier::Gold, format!("rapid improvement (+{delta:.1})"))
    } else if delta < -10.0 {
        (MomentumTier::BigLoss, ColorTier::Red, format!("sharp decline ({delta:.1})"))
    } else if delta > 0.0 {
        (MomentumTier::SmallGain, ColorTier::Green, format!("steady progress (+{delta:.1})"))
    } else if delta < 0.0 {
        (MomentumTier::SmallLoss, ColorTier::Yellow, format!("slight decline ({delta:.1})"))
    } else {
        (MomentumTier::Flat, ColorTier::Green, "holding steady".to_string())
    };

    ScoreResult::new(score.max(0.0), color, tag)
        .with_evidence("delta", round_to(delta, 1))
        .with_evidence("tier", tier.label())
        .with_evidence("mode", "monthly")
}

/// How a month's count moved relative to the month before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendType {
    Meltdown,
    HighImprovement,
    Solidification,
    Deterioration,
    ColdStartWarning,
    Improvement,
    SafeStable,
    SafeFluctuation,
    ColdStartGood,
}

impl TrendType {
    pub const fn label(self) -> &'static str {
        match self {
            TrendType::Meltdown => "meltdown",
            TrendType::HighImprovement => "high_improvement",
            TrendType::Solidification => "solidification",
            TrendType::Deterioration => "deterioration",
            TrendType::ColdStartWarning => "cold_start_warning",
            TrendType::Improvement => "improvement",
            TrendType::SafeStable => "safe_stable",
            TrendType::SafeFluctuation => "safe_fluctuation",
            TrendType::ColdStartGood => "cold_start_good",
        }
    }
}

/// One month's zone classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDecision {
    pub zone: ZoneState,
    pub score: f64,
    pub count: u32,
    pub trend: TrendType,
    pub warning_line: f64,
    pub critical_line: f64,
    pub color_tier: ColorTier,
    pub alert_tag: String,
}

impl ZoneDecision {
    pub fn to_score_result(&self) -> ScoreResult {
        ScoreResult::new(self.score, self.color_tier, self.alert_tag.clone())
            .with_evidence("zone", self.zone.label())
            .with_evidence("count", self.count)
            .with_evidence("trend_type", self.trend.label())
            .with_evidence("warning_line", round_to(self.warning_line, 1))
            .with_evidence("critical_line", round_to(self.critical_line, 1))
    }
}

/// Dynamic water-lines for a group average.
pub fn water_lines(group_avg: f64, config: &LearningConfig) -> (f64, f64) {
    let mut warning_line = (group_avg * config.trend_warning_ratio)
        .max(config.trend_warning_floor)
        .max(config.historical_baseline);
    if config.trend_ceiling_floor > 0.0 {
        warning_line = warning_line.min(config.trend_ceiling_floor);
    }
    let critical_line = (group_avg * config.trend_critical_ratio)
        .max(config.trend_critical_floor)
        .max(warning_line + 1.0);
    (warning_line, critical_line)
}

/// Classify one month's violation count. `previous` is the prior month's
/// count, `None` for a cold start.
pub fn classify_month(
    current: u32,
    previous: Option<u32>,
    group_avg: f64,
    config: &LearningConfig,
) -> ZoneDecision {
    let (warning_line, critical_line) = water_lines(group_avg, config);
    let count = f64::from(current);

    if count >= critical_line {
        return ZoneDecision {
            zone: ZoneState::Critical,
            score: 0.0,
            count: current,
            trend: TrendType::Meltdown,
            warning_line,
            critical_line,
            color_tier: ColorTier::Red,
            alert_tag: format!("meltdown line reached ({current} >= {critical_line:.0})"),
        };
    }

    let (zone, base, factor, trend, color_tier, tag) = if count >= warning_line {
        match previous.map(|previous| current.cmp(&previous)) {
            Some(std::cmp::Ordering::Less) => (
                ZoneState::Danger,
                DANGER_BASE,
                config.mitigation_factor(),
                TrendType::HighImprovement,
                ColorTier::Yellow,
                "improving but still in danger",
            ),
            Some(std::cmp::Ordering::Equal) => (
                ZoneState::Danger,
                DANGER_BASE,
                config.factor_solidification,
                TrendType::Solidification,
                ColorTier::Orange,
                "risk solidifying",
            ),
            Some(std::cmp::Ordering::Greater) => (
                ZoneState::Danger,
                DANGER_BASE,
                config.factor_deterioration,
                TrendType::Deterioration,
                ColorTier::Red,
                "deteriorating at high level",
            ),
            None => (
                ZoneState::Danger,
                DANGER_BASE,
                config.factor_warning,
                TrendType::ColdStartWarning,
                ColorTier::Yellow,
                "starting in danger",
            ),
        }
    } else {
        match previous.map(|previous| current.cmp(&previous)) {
            Some(std::cmp::Ordering::Less) => (
                ZoneState::Safe,
                SAFE_BASE,
                config.reward_factor(),
                TrendType::Improvement,
                ColorTier::Green,
                "continuing to improve",
            ),
            Some(std::cmp::Ordering::Equal) => (
                ZoneState::Safe,
                SAFE_BASE,
                config.factor_stable,
                TrendType::SafeStable,
                ColorTier::Green,
                "holding steady",
            ),
            Some(std::cmp::Ordering::Greater) => (
                ZoneState::Safe,
                SAFE_BASE,
                config.factor_safe_fluctuation,
                TrendType::SafeFluctuation,
                ColorTier::Yellow,
                "safe with fluctuation",
            ),
            None => (
                ZoneState::Safe,
                SAFE_BASE,
                config.factor_stable,
                TrendType::ColdStartGood,
                ColorTier::Green,
                "good start",
            ),
        }
    };

    let mut score = base * factor;
    if count < group_avg {
        score *= GROUP_CALIBRATION_BONUS;
    }

    ZoneDecision {
        zone,
        score: round_to(score.clamp(0.0, 100.0), 1),
        count: current,
        trend,
        warning_line,
        critical_line,
        color_tier,
        alert_tag: tag.to_string(),
    }
}

/// Penalty for the longest run of risky months.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskInertia {
    pub max_consecutive: u32,
    pub penalty_rate: f64,
    pub triggered: bool,
}

pub fn inertia_penalty(zones: &[ZoneState], config: &LearningConfig) -> RiskInertia {
    let mut max_consecutive = 0u32;
    let mut current = 0u32;
    for zone in zones {
        if zone.is_risky() {
            current += 1;
            max_consecutive = max_consecutive.max(current);
        } else {
            current = 0;
        }
    }

    let start = config.inertia_start_months;
    let triggered = max_consecutive >= start && max_consecutive > 0;
    let penalty_rate = if triggered {
        let raw = f64::from(max_consecutive - start + 1) * config.inertia_step;
        round_to(raw.min(config.inertia_max_penalty), 3)
    } else {
        0.0
    };

    RiskInertia {
        max_consecutive,
        penalty_rate,
        triggered,
    }
}

/// Dashboard risk level for the long-term model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Safe,
    WatchList,
    HighRisk,
    PreAccident,
    Unknown,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::WatchList => "WATCH_LIST",
            RiskLevel::HighRisk => "HIGH_RISK",
            RiskLevel::PreAccident => "PRE_ACCIDENT",
            RiskLevel::Unknown => "UNKNOWN",
        }
    }
}

/// Long-term aggregation with everything a dashboard needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermLearning {
    pub result: ScoreResult,
    pub risk_level: RiskLevel,
    pub zones: Vec<ZoneState>,
    pub monthly_scores: Vec<f64>,
    pub base_score: f64,
    pub inertia: RiskInertia,
    pub meltdown: bool,
}

/// Risk-inertia aggregation over consecutive monthly violation counts.
///
/// `initial_previous` is the count for the month before the series, used for
/// the first month's trend. Any CRITICAL month caps the result at 40.
pub fn score_long_term(
    counts: &[u32],
    group_avg: f64,
    initial_previous: Option<u32>,
    config: &LearningConfig,
) -> LongTermLearning {
    if counts.is_empty() {
        let result = ScoreResult::new(0.0, ColorTier::Gray, "no data")
            .with_evidence("risk_level", RiskLevel::Unknown.label())
            .with_evidence("months", 0);
        return LongTermLearning {
            result,
            risk_level: RiskLevel::Unknown,
            zones: Vec::new(),
            monthly_scores: Vec::new(),
            base_score: 0.0,
            inertia: RiskInertia {
                max_consecutive: 0,
                penalty_rate: 0.0,
                triggered: false,
            },
            meltdown: false,
        };
    }

    let mut previous = initial_previous;
    let decisions: Vec<ZoneDecision> = counts
        .iter()
        .map(|&count| {
            let decision = classify_month(count, previous, group_avg, config);
            previous = Some(count);
            decision
        })
        .collect();

    let zones: Vec<ZoneState> = decisions.iter().map(|decision| decision.zone).collect();
    let monthly_scores: Vec<f64> = decisions.iter().map(|decision| decision.score).collect();
    let meltdown = zones.contains(&ZoneState::Critical);

    let base_score = recency_weighted_mean(&monthly_scores, config.time_decay_rate);
    let inertia = inertia_penalty(&zones, config);

    let mut final_score = base_score * (1.0 - inertia.penalty_rate);
    if meltdown {
        final_score = final_score.min(MELTDOWN_CAP);
    }
    let final_score = round_to(final_score.max(0.0), 1);

    let percent = inertia.penalty_rate * 100.0;
    let (risk_level, color, tag) = if inertia.penalty_rate >= PRE_ACCIDENT_PENALTY || meltdown {
        let tag = if meltdown {
            "pre-accident: meltdown recorded".to_string()
        } else {
            format!("pre-accident: inertia penalty {percent:.0}%")
        };
        (RiskLevel::PreAccident, ColorTier::Red, tag)
    } else if final_score < 60.0 {
        if inertia.penalty_rate > 0.0 {
            let tag = format!("high risk: inertia penalty {percent:.0}%");
            (RiskLevel::HighRisk, ColorTier::Red, tag)
        } else {
            let tag = format!("high risk: score {final_score}");
            (RiskLevel::HighRisk, ColorTier::Orange, tag)
        }
    } else if zones.len() >= 2 && zones[zones.len() - 2..].contains(&ZoneState::Danger) {
        (RiskLevel::WatchList, ColorTier::Yellow, "watch list".to_string())
    } else {
        (RiskLevel::Safe, ColorTier::Green, "in good standing".to_string())
    };

    let raw: Vec<f64> = counts.iter().map(|&count| f64::from(count)).collect();
    let average = raw.iter().sum::<f64>() / raw.len() as f64;
    let zone_labels: Vec<Value> = zones.iter().map(|zone| Value::from(zone.label())).collect();

    let result = ScoreResult::new(final_score, color, tag)
        .with_evidence("mode", "long_term")
        .with_evidence("risk_level", risk_level.label())
        .with_evidence("base_score", round_to(base_score, 1))
        .with_evidence("inertia_penalty_rate", inertia.penalty_rate)
        .with_evidence("max_consecutive_danger", inertia.max_consecutive)
        .with_evidence("has_meltdown", meltdown)
        .with_evidence("zone_sequence", zone_labels)
        .with_evidence("monthly_scores", monthly_scores.clone())
        .with_evidence("slope", round_to(least_squares_slope(&raw), 2))
        .with_evidence("average_score", round_to(average, 1))
        .with_evidence("months", counts.len());

    LongTermLearning {
        result,
        risk_level,
        zones,
        monthly_scores,
        base_score,
        inertia,
        meltdown,
    }
}

/// Weighted mean with weight `1 + i * decay`, so later entries count more.
pub(crate) fn recency_weighted_mean(values: &[f64], decay: f64) -> f64 {
    let (weighted, total) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(weighted, total), (index, value)| {
            let weight = 1.0 + index as f64 * decay;
            (weighted + value * weight, total + weight)
        });
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

fn least_squares_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;
    let (numerator, denominator) =
        values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(numerator, denominator), (index, value)| {
                let dx = index as f64 - mean_x;
                (numerator + dx * (value - mean_y), denominator + dx * dx)
            });
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
