use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{round_to, ColorTier, ScoreResult};
use super::learning::recency_weighted_mean;
use super::period::YearMonth;
use super::safety;
use crate::ruleset::{ScoringConfig, StabilityConfig, VolatilityMetric};

const EMPTY_WINDOW_SCORE: f64 = 50.0;
const ZERO_STREAK_MONTHS: usize = 3;
const TRAILING_MONTHS: i64 = 12;
const VETO_EPSILON: f64 = 0.001;

/// One month of the stability window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySafety {
    pub month: YearMonth,
    pub safety_score: f64,
    pub issue_count: usize,
    #[serde(default)]
    pub comprehensive_score: Option<f64>,
}

/// Monthly safety sub-scores plus the context the zero-month rule needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StabilityWindow {
    pub months: Vec<MonthlySafety>,
    /// Issue counts for the twelve months ending at the window end.
    pub trailing_issue_counts: Vec<usize>,
    /// Safety radar score used for the low-level tip; falls back to the window mean.
    #[serde(default)]
    pub safety_score_for_tip: Option<f64>,
}

impl StabilityWindow {
    /// Build the window from violation severities grouped by month. Each month
    /// is scored by the dual-track safety model with one active month.
    pub fn from_violations(
        violations_by_month: &BTreeMap<YearMonth, Vec<f64>>,
        start: Option<YearMonth>,
        end: YearMonth,
        config: &ScoringConfig,
    ) -> Self {
        let (window_start, window_end) = resolve_window(start, end, &config.stability);
        let months = YearMonth::range(window_start, window_end)
            .into_iter()
            .map(|month| {
                let violations = violations_by_month
                    .get(&month)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                MonthlySafety {
                    month,
                    safety_score: safety::tracks(violations, 1, &config.safety).final_score(),
                    issue_count: violations.len(),
                    comprehensive_score: None,
                }
            })
            .collect();

        let trailing_start = window_end.shift(1 - TRAILING_MONTHS);
        let trailing_issue_counts = YearMonth::range(trailing_start, window_end)
            .iter()
            .map(|month| violations_by_month.get(month).map_or(0, Vec::len))
            .collect();

        Self {
            months,
            trailing_issue_counts,
            safety_score_for_tip: None,
        }
    }

    pub fn with_comprehensive_scores(mut self, scores: &BTreeMap<YearMonth, f64>) -> Self {
        for month in &mut self.months {
            month.comprehensive_score = scores.get(&month.month).copied();
        }
        self
    }

    pub fn with_safety_tip(mut self, safety_score: f64) -> Self {
        self.safety_score_for_tip = Some(safety_score);
        self
    }
}

/// Window of `window_months` ending at `end`, clipped by `start`, then widened
/// back to at least `min_effective_months`.
pub fn resolve_window(
    start: Option<YearMonth>,
    end: YearMonth,
    config: &StabilityConfig,
) -> (YearMonth, YearMonth) {
    let mut window_start = end.shift(1 - i64::from(config.window_months));
    if let Some(start) = start {
        if start > window_start {
            window_start = start;
        }
    }
    let span = window_start.months_until(end) + 1;
    if span < i64::from(config.min_effective_months) {
        window_start = end.shift(1 - i64::from(config.min_effective_months));
    }
    (window_start, end)
}

/// Volatility-based stability score over the effective months of the window.
pub fn score_volatility(window: &StabilityWindow, config: &ScoringConfig) -> ScoreResult {
    let stability = &config.stability;
    if window.months.is_empty() {
        return ScoreResult::new(EMPTY_WINDOW_SCORE, ColorTier::Gray, "no data")
            .with_evidence("stability_label", "no data");
    }

    let effective = effective_months(window);
    let scores: Vec<f64> = effective.iter().map(|month| month.safety_score).collect();

    let metric = stability.volatility_metric;
    let metric_value = volatility(metric, &scores);
    let value =
        interpolate(metric_value, stability).clamp(stability.score_floor, stability.score_ceiling);

    let cutoffs = stability.label_cutoffs;
    let (tier, label) = if value >= cutoffs.stable {
        (ColorTier::Green, "stable")
    } else if value >= cutoffs.medium {
        (ColorTier::Orange, "volatile")
    } else {
        (ColorTier::Red, "highly volatile")
    };

    let safety_cv = coefficient_of_variation(&scores);
    let mean_safety = mean(&scores);
    let comprehensive: Vec<f64> = effective
        .iter()
        .filter_map(|month| month.comprehensive_score)
        .collect();
    let comprehensive_cv =
        (comprehensive.len() >= 2).then(|| coefficient_of_variation(&comprehensive));

    let volatility_tip = comprehensive_cv.and_then(|comprehensive_cv| {
        (safety_cv >= stability.high_vol_threshold
            && safety_cv > comprehensive_cv * stability.k_multiplier)
            .then_some("safety fluctuates more than overall performance")
    });
    let tip_basis = window
        .safety_score_for_tip
        .or_else(|| (!scores.is_empty()).then_some(mean_safety));
    let low_level_tip = tip_basis
        .filter(|basis| *basis <= config.stability_low_level_threshold())
        .map(|_| "overall safety level is low even if steady");
    let low_confidence = effective.len() < stability.min_effective_months as usize;
    let sample_tip = low_confidence.then_some("too few months for a reliable stability reading");

    let has_scores = !scores.is_empty();
    ScoreResult::new(value, tier, label)
        .with_evidence("stability_label", label)
        .with_evidence("volatility_metric", metric_key(metric))
        .with_evidence("volatility_metric_label", metric.label())
        .with_evidence("volatility_value", round_to(metric_value, 3))
        .with_evidence("coverage", format!("{}/{}", effective.len(), window.months.len()))
        .with_evidence("confidence", if low_confidence { "LOW" } else { "OK" })
        .with_evidence("safety_cv", rounded_or_null(has_scores.then_some(safety_cv), 3))
        .with_evidence("comprehensive_cv", rounded_or_null(comprehensive_cv, 3))
        .with_evidence("mean_safety", rounded_or_null(has_scores.then_some(mean_safety), 2))
        .with_evidence("volatility_tip", text_or_null(volatility_tip))
        .with_evidence("low_level_tip", text_or_null(low_level_tip))
        .with_evidence("sample_tip", text_or_null(sample_tip))
}

/// Zero-issue months count only when the trailing average is already below
/// one issue a month or they sit in a run of at least three.
fn effective_months(window: &StabilityWindow) -> Vec<&MonthlySafety> {
    let trailing_average = if window.trailing_issue_counts.is_empty() {
        0.0
    } else {
        window.trailing_issue_counts.iter().sum::<usize>() as f64
            / window.trailing_issue_counts.len() as f64
    };

    let mut streak_members = BTreeSet::new();
    let mut streak = Vec::new();
    for month in &window.months {
        if month.issue_count == 0 {
            streak.push(month.month);
        } else {
            if streak.len() >= ZERO_STREAK_MONTHS {
                streak_members.extend(streak.iter().copied());
            }
            streak.clear();
        }
    }
    if streak.len() >= ZERO_STREAK_MONTHS {
        streak_members.extend(streak);
    }

    window
        .months
        .iter()
        .filter(|month| {
            month.issue_count > 0 || trailing_average < 1.0 || streak_members.contains(&month.month)
        })
        .collect()
}

fn volatility(metric: VolatilityMetric, scores: &[f64]) -> f64 {
    match metric {
        VolatilityMetric::MeanAbsDelta => {
            if scores.len() < 2 {
                return 0.0;
            }
            let deltas: Vec<f64> = scores
                .windows(2)
                .map(|pair| (pair[1] - pair[0]).abs())
                .collect();
            mean(&deltas)
        }
        VolatilityMetric::Mad => {
            if scores.is_empty() {
                return 0.0;
            }
            let center = median(scores);
            let deviations: Vec<f64> = scores.iter().map(|score| (score - center).abs()).collect();
            median(&deviations)
        }
        VolatilityMetric::Cv => coefficient_of_variation(scores),
    }
}

fn interpolate(metric_value: f64, config: &StabilityConfig) -> f64 {
    let (low, high) = (config.score_map_low, config.score_map_high);
    let (low_score, high_score) = (config.score_map_low_score, config.score_map_high_score);
    if high == low {
        return (low_score + high_score) / 2.0;
    }
    let slope = (high_score - low_score) / (high - low);
    low_score + slope * (metric_value - low)
}

fn rounded_or_null(value: Option<f64>, decimals: i32) -> Value {
    value.map_or(Value::Null, |value| Value::from(round_to(value, decimals)))
}

fn text_or_null(text: Option<&str>) -> Value {
    text.map_or(Value::Null, Value::from)
}

fn metric_key(metric: VolatilityMetric) -> &'static str {
    match metric {
        VolatilityMetric::MeanAbsDelta => "mean_abs_delta",
        VolatilityMetric::Mad => "mad",
        VolatilityMetric::Cv => "cv",
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    match sorted.len() {
        0 => 0.0,
        len if len % 2 == 0 => (sorted[mid - 1] + sorted[mid]) / 2.0,
        _ => sorted[mid],
    }
}

/// Population standard deviation over the mean; zero for fewer than two
/// values or a non-positive mean.
fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let center = mean(values);
    if center <= 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|value| (value - center).powi(2)).sum::<f64>()
        / values.len() as f64;
    variance.sqrt() / center
}

/// A month in the period-aggregated stability variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodMonth {
    pub score: f64,
    #[serde(default)]
    pub has_redline: bool,
}

/// Period aggregation: any redline or zero month vetoes to 0, otherwise a
/// recency-weighted mean discounted by `1 - cv * sensitivity`.
pub fn score_period(months: &[PeriodMonth], config: &ScoringConfig) -> ScoreResult {
    if months
        .iter()
        .any(|month| month.has_redline || month.score <= VETO_EPSILON)
    {
        return ScoreResult::new(0.0, ColorTier::Red, "vetoed (redline or zero month)")
            .with_evidence("is_veto", true)
            .with_evidence("avg_score", 0.0)
            .with_evidence("cv_discount", 0.0)
            .with_evidence("cv", 0.0);
    }
    if months.is_empty() {
        return ScoreResult::new(100.0, ColorTier::Green, "stable")
            .with_evidence("is_veto", false)
            .with_evidence("avg_score", 100.0)
            .with_evidence("cv_discount", 1.0)
            .with_evidence("cv", 0.0);
    }

    let scores: Vec<f64> = months.iter().map(|month| month.score).collect();
    let avg_score = recency_weighted_mean(&scores, config.learning.time_decay_rate);
    let (cv, discount) = if scores.len() < 2 {
        (0.0, 1.0)
    } else {
        let cv = coefficient_of_variation(&scores);
        let discount = (1.0 - cv * config.stability.period_cv_sensitivity).clamp(0.0, 1.0);
        (cv, discount)
    };

    let value = avg_score * discount;
    let (tier, tag) = if value >= 80.0 {
        (ColorTier::Green, "stable")
    } else if value >= 60.0 {
        (ColorTier::Orange, "fluctuating")
    } else {
        (ColorTier::Red, "unstable")
    };

    ScoreResult::new(value, tier, tag)
        .with_evidence("is_veto", false)
        .with_evidence("avg_score", round_to(avg_score, 1))
        .with_evidence("cv_discount", round_to(discount, 3))
        .with_evidence("cv", round_to(cv, 3))
}
