use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::composite::{self, CompositeOutcome, DimensionScores};
use super::domain::{ColorTier, Grade, PerformanceEntry, ScoreResult, TrainingRecord};
use super::learning::{self, RiskLevel};
use super::period::YearMonth;
use super::stability::{self, StabilityWindow};
use super::{performance, safety, training};
use crate::ruleset::{ConfigProvider, ScoringConfig, StoreError};

const DEFAULT_RAW_SCORE: f64 = 95.0;
const FALLBACK_DURATION_DAYS: u32 = 30;
const DEFAULT_GROUP_AVERAGE: f64 = 1.0;

fn default_group_average() -> f64 {
    DEFAULT_GROUP_AVERAGE
}

/// One month's performance assessment. A missing grade reads as `B+`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub month: YearMonth,
    #[serde(default)]
    pub grade: Option<Grade>,
    #[serde(default)]
    pub raw_score: Option<f64>,
}

/// One safety inspection finding. Only positive severities count as violations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub month: YearMonth,
    pub severity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyScore {
    pub month: YearMonth,
    pub score: f64,
}

/// Records for one employee, already filtered to `start..=end` by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecords {
    pub employee_id: String,
    pub start: YearMonth,
    pub end: YearMonth,
    #[serde(default)]
    pub performance: Vec<PerformanceRecord>,
    #[serde(default)]
    pub violations: Vec<ViolationRecord>,
    #[serde(default)]
    pub training: Vec<TrainingRecord>,
    #[serde(default)]
    pub cert_years: Option<f64>,
    /// Team average violations per month, used for the learning water-lines.
    #[serde(default = "default_group_average")]
    pub group_avg_violations: f64,
    /// Violations in the month before `start`.
    #[serde(default)]
    pub previous_month_violations: Option<u32>,
    /// Earlier comprehensive scores, used only for the stability volatility tip.
    #[serde(default)]
    pub comprehensive_history: Vec<MonthlyScore>,
}

impl EmployeeRecords {
    pub fn new(employee_id: impl Into<String>, start: YearMonth, end: YearMonth) -> Self {
        Self {
            employee_id: employee_id.into(),
            start,
            end,
            performance: Vec::new(),
            violations: Vec::new(),
            training: Vec::new(),
            cert_years: None,
            group_avg_violations: DEFAULT_GROUP_AVERAGE,
            previous_month_violations: None,
            comprehensive_history: Vec::new(),
        }
    }

    pub fn is_single_month(&self) -> bool {
        self.start >= self.end
    }

    /// Days from the first day of `start` through the last day of `end`.
    pub fn duration_days(&self) -> u32 {
        let first = self.start.first_day();
        let after_last = self.end.shift(1).first_day();
        let (Some(first), Some(after_last)) = (first, after_last) else {
            return FALLBACK_DURATION_DAYS;
        };
        u32::try_from((after_last - first).num_days())
            .ok()
            .filter(|days| *days > 0)
            .unwrap_or(FALLBACK_DURATION_DAYS)
    }

    /// Thirty-day months between the first days of `start` and `end`, at least one.
    pub fn months_active(&self) -> u32 {
        let (Some(first), Some(last)) = (self.start.first_day(), self.end.first_day()) else {
            return 1;
        };
        let days = (last - first).num_days().max(0);
        u32::try_from(days / 30 + 1).unwrap_or(1).max(1)
    }

    fn violations_by_month(&self) -> BTreeMap<YearMonth, Vec<f64>> {
        let mut grouped: BTreeMap<YearMonth, Vec<f64>> = BTreeMap::new();
        for violation in self.violations.iter().filter(|violation| violation.severity > 0.0) {
            grouped.entry(violation.month).or_default().push(violation.severity);
        }
        grouped
    }
}

/// Every dimension of one employee's evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub employee_id: String,
    pub start: YearMonth,
    pub end: YearMonth,
    pub performance: ScoreResult,
    pub safety: ScoreResult,
    pub training: ScoreResult,
    pub learning: ScoreResult,
    pub stability: ScoreResult,
    #[serde(default)]
    pub learning_risk_level: Option<RiskLevel>,
    pub composite: CompositeOutcome,
}

impl Scorecard {
    pub fn dimensions(&self) -> DimensionScores {
        DimensionScores {
            performance: self.performance.value,
            safety: self.safety.value,
            training: self.training.value,
            stability: self.stability.value,
            learning: self.learning.value,
        }
    }
}

/// Runs every scorer against the configuration supplied by `P`.
#[derive(Debug, Clone)]
pub struct ScoringEngine<P> {
    provider: P,
}

impl<P> ScoringEngine<P>
where
    P: ConfigProvider,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Score one employee. Only fails when the configuration cannot be read.
    pub fn score(&self, records: &EmployeeRecords) -> Result<Scorecard, StoreError> {
        let config = self.provider.active_config()?;
        debug!(
            employee = %records.employee_id,
            start = %records.start,
            end = %records.end,
            "scoring employee"
        );
        Ok(scorecard(records, &config))
    }
}

/// Pure scorecard computation against an explicit configuration.
pub fn scorecard(records: &EmployeeRecords, config: &ScoringConfig) -> Scorecard {
    let violations_by_month = records.violations_by_month();

    let performance = score_performance(records, config);

    let severities: Vec<f64> = violations_by_month.values().flatten().copied().collect();
    let safety = safety::score_dual_track(&severities, records.months_active(), &config.safety);

    let training = training::score_training(
        &records.training,
        records.duration_days(),
        records.cert_years,
        &config.training,
    );

    let (learning, learning_risk_level) = score_learning(records, &violations_by_month, config);

    let comprehensive_history: BTreeMap<YearMonth, f64> = records
        .comprehensive_history
        .iter()
        .map(|entry| (entry.month, entry.score))
        .collect();
    let window = StabilityWindow::from_violations(
        &violations_by_month,
        Some(records.start),
        records.end,
        config,
    )
    .with_comprehensive_scores(&comprehensive_history)
    .with_safety_tip(safety.value);
    let stability = stability::score_volatility(&window, config);

    let dimensions = DimensionScores {
        performance: performance.value,
        safety: safety.value,
        training: training.value,
        stability: stability.value,
        learning: learning.value,
    };
    let latest_month_violations = month_count(&violations_by_month, records.end);
    let composite = composite::aggregate(&dimensions, latest_month_violations, config);

    Scorecard {
        employee_id: records.employee_id.clone(),
        start: records.start,
        end: records.end,
        performance,
        safety,
        training,
        learning,
        stability,
        learning_risk_level,
        composite,
    }
}

fn score_performance(records: &EmployeeRecords, config: &ScoringConfig) -> ScoreResult {
    let mut assessed = records.performance.clone();
    assessed.sort_by_key(|record| record.month);

    match assessed.as_slice() {
        [] => ScoreResult::new(0.0, ColorTier::Gray, "no data").with_evidence("mode", "none"),
        [only] if records.is_single_month() => performance::score_monthly(
            only.grade.unwrap_or(Grade::BPlus),
            only.raw_score.unwrap_or(DEFAULT_RAW_SCORE),
            &config.performance,
        ),
        many => {
            let entries: Vec<PerformanceEntry> = many
                .iter()
                .map(|record| {
                    let grade = record.grade.unwrap_or(Grade::BPlus);
                    PerformanceEntry::new(grade, record.month.to_string())
                })
                .collect();
            performance::score_period(&entries, records.end, &config.performance)
        }
    }
}

fn score_learning(
    records: &EmployeeRecords,
    violations_by_month: &BTreeMap<YearMonth, Vec<f64>>,
    config: &ScoringConfig,
) -> (ScoreResult, Option<RiskLevel>) {
    if records.is_single_month() {
        let decision = learning::classify_month(
            month_count(violations_by_month, records.end),
            records.previous_month_violations,
            records.group_avg_violations,
            &config.learning,
        );
        return (decision.to_score_result(), None);
    }

    let counts: Vec<u32> = YearMonth::range(records.start, records.end)
        .into_iter()
        .map(|month| month_count(violations_by_month, month))
        .collect();
    let long_term = learning::score_long_term(
        &counts,
        records.group_avg_violations,
        records.previous_month_violations,
        &config.learning,
    );
    (long_term.result, Some(long_term.risk_level))
}

fn month_count(violations_by_month: &BTreeMap<YearMonth, Vec<f64>>, month: YearMonth) -> u32 {
    violations_by_month
        .get(&month)
        .map_or(0, |violations| u32::try_from(violations.len()).unwrap_or(u32::MAX))
}
