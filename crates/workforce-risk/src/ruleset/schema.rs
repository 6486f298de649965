use serde::{Deserialize, Serialize};

use crate::scoring::domain::Grade;
use crate::scoring::rules::{Bounds, ThresholdRule};

/// Performance section: grade coefficients, clamping bands and contamination caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub grade_coefficients: GradeCoefficients,
    pub grade_ranges: GradeRanges,
    pub contamination_rules: ContaminationRules,
    #[serde(default)]
    pub time_decay: TimeDecay,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeCoefficients {
    #[serde(rename = "D")]
    pub d: f64,
    #[serde(rename = "C")]
    pub c: f64,
    #[serde(rename = "B")]
    pub b: f64,
    #[serde(rename = "B+")]
    pub b_plus: f64,
    #[serde(rename = "A")]
    pub a: f64,
}

impl GradeCoefficients {
    pub fn for_grade(&self, grade: Grade) -> f64 {
        match grade {
            Grade::D => self.d,
            Grade::C => self.c,
            Grade::B => self.b,
            Grade::BPlus => self.b_plus,
            Grade::A => self.a,
        }
    }
}

/// Inclusive clamping band for a monthly raw score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeRange {
    pub min: f64,
    pub max: f64,
}

impl GradeRange {
    pub fn clamp(&self, raw: f64) -> f64 {
        raw.max(self.min).min(self.max)
    }
}

/// The D band is locked: its monthly score is always `radar_override`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LockedGradeRange {
    pub min: f64,
    pub max: f64,
    pub radar_override: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeRanges {
    #[serde(rename = "D")]
    pub d: LockedGradeRange,
    #[serde(rename = "C")]
    pub c: GradeRange,
    #[serde(rename = "B")]
    pub b: GradeRange,
    #[serde(rename = "B+")]
    pub b_plus: GradeRange,
    #[serde(rename = "A")]
    pub a: GradeRange,
}

impl GradeRanges {
    pub fn band(&self, grade: Grade) -> GradeRange {
        match grade {
            Grade::D => GradeRange {
                min: self.d.min,
                max: self.d.max,
            },
            Grade::C => self.c,
            Grade::B => self.b,
            Grade::BPlus => self.b_plus,
            Grade::A => self.a,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContaminationRules {
    pub d_count_threshold: f64,
    pub c_count_threshold: f64,
    pub d_cap_score: f64,
    pub c_cap_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDecay {
    pub enabled: bool,
    pub decay_months: u32,
    pub decay_rate: f64,
}

impl Default for TimeDecay {
    fn default() -> Self {
        Self {
            enabled: true,
            decay_months: 6,
            decay_rate: 0.9,
        }
    }
}

/// Safety section: frequency track, severity track and alert thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyConfig {
    pub behavior_track: BehaviorTrack,
    pub severity_track: SeverityTrack,
    pub thresholds: SafetyThresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorTrack {
    pub freq_thresholds: [f64; 3],
    pub freq_multipliers: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityTrack {
    pub score_ranges: Vec<SeverityBand>,
    pub critical_threshold: f64,
}

/// Multiplier bucket for one violation value; see [`Bounds`] for interval semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub multiplier: f64,
}

impl SeverityBand {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.min, self.max)
    }
}

impl ThresholdRule for SeverityBand {
    fn admits(&self, value: f64) -> bool {
        self.bounds().admits(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyThresholds {
    pub fail_score: f64,
    pub warning_score: f64,
}

/// Training section: failure penalties and the zero-record duration policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub penalty_rules: PenaltyRules,
    pub duration_thresholds: DurationThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyRules {
    pub absolute_threshold: AbsoluteThreshold,
    pub small_sample: SmallSample,
    #[serde(default)]
    pub afr_thresholds: Vec<AfrRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afr_thresholds_new_employee: Option<Vec<AfrRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afr_thresholds_experienced: Option<Vec<AfrRule>>,
}

/// Tenure cohort selecting which AFR ladder applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    NewEmployee,
    Experienced,
}

impl Cohort {
    /// Unknown tenure or less than one certified year counts as new.
    pub fn from_cert_years(cert_years: Option<f64>) -> Self {
        match cert_years {
            Some(years) if years >= 1.0 => Cohort::Experienced,
            _ => Cohort::NewEmployee,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Cohort::NewEmployee => "new_employee",
            Cohort::Experienced => "experienced",
        }
    }
}

impl PenaltyRules {
    /// Cohort ladder, falling back to the shared `afr_thresholds` list.
    pub fn ladder_for(&self, cohort: Cohort) -> &[AfrRule] {
        let specific = match cohort {
            Cohort::NewEmployee => self.afr_thresholds_new_employee.as_deref(),
            Cohort::Experienced => self.afr_thresholds_experienced.as_deref(),
        };
        specific.unwrap_or(&self.afr_thresholds)
    }

    pub fn all_ladders(&self) -> impl Iterator<Item = (&'static str, &[AfrRule])> {
        [
            ("afr_thresholds", Some(self.afr_thresholds.as_slice())),
            (
                "afr_thresholds_new_employee",
                self.afr_thresholds_new_employee.as_deref(),
            ),
            (
                "afr_thresholds_experienced",
                self.afr_thresholds_experienced.as_deref(),
            ),
        ]
        .into_iter()
        .filter_map(|(name, ladder)| ladder.map(|rules| (name, rules)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteThreshold {
    pub fail_count: u32,
    pub coefficient: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmallSample {
    pub sample_size: u32,
    pub coefficient: f64,
}

/// One rung of an annualized-failure-rate ladder. Older documents spell the
/// threshold `min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfrRule {
    #[serde(alias = "min")]
    pub threshold: f64,
    pub coefficient: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ThresholdRule for AfrRule {
    fn admits(&self, value: f64) -> bool {
        value >= self.threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationThresholds {
    pub short_term_days: u32,
    pub mid_term_days: u32,
    pub default_scores: DefaultScores,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultScores {
    pub short: f64,
    pub mid: f64,
    pub long: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveConfig {
    pub score_weights: ScoreWeights,
}

/// Composite weights, stored as fractions of 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub performance: f64,
    pub safety: f64,
    pub training: f64,
    #[serde(default)]
    pub stability: f64,
    #[serde(default)]
    pub learning: f64,
}

impl ScoreWeights {
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("performance", self.performance),
            ("safety", self.safety),
            ("training", self.training),
            ("stability", self.stability),
            ("learning", self.learning),
        ]
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, weight)| weight).sum()
    }

    pub(crate) fn scaled(&self, factor: f64) -> Self {
        Self {
            performance: self.performance * factor,
            safety: self.safety * factor,
            training: self.training * factor,
            stability: self.stability * factor,
            learning: self.learning * factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyPersonnelConfig {
    pub comprehensive_threshold: f64,
    #[serde(default = "default_monthly_violation_threshold")]
    pub monthly_violation_threshold: u32,
}

fn default_monthly_violation_threshold() -> u32 {
    3
}

/// Parameters for the zone classifier and the risk-inertia aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub trend_ceiling_floor: f64,
    pub trend_warning_ratio: f64,
    pub trend_warning_floor: f64,
    pub trend_critical_ratio: f64,
    pub trend_critical_floor: f64,
    pub historical_baseline: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_reward: Option<f64>,
    pub factor_stable: f64,
    pub factor_safe_fluctuation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_mitigation: Option<f64>,
    pub factor_warning: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_improvement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_high_improvement: Option<f64>,
    pub factor_solidification: f64,
    pub factor_deterioration: f64,
    pub inertia_start_months: u32,
    pub inertia_step: f64,
    pub inertia_max_penalty: f64,
    pub time_decay_rate: f64,
}

impl LearningConfig {
    /// Reward for improving while safe; older documents call it `factor_improvement`.
    pub fn reward_factor(&self) -> f64 {
        self.factor_reward.or(self.factor_improvement).unwrap_or(1.2)
    }

    /// Factor for improving while still in danger; older documents call it
    /// `factor_high_improvement`.
    pub fn mitigation_factor(&self) -> f64 {
        self.factor_mitigation
            .or(self.factor_high_improvement)
            .unwrap_or(0.8)
    }

    pub fn factors(&self) -> [(&'static str, f64); 7] {
        [
            ("factor_reward", self.reward_factor()),
            ("factor_stable", self.factor_stable),
            ("factor_safe_fluctuation", self.factor_safe_fluctuation),
            ("factor_mitigation", self.mitigation_factor()),
            ("factor_warning", self.factor_warning),
            ("factor_solidification", self.factor_solidification),
            ("factor_deterioration", self.factor_deterioration),
        ]
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            trend_ceiling_floor: 5.0,
            trend_warning_ratio: 1.5,
            trend_warning_floor: 2.0,
            trend_critical_ratio: 3.0,
            trend_critical_floor: 5.0,
            historical_baseline: 3.0,
            factor_reward: None,
            factor_stable: 1.0,
            factor_safe_fluctuation: 0.9,
            factor_mitigation: None,
            factor_warning: 0.6,
            factor_improvement: None,
            factor_high_improvement: None,
            factor_solidification: 0.4,
            factor_deterioration: 0.3,
            inertia_start_months: 2,
            inertia_step: 0.15,
            inertia_max_penalty: 0.6,
            time_decay_rate: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityMetric {
    #[default]
    MeanAbsDelta,
    Mad,
    Cv,
}

impl VolatilityMetric {
    pub const fn label(self) -> &'static str {
        match self {
            VolatilityMetric::MeanAbsDelta => "Mean |Δ|",
            VolatilityMetric::Mad => "MAD",
            VolatilityMetric::Cv => "CV",
        }
    }
}

/// Parameters for the volatility-based stability model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub volatility_metric: VolatilityMetric,
    pub window_months: u32,
    pub min_effective_months: u32,
    pub high_vol_threshold: f64,
    pub k_multiplier: f64,
    pub score_floor: f64,
    pub score_ceiling: f64,
    pub score_map_low: f64,
    pub score_map_high: f64,
    pub score_map_low_score: f64,
    pub score_map_high_score: f64,
    pub label_cutoffs: LabelCutoffs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_level_threshold: Option<f64>,
    pub period_cv_sensitivity: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            volatility_metric: VolatilityMetric::MeanAbsDelta,
            window_months: 12,
            min_effective_months: 6,
            high_vol_threshold: 0.0667,
            k_multiplier: 1.2,
            score_floor: 40.0,
            score_ceiling: 100.0,
            score_map_low: 1.09,
            score_map_high: 6.0,
            score_map_low_score: 90.0,
            score_map_high_score: 60.0,
            label_cutoffs: LabelCutoffs::default(),
            low_level_threshold: None,
            period_cv_sensitivity: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelCutoffs {
    pub stable: f64,
    pub medium: f64,
}

impl Default for LabelCutoffs {
    fn default() -> Self {
        Self {
            stable: 75.0,
            medium: 60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NineGridConfig {
    pub y_axis_weights: YAxisWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YAxisWeights {
    pub stability: f64,
    pub learning: f64,
}

impl Default for YAxisWeights {
    fn default() -> Self {
        Self {
            stability: 0.4,
            learning: 0.6,
        }
    }
}
