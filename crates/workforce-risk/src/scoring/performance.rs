use super::domain::{round_to, ColorTier, Grade, PerformanceEntry, ScoreResult};
use super::period::YearMonth;
use super::rules::{first_satisfied, ThresholdRule};
use crate::ruleset::PerformanceConfig;

/// Coefficient 1.0 maps to this score.
const COEFFICIENT_ANCHOR: f64 = 95.0;
const PERIOD_CEILING: f64 = 110.0;
const EMPTY_PERIOD_SCORE: f64 = 95.0;

/// Single-month snapshot. D is locked to the configured override; every other
/// grade clamps the raw score into its band.
pub fn score_monthly(grade: Grade, raw_score: f64, config: &PerformanceConfig) -> ScoreResult {
    let ranges = &config.grade_ranges;
    let (value, tier, tag) = match grade {
        Grade::D => (ranges.d.radar_override, ColorTier::Red, "performance failed"),
        Grade::C => (ranges.c.clamp(raw_score), ColorTier::Orange, "performance warning"),
        Grade::B => (ranges.b.clamp(raw_score), ColorTier::Orange, "below baseline"),
        Grade::BPlus => (ranges.b_plus.clamp(raw_score), ColorTier::Green, "on target"),
        Grade::A => (ranges.a.clamp(raw_score), ColorTier::Green, "excellent"),
    };

    ScoreResult::new(value, tier, tag)
        .with_evidence("mode", "monthly")
        .with_evidence("grade", grade.label())
        .with_evidence("coefficient", config.grade_coefficients.for_grade(grade))
}

#[derive(Debug, Default, Clone, Copy)]
struct GradeCounts {
    d_raw: u32,
    c_raw: u32,
    d_effective: f64,
    c_effective: f64,
}

impl GradeCounts {
    fn record(&mut self, grade: Grade, weight: f64) {
        match grade {
            Grade::D => {
                self.d_raw += 1;
                self.d_effective += weight;
            }
            Grade::C => {
                self.c_raw += 1;
                self.c_effective += weight;
            }
            _ => {}
        }
    }

    fn effective(&self, grade: Grade) -> f64 {
        match grade {
            Grade::D => self.d_effective,
            Grade::C => self.c_effective,
            _ => 0.0,
        }
    }

    fn raw(&self, grade: Grade) -> u32 {
        match grade {
            Grade::D => self.d_raw,
            Grade::C => self.c_raw,
            _ => 0,
        }
    }
}

/// Contamination cap triggered once the effective count of `grade` reaches `threshold`.
struct ContaminationCap {
    grade: Grade,
    threshold: f64,
    cap: f64,
    tier: ColorTier,
    tag: &'static str,
}

impl ThresholdRule for ContaminationCap {
    fn admits(&self, value: f64) -> bool {
        value >= self.threshold
    }
}

/// Multi-month score from grade coefficients with D/C contamination caps.
///
/// Time decay applies only when enabled and every entry carries a month.
/// `reference` is the month decay is measured from; entries whose month
/// cannot be parsed keep full weight.
pub fn score_period(
    entries: &[PerformanceEntry],
    reference: YearMonth,
    config: &PerformanceConfig,
) -> ScoreResult {
    if entries.is_empty() {
        return ScoreResult::new(EMPTY_PERIOD_SCORE, ColorTier::Green, "no data")
            .with_evidence("mode", "period");
    }

    let decay = config.time_decay;
    let use_decay = decay.enabled && entries.iter().all(|entry| entry.month.is_some());

    let mut counts = GradeCounts::default();
    let mut coefficient_sum = 0.0;
    for entry in entries {
        coefficient_sum += config.grade_coefficients.for_grade(entry.grade);
        let weight = if use_decay {
            decay_weight(entry.month.as_deref(), reference, decay.decay_months, decay.decay_rate)
        } else {
            1.0
        };
        counts.record(entry.grade, weight);
    }

    let avg_coefficient = coefficient_sum / entries.len() as f64;
    let base_score = avg_coefficient * COEFFICIENT_ANCHOR;

    let rules = &config.contamination_rules;
    let caps = [
        ContaminationCap {
            grade: Grade::D,
            threshold: rules.d_count_threshold,
            cap: rules.d_cap_score,
            tier: ColorTier::Red,
            tag: "D grade on record",
        },
        ContaminationCap {
            grade: Grade::C,
            threshold: rules.c_count_threshold,
            cap: rules.c_cap_score,
            tier: ColorTier::Orange,
            tag: "repeated C grades",
        },
    ];

    let result = match first_satisfied(&caps, |cap| counts.effective(cap.grade)) {
        Some(cap) => {
            let effective = counts.effective(cap.grade);
            let tag = if use_decay && effective < f64::from(counts.raw(cap.grade)) {
                format!("{} (effective {effective:.1})", cap.tag)
            } else {
                cap.tag.to_string()
            };
            ScoreResult::new(base_score.min(cap.cap), cap.tier, tag)
                .with_evidence("contamination", cap.grade.label())
        }
        None => {
            let value = base_score.min(PERIOD_CEILING);
            let (tier, tag) = if value >= 95.0 {
                (ColorTier::Green, "on target overall")
            } else if value >= 80.0 {
                (ColorTier::Orange, "below baseline")
            } else {
                (ColorTier::Red, "failed overall")
            };
            ScoreResult::new(value, tier, tag)
        }
    };

    result
        .with_evidence("mode", "period")
        .with_evidence("months", entries.len())
        .with_evidence("avg_coefficient", round_to(avg_coefficient, 2))
        .with_evidence("d_count_raw", counts.d_raw)
        .with_evidence("d_count_effective", round_to(counts.d_effective, 2))
        .with_evidence("c_count_raw", counts.c_raw)
        .with_evidence("c_count_effective", round_to(counts.c_effective, 2))
        .with_evidence("time_decay_applied", use_decay)
}

fn decay_weight(month: Option<&str>, reference: YearMonth, window: u32, rate: f64) -> f64 {
    let Some(month) = month.and_then(YearMonth::parse) else {
        return 1.0;
    };
    let months_ago = month.months_until(reference).max(0);
    if months_ago > i64::from(window) {
        return 0.0;
    }
    rate.powi(months_ago as i32)
}
