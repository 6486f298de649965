use serde::{Deserialize, Serialize};

use super::domain::{ColorTier, ScoreResult};
use super::rules::first_admitting;
use crate::ruleset::{BehaviorTrack, SafetyConfig, SeverityTrack};

/// Intermediate values of the dual-track model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyTracks {
    pub violation_count: usize,
    pub avg_freq: f64,
    pub score_a: f64,
    pub score_b: f64,
    pub has_critical: bool,
}

impl SafetyTracks {
    pub fn final_score(&self) -> f64 {
        self.score_a.min(self.score_b)
    }
}

/// Compute both tracks. `months_active` below one is treated as one.
pub fn tracks(violations: &[f64], months_active: u32, config: &SafetyConfig) -> SafetyTracks {
    let months = months_active.max(1);
    let violation_count = violations.len();
    let avg_freq = (violation_count as f64 / f64::from(months)).ceil();

    let score_a = (100.0 - frequency_deduction(avg_freq, &config.behavior_track)).max(0.0);
    let (severity_deduction, has_critical) = severity(violations, &config.severity_track);
    let score_b = (100.0 - severity_deduction).max(0.0);

    SafetyTracks {
        violation_count,
        avg_freq,
        score_a,
        score_b,
        has_critical,
    }
}

fn frequency_deduction(avg_freq: f64, track: &BehaviorTrack) -> f64 {
    let [low, mid, _] = track.freq_thresholds;
    let [low_rate, mid_rate, high_rate] = track.freq_multipliers;
    let rate = if avg_freq <= low {
        low_rate
    } else if avg_freq <= mid {
        mid_rate
    } else {
        high_rate
    };
    avg_freq * rate
}

fn severity(violations: &[f64], track: &SeverityTrack) -> (f64, bool) {
    violations
        .iter()
        .fold((0.0, false), |(deduction, critical), &value| {
            let multiplier =
                first_admitting(&track.score_ranges, value).map_or(1.0, |band| band.multiplier);
            (
                deduction + value * multiplier,
                critical || value >= track.critical_threshold,
            )
        })
}

/// Dual-track safety score: the lower of the frequency and severity tracks.
pub fn score_dual_track(violations: &[f64], months_active: u32, config: &SafetyConfig) -> ScoreResult {
    let tracks = tracks(violations, months_active, config);
    let final_score = tracks.final_score();
    let thresholds = config.thresholds;

    let (tier, tag) = if final_score < thresholds.fail_score || tracks.has_critical {
        if tracks.has_critical {
            (ColorTier::Red, "major redline violation")
        } else {
            (ColorTier::Red, "safety failed")
        }
    } else if final_score < thresholds.warning_score {
        if tracks.score_a < tracks.score_b {
            (ColorTier::Orange, "high-frequency violations")
        } else {
            (ColorTier::Orange, "excessive deductions")
        }
    } else {
        (ColorTier::Green, "safe")
    };

    ScoreResult::new(final_score, tier, tag)
        .with_evidence("score_a", tracks.score_a)
        .with_evidence("score_b", tracks.score_b)
        .with_evidence("violation_count", tracks.violation_count)
        .with_evidence("avg_freq", tracks.avg_freq)
        .with_evidence("has_critical", tracks.has_critical)
}
