use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Monthly performance grade as recorded by the assessment process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    D,
    C,
    B,
    #[serde(rename = "B+")]
    BPlus,
    A,
}

impl Grade {
    pub const ALL: [Grade; 5] = [Grade::D, Grade::C, Grade::B, Grade::BPlus, Grade::A];

    /// Reads a grade the way upstream exports spell it; blank or unknown values count as `B+`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "D" => Grade::D,
            "C" => Grade::C,
            "B" => Grade::B,
            "A" => Grade::A,
            _ => Grade::BPlus,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Grade::D => "D",
            Grade::C => "C",
            Grade::B => "B",
            Grade::BPlus => "B+",
            Grade::A => "A",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display tier attached to every score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorTier {
    Green,
    Yellow,
    Orange,
    Red,
    Purple,
    Gold,
    Gray,
}

impl ColorTier {
    pub const fn label(self) -> &'static str {
        match self {
            ColorTier::Green => "GREEN",
            ColorTier::Yellow => "YELLOW",
            ColorTier::Orange => "ORANGE",
            ColorTier::Red => "RED",
            ColorTier::Purple => "PURPLE",
            ColorTier::Gold => "GOLD",
            ColorTier::Gray => "GRAY",
        }
    }
}

/// Output of every scorer. Never persisted; recomputed per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub value: f64,
    pub color_tier: ColorTier,
    pub alert_tag: String,
    #[serde(default)]
    pub evidence: BTreeMap<String, Value>,
}

impl ScoreResult {
    pub fn new(value: f64, color_tier: ColorTier, alert_tag: impl Into<String>) -> Self {
        Self {
            value: round_to(value, 1),
            color_tier,
            alert_tag: alert_tag.into(),
            evidence: BTreeMap::new(),
        }
    }

    pub fn with_evidence(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.evidence.insert(key.to_string(), value.into());
        self
    }

    pub fn evidence_f64(&self, key: &str) -> Option<f64> {
        self.evidence.get(key).and_then(Value::as_f64)
    }

    pub fn evidence_str(&self, key: &str) -> Option<&str> {
        self.evidence.get(key).and_then(Value::as_str)
    }

    pub fn evidence_bool(&self, key: &str) -> Option<bool> {
        self.evidence.get(key).and_then(Value::as_bool)
    }
}

/// Per-period classification used by the long-term learning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneState {
    Safe,
    Danger,
    Critical,
}

impl ZoneState {
    pub const fn is_risky(self) -> bool {
        matches!(self, ZoneState::Danger | ZoneState::Critical)
    }

    pub const fn label(self) -> &'static str {
        match self {
            ZoneState::Safe => "SAFE",
            ZoneState::Danger => "DANGER",
            ZoneState::Critical => "CRITICAL",
        }
    }
}

/// One graded month. `month` is `YYYY-MM` or `YYYY-MM-DD`; unparsable values keep full weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub grade: Grade,
    #[serde(default)]
    pub month: Option<String>,
}

impl PerformanceEntry {
    pub fn new(grade: Grade, month: impl Into<String>) -> Self {
        Self {
            grade,
            month: Some(month.into()),
        }
    }

    pub fn undated(grade: Grade) -> Self {
        Self { grade, month: None }
    }
}

/// Training or practical-assessment outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub is_qualified: Option<bool>,
    #[serde(default)]
    pub is_disqualified: Option<bool>,
    #[serde(default)]
    pub date: Option<String>,
}

impl TrainingRecord {
    pub fn passed(score: f64) -> Self {
        Self {
            score: Some(score),
            is_qualified: Some(true),
            is_disqualified: Some(false),
            date: None,
        }
    }

    pub fn failed(score: f64) -> Self {
        Self {
            score: Some(score),
            is_qualified: Some(false),
            is_disqualified: Some(true),
            date: None,
        }
    }

    /// A record counts as a failure when disqualified, unqualified, or scored zero.
    pub fn is_failure(&self) -> bool {
        self.is_disqualified == Some(true)
            || self.is_qualified == Some(false)
            || self.score_value() == 0.0
    }

    pub fn score_value(&self) -> f64 {
        match self.score {
            Some(score) if score.is_finite() => score,
            _ => 0.0,
        }
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_parsing_defaults_to_b_plus() {
        assert_eq!(Grade::parse_lenient(" d "), Grade::D);
        assert_eq!(Grade::parse_lenient("a"), Grade::A);
        assert_eq!(Grade::parse_lenient(""), Grade::BPlus);
        assert_eq!(Grade::parse_lenient("excellent"), Grade::BPlus);
    }

    #[test]
    fn grade_serializes_with_plus_sign() {
        let encoded = serde_json::to_string(&Grade::BPlus).expect("serializes");
        assert_eq!(encoded, "\"B+\"");
    }

    #[test]
    fn training_failure_covers_every_flag() {
        assert!(TrainingRecord::failed(80.0).is_failure());
        assert!(!TrainingRecord::passed(80.0).is_failure());
        let zero = TrainingRecord {
            score: Some(0.0),
            is_qualified: Some(true),
            is_disqualified: Some(false),
            date: None,
        };
        assert!(zero.is_failure());
        let missing = TrainingRecord {
            score: None,
            is_qualified: None,
            is_disqualified: None,
            date: None,
        };
        assert!(missing.is_failure());
    }
}
