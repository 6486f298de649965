//! Typed scoring configuration, the built-in presets and the audited store
//! that owns the active rule set.

mod diff;
mod presets;
mod provider;
mod repository;
mod schema;
mod store;
mod validation;

pub use diff::{diff_snapshots, flatten, ConfigDiff};
pub use presets::{builtin_presets, PresetDefinition, PRESET_KEYS};
pub use provider::{ConfigProvider, FixedConfig};
pub use repository::{
    Actor, ConfigAction, ConfigChangeLogEntry, ConfigRepository, ConfigSnapshot, ConfigTarget,
    InMemoryConfigRepository, LogDraft, LogId, RepositoryError, StoreCommit, StoreState,
};
pub use schema::*;
pub use store::{
    ActiveConfigInfo, ConfigMutationResult, ConfigStore, LogDetail, LogSummary, StoreError,
};
pub use validation::{validate_config, validate_document, ConfigValidationError, ValidationVerdict};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sections every configuration document must carry.
pub const REQUIRED_SECTIONS: [&str; 5] = [
    "performance",
    "safety",
    "training",
    "comprehensive",
    "key_personnel",
];

/// Complete parameter set for every scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub performance: PerformanceConfig,
    pub safety: SafetyConfig,
    pub training: TrainingConfig,
    pub comprehensive: ComprehensiveConfig,
    pub key_personnel: KeyPersonnelConfig,
    #[serde(rename = "learning_new", default)]
    pub learning: LearningConfig,
    #[serde(rename = "stability_new", default)]
    pub stability: StabilityConfig,
    #[serde(default)]
    pub nine_grid: NineGridConfig,
}

impl ScoringConfig {
    /// Parse a JSON document, checking required sections and converting
    /// percentage-style weights to fractions. Bounds are not checked here; see
    /// [`validate_config`].
    pub fn from_value(document: &Value) -> Result<Self, ConfigValidationError> {
        let object = document.as_object().ok_or_else(|| {
            ConfigValidationError::Malformed("configuration must be a JSON object".to_string())
        })?;

        if let Some(missing) = REQUIRED_SECTIONS
            .iter()
            .find(|section| !object.contains_key(**section))
        {
            return Err(ConfigValidationError::MissingSection(*missing));
        }

        let mut config: ScoringConfig = serde_json::from_value(document.clone())
            .map_err(|err| ConfigValidationError::Malformed(err.to_string()))?;
        config.normalize_legacy_weights();
        Ok(config)
    }

    pub fn to_value(&self) -> Value {
        // Every field is a plain number, string, bool or list; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Weights summing to roughly 100 were written as percentages.
    fn normalize_legacy_weights(&mut self) {
        let weights = &mut self.comprehensive.score_weights;
        if weights.total() > 1.5 {
            *weights = weights.scaled(0.01);
        }
    }

    /// Safety low-level tip threshold, defaulting to the safety fail score.
    pub fn stability_low_level_threshold(&self) -> f64 {
        self.stability
            .low_level_threshold
            .unwrap_or(self.safety.thresholds.fail_score)
    }
}
