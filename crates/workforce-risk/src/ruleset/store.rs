use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::diff::{diff_snapshots, ConfigDiff};
use super::presets::{builtin_presets, PresetDefinition};
use super::provider::ConfigProvider;
use super::repository::{
    Actor, ConfigAction, ConfigChangeLogEntry, ConfigRepository, ConfigSnapshot, ConfigTarget,
    LogDraft, LogId, RepositoryError, StoreCommit, StoreState,
};
use super::validation::{validate_document, ValidationVerdict};
use super::ScoringConfig;

/// Outcome of a configuration mutation. Business rejections are `success: false`
/// with a reason; only storage failures are errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMutationResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id: Option<LogId>,
}

impl ConfigMutationResult {
    fn applied(message: impl Into<String>, log_id: LogId) -> Self {
        Self {
            success: true,
            message: message.into(),
            log_id: Some(log_id),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            log_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveConfigInfo {
    pub based_on_preset: Option<String>,
    pub is_customized: bool,
    pub updated_at: DateTime<Utc>,
}

/// Log listing row without snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    pub id: LogId,
    pub action: ConfigAction,
    pub target: ConfigTarget,
    pub preset_name: Option<String>,
    pub reason: String,
    pub actor: Actor,
    pub timestamp: DateTime<Utc>,
}

impl From<&ConfigChangeLogEntry> for LogSummary {
    fn from(entry: &ConfigChangeLogEntry) -> Self {
        Self {
            id: entry.id,
            action: entry.action,
            target: entry.target.clone(),
            preset_name: entry.preset_name.clone(),
            reason: entry.reason.clone(),
            actor: entry.actor.clone(),
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogDetail {
    #[serde(flatten)]
    pub summary: LogSummary,
    pub diffs: Vec<ConfigDiff>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
}

struct CachedConfig {
    config: Arc<ScoringConfig>,
    loaded_at: Instant,
}

/// Owner of the active configuration, the preset catalogue and the audit log.
///
/// Reads go through a TTL cache. Every mutation is a read-modify-write against
/// the repository that commits exactly one log entry and drops this store's
/// cache before returning. Other stores sharing the repository may serve their
/// cached copy until it expires.
pub struct ConfigStore<R> {
    repository: Arc<R>,
    cache_ttl: Duration,
    cache: Mutex<Option<CachedConfig>>,
    writer: Mutex<()>,
}

impl<R> ConfigStore<R>
where
    R: ConfigRepository,
{
    pub fn new(repository: Arc<R>, cache_ttl: Duration) -> Self {
        Self {
            repository,
            cache_ttl,
            cache: Mutex::new(None),
            writer: Mutex::new(()),
        }
    }

    /// Seed the built-in presets and activate `default_preset`. A repository
    /// that already holds state is left untouched.
    pub fn bootstrap(
        &self,
        default_preset: &str,
        actor: &Actor,
    ) -> Result<ConfigMutationResult, StoreError> {
        let _writer = self.write_lock()?;
        if self.repository.load()?.is_some() {
            debug!("configuration store already initialized");
            return Ok(ConfigMutationResult {
                success: true,
                message: "configuration store already initialized".to_string(),
                log_id: None,
            });
        }

        let presets = builtin_presets();
        let preset = presets
            .iter()
            .find(|preset| preset.key == default_preset)
            .ok_or_else(|| StoreError::UnknownPreset(default_preset.to_string()))?;
        let active = ConfigSnapshot::from_preset(&preset.key, preset.config.clone());
        let preset_name = preset.name.clone();
        let now = Utc::now();

        let log_id = self.repository.commit(StoreCommit {
            state: StoreState {
                active: active.clone(),
                updated_at: now,
                presets,
            },
            log: LogDraft {
                action: ConfigAction::Init,
                target: ConfigTarget::Active,
                preset_name: Some(preset_name.clone()),
                before: None,
                after: active,
                reason: "bootstrap".to_string(),
                actor: actor.clone(),
                timestamp: now,
            },
        })?;
        self.invalidate_cache();

        info!(preset = default_preset, log_id, "scoring configuration initialized");
        Ok(ConfigMutationResult::applied(
            format!("initialized with preset {preset_name}"),
            log_id,
        ))
    }

    /// Active configuration, served from cache while younger than the TTL.
    pub fn active_config(&self) -> Result<Arc<ScoringConfig>, StoreError> {
        let mut cache = self.cache_lock()?;
        if let Some(cached) = cache.as_ref() {
            if cached.loaded_at.elapsed() < self.cache_ttl {
                return Ok(Arc::clone(&cached.config));
            }
        }

        let state = self.state()?;
        let config = Arc::new(state.active.config);
        *cache = Some(CachedConfig {
            config: Arc::clone(&config),
            loaded_at: Instant::now(),
        });
        debug!("active scoring configuration reloaded");
        Ok(config)
    }

    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = None;
        }
    }

    /// Copy a preset into the active slot.
    pub fn apply_preset(
        &self,
        key: &str,
        actor: &Actor,
        reason: &str,
    ) -> Result<ConfigMutationResult, StoreError> {
        let _writer = self.write_lock()?;
        let mut state = self.state()?;
        let Some(preset) = state.preset(key).cloned() else {
            warn!(preset = key, "apply rejected: unknown preset");
            return Ok(ConfigMutationResult::rejected(format!(
                "preset not found: {key}"
            )));
        };

        let before = state.active.clone();
        state.active = ConfigSnapshot::from_preset(key, preset.config);
        let log_id = self.commit(
            state,
            ConfigAction::ApplyPreset,
            ConfigTarget::Active,
            Some(preset.name.clone()),
            Some(before),
            actor,
            reason,
        )?;

        info!(preset = key, log_id, "scoring preset applied");
        Ok(ConfigMutationResult::applied(
            format!("applied preset {}", preset.name),
            log_id,
        ))
    }

    /// Validate and replace the active configuration, flagging it customized.
    pub fn update_custom_config(
        &self,
        document: &Value,
        actor: &Actor,
        reason: &str,
    ) -> Result<ConfigMutationResult, StoreError> {
        let config = match validate_document(document) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "custom configuration rejected");
                return Ok(ConfigMutationResult::rejected(format!(
                    "validation failed: {err}"
                )));
            }
        };

        let _writer = self.write_lock()?;
        let mut state = self.state()?;
        let before = state.active.clone();
        state.active = ConfigSnapshot::customized(config);
        let log_id = self.commit(
            state,
            ConfigAction::CustomUpdate,
            ConfigTarget::Active,
            None,
            Some(before),
            actor,
            reason,
        )?;

        info!(log_id, "custom scoring configuration stored");
        Ok(ConfigMutationResult::applied(
            "custom configuration updated",
            log_id,
        ))
    }

    /// Validate and overwrite a preset definition. An active configuration
    /// that follows this preset without customization is refreshed with it.
    pub fn update_preset(
        &self,
        key: &str,
        document: &Value,
        actor: &Actor,
        reason: &str,
    ) -> Result<ConfigMutationResult, StoreError> {
        let config = match validate_document(document) {
            Ok(config) => config,
            Err(err) => {
                warn!(preset = key, error = %err, "preset update rejected");
                return Ok(ConfigMutationResult::rejected(format!(
                    "validation failed: {err}"
                )));
            }
        };

        let _writer = self.write_lock()?;
        let mut state = self.state()?;
        let Some(preset) = state.preset_mut(key) else {
            warn!(preset = key, "preset update rejected: unknown preset");
            return Ok(ConfigMutationResult::rejected(format!(
                "preset not found: {key}"
            )));
        };

        let before = ConfigSnapshot::from_preset(key, preset.config.clone());
        preset.config = config.clone();
        let preset_name = preset.name.clone();
        let synced = sync_following_active(&mut state, key, &config);

        let log_id = self.commit(
            state,
            ConfigAction::UpdatePreset,
            ConfigTarget::Preset {
                key: key.to_string(),
            },
            Some(preset_name.clone()),
            Some(before),
            actor,
            reason,
        )?;

        info!(preset = key, log_id, active_refreshed = synced, "scoring preset updated");
        let message = if synced {
            format!("updated preset {preset_name}; active configuration refreshed")
        } else {
            format!("updated preset {preset_name}")
        };
        Ok(ConfigMutationResult::applied(message, log_id))
    }

    /// Restore the before-snapshot recorded by `log_id` to whatever that
    /// entry targeted.
    pub fn rollback(
        &self,
        log_id: LogId,
        actor: &Actor,
        reason: &str,
    ) -> Result<ConfigMutationResult, StoreError> {
        let _writer = self.write_lock()?;
        let Some(entry) = self.repository.entry(log_id)? else {
            warn!(log_id, "rollback rejected: unknown log entry");
            return Ok(ConfigMutationResult::rejected(format!(
                "log entry not found: {log_id}"
            )));
        };
        let Some(restored) = entry.before.clone() else {
            warn!(log_id, action = entry.action.label(), "rollback rejected: nothing to restore");
            return Ok(ConfigMutationResult::rejected(format!(
                "log entry {log_id} ({}) has no prior snapshot to restore",
                entry.action.label()
            )));
        };

        let mut state = self.state()?;
        let (before, preset_name, message) = match &entry.target {
            ConfigTarget::Active => {
                let before = std::mem::replace(&mut state.active, restored);
                let message = format!("rolled back active configuration to entry {log_id}");
                (before, entry.preset_name.clone(), message)
            }
            ConfigTarget::Preset { key } => {
                let Some(preset) = state.preset_mut(key) else {
                    warn!(log_id, preset = %key, "rollback rejected: preset no longer exists");
                    return Ok(ConfigMutationResult::rejected(format!(
                        "preset not found: {key}"
                    )));
                };
                let before = ConfigSnapshot::from_preset(key, preset.config.clone());
                preset.config = restored.config.clone();
                let preset_name = preset.name.clone();
                sync_following_active(&mut state, key, &restored.config);
                let message = format!("rolled back preset {preset_name}");
                (before, Some(preset_name), message)
            }
        };

        let rollback_id = self.commit(
            state,
            ConfigAction::Rollback,
            entry.target.clone(),
            preset_name,
            Some(before),
            actor,
            reason,
        )?;

        info!(log_id, rollback_id, "scoring configuration rolled back");
        Ok(ConfigMutationResult::applied(message, rollback_id))
    }

    /// `(is_valid, reason)` for a candidate document; nothing is stored.
    pub fn validate(document: &Value) -> ValidationVerdict {
        ValidationVerdict::of(document)
    }

    /// Path-by-path changes recorded by one log entry.
    pub fn diff(&self, log_id: LogId) -> Result<Option<Vec<ConfigDiff>>, StoreError> {
        Ok(self.repository.entry(log_id)?.map(|entry| entry_diffs(&entry)))
    }

    pub fn log_detail(&self, log_id: LogId) -> Result<Option<LogDetail>, StoreError> {
        Ok(self.repository.entry(log_id)?.map(|entry| LogDetail {
            summary: LogSummary::from(&entry),
            diffs: entry_diffs(&entry),
        }))
    }

    /// Newest first.
    pub fn logs(&self, limit: usize, offset: usize) -> Result<Vec<LogSummary>, StoreError> {
        Ok(self
            .repository
            .entries(limit, offset)?
            .iter()
            .map(LogSummary::from)
            .collect())
    }

    pub fn current_info(&self) -> Result<ActiveConfigInfo, StoreError> {
        let state = self.state()?;
        Ok(ActiveConfigInfo {
            based_on_preset: state.active.based_on_preset,
            is_customized: state.active.is_customized,
            updated_at: state.updated_at,
        })
    }

    pub fn presets(&self) -> Result<Vec<PresetDefinition>, StoreError> {
        Ok(self.state()?.presets)
    }

    fn state(&self) -> Result<StoreState, StoreError> {
        self.repository
            .load()?
            .ok_or(StoreError::Repository(RepositoryError::Uninitialized))
    }

    #[allow(clippy::too_many_arguments)]
    fn commit(
        &self,
        mut state: StoreState,
        action: ConfigAction,
        target: ConfigTarget,
        preset_name: Option<String>,
        before: Option<ConfigSnapshot>,
        actor: &Actor,
        reason: &str,
    ) -> Result<LogId, StoreError> {
        let now = Utc::now();
        let after = match &target {
            ConfigTarget::Active => state.active.clone(),
            ConfigTarget::Preset { key } => {
                let config = state
                    .preset(key)
                    .map(|preset| preset.config.clone())
                    .ok_or_else(|| StoreError::UnknownPreset(key.clone()))?;
                ConfigSnapshot::from_preset(key, config)
            }
        };
        state.updated_at = now;

        let log_id = self.repository.commit(StoreCommit {
            state,
            log: LogDraft {
                action,
                target,
                preset_name,
                before,
                after,
                reason: reason.to_string(),
                actor: actor.clone(),
                timestamp: now,
            },
        })?;
        self.invalidate_cache();
        Ok(log_id)
    }

    fn write_lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.writer.lock().map_err(|_| {
            StoreError::Repository(RepositoryError::Unavailable(
                "configuration writer lock poisoned".to_string(),
            ))
        })
    }

    fn cache_lock(&self) -> Result<std::sync::MutexGuard<'_, Option<CachedConfig>>, StoreError> {
        self.cache.lock().map_err(|_| {
            StoreError::Repository(RepositoryError::Unavailable(
                "configuration cache lock poisoned".to_string(),
            ))
        })
    }
}

impl<R> ConfigProvider for ConfigStore<R>
where
    R: ConfigRepository,
{
    fn active_config(&self) -> Result<Arc<ScoringConfig>, StoreError> {
        ConfigStore::active_config(self)
    }
}

/// Refresh the active slot when it follows `key` without customization.
fn sync_following_active(state: &mut StoreState, key: &str, config: &ScoringConfig) -> bool {
    let follows = state.active.based_on_preset.as_deref() == Some(key) && !state.active.is_customized;
    if follows {
        state.active = ConfigSnapshot::from_preset(key, config.clone());
    }
    follows
}

fn entry_diffs(entry: &ConfigChangeLogEntry) -> Vec<ConfigDiff> {
    let before = entry.before.as_ref().map(|snapshot| snapshot.config.to_value());
    let after = entry.after.config.to_value();
    diff_snapshots(before.as_ref(), Some(&after))
}
