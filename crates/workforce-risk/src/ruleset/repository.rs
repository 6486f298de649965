use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::presets::PresetDefinition;
use super::ScoringConfig;

pub type LogId = u64;

/// Operator responsible for a configuration change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl Actor {
    pub fn new(user_id: u64, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            ip_address: None,
        }
    }

    pub fn with_ip(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn system() -> Self {
        Self::new(0, "system")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigAction {
    Init,
    ApplyPreset,
    CustomUpdate,
    UpdatePreset,
    Rollback,
}

impl ConfigAction {
    pub const fn label(self) -> &'static str {
        match self {
            ConfigAction::Init => "INIT",
            ConfigAction::ApplyPreset => "APPLY_PRESET",
            ConfigAction::CustomUpdate => "CUSTOM_UPDATE",
            ConfigAction::UpdatePreset => "UPDATE_PRESET",
            ConfigAction::Rollback => "ROLLBACK",
        }
    }
}

/// What a log entry changed: the active configuration or one preset definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigTarget {
    Active,
    Preset { key: String },
}

/// Rule set plus the provenance flags that travel with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub config: ScoringConfig,
    #[serde(default)]
    pub based_on_preset: Option<String>,
    #[serde(default)]
    pub is_customized: bool,
}

impl ConfigSnapshot {
    pub fn from_preset(key: &str, config: ScoringConfig) -> Self {
        Self {
            config,
            based_on_preset: Some(key.to_string()),
            is_customized: false,
        }
    }

    pub fn customized(config: ScoringConfig) -> Self {
        Self {
            config,
            based_on_preset: None,
            is_customized: true,
        }
    }
}

/// Append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigChangeLogEntry {
    pub id: LogId,
    pub action: ConfigAction,
    pub target: ConfigTarget,
    #[serde(default)]
    pub preset_name: Option<String>,
    #[serde(default)]
    pub before: Option<ConfigSnapshot>,
    pub after: ConfigSnapshot,
    pub reason: String,
    pub actor: Actor,
    pub timestamp: DateTime<Utc>,
}

/// Log entry before the repository assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct LogDraft {
    pub action: ConfigAction,
    pub target: ConfigTarget,
    pub preset_name: Option<String>,
    pub before: Option<ConfigSnapshot>,
    pub after: ConfigSnapshot,
    pub reason: String,
    pub actor: Actor,
    pub timestamp: DateTime<Utc>,
}

impl LogDraft {
    fn into_entry(self, id: LogId) -> ConfigChangeLogEntry {
        ConfigChangeLogEntry {
            id,
            action: self.action,
            target: self.target,
            preset_name: self.preset_name,
            before: self.before,
            after: self.after,
            reason: self.reason,
            actor: self.actor,
            timestamp: self.timestamp,
        }
    }
}

/// Authoritative copy of the active configuration and the preset catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub active: ConfigSnapshot,
    pub updated_at: DateTime<Utc>,
    pub presets: Vec<PresetDefinition>,
}

impl StoreState {
    pub fn preset(&self, key: &str) -> Option<&PresetDefinition> {
        self.presets.iter().find(|preset| preset.key == key)
    }

    pub fn preset_mut(&mut self, key: &str) -> Option<&mut PresetDefinition> {
        self.presets.iter_mut().find(|preset| preset.key == key)
    }
}

/// New state and the single log entry describing how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCommit {
    pub state: StoreState,
    pub log: LogDraft,
}

/// Durable storage for the store. `commit` must write the state and append
/// the log entry together or not at all.
pub trait ConfigRepository: Send + Sync {
    fn load(&self) -> Result<Option<StoreState>, RepositoryError>;
    fn commit(&self, commit: StoreCommit) -> Result<LogId, RepositoryError>;
    fn entry(&self, id: LogId) -> Result<Option<ConfigChangeLogEntry>, RepositoryError>;
    /// Newest first.
    fn entries(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ConfigChangeLogEntry>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("configuration store has not been initialized")]
    Uninitialized,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct MemoryInner {
    state: Option<StoreState>,
    log: Vec<ConfigChangeLogEntry>,
}

/// Process-local repository; one mutex covers state and log so commits are atomic.
#[derive(Debug, Default)]
pub struct InMemoryConfigRepository {
    inner: Mutex<MemoryInner>,
}

impl InMemoryConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>, RepositoryError> {
        self.inner
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))
    }
}

impl ConfigRepository for InMemoryConfigRepository {
    fn load(&self) -> Result<Option<StoreState>, RepositoryError> {
        Ok(self.lock()?.state.clone())
    }

    fn commit(&self, commit: StoreCommit) -> Result<LogId, RepositoryError> {
        let mut inner = self.lock()?;
        let id = inner.log.last().map_or(1, |entry| entry.id + 1);
        inner.log.push(commit.log.into_entry(id));
        inner.state = Some(commit.state);
        Ok(id)
    }

    fn entry(&self, id: LogId) -> Result<Option<ConfigChangeLogEntry>, RepositoryError> {
        Ok(self.lock()?.log.iter().find(|entry| entry.id == id).cloned())
    }

    fn entries(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ConfigChangeLogEntry>, RepositoryError> {
        Ok(self
            .lock()?
            .log
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
