use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use workforce_risk::error::AppError;
use workforce_risk::ruleset::{builtin_presets, validate_document, ScoringConfig, StoreError};

/// Where a command takes its rule set from. Neither flag means the
/// environment's default preset.
#[derive(Args, Debug, Default)]
pub(crate) struct ConfigSource {
    /// Built-in preset key (strict, standard, lenient)
    #[arg(long, conflicts_with = "config")]
    pub(crate) preset: Option<String>,
    /// Rule-set JSON file; validated before use
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
}

impl ConfigSource {
    pub(crate) fn resolve(&self, default_preset: &str) -> Result<ScoringConfig, AppError> {
        match (&self.config, &self.preset) {
            (Some(path), _) => load_rule_set(path),
            (None, Some(key)) => preset_config(key),
            (None, None) => preset_config(default_preset),
        }
    }
}

pub(crate) fn preset_config(key: &str) -> Result<ScoringConfig, AppError> {
    let key = key.trim().to_ascii_lowercase();
    builtin_presets()
        .into_iter()
        .find(|preset| preset.key == key)
        .map(|preset| preset.config)
        .ok_or(AppError::Store(StoreError::UnknownPreset(key)))
}

pub(crate) fn load_rule_set(path: &Path) -> Result<ScoringConfig, AppError> {
    Ok(validate_document(&read_json(path)?)?)
}

pub(crate) fn read_json(path: &Path) -> Result<Value, AppError> {
    read_as(path)
}

pub(crate) fn read_as<T>(path: &Path) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn print_json<T>(value: &T) -> Result<(), AppError>
where
    T: Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
