use std::env;
use std::fmt;
use std::time::Duration;

use crate::ruleset::PRESET_KEYS;

/// Distinguishes runtime behavior for different stages of deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub scoring: ScoringSettings,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let cache_ttl_secs = env::var("SCORING_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidCacheTtl)?;

        let default_preset = env::var("SCORING_DEFAULT_PRESET")
            .unwrap_or_else(|_| "standard".to_string())
            .trim()
            .to_ascii_lowercase();
        if !PRESET_KEYS.contains(&default_preset.as_str()) {
            return Err(ConfigError::UnknownPreset(default_preset));
        }

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            scoring: ScoringSettings {
                cache_ttl: Duration::from_secs(cache_ttl_secs),
                default_preset,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Rule-set store settings.
#[derive(Debug, Clone)]
pub struct ScoringSettings {
    /// How long a read of the active configuration may be served from cache.
    pub cache_ttl: Duration,
    /// Preset activated when the store is bootstrapped.
    pub default_preset: String,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidCacheTtl,
    UnknownPreset(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCacheTtl => {
                write!(f, "SCORING_CACHE_TTL_SECS must be a whole number of seconds")
            }
            ConfigError::UnknownPreset(key) => write!(
                f,
                "SCORING_DEFAULT_PRESET `{}` is not one of {}",
                key,
                PRESET_KEYS.join(", ")
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
