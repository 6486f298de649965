//! Workforce risk scoring: five dimension scorers, a weighted composite and a
//! versioned, auditable rule-set store that parameterizes them.

pub mod config;
pub mod error;
pub mod ruleset;
pub mod scoring;
pub mod telemetry;

pub use ruleset::{ConfigProvider, ConfigStore, FixedConfig, InMemoryConfigRepository, ScoringConfig};
pub use scoring::{EmployeeRecords, ScoreResult, Scorecard, ScoringEngine};
