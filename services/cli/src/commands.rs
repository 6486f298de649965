use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};
use workforce_risk::error::AppError;
use workforce_risk::ruleset::{
    builtin_presets, diff_snapshots, validate_document, ConfigDiff, FixedConfig, ScoringConfig,
    ValidationVerdict,
};
use workforce_risk::scoring::{simulate as run_simulation, SimulationReport, SimulationSample};
use workforce_risk::{EmployeeRecords, Scorecard, ScoringEngine};

use crate::infra::{read_as, read_json};

#[derive(Debug, Serialize)]
pub(crate) struct PresetSummary {
    pub(crate) key: String,
    pub(crate) name: String,
    pub(crate) description: String,
}

pub(crate) fn presets() -> Vec<PresetSummary> {
    builtin_presets()
        .into_iter()
        .map(|preset| PresetSummary {
            key: preset.key,
            name: preset.name,
            description: preset.description,
        })
        .collect()
}

/// A rejected file is an error so the process exits non-zero.
pub(crate) fn validate(path: &Path) -> Result<ValidationVerdict, AppError> {
    let document = read_json(path)?;
    if let Err(err) = validate_document(&document) {
        warn!(file = %path.display(), error = %err, "rule set rejected");
        return Err(err.into());
    }
    info!(file = %path.display(), "rule set accepted");
    Ok(ValidationVerdict::of(&document))
}

/// Both files are normalized first, so percentage weights compare equal to
/// their fractional form.
pub(crate) fn diff(before: &Path, after: &Path) -> Result<Vec<ConfigDiff>, AppError> {
    let before = ScoringConfig::from_value(&read_json(before)?)?.to_value();
    let after = ScoringConfig::from_value(&read_json(after)?)?.to_value();
    Ok(diff_snapshots(Some(&before), Some(&after)))
}

pub(crate) fn simulate(sample: &Path, rules: &ScoringConfig) -> Result<SimulationReport, AppError> {
    let sample: SimulationSample = read_as(sample)?;
    let report = run_simulation(rules, &sample);
    if !report.errors.is_empty() {
        warn!(errors = report.errors.len(), "simulation skipped invalid sample items");
    }
    Ok(report)
}

pub(crate) fn score(records: &Path, rules: ScoringConfig) -> Result<Scorecard, AppError> {
    let records: EmployeeRecords = read_as(records)?;
    let engine = ScoringEngine::new(FixedConfig::new(rules));
    let card = engine.score(&records)?;
    info!(
        employee = %card.employee_id,
        comprehensive = card.composite.comprehensive,
        key_personnel = card.composite.key_personnel,
        "scorecard computed"
    );
    Ok(card)
}
