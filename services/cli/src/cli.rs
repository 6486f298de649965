use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use workforce_risk::config::AppConfig;
use workforce_risk::error::AppError;
use workforce_risk::telemetry;

use crate::commands;
use crate::infra::{print_json, ConfigSource};

#[derive(Parser, Debug)]
#[command(
    name = "workforce-risk",
    about = "Score workforce risk and manage scoring rule sets from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in rule-set presets
    Presets,
    /// Check a rule-set JSON file against the schema and bounds
    Validate(ValidateArgs),
    /// Show path-by-path changes between two rule-set files
    Diff(DiffArgs),
    /// Score hand-written sample inputs against a rule set without storing anything
    Simulate(SimulateArgs),
    /// Produce a full scorecard for one employee's records
    Score(ScoreArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Rule-set JSON file
    pub(crate) file: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct DiffArgs {
    /// Rule-set file before the change
    pub(crate) before: PathBuf,
    /// Rule-set file after the change
    pub(crate) after: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Sample JSON with optional `performance`, `safety` and `training` sections
    pub(crate) sample: PathBuf,
    #[command(flatten)]
    pub(crate) source: ConfigSource,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Employee records JSON, already filtered to the evaluation period
    pub(crate) records: PathBuf,
    #[command(flatten)]
    pub(crate) source: ConfigSource,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let default_preset = config.scoring.default_preset.as_str();

    match cli.command {
        Command::Presets => print_json(&commands::presets()),
        Command::Validate(args) => print_json(&commands::validate(&args.file)?),
        Command::Diff(args) => print_json(&commands::diff(&args.before, &args.after)?),
        Command::Simulate(args) => {
            let rules = args.source.resolve(default_preset)?;
            print_json(&commands::simulate(&args.sample, &rules)?)
        }
        Command::Score(args) => {
            let rules = args.source.resolve(default_preset)?;
            print_json(&commands::score(&args.records, rules)?)
        }
    }
}
