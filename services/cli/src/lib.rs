mod cli;
mod commands;
mod infra;

use workforce_risk::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
