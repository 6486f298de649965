//! Pure scoring functions. Every scorer takes its records and the relevant
//! configuration section explicitly and returns a [`ScoreResult`].

pub mod composite;
pub mod domain;
pub mod engine;
pub mod learning;
pub mod performance;
pub mod period;
pub mod rules;
pub mod safety;
pub mod simulate;
pub mod stability;
pub mod training;

pub use composite::{
    aggregate, comprehensive_score, nine_grid, AxisLevel, CompositeOutcome, DimensionScores,
    KeyPersonnelReason, NineGridCell, NineGridPlacement,
};
pub use domain::{ColorTier, Grade, PerformanceEntry, ScoreResult, TrainingRecord, ZoneState};
pub use engine::{
    scorecard, EmployeeRecords, MonthlyScore, PerformanceRecord, Scorecard, ScoringEngine,
    ViolationRecord,
};
pub use learning::{LongTermLearning, MomentumTier, RiskInertia, RiskLevel, TrendType, ZoneDecision};
pub use period::YearMonth;
pub use safety::SafetyTracks;
pub use simulate::{simulate, SimulationReport, SimulationSample};
pub use stability::{MonthlySafety, PeriodMonth, StabilityWindow};
pub use training::AlertLevel;

#[cfg(test)]
mod tests;
