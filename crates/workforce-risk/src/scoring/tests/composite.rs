use super::common::*;
use crate::scoring::composite::{
    aggregate, comprehensive_score, nine_grid, AxisLevel, DimensionScores, KeyPersonnelReason,
    NineGridCell,
};
use crate::scoring::domain::ColorTier;

fn mixed() -> DimensionScores {
    DimensionScores {
        performance: 90.0,
        safety: 80.0,
        training: 70.0,
        stability: 60.0,
        learning: 50.0,
    }
}

fn uniform(value: f64) -> DimensionScores {
    DimensionScores {
        performance: value,
        safety: value,
        training: value,
        stability: value,
        learning: value,
    }
}

#[test]
fn comprehensive_is_the_weighted_sum() {
    let config = standard();

    assert_close(comprehensive_score(&mixed(), &config), 78.0);
    assert_close(comprehensive_score(&uniform(100.0), &config), 100.0);
}

#[test]
fn nine_grid_renormalizes_each_axis() {
    let config = standard();

    let placement = nine_grid(&mixed(), &config);

    // X = 69.5 / 0.85, Y = 0.4 * 60 + 0.6 * 50
    assert_close(placement.x, 81.8);
    assert_close(placement.y, 54.0);
    assert_eq!(placement.cell.x_level, AxisLevel::Mid);
    assert_eq!(placement.cell.y_level, AxisLevel::Low);
    assert_eq!(placement.cell.label, "watch list");
    assert_eq!((placement.cell.row, placement.cell.column), (3, 2));
}

#[test]
fn top_right_cell_is_core_talent() {
    let config = standard();

    let placement = nine_grid(&uniform(95.0), &config);

    assert_eq!(placement.cell.label, "core talent");
    assert_eq!((placement.cell.row, placement.cell.column), (1, 3));
}

#[test]
fn every_cell_has_a_distinct_label() {
    let levels = [AxisLevel::Low, AxisLevel::Mid, AxisLevel::High];
    let mut labels: Vec<String> = levels
        .iter()
        .flat_map(|&x| levels.iter().map(move |&y| NineGridCell::locate(x, y).label))
        .collect();
    labels.sort();
    labels.dedup();

    assert_eq!(labels.len(), 9);
}

#[test]
fn zero_axis_weights_fall_back_to_a_plain_mean() {
    let mut config = standard();
    config.nine_grid.y_axis_weights.stability = 0.0;
    config.nine_grid.y_axis_weights.learning = 0.0;

    let placement = nine_grid(&mixed(), &config);

    assert_close(placement.y, 55.0);
}

#[test]
fn frequent_violations_flag_key_personnel_despite_a_passing_score() {
    let config = standard();

    let flagged = aggregate(&mixed(), 3, &config);
    assert!(flagged.key_personnel);
    assert_eq!(flagged.key_personnel_reasons, vec![KeyPersonnelReason::FrequentViolations]);
    assert_eq!(flagged.color_tier, ColorTier::Red);

    let clear = aggregate(&mixed(), 0, &config);
    assert!(!clear.key_personnel);
    assert_eq!(clear.color_tier, ColorTier::Yellow);
}

#[test]
fn low_comprehensive_score_flags_key_personnel() {
    let config = standard();

    let outcome = aggregate(&uniform(60.0), 0, &config);

    assert_eq!(outcome.key_personnel_reasons, vec![KeyPersonnelReason::LowComprehensive]);
}
