use serde_json::json;

use super::common::*;
use crate::scoring::simulate::{simulate, SimulationSample};

fn sample() -> SimulationSample {
    serde_json::from_value(json!({
        "performance": {"grades": ["D", "C", "B+"]},
        "safety": {"violations": [3, 5, 12]},
        "training": {"scores": [85, 0, 90], "is_qualified": [1, 0, true]}
    }))
    .expect("sample parses")
}

#[test]
fn every_sample_item_is_scored() {
    let config = standard();

    let report = simulate(&config, &sample());

    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.performance.len(), 3);
    assert_close(report.performance[0].score, 50.0);
    assert_close(report.performance[2].score, 95.0);
    assert_eq!(report.safety.len(), 3);
    assert_eq!(report.training.len(), 3);
    assert!(!report.training[1].is_qualified);
    assert_eq!(report.training[2].index, 3);
}

#[test]
fn comprehensive_uses_the_first_sample_of_each_dimension() {
    let config = standard();

    let report = simulate(&config, &sample());

    let comprehensive = report.comprehensive.expect("comprehensive score");
    let expected = report.performance[0].score * 0.35
        + report.safety[0].score * 0.30
        + report.training[0].final_score * 0.20;
    assert_close(comprehensive.score, (expected * 10.0).round() / 10.0);
}

#[test]
fn mismatched_training_lengths_are_reported_not_raised() {
    let config = standard();
    let sample: SimulationSample = serde_json::from_value(json!({
        "performance": {"grades": ["A", "Z"]},
        "training": {"scores": [85, 90], "is_qualified": [1]}
    }))
    .expect("sample parses");

    let report = simulate(&config, &sample);

    assert_eq!(report.performance.len(), 1);
    assert!(report.training.is_empty());
    assert!(report.comprehensive.is_none());
    assert_eq!(report.errors.len(), 2);
}
