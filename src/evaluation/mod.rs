//! Baseline heuristic and greedy evaluation harness.

mod baseline;
mod evaluator;

pub use baseline::{nearest_neighbor_baseline, BaselineRoute};
pub use evaluator::{
    evaluate, write_records_csv, write_summary_csv, EvaluationOptions, EvaluationRecord,
    EvaluationSummary,
};
