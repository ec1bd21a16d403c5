//! Prediction engine crate.
//!
//! Ten fixed-confidence heuristics over the recent round history and a
//! max-confidence selector.

pub mod engine;
pub mod heuristics;

pub use engine::{default_scorers, select_best, FnScorer, PredictionEngine, Scorer};
pub use heuristics::{ScoringContext, WINDOW_SIZE};
