pub mod engine;
pub mod subscore;

pub use engine::{rank, rank_comparison, MetricContribution, Ranked, ScoringError};
