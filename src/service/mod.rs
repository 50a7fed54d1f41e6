pub mod aggregator;
pub mod classifier;
pub mod engine;
pub mod estimator;
pub mod matcher;

pub use engine::{AccessScope, AnalysisFilters, AnalysisRequest, RuptureEngine};
