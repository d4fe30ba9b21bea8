mod aggregator;
pub use aggregator::{BestSolution, TrialAggregator, Update};
mod error;
pub use error::RunError;
mod runner;
pub use runner::{run_experiment, run_experiment_with, run_trial};
