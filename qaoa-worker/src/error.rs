use qaoa_challenges::InvalidInput;
use qaoa_structs::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("Oracle failed on trial {trial} after {attempts} attempt(s): {source}")]
    OracleFailure {
        trial: u64,
        attempts: u32,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
