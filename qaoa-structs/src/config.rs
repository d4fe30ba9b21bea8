use crate::serializable_struct_with_getters;
use qaoa_challenges::itinerary::{check_layers, check_segment_costs, InvalidInput};
use qaoa_utils::{jsonify, mix_seed, u8s_from_str};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("num_trials must be at least 1")]
    NoTrials,
    #[error(transparent)]
    Instance(#[from] InvalidInput),
    #[error("penalty must be finite, got {0}")]
    Penalty(f64),
    #[error("epsilon must be finite and positive, got {0}")]
    Epsilon(f64),
    #[error("num_workers must be at least 1")]
    NoWorkers,
}

serializable_struct_with_getters! {
    ExperimentConfig {
        num_trials: u64,
        segment_costs: Vec<f64>,
        penalty: f64,
        time_x: Vec<f64>,
        time_z: Vec<f64>,
        epsilon: f64,
        rand_hash: Option<String>,
        num_workers: Option<usize>,
        max_oracle_retries: Option<u32>,
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            num_trials: 20,
            segment_costs: vec![4.70, 9.09, 9.03, 5.70, 8.02, 1.71],
            penalty: 20.0,
            time_x: vec![0.619193, 0.742566, 0.060035, -1.568955, 0.045490],
            time_z: vec![3.182203, -1.139045, 0.221082, 0.537753, -0.417222],
            epsilon: 1e-6,
            rand_hash: None,
            num_workers: None,
            max_oracle_retries: None,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        check_segment_costs(&self.segment_costs)?;
        if !self.penalty.is_finite() {
            return Err(ConfigError::Penalty(self.penalty));
        }
        check_layers(&self.time_x, &self.time_z)?;
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(ConfigError::Epsilon(self.epsilon));
        }
        if self.num_workers == Some(0) {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }

    /// Seed for a single trial. Only the problem instance and `rand_hash`
    /// feed the hash, so the trial count and worker count never change the
    /// draws of a given trial.
    pub fn calc_seed(&self, trial: u64) -> [u8; 32] {
        let instance = json!({
            "segment_costs": self.segment_costs,
            "penalty": self.penalty,
            "time_x": self.time_x,
            "time_z": self.time_z,
        });
        let rand_hash = self.rand_hash.as_deref().unwrap_or_default();
        let base = u8s_from_str(&format!("{}{}", jsonify(&instance), rand_hash));
        mix_seed(&base, trial)
    }
}
