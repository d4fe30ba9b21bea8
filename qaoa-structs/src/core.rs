use crate::serializable_struct_with_getters;
use serde::{Deserialize, Serialize};

serializable_struct_with_getters! {
    TrialRecord {
        trial: u64,
        segments_used: Vec<bool>,
        cost: f64,
        feasible: bool,
    }
}

serializable_struct_with_getters! {
    BestItinerary {
        segments_used: Vec<bool>,
        cost: f64,
        tie_count: u64,
    }
}

serializable_struct_with_getters! {
    ExperimentReport {
        sampler: String,
        num_trials: u64,
        success_rate: f64,
        best: Option<BestItinerary>,
        trials: Vec<TrialRecord>,
    }
}

impl ExperimentReport {
    pub fn success_percent(&self) -> f64 {
        self.success_rate * 100.0
    }

    pub fn num_feasible(&self) -> usize {
        self.trials.iter().filter(|t| t.feasible).count()
    }
}

/// Renders flags as a string of `0`/`1` digits, segment 0 first.
pub fn format_segments(segments_used: &[bool]) -> String {
    segments_used
        .iter()
        .map(|&used| if used { '1' } else { '0' })
        .collect()
}
