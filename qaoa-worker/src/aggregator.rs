use qaoa_challenges::Solution;

#[derive(Debug, Clone, PartialEq)]
pub struct BestSolution {
    pub itinerary: Option<Solution>,
    pub cost: f64,
    pub tie_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Ignored,
    Improved,
    Tied,
}

/// Tracks the cheapest feasible candidate seen so far and how many feasible
/// candidates matched its cost. The first candidate to reach a cost keeps the
/// itinerary; later ties only bump `tie_count`.
#[derive(Debug, Clone)]
pub struct TrialAggregator {
    best: BestSolution,
}

impl Default for TrialAggregator {
    fn default() -> Self {
        Self::new(f64::INFINITY)
    }
}

impl TrialAggregator {
    /// `upper_bound` must be worse than any feasible cost.
    pub fn new(upper_bound: f64) -> Self {
        Self {
            best: BestSolution {
                itinerary: None,
                cost: upper_bound,
                tie_count: 0,
            },
        }
    }

    pub fn update(
        &mut self,
        candidate: &Solution,
        cost: f64,
        feasible: bool,
        epsilon: f64,
    ) -> Update {
        if !feasible {
            return Update::Ignored;
        }
        if cost < self.best.cost - epsilon {
            self.best.itinerary = Some(candidate.clone());
            self.best.cost = cost;
            self.best.tie_count = 1;
            Update::Improved
        } else if (cost - self.best.cost).abs() < epsilon {
            self.best.tie_count += 1;
            Update::Tied
        } else {
            Update::Ignored
        }
    }

    pub fn best(&self) -> &BestSolution {
        &self.best
    }

    pub fn report(&self) -> (Option<&Solution>, f64, u64) {
        (
            self.best.itinerary.as_ref(),
            self.best.cost,
            self.best.tie_count,
        )
    }

    /// Fraction of `num_trials` that reproduced the final best cost.
    pub fn success_rate(&self, num_trials: u64) -> f64 {
        if num_trials == 0 {
            return 0.0;
        }
        self.best.tie_count as f64 / num_trials as f64
    }
}
