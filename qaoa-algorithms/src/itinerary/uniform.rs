use anyhow::Result;
use qaoa_challenges::itinerary::*;
use rand::{
    rngs::{SmallRng, StdRng},
    Rng, SeedableRng,
};

/// Flips a fair coin per segment. Ignores costs and parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSampler;

impl Sampler for UniformSampler {
    fn name(&self) -> &str {
        "uniform"
    }

    fn sample(&self, challenge: &Challenge, _params: &VariationalParameters) -> Result<Solution> {
        let mut rng = SmallRng::from_seed(StdRng::from_seed(challenge.seed).gen());
        Ok(Solution::new(
            (0..NUM_SEGMENTS).map(|_| rng.gen_bool(0.5)).collect(),
        ))
    }
}
