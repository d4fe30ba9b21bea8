//! QAOA sampler simulated exactly on a state vector.
//!
//! Each segment is one qubit; a measured `1` means the segment is used. The
//! cost Hamiltonian is `sum_i h_i z_i + sum_{i<j} J_ij z_i z_j` with
//! `h_i = 4P - c_i / 2`, `J_ij = 2P` and `J_ij = P` for the segment pairs that
//! must be used together, where `P` is the penalty and `z_i = +1` for an
//! unused segment. Its ground state is the cheapest loop.

use anyhow::{anyhow, Result};
use num_complex::Complex64;
use qaoa_challenges::itinerary::*;
use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
    SeedableRng,
};

pub const NUM_STATES: usize = 1 << NUM_SEGMENTS;

#[derive(Debug, Clone, Copy, Default)]
pub struct QaoaSampler;

impl Sampler for QaoaSampler {
    fn name(&self) -> &str {
        "qaoa"
    }

    fn sample(&self, challenge: &Challenge, params: &VariationalParameters) -> Result<Solution> {
        let probabilities = calc_probabilities(challenge, params)?;
        let distribution = WeightedIndex::new(&probabilities)
            .map_err(|e| anyhow!("Invalid measurement distribution: {}", e))?;
        let mut rng = StdRng::from_seed(challenge.seed);
        Ok(Solution::from_bits(distribution.sample(&mut rng)))
    }
}

pub fn hamiltonian_weights(segment_costs: &[f64], penalty: f64) -> Vec<f64> {
    segment_costs
        .iter()
        .map(|cost| 4.0 * penalty - 0.5 * cost)
        .collect()
}

/// Row-major `NUM_SEGMENTS x NUM_SEGMENTS`. Only entries above the diagonal
/// are read.
pub fn hamiltonian_couplings(penalty: f64) -> Vec<f64> {
    let mut couplings = vec![2.0 * penalty; NUM_SEGMENTS * NUM_SEGMENTS];
    for &(i, j) in PAIRED_SEGMENTS.iter() {
        couplings[NUM_SEGMENTS * i + j] = penalty;
    }
    couplings
}

pub fn basis_energy(bits: usize, weights: &[f64], couplings: &[f64]) -> f64 {
    let spin = |i: usize| if (bits >> i) & 1 == 1 { -1.0 } else { 1.0 };
    let mut energy = 0.0;
    for i in 0..NUM_SEGMENTS {
        energy += weights[i] * spin(i);
        for j in i + 1..NUM_SEGMENTS {
            energy += couplings[NUM_SEGMENTS * i + j] * spin(i) * spin(j);
        }
    }
    energy
}

pub fn simulate_state(
    challenge: &Challenge,
    params: &VariationalParameters,
) -> Result<Vec<Complex64>> {
    check_segment_costs(&challenge.segment_costs)?;
    check_layers(&params.time_x, &params.time_z)?;

    let weights = hamiltonian_weights(&challenge.segment_costs, challenge.penalty);
    let couplings = hamiltonian_couplings(challenge.penalty);
    let energies: Vec<f64> = (0..NUM_STATES)
        .map(|bits| basis_energy(bits, &weights, &couplings))
        .collect();

    // Uniform superposition
    let mut state = vec![Complex64::new((NUM_STATES as f64).sqrt().recip(), 0.0); NUM_STATES];

    for (&time_z, &time_x) in params.time_z.iter().zip(&params.time_x) {
        // Cost layer is diagonal: exp(-i t E(b)) per basis state
        for (amplitude, &energy) in state.iter_mut().zip(&energies) {
            *amplitude *= Complex64::from_polar(1.0, -time_z * energy);
        }

        // Mixer exp(i t X) on every qubit
        let cos = Complex64::new(time_x.cos(), 0.0);
        let i_sin = Complex64::new(0.0, time_x.sin());
        for qubit in 0..NUM_SEGMENTS {
            let mask = 1 << qubit;
            for bits in (0..NUM_STATES).filter(|bits| bits & mask == 0) {
                let a0 = state[bits];
                let a1 = state[bits | mask];
                state[bits] = cos * a0 + i_sin * a1;
                state[bits | mask] = i_sin * a0 + cos * a1;
            }
        }
    }

    Ok(state)
}

/// Measurement probability of every basis state, indexed by
/// [`Solution::from_bits`] order.
pub fn calc_probabilities(challenge: &Challenge, params: &VariationalParameters) -> Result<Vec<f64>> {
    Ok(simulate_state(challenge, params)?
        .iter()
        .map(|amplitude| amplitude.norm_sqr())
        .collect())
}
