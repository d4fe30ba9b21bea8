//! The segment-loop itinerary problem.
//!
//! An itinerary picks a subset of six candidate journey segments. It closes a
//! loop through the destinations only when exactly four segments are used and
//! the paired segments `(0, 2)`, `(1, 3)` and `(4, 5)` are taken or dropped
//! together.

use anyhow::{anyhow, Result};
use serde::{
    de::{self, SeqAccess, Visitor},
    ser::SerializeSeq,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{from_value, Map, Value};
use std::fmt;

pub const NUM_SEGMENTS: usize = 6;
pub const SEGMENTS_PER_LOOP: usize = 4;
pub const PAIRED_SEGMENTS: [(usize, usize); 3] = [(0, 2), (1, 3), (4, 5)];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("Invalid number of segment flags. Expected: {expected}, Actual: {actual}")]
    CandidateLength { expected: usize, actual: usize },
    #[error("Invalid number of segment costs. Expected: {expected}, Actual: {actual}")]
    CostLength { expected: usize, actual: usize },
    #[error("Segment cost {index} must be finite and non-negative, got {value}")]
    SegmentCost { index: usize, value: f64 },
    #[error("time_x and time_z must be non-empty and of equal length (got {time_x} and {time_z})")]
    LayerMismatch { time_x: usize, time_z: usize },
}

/// The first structural rule a candidate breaks, checked in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    HammingWeight(usize),
    UnpairedSegments(usize, usize),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::HammingWeight(weight) => write!(
                f,
                "{} segments used, a loop uses exactly {}",
                weight, SEGMENTS_PER_LOOP
            ),
            Violation::UnpairedSegments(a, b) => {
                write!(f, "segments {} and {} must be used together", a, b)
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    #[serde(with = "bool_vec_as_u8")]
    pub segments_used: Vec<bool>,
}

impl Solution {
    pub fn new(segments_used: Vec<bool>) -> Self {
        Self { segments_used }
    }

    /// Basis-state index with segment `i` as bit `i`.
    pub fn from_bits(bits: usize) -> Self {
        Self {
            segments_used: (0..NUM_SEGMENTS).map(|i| (bits >> i) & 1 == 1).collect(),
        }
    }
}

impl TryFrom<Map<String, Value>> for Solution {
    type Error = serde_json::Error;

    fn try_from(v: Map<String, Value>) -> Result<Self, Self::Error> {
        from_value(Value::Object(v))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VariationalParameters {
    pub time_x: Vec<f64>,
    pub time_z: Vec<f64>,
}

impl VariationalParameters {
    pub fn new(time_x: Vec<f64>, time_z: Vec<f64>) -> Result<Self, InvalidInput> {
        check_layers(&time_x, &time_z)?;
        Ok(Self { time_x, time_z })
    }

    pub fn num_layers(&self) -> usize {
        self.time_x.len()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Challenge {
    pub seed: [u8; 32],
    pub segment_costs: Vec<f64>,
    pub penalty: f64,
}

impl Challenge {
    pub fn new(seed: [u8; 32], segment_costs: &[f64], penalty: f64) -> Result<Self, InvalidInput> {
        check_segment_costs(segment_costs)?;
        Ok(Self {
            seed,
            segment_costs: segment_costs.to_vec(),
            penalty,
        })
    }

    pub fn calc_cost(&self, solution: &Solution) -> Result<f64, InvalidInput> {
        calc_cost(&self.segment_costs, &solution.segments_used)
    }

    /// Returns the cost of a feasible solution, or an error describing why
    /// the solution does not form a loop.
    pub fn verify_solution(&self, solution: &Solution) -> Result<f64> {
        let cost = self.calc_cost(solution)?;
        match find_violation(&solution.segments_used)? {
            Some(violation) => Err(anyhow!("Solution is not a loop: {}", violation)),
            None => Ok(cost),
        }
    }
}

/// A source of candidate itineraries. Each call is an independent draw; any
/// randomness must come from `challenge.seed`.
pub trait Sampler: Sync {
    fn name(&self) -> &str;

    fn sample(&self, challenge: &Challenge, params: &VariationalParameters) -> Result<Solution>;
}

pub fn check_segment_costs(segment_costs: &[f64]) -> Result<(), InvalidInput> {
    if segment_costs.len() != NUM_SEGMENTS {
        return Err(InvalidInput::CostLength {
            expected: NUM_SEGMENTS,
            actual: segment_costs.len(),
        });
    }
    match segment_costs
        .iter()
        .enumerate()
        .find(|(_, c)| !c.is_finite() || **c < 0.0)
    {
        Some((index, &value)) => Err(InvalidInput::SegmentCost { index, value }),
        None => Ok(()),
    }
}

/// One layer per `(time_x[k], time_z[k])` pair, at least one layer.
pub fn check_layers(time_x: &[f64], time_z: &[f64]) -> Result<(), InvalidInput> {
    if time_x.is_empty() || time_x.len() != time_z.len() {
        return Err(InvalidInput::LayerMismatch {
            time_x: time_x.len(),
            time_z: time_z.len(),
        });
    }
    Ok(())
}

fn check_candidate(candidate: &[bool]) -> Result<(), InvalidInput> {
    if candidate.len() != NUM_SEGMENTS {
        return Err(InvalidInput::CandidateLength {
            expected: NUM_SEGMENTS,
            actual: candidate.len(),
        });
    }
    Ok(())
}

pub fn find_violation(candidate: &[bool]) -> Result<Option<Violation>, InvalidInput> {
    check_candidate(candidate)?;
    let hamming_weight = candidate.iter().filter(|&&used| used).count();
    if hamming_weight != SEGMENTS_PER_LOOP {
        return Ok(Some(Violation::HammingWeight(hamming_weight)));
    }
    Ok(PAIRED_SEGMENTS
        .iter()
        .find(|&&(a, b)| candidate[a] != candidate[b])
        .map(|&(a, b)| Violation::UnpairedSegments(a, b)))
}

pub fn is_feasible(candidate: &[bool]) -> Result<bool, InvalidInput> {
    Ok(find_violation(candidate)?.is_none())
}

pub fn calc_cost(segment_costs: &[f64], candidate: &[bool]) -> Result<f64, InvalidInput> {
    if segment_costs.len() != NUM_SEGMENTS {
        return Err(InvalidInput::CostLength {
            expected: NUM_SEGMENTS,
            actual: segment_costs.len(),
        });
    }
    check_candidate(candidate)?;
    Ok(segment_costs
        .iter()
        .zip(candidate)
        .filter(|&(_, &used)| used)
        .map(|(cost, _)| cost)
        .sum())
}

mod bool_vec_as_u8 {
    use super::*;

    pub fn serialize<S>(data: &Vec<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(data.len()))?;
        for &value in data {
            seq.serialize_element(&(if value { 1 } else { 0 }))?;
        }
        seq.end()
    }

    struct BoolVecVisitor;

    impl<'de> Visitor<'de> for BoolVecVisitor {
        type Value = Vec<bool>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a sequence of booleans or integers 0/1")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(value) = seq.next_element::<serde_json::Value>()? {
                match value {
                    serde_json::Value::Number(n) if n.as_u64() == Some(1) => vec.push(true),
                    serde_json::Value::Number(n) if n.as_u64() == Some(0) => vec.push(false),
                    serde_json::Value::Bool(b) => vec.push(b),
                    _ => return Err(de::Error::custom("expected 0, 1, true, or false")),
                }
            }
            Ok(vec)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(BoolVecVisitor)
    }
}
