use anyhow::{anyhow, Result};
use qaoa_algorithms::itinerary::QaoaSampler;
use qaoa_challenges::{Challenge, InvalidInput, Sampler, Solution, VariationalParameters};
use qaoa_structs::config::{ConfigError, ExperimentConfig};
use qaoa_worker::{run_experiment, run_experiment_with, RunError, TrialAggregator};
use std::sync::atomic::{AtomicUsize, Ordering};

const EPSILON: f64 = 1e-6;

fn bits(s: &str) -> Solution {
    Solution::new(s.chars().map(|c| c == '1').collect())
}

/// Hands out `candidates` in order, wrapping around.
struct CyclingSampler {
    candidates: Vec<Solution>,
    calls: AtomicUsize,
}

impl CyclingSampler {
    fn new(candidates: &[&str]) -> Self {
        Self {
            candidates: candidates.iter().map(|s| bits(s)).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Sampler for CyclingSampler {
    fn name(&self) -> &str {
        "cycling"
    }

    fn sample(&self, _challenge: &Challenge, _params: &VariationalParameters) -> Result<Solution> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates[call % self.candidates.len()].clone())
    }
}

/// Picks a candidate from the challenge seed alone.
struct SeedSampler {
    candidates: Vec<Solution>,
}

impl Sampler for SeedSampler {
    fn name(&self) -> &str {
        "seed"
    }

    fn sample(&self, challenge: &Challenge, _params: &VariationalParameters) -> Result<Solution> {
        Ok(self.candidates[challenge.seed[0] as usize % self.candidates.len()].clone())
    }
}

/// Fails the first `failures` calls.
struct FlakySampler {
    failures: usize,
    calls: AtomicUsize,
}

impl Sampler for FlakySampler {
    fn name(&self) -> &str {
        "flaky"
    }

    fn sample(&self, _challenge: &Challenge, _params: &VariationalParameters) -> Result<Solution> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            Err(anyhow!("simulator fault"))
        } else {
            Ok(bits("101011"))
        }
    }
}

fn config(num_trials: u64) -> ExperimentConfig {
    ExperimentConfig {
        num_trials,
        ..ExperimentConfig::default()
    }
}

#[test]
fn test_stub_run_matches_manual_replay() {
    let candidates = [
        "111100", // 28.52, feasible
        "000000", // 0, infeasible
        "101011", // 23.46, feasible
        "110011", // unpaired, infeasible
        "101011", // tie
        "010111", // 24.52, feasible
        "101011", // tie
    ];
    let config = config(candidates.len() as u64);
    let report = run_experiment(&config, &CyclingSampler::new(&candidates)).unwrap();

    let mut aggregator = TrialAggregator::default();
    for record in &report.trials {
        aggregator.update(
            &Solution::new(record.segments_used.clone()),
            record.cost,
            record.feasible,
            EPSILON,
        );
    }
    let (itinerary, cost, tie_count) = aggregator.report();

    let best = report.best.as_ref().unwrap();
    assert_eq!(Some(&bits("101011")), itinerary);
    assert_eq!(best.segments_used, bits("101011").segments_used);
    assert_eq!(best.cost, cost);
    assert!((best.cost - 23.46).abs() < 1e-9);
    assert_eq!(best.tie_count, tie_count);
    assert_eq!(best.tie_count, 3);
    assert_eq!(report.success_rate, 3.0 / 7.0);
    assert_eq!(report.sampler, "cycling");

    let feasible: Vec<bool> = report.trials.iter().map(|t| t.feasible).collect();
    assert_eq!(feasible, vec![true, false, true, false, true, true, true]);
    assert_eq!(report.trials[1].cost, 0.0);
    assert!((report.trials[0].cost - 28.52).abs() < 1e-9);
    assert!((report.trials[5].cost - 24.52).abs() < 1e-9);
}

#[test]
fn test_observer_sees_trials_in_order() {
    let mut seen = Vec::new();
    let report = run_experiment_with(
        &config(5),
        &CyclingSampler::new(&["111100", "000000"]),
        |record| seen.push(record.trial),
    )
    .unwrap();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    assert_eq!(report.trials.len(), 5);
    assert_eq!(report.best.unwrap().tie_count, 3);
}

#[test]
fn test_no_feasible_candidates() {
    let report = run_experiment(&config(4), &CyclingSampler::new(&["000000", "111111"])).unwrap();
    assert_eq!(report.best, None);
    assert_eq!(report.success_rate, 0.0);
    assert_eq!(report.num_feasible(), 0);
}

#[test]
fn test_wrong_candidate_length_aborts() {
    let err = run_experiment(&config(3), &CyclingSampler::new(&["1111"])).unwrap_err();
    match err {
        RunError::InvalidInput(InvalidInput::CandidateLength { expected, actual }) => {
            assert_eq!((expected, actual), (6, 4));
        }
        e => panic!("unexpected error: {}", e),
    }
}

#[test]
fn test_invalid_config_aborts_before_sampling() {
    let sampler = CyclingSampler::new(&["111100"]);
    let err = run_experiment(&config(0), &sampler).unwrap_err();
    assert!(matches!(err, RunError::InvalidConfig(ConfigError::NoTrials)));
    assert_eq!(sampler.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_oracle_failure_is_fatal() {
    let sampler = FlakySampler {
        failures: usize::MAX,
        calls: AtomicUsize::new(0),
    };
    let err = run_experiment(&config(3), &sampler).unwrap_err();
    match &err {
        RunError::OracleFailure {
            trial, attempts, ..
        } => assert_eq!((*trial, *attempts), (0, 1)),
        e => panic!("unexpected error: {}", e),
    }
    assert_eq!(
        err.to_string(),
        "Oracle failed on trial 0 after 1 attempt(s): simulator fault"
    );
}

#[test]
fn test_huge_trial_count_fails_on_first_trial() {
    let sampler = FlakySampler {
        failures: usize::MAX,
        calls: AtomicUsize::new(0),
    };
    let err = run_experiment(&config(u64::MAX / 2), &sampler).unwrap_err();
    assert!(matches!(
        err,
        RunError::OracleFailure {
            trial: 0,
            attempts: 1,
            ..
        }
    ));
    assert_eq!(sampler.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_oracle_retries_are_bounded() {
    let mut config = config(3);
    config.max_oracle_retries = Some(2);

    let sampler = FlakySampler {
        failures: 2,
        calls: AtomicUsize::new(0),
    };
    let report = run_experiment(&config, &sampler).unwrap();
    assert_eq!(report.best.unwrap().tie_count, 3);
    assert_eq!(sampler.calls.load(Ordering::SeqCst), 5);

    let sampler = FlakySampler {
        failures: usize::MAX,
        calls: AtomicUsize::new(0),
    };
    match run_experiment(&config, &sampler).unwrap_err() {
        RunError::OracleFailure {
            trial, attempts, ..
        } => assert_eq!((trial, attempts), (0, 3)),
        e => panic!("unexpected error: {}", e),
    }
    assert_eq!(sampler.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_parallel_matches_sequential() {
    let sampler = SeedSampler {
        candidates: ["111100", "101011", "010111", "000000", "110011"]
            .iter()
            .map(|s| bits(s))
            .collect(),
    };
    let sequential = run_experiment(&config(64), &sampler).unwrap();

    let mut parallel_config = config(64);
    parallel_config.num_workers = Some(4);
    let parallel = run_experiment(&parallel_config, &sampler).unwrap();
    assert_eq!(sequential, parallel);

    let sequential = run_experiment(&config(32), &QaoaSampler).unwrap();
    let mut parallel_config = config(32);
    parallel_config.num_workers = Some(3);
    let parallel = run_experiment(&parallel_config, &QaoaSampler).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_trial_draws_do_not_depend_on_trial_count() {
    let short = run_experiment(&config(10), &QaoaSampler).unwrap();
    let long = run_experiment(&config(30), &QaoaSampler).unwrap();
    assert_eq!(short.trials[..], long.trials[..10]);
}

#[test]
fn test_reference_experiment() {
    let report = run_experiment(&config(200), &QaoaSampler).unwrap();
    let best = report.best.as_ref().unwrap();
    assert_eq!(best.segments_used, bits("101011").segments_used);
    assert!((best.cost - 23.46).abs() < 1e-9);
    assert!(
        report.success_rate > 0.55 && report.success_rate < 0.85,
        "success_rate = {}",
        report.success_rate
    );
}
