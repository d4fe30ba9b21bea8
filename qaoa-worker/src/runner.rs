use crate::{
    aggregator::{TrialAggregator, Update},
    error::RunError,
};
use qaoa_challenges::itinerary::{calc_cost, is_feasible, Challenge, Sampler, Solution};
use qaoa_challenges::VariationalParameters;
use qaoa_structs::{
    config::ExperimentConfig,
    core::{format_segments, BestItinerary, ExperimentReport, TrialRecord},
};
use qaoa_utils::rehash_seed;
use rayon::prelude::*;
use tracing::{debug, info, warn};

pub fn run_experiment(
    config: &ExperimentConfig,
    sampler: &dyn Sampler,
) -> Result<ExperimentReport, RunError> {
    run_experiment_with(config, sampler, |_| {})
}

/// Runs every trial of `config` against `sampler` and aggregates the best
/// feasible itinerary. `on_trial` sees each record in trial order.
///
/// With `num_workers > 1` trials are sampled on a thread pool and aggregated
/// afterwards in trial order, so a sampler that only depends on the
/// challenge seed gives the same report as a sequential run.
pub fn run_experiment_with<F>(
    config: &ExperimentConfig,
    sampler: &dyn Sampler,
    mut on_trial: F,
) -> Result<ExperimentReport, RunError>
where
    F: FnMut(&TrialRecord),
{
    config.validate()?;
    let params = VariationalParameters::new(config.time_x.clone(), config.time_z.clone())?;
    let num_workers = config.num_workers.unwrap_or(1);
    info!(
        sampler = sampler.name(),
        num_trials = config.num_trials,
        num_workers,
        num_layers = params.num_layers(),
        "starting experiment"
    );

    let mut aggregator = TrialAggregator::default();
    let mut records = Vec::new();
    let mut observe = |record: TrialRecord, aggregator: &mut TrialAggregator| {
        let solution = Solution::new(record.segments_used.clone());
        match aggregator.update(&solution, record.cost, record.feasible, config.epsilon) {
            Update::Improved => info!(
                trial = record.trial,
                itinerary = %format_segments(&record.segments_used),
                cost = record.cost,
                "new best itinerary"
            ),
            Update::Tied => debug!(trial = record.trial, cost = record.cost, "tied best cost"),
            Update::Ignored => {}
        }
        on_trial(&record);
        records.push(record);
    };

    if num_workers > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .build()?;
        let mut results = pool.install(|| {
            (0..config.num_trials)
                .into_par_iter()
                .map(|trial| run_trial(config, &params, sampler, trial))
                .collect::<Result<Vec<_>, _>>()
        })?;
        results.sort_by_key(|record| record.trial);
        for record in results {
            observe(record, &mut aggregator);
        }
    } else {
        for trial in 0..config.num_trials {
            let record = run_trial(config, &params, sampler, trial)?;
            observe(record, &mut aggregator);
        }
    }

    let success_rate = aggregator.success_rate(config.num_trials);
    let best = aggregator.best();
    let best = best.itinerary.as_ref().map(|itinerary| BestItinerary {
        segments_used: itinerary.segments_used.clone(),
        cost: best.cost,
        tie_count: best.tie_count,
    });
    match &best {
        Some(best) => info!(
            itinerary = %format_segments(&best.segments_used),
            cost = best.cost,
            success_rate,
            "experiment complete"
        ),
        None => warn!("experiment complete without a feasible itinerary"),
    }

    Ok(ExperimentReport {
        sampler: sampler.name().to_string(),
        num_trials: config.num_trials,
        success_rate,
        best,
        trials: records,
    })
}

/// Draws, checks and costs a single candidate. Does not touch any shared state.
pub fn run_trial(
    config: &ExperimentConfig,
    params: &VariationalParameters,
    sampler: &dyn Sampler,
    trial: u64,
) -> Result<TrialRecord, RunError> {
    let seed = config.calc_seed(trial);
    let max_attempts = config.max_oracle_retries.unwrap_or(0).saturating_add(1);

    let mut attempt = 0;
    let solution = loop {
        let attempt_seed = if attempt == 0 {
            seed
        } else {
            rehash_seed(&seed, attempt)
        };
        let challenge = Challenge::new(attempt_seed, &config.segment_costs, config.penalty)?;
        attempt += 1;
        match sampler.sample(&challenge, params) {
            Ok(solution) => break solution,
            Err(e) if attempt < max_attempts => {
                warn!(trial, attempt, error = %e, "sampler failed, retrying");
            }
            Err(e) => {
                return Err(RunError::OracleFailure {
                    trial,
                    attempts: attempt,
                    source: e.into(),
                })
            }
        }
    };

    let feasible = is_feasible(&solution.segments_used)?;
    let cost = calc_cost(&config.segment_costs, &solution.segments_used)?;
    debug!(
        trial,
        result = %format_segments(&solution.segments_used),
        cost,
        feasible,
        "trial complete"
    );

    Ok(TrialRecord {
        trial,
        segments_used: solution.segments_used,
        cost,
        feasible,
    })
}
