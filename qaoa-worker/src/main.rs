use anyhow::{anyhow, Result};
use clap::{arg, ArgAction, Command};
use qaoa_algorithms::{sampler_from_name, SAMPLER_NAMES};
use qaoa_challenges::itinerary::{Challenge, Solution};
use qaoa_structs::{
    config::ExperimentConfig,
    core::{format_segments, ExperimentReport, TrialRecord},
};
use qaoa_utils::{compress_obj, decompress_obj, dejsonify, jsonify};
use qaoa_worker::run_experiment_with;
use serde_json::{Map, Value};
use std::{fs, io::Read, path::PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("qaoa-worker")
        .about("Samples segment-loop itineraries and reports the best one found")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Runs an experiment")
                .arg(
                    arg!([CONFIG] "Config json string or path to json file (defaults to the reference config)")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--sampler [SAMPLER] "Sampler used to draw candidates")
                        .default_value("qaoa")
                        .value_parser(SAMPLER_NAMES),
                )
                .arg(
                    arg!(--trials [TRIALS] "Overrides num_trials")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--workers [WORKERS] "Overrides num_workers")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"rand-hash" [RAND_HASH] "Overrides the string used in seed generation")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--retries [RETRIES] "Overrides max_oracle_retries")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the report will be saved to this file path (default json)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--compress "If output file is set, the report will be compressed as zlib")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--verbose "Logs every trial")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Checks feasibility and cost of a single itinerary")
                .arg(
                    arg!(<SOLUTION> "Solution json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!([CONFIG] "Config json string or path to json file (defaults to the reference config)")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Prints a saved experiment report")
                .arg(
                    arg!(<REPORT> "Path to a report written by 'run --output'")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("run", sub_m)) => run(
            sub_m.get_one::<String>("CONFIG").cloned(),
            sub_m.get_one::<String>("sampler").unwrap().clone(),
            sub_m.get_one::<u64>("trials").copied(),
            sub_m.get_one::<usize>("workers").copied(),
            sub_m.get_one::<String>("rand-hash").cloned(),
            sub_m.get_one::<u32>("retries").copied(),
            sub_m.get_one::<PathBuf>("output").cloned(),
            sub_m.get_flag("compress"),
            sub_m.get_flag("verbose"),
        ),
        Some(("evaluate", sub_m)) => evaluate(
            sub_m.get_one::<String>("SOLUTION").unwrap().clone(),
            sub_m.get_one::<String>("CONFIG").cloned(),
        ),
        Some(("report", sub_m)) => report(sub_m.get_one::<PathBuf>("REPORT").unwrap().clone()),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[allow(clippy::too_many_arguments)]
fn run(
    config: Option<String>,
    sampler: String,
    num_trials: Option<u64>,
    num_workers: Option<usize>,
    rand_hash: Option<String>,
    max_oracle_retries: Option<u32>,
    output_file: Option<PathBuf>,
    compress: bool,
    verbose: bool,
) -> Result<()> {
    init_logging(verbose);

    let mut config = load_config(config.as_deref())?;
    if let Some(num_trials) = num_trials {
        config.num_trials = num_trials;
    }
    if num_workers.is_some() {
        config.num_workers = num_workers;
    }
    if rand_hash.is_some() {
        config.rand_hash = rand_hash;
    }
    if max_oracle_retries.is_some() {
        config.max_oracle_retries = max_oracle_retries;
    }
    let sampler = sampler_from_name(&sampler)?;

    println!("Starting simulation\n");
    let report = run_experiment_with(&config, sampler.as_ref(), print_trial)?;
    println!("Simulation is complete\n");
    print_summary(&report);

    if let Some(path) = output_file {
        if compress {
            fs::write(&path, compress_obj(&report)?)?;
        } else {
            fs::write(&path, jsonify(&report))?;
        }
        println!("report written to: {:?}", path);
    }
    Ok(())
}

fn evaluate(solution: String, config: Option<String>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let solution = load_solution(&solution)?;
    let challenge = Challenge::new(config.calc_seed(0), &config.segment_costs, config.penalty)?;

    let cost = challenge.calc_cost(&solution)?;
    println!(
        "result = {}, cost = {:.2}",
        format_segments(&solution.segments_used),
        cost
    );
    match challenge.verify_solution(&solution) {
        Ok(_) => println!("Solution is feasible"),
        Err(e) => println!("{}", e),
    }
    Ok(())
}

fn report(path: PathBuf) -> Result<()> {
    let report: ExperimentReport = if path.extension().map_or(false, |ext| ext == "json") {
        dejsonify(&fs::read_to_string(&path)?)?
    } else {
        decompress_obj(&fs::read(&path)?)?
    };
    for record in &report.trials {
        print_trial(record);
    }
    println!();
    print_summary(&report);
    Ok(())
}

fn print_trial(record: &TrialRecord) {
    println!(
        "trial {}: result = {}, cost = {:.2}, feasible = {}",
        record.trial,
        format_segments(&record.segments_used),
        record.cost,
        record.feasible
    );
}

fn print_summary(report: &ExperimentReport) {
    match &report.best {
        Some(best) => println!(
            "Best itinerary found: {}, cost = {:.2}",
            format_segments(&best.segments_used),
            best.cost
        ),
        None => println!("No feasible itinerary found"),
    }
    println!(
        "{:.1}% of runs found the best itinerary ({} of {} trials feasible, sampler: {})\n",
        report.success_percent(),
        report.num_feasible(),
        report.num_trials,
        report.sampler
    );
}

fn load_config(config: Option<&str>) -> Result<ExperimentConfig> {
    let config = match config {
        None => return Ok(ExperimentConfig::default()),
        Some(config) if config.ends_with(".json") => fs::read_to_string(config)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", config, e))?,
        Some(config) => config.to_string(),
    };
    dejsonify::<ExperimentConfig>(&config).map_err(|e| anyhow!("Failed to parse config: {}", e))
}

fn load_solution(solution: &str) -> Result<Solution> {
    let solution = if solution == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow!("Failed to read solution from stdin: {}", e))?;
        buffer
    } else if solution.ends_with(".json") {
        fs::read_to_string(solution)
            .map_err(|e| anyhow!("Failed to read solution file {}: {}", solution, e))?
    } else {
        solution.to_string()
    };

    // A bare array of flags is shorthand for {"segments_used": [...]}
    let map = match dejsonify::<Value>(&solution)? {
        Value::Object(map) => map,
        flags @ Value::Array(_) => {
            let mut map = Map::new();
            map.insert("segments_used".to_string(), flags);
            map
        }
        _ => return Err(anyhow!("Failed to parse solution")),
    };
    Solution::try_from(map).map_err(|e| anyhow!("Failed to parse solution: {}", e))
}
