use anyhow::{anyhow, Result};
use clap::{arg, Command};
use flowga_algorithms::max_flow::genetic::{self, RunControl, RunOutput, SolutionSummary};
use flowga_challenges::max_flow::*;
use flowga_utils::{calc_seed, jsonify_pretty, load_json, u8s_from_str};
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};
use statrs::statistics::Statistics;
use std::{
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

fn cli() -> Command {
    Command::new("flowga-runner")
        .about("Generates max-flow instances and solves them exactly or with the genetic search")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("generate")
                .about("Generates a random instance")
                .arg(
                    arg!(<SEED> "A string hashed into the instance seed")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<NUM_NODES> "Number of nodes, source and sink included")
                        .value_parser(clap::value_parser!(i32)),
                )
                .arg(
                    arg!(--max_capacity [MAX_CAPACITY] "Largest edge capacity (default 20)")
                        .value_parser(clap::value_parser!(i32)),
                ),
        )
        .subcommand(
            Command::new("max_flow")
                .about("Computes the exact maximum flow")
                .arg(
                    arg!(<CHALLENGE> "Challenge json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("solve")
                .about("Runs the genetic search and compares it with the exact maximum flow")
                .arg(
                    arg!(<CHALLENGE> "Challenge json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--hyperparameters [HYPERPARAMETERS] "Hyperparameters json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--timeout [TIMEOUT] "Seconds before the search is cancelled")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("compare")
                .about("Compares a candidate flow with the exact maximum flow")
                .arg(
                    arg!(<CHALLENGE> "Challenge json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<FLOW> "Flow json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("benchmark")
                .about("Solves generated instances and reports optimality statistics")
                .arg(
                    arg!(<NUM_NODES> "Number of nodes per instance")
                        .value_parser(clap::value_parser!(i32)),
                )
                .arg(
                    arg!(--seeds [SEEDS] "Number of instances (default 10)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--max_capacity [MAX_CAPACITY] "Largest edge capacity (default 20)")
                        .value_parser(clap::value_parser!(i32)),
                )
                .arg(
                    arg!(--rand_hash [RAND_HASH] "A string used in seed generation (default 'flowga')")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--hyperparameters [HYPERPARAMETERS] "Hyperparameters json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("generate", sub_m)) => generate(
            sub_m.get_one::<String>("SEED").unwrap().clone(),
            *sub_m.get_one::<i32>("NUM_NODES").unwrap(),
            sub_m.get_one::<i32>("max_capacity").cloned(),
        ),
        Some(("max_flow", sub_m)) => max_flow(sub_m.get_one::<String>("CHALLENGE").unwrap()),
        Some(("solve", sub_m)) => solve(
            sub_m.get_one::<String>("CHALLENGE").unwrap(),
            sub_m.get_one::<String>("hyperparameters").cloned(),
            sub_m.get_one::<u64>("timeout").cloned(),
        ),
        Some(("compare", sub_m)) => compare_flow(
            sub_m.get_one::<String>("CHALLENGE").unwrap(),
            sub_m.get_one::<String>("FLOW").unwrap(),
        ),
        Some(("benchmark", sub_m)) => benchmark(
            *sub_m.get_one::<i32>("NUM_NODES").unwrap(),
            sub_m.get_one::<u64>("seeds").cloned().unwrap_or(10),
            sub_m.get_one::<i32>("max_capacity").cloned(),
            sub_m
                .get_one::<String>("rand_hash")
                .cloned()
                .unwrap_or_else(|| "flowga".to_string()),
            sub_m.get_one::<String>("hyperparameters").cloned(),
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

const DEFAULT_MAX_CAPACITY: i32 = 20;

#[derive(Serialize)]
struct SolveReport {
    best_fitness: i64,
    best_flow_map: Vec<EdgeFlow>,
    fitness_history: Vec<i64>,
    top_solutions: Vec<SolutionSummary>,
    last_improvement_generation: usize,
    convergence_speed: f64,
    generations_run: usize,
    cancelled: bool,
    elapsed_ms: u128,
    comparison: Comparison,
}

#[derive(Serialize)]
struct BenchmarkReport {
    num_instances: usize,
    feasible_instances: usize,
    optimal_instances: usize,
    mean_optimality_ratio: f64,
    std_optimality_ratio: f64,
    mean_convergence_speed: f64,
    mean_elapsed_ms: f64,
}

fn load_challenge(challenge: &str) -> Result<Challenge> {
    let challenge = load_json::<Challenge>(challenge)?;
    if challenge.source == challenge.sink {
        return Err(anyhow!(
            "Source and sink must differ (both are {})",
            challenge.source
        ));
    }
    Ok(challenge)
}

fn load_hyperparameters(hyperparameters: Option<String>) -> Result<Option<Map<String, Value>>> {
    hyperparameters
        .map(|h| load_json::<Map<String, Value>>(&h))
        .transpose()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", jsonify_pretty(value)?);
    Ok(())
}

fn difficulty(num_nodes: i32, max_capacity: Option<i32>) -> Result<Difficulty> {
    let max_capacity = max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY);
    if num_nodes < 2 {
        return Err(anyhow!("Number of nodes must be at least 2"));
    }
    if max_capacity < 1 {
        return Err(anyhow!("Max capacity must be at least 1"));
    }
    Ok(Difficulty::from(vec![num_nodes, max_capacity]))
}

pub fn generate(seed: String, num_nodes: i32, max_capacity: Option<i32>) -> Result<()> {
    let difficulty = difficulty(num_nodes, max_capacity)?;
    let challenge = Challenge::generate_instance(&u8s_from_str(&seed), &difficulty)?;
    print_json(&challenge)
}

pub fn max_flow(challenge: &str) -> Result<()> {
    let challenge = load_challenge(challenge)?;
    let network = challenge.network();
    let result = EdmondsKarp::new(&network).solve();
    print_json(&serde_json::json!({
        "max_flow": result.max_flow,
        "flow_map": result.flow_map(&network),
    }))
}

/// Runs the search on a scoped thread. The timeout only raises the
/// cancellation flag; the search stops at its next check and keeps its best.
fn run_with_timeout(
    challenge: &Challenge,
    hyperparameters: &Option<Map<String, Value>>,
    timeout: Option<Duration>,
) -> Result<RunOutput> {
    let cancel = AtomicBool::new(false);
    let (done_tx, done_rx) = mpsc::channel::<()>();
    thread::scope(|s| {
        let cancel = &cancel;
        if let Some(timeout) = timeout {
            s.spawn(move || {
                if done_rx.recv_timeout(timeout).is_err() {
                    info!("timeout of {:?} reached, cancelling", timeout);
                    cancel.store(true, Ordering::Relaxed);
                }
            });
        }
        let worker = s.spawn(move || {
            let progress = |generation: usize| {
                if generation > 0 && generation % 25 == 0 {
                    info!("generation {}", generation);
                }
            };
            let control = RunControl {
                cancel: Some(cancel),
                progress: Some(&progress),
            };
            let output = genetic::solve_challenge_with_control(challenge, hyperparameters, &control);
            let _ = done_tx.send(());
            output
        });
        worker
            .join()
            .map_err(|_| anyhow!("Genetic search panicked"))?
    })
}

pub fn solve(challenge: &str, hyperparameters: Option<String>, timeout: Option<u64>) -> Result<()> {
    let challenge = load_challenge(challenge)?;
    let hyperparameters = load_hyperparameters(hyperparameters)?;
    let network = challenge.network();

    let start = Instant::now();
    let output = run_with_timeout(
        &challenge,
        &hyperparameters,
        timeout.map(Duration::from_secs),
    )?;
    let elapsed_ms = start.elapsed().as_millis();

    let report = SolveReport {
        best_fitness: output.best_fitness,
        best_flow_map: output.best_flow.positive_edge_flows(&network),
        fitness_history: output.fitness_history.clone(),
        top_solutions: output.top_summary(&network),
        last_improvement_generation: output.last_improvement_generation,
        convergence_speed: output.convergence_speed(),
        generations_run: output.generations_run,
        cancelled: output.cancelled,
        elapsed_ms,
        comparison: challenge.compare(&output.best_flow),
    };
    print_json(&report)
}

pub fn compare_flow(challenge: &str, flow: &str) -> Result<()> {
    let challenge = load_challenge(challenge)?;
    let network = challenge.network();
    let flow = load_json::<FlowInput>(flow)?.resolve(&network)?;
    if let Err(e) = challenge.verify_flow(&network, &flow) {
        info!("candidate flow is not valid: {}", e);
    }
    print_json(&compare(&network, &flow))
}

pub fn benchmark(
    num_nodes: i32,
    seeds: u64,
    max_capacity: Option<i32>,
    rand_hash: String,
    hyperparameters: Option<String>,
) -> Result<()> {
    if seeds == 0 {
        return Err(anyhow!("At least one seed is required"));
    }
    let hyperparameters = load_hyperparameters(hyperparameters)?;
    let difficulty = difficulty(num_nodes, max_capacity)?;

    let mut ratios = Vec::with_capacity(seeds as usize);
    let mut convergence = Vec::with_capacity(seeds as usize);
    let mut elapsed = Vec::with_capacity(seeds as usize);
    let mut feasible_instances = 0;
    let mut optimal_instances = 0;
    for nonce in 0..seeds {
        let challenge = Challenge::generate_instance(&calc_seed(&rand_hash, nonce), &difficulty)?;
        let start = Instant::now();
        let output = genetic::solve_challenge(&challenge, &hyperparameters)?;
        elapsed.push(start.elapsed().as_secs_f64() * 1000.0);

        let comparison = challenge.compare(&output.best_flow);
        if output.best_fitness >= 0 {
            feasible_instances += 1;
            ratios.push(comparison.optimality_ratio);
        } else {
            ratios.push(0.0);
        }
        if comparison.absolute_diff == 0 && output.best_fitness >= 0 {
            optimal_instances += 1;
        }
        convergence.push(output.convergence_speed());
        info!(
            "instance {}: genetic {} / exact {} ({:.2}%)",
            nonce, output.best_fitness, comparison.optimal_flow, comparison.optimality_ratio
        );
    }

    let std_optimality_ratio = if ratios.len() > 1 {
        ratios.iter().std_dev()
    } else {
        0.0
    };
    print_json(&BenchmarkReport {
        num_instances: ratios.len(),
        feasible_instances,
        optimal_instances,
        mean_optimality_ratio: ratios.iter().mean(),
        std_optimality_ratio,
        mean_convergence_speed: convergence.iter().mean(),
        mean_elapsed_ms: elapsed.iter().mean(),
    })
}
