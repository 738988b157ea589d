//! Evolutionary max-flow search.
//!
//! Individuals are complete edge-flow assignments. Every individual is pushed
//! through the [`balancer`] before it is scored, crossover recombines the
//! augmenting paths of both parents rather than single edges, and individuals
//! that still break conservation score [`INFEASIBLE_FITNESS`].
pub mod adaptive;
pub mod balancer;
pub mod crossover;
pub mod mutation;
pub mod params;
pub mod population;
pub mod solver;

pub use params::Params;
pub use population::{RankedFlow, INFEASIBLE_FITNESS, TOP_K_REPORTED};
pub use solver::{GeneticSolver, RunControl, RunOutput, SolutionSummary};

use anyhow::{anyhow, Result};
use flowga_challenges::max_flow::Challenge;
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::{Map, Value};

pub fn solve_challenge(
    challenge: &Challenge,
    hyperparameters: &Option<Map<String, Value>>,
) -> Result<RunOutput> {
    solve_challenge_with_control(challenge, hyperparameters, &RunControl::default())
}

/// Runs the search with a generator seeded from `challenge.seed`, so the same
/// challenge and hyperparameters always give the same output.
pub fn solve_challenge_with_control(
    challenge: &Challenge,
    hyperparameters: &Option<Map<String, Value>>,
    control: &RunControl,
) -> Result<RunOutput> {
    if challenge.source == challenge.sink {
        return Err(anyhow!(
            "Source and sink must differ (both are {})",
            challenge.source
        ));
    }
    let network = challenge.network();
    let params = Params::initialize(hyperparameters);
    let mut rng = SmallRng::from_seed(challenge.seed);
    let mut solver = GeneticSolver::new(&network, params);
    Ok(solver.run(&mut rng, control))
}
