use super::adaptive::MutationController;
use super::crossover::crossover;
use super::mutation::mutate;
use super::params::Params;
use super::population::{
    diverse_individual, fitness, initial_population, pad_top_solutions, rank, top_solutions,
    tournament_select, RankedFlow, INFEASIBLE_FITNESS,
};
use flowga_challenges::max_flow::{Flow, FlowNetwork};
use log::{debug, info};
use rand::{rngs::SmallRng, Rng};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Bias of individuals injected by `fresh_immigrants`.
const IMMIGRANT_BIAS: f64 = 0.7;

/// Hooks a host can attach to a run.
///
/// `cancel` is polled before every generation and before every bred child;
/// `progress` receives the index of each generation as it starts.
#[derive(Default, Clone, Copy)]
pub struct RunControl<'a> {
    pub cancel: Option<&'a AtomicBool>,
    pub progress: Option<&'a dyn Fn(usize)>,
}

impl<'a> RunControl<'a> {
    fn cancelled(&self) -> bool {
        self.cancel.map_or(false, |c| c.load(Ordering::Relaxed))
    }

    fn report(&self, generation: usize) {
        if let Some(progress) = self.progress {
            progress(generation);
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SolutionSummary {
    pub fitness: i64,
    pub source_outflow: u64,
    pub sink_inflow: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub best_flow: Flow,
    pub best_fitness: i64,
    /// Best fitness seen so far, one entry per scored generation.
    pub fitness_history: Vec<i64>,
    pub top_solutions: Vec<RankedFlow>,
    /// Generation of the last strict improvement of the best fitness.
    pub last_improvement_generation: usize,
    pub generations_run: usize,
    pub cancelled: bool,
}

impl RunOutput {
    /// Share of the run spent before the last improvement. Lower values mean
    /// the search settled early.
    pub fn convergence_speed(&self) -> f64 {
        if self.generations_run == 0 {
            0.0
        } else {
            self.last_improvement_generation as f64 / self.generations_run as f64
        }
    }

    pub fn top_summary(&self, network: &FlowNetwork) -> Vec<SolutionSummary> {
        self.top_solutions
            .iter()
            .map(|ranked| SolutionSummary {
                fitness: ranked.fitness,
                source_outflow: ranked.flow.source_outflow(network),
                sink_inflow: ranked.flow.sink_inflow(network),
            })
            .collect()
    }
}

pub struct GeneticSolver<'a> {
    pub network: &'a FlowNetwork,
    pub params: Params,
    controller: MutationController,
}

impl<'a> GeneticSolver<'a> {
    pub fn new(network: &'a FlowNetwork, params: Params) -> Self {
        let params = params.sanitized();
        let controller = MutationController::new(&params);
        Self {
            network,
            params,
            controller,
        }
    }

    pub fn mutation_rate(&self) -> f64 {
        self.controller.rate()
    }

    /// Two parents by tournament when the population is larger than the
    /// tournament, uniformly otherwise, then crossover and mutation.
    fn breed(&self, population: &[Flow], scores: &[i64], rng: &mut SmallRng) -> Flow {
        let tournament_size = self.params.tournament_size;
        let (i, j) = if tournament_size > 0 && population.len() > tournament_size {
            (
                tournament_select(scores, tournament_size, rng),
                tournament_select(scores, tournament_size, rng),
            )
        } else {
            (
                rng.gen_range(0..population.len()),
                rng.gen_range(0..population.len()),
            )
        };
        let mut child = crossover(self.network, &population[i], &population[j], &self.params, rng);
        mutate(self.network, &mut child, self.controller.rate(), rng);
        child
    }

    /// Replaces the last `max(1, population_size / 20)` slots with fresh
    /// diverse individuals. The first `elite_count` slots are never touched.
    pub fn inject_immigrants(&self, population: &mut [Flow], rng: &mut SmallRng) {
        let count = (self.params.population_size / 20).max(1);
        let elites = self.params.elite_count.min(population.len());
        for slot in (elites..population.len()).rev().take(count) {
            population[slot] = diverse_individual(self.network, IMMIGRANT_BIAS, rng);
        }
    }

    pub fn run(&mut self, rng: &mut SmallRng, control: &RunControl) -> RunOutput {
        self.controller.reset();
        let params = self.params;
        info!(
            "starting genetic search: {} individuals, {} generations, {} nodes, {} edges",
            params.population_size,
            params.generations,
            self.network.num_nodes(),
            self.network.num_edges()
        );

        let mut population = initial_population(self.network, params.population_size, rng);
        let mut best: Option<(i64, Flow)> = None;
        let mut fitness_history = Vec::with_capacity(params.generations);
        let mut top = Vec::new();
        let mut last_improvement_generation = 0;
        let mut generations_run = 0;
        let mut cancelled = false;
        let immigration_period = (params.generations / 10).max(1);

        for generation in 0..params.generations {
            if control.cancelled() {
                cancelled = true;
                break;
            }
            control.report(generation);

            let scores: Vec<i64> = population
                .iter()
                .map(|flow| fitness(self.network, flow))
                .collect();
            if population.is_empty() || scores.is_empty() {
                break;
            }

            let order = rank(&scores);
            let leader = order[0];
            let current_max = scores[leader];
            let improved = best.as_ref().map_or(true, |(b, _)| current_max > *b);
            if improved {
                best = Some((current_max, population[leader].clone()));
                last_improvement_generation = generation;
            }
            let best_fitness = best.as_ref().map_or(INFEASIBLE_FITNESS, |(b, _)| *b);
            fitness_history.push(best_fitness);
            self.controller.record(improved);
            generations_run += 1;

            top = top_solutions(&population, &scores, &order);

            if generation % params.nb_gen_traces == 0 {
                debug!(
                    "generation {:5} | best {:6} | current {:6} | feasible {:3}/{} | mutation rate {:.4}",
                    generation,
                    best_fitness,
                    current_max,
                    scores.iter().filter(|&&s| s != INFEASIBLE_FITNESS).count(),
                    scores.len(),
                    self.controller.rate()
                );
            }

            let mut next: Vec<Flow> = order
                .iter()
                .take(params.elite_count)
                .map(|&i| population[i].clone())
                .collect();
            while next.len() < params.population_size {
                if control.cancelled() {
                    cancelled = true;
                    break;
                }
                next.push(self.breed(&population, &scores, rng));
            }
            if cancelled {
                break;
            }

            if params.fresh_immigrants && generation > 0 && generation % immigration_period == 0 {
                self.inject_immigrants(&mut next, rng);
            }
            population = next;
        }

        let (best_fitness, best_flow) = best.unwrap_or((INFEASIBLE_FITNESS, Flow::default()));
        // Cancelled before the first generation was scored
        pad_top_solutions(&mut top);

        info!(
            "genetic search finished after {} generations{}: best fitness {} (last improvement at generation {})",
            generations_run,
            if cancelled { " (cancelled)" } else { "" },
            best_fitness,
            last_improvement_generation
        );

        RunOutput {
            best_flow,
            best_fitness,
            fitness_history,
            top_solutions: top,
            last_improvement_generation,
            generations_run,
            cancelled,
        }
    }
}
