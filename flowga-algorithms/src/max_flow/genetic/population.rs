use super::balancer::balance;
use flowga_challenges::max_flow::{Flow, FlowNetwork};
use rand::{rngs::SmallRng, seq::index, Rng};
use serde::{Deserialize, Serialize};

/// Fitness of any individual that breaks conservation at an interior node.
pub const INFEASIBLE_FITNESS: i64 = -1;

/// Number of ranked solutions reported after a run.
pub const TOP_K_REPORTED: usize = 5;

/// Bias range used to spread the diverse half of the initial population.
const MIN_BIAS: f64 = 0.5;
const BIAS_SPREAD: f64 = 0.4;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RankedFlow {
    pub fitness: i64,
    pub flow: Flow,
}

impl RankedFlow {
    pub fn placeholder() -> Self {
        Self {
            fitness: 0,
            flow: Flow::default(),
        }
    }
}

/// `min(source outflow, sink inflow)` for conserving flows, otherwise
/// [`INFEASIBLE_FITNESS`].
pub fn fitness(network: &FlowNetwork, flow: &Flow) -> i64 {
    if !flow.is_conserved(network) {
        return INFEASIBLE_FITNESS;
    }
    flow.source_outflow(network)
        .min(flow.sink_inflow(network)) as i64
}

pub fn random_individual(network: &FlowNetwork, rng: &mut SmallRng) -> Flow {
    let values = network
        .links()
        .iter()
        .map(|link| rng.gen_range(0..=link.capacity))
        .collect();
    let mut flow = Flow::from_values(values);
    balance(network, &mut flow);
    flow
}

/// Edges leaving the source or entering the sink start in the top
/// `1 - bias` share of their capacity; every other edge is uniform.
pub fn diverse_individual(network: &FlowNetwork, bias: f64, rng: &mut SmallRng) -> Flow {
    let values = network
        .links()
        .iter()
        .map(|link| {
            if link.tail == network.source() || link.head == network.sink() {
                if bias >= 1.0 {
                    link.capacity
                } else {
                    (link.capacity as f64 * rng.gen_range(bias.max(0.0)..1.0)) as u64
                }
            } else {
                rng.gen_range(0..=link.capacity)
            }
        })
        .collect();
    let mut flow = Flow::from_values(values);
    balance(network, &mut flow);
    flow
}

/// Half uniform individuals, half diverse ones with bias rising from 0.5
/// towards 0.9.
pub fn initial_population(network: &FlowNetwork, size: usize, rng: &mut SmallRng) -> Vec<Flow> {
    let standard_count = size / 2;
    let diverse_count = size - standard_count;
    let mut population = Vec::with_capacity(size);
    for _ in 0..standard_count {
        population.push(random_individual(network, rng));
    }
    for i in 0..diverse_count {
        let bias = MIN_BIAS + (i as f64 / diverse_count as f64) * BIAS_SPREAD;
        population.push(diverse_individual(network, bias, rng));
    }
    population
}

/// Index of the strictly best individual among `size` distinct random ones.
/// The first sampled contender wins ties.
pub fn tournament_select(scores: &[i64], size: usize, rng: &mut SmallRng) -> usize {
    let amount = size.max(1).min(scores.len());
    let contenders = index::sample(rng, scores.len(), amount);
    let mut best = contenders.index(0);
    for i in contenders.iter().skip(1) {
        if scores[i] > scores[best] {
            best = i;
        }
    }
    best
}

/// Population indices sorted by descending fitness. Ties keep population order.
pub fn rank(scores: &[i64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].cmp(&scores[a]));
    order
}

/// The best [`TOP_K_REPORTED`] individuals, padded with placeholders.
pub fn top_solutions(population: &[Flow], scores: &[i64], order: &[usize]) -> Vec<RankedFlow> {
    let mut top: Vec<RankedFlow> = order
        .iter()
        .take(TOP_K_REPORTED)
        .map(|&i| RankedFlow {
            fitness: scores[i],
            flow: population[i].clone(),
        })
        .collect();
    pad_top_solutions(&mut top);
    top
}

pub fn pad_top_solutions(top: &mut Vec<RankedFlow>) {
    top.truncate(TOP_K_REPORTED);
    while top.len() < TOP_K_REPORTED {
        top.push(RankedFlow::placeholder());
    }
}
