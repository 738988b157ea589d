use super::balancer::balance;
use super::params::Params;
use flowga_challenges::max_flow::residual::find_augmenting_paths;
use flowga_challenges::max_flow::{Flow, FlowNetwork};
use rand::{rngs::SmallRng, Rng};

/// Sums, per original edge, the bottlenecks of up to `max_paths` augmenting
/// paths taken from each parent independently. Backward steps contribute
/// nothing. Values are not clamped.
pub fn accumulate_paths(network: &FlowNetwork, parents: &[&Flow], max_paths: usize) -> Vec<u64> {
    let mut accumulator = vec![0u64; network.num_edges()];
    for parent in parents {
        for path in find_augmenting_paths(network, parent, max_paths) {
            for e in path.forward_edges() {
                accumulator[e] = accumulator[e].saturating_add(path.bottleneck);
            }
        }
    }
    accumulator
}

/// Path-based recombination.
///
/// With probability `1 - crossover_rate` a clone of one parent is returned.
/// Otherwise the child carries the accumulated path flows of both parents,
/// clamped to capacity, zero on every other edge, then balanced.
pub fn crossover(
    network: &FlowNetwork,
    parent1: &Flow,
    parent2: &Flow,
    params: &Params,
    rng: &mut SmallRng,
) -> Flow {
    if !rng.gen_bool(params.crossover_rate) {
        return if rng.gen_bool(0.5) {
            parent1.clone()
        } else {
            parent2.clone()
        };
    }

    let mut values = accumulate_paths(network, &[parent1, parent2], params.max_paths_crossover);
    for (e, value) in values.iter_mut().enumerate() {
        *value = (*value).min(network.capacity(e));
    }
    let mut child = Flow::from_values(values);
    balance(network, &mut child);
    child
}
