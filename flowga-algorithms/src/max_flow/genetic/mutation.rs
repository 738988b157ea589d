use super::balancer::balance;
use flowga_challenges::max_flow::{Flow, FlowNetwork};
use rand::{rngs::SmallRng, Rng};

/// Resamples each edge uniformly in `[0, capacity]` with probability `rate`,
/// then rebalances.
pub fn mutate(network: &FlowNetwork, flow: &mut Flow, rate: f64, rng: &mut SmallRng) {
    if flow.values().len() != network.num_edges() {
        balance(network, flow);
    }
    for (e, link) in network.links().iter().enumerate() {
        if rng.gen::<f64>() < rate {
            flow.set(e, rng.gen_range(0..=link.capacity));
        }
    }
    balance(network, flow);
}
