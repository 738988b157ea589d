use super::baselines::edmonds_karp;
use super::flow::{EdgeFlow, Flow};
use super::network::FlowNetwork;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Total flow leaving the source in the candidate.
    pub candidate_flow: u64,
    pub optimal_flow: u64,
    /// `candidate_flow / optimal_flow * 100`, or 0 when the optimum is 0.
    pub optimality_ratio: f64,
    /// `optimal_flow - candidate_flow`. Negative only for infeasible candidates.
    pub absolute_diff: i64,
    pub candidate_conserved: bool,
    pub candidate_within_capacity: bool,
    pub candidate_flow_map: Vec<EdgeFlow>,
    pub optimal_flow_map: Vec<EdgeFlow>,
}

/// Scores `candidate` against an exact max-flow computed on `network`.
pub fn compare(network: &FlowNetwork, candidate: &Flow) -> Comparison {
    let candidate_flow = candidate.source_outflow(network);
    let optimal = edmonds_karp::solve(network);
    let optimality_ratio = if optimal.max_flow > 0 {
        candidate_flow as f64 / optimal.max_flow as f64 * 100.0
    } else {
        0.0
    };

    Comparison {
        candidate_flow,
        optimal_flow: optimal.max_flow,
        optimality_ratio,
        absolute_diff: optimal.max_flow as i64 - candidate_flow as i64,
        candidate_conserved: candidate.is_conserved(network),
        candidate_within_capacity: candidate.within_capacity(network),
        candidate_flow_map: candidate.edge_flows(network),
        optimal_flow_map: optimal.flow_map(network),
    }
}
