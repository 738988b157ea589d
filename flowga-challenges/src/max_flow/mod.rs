pub mod baselines;
mod comparison;
mod flow;
mod network;
pub mod residual;

pub use baselines::{EdmondsKarp, MaxFlowResult};
pub use comparison::{compare, Comparison};
pub use flow::{EdgeFlow, Flow, FlowInput};
pub use network::{Edge, FlowNetwork, Link, NodeId};

use ahash::AHashSet;
use anyhow::{anyhow, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub struct Difficulty {
    pub num_nodes: usize,
    pub max_capacity: u32,
}

impl From<Vec<i32>> for Difficulty {
    fn from(arr: Vec<i32>) -> Self {
        Self {
            num_nodes: arr[0] as usize,
            max_capacity: arr[1] as u32,
        }
    }
}

impl Into<Vec<i32>> for Difficulty {
    fn into(self) -> Vec<i32> {
        vec![self.num_nodes as i32, self.max_capacity as i32]
    }
}

/// Probability of each extra forward edge in generated instances.
pub const EDGE_DENSITY: f64 = 0.3;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Challenge {
    pub seed: [u8; 32],
    pub source: NodeId,
    pub sink: NodeId,
    pub edges: Vec<Edge>,
}

impl Challenge {
    pub fn new(seed: [u8; 32], edges: Vec<Edge>, source: NodeId, sink: NodeId) -> Result<Self> {
        if source == sink {
            return Err(anyhow!("Source and sink must differ (both are {})", source));
        }
        Ok(Self {
            seed,
            source,
            sink,
            edges,
        })
    }

    /// Random layered graph on `num_nodes` nodes with source `0` and sink
    /// `num_nodes - 1`. All edges point from lower to higher labels; every
    /// interior node has at least one incoming and one outgoing edge.
    pub fn generate_instance(seed: &[u8; 32], difficulty: &Difficulty) -> Result<Self> {
        if difficulty.num_nodes < 2 {
            return Err(anyhow!("Number of nodes must be at least 2"));
        }
        if difficulty.max_capacity == 0 {
            return Err(anyhow!("Max capacity must be at least 1"));
        }
        let mut rng = SmallRng::from_seed(seed.clone());
        let n = difficulty.num_nodes;
        let max_capacity = difficulty.max_capacity as u64;

        let mut present: AHashSet<(usize, usize)> = AHashSet::new();
        let mut edges = Vec::new();
        let mut add_edge = |u: usize, v: usize, rng: &mut SmallRng| {
            if present.insert((u, v)) {
                edges.push(Edge::new(
                    u as NodeId,
                    v as NodeId,
                    rng.gen_range(1..=max_capacity),
                ));
            }
        };

        // Every non-source node is fed from below
        for v in 1..n {
            let u = rng.gen_range(0..v);
            add_edge(u, v, &mut rng);
        }
        // Every interior node drains upwards
        for u in 1..n - 1 {
            let v = rng.gen_range(u + 1..n);
            add_edge(u, v, &mut rng);
        }
        for u in 0..n {
            for v in (u + 1)..n {
                if rng.gen_bool(EDGE_DENSITY) {
                    add_edge(u, v, &mut rng);
                }
            }
        }

        Self::new(seed.clone(), edges, 0, (n - 1) as NodeId)
    }

    pub fn network(&self) -> FlowNetwork {
        FlowNetwork::new(&self.edges, self.source, self.sink)
    }

    /// Checks capacities and conservation, returning the flow value.
    pub fn verify_flow(&self, network: &FlowNetwork, flow: &Flow) -> Result<u64> {
        if flow.values().len() != network.num_edges() {
            return Err(anyhow!(
                "Flow has {} values but the network has {} edges",
                flow.values().len(),
                network.num_edges()
            ));
        }
        for e in 0..network.num_edges() {
            if flow.get(e) > network.capacity(e) {
                let edge = network.edge(e);
                return Err(anyhow!(
                    "Flow {} on edge ({}, {}) exceeds capacity {}",
                    flow.get(e),
                    edge.from,
                    edge.to,
                    edge.capacity
                ));
            }
        }
        if let Some(node) = flow.first_unbalanced_node(network) {
            return Err(anyhow!(
                "Flow is not conserved at node {} (inflow {}, outflow {})",
                network.label(node),
                flow.inflow(network, node),
                flow.outflow(network, node)
            ));
        }
        Ok(flow.source_outflow(network))
    }

    pub fn compare(&self, flow: &Flow) -> Comparison {
        compare(&self.network(), flow)
    }
}
