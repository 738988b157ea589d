use super::network::{FlowNetwork, NodeId};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Flow carried by one edge, keyed by node labels.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct EdgeFlow {
    pub from: NodeId,
    pub to: NodeId,
    pub flow: u64,
}

/// Per-edge flow values indexed by the edge indices of a [`FlowNetwork`].
///
/// An empty `Flow` (the `Default`) reads as zero on every edge. Values are not
/// required to respect capacities or conservation; see [`Flow::within_capacity`]
/// and [`Flow::is_conserved`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Flow {
    values: Vec<u64>,
}

impl Flow {
    pub fn zeros(network: &FlowNetwork) -> Self {
        Self {
            values: vec![0; network.num_edges()],
        }
    }

    pub fn from_values(values: Vec<u64>) -> Self {
        Self { values }
    }

    /// Builds a flow from label-keyed entries. Edges that are not mentioned
    /// carry zero.
    pub fn from_edge_flows(network: &FlowNetwork, edge_flows: &[EdgeFlow]) -> Result<Self> {
        let mut flow = Self::zeros(network);
        for ef in edge_flows {
            let e = network
                .find_edge_by_label(ef.from, ef.to)
                .ok_or_else(|| anyhow!("Edge ({}, {}) is not in the network", ef.from, ef.to))?;
            flow.values[e] = ef.flow;
        }
        Ok(flow)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [u64] {
        &mut self.values
    }

    pub fn get(&self, e: usize) -> u64 {
        self.values.get(e).copied().unwrap_or(0)
    }

    pub fn set(&mut self, e: usize, value: u64) {
        self.values[e] = value;
    }

    pub fn inflow(&self, network: &FlowNetwork, node: usize) -> u64 {
        self.total(network.incoming(node))
    }

    pub fn outflow(&self, network: &FlowNetwork, node: usize) -> u64 {
        self.total(network.outgoing(node))
    }

    fn total(&self, edges: &[usize]) -> u64 {
        edges
            .iter()
            .fold(0u64, |total, &e| total.saturating_add(self.get(e)))
    }

    pub fn source_outflow(&self, network: &FlowNetwork) -> u64 {
        self.outflow(network, network.source())
    }

    pub fn sink_inflow(&self, network: &FlowNetwork) -> u64 {
        self.inflow(network, network.sink())
    }

    /// First interior node whose inflow differs from its outflow.
    pub fn first_unbalanced_node(&self, network: &FlowNetwork) -> Option<usize> {
        network
            .interior_nodes()
            .find(|&n| self.inflow(network, n) != self.outflow(network, n))
    }

    pub fn is_conserved(&self, network: &FlowNetwork) -> bool {
        self.first_unbalanced_node(network).is_none()
    }

    pub fn within_capacity(&self, network: &FlowNetwork) -> bool {
        (0..network.num_edges()).all(|e| self.get(e) <= network.capacity(e))
    }

    /// Every edge of the network with its flow, in edge-index order.
    pub fn edge_flows(&self, network: &FlowNetwork) -> Vec<EdgeFlow> {
        (0..network.num_edges())
            .map(|e| {
                let edge = network.edge(e);
                EdgeFlow {
                    from: edge.from,
                    to: edge.to,
                    flow: self.get(e),
                }
            })
            .collect()
    }

    /// Edges with strictly positive flow and strictly positive capacity.
    pub fn positive_edge_flows(&self, network: &FlowNetwork) -> Vec<EdgeFlow> {
        self.edge_flows(network)
            .into_iter()
            .enumerate()
            .filter(|&(e, ef)| ef.flow > 0 && network.capacity(e) > 0)
            .map(|(_, ef)| ef)
            .collect()
    }
}

/// A flow as it arrives from outside: either serialized [`Flow`] values or
/// label-keyed [`EdgeFlow`] entries.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FlowInput {
    Values(Flow),
    EdgeFlows(Vec<EdgeFlow>),
}

impl FlowInput {
    /// Index values are taken as is, label entries must name existing edges.
    pub fn resolve(self, network: &FlowNetwork) -> Result<Flow> {
        match self {
            FlowInput::Values(flow) => Ok(flow),
            FlowInput::EdgeFlows(edge_flows) => Flow::from_edge_flows(network, &edge_flows),
        }
    }
}
