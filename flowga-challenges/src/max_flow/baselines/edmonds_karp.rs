use crate::max_flow::{EdgeFlow, Flow, FlowNetwork};
use ahash::AHashMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MaxFlowResult {
    pub max_flow: u64,
    /// Flow on every original edge; edges without flow hold zero.
    pub flow: Flow,
}

impl MaxFlowResult {
    /// Original-direction edges with positive flow and positive capacity.
    pub fn flow_map(&self, network: &FlowNetwork) -> Vec<EdgeFlow> {
        self.flow.positive_edge_flows(network)
    }
}

#[derive(Debug, Copy, Clone)]
struct Slot {
    head: usize,
    capacity: u64,
    residual: u64,
    reverse: usize,
}

/// Shortest augmenting path max-flow over a bidirectional residual table.
///
/// Every original edge `u -> v` owns a slot paired with a `v -> u` slot. The
/// reverse slot starts at zero capacity unless the caller also supplied
/// `v -> u`, in which case both directions share the pair.
pub struct EdmondsKarp<'a> {
    network: &'a FlowNetwork,
    slots: Vec<Slot>,
    adjacency: Vec<Vec<usize>>,
    slot_index: AHashMap<(usize, usize), usize>,
}

impl<'a> EdmondsKarp<'a> {
    pub fn new(network: &'a FlowNetwork) -> Self {
        let mut slots: Vec<Slot> = Vec::with_capacity(2 * network.num_edges());
        let mut adjacency = vec![Vec::new(); network.num_nodes()];
        let mut slot_index = AHashMap::with_capacity(2 * network.num_edges());

        for link in network.links() {
            if link.tail == link.head {
                continue;
            }
            match slot_index.get(&(link.tail, link.head)) {
                Some(&s) => {
                    let slot: &mut Slot = &mut slots[s];
                    slot.capacity = link.capacity;
                    slot.residual = link.capacity;
                }
                None => {
                    let s = slots.len();
                    slots.push(Slot {
                        head: link.head,
                        capacity: link.capacity,
                        residual: link.capacity,
                        reverse: s + 1,
                    });
                    slots.push(Slot {
                        head: link.tail,
                        capacity: 0,
                        residual: 0,
                        reverse: s,
                    });
                    adjacency[link.tail].push(s);
                    adjacency[link.head].push(s + 1);
                    slot_index.insert((link.tail, link.head), s);
                    slot_index.insert((link.head, link.tail), s + 1);
                }
            }
        }

        Self {
            network,
            slots,
            adjacency,
            slot_index,
        }
    }

    /// Breadth-first search for the shortest augmenting path. Returns the
    /// slots along the path, source first, and its bottleneck.
    fn find_augmenting_path(&self) -> Option<(Vec<usize>, u64)> {
        let source = self.network.source();
        let sink = self.network.sink();
        let n = self.network.num_nodes();
        let mut parent: Vec<Option<usize>> = vec![None; n];
        let mut bottleneck = vec![0u64; n];
        let mut visited = vec![false; n];
        visited[source] = true;
        bottleneck[source] = u64::MAX;

        let mut queue = VecDeque::from([source]);
        'bfs: while let Some(u) = queue.pop_front() {
            for &s in &self.adjacency[u] {
                let slot = &self.slots[s];
                if slot.residual == 0 || visited[slot.head] {
                    continue;
                }
                visited[slot.head] = true;
                parent[slot.head] = Some(s);
                bottleneck[slot.head] = bottleneck[u].min(slot.residual);
                if slot.head == sink {
                    break 'bfs;
                }
                queue.push_back(slot.head);
            }
        }
        if !visited[sink] {
            return None;
        }

        let mut path = Vec::new();
        let mut node = sink;
        while let Some(s) = parent[node] {
            path.push(s);
            node = self.slots[self.slots[s].reverse].head;
        }
        path.reverse();
        Some((path, bottleneck[sink]))
    }

    pub fn solve(mut self) -> MaxFlowResult {
        let mut max_flow = 0u64;
        let mut augmentations = 0usize;
        while let Some((path, bottleneck)) = self.find_augmenting_path() {
            for &s in &path {
                let reverse = self.slots[s].reverse;
                self.slots[s].residual -= bottleneck;
                self.slots[reverse].residual = self.slots[reverse].residual.saturating_add(bottleneck);
            }
            max_flow = max_flow.saturating_add(bottleneck);
            augmentations += 1;
            trace!(
                "augmented {} along a path of {} edges",
                bottleneck,
                path.len()
            );
        }
        debug!(
            "max flow {} after {} augmentations",
            max_flow, augmentations
        );

        let mut flow = Flow::zeros(self.network);
        for (e, link) in self.network.links().iter().enumerate() {
            if let Some(&s) = self.slot_index.get(&(link.tail, link.head)) {
                let slot = &self.slots[s];
                if slot.residual < slot.capacity {
                    flow.set(e, slot.capacity - slot.residual);
                }
            }
        }
        MaxFlowResult { max_flow, flow }
    }
}

pub fn solve(network: &FlowNetwork) -> MaxFlowResult {
    EdmondsKarp::new(network).solve()
}
