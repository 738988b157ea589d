use super::flow::Flow;
use super::network::FlowNetwork;
use ahash::AHashSet;
use std::collections::VecDeque;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    /// Unused capacity of an original edge.
    Forward,
    /// Cancellable flow of an original edge, traversed head to tail.
    Backward,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResidualArc {
    pub head: usize,
    pub edge: usize,
    pub direction: Direction,
    pub capacity: u64,
}

/// Residual graph derived from a single flow snapshot.
///
/// Arcs are added in edge-index order: a forward arc at the tail when the
/// edge has spare capacity, then a backward arc at the head when the edge
/// carries flow.
#[derive(Debug, Clone)]
pub struct ResidualGraph {
    adjacency: Vec<Vec<ResidualArc>>,
}

impl ResidualGraph {
    pub fn build(network: &FlowNetwork, flow: &Flow) -> Self {
        let mut adjacency = vec![Vec::new(); network.num_nodes()];
        for (e, link) in network.links().iter().enumerate() {
            let f = flow.get(e);
            if f < link.capacity {
                adjacency[link.tail].push(ResidualArc {
                    head: link.head,
                    edge: e,
                    direction: Direction::Forward,
                    capacity: link.capacity - f,
                });
            }
            if f > 0 {
                adjacency[link.head].push(ResidualArc {
                    head: link.tail,
                    edge: e,
                    direction: Direction::Backward,
                    capacity: f,
                });
            }
        }
        Self { adjacency }
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn arcs(&self, node: usize) -> &[ResidualArc] {
        &self.adjacency[node]
    }

    /// Marks every node from which `target` can be reached.
    pub fn reaches(&self, target: usize) -> Vec<bool> {
        let mut reverse = vec![Vec::new(); self.adjacency.len()];
        for (tail, arcs) in self.adjacency.iter().enumerate() {
            for arc in arcs {
                reverse[arc.head].push(tail);
            }
        }
        let mut marked = vec![false; self.adjacency.len()];
        let mut queue = VecDeque::from([target]);
        marked[target] = true;
        while let Some(node) = queue.pop_front() {
            for &prev in &reverse[node] {
                if !marked[prev] {
                    marked[prev] = true;
                    queue.push_back(prev);
                }
            }
        }
        marked
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentingPath {
    /// Node indices from source to sink.
    pub nodes: Vec<usize>,
    /// Residual arc taken at each step, `nodes.len() - 1` of them.
    pub arcs: Vec<ResidualArc>,
    pub bottleneck: u64,
}

impl AugmentingPath {
    /// Original edges traversed in their own direction, in path order.
    pub fn forward_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.arcs
            .iter()
            .filter(|arc| arc.direction == Direction::Forward)
            .map(|arc| arc.edge)
    }
}

/// Residual of `arc` re-derived from the network capacity and `flow`.
pub fn arc_residual(network: &FlowNetwork, flow: &Flow, arc: &ResidualArc) -> u64 {
    match arc.direction {
        Direction::Forward => network.capacity(arc.edge).saturating_sub(flow.get(arc.edge)),
        Direction::Backward => flow.get(arc.edge),
    }
}

/// Bottleneck of a sequence of residual arcs, derived from the original
/// capacities rather than from the arc snapshots. Returns `None` when some
/// step has no positive residual.
pub fn path_bottleneck(network: &FlowNetwork, flow: &Flow, arcs: &[ResidualArc]) -> Option<u64> {
    let mut bottleneck: Option<u64> = None;
    for arc in arcs {
        let residual = arc_residual(network, flow, arc);
        if residual == 0 {
            return None;
        }
        bottleneck = Some(bottleneck.map_or(residual, |b| b.min(residual)));
    }
    bottleneck
}

/// Collects up to `max_paths` distinct simple source-to-sink paths in the
/// residual graph of `flow`, depth first in residual adjacency order.
///
/// Each attempt restarts the traversal with a fresh visited set; an attempt
/// that contributes no new path ends the search.
pub fn find_augmenting_paths(
    network: &FlowNetwork,
    flow: &Flow,
    max_paths: usize,
) -> Vec<AugmentingPath> {
    let mut paths = Vec::new();
    if max_paths == 0 {
        return paths;
    }
    let residual = ResidualGraph::build(network, flow);
    let alive = residual.reaches(network.sink());
    if !alive[network.source()] {
        return paths;
    }

    let mut seen: AHashSet<Vec<usize>> = AHashSet::new();
    for _ in 0..max_paths {
        let added = search_attempt(network, flow, &residual, &alive, max_paths, &mut seen, &mut paths);
        if added == 0 || paths.len() >= max_paths {
            break;
        }
    }
    paths
}

fn search_attempt(
    network: &FlowNetwork,
    flow: &Flow,
    residual: &ResidualGraph,
    alive: &[bool],
    max_paths: usize,
    seen: &mut AHashSet<Vec<usize>>,
    paths: &mut Vec<AugmentingPath>,
) -> usize {
    let source = network.source();
    let sink = network.sink();
    let mut visited = vec![false; residual.num_nodes()];
    visited[source] = true;
    let mut path = vec![source];
    let mut taken: Vec<ResidualArc> = Vec::new();
    let mut cursor = vec![0usize];
    let mut added = 0;

    while let Some(&node) = path.last() {
        if paths.len() >= max_paths {
            break;
        }
        let depth = path.len() - 1;
        let arcs = residual.arcs(node);
        let i = cursor[depth];
        if i >= arcs.len() {
            visited[node] = false;
            path.pop();
            taken.pop();
            cursor.pop();
            continue;
        }
        cursor[depth] += 1;

        let arc = arcs[i];
        if visited[arc.head] || !alive[arc.head] {
            continue;
        }
        if arc.head == sink {
            path.push(sink);
            taken.push(arc);
            if let Some(bottleneck) = path_bottleneck(network, flow, &taken) {
                if seen.insert(path.clone()) {
                    paths.push(AugmentingPath {
                        nodes: path.clone(),
                        arcs: taken.clone(),
                        bottleneck,
                    });
                    added += 1;
                }
            }
            path.pop();
            taken.pop();
            continue;
        }
        visited[arc.head] = true;
        path.push(arc.head);
        taken.push(arc);
        cursor.push(0);
    }
    added
}
