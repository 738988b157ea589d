use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Node label as supplied by the caller.
pub type NodeId = u32;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Totals built from capacities and flows saturate at `u64::MAX`.
    pub capacity: u64,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, capacity: u64) -> Self {
        Self { from, to, capacity }
    }
}

impl From<(NodeId, NodeId, u64)> for Edge {
    fn from((from, to, capacity): (NodeId, NodeId, u64)) -> Self {
        Self { from, to, capacity }
    }
}

/// An edge of the dense edge table. `tail` and `head` are node indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Link {
    pub tail: usize,
    pub head: usize,
    pub capacity: u64,
}

/// Immutable capacitated graph with dense node and edge indices.
///
/// Node indices are assigned in order of first appearance in the edge list,
/// followed by the source and sink if they have no incident edge. Edge
/// indices follow the order in which each `(from, to)` pair first appears;
/// a repeated pair overwrites the capacity but keeps its original position.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    labels: Vec<NodeId>,
    node_index: AHashMap<NodeId, usize>,
    links: Vec<Link>,
    link_index: AHashMap<(usize, usize), usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    source: usize,
    sink: usize,
}

impl FlowNetwork {
    /// Callers must ensure `source != sink`.
    pub fn new(edges: &[Edge], source: NodeId, sink: NodeId) -> Self {
        let mut labels = Vec::new();
        let mut node_index = AHashMap::new();
        let mut intern = |label: NodeId| -> usize {
            *node_index.entry(label).or_insert_with(|| {
                labels.push(label);
                labels.len() - 1
            })
        };

        let mut links: Vec<Link> = Vec::with_capacity(edges.len());
        let mut link_index: AHashMap<(usize, usize), usize> = AHashMap::with_capacity(edges.len());
        for edge in edges {
            let tail = intern(edge.from);
            let head = intern(edge.to);
            match link_index.get(&(tail, head)) {
                Some(&e) => links[e].capacity = edge.capacity,
                None => {
                    link_index.insert((tail, head), links.len());
                    links.push(Link {
                        tail,
                        head,
                        capacity: edge.capacity,
                    });
                }
            }
        }
        let source = intern(source);
        let sink = intern(sink);

        let mut outgoing = vec![Vec::new(); labels.len()];
        let mut incoming = vec![Vec::new(); labels.len()];
        for (e, link) in links.iter().enumerate() {
            outgoing[link.tail].push(e);
            incoming[link.head].push(e);
        }

        Self {
            labels,
            node_index,
            links,
            link_index,
            outgoing,
            incoming,
            source,
            sink,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.labels.len()
    }

    pub fn num_edges(&self) -> usize {
        self.links.len()
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn sink(&self) -> usize {
        self.sink
    }

    pub fn is_terminal(&self, node: usize) -> bool {
        node == self.source || node == self.sink
    }

    /// Every node other than source and sink, in index order.
    pub fn interior_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.labels.len()).filter(move |&n| !self.is_terminal(n))
    }

    pub fn label(&self, node: usize) -> NodeId {
        self.labels[node]
    }

    pub fn node_index(&self, label: NodeId) -> Option<usize> {
        self.node_index.get(&label).copied()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link(&self, e: usize) -> &Link {
        &self.links[e]
    }

    pub fn capacity(&self, e: usize) -> u64 {
        self.links[e].capacity
    }

    pub fn outgoing(&self, node: usize) -> &[usize] {
        &self.outgoing[node]
    }

    pub fn incoming(&self, node: usize) -> &[usize] {
        &self.incoming[node]
    }

    /// Index of the original edge `tail -> head`, if the caller supplied one.
    pub fn find_edge(&self, tail: usize, head: usize) -> Option<usize> {
        self.link_index.get(&(tail, head)).copied()
    }

    /// Index of the original edge between two labels.
    pub fn find_edge_by_label(&self, from: NodeId, to: NodeId) -> Option<usize> {
        let tail = self.node_index(from)?;
        let head = self.node_index(to)?;
        self.find_edge(tail, head)
    }

    pub fn edge(&self, e: usize) -> Edge {
        let link = &self.links[e];
        Edge {
            from: self.labels[link.tail],
            to: self.labels[link.head],
            capacity: link.capacity,
        }
    }

    /// The deduplicated edge list, in edge-index order.
    pub fn edges(&self) -> Vec<Edge> {
        (0..self.links.len()).map(|e| self.edge(e)).collect()
    }

    pub fn source_capacity(&self) -> u64 {
        self.outgoing[self.source]
            .iter()
            .fold(0u64, |total, &e| total.saturating_add(self.links[e].capacity))
    }

    pub fn sink_capacity(&self) -> u64 {
        self.incoming[self.sink]
            .iter()
            .fold(0u64, |total, &e| total.saturating_add(self.links[e].capacity))
    }
}
