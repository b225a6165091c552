//! Immutable undirected topology.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::GraphError;

/// Default number of resampling attempts when a connected graph is required.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// An undirected simple graph over nodes `0..node_count`, stored as an
/// adjacency list.
///
/// A `Topology` never changes after construction. Node identifiers are dense
/// indices, so the set of nodes is always `0..node_count()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    adjacency: Vec<Vec<usize>>,
    edge_count: usize,
}

impl Topology {
    /// A topology with `node_count` nodes and no edges.
    pub fn empty(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
            edge_count: 0,
        }
    }

    /// The complete graph on `node_count` nodes.
    pub fn complete(node_count: usize) -> Self {
        let adjacency = (0..node_count)
            .map(|u| (0..node_count).filter(|&v| v != u).collect())
            .collect();
        Self {
            adjacency,
            edge_count: node_count * node_count.saturating_sub(1) / 2,
        }
    }

    /// Build a topology from an explicit edge list.
    ///
    /// # Errors
    /// Rejects self-loops, duplicate edges (in either orientation) and edges
    /// naming a node outside `0..node_count`.
    pub fn from_edges(node_count: usize, edges: &[(usize, usize)]) -> Result<Self, GraphError> {
        let mut topology = Self::empty(node_count);
        for &(u, v) in edges {
            topology.add_edge(u, v)?;
        }
        Ok(topology)
    }

    /// Sample an Erdős–Rényi G(n, p) graph: every unordered pair of distinct
    /// nodes is connected independently with probability `edge_probability`.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `node_count < 1` or the probability is
    /// not in `[0, 1]`.
    pub fn random<R: Rng + ?Sized>(
        node_count: usize,
        edge_probability: f64,
        rng: &mut R,
    ) -> Result<Self, GraphError> {
        check_parameters(node_count, edge_probability)?;

        let mut topology = Self::empty(node_count);
        for u in 0..node_count {
            for v in (u + 1)..node_count {
                // random() is in [0, 1): p = 0 never connects, p = 1 always does
                if rng.random::<f64>() < edge_probability {
                    topology.push_edge(u, v);
                }
            }
        }
        Ok(topology)
    }

    /// Resample [`Topology::random`] until the result is connected.
    ///
    /// # Errors
    /// Returns `Disconnected` if no connected sample was drawn within
    /// `max_attempts` tries.
    pub fn random_connected<R: Rng + ?Sized>(
        node_count: usize,
        edge_probability: f64,
        max_attempts: usize,
        rng: &mut R,
    ) -> Result<Self, GraphError> {
        check_parameters(node_count, edge_probability)?;

        for _ in 0..max_attempts {
            let topology = Self::random(node_count, edge_probability, rng)?;
            if topology.is_connected() {
                return Ok(topology);
            }
        }
        Err(GraphError::Disconnected {
            attempts: max_attempts,
        })
    }

    fn add_edge(&mut self, u: usize, v: usize) -> Result<(), GraphError> {
        if u == v {
            return Err(GraphError::SelfLoop(u));
        }
        for node in [u, v] {
            if !self.contains(node) {
                return Err(GraphError::UnknownNode {
                    node,
                    node_count: self.node_count(),
                });
            }
        }
        if self.adjacency[u].contains(&v) {
            return Err(GraphError::DuplicateEdge(u, v));
        }
        self.push_edge(u, v);
        Ok(())
    }

    fn push_edge(&mut self, u: usize, v: usize) {
        self.adjacency[u].push(v);
        self.adjacency[v].push(u);
        self.edge_count += 1;
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// True if `node` is a valid identifier.
    pub fn contains(&self, node: usize) -> bool {
        node < self.adjacency.len()
    }

    /// All node identifiers, in ascending order.
    pub fn nodes(&self) -> std::ops::Range<usize> {
        0..self.adjacency.len()
    }

    /// Adjacent nodes of `node`, in insertion order.
    pub fn neighbors(&self, node: usize) -> Result<&[usize], GraphError> {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .ok_or(GraphError::UnknownNode {
                node,
                node_count: self.node_count(),
            })
    }

    /// Degree of `node`.
    pub fn degree(&self, node: usize) -> Result<usize, GraphError> {
        self.neighbors(node).map(<[usize]>::len)
    }

    /// Each edge once as `(u, v)` with `u < v`, ordered by `u` then insertion.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::with_capacity(self.edge_count);
        for (u, neighbors) in self.adjacency.iter().enumerate() {
            for &v in neighbors {
                if u < v {
                    edges.push((u, v));
                }
            }
        }
        edges
    }

    /// Depth-first check that every node is reachable from node 0.
    ///
    /// The single-node graph is connected; the empty graph is not.
    pub fn is_connected(&self) -> bool {
        let n = self.node_count();
        if n == 0 {
            return false;
        }

        let mut visited = vec![false; n];
        let mut stack = vec![0];
        visited[0] = true;
        let mut seen = 1;

        while let Some(u) = stack.pop() {
            for &v in &self.adjacency[u] {
                if !visited[v] {
                    visited[v] = true;
                    seen += 1;
                    stack.push(v);
                }
            }
        }

        seen == n
    }
}

fn check_parameters(node_count: usize, edge_probability: f64) -> Result<(), GraphError> {
    if node_count < 1 {
        return Err(GraphError::InvalidParameter(
            "node count must be at least 1".into(),
        ));
    }
    if !(0.0..=1.0).contains(&edge_probability) {
        return Err(GraphError::InvalidParameter(format!(
            "edge probability must be between 0.0 and 1.0, got {edge_probability}"
        )));
    }
    Ok(())
}
