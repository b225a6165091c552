use std::fmt;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::base::Genotype;
use crate::errors::GraphError;
use crate::graph::Topology;

/// A population on an undirected graph: shared immutable topology plus one
/// genotype label per node.
///
/// Only labels change after construction. The topology is reference counted
/// so history records can point at it without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    topology: Arc<Topology>,
    genotypes: Vec<Genotype>,
}

impl Graph {
    /// Wrap a topology, labelling every node with the first genotype.
    pub fn new(topology: impl Into<Arc<Topology>>) -> Self {
        let topology = topology.into();
        let genotypes = vec![Genotype::default(); topology.node_count()];
        Self {
            topology,
            genotypes,
        }
    }

    /// Wrap a topology with an explicit genotype per node.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if the label count differs from the node
    /// count.
    pub fn with_genotypes(
        topology: impl Into<Arc<Topology>>,
        genotypes: Vec<Genotype>,
    ) -> Result<Self, GraphError> {
        let topology = topology.into();
        if genotypes.len() != topology.node_count() {
            return Err(GraphError::InvalidParameter(format!(
                "expected {} genotype labels, got {}",
                topology.node_count(),
                genotypes.len()
            )));
        }
        Ok(Self {
            topology,
            genotypes,
        })
    }

    /// Build a graph from an explicit edge list.
    pub fn from_edges(node_count: usize, edges: &[(usize, usize)]) -> Result<Self, GraphError> {
        Ok(Self::new(Topology::from_edges(node_count, edges)?))
    }

    /// Random G(n, p) graph drawn from `rng`.
    pub fn random<R: Rng + ?Sized>(
        node_count: usize,
        edge_probability: f64,
        rng: &mut R,
    ) -> Result<Self, GraphError> {
        Ok(Self::new(Topology::random(node_count, edge_probability, rng)?))
    }

    /// Random G(n, p) graph, reproducible from `seed`.
    pub fn random_seeded(
        node_count: usize,
        edge_probability: f64,
        seed: u64,
    ) -> Result<Self, GraphError> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        Self::random(node_count, edge_probability, &mut rng)
    }

    /// Shared topology.
    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Number of nodes (the population size).
    pub fn node_count(&self) -> usize {
        self.genotypes.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.topology.edge_count()
    }

    /// True if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.genotypes.is_empty()
    }

    /// All node identifiers; restartable by calling again.
    pub fn nodes(&self) -> std::ops::Range<usize> {
        self.topology.nodes()
    }

    /// Adjacent nodes of `node`.
    pub fn neighbors(&self, node: usize) -> Result<&[usize], GraphError> {
        self.topology.neighbors(node)
    }

    /// Genotype of `node`.
    pub fn genotype(&self, node: usize) -> Result<Genotype, GraphError> {
        self.genotypes
            .get(node)
            .copied()
            .ok_or(GraphError::UnknownNode {
                node,
                node_count: self.node_count(),
            })
    }

    /// Overwrite the genotype of `node`.
    pub fn set_genotype(&mut self, node: usize, genotype: Genotype) -> Result<(), GraphError> {
        let node_count = self.node_count();
        let slot = self
            .genotypes
            .get_mut(node)
            .ok_or(GraphError::UnknownNode { node, node_count })?;
        *slot = genotype;
        Ok(())
    }

    /// Genotype of every node, indexed by node identifier.
    pub fn genotypes(&self) -> &[Genotype] {
        &self.genotypes
    }

    /// Replace every label at once.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if the label count differs from the node
    /// count; the graph is left untouched in that case.
    pub fn assign_genotypes(&mut self, genotypes: &[Genotype]) -> Result<(), GraphError> {
        if genotypes.len() != self.node_count() {
            return Err(GraphError::InvalidParameter(format!(
                "expected {} genotype labels, got {}",
                self.node_count(),
                genotypes.len()
            )));
        }
        self.genotypes.copy_from_slice(genotypes);
        Ok(())
    }

    /// Number of nodes carrying each of the first `genotype_count` genotypes.
    ///
    /// Labels outside the range are not counted.
    pub fn genotype_counts(&self, genotype_count: usize) -> Vec<usize> {
        count_genotypes(&self.genotypes, genotype_count)
    }

    /// The genotype occupying every node, if any.
    pub fn fixated_genotype(&self) -> Option<Genotype> {
        fixated(&self.genotypes)
    }

    /// True once a single genotype occupies the entire population.
    pub fn has_fixated(&self) -> bool {
        self.fixated_genotype().is_some()
    }
}

pub(crate) fn count_genotypes(genotypes: &[Genotype], genotype_count: usize) -> Vec<usize> {
    let mut counts = vec![0; genotype_count];
    for g in genotypes {
        if let Some(c) = counts.get_mut(g.index()) {
            *c += 1;
        }
    }
    counts
}

pub(crate) fn fixated(genotypes: &[Genotype]) -> Option<Genotype> {
    let (first, rest) = genotypes.split_first()?;
    rest.iter().all(|g| g == first).then_some(*first)
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes:")?;
        for (node, genotype) in self.genotypes.iter().enumerate() {
            writeln!(f, "  ID: {node}, Genotype: {genotype}")?;
        }
        write!(f, "Edges:")?;
        for (u, v) in self.topology.edges() {
            write!(f, "\n  Edge: ({u}, {v})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(i: usize) -> Genotype {
        Genotype::from_index(i).unwrap()
    }

    #[test]
    fn test_read_after_write() {
        let mut graph = Graph::random_seeded(10, 0.5, 1).unwrap();
        for node in graph.nodes() {
            let genotype = g(node % 3);
            graph.set_genotype(node, genotype).unwrap();
            assert_eq!(graph.genotype(node).unwrap(), genotype);
        }
    }

    #[test]
    fn test_unknown_node() {
        let mut graph = Graph::from_edges(3, &[(0, 1)]).unwrap();
        let expected = GraphError::UnknownNode {
            node: 3,
            node_count: 3,
        };
        assert_eq!(graph.genotype(3), Err(expected.clone()));
        assert_eq!(graph.set_genotype(3, g(0)), Err(expected.clone()));
        assert_eq!(graph.neighbors(3), Err(expected));
    }

    #[test]
    fn test_nodes_is_restartable() {
        let graph = Graph::from_edges(4, &[]).unwrap();
        let first: Vec<_> = graph.nodes().collect();
        let second: Vec<_> = graph.nodes().collect();
        assert_eq!(first, vec![0, 1, 2, 3]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_genotype_counts_and_fixation() {
        let mut graph = Graph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        assert!(graph.has_fixated());
        assert_eq!(graph.fixated_genotype(), Some(g(0)));

        graph.set_genotype(2, g(1)).unwrap();
        assert_eq!(graph.genotype_counts(2), vec![2, 1]);
        assert!(!graph.has_fixated());
    }

    #[test]
    fn test_with_genotypes_length_mismatch() {
        let err = Graph::with_genotypes(Topology::empty(3), vec![g(0); 2]).unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameter(_)));
    }

    #[test]
    fn test_assign_genotypes_leaves_graph_on_error() {
        let mut graph = Graph::new(Topology::empty(2));
        assert!(graph.assign_genotypes(&[g(1)]).is_err());
        assert_eq!(graph.genotypes(), &[g(0), g(0)]);
        graph.assign_genotypes(&[g(1), g(0)]).unwrap();
        assert_eq!(graph.genotypes(), &[g(1), g(0)]);
    }

    #[test]
    fn test_clone_shares_topology() {
        let graph = Graph::random_seeded(8, 0.4, 3).unwrap();
        let copy = graph.clone();
        assert!(Arc::ptr_eq(graph.topology(), copy.topology()));
    }

    #[test]
    fn test_display() {
        let mut graph = Graph::from_edges(2, &[(0, 1)]).unwrap();
        graph.set_genotype(1, g(1)).unwrap();
        let text = graph.to_string();
        assert!(text.contains("ID: 1, Genotype: B"));
        assert!(text.contains("Edge: (0, 1)"));
    }
}
