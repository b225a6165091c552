//! Population snapshots and the per-run history built from them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::base::Genotype;
use crate::errors::GraphError;
use crate::graph::structure::{count_genotypes, fixated};
use crate::graph::{Graph, Topology};

/// Genotype assignment across all nodes at one generation.
///
/// Snapshots are immutable once captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    generation: usize,
    genotypes: Vec<Genotype>,
}

impl PopulationSnapshot {
    /// Create a snapshot from raw labels.
    pub fn new(generation: usize, genotypes: Vec<Genotype>) -> Self {
        Self {
            generation,
            genotypes,
        }
    }

    /// Capture the current labels of `graph`.
    pub fn capture(generation: usize, graph: &Graph) -> Self {
        Self::new(generation, graph.genotypes().to_vec())
    }

    /// Generation this snapshot was taken at (0 = initial population).
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Genotype of every node, indexed by node identifier.
    pub fn genotypes(&self) -> &[Genotype] {
        &self.genotypes
    }

    /// Number of nodes recorded.
    pub fn node_count(&self) -> usize {
        self.genotypes.len()
    }

    /// Count of each of the first `genotype_count` genotypes.
    pub fn genotype_counts(&self, genotype_count: usize) -> Vec<usize> {
        count_genotypes(&self.genotypes, genotype_count)
    }

    /// Fraction of nodes carrying `genotype`.
    pub fn frequency(&self, genotype: Genotype) -> f64 {
        if self.genotypes.is_empty() {
            return 0.0;
        }
        let count = self.genotypes.iter().filter(|&&g| g == genotype).count();
        count as f64 / self.genotypes.len() as f64
    }

    /// The genotype occupying every node, if any.
    pub fn fixated_genotype(&self) -> Option<Genotype> {
        fixated(&self.genotypes)
    }

    /// First node whose genotype falls outside the first `genotype_count`.
    pub fn out_of_range(&self, genotype_count: usize) -> Option<(usize, Genotype)> {
        self.genotypes
            .iter()
            .copied()
            .enumerate()
            .find(|(_, g)| g.index() >= genotype_count)
    }

    /// Write this assignment onto `graph`.
    ///
    /// # Errors
    /// Fails if the graph's node count differs from the snapshot's.
    pub fn apply_to(&self, graph: &mut Graph) -> Result<(), GraphError> {
        graph.assign_genotypes(&self.genotypes)
    }

    /// Rebuild a labelled graph over `topology`.
    pub fn to_graph(&self, topology: impl Into<Arc<Topology>>) -> Result<Graph, GraphError> {
        Graph::with_genotypes(topology, self.genotypes.clone())
    }
}

/// Ordered, append-only sequence of snapshots over one topology.
///
/// This is what a renderer consumes: each entry pairs the shared topology
/// with the labels at that generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    topology: Arc<Topology>,
    genotype_count: usize,
    snapshots: Vec<PopulationSnapshot>,
}

impl History {
    /// An empty history over `topology`.
    pub fn new(topology: Arc<Topology>, genotype_count: usize) -> Self {
        Self {
            topology,
            genotype_count,
            snapshots: Vec::new(),
        }
    }

    /// Append a snapshot.
    ///
    /// Generations must be strictly increasing and cover every node of the
    /// topology. Every label must be one of the history's genotypes.
    pub(crate) fn push(&mut self, snapshot: PopulationSnapshot) -> Result<(), GraphError> {
        if snapshot.node_count() != self.topology.node_count() {
            return Err(GraphError::InvalidParameter(format!(
                "snapshot has {} nodes, topology has {}",
                snapshot.node_count(),
                self.topology.node_count()
            )));
        }
        if let Some((node, g)) = snapshot.out_of_range(self.genotype_count) {
            return Err(GraphError::InvalidParameter(format!(
                "node {node} has genotype {g}, only {} genotypes are in play",
                self.genotype_count
            )));
        }
        if let Some(last) = self.snapshots.last() {
            if snapshot.generation() <= last.generation() {
                return Err(GraphError::InvalidParameter(format!(
                    "snapshot generation {} does not follow {}",
                    snapshot.generation(),
                    last.generation()
                )));
            }
        }
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Build a history from already-ordered snapshots (for example when
    /// loading from storage).
    pub fn from_snapshots(
        topology: Arc<Topology>,
        genotype_count: usize,
        snapshots: Vec<PopulationSnapshot>,
    ) -> Result<Self, GraphError> {
        let mut history = Self::new(topology, genotype_count);
        for snapshot in snapshots {
            history.push(snapshot)?;
        }
        Ok(history)
    }

    /// Shared topology of every snapshot.
    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Size of the genotype set.
    pub fn genotype_count(&self) -> usize {
        self.genotype_count
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// All snapshots in generation order.
    pub fn snapshots(&self) -> &[PopulationSnapshot] {
        &self.snapshots
    }

    /// Iterate over snapshots in generation order.
    pub fn iter(&self) -> std::slice::Iter<'_, PopulationSnapshot> {
        self.snapshots.iter()
    }

    /// Most recent snapshot.
    pub fn last(&self) -> Option<&PopulationSnapshot> {
        self.snapshots.last()
    }

    /// Snapshot recorded at `generation`.
    pub fn get(&self, generation: usize) -> Option<&PopulationSnapshot> {
        self.snapshots
            .binary_search_by_key(&generation, PopulationSnapshot::generation)
            .ok()
            .map(|i| &self.snapshots[i])
    }

    /// First generation at which a single genotype held every node.
    pub fn fixation_generation(&self) -> Option<usize> {
        self.snapshots
            .iter()
            .find(|s| s.fixated_genotype().is_some())
            .map(PopulationSnapshot::generation)
    }

    /// Frequency of `genotype` at each recorded generation.
    pub fn frequency_trajectory(&self, genotype: Genotype) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.frequency(genotype)).collect()
    }

    /// Consume the history, returning its snapshots.
    pub fn into_snapshots(self) -> Vec<PopulationSnapshot> {
        self.snapshots
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a PopulationSnapshot;
    type IntoIter = std::slice::Iter<'a, PopulationSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(i: usize) -> Genotype {
        Genotype::from_index(i).unwrap()
    }

    fn path(n: usize) -> Arc<Topology> {
        let edges: Vec<_> = (1..n).map(|v| (v - 1, v)).collect();
        Arc::new(Topology::from_edges(n, &edges).unwrap())
    }

    #[test]
    fn test_snapshot_apply_reproduces_assignment() {
        let topology = path(4);
        let mut source = Graph::new(topology.clone());
        source.set_genotype(1, g(1)).unwrap();
        source.set_genotype(3, g(2)).unwrap();
        let snapshot = PopulationSnapshot::capture(5, &source);

        let mut fresh = Graph::new(Topology::clone(&topology));
        snapshot.apply_to(&mut fresh).unwrap();
        assert_eq!(fresh.genotypes(), source.genotypes());
        assert_eq!(snapshot.to_graph(topology).unwrap(), source);
    }

    #[test]
    fn test_snapshot_is_independent_of_later_mutation() {
        let mut graph = Graph::new(path(3));
        let snapshot = PopulationSnapshot::capture(0, &graph);
        graph.set_genotype(0, g(1)).unwrap();
        assert_eq!(snapshot.genotypes(), &[g(0), g(0), g(0)]);
    }

    #[test]
    fn test_frequency() {
        let snapshot = PopulationSnapshot::new(0, vec![g(0), g(1), g(1), g(1)]);
        assert_eq!(snapshot.frequency(g(1)), 0.75);
        assert_eq!(snapshot.genotype_counts(3), vec![1, 3, 0]);
    }

    #[test]
    fn test_history_ordering() {
        let mut history = History::new(path(2), 2);
        history.push(PopulationSnapshot::new(0, vec![g(0), g(1)])).unwrap();
        history.push(PopulationSnapshot::new(1, vec![g(1), g(1)])).unwrap();
        assert!(history.push(PopulationSnapshot::new(1, vec![g(1), g(1)])).is_err());
        assert!(history.push(PopulationSnapshot::new(2, vec![g(1)])).is_err());

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(1).unwrap().genotypes(), &[g(1), g(1)]);
        assert!(history.get(7).is_none());
        assert_eq!(history.fixation_generation(), Some(1));
        assert_eq!(history.frequency_trajectory(g(1)), vec![0.5, 1.0]);
    }

    #[test]
    fn test_history_rejects_unknown_genotype() {
        let mut history = History::new(path(3), 2);
        let snapshot = PopulationSnapshot::new(0, vec![g(0), g(5), g(2)]);
        assert_eq!(snapshot.out_of_range(2), Some((1, g(5))));
        assert_eq!(snapshot.out_of_range(6), None);
        assert!(history.push(snapshot).is_err());
        assert!(history.is_empty());

        let loaded = History::from_snapshots(
            path(2),
            2,
            vec![PopulationSnapshot::new(0, vec![g(0), g(2)])],
        );
        assert!(loaded.is_err());
    }

    #[test]
    fn test_history_serde() {
        let history = History::from_snapshots(
            path(3),
            2,
            vec![PopulationSnapshot::new(0, vec![g(0), g(1), g(0)])],
        )
        .unwrap();
        let json = serde_json::to_string(&history).unwrap();
        let back: History = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
    }
}
