//! Frequency-dependent fitness on a graph.
//!
//! A node's fitness depends on its own genotype and the genotypes of its
//! neighbours. The engine computes it in two steps:
//!
//! 1. **Expected payoff**: the mean payoff the focal node receives from
//!    interacting with each neighbour, read from the [`PayoffMatrix`]. An
//!    isolated node has payoff 0.
//! 2. **Fitness mapping**: a [`FitnessFunction`] turns payoff and selection
//!    intensity `w` into a non-negative fitness.
//!
//! The selection intensity interpolates between neutral drift (`w = 0`: every
//! node has fitness 1) and payoff-driven selection (`w = 1`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::base::{FitnessValue, Genotype, PayoffMatrix};
use crate::errors::GraphError;
use crate::graph::Graph;

/// Maps an expected payoff to a fitness value.
///
/// Implementors must return fitness 1 for every payoff when
/// `selection_intensity == 0`, so that zero intensity is neutral drift.
///
/// ```rust
/// use evographs_sim::base::FitnessValue;
/// use evographs_sim::evolution::FitnessFunction;
///
/// #[derive(Debug)]
/// struct Squared;
///
/// impl FitnessFunction for Squared {
///     fn fitness(&self, payoff: f64, w: f64) -> FitnessValue {
///         FitnessValue::new(1.0 - w + w * payoff * payoff)
///     }
/// }
///
/// assert_eq!(Squared.fitness(3.0, 0.0).get(), 1.0);
/// ```
pub trait FitnessFunction: fmt::Debug {
    /// Fitness of an individual with the given expected payoff.
    fn fitness(&self, payoff: f64, selection_intensity: f64) -> FitnessValue;
}

/// Built-in fitness mappings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessModel {
    /// `1 - w + w * payoff`: weak-selection linear mapping.
    #[default]
    Linear,
    /// `exp(w * payoff)`: always positive, also defined for large `w`.
    Exponential,
}

impl FitnessFunction for FitnessModel {
    fn fitness(&self, payoff: f64, w: f64) -> FitnessValue {
        match self {
            Self::Linear => FitnessValue::new(1.0 - w + w * payoff),
            Self::Exponential => FitnessValue::new((w * payoff).exp()),
        }
    }
}

impl fmt::Display for FitnessModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Exponential => write!(f, "exponential"),
        }
    }
}

impl std::str::FromStr for FitnessModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "exponential" | "exp" => Ok(Self::Exponential),
            other => Err(format!(
                "Unknown fitness model '{other}'. Use: linear or exponential"
            )),
        }
    }
}

/// Mean payoff `focal` receives against `neighbors`; 0 with no neighbours.
pub fn expected_payoff<I>(payoff: &PayoffMatrix, focal: Genotype, neighbors: I) -> f64
where
    I: IntoIterator<Item = Genotype>,
{
    let (total, count) = neighbors
        .into_iter()
        .fold((0.0, 0usize), |(total, count), other| {
            (total + payoff.payoff(focal, other), count + 1)
        });
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Everything needed to score a population: payoffs, mapping and intensity.
#[derive(Debug)]
pub struct FitnessLandscape<'a> {
    pub payoff: &'a PayoffMatrix,
    pub function: &'a dyn FitnessFunction,
    pub selection_intensity: f64,
}

impl FitnessLandscape<'_> {
    /// Expected payoff of `node` given its current neighbourhood.
    pub fn node_payoff(&self, graph: &Graph, node: usize) -> Result<f64, GraphError> {
        let focal = graph.genotype(node)?;
        let genotypes = graph.genotypes();
        let neighbors = graph.neighbors(node)?;
        Ok(expected_payoff(
            self.payoff,
            focal,
            neighbors.iter().map(|&v| genotypes[v]),
        ))
    }

    /// Fitness of `node`.
    pub fn node_fitness(&self, graph: &Graph, node: usize) -> Result<FitnessValue, GraphError> {
        let payoff = self.node_payoff(graph, node)?;
        Ok(self.function.fitness(payoff, self.selection_intensity))
    }

    /// Fitness of every node, indexed by node identifier.
    pub fn compute(&self, graph: &Graph) -> Result<Vec<FitnessValue>, GraphError> {
        graph.nodes().map(|node| self.node_fitness(graph, node)).collect()
    }

    /// Mean fitness of each of the first `genotype_count` genotypes.
    ///
    /// Genotypes absent from the population are reported as `None`.
    pub fn mean_fitness_by_genotype(
        &self,
        graph: &Graph,
        fitness: &[FitnessValue],
        genotype_count: usize,
    ) -> Vec<Option<f64>> {
        let mut sums = vec![0.0; genotype_count];
        let mut counts = vec![0usize; genotype_count];
        for (g, f) in graph.genotypes().iter().zip(fitness) {
            if let Some(sum) = sums.get_mut(g.index()) {
                *sum += f.get();
                counts[g.index()] += 1;
            }
        }
        sums.into_iter()
            .zip(counts)
            .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(i: usize) -> Genotype {
        Genotype::from_index(i).unwrap()
    }

    fn prisoners() -> PayoffMatrix {
        // A cooperates, B defects
        PayoffMatrix::new(vec![vec![3.0, 0.0], vec![5.0, 1.0]]).unwrap()
    }

    #[test]
    fn test_zero_intensity_is_neutral() {
        for model in [FitnessModel::Linear, FitnessModel::Exponential] {
            for payoff in [0.0, 0.3, 7.5] {
                assert_eq!(model.fitness(payoff, 0.0), FitnessValue::NEUTRAL_FITNESS);
            }
        }
    }

    #[test]
    fn test_linear_full_intensity_is_payoff() {
        assert!((FitnessModel::Linear.fitness(0.8, 1.0).get() - 0.8).abs() < 1e-12);
        assert!((FitnessModel::Linear.fitness(0.8, 0.5).get() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_exponential() {
        let f = FitnessModel::Exponential.fitness(2.0, 0.5);
        assert!((f.get() - 1.0_f64.exp()).abs() < 1e-12);
    }

    #[test]
    fn test_expected_payoff() {
        let m = prisoners();
        assert_eq!(expected_payoff(&m, g(0), std::iter::empty()), 0.0);
        assert_eq!(expected_payoff(&m, g(0), [g(0), g(1)]), 1.5);
        assert_eq!(expected_payoff(&m, g(1), [g(0), g(0), g(1), g(1)]), 3.0);
    }

    #[test]
    fn test_landscape_node_payoff_uses_neighbours() {
        // star: 0 at the centre, 1..3 leaves
        let mut graph = Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3)]).unwrap();
        graph.set_genotype(0, g(1)).unwrap();
        let m = prisoners();
        let landscape = FitnessLandscape {
            payoff: &m,
            function: &FitnessModel::Linear,
            selection_intensity: 1.0,
        };

        // centre defector facing three cooperators
        assert_eq!(landscape.node_payoff(&graph, 0).unwrap(), 5.0);
        // each leaf cooperator faces the defector only
        assert_eq!(landscape.node_payoff(&graph, 2).unwrap(), 0.0);

        let fitness = landscape.compute(&graph).unwrap();
        assert_eq!(fitness.len(), 4);
        assert_eq!(fitness[0].get(), 5.0);
        assert!(fitness[1].is_lethal());

        let means = landscape.mean_fitness_by_genotype(&graph, &fitness, 3);
        assert_eq!(means, vec![Some(0.0), Some(5.0), None]);
    }

    #[test]
    fn test_landscape_isolated_node() {
        let graph = Graph::from_edges(2, &[]).unwrap();
        let m = prisoners();
        let landscape = FitnessLandscape {
            payoff: &m,
            function: &FitnessModel::Linear,
            selection_intensity: 0.5,
        };
        assert_eq!(landscape.node_fitness(&graph, 0).unwrap().get(), 0.5);
        assert!(landscape.node_fitness(&graph, 2).is_err());
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!("Linear".parse::<FitnessModel>(), Ok(FitnessModel::Linear));
        assert_eq!("exp".parse::<FitnessModel>(), Ok(FitnessModel::Exponential));
        assert!("quadratic".parse::<FitnessModel>().is_err());
    }
}
