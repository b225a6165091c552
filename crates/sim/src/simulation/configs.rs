//! Simulation parameters and configuration.
//!
//! A [`Configuration`] fully describes a run and can be read from or written
//! to JSON to reproduce it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::base::{Genotype, PayoffMatrix};
use crate::errors::SimulationError;
use crate::evolution::{FitnessModel, ReplacementRule};
use crate::graph::DEFAULT_MAX_ATTEMPTS;

/// The master configuration struct.
/// Can be deserialized from a file to fully reproduce a simulation setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub execution: ExecutionConfig,
    pub graph: GraphConfig,
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub initialization: InitialDistribution,
}

/// Run length and randomness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Maximum number of generations to simulate
    pub total_generations: usize,
    /// Optional RNG seed for reproducibility
    pub seed: Option<u64>,
    /// Stop as soon as one genotype holds every node
    #[serde(default = "default_true")]
    pub stop_at_fixation: bool,
}

impl ExecutionConfig {
    pub fn new(total_generations: usize, seed: Option<u64>) -> Self {
        Self {
            total_generations,
            seed,
            stop_at_fixation: true,
        }
    }
}

/// Random graph parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Number of nodes (the population size)
    pub node_count: usize,
    /// Probability that a given pair of nodes is joined by an edge
    pub edge_probability: f64,
    /// Resample until the graph is connected
    #[serde(default)]
    pub require_connected: bool,
    /// Resampling budget when `require_connected` is set
    #[serde(default = "default_max_attempts")]
    pub max_connect_attempts: usize,
}

impl GraphConfig {
    pub fn new(node_count: usize, edge_probability: f64) -> Self {
        Self {
            node_count,
            edge_probability,
            require_connected: false,
            max_connect_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Selection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Size of the genotype set
    pub genotype_count: usize,
    /// Selection intensity `w` in `[0, 1]`
    pub selection_intensity: f64,
    #[serde(default)]
    pub fitness: FitnessModel,
    #[serde(default)]
    pub replacement: ReplacementRule,
    #[serde(default)]
    pub payoff: PayoffConfig,
}

impl EvolutionConfig {
    pub fn new(genotype_count: usize, selection_intensity: f64) -> Self {
        Self {
            genotype_count,
            selection_intensity,
            fitness: FitnessModel::default(),
            replacement: ReplacementRule::default(),
            payoff: PayoffConfig::default(),
        }
    }
}

/// Where the payoff matrix comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffConfig {
    /// Entries drawn uniformly from `[0, 1)` with the run's RNG.
    #[default]
    Random,
    /// A fixed matrix.
    Explicit(PayoffMatrix),
}

impl PayoffConfig {
    /// Produce the concrete matrix for a genotype set of `genotype_count`.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        genotype_count: usize,
        rng: &mut R,
    ) -> Result<PayoffMatrix, SimulationError> {
        match self {
            Self::Random => PayoffMatrix::random(genotype_count, rng),
            Self::Explicit(matrix) => {
                matrix.check_genotype_count(genotype_count)?;
                Ok(matrix.clone())
            }
        }
    }
}

/// How genotypes are assigned to nodes before generation 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialDistribution {
    /// Each node draws its genotype uniformly from the genotype set.
    #[default]
    Uniform,
    /// Each node draws its genotype from these relative weights, one per
    /// genotype.
    Proportions(Vec<f64>),
    /// One genotype per node, in node order.
    Explicit(Vec<Genotype>),
}

impl InitialDistribution {
    /// Check this distribution against the genotype set and population size.
    pub fn validate(&self, node_count: usize, genotype_count: usize) -> Result<(), SimulationError> {
        match self {
            Self::Uniform => Ok(()),
            Self::Proportions(weights) => {
                if weights.len() != genotype_count {
                    return Err(SimulationError::InvalidConfiguration(format!(
                        "expected {genotype_count} initial proportions, got {}",
                        weights.len()
                    )));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(SimulationError::InvalidConfiguration(
                        "initial proportions must be finite and non-negative".into(),
                    ));
                }
                if weights.iter().sum::<f64>() <= 0.0 {
                    return Err(SimulationError::InvalidConfiguration(
                        "initial proportions must not all be zero".into(),
                    ));
                }
                Ok(())
            }
            Self::Explicit(labels) => {
                if labels.len() != node_count {
                    return Err(SimulationError::InvalidConfiguration(format!(
                        "expected {node_count} initial genotypes, got {}",
                        labels.len()
                    )));
                }
                if let Some(g) = labels.iter().find(|g| g.index() >= genotype_count) {
                    return Err(SimulationError::InvalidConfiguration(format!(
                        "initial genotype {g} is outside the genotype set of {genotype_count}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Draw the initial genotype of every node.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        node_count: usize,
        genotype_count: usize,
        rng: &mut R,
    ) -> Result<Vec<Genotype>, SimulationError> {
        self.validate(node_count, genotype_count)?;
        let labels = match self {
            Self::Uniform => (0..node_count)
                .map(|_| draw_genotype(rng.random_range(0..genotype_count)))
                .collect::<Result<_, _>>()?,
            Self::Proportions(weights) => {
                let total: f64 = weights.iter().sum();
                (0..node_count)
                    .map(|_| {
                        let r = rng.random::<f64>() * total;
                        let mut acc = 0.0;
                        let idx = weights
                            .iter()
                            .position(|&w| {
                                acc += w;
                                r < acc
                            })
                            .unwrap_or_else(|| last_positive(weights));
                        draw_genotype(idx)
                    })
                    .collect::<Result<_, _>>()?
            }
            Self::Explicit(labels) => labels.clone(),
        };
        Ok(labels)
    }
}

fn draw_genotype(idx: usize) -> Result<Genotype, SimulationError> {
    Genotype::from_index(idx)
        .ok_or_else(|| SimulationError::InvalidParameter(format!("genotype index {idx} out of range")))
}

fn last_positive(weights: &[f64]) -> usize {
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(0)
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

impl Configuration {
    /// Build a configuration from the core parameters, leaving the rest at
    /// their defaults.
    pub fn new(
        node_count: usize,
        genotype_count: usize,
        edge_probability: f64,
        selection_intensity: f64,
        total_generations: usize,
        seed: Option<u64>,
    ) -> Self {
        Self {
            execution: ExecutionConfig::new(total_generations, seed),
            graph: GraphConfig::new(node_count, edge_probability),
            evolution: EvolutionConfig::new(genotype_count, selection_intensity),
            initialization: InitialDistribution::default(),
        }
    }

    /// Population size.
    pub fn node_count(&self) -> usize {
        self.graph.node_count
    }

    /// Size of the genotype set.
    pub fn genotype_count(&self) -> usize {
        self.evolution.genotype_count
    }

    /// Check every parameter and their consistency.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let graph = &self.graph;
        let evolution = &self.evolution;

        if graph.node_count == 0 {
            return Err(SimulationError::EmptyPopulation);
        }
        if !(0.0..=1.0).contains(&graph.edge_probability) {
            return Err(SimulationError::InvalidParameter(format!(
                "edge probability must be between 0.0 and 1.0, got {}",
                graph.edge_probability
            )));
        }
        if graph.require_connected && graph.max_connect_attempts == 0 {
            return Err(SimulationError::InvalidParameter(
                "max_connect_attempts must be at least 1".into(),
            ));
        }
        Genotype::check_count(evolution.genotype_count)?;
        if !(0.0..=1.0).contains(&evolution.selection_intensity) {
            return Err(SimulationError::InvalidParameter(format!(
                "selection intensity must be between 0.0 and 1.0, got {}",
                evolution.selection_intensity
            )));
        }
        if self.execution.total_generations == 0 {
            return Err(SimulationError::InvalidParameter(
                "total_generations must be at least 1".into(),
            ));
        }
        if let PayoffConfig::Explicit(matrix) = &evolution.payoff {
            matrix.check_genotype_count(evolution.genotype_count)?;
        }
        self.initialization
            .validate(graph.node_count, evolution.genotype_count)
    }

    /// Parse a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::InvalidConfiguration(format!("invalid JSON: {e}")))
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SimulationError::InvalidConfiguration(e.to_string()))
    }
}
