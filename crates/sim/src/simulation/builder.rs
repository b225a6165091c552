//! Builder pattern for creating simulations.
//!
//! Provides a fluent API for configuring and creating simulations with
//! sensible defaults and comprehensive validation.

use std::sync::Arc;

use crate::base::{Genotype, PayoffMatrix};
use crate::errors::SimulationError;
use crate::evolution::{FitnessFunction, FitnessModel, ReplacementRule};
use crate::graph::{Topology, DEFAULT_MAX_ATTEMPTS};
use crate::simulation::{
    Configuration, EvolutionConfig, ExecutionConfig, GraphConfig, InitialDistribution,
    PayoffConfig, Simulation,
};

/// Builder for constructing Simulation instances with a fluent API.
///
/// # Examples
///
/// ```
/// use evographs_sim::simulation::SimulationBuilder;
///
/// // Random graph, random payoffs, defaults elsewhere
/// let sim = SimulationBuilder::new()
///     .node_count(30)
///     .edge_probability(0.2)
///     .generations(1000)
///     .build()
///     .unwrap();
///
/// // Prisoner's dilemma on a connected graph
/// use evographs_sim::base::PayoffMatrix;
/// let pd = PayoffMatrix::new(vec![vec![3.0, 0.0], vec![5.0, 1.0]]).unwrap();
/// let sim = SimulationBuilder::new()
///     .node_count(30)
///     .edge_probability(0.2)
///     .connected(true)
///     .payoff_matrix(pd)
///     .selection_intensity(0.9)
///     .generations(1000)
///     .seed(42)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct SimulationBuilder {
    // Required parameters
    node_count: Option<usize>,
    edge_probability: Option<f64>,
    generations: Option<usize>,

    // Graph construction
    require_connected: bool,    // Default: false
    max_connect_attempts: usize, // Default: 1000
    topology: Option<Arc<Topology>>,

    // Selection (with defaults)
    genotype_count: usize,     // Default: 2
    selection_intensity: f64,  // Default: 0.5
    fitness: FitnessModel,     // Default: linear
    fitness_function: Option<Box<dyn FitnessFunction>>,
    replacement: ReplacementRule, // Default: uniform
    payoff: PayoffConfig,         // Default: random

    initialization: InitialDistribution, // Default: uniform
    stop_at_fixation: bool,              // Default: true
    seed: Option<u64>,                   // Default: None (random)
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    /// Create a new simulation builder with default values.
    pub fn new() -> Self {
        Self {
            node_count: None,
            edge_probability: None,
            generations: None,
            require_connected: false,
            max_connect_attempts: DEFAULT_MAX_ATTEMPTS,
            topology: None,
            genotype_count: 2,
            selection_intensity: 0.5,
            fitness: FitnessModel::default(),
            fitness_function: None,
            replacement: ReplacementRule::default(),
            payoff: PayoffConfig::default(),
            initialization: InitialDistribution::default(),
            stop_at_fixation: true,
            seed: None,
        }
    }

    /// Set the number of nodes (required unless a topology is given).
    pub fn node_count(mut self, n: usize) -> Self {
        self.node_count = Some(n);
        self
    }

    /// Set the edge probability (required unless a topology is given).
    pub fn edge_probability(mut self, p: f64) -> Self {
        self.edge_probability = Some(p);
        self
    }

    /// Resample the random graph until it is connected.
    pub fn connected(mut self, required: bool) -> Self {
        self.require_connected = required;
        self
    }

    pub fn max_connect_attempts(mut self, attempts: usize) -> Self {
        self.max_connect_attempts = attempts;
        self
    }

    /// Use a fixed topology instead of sampling one.
    pub fn topology(mut self, topology: impl Into<Arc<Topology>>) -> Self {
        self.topology = Some(topology.into());
        self
    }

    /// Set the maximum number of generations (required).
    pub fn generations(mut self, generations: usize) -> Self {
        self.generations = Some(generations);
        self
    }

    /// Set the size of the genotype set.
    pub fn genotypes(mut self, count: usize) -> Self {
        self.genotype_count = count;
        self
    }

    pub fn selection_intensity(mut self, w: f64) -> Self {
        self.selection_intensity = w;
        self
    }

    /// Choose a built-in fitness mapping.
    pub fn fitness(mut self, model: FitnessModel) -> Self {
        self.fitness = model;
        self
    }

    /// Use a custom fitness mapping. Takes precedence over [`Self::fitness`].
    pub fn fitness_function(mut self, function: impl FitnessFunction + 'static) -> Self {
        self.fitness_function = Some(Box::new(function));
        self
    }

    pub fn replacement(mut self, rule: ReplacementRule) -> Self {
        self.replacement = rule;
        self
    }

    /// Use a fixed payoff matrix.
    pub fn payoff_matrix(mut self, matrix: PayoffMatrix) -> Self {
        self.payoff = PayoffConfig::Explicit(matrix);
        self
    }

    /// Draw the payoff matrix from the run's RNG (the default).
    pub fn random_payoff(mut self) -> Self {
        self.payoff = PayoffConfig::Random;
        self
    }

    /// Assign initial genotypes uniformly at random (the default).
    pub fn init_uniform(mut self) -> Self {
        self.initialization = InitialDistribution::Uniform;
        self
    }

    /// Assign initial genotypes from relative weights, one per genotype.
    pub fn init_proportions(mut self, weights: Vec<f64>) -> Self {
        self.initialization = InitialDistribution::Proportions(weights);
        self
    }

    /// Assign one initial genotype per node.
    pub fn init_genotypes(mut self, genotypes: Vec<Genotype>) -> Self {
        self.initialization = InitialDistribution::Explicit(genotypes);
        self
    }

    pub fn stop_at_fixation(mut self, stop: bool) -> Self {
        self.stop_at_fixation = stop;
        self
    }

    /// Set random seed for reproducibility.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Assemble the configuration without building the engine.
    pub fn configuration(&self) -> Result<Configuration, SimulationError> {
        let generations = self.generations.ok_or_else(|| {
            SimulationError::InvalidParameter("generations is required".into())
        })?;

        let (node_count, edge_probability) = match &self.topology {
            Some(topology) => (
                self.node_count.unwrap_or(topology.node_count()),
                self.edge_probability.unwrap_or_else(|| density(topology)),
            ),
            None => (
                self.node_count.ok_or_else(|| {
                    SimulationError::InvalidParameter("node_count is required".into())
                })?,
                self.edge_probability.ok_or_else(|| {
                    SimulationError::InvalidParameter("edge_probability is required".into())
                })?,
            ),
        };

        let config = Configuration {
            execution: ExecutionConfig {
                total_generations: generations,
                seed: self.seed,
                stop_at_fixation: self.stop_at_fixation,
            },
            graph: GraphConfig {
                node_count,
                edge_probability,
                require_connected: self.require_connected,
                max_connect_attempts: self.max_connect_attempts,
            },
            evolution: EvolutionConfig {
                genotype_count: self.genotype_count,
                selection_intensity: self.selection_intensity,
                fitness: self.fitness,
                replacement: self.replacement,
                payoff: self.payoff.clone(),
            },
            initialization: self.initialization.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build the simulation.
    pub fn build(self) -> Result<Simulation, SimulationError> {
        let config = self.configuration()?;
        let mut sim = match self.topology {
            Some(topology) => Simulation::with_topology(config, topology)?,
            None => Simulation::new(config)?,
        };
        if let Some(function) = self.fitness_function {
            sim.set_fitness_function(function);
        }
        Ok(sim)
    }
}

/// Fraction of node pairs joined by an edge.
fn density(topology: &Topology) -> f64 {
    let n = topology.node_count();
    if n < 2 {
        return 0.0;
    }
    topology.edge_count() as f64 / (n * (n - 1) / 2) as f64
}
