//! Simulation engine for the spatial Moran process.
//!
//! This module provides the main simulation loop: each generation one node
//! reproduces with probability proportional to its fitness and its offspring
//! replaces one of its neighbours. The engine owns the graph, the RNG and the
//! history of snapshots.

use std::path::Path;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, info};

use crate::base::{FitnessValue, Genotype, PayoffMatrix};
use crate::errors::SimulationError;
use crate::evolution::{select_parent, FitnessFunction, FitnessLandscape};
use crate::graph::{Graph, History, PopulationSnapshot, Topology};
use crate::simulation::{Configuration, GraphConfig, PayoffConfig};

/// Lifecycle of a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// Initial population assigned, no generation executed yet.
    Initial,
    /// At least one generation executed.
    Stepping,
    /// Run finished or aborted; further steps are rejected.
    Terminal,
}

/// What happened during one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    /// Generation number after the update.
    pub generation: usize,
    /// Node that reproduced.
    pub parent: usize,
    /// Neighbour that was replaced; `None` if the parent is isolated.
    pub replaced: Option<usize>,
    /// Genotype passed on by the parent.
    pub genotype: Genotype,
}

/// Main simulation engine.
#[derive(Debug)]
pub struct Simulation {
    /// Resolved configuration (seed and payoff matrix filled in)
    config: Configuration,
    payoff: PayoffMatrix,
    fitness_function: Box<dyn FitnessFunction>,
    graph: Graph,
    history: History,
    /// Population size fixed at construction
    population_size: usize,
    generation: usize,
    state: SimulationState,
    /// First generation at which this engine saw a fixated population
    fixation: Option<(usize, Genotype)>,
    rng: Xoshiro256PlusPlus,
}

impl Simulation {
    /// Create a new simulation from configuration.
    ///
    /// The RNG is consumed in a fixed order: graph topology, payoff matrix
    /// (when random), then initial genotypes. A missing seed is drawn from OS
    /// entropy and stored in [`Simulation::config`] so the run can be
    /// reproduced.
    pub fn new(config: Configuration) -> Result<Self, SimulationError> {
        config.validate()?;
        let mut config = config;
        let mut rng = seeded_rng(&mut config);
        let topology = sample_topology(&config.graph, &mut rng)?;
        Self::initialize(config, Arc::new(topology), rng)
    }

    /// Create a new simulation on a given topology instead of a random one.
    ///
    /// `config.graph.node_count` must equal the topology's node count.
    pub fn with_topology(
        config: Configuration,
        topology: impl Into<Arc<Topology>>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let topology = topology.into();
        if topology.node_count() != config.node_count() {
            return Err(SimulationError::InvalidConfiguration(format!(
                "topology has {} nodes but the configuration expects {}",
                topology.node_count(),
                config.node_count()
            )));
        }
        let mut config = config;
        let rng = seeded_rng(&mut config);
        Self::initialize(config, topology, rng)
    }

    fn initialize(
        mut config: Configuration,
        topology: Arc<Topology>,
        mut rng: Xoshiro256PlusPlus,
    ) -> Result<Self, SimulationError> {
        let genotype_count = config.genotype_count();
        let payoff = config.evolution.payoff.resolve(genotype_count, &mut rng)?;
        config.evolution.payoff = PayoffConfig::Explicit(payoff.clone());

        let genotypes =
            config
                .initialization
                .sample(topology.node_count(), genotype_count, &mut rng)?;
        let graph = Graph::with_genotypes(topology.clone(), genotypes)?;

        let mut history = History::new(topology, genotype_count);
        history.push(PopulationSnapshot::capture(0, &graph))?;

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            genotypes = genotype_count,
            selection_intensity = config.evolution.selection_intensity,
            seed = config.execution.seed,
            "initialised population"
        );

        let fixation = graph.fixated_genotype().map(|g| (0, g));
        Ok(Self {
            fitness_function: Box::new(config.evolution.fitness),
            population_size: graph.node_count(),
            config,
            payoff,
            graph,
            history,
            generation: 0,
            state: SimulationState::Initial,
            fixation,
            rng,
        })
    }

    /// Resume a simulation from a checkpoint in the database.
    ///
    /// Loads the configuration, topology, population and RNG state recorded
    /// at `generation` (the latest checkpoint when `None`). The simulation then
    /// continues exactly as if it had never stopped. The resumed history starts
    /// at the checkpoint generation.
    pub fn from_checkpoint(
        db_path: impl AsRef<Path>,
        generation: Option<usize>,
    ) -> Result<Self, SimulationError> {
        use crate::storage::QueryBuilder;

        let query = QueryBuilder::new(db_path)?;
        let checkpoint = match generation {
            Some(g) => query.get_checkpoint(g)?,
            None => query.get_latest_checkpoint()?,
        };
        let config = query.get_full_config()?;
        let topology = Arc::new(query.get_topology()?);
        let snapshot = query.get_generation(checkpoint.generation)?;
        query.close()?;

        config.validate()?;
        if topology.node_count() != config.node_count() {
            return Err(SimulationError::Checkpoint(format!(
                "stored topology has {} nodes, configuration expects {}",
                topology.node_count(),
                config.node_count()
            )));
        }
        let payoff = match &config.evolution.payoff {
            PayoffConfig::Explicit(matrix) => matrix.clone(),
            PayoffConfig::Random => {
                return Err(SimulationError::Checkpoint(
                    "stored configuration has no resolved payoff matrix".into(),
                ))
            }
        };
        payoff.check_genotype_count(config.genotype_count())?;
        if let Some((node, g)) = snapshot.out_of_range(config.genotype_count()) {
            return Err(SimulationError::Checkpoint(format!(
                "node {node} holds genotype {g} at generation {}, configuration has {} genotypes",
                snapshot.generation(),
                config.genotype_count()
            )));
        }

        let rng: Xoshiro256PlusPlus = bincode::deserialize(&checkpoint.rng_state)
            .map_err(|e| SimulationError::Checkpoint(format!("failed to restore RNG state: {e}")))?;

        let graph = snapshot.to_graph(topology.clone())?;
        let mut history = History::new(topology, config.genotype_count());
        history.push(snapshot)?;

        let generation = checkpoint.generation;
        info!(generation, "resumed from checkpoint");

        Ok(Self {
            fitness_function: Box::new(config.evolution.fitness),
            population_size: graph.node_count(),
            fixation: graph.fixated_genotype().map(|g| (generation, g)),
            state: if generation == 0 {
                SimulationState::Initial
            } else {
                SimulationState::Stepping
            },
            config,
            payoff,
            graph,
            history,
            generation,
            rng,
        })
    }

    /// Replace the payoff-to-fitness mapping.
    ///
    /// Custom functions are not part of the stored configuration; a run
    /// resumed from a checkpoint uses the configured built-in model.
    pub fn set_fitness_function(&mut self, function: Box<dyn FitnessFunction>) {
        self.fitness_function = function;
    }

    /// Resolved configuration of this run.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Payoff matrix in use.
    pub fn payoff(&self) -> &PayoffMatrix {
        &self.payoff
    }

    /// Current population.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Snapshots recorded so far.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Generation and genotype of fixation, once observed.
    pub fn fixation(&self) -> Option<(usize, Genotype)> {
        self.fixation
    }

    fn landscape(&self) -> FitnessLandscape<'_> {
        FitnessLandscape {
            payoff: &self.payoff,
            function: self.fitness_function.as_ref(),
            selection_intensity: self.config.evolution.selection_intensity,
        }
    }

    /// Fitness of every node in the current population.
    pub fn fitness(&self) -> Result<Vec<FitnessValue>, SimulationError> {
        Ok(self.landscape().compute(&self.graph)?)
    }

    /// True once the generation budget is used up, or the population has
    /// fixated and the run is configured to stop there.
    pub fn is_complete(&self) -> bool {
        self.generation >= self.config.execution.total_generations
            || (self.config.execution.stop_at_fixation && self.graph.has_fixated())
    }

    /// Advance simulation by one generation.
    pub fn step(&mut self) -> Result<StepEvent, SimulationError> {
        if self.state == SimulationState::Terminal {
            return Err(SimulationError::Terminated(self.generation));
        }
        self.state = SimulationState::Stepping;

        // 1. Fitness of every node
        let fitness = self.landscape().compute(&self.graph)?;

        // 2. Fitness-proportional birth
        let parent =
            select_parent(&mut self.rng, &fitness).ok_or(SimulationError::EmptyPopulation)?;
        let genotype = self.graph.genotype(parent)?;

        // 3. Death among the parent's neighbours
        let neighbors = self.graph.neighbors(parent)?;
        let replaced =
            self.config
                .evolution
                .replacement
                .select_victim(&mut self.rng, neighbors, &fitness);

        // 4. Offspring takes the replaced node
        let generation = self.generation + 1;
        match replaced {
            Some(node) => {
                self.graph.set_genotype(node, genotype)?;
                debug!(generation, parent, replaced = node, %genotype, "replacement");
            }
            None => debug!(generation, parent, "isolated parent, no replacement"),
        }

        // 5. Bookkeeping
        self.generation = generation;
        self.check_population()?;
        self.history
            .push(PopulationSnapshot::capture(generation, &self.graph))?;

        if self.fixation.is_none() {
            if let Some(g) = self.graph.fixated_genotype() {
                info!(generation, genotype = %g, "population fixated");
                self.fixation = Some((generation, g));
            }
        }

        Ok(StepEvent {
            generation,
            parent,
            replaced,
            genotype,
        })
    }

    /// Node count and genotype total must equal the initial population size.
    fn check_population(&mut self) -> Result<(), SimulationError> {
        let counted: usize = self
            .graph
            .genotype_counts(self.config.genotype_count())
            .iter()
            .sum();
        for found in [self.graph.node_count(), self.graph.topology().node_count(), counted] {
            if found != self.population_size {
                self.state = SimulationState::Terminal;
                return Err(SimulationError::InternalInvariantViolation {
                    generation: self.generation,
                    expected: self.population_size,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Run until the configured generation count, or until fixation when
    /// `stop_at_fixation` is set. The engine is terminal afterwards.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        while !self.is_complete() {
            self.step()?;
        }
        self.state = SimulationState::Terminal;
        info!(
            generation = self.generation,
            fixated = ?self.fixation.map(|(_, g)| g.to_char()),
            "run finished"
        );
        Ok(())
    }

    /// Run simulation for a specific number of generations.
    pub fn run_for(&mut self, generations: usize) -> Result<(), SimulationError> {
        for _ in 0..generations {
            self.step()?;
        }
        Ok(())
    }

    /// Finish the run and hand over its history.
    pub fn finish(self) -> History {
        self.history
    }

    /// Get the current RNG state for checkpointing.
    /// Returns the internal state as bytes.
    pub fn rng_state_bytes(&self) -> Result<Vec<u8>, SimulationError> {
        bincode::serialize(&self.rng)
            .map_err(|e| SimulationError::Checkpoint(format!("failed to serialize RNG state: {e}")))
    }

    /// Set the RNG state from a checkpoint.
    pub fn set_rng_from_bytes(&mut self, bytes: &[u8]) -> Result<(), SimulationError> {
        self.rng = bincode::deserialize(bytes).map_err(|e| {
            SimulationError::Checkpoint(format!("failed to deserialize RNG state: {e}"))
        })?;
        Ok(())
    }
}

fn seeded_rng(config: &mut Configuration) -> Xoshiro256PlusPlus {
    let seed = *config
        .execution
        .seed
        .get_or_insert_with(|| rand::rng().random());
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

fn sample_topology<R: Rng + ?Sized>(
    graph: &GraphConfig,
    rng: &mut R,
) -> Result<Topology, SimulationError> {
    let topology = if graph.require_connected {
        Topology::random_connected(
            graph.node_count,
            graph.edge_probability,
            graph.max_connect_attempts,
            rng,
        )?
    } else {
        Topology::random(graph.node_count, graph.edge_probability, rng)?
    };
    Ok(topology)
}
