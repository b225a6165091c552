use thiserror::Error;

/// Errors raised while building or querying a [`Graph`](crate::graph::Graph).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Malformed construction input (node count, edge probability, ...).
    #[error("Invalid graph parameter: {0}")]
    InvalidParameter(String),

    /// A node identifier outside `0..node_count`.
    #[error("Node {node} not present in the graph (node count = {node_count})")]
    UnknownNode { node: usize, node_count: usize },

    /// An edge from a node to itself.
    #[error("Self-loops are not allowed (node {0})")]
    SelfLoop(usize),

    /// The same undirected edge given twice.
    #[error("Edge between {0} and {1} already exists")]
    DuplicateEdge(usize, usize),

    /// No connected sample was drawn within the attempt budget.
    #[error("Failed to generate a connected graph after {attempts} attempts")]
    Disconnected { attempts: usize },
}

/// Errors raised by the Moran engine and its configuration.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A scalar parameter is outside its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Parameters are individually valid but inconsistent with each other
    /// (payoff matrix shape, initial distribution length, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The engine was asked to run on a graph without nodes.
    #[error("Population is empty")]
    EmptyPopulation,

    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Population size changed across a generation. The run is aborted.
    #[error(
        "Internal invariant violated at generation {generation}: \
         expected {expected} individuals, found {found}"
    )]
    InternalInvariantViolation {
        generation: usize,
        expected: usize,
        found: usize,
    },

    /// `step` was called after the run reached its terminal state.
    #[error("Simulation has terminated at generation {0}")]
    Terminated(usize),

    /// Checkpoint data could not be restored.
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Database error types.
#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(String),
    #[error("Database initialization error: {0}")]
    Initialization(String),
    #[error("Transaction error: {0}")]
    Transaction(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Insert error: {0}")]
    Insert(String),
    #[error("Close error: {0}")]
    Close(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
