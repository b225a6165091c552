//! Payoff matrices for pairwise genotype interactions.
//!
//! Entry `(i, j)` is the payoff a focal individual of genotype `i` receives
//! from interacting with a neighbour of genotype `j`. Scores are plain data;
//! there is no per-genotype behaviour beyond this table.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::base::Genotype;
use crate::errors::SimulationError;

/// A square, non-negative payoff matrix stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct PayoffMatrix {
    size: usize,
    values: Vec<f64>,
}

impl PayoffMatrix {
    /// Create a payoff matrix from rows.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` if the matrix is empty, not square, or
    /// holds negative or non-finite entries.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, SimulationError> {
        let size = rows.len();
        if size == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "payoff matrix must have at least one row".into(),
            ));
        }

        let mut values = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "payoff matrix must be square: row {i} has {} entries, expected {size}",
                    row.len()
                )));
            }
            for (j, value) in row.into_iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(SimulationError::InvalidConfiguration(format!(
                        "payoff entry ({i}, {j}) must be finite and non-negative, got {value}"
                    )));
                }
                values.push(value);
            }
        }

        Ok(Self { size, values })
    }

    /// A matrix where every interaction scores `value`.
    pub fn uniform(size: usize, value: f64) -> Result<Self, SimulationError> {
        Self::new(vec![vec![value; size]; size])
    }

    /// A matrix with entries drawn uniformly from `[0, 1)`.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self, SimulationError> {
        let rows = (0..size)
            .map(|_| (0..size).map(|_| rng.random::<f64>()).collect())
            .collect();
        Self::new(rows)
    }

    /// Number of genotypes this matrix covers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Payoff received by `focal` when interacting with `other`.
    ///
    /// # Panics
    /// Panics if either genotype is outside the matrix. Callers validate the
    /// genotype set against [`PayoffMatrix::check_genotype_count`] up front.
    #[inline]
    pub fn payoff(&self, focal: Genotype, other: Genotype) -> f64 {
        self.values[focal.index() * self.size + other.index()]
    }

    /// Checked variant of [`PayoffMatrix::payoff`].
    pub fn get(&self, focal: Genotype, other: Genotype) -> Option<f64> {
        if focal.index() < self.size && other.index() < self.size {
            Some(self.payoff(focal, other))
        } else {
            None
        }
    }

    /// Ensure this matrix matches a genotype set of `genotype_count` labels.
    pub fn check_genotype_count(&self, genotype_count: usize) -> Result<(), SimulationError> {
        if self.size != genotype_count {
            return Err(SimulationError::InvalidConfiguration(format!(
                "payoff matrix is {0}x{0} but the genotype set has {genotype_count} genotypes",
                self.size
            )));
        }
        Ok(())
    }

    /// Rows of the matrix.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks(self.size).map(<[f64]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for PayoffMatrix {
    type Error = SimulationError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<PayoffMatrix> for Vec<Vec<f64>> {
    fn from(matrix: PayoffMatrix) -> Self {
        matrix.rows()
    }
}

impl fmt::Display for PayoffMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for g in Genotype::all(self.size) {
            write!(f, " {:>7}", g.to_char())?;
        }
        for (i, row) in self.values.chunks(self.size).enumerate() {
            writeln!(f)?;
            let label = Genotype::from_index(i).map_or('?', Genotype::to_char);
            write!(f, "{label:>3}")?;
            for value in row {
                write!(f, " {value:>7.4}")?;
            }
        }
        Ok(())
    }
}
