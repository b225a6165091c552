use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Deref};

use serde::{Deserialize, Serialize};

/// A non-negative fitness value.
///
/// Negative and NaN inputs are clamped to zero so that fitness-proportional
/// sampling always sees valid weights.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FitnessValue(f64);

impl FitnessValue {
    /// Fitness of every individual under neutral drift.
    pub const NEUTRAL_FITNESS: Self = Self(1.0);

    /// Fitness of an individual that can never be selected.
    pub const LETHAL_FITNESS: Self = Self(0.0);

    /// Creates a new FitnessValue, clamping the input to [0.0, +inf).
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.max(0.0))
        }
    }

    /// Returns the inner f64 value.
    pub fn get(self) -> f64 {
        self.0
    }

    /// True if this individual cannot be selected to reproduce.
    pub fn is_lethal(self) -> bool {
        self.0 == 0.0
    }
}

impl Deref for FitnessValue {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<FitnessValue> for f64 {
    fn from(fitness: FitnessValue) -> Self {
        fitness.0
    }
}

impl From<f64> for FitnessValue {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Default for FitnessValue {
    fn default() -> Self {
        Self::NEUTRAL_FITNESS
    }
}

impl fmt::Display for FitnessValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for FitnessValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        FitnessValue::new(self.0 + rhs.0)
    }
}

impl Sum for FitnessValue {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::LETHAL_FITNESS, |acc, f| acc + f)
    }
}

impl<'a> Sum<&'a FitnessValue> for FitnessValue {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_negative_to_zero() {
        assert_eq!(FitnessValue::new(-1.0).get(), 0.0);
    }

    #[test]
    fn test_new_clamps_nan_to_zero() {
        assert!(FitnessValue::new(f64::NAN).is_lethal());
    }

    #[test]
    fn test_new_keeps_values_above_one() {
        // Payoff-driven fitness is not bounded by 1.
        assert_eq!(FitnessValue::new(2.5).get(), 2.5);
    }

    #[test]
    fn test_default_is_neutral() {
        assert_eq!(FitnessValue::default(), FitnessValue::NEUTRAL_FITNESS);
    }

    #[test]
    fn test_sum() {
        let values = [FitnessValue::new(0.5), FitnessValue::new(1.5), FitnessValue::new(1.0)];
        let total: FitnessValue = values.iter().sum();
        assert!((*total - 3.0).abs() < 1e-12);
    }
}
