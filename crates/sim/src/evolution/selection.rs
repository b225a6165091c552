//! Birth and death selection for the Moran update.
//!
//! Each generation one parent is drawn with probability proportional to its
//! fitness, and one of the parent's neighbours is chosen to die according to a
//! [`ReplacementRule`].

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::base::FitnessValue;

/// Draw an index with probability proportional to its weight.
///
/// Uses inverse-CDF sampling on the cumulative sum with a single uniform draw.
/// Infinite weights dominate every finite one, so the draw is uniform among
/// them. When every weight is zero, or all weights are equal, the draw is
/// uniform. Returns `None` only for an empty weight list.
fn weighted_index<R, I>(rng: &mut R, weights: I) -> Option<usize>
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = f64>,
{
    let weights: Vec<f64> = weights.into_iter().collect();
    let n = weights.len();
    if n == 0 {
        return None;
    }

    let infinite: Vec<usize> = (0..n).filter(|&i| weights[i] == f64::INFINITY).collect();
    if !infinite.is_empty() {
        return Some(infinite[rng.random_range(0..infinite.len())]);
    }

    let max = weights.iter().copied().fold(0.0, f64::max);
    if max <= 0.0 || weights.iter().all(|&w| w == weights[0]) {
        return Some(rng.random_range(0..n));
    }

    // scaled by the largest weight so the running sum stays finite
    let cumulative: Vec<f64> = weights
        .iter()
        .scan(0.0, |acc, &w| {
            *acc += w / max;
            Some(*acc)
        })
        .collect();
    let total = cumulative[n - 1];

    let r = rng.random::<f64>() * total;
    let idx = cumulative.partition_point(|&c| c <= r);
    if idx < n {
        Some(idx)
    } else {
        // r rounded up to total: fall back to the last index with weight
        let mut last = n - 1;
        while last > 0 && cumulative[last] == cumulative[last - 1] {
            last -= 1;
        }
        Some(last)
    }
}

/// Choose the reproducing node, weighted by fitness.
///
/// `fitness` is indexed by node identifier. Returns `None` for an empty
/// population.
pub fn select_parent<R: Rng + ?Sized>(rng: &mut R, fitness: &[FitnessValue]) -> Option<usize> {
    weighted_index(rng, fitness.iter().map(|f| f.get()))
}

/// How the dying neighbour of a parent is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementRule {
    /// Every neighbour is equally likely to be replaced.
    #[default]
    Uniform,
    /// Neighbours die with propensity `1 / fitness`. Lethal neighbours are
    /// replaced first, uniformly among themselves.
    InverseFitness,
}

impl ReplacementRule {
    /// Choose the neighbour of the parent that is replaced.
    ///
    /// `neighbors` are the parent's adjacent nodes and `fitness` is indexed
    /// by node identifier. Returns `None` when the parent is isolated.
    pub fn select_victim<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        neighbors: &[usize],
        fitness: &[FitnessValue],
    ) -> Option<usize> {
        if neighbors.is_empty() {
            return None;
        }
        match self {
            Self::Uniform => Some(neighbors[rng.random_range(0..neighbors.len())]),
            Self::InverseFitness => {
                let lethal: Vec<usize> = neighbors
                    .iter()
                    .copied()
                    .filter(|&v| fitness[v].is_lethal())
                    .collect();
                if !lethal.is_empty() {
                    return Some(lethal[rng.random_range(0..lethal.len())]);
                }
                weighted_index(rng, neighbors.iter().map(|&v| 1.0 / fitness[v].get()))
                    .map(|i| neighbors[i])
            }
        }
    }
}

impl fmt::Display for ReplacementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => write!(f, "uniform"),
            Self::InverseFitness => write!(f, "inverse-fitness"),
        }
    }
}

impl std::str::FromStr for ReplacementRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "uniform" => Ok(Self::Uniform),
            "inverse-fitness" | "inverse" => Ok(Self::InverseFitness),
            other => Err(format!(
                "Unknown replacement rule '{other}'. Use: uniform or inverse-fitness"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    fn values(v: &[f64]) -> Vec<FitnessValue> {
        v.iter().copied().map(FitnessValue::new).collect()
    }

    #[test]
    fn test_select_parent_empty() {
        assert_eq!(select_parent(&mut rng(0), &[]), None);
    }

    #[test]
    fn test_select_parent_never_picks_zero_weight() {
        let fitness = values(&[0.0, 2.0, 0.0, 1.0, 0.0]);
        let mut rng = rng(11);
        for _ in 0..5_000 {
            let p = select_parent(&mut rng, &fitness).unwrap();
            assert!(p == 1 || p == 3, "picked zero-weight node {p}");
        }
    }

    #[test]
    fn test_select_parent_is_proportional() {
        let fitness = values(&[1.0, 3.0]);
        let mut rng = rng(3);
        let trials = 40_000;
        let ones = (0..trials)
            .filter(|_| select_parent(&mut rng, &fitness) == Some(1))
            .count();
        let freq = ones as f64 / trials as f64;
        assert!((freq - 0.75).abs() < 0.02, "frequency {freq}");
    }

    #[test]
    fn test_equal_fitness_is_uniform() {
        let n = 8;
        let fitness = values(&vec![0.7; n]);
        let mut rng = rng(42);
        let trials = 80_000;
        let mut counts = vec![0usize; n];
        for _ in 0..trials {
            counts[select_parent(&mut rng, &fitness).unwrap()] += 1;
        }

        // chi-square with 7 degrees of freedom; 24.3 is the 0.001 quantile
        let expected = trials as f64 / n as f64;
        let chi2: f64 = counts
            .iter()
            .map(|&c| (c as f64 - expected).powi(2) / expected)
            .sum();
        assert!(chi2 < 24.3, "chi-square {chi2}, counts {counts:?}");
    }

    #[test]
    fn test_all_zero_fitness_is_uniform() {
        let fitness = values(&[0.0; 4]);
        let mut rng = rng(5);
        let mut seen = [false; 4];
        for _ in 0..1_000 {
            seen[select_parent(&mut rng, &fitness).unwrap()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_infinite_fitness_dominates() {
        let fitness = values(&[1.0, f64::INFINITY, 3.0, f64::INFINITY]);
        let mut rng = rng(13);
        let mut counts = [0usize; 4];
        for _ in 0..4_000 {
            counts[select_parent(&mut rng, &fitness).unwrap()] += 1;
        }
        assert_eq!(counts[0] + counts[2], 0, "counts {counts:?}");
        assert!(counts[1] > 1_800 && counts[3] > 1_800, "counts {counts:?}");
    }

    #[test]
    fn test_overflowing_sum_stays_proportional() {
        let fitness = values(&[f64::MAX, 0.0, f64::MAX]);
        let mut rng = rng(17);
        let trials = 20_000;
        let mut counts = [0usize; 3];
        for _ in 0..trials {
            counts[select_parent(&mut rng, &fitness).unwrap()] += 1;
        }
        assert_eq!(counts[1], 0);
        let freq = counts[0] as f64 / trials as f64;
        assert!((freq - 0.5).abs() < 0.02, "frequency {freq}");
    }

    #[test]
    fn test_uniform_victim_is_a_neighbour() {
        let fitness = values(&[1.0; 6]);
        let neighbors = [1, 4, 5];
        let mut rng = rng(8);
        for _ in 0..500 {
            let v = ReplacementRule::Uniform
                .select_victim(&mut rng, &neighbors, &fitness)
                .unwrap();
            assert!(neighbors.contains(&v));
        }
        assert_eq!(
            ReplacementRule::Uniform.select_victim(&mut rng, &[], &fitness),
            None
        );
    }

    #[test]
    fn test_inverse_fitness_prefers_lethal() {
        let fitness = values(&[1.0, 0.0, 5.0, 0.0]);
        let mut rng = rng(9);
        for _ in 0..500 {
            let v = ReplacementRule::InverseFitness
                .select_victim(&mut rng, &[1, 2, 3], &fitness)
                .unwrap();
            assert!(v == 1 || v == 3);
        }
    }

    #[test]
    fn test_inverse_fitness_weights() {
        // death propensity 1 vs 1/4
        let fitness = values(&[1.0, 1.0, 4.0]);
        let mut rng = rng(21);
        let trials = 40_000;
        let weak = (0..trials)
            .filter(|_| {
                ReplacementRule::InverseFitness.select_victim(&mut rng, &[1, 2], &fitness)
                    == Some(1)
            })
            .count();
        let freq = weak as f64 / trials as f64;
        assert!((freq - 0.8).abs() < 0.02, "frequency {freq}");
    }

    #[test]
    fn test_rule_from_str() {
        assert_eq!(
            "inverse_fitness".parse::<ReplacementRule>(),
            Ok(ReplacementRule::InverseFitness)
        );
        assert_eq!("Uniform".parse::<ReplacementRule>(), Ok(ReplacementRule::Uniform));
        assert!("random".parse::<ReplacementRule>().is_err());
        assert_eq!(ReplacementRule::InverseFitness.to_string(), "inverse-fitness");
    }
}
