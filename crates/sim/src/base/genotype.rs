use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SimulationError;

/// A genotype (strategy) label carried by one node.
///
/// `Genotype` is a compact, Copyable index into the genotype set of a run.
/// Index 0 displays as `A`, 1 as `B`, and so on up to `Z`, which bounds the
/// genotype set at [`Genotype::MAX_COUNT`] labels.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Genotype(u8);

impl Genotype {
    /// Largest supported genotype-set size.
    pub const MAX_COUNT: usize = 26;

    /// Convert from a 0-based index. Returns `None` past `Z`.
    #[inline(always)]
    pub const fn from_index(idx: usize) -> Option<Self> {
        if idx < Self::MAX_COUNT {
            Some(Self(idx as u8))
        } else {
            None
        }
    }

    /// The 0-based index of this genotype.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Convert from an ASCII letter, accepting lowercase.
    #[inline]
    pub const fn from_ascii(byte: u8) -> Option<Self> {
        match byte {
            b'A'..=b'Z' => Some(Self(byte - b'A')),
            b'a'..=b'z' => Some(Self(byte - b'a')),
            _ => None,
        }
    }

    /// Uppercase letter label.
    #[inline(always)]
    pub const fn to_char(self) -> char {
        (b'A' + self.0) as char
    }

    /// Iterate over the first `count` genotypes (`A`, `B`, ...).
    ///
    /// `count` is clamped to [`Genotype::MAX_COUNT`].
    pub fn all(count: usize) -> impl Iterator<Item = Genotype> {
        (0..count.min(Self::MAX_COUNT)).map(|i| Self(i as u8))
    }

    /// Validate a genotype-set size.
    pub fn check_count(count: usize) -> Result<(), SimulationError> {
        if count == 0 {
            return Err(SimulationError::InvalidParameter(
                "At least one genotype is required".into(),
            ));
        }
        if count > Self::MAX_COUNT {
            return Err(SimulationError::InvalidParameter(format!(
                "No support for more than {} genotypes (got {count})",
                Self::MAX_COUNT
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl FromStr for Genotype {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = s.trim().bytes();
        match (bytes.next(), bytes.next()) {
            (Some(b), None) => Self::from_ascii(b).ok_or_else(|| {
                SimulationError::InvalidParameter(format!("Invalid genotype label '{s}'"))
            }),
            _ => Err(SimulationError::InvalidParameter(format!(
                "Invalid genotype label '{s}'"
            ))),
        }
    }
}
