//! Seeded dice for per-match rolls

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// A die result in [1, 6]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Roll(u8);

impl Roll {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;
    /// The roll that opens the center tile for placement
    pub const CENTER_ENTRY: u8 = 4;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Movement distance for this roll
    pub fn distance(&self) -> i32 {
        i32::from(self.0)
    }
}

impl std::fmt::Display for Roll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic die for a single match
#[derive(Debug, Clone)]
pub struct Dice {
    rng: ChaCha8Rng,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn roll(&mut self) -> Roll {
        Roll(self.rng.gen_range(Roll::MIN..=Roll::MAX))
    }
}
