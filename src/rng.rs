//! Seedable random streams.
//!
//! Every consumer gets its own named ChaCha stream derived from one master
//! seed, so position draws, species draws and coverage selection never share
//! state and a fixed seed reproduces a run exactly.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const POSITIONS: &str = "positions";
pub const SPECIES: &str = "species";
pub const SELECTION: &str = "selection";

#[derive(Debug, Clone, Copy)]
pub struct RngManager {
    master_seed: u64,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self { master_seed: seed }
    }

    /// Unseeded mode for production variety.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map(Self::new).unwrap_or_else(Self::from_entropy)
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn stream(&self, name: &str) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.derive_seed(name))
    }

    fn derive_seed(&self, name: &str) -> u64 {
        let mut seed = self.master_seed;
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        for byte in name.bytes() {
            seed ^= (byte as u64).wrapping_mul(1103515245);
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
        }
        seed
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::new(42)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_seed_same_stream() {
        let a: f64 = RngManager::new(42).stream(POSITIONS).gen();
        let b: f64 = RngManager::new(42).stream(POSITIONS).gen();
        assert_eq!(a, b, "Same seed should produce same values");
    }

    #[test]
    fn named_streams_differ() {
        let rng = RngManager::new(42);
        let a: f64 = rng.stream(POSITIONS).gen();
        let b: f64 = rng.stream(SPECIES).gen();
        assert_ne!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a: f64 = RngManager::new(1).stream(POSITIONS).gen();
        let b: f64 = RngManager::new(2).stream(POSITIONS).gen();
        assert_ne!(a, b);
    }

    #[test]
    fn optional_seed_is_honoured() {
        assert_eq!(RngManager::from_optional_seed(Some(9)).master_seed(), 9);
    }
}
