//! Seed management
//!
//! One master seed drives the whole run; terrain generation and the droplet
//! simulation each get their own derived seed so either can be varied while
//! the other is held fixed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for each randomised stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Noise field for the starting heightmap
    pub terrain: u64,
    /// Droplet spawn positions, headings and flat-ground fallbacks
    pub erosion: u64,
}

impl Seeds {
    /// Derive all sub-seeds deterministically from a master seed.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            terrain: derive_seed(master, "terrain"),
            erosion: derive_seed(master, "erosion"),
        }
    }

    /// Override the terrain seed
    pub fn with_terrain(mut self, seed: u64) -> Self {
        self.terrain = seed;
        self
    }

    /// Override the erosion seed
    pub fn with_erosion(mut self, seed: u64) -> Self {
        self.erosion = seed;
        self
    }
}

/// Derive a sub-seed from a master seed and a stage name.
fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for Seeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "master: {}, terrain: {}, erosion: {}",
            self.master, self.terrain, self.erosion
        )
    }
}
