//! Erosion simulation module
//!
//! Particle-based hydraulic erosion: water droplets roll over a heightmap,
//! carving material from the cells they leave and shedding it again when they
//! climb or carry more than they can hold.

pub mod hydraulic;
pub mod params;
pub mod utils;

pub use hydraulic::{simulate, Droplet, HydraulicErosion, StepOutcome};
pub use params::{DepositionMode, ErosionParams, ErosionPreset};

use thiserror::Error;

/// Errors raised when binding the erosion engine to a heightmap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErosionError {
    #[error("heightmap must be at least 2x2 for gradient sampling, got {width}x{height}")]
    DegenerateHeightmap { width: usize, height: usize },
}

/// Why a droplet stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The next step would have left the map
    OutOfBounds,
    /// The droplet used up `max_path` steps
    StepLimitReached,
}

/// Statistics from erosion simulation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErosionStats {
    /// Number of droplets simulated
    pub drops: usize,
    /// Kinematics steps executed, including the step that left the map
    pub steps_taken: u64,
    /// Droplets that left the map
    pub out_of_bounds: usize,
    /// Droplets retired by the step limit
    pub step_limit: usize,
    /// Total material removed from the grid
    pub total_eroded: f64,
    /// Total sediment shed by droplets (climbing or over capacity)
    pub total_deposited: f64,
    /// Sediment still held by droplets when they were retired
    pub sediment_carried_off: f64,
    /// Largest single-step erosion
    pub max_erosion: f32,
}

impl ErosionStats {
    /// Mean steps per droplet.
    pub fn mean_path_length(&self) -> f64 {
        if self.drops == 0 {
            0.0
        } else {
            self.steps_taken as f64 / self.drops as f64
        }
    }
}

impl std::fmt::Display for ErosionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  Droplets:        {}", self.drops)?;
        writeln!(
            f,
            "  Steps:           {} ({:.1} per droplet)",
            self.steps_taken,
            self.mean_path_length()
        )?;
        writeln!(
            f,
            "  Terminated:      {} left the map, {} hit the step limit",
            self.out_of_bounds, self.step_limit
        )?;
        writeln!(f, "  Eroded:          {:.4}", self.total_eroded)?;
        writeln!(f, "  Deposited:       {:.4}", self.total_deposited)?;
        writeln!(f, "  Carried off:     {:.4}", self.sediment_carried_off)?;
        write!(f, "  Max step erosion: {:.4}", self.max_erosion)
    }
}
