//! Droplet erosion parameters and presets

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named parameter bundles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErosionPreset {
    /// Low inertia, high erosion: fine, twisting gullies
    #[default]
    Default,
    /// Higher inertia and smaller capacity: straighter, shallower channels
    Classic,
    /// Slow erosion with heavier deposition
    Gentle,
    /// Full erosion rate and doubled capacity
    Aggressive,
}

impl ErosionPreset {
    pub fn all() -> &'static [Self] {
        &[Self::Default, Self::Classic, Self::Gentle, Self::Aggressive]
    }
}

impl std::fmt::Display for ErosionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Classic => write!(f, "classic"),
            Self::Gentle => write!(f, "gentle"),
            Self::Aggressive => write!(f, "aggressive"),
        }
    }
}

impl FromStr for ErosionPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|preset| preset.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<String> = Self::all().iter().map(ToString::to_string).collect();
                format!("unknown preset '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// What happens to sediment a droplet sheds while moving uphill or over capacity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositionMode {
    /// Shed sediment leaves the simulation; only erosion writes the grid
    #[default]
    Discard,
    /// Shed sediment is added to the cell the droplet is leaving
    Terrain,
}

/// Droplet erosion parameters.
///
/// No range validation happens here: values outside the documented ranges
/// give poor terrain but never a panic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Weight of the previous heading against the downhill gradient (0.0-1.0)
    pub inertia: f32,

    /// Carrying capacity multiplier
    pub capacity: f32,

    /// Fraction of the capacity overflow dropped per step (0.0-1.0)
    pub deposition: f32,

    /// Fraction of the capacity deficit picked up per step (0.0-1.0)
    pub erosion: f32,

    /// Fraction of water lost per step (0.0-1.0)
    pub evaporation: f32,

    /// Floor on the slope used for carrying capacity
    pub min_slope: f32,

    /// Scales the velocity change from a height difference
    pub gravity: f32,

    /// Brush radius. Kept for configuration compatibility; the erosion rule
    /// touches a single cell and never reads it.
    pub radius: usize,

    /// Steps per droplet before it is retired
    pub max_path: usize,

    /// Handling of shed sediment
    pub deposition_mode: DepositionMode,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            inertia: 0.01,
            capacity: 32.0,
            deposition: 0.1,
            erosion: 0.9,
            evaporation: 0.02,
            min_slope: 0.01,
            gravity: 10.0,
            radius: 32,
            max_path: 64,
            deposition_mode: DepositionMode::Discard,
        }
    }
}

impl ErosionParams {
    /// Create parameters from a preset
    pub fn from_preset(preset: ErosionPreset) -> Self {
        match preset {
            ErosionPreset::Default => Self::default(),
            ErosionPreset::Classic => Self {
                inertia: 0.3,
                capacity: 8.0,
                deposition: 0.2,
                erosion: 0.7,
                radius: 4,
                ..Default::default()
            },
            ErosionPreset::Gentle => Self {
                erosion: 0.3,
                deposition: 0.3,
                ..Default::default()
            },
            ErosionPreset::Aggressive => Self {
                erosion: 1.0,
                capacity: 64.0,
                ..Default::default()
            },
        }
    }

    /// Load parameters from a JSON file. Missing fields take their defaults.
    pub fn load_json(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        let params = serde_json::from_str(&json)?;
        Ok(params)
    }

    /// Save parameters to a JSON file
    pub fn save_json(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
