//! Configuration System
//!
//! Loads tuning parameters from tuning.toml for easy adjustment without recompiling.

use bevy_ecs::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level configuration structure
#[derive(Resource, Debug, Clone, Deserialize)]
pub struct Config {
    pub combat: CombatTuning,
    pub cover: CoverTuning,
}

/// Attack selection and execution parameters
#[derive(Debug, Clone, Deserialize)]
pub struct CombatTuning {
    /// Damage applied when an attack lands in the demo loop
    pub attack_damage: f32,
    /// Minimum seconds between attack swings
    pub swing_seconds: f32,
    /// Stopping distance restored when no attack distance applies
    pub default_stopping_distance: f32,
    /// Straight-line movement speed in units per second
    pub move_speed: f32,
}

/// Cover search and state machine parameters
#[derive(Debug, Clone, Deserialize)]
pub struct CoverTuning {
    /// Radius of the candidate node query around the agent
    pub search_radius: f32,
    /// Minimum allowed distance between a candidate and any visible hostile
    pub min_cover_distance: f32,
    /// Maximum distance the agent is willing to travel to a node
    pub max_travel_distance: f32,
    /// Size of the closest-first shortlist the final pick is drawn from
    pub shortlist_size: usize,
    /// Half-angle for the hostile-facing plausibility filter, in degrees
    pub facing_plausibility_degrees: f32,
    /// Cover retry interval while inactive, lower bound (seconds)
    pub retry_seconds_min: f32,
    /// Cover retry interval while inactive, upper bound (seconds)
    pub retry_seconds_max: f32,
    /// Distance at which travel to a node counts as arrived
    pub arrive_distance: f32,
    /// Interpolation speed for the final snap onto the node (units/sec)
    pub arrival_lerp_speed: f32,
    /// Maximum seconds spent rotating toward the target after arrival
    pub turn_in_seconds: f32,
    /// Angle tolerance that ends the turn-in early, in degrees
    pub turn_tolerance_degrees: f32,
    /// Settle delay after leaving the hide pose (seconds)
    pub settle_seconds: f32,
    /// Lateral offset used when computing an unobstructed firing position
    pub reposition_offset: f32,
    /// Hide/peek cycle count bounds for crouch-and-peek nodes
    pub peak_times_min: u32,
    pub peak_times_max: u32,
    /// Hide phase duration bounds (seconds)
    pub hide_seconds_min: f32,
    pub hide_seconds_max: f32,
    /// Attack window duration bounds (seconds)
    pub attack_seconds_min: f32,
    pub attack_seconds_max: f32,
    /// Upper bound of the post-cycle desynchronization jitter (seconds)
    pub end_jitter_seconds: f32,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load configuration from the given path, or use defaults if not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            eprintln!("Warning: Could not load tuning file: {}. Using defaults.", e);
            Self::default()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            combat: CombatTuning {
                attack_damage: 8.0,
                swing_seconds: 1.0,
                default_stopping_distance: 1.5,
                move_speed: 4.0,
            },
            cover: CoverTuning {
                search_radius: 25.0,
                min_cover_distance: 4.0,
                max_travel_distance: 18.0,
                shortlist_size: 6,
                facing_plausibility_degrees: 110.0,
                retry_seconds_min: 0.9,
                retry_seconds_max: 1.15,
                arrive_distance: 0.6,
                arrival_lerp_speed: 3.0,
                turn_in_seconds: 2.5,
                turn_tolerance_degrees: 10.0,
                settle_seconds: 0.25,
                reposition_offset: 2.0,
                peak_times_min: 2,
                peak_times_max: 4,
                hide_seconds_min: 1.0,
                hide_seconds_max: 2.5,
                attack_seconds_min: 1.5,
                attack_seconds_max: 3.0,
                end_jitter_seconds: 0.5,
            },
        }
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}
