//! Runtime configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `HERD_AGENTS`, `HERD_DURATION`
//! 2. Config file named by `HERD_CONFIG`, else `herd.toml` in the working directory
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! agent_count = 40
//! duration_secs = 30.0
//!
//! [grid]
//! width = 60.0
//! depth = 60.0
//!
//! [simulation]
//! path_update_interval = 0.5
//!
//! [agent]
//! max_speed = 6.0
//! separation_weight = 1.5
//! ```

use herd_ai::navigation::DEFAULT_WAYPOINT_REACHED_DISTANCE;
use herd_ai::{AgentParams, HostConfig, SimulationConfig};
use herd_core::HerdError;
use herd_math::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Config file looked up when `HERD_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "herd.toml";

/// Errors while loading runtime configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] HerdError),
}

/// Walkable area
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: f32,
    pub depth: f32,
    pub cell_size: f32,
    /// Distance at which an intermediate waypoint counts as reached
    pub waypoint_reached_distance: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 40.0,
            depth: 40.0,
            cell_size: 1.0,
            waypoint_reached_distance: DEFAULT_WAYPOINT_REACHED_DISTANCE,
        }
    }
}

impl GridConfig {
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.width * 0.5, 0.0, self.depth * 0.5)
    }
}

/// Scripted stand-in for a mouse dragging the target: the camera hangs over
/// the grid center and the pointer circles the screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Camera offset from the grid center
    pub camera_offset: Vec3,
    /// Radius of the circle the pointer traces on the ground
    pub orbit_radius: f32,
    /// Radians per second
    pub orbit_speed: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            camera_offset: Vec3::new(0.0, 25.0, 15.0),
            orbit_radius: 12.0,
            orbit_speed: 0.3,
        }
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Agents spawned at startup
    pub agent_count: usize,
    /// Rendered frames per second
    pub frame_rate: u32,
    /// Physics steps per second
    pub physics_rate: u32,
    /// Simulated seconds to run for
    pub duration_secs: f32,
    /// Sleep out each frame's budget instead of running flat out
    pub real_time: bool,
    /// Seconds between progress reports
    pub report_interval_secs: f32,
    /// Seconds between replacing the oldest agent with a fresh one; zero disables
    pub churn_interval_secs: f32,
    pub grid: GridConfig,
    pub pointer: PointerConfig,
    pub simulation: SimulationConfig,
    pub agent: AgentParams,
    pub host: HostConfig,
    /// Where this config came from
    #[serde(skip)]
    pub config_path: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            agent_count: 20,
            frame_rate: 60,
            physics_rate: 60,
            duration_secs: 20.0,
            real_time: false,
            report_interval_secs: 1.0,
            churn_interval_secs: 0.0,
            grid: GridConfig::default(),
            pointer: PointerConfig::default(),
            simulation: SimulationConfig::default(),
            agent: AgentParams::default(),
            host: HostConfig::default(),
            config_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources. Never fails: a broken config
    /// file is reported and defaults are used instead.
    pub fn load() -> Self {
        let path = std::env::var("HERD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = if Path::new(&path).exists() {
            match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path);
                    config
                }
                Err(e) => {
                    log::error!("{}; using defaults", e);
                    Self::default()
                }
            }
        } else {
            log::debug!("No config file at {}, using defaults", path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());

        if let Err(e) = config.validate() {
            log::error!("{}; using defaults", e);
            config = Self::default();
        }

        config
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        config.config_path = Some(path.to_string());
        Ok(config)
    }

    /// Apply `HERD_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("HERD_AGENTS") {
            match value.trim().parse() {
                Ok(count) => {
                    self.agent_count = count;
                    log::info!("Agent count from env: {}", count);
                }
                Err(_) => log::warn!("Ignoring HERD_AGENTS={:?}", value),
            }
        }

        if let Some(value) = lookup("HERD_DURATION") {
            match value.trim().parse() {
                Ok(secs) => {
                    self.duration_secs = secs;
                    log::info!("Duration from env: {}s", secs);
                }
                Err(_) => log::warn!("Ignoring HERD_DURATION={:?}", value),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.agent.validate()?;

        if self.frame_rate == 0 || self.physics_rate == 0 {
            let reason = "frame_rate and physics_rate must be positive";
            return Err(HerdError::InvalidConfig(reason.into()).into());
        }

        let grid = &self.grid;
        if !(grid.cell_size > 0.0 && grid.width >= grid.cell_size && grid.depth >= grid.cell_size) {
            return Err(HerdError::InvalidConfig(format!(
                "grid {}x{} cannot hold cells of {}",
                grid.width, grid.depth, grid.cell_size
            ))
            .into());
        }

        if !(grid.waypoint_reached_distance > 0.0 && grid.waypoint_reached_distance.is_finite()) {
            return Err(HerdError::InvalidConfig(format!(
                "waypoint_reached_distance must be positive, got {}",
                grid.waypoint_reached_distance
            ))
            .into());
        }

        if !(self.duration_secs.is_finite() && self.duration_secs >= 0.0) {
            let reason = "duration_secs must be non-negative";
            return Err(HerdError::InvalidConfig(reason.into()).into());
        }

        Ok(())
    }

    /// Seconds per physics step
    pub fn physics_dt(&self) -> f32 {
        1.0 / self.physics_rate as f32
    }

    /// Seconds per rendered frame
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.frame_rate as f32
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        log::info!("=== Herd Configuration ===");
        log::info!("  Source: {}", self.config_path.as_deref().unwrap_or("defaults"));
        log::info!("  Agents: {}", self.agent_count);
        log::info!(
            "  Grid: {}x{} (cell {}, waypoint reached at {})",
            self.grid.width,
            self.grid.depth,
            self.grid.cell_size,
            self.grid.waypoint_reached_distance
        );
        log::info!("  Frame rate: {} Hz, physics: {} Hz", self.frame_rate, self.physics_rate);
        log::info!(
            "  Path refresh: {}s over {} slots",
            self.simulation.path_update_interval,
            self.simulation.stagger_slots
        );
        let pacing = if self.real_time { " (real time)" } else { "" };
        log::info!("  Duration: {}s{}", self.duration_secs, pacing);
        log::info!("==========================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.stagger_slots, 10);
        assert_eq!(config.agent.max_speed, 5.0);
    }

    #[test]
    fn test_partial_toml() {
        let config: RuntimeConfig = toml::from_str(
            r#"
            agent_count = 7

            [grid]
            width = 12.0
            waypoint_reached_distance = 0.5

            [agent]
            max_speed = 8.0

            [host.gravity]
            x = 0.0
            y = -3.0
            z = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.agent_count, 7);
        assert_eq!(config.grid.width, 12.0);
        assert_eq!(config.grid.depth, 40.0);
        assert_eq!(config.grid.waypoint_reached_distance, 0.5);
        assert_eq!(config.agent.max_speed, 8.0);
        assert_eq!(config.agent.max_force, 10.0);
        assert_eq!(config.host.gravity, Vec3::new(0.0, -3.0, 0.0));
        assert_eq!(config.frame_rate, 60);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RuntimeConfig::default();
        config.apply_overrides(|key| match key {
            "HERD_AGENTS" => Some("3".to_string()),
            "HERD_DURATION" => Some("bogus".to_string()),
            _ => None,
        });

        assert_eq!(config.agent_count, 3);
        assert_eq!(config.duration_secs, 20.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = RuntimeConfig::default();
        config.physics_rate = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = RuntimeConfig::default();
        config.grid.cell_size = 0.0;
        assert!(config.validate().is_err());

        let mut config = RuntimeConfig::default();
        config.grid.waypoint_reached_distance = 0.0;
        assert!(config.validate().is_err());

        let mut config = RuntimeConfig::default();
        config.simulation.stagger_slots = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = RuntimeConfig::from_file("/nonexistent/herd.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/herd.toml"));
    }
}
