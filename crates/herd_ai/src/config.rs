//! Agent and simulation configuration

use herd_core::{HerdError, Result};
use serde::{Deserialize, Serialize};

/// Default time between path refreshes, in seconds
pub const DEFAULT_PATH_UPDATE_INTERVAL: f32 = 0.25;

/// Default number of stagger slots path refreshes are spread across
pub const DEFAULT_STAGGER_SLOTS: u32 = 10;

/// Default angular lerp rate for facing, per second
pub const DEFAULT_TURN_RATE: f32 = 5.0;

/// Per-agent steering tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentParams {
    /// Speed cap
    pub max_speed: f32,
    /// Steering force cap, also the deceleration used for stopping distance
    pub max_force: f32,
    /// Arrive starts slowing down inside this distance
    pub slowing_radius: f32,
    /// Neighbors closer than this push the agent away
    pub separation_radius: f32,
    /// Separation force cap
    pub separation_strength: f32,
    /// Blend weight of the seek/arrive force
    pub arrive_weight: f32,
    /// Blend weight of the separation force
    pub separation_weight: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            max_force: 10.0,
            slowing_radius: 3.0,
            separation_radius: 1.5,
            separation_strength: 10.0,
            arrive_weight: 1.0,
            separation_weight: 1.0,
        }
    }
}

impl AgentParams {
    /// Set max speed
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Set max force
    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force;
        self
    }

    /// Set arrive slowing radius
    pub fn with_slowing_radius(mut self, radius: f32) -> Self {
        self.slowing_radius = radius;
        self
    }

    /// Set separation radius and strength
    pub fn with_separation(mut self, radius: f32, strength: f32) -> Self {
        self.separation_radius = radius;
        self.separation_strength = strength;
        self
    }

    /// Set blend weights
    pub fn with_weights(mut self, arrive: f32, separation: f32) -> Self {
        self.arrive_weight = arrive;
        self.separation_weight = separation;
        self
    }

    /// Reject negative or non-finite tunables
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("max_speed", self.max_speed),
            ("max_force", self.max_force),
            ("slowing_radius", self.slowing_radius),
            ("separation_radius", self.separation_radius),
            ("separation_strength", self.separation_strength),
            ("arrive_weight", self.arrive_weight),
            ("separation_weight", self.separation_weight),
        ];

        for (name, value) in fields {
            non_negative(name, value)?;
        }

        Ok(())
    }
}

/// Simulation-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Base interval between path refreshes, in seconds
    pub path_update_interval: f32,
    /// Number of distinct stagger offsets within one interval
    pub stagger_slots: u32,
    /// How fast facing turns toward the direction of travel
    pub turn_rate: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            path_update_interval: DEFAULT_PATH_UPDATE_INTERVAL,
            stagger_slots: DEFAULT_STAGGER_SLOTS,
            turn_rate: DEFAULT_TURN_RATE,
        }
    }
}

impl SimulationConfig {
    /// Set path update interval
    pub fn with_path_update_interval(mut self, interval: f32) -> Self {
        self.path_update_interval = interval;
        self
    }

    /// Set stagger slot count
    pub fn with_stagger_slots(mut self, slots: u32) -> Self {
        self.stagger_slots = slots;
        self
    }

    /// Set facing turn rate
    pub fn with_turn_rate(mut self, turn_rate: f32) -> Self {
        self.turn_rate = turn_rate;
        self
    }

    pub fn validate(&self) -> Result<()> {
        non_negative("path_update_interval", self.path_update_interval)?;
        non_negative("turn_rate", self.turn_rate)?;

        if self.stagger_slots == 0 {
            return Err(HerdError::InvalidConfig(
                "stagger_slots must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(HerdError::InvalidConfig(format!(
            "{} must be finite and non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = AgentParams::default();
        assert_eq!(params.max_speed, 5.0);
        assert_eq!(params.max_force, 10.0);
        assert_eq!(params.slowing_radius, 3.0);
        assert_eq!(params.separation_radius, 1.5);
        assert_eq!(params.separation_strength, 10.0);
        assert_eq!(params.arrive_weight, 1.0);
        assert_eq!(params.separation_weight, 1.0);

        let config = SimulationConfig::default();
        assert_eq!(config.path_update_interval, 0.25);
        assert_eq!(config.stagger_slots, 10);
        assert!(params.validate().is_ok());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(AgentParams::default().with_max_speed(-1.0).validate().is_err());
        assert!(AgentParams::default().with_max_force(f32::NAN).validate().is_err());
        assert!(SimulationConfig::default().with_stagger_slots(0).validate().is_err());

        let err = AgentParams::default()
            .with_separation(f32::INFINITY, 1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, HerdError::InvalidConfig(msg) if msg.contains("separation_radius")));
    }

    #[test]
    fn test_builders_set_fields() {
        let params = AgentParams::default()
            .with_slowing_radius(4.5)
            .with_weights(0.5, 2.0);
        assert_eq!(params.slowing_radius, 4.5);
        assert_eq!(params.arrive_weight, 0.5);
        assert_eq!(params.separation_weight, 2.0);

        let config = SimulationConfig::default()
            .with_path_update_interval(0.5)
            .with_turn_rate(8.0);
        assert_eq!(config.path_update_interval, 0.5);
        assert_eq!(config.turn_rate, 8.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_params_fill_defaults() {
        let params: AgentParams = serde_json::from_str(r#"{ "max_speed": 8.0 }"#).unwrap();
        assert_eq!(params.max_speed, 8.0);
        assert_eq!(params.slowing_radius, 3.0);
    }
}
