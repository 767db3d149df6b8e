//! Game tuning
//!
//! All gameplay constants live in one serializable record so a host can
//! override any subset of them with a JSON blob.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::deg_to_rad;

/// Which kinematic model a vehicle runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VehicleModel {
    /// Hovers: has vertical thrust, banks while moving
    #[default]
    Drone,
    /// Flat flight: no vertical thrust, burns fuel while thrusting
    Plane,
}

impl VehicleModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleModel::Drone => "drone",
            VehicleModel::Plane => "plane",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "drone" => Some(VehicleModel::Drone),
            "plane" => Some(VehicleModel::Plane),
            _ => None,
        }
    }
}

/// Tunable kinematics for one vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Speed cap (units/s)
    pub max_speed: f32,
    /// Fraction of velocity lost per idle tick
    pub friction: f32,
    /// Thrust per held key (units/s²)
    pub acceleration: f32,
    /// Yaw and tilt rate (radians/s)
    pub rotate_sensitivity: f32,
    /// Maximum pitch/roll excursion from the start pose (radians)
    pub max_tilt: f32,
    /// Neutral pitch (radians)
    pub start_pitch: f32,
    /// Neutral roll (radians)
    pub start_roll: f32,
    /// Initial fuel; `None` means unlimited
    pub fuel: Option<f32>,
    /// Fuel burned per second of thrust
    pub fuel_burn: f32,
}

impl VehicleParams {
    /// Original drone tuning
    pub fn drone() -> Self {
        Self {
            max_speed: DRONE_MAX_SPEED,
            friction: DRONE_FRICTION,
            acceleration: DRONE_ACCELERATION,
            rotate_sensitivity: DRONE_ROTATE_SENSITIVITY,
            max_tilt: deg_to_rad(DRONE_MAX_TILT_DEG),
            start_pitch: deg_to_rad(DRONE_START_PITCH_DEG),
            start_roll: 0.0,
            fuel: None,
            fuel_burn: 0.0,
        }
    }

    /// Original plane tuning
    pub fn plane() -> Self {
        Self {
            max_speed: PLANE_MAX_SPEED,
            start_pitch: 0.0,
            fuel: Some(PLANE_FUEL),
            fuel_burn: PLANE_FUEL_BURN,
            ..Self::drone()
        }
    }

    pub fn for_model(model: VehicleModel) -> Self {
        match model {
            VehicleModel::Drone => Self::drone(),
            VehicleModel::Plane => Self::plane(),
        }
    }
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self::drone()
    }
}

/// Dropped-box pool settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Cap on live dropped boxes
    pub max_props: usize,
    /// Offset from the vehicle where a box appears
    pub drop_offset: Vec3,
    /// Ticks before another player drop is accepted
    pub cooldown_ticks: u32,
    /// Box fall speed (units/s)
    pub fall_speed: f32,
    /// Height at which boxes stop falling
    pub floor: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            max_props: MAX_PROPS,
            drop_offset: Vec3::new(0.0, DROP_OFFSET_Y, 0.0),
            cooldown_ticks: COOLDOWN_TICKS,
            fall_speed: FALL_SPEED,
            floor: FLOOR_Y,
        }
    }
}

/// Floating target marker settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub low: f32,
    pub high: f32,
    pub start: f32,
    /// Bob rate (units/s); spin runs at half this rate (radians/s)
    pub sensitivity: f32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            low: MARKER_LOW,
            high: MARKER_HIGH,
            start: MARKER_START,
            sensitivity: MARKER_SENSITIVITY,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub drone: VehicleParams,
    pub plane: VehicleParams,
    pub spawner: SpawnerConfig,
    pub marker: MarkerConfig,
    /// Score added per box landed on the target
    pub points_per_score: u64,
    /// Seed for target selection
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            drone: VehicleParams::drone(),
            plane: VehicleParams::plane(),
            spawner: SpawnerConfig::default(),
            marker: MarkerConfig::default(),
            points_per_score: POINTS_PER_SCORE,
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parameters for the given vehicle model
    pub fn vehicle(&self, model: VehicleModel) -> VehicleParams {
        match model {
            VehicleModel::Drone => self.drone,
            VehicleModel::Plane => self.plane,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
