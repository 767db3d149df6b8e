//! Drone Drop - fly a drone (or plane) over a 3D scene and drop boxes on targets
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (scene graph, kinematics, physics, spawning)
//! - `loader`: Scene description parsing into a `sim::Scene`
//! - `config`: Data-driven game tuning
//! - `platform`: Browser host binding

pub mod config;
pub mod loader;
pub mod platform;
pub mod sim;

pub use config::GameConfig;
pub use loader::{LoadError, SceneDescription};

/// Game configuration constants
pub mod consts {
    /// Points awarded when a dropped box lands on the current target
    pub const POINTS_PER_SCORE: u64 = 100;

    /// Upper bound on a single frame's `dt` (seconds), avoids tunnelling after a tab switch
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Drone defaults
    pub const DRONE_MAX_SPEED: f32 = 10.0;
    pub const DRONE_FRICTION: f32 = 0.2;
    pub const DRONE_ACCELERATION: f32 = 20.0;
    pub const DRONE_ROTATE_SENSITIVITY: f32 = 1.5;
    pub const DRONE_MAX_TILT_DEG: f32 = 20.0;
    pub const DRONE_START_PITCH_DEG: f32 = 110.0;

    /// Plane defaults
    pub const PLANE_MAX_SPEED: f32 = 3.0;
    pub const PLANE_FUEL: f32 = 100.0;
    /// Fuel burned per second of held thrust
    pub const PLANE_FUEL_BURN: f32 = 1.0;

    /// Spawner defaults
    pub const MAX_PROPS: usize = 10;
    pub const COOLDOWN_TICKS: u32 = 500;
    pub const DROP_OFFSET_Y: f32 = -3.0;

    /// Falling box defaults
    pub const FALL_SPEED: f32 = 10.0;
    pub const FLOOR_Y: f32 = -10.0;

    /// Target marker bob range (height above the target)
    pub const MARKER_LOW: f32 = 13.0;
    pub const MARKER_HIGH: f32 = 17.0;
    pub const MARKER_START: f32 = 15.0;
    pub const MARKER_SENSITIVITY: f32 = 1.5;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    ((angle % TAU) + TAU) % TAU
}

/// Degrees to radians
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees.to_radians()
}
