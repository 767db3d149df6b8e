//! Non-player dynamic nodes: dropped boxes, the target marker, lights

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::node::Transform;
use super::Behavior;
use super::UpdateContext;
use crate::config::{MarkerConfig, SpawnerConfig};
use crate::wrap_angle;

/// A dropped box falling at constant speed until it reaches the floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallingProp {
    /// Units per second
    pub fall_speed: f32,
    /// Lowest height the prop can reach
    pub floor: f32,
}

impl Default for FallingProp {
    fn default() -> Self {
        Self::from_config(&SpawnerConfig::default())
    }
}

impl FallingProp {
    pub fn from_config(config: &SpawnerConfig) -> Self {
        Self {
            fall_speed: config.fall_speed,
            floor: config.floor,
        }
    }

    /// Whether the prop has come to rest
    pub fn landed(&self, transform: &Transform) -> bool {
        transform.translation.y <= self.floor
    }
}

impl Behavior for FallingProp {
    fn update(&mut self, transform: &mut Transform, dt: f32, _ctx: &UpdateContext) {
        let y = transform.translation.y;
        if y > self.floor {
            transform.translation.y = (y - self.fall_speed * dt).max(self.floor);
        }
    }
}

/// Floating arrow above the current target: bobs between `low` and `high`
/// and spins about Y
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetMarker {
    pub low: f32,
    pub high: f32,
    pub sensitivity: f32,
    /// Current height above the anchor
    pub offset: f32,
    pub rising: bool,
}

impl Default for TargetMarker {
    fn default() -> Self {
        Self::from_config(&MarkerConfig::default())
    }
}

impl TargetMarker {
    pub fn from_config(config: &MarkerConfig) -> Self {
        Self {
            low: config.low,
            high: config.high,
            sensitivity: config.sensitivity,
            offset: config.start,
            rising: true,
        }
    }
}

impl Behavior for TargetMarker {
    fn update(&mut self, transform: &mut Transform, dt: f32, ctx: &UpdateContext) {
        let step = dt * self.sensitivity;
        if self.rising {
            if self.offset < self.high {
                self.offset += step;
            } else {
                self.rising = false;
            }
        } else if self.offset > self.low {
            self.offset -= step;
        } else {
            self.rising = true;
        }

        // Without a target the marker only spins in place
        if let Some(anchor) = ctx.anchor {
            transform.translation = anchor + Vec3::new(0.0, self.offset, 0.0);
        }

        transform.rotation.y = wrap_angle(transform.rotation.y - step / 2.0);
    }
}

/// Phong light colors; consumed by the renderer only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightParams {
    pub ambient: [u8; 3],
    pub diffuse: [u8; 3],
    pub specular: [u8; 3],
    pub shininess: f32,
    /// Constant, linear, quadratic
    pub attenuation: [f32; 3],
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            ambient: [51, 51, 51],
            diffuse: [255, 255, 255],
            specular: [0, 0, 0],
            shininess: 1.0,
            attenuation: [1.0, 0.0, 0.0002],
        }
    }
}
