//! Drone and plane kinematics
//!
//! Each tick the held keys are turned into an acceleration along the
//! vehicle's yaw-relative axes, integrated into velocity (with friction when
//! idle and a hard speed cap) and then into position. Pitch and roll are
//! cosmetic banking driven toward a tilt limit while moving and relaxed back
//! to neutral when the keys are released.

use glam::Vec3;

use super::input::{InputState, Key};
use super::node::Transform;
use super::{Behavior, UpdateContext};
use crate::config::{VehicleModel, VehicleParams};
use crate::wrap_angle;

/// Kinematic state of a player vehicle
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub model: VehicleModel,
    pub params: VehicleParams,
    pub velocity: Vec3,
    /// Tracked separately from the node rotation so it can be clamped
    pub pitch: f32,
    pub roll: f32,
    /// Remaining fuel; `None` for vehicles that never run dry
    pub fuel: Option<f32>,
}

impl Vehicle {
    pub fn new(model: VehicleModel, params: VehicleParams) -> Self {
        Self {
            model,
            params,
            velocity: Vec3::ZERO,
            pitch: params.start_pitch,
            roll: params.start_roll,
            fuel: params.fuel,
        }
    }

    pub fn drone() -> Self {
        Self::new(VehicleModel::Drone, VehicleParams::drone())
    }

    pub fn plane() -> Self {
        Self::new(VehicleModel::Plane, VehicleParams::plane())
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn out_of_fuel(&self) -> bool {
        self.fuel.is_some_and(|f| f <= 0.0)
    }

    /// Horizontal heading for a yaw angle (yaw 0 faces -Z)
    #[inline]
    pub fn forward(yaw: f32) -> Vec3 {
        Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
    }

    #[inline]
    pub fn right(yaw: f32) -> Vec3 {
        Vec3::new(yaw.cos(), 0.0, -yaw.sin())
    }

    /// Thrust direction from the held keys; opposite keys cancel
    fn thrust(&self, input: &InputState, yaw: f32) -> Vec3 {
        if self.out_of_fuel() {
            return Vec3::ZERO;
        }
        let mut acc = Self::forward(yaw) * input.axis(Key::Forward, Key::Backward)
            + Self::right(yaw) * input.axis(Key::StrafeRight, Key::StrafeLeft);
        if self.model == VehicleModel::Drone {
            acc += Vec3::Y * input.axis(Key::Ascend, Key::Descend);
        }
        acc
    }

    fn burn_fuel(&mut self, thrusting: bool, dt: f32) {
        if !thrusting {
            return;
        }
        if let Some(fuel) = self.fuel.as_mut() {
            *fuel = (*fuel - self.params.fuel_burn * dt).max(0.0);
        }
    }

    /// Keep velocity within `max_speed`, preserving direction
    pub fn clamp_speed(&mut self) {
        let len = self.velocity.length();
        if len > self.params.max_speed && len > 0.0 {
            self.velocity *= self.params.max_speed / len;
        }
    }
}

/// Target for one tilt axis given which of its two keys are held.
/// `None` when both are held: tilt stays where it is.
fn tilt_target(toward_negative: bool, toward_positive: bool, start: f32, max: f32) -> Option<f32> {
    match (toward_negative, toward_positive) {
        (true, false) => Some(start - max),
        (false, true) => Some(start + max),
        (false, false) => Some(start),
        (true, true) => None,
    }
}

/// Step `current` toward `target` by at most `step`, then keep it within
/// `start ± max`
fn approach_tilt(current: f32, target: Option<f32>, step: f32, start: f32, max: f32) -> f32 {
    let next = match target {
        Some(target) if current < target => (current + step).min(target),
        Some(target) => (current - step).max(target),
        None => current,
    };
    next.clamp(start - max, start + max)
}

impl Behavior for Vehicle {
    fn update(&mut self, transform: &mut Transform, dt: f32, ctx: &UpdateContext) {
        let input = ctx.input;
        let p = self.params;
        let yaw = transform.rotation.y;

        // 1: acceleration from held keys
        let acc = self.thrust(input, yaw);
        self.burn_fuel(acc != Vec3::ZERO, dt);

        // 2: banking
        let step = p.rotate_sensitivity * dt;
        self.pitch = approach_tilt(
            self.pitch,
            tilt_target(input.held(Key::Forward), input.held(Key::Backward), p.start_pitch, p.max_tilt),
            step,
            p.start_pitch,
            p.max_tilt,
        );
        self.roll = approach_tilt(
            self.roll,
            tilt_target(input.held(Key::StrafeRight), input.held(Key::StrafeLeft), p.start_roll, p.max_tilt),
            step,
            p.start_roll,
            p.max_tilt,
        );
        transform.rotation.x = self.pitch;
        transform.rotation.z = self.roll;

        // 3: yaw
        if input.held(Key::TurnLeft) {
            transform.rotation.y += step;
        }
        if input.held(Key::TurnRight) {
            transform.rotation.y -= step;
        }
        transform.rotation.y = wrap_angle(transform.rotation.y);

        // 4: velocity, friction when idle, speed cap
        self.velocity += acc * (p.acceleration * dt);
        if !input.any() {
            self.velocity *= 1.0 - p.friction;
        }
        self.clamp_speed();

        // 5: position
        transform.translation += self.velocity * dt;
    }
}
