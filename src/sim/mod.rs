//! Frame-driven simulation module
//!
//! All gameplay logic lives here. It is single-threaded and runs to
//! completion once per host frame:
//! - The host supplies `dt` and an input snapshot; nothing reads the clock
//! - Target selection uses a seeded RNG only
//! - Stable iteration order (scene traversal order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod input;
pub mod node;
pub mod physics;
pub mod props;
pub mod scene;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod vehicle;

use glam::Vec3;

pub use collision::{Bounds, intervals_intersect};
pub use input::{InputState, Key};
pub use node::{MeshId, Node, NodeId, NodeKind, Transform};
pub use physics::Physics;
pub use props::{FallingProp, LightParams, TargetMarker};
pub use scene::{MeshInfo, Scene};
pub use spawner::{Cooldown, Spawner};
pub use state::{SimError, World};
pub use tick::{TickInput, tick};
pub use vehicle::Vehicle;

/// Read-only data a node behaviour may use during its update
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    /// Held keys for this tick
    pub input: &'a InputState,
    /// World position the node should follow, if any (the marker's target)
    pub anchor: Option<Vec3>,
}

impl<'a> UpdateContext<'a> {
    pub fn new(input: &'a InputState) -> Self {
        Self {
            input,
            anchor: None,
        }
    }

    pub fn with_anchor(mut self, anchor: Vec3) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

/// Per-frame behaviour of a node kind
pub trait Behavior {
    /// Advance one frame, mutating the node's local transform
    fn update(&mut self, transform: &mut Transform, dt: f32, ctx: &UpdateContext);
}
