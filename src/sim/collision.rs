//! Axis-aligned bounding boxes and minimum-translation push-out
//!
//! Boxes are never rotated: a node's mesh-space box is scaled by the node's
//! world scale and offset by its world translation. That keeps every test a
//! handful of interval comparisons.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// An axis-aligned box given by its min/max corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` with the given half extents
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Move the box by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Place a mesh-space box in the world using only the scale and
    /// translation of `world`. Rotation is ignored (known approximation).
    pub fn to_world(&self, world: &Mat4) -> Self {
        let (scale, _rotation, translation) = world.to_scale_rotation_translation();
        let a = self.min * scale;
        let b = self.max * scale;
        // Negative scale would swap the corners
        Self {
            min: a.min(b) + translation,
            max: a.max(b) + translation,
        }
    }

    /// Overlap test; touching faces count as intersecting
    pub fn intersects(&self, other: &Bounds) -> bool {
        intervals_intersect(self.min.x, self.max.x, other.min.x, other.max.x)
            && intervals_intersect(self.min.y, self.max.y, other.min.y, other.max.y)
            && intervals_intersect(self.min.z, self.max.z, other.min.z, other.max.z)
    }

    /// Overlap depth along each axis (zero on axes that don't overlap)
    pub fn overlap(&self, other: &Bounds) -> Vec3 {
        (self.max.min(other.max) - self.min.max(other.min)).max(Vec3::ZERO)
    }

    /// Smallest single-axis translation that moves `self` out of `other`.
    ///
    /// Candidates are `other.max - self.min` (push +axis) and
    /// `self.max - other.min` (push -axis) on each axis; the smallest
    /// non-negative one wins, ties resolved in x, y, z order with the
    /// positive direction first. Returns `None` when every candidate is
    /// negative.
    pub fn push_out(&self, other: &Bounds) -> Option<Vec3> {
        let toward_positive = other.max - self.min;
        let toward_negative = self.max - other.min;

        let candidates = [
            (toward_positive.x, Vec3::X),
            (toward_positive.y, Vec3::Y),
            (toward_positive.z, Vec3::Z),
            (toward_negative.x, Vec3::NEG_X),
            (toward_negative.y, Vec3::NEG_Y),
            (toward_negative.z, Vec3::NEG_Z),
        ];

        let mut best: Option<(f32, Vec3)> = None;
        for (depth, axis) in candidates {
            if depth >= 0.0 && best.is_none_or(|(min, _)| depth < min) {
                best = Some((depth, axis));
            }
        }
        best.map(|(depth, axis)| axis * depth)
    }
}

/// 1D interval overlap, inclusive of shared endpoints
#[inline]
pub fn intervals_intersect(min1: f32, max1: f32, min2: f32, max2: f32) -> bool {
    !(min1 > max2 || min2 > max1)
}
