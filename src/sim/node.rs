//! Scene graph nodes
//!
//! A node carries a local transform (translation, Euler rotation, scale),
//! the matrix derived from it, an optional mesh-space bounding box and a
//! kind tag selecting its per-frame behaviour.
//!
//! Euler convention: rotation is stored as `[x, y, z]` radians and composed
//! intrinsically Z-Y-X (`q = qz * qy * qx`). Extraction returns `y` in
//! `[-π/2, π/2]`.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::Bounds;
use super::props::{FallingProp, LightParams, TargetMarker};
use super::vehicle::Vehicle;
use super::{Behavior, UpdateContext};

/// Handle into the scene arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a mesh in the loaded scene description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshId(pub usize);

/// Local transform components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles (radians) about x, y, z
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn quat(&self) -> Quat {
        euler_to_quat(self.rotation)
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.translation)
    }

    /// Decompose a TRS matrix
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation: quat_to_euler(rotation),
            scale,
        }
    }
}

/// Compose `[x, y, z]` Euler angles into a quaternion (intrinsic Z-Y-X)
#[inline]
pub fn euler_to_quat(rotation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::ZYX, rotation.z, rotation.y, rotation.x)
}

/// Extract `[x, y, z]` Euler angles from a quaternion (intrinsic Z-Y-X)
#[inline]
pub fn quat_to_euler(q: Quat) -> Vec3 {
    let (z, y, x) = q.to_euler(EulerRot::ZYX);
    Vec3::new(x, y, z)
}

/// Behaviour attached to a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Static geometry (ground, walls, decoration)
    Plain,
    /// Player-controlled drone or plane
    Vehicle(Vehicle),
    /// Dropped box in free fall
    Prop(FallingProp),
    /// Scoring location
    Target,
    /// Floating indicator above the current target
    Marker(TargetMarker),
    Light(LightParams),
    Camera,
}

impl NodeKind {
    pub fn is_vehicle(&self) -> bool {
        matches!(self, NodeKind::Vehicle(_))
    }

    pub fn is_prop(&self) -> bool {
        matches!(self, NodeKind::Prop(_))
    }

    pub fn is_target(&self) -> bool {
        matches!(self, NodeKind::Target)
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, NodeKind::Marker(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Plain => "node",
            NodeKind::Vehicle(v) => v.model.as_str(),
            NodeKind::Prop(_) => "box",
            NodeKind::Target => "target",
            NodeKind::Marker(_) => "arrow",
            NodeKind::Light(_) => "light",
            NodeKind::Camera => "camera",
        }
    }
}

/// A scene graph node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    /// Local matrix, kept in sync with `transform` by `update_matrix`
    pub matrix: Mat4,
    /// Mesh-space bounds; `None` excludes the node from physics
    pub aabb: Option<Bounds>,
    pub mesh: Option<MeshId>,
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: None,
            transform: Transform::default(),
            matrix: Mat4::IDENTITY,
            aabb: None,
            mesh: None,
            kind: NodeKind::Plain,
            parent: None,
            children: Vec::new(),
        }
    }
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self.update_matrix();
        self
    }

    pub fn with_aabb(mut self, aabb: Bounds) -> Self {
        self.aabb = Some(aabb);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Replace the matrix and decompose it back into the transform
    pub fn with_matrix(mut self, matrix: Mat4) -> Self {
        self.matrix = matrix;
        self.update_transform();
        self
    }

    /// Recompute `matrix` from `transform`
    pub fn update_matrix(&mut self) {
        self.matrix = self.transform.to_matrix();
    }

    /// Recompute `transform` from a directly assigned `matrix`
    pub fn update_transform(&mut self) {
        self.transform = Transform::from_matrix(&self.matrix);
    }

    /// Run this node's per-frame behaviour and refresh its matrix.
    /// Kinds without behaviour are left untouched.
    pub fn update(&mut self, dt: f32, ctx: &UpdateContext) {
        let behavior: &mut dyn Behavior = match &mut self.kind {
            NodeKind::Vehicle(vehicle) => vehicle,
            NodeKind::Prop(prop) => prop,
            NodeKind::Marker(marker) => marker,
            NodeKind::Plain | NodeKind::Target | NodeKind::Light(_) | NodeKind::Camera => return,
        };
        behavior.update(&mut self.transform, dt, ctx);
        self.update_matrix();
    }

    pub fn vehicle(&self) -> Option<&Vehicle> {
        match &self.kind {
            NodeKind::Vehicle(vehicle) => Some(vehicle),
            _ => None,
        }
    }

    pub fn vehicle_mut(&mut self) -> Option<&mut Vehicle> {
        match &mut self.kind {
            NodeKind::Vehicle(vehicle) => Some(vehicle),
            _ => None,
        }
    }

    /// Whether this node takes part in collision tests
    pub fn is_physical(&self) -> bool {
        self.aabb.is_some()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn translation(&self) -> Vec3 {
        self.transform.translation
    }

    /// Copy visual data (mesh, bounds, name, kind, transform) without graph links
    pub fn detached_clone(&self) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    fn matrices_close(a: &Mat4, b: &Mat4, eps: f32) -> bool {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .all(|(x, y)| (x - y).abs() < eps)
    }

    #[test]
    fn test_update_matrix_identity() {
        let mut node = Node::default();
        node.update_matrix();
        assert_eq!(node.matrix, Mat4::IDENTITY);
    }

    #[test]
    fn test_update_matrix_is_bit_identical_when_unchanged() {
        let mut node = Node::default().with_transform(Transform {
            translation: Vec3::new(1.5, -2.0, 3.25),
            rotation: Vec3::new(0.3, 1.2, -0.4),
            scale: Vec3::new(1.0, 2.0, 0.5),
        });
        let first = node.matrix;
        node.update_matrix();
        assert_eq!(first.to_cols_array(), node.matrix.to_cols_array());
    }

    #[test]
    fn test_rotation_composes_z_then_y_then_x() {
        let rotation = Vec3::new(0.2, 0.5, -0.7);
        let expected = Quat::from_rotation_z(rotation.z)
            * Quat::from_rotation_y(rotation.y)
            * Quat::from_rotation_x(rotation.x);
        assert!(euler_to_quat(rotation).abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_update_transform_from_assigned_matrix() {
        let mut node = Node::default();
        node.matrix = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0))
            * Mat4::from_rotation_y(FRAC_PI_2);
        node.update_transform();

        assert!((node.transform.translation - Vec3::new(4.0, 5.0, 6.0)).length() < 1e-6);
        assert!((node.transform.rotation.y - FRAC_PI_2).abs() < 1e-3);
        assert!((node.transform.scale - Vec3::ONE).length() < 1e-5);
    }

    #[test]
    fn test_detached_clone_drops_links() {
        let mut node = Node::new(NodeKind::Target).with_name("target.1");
        node.parent = Some(NodeId(3));
        node.children.push(NodeId(4));

        let copy = node.detached_clone();
        assert_eq!(copy.parent(), None);
        assert!(copy.children().is_empty());
        assert_eq!(copy.name.as_deref(), Some("target.1"));
        assert!(copy.kind.is_target());
    }

    proptest! {
        #[test]
        fn decomposition_reproduces_transform(
            tx in -100.0f32..100.0, ty in -100.0f32..100.0, tz in -100.0f32..100.0,
            rx in -3.0f32..3.0, ry in -1.5f32..1.5, rz in -3.0f32..3.0,
            sx in 0.1f32..5.0, sy in 0.1f32..5.0, sz in 0.1f32..5.0,
        ) {
            let transform = Transform {
                translation: Vec3::new(tx, ty, tz),
                rotation: Vec3::new(rx, ry, rz),
                scale: Vec3::new(sx, sy, sz),
            };
            let matrix = transform.to_matrix();
            let back = Transform::from_matrix(&matrix);

            prop_assert!((back.translation - transform.translation).abs().max_element() <= 1e-6);
            let scale_error = (back.scale - transform.scale).abs() / transform.scale;
            prop_assert!(scale_error.max_element() < 1e-5);
            // Rotation is equal modulo the Euler convention: same matrix
            prop_assert!(matrices_close(&back.to_matrix(), &matrix, 1e-3));
        }
    }
}
