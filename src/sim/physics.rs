//! Per-frame collision pass
//!
//! Every vehicle and every dropped prop is tested against every other node
//! that has bounds. Vehicle-vs-solid pairs are resolved by pushing the
//! vehicle out along the single axis of least penetration. Detection-only
//! pairs (vehicle-vs-marker, prop-vs-anything) just raise
//! frame flags and queue the prop for removal; the frame loop acts on them
//! afterwards.

use super::node::{NodeId, NodeKind};
use super::scene::Scene;

/// What a colliding pair means for the mover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairMode {
    /// Solid obstacle: separate the pair
    Physical,
    /// Report only, never move anything
    Check,
}

/// Collision pass with its per-frame outputs
#[derive(Debug, Clone, Default)]
pub struct Physics {
    /// A vehicle touched the target marker this frame
    pub special_collision: bool,
    /// A prop landed on a target this frame
    pub scored: bool,
    /// Props to take out of the scene after this pass (no duplicates)
    pub removals: Vec<NodeId>,
}

impl Physics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the frame outputs
    pub fn reset(&mut self) {
        self.special_collision = false;
        self.scored = false;
        self.removals.clear();
    }

    /// Run one pass over the attached scene. Outputs are reset first.
    pub fn update(&mut self, scene: &mut Scene) {
        self.reset();

        let ids = scene.ids();
        for &id in &ids {
            let Some(node) = scene.get(id) else {
                continue;
            };
            if !node.is_physical() {
                continue;
            }
            let mover_is_vehicle = match node.kind {
                NodeKind::Vehicle(_) => true,
                NodeKind::Prop(_) => false,
                _ => continue,
            };

            for &other in &ids {
                if other == id {
                    continue;
                }
                let Some(other_node) = scene.get(other) else {
                    continue;
                };
                if !other_node.is_physical() {
                    continue;
                }
                let mode = if mover_is_vehicle && !other_node.kind.is_marker() {
                    PairMode::Physical
                } else {
                    PairMode::Check
                };
                self.resolve(scene, id, other, mode);
            }
        }

        if self.special_collision || self.scored || !self.removals.is_empty() {
            log::debug!(
                "Physics: special={} scored={} removals={:?}",
                self.special_collision,
                self.scored,
                self.removals
            );
        }
    }

    fn resolve(&mut self, scene: &mut Scene, mover: NodeId, other: NodeId, mode: PairMode) {
        // World bounds are recomputed for every pair so earlier corrections are seen
        let (Some(a), Some(b)) = (scene.world_bounds(mover), scene.world_bounds(other)) else {
            return;
        };
        if !a.intersects(&b) {
            return;
        }

        match mode {
            PairMode::Check => {
                let mover_kind = scene.get(mover).map(|n| &n.kind);
                let other_kind = scene.get(other).map(|n| &n.kind);

                if matches!(mover_kind, Some(NodeKind::Vehicle(_)))
                    && matches!(other_kind, Some(NodeKind::Marker(_)))
                {
                    self.special_collision = true;
                    return;
                }
                if matches!(other_kind, Some(NodeKind::Target)) {
                    self.scored = true;
                }
                self.queue_removal(mover);
            }
            PairMode::Physical => {
                let Some(push) = a.push_out(&b) else {
                    return;
                };
                // The push is in world space; express it in the parent's frame
                let parent = scene.get(mover).and_then(|n| n.parent());
                let local_push = match parent {
                    Some(parent) => scene
                        .global_transform(parent)
                        .inverse()
                        .transform_vector3(push),
                    None => push,
                };
                if let Some(node) = scene.get_mut(mover) {
                    node.transform.translation += local_push;
                    node.update_matrix();
                }
            }
        }
    }

    fn queue_removal(&mut self, id: NodeId) {
        if !self.removals.contains(&id) {
            self.removals.push(id);
        }
    }

    /// Hand the removal queue to the frame loop
    pub fn take_removals(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.removals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::Bounds;
    use crate::sim::node::{Node, Transform};
    use crate::sim::props::{FallingProp, TargetMarker};
    use crate::sim::vehicle::Vehicle;
    use glam::Vec3;

    fn unit() -> Bounds {
        Bounds::new(Vec3::ZERO, Vec3::ONE)
    }

    fn placed(kind: NodeKind, x: f32, y: f32, z: f32) -> Node {
        Node::new(kind)
            .with_transform(Transform::from_translation(Vec3::new(x, y, z)))
            .with_aabb(unit())
    }

    #[test]
    fn test_vehicle_is_pushed_out_of_wall() {
        let mut scene = Scene::new();
        let drone = scene.spawn(placed(NodeKind::Vehicle(Vehicle::drone()), 0.0, 0.0, 0.0));
        let wall = scene.spawn(placed(NodeKind::Plain, 0.5, 0.0, 0.0));

        let mut physics = Physics::new();
        physics.update(&mut scene);

        let t = scene.get(drone).unwrap().translation();
        assert!((t - Vec3::new(-0.5, 0.0, 0.0)).length() < 1e-6);
        // Only boundary contact remains
        let a = scene.world_bounds(drone).unwrap();
        let b = scene.world_bounds(wall).unwrap();
        assert!(a.overlap(&b).min_element() <= 1e-6);
        // Matrix follows the correction
        assert_eq!(scene.get(drone).unwrap().matrix, Transform::from_translation(t).to_matrix());
        assert!(!physics.special_collision);
        assert!(physics.removals.is_empty());
    }

    #[test]
    fn test_walls_do_not_move() {
        let mut scene = Scene::new();
        scene.spawn(placed(NodeKind::Vehicle(Vehicle::drone()), 0.0, 0.0, 0.0));
        let wall = scene.spawn(placed(NodeKind::Plain, 0.5, 0.0, 0.0));
        Physics::new().update(&mut scene);
        assert_eq!(scene.get(wall).unwrap().translation(), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_vehicle_touching_marker_raises_flag_without_push() {
        let mut scene = Scene::new();
        let drone = scene.spawn(placed(NodeKind::Vehicle(Vehicle::drone()), 0.0, 0.0, 0.0));
        scene.spawn(placed(NodeKind::Marker(TargetMarker::default()), 0.5, 0.5, 0.5));

        let mut physics = Physics::new();
        physics.update(&mut scene);

        assert!(physics.special_collision);
        assert!(physics.removals.is_empty());
        assert_eq!(scene.get(drone).unwrap().translation(), Vec3::ZERO);
    }

    #[test]
    fn test_prop_on_target_scores_and_is_removed() {
        let mut scene = Scene::new();
        let prop = scene.spawn(placed(NodeKind::Prop(FallingProp::default()), 0.0, 0.9, 0.0));
        scene.spawn(placed(NodeKind::Target, 0.0, 0.0, 0.0));

        let mut physics = Physics::new();
        physics.update(&mut scene);

        assert!(physics.scored);
        assert_eq!(physics.removals, vec![prop]);
        // Detection-only: no correction
        assert_eq!(scene.get(prop).unwrap().translation(), Vec3::new(0.0, 0.9, 0.0));
    }

    #[test]
    fn test_prop_hitting_ground_is_removed_once_without_score() {
        let mut scene = Scene::new();
        let prop = scene.spawn(placed(NodeKind::Prop(FallingProp::default()), 0.0, 0.5, 0.0));
        scene.spawn(placed(NodeKind::Plain, 0.0, 0.0, 0.0));
        scene.spawn(placed(NodeKind::Plain, 0.2, 0.0, 0.0));

        let mut physics = Physics::new();
        physics.update(&mut scene);

        assert!(!physics.scored);
        assert_eq!(physics.removals, vec![prop]);
    }

    #[test]
    fn test_prop_hitting_marker_is_removed() {
        let mut scene = Scene::new();
        let prop = scene.spawn(placed(NodeKind::Prop(FallingProp::default()), 0.0, 0.5, 0.0));
        scene.spawn(placed(NodeKind::Marker(TargetMarker::default()), 0.0, 0.0, 0.0));

        let mut physics = Physics::new();
        physics.update(&mut scene);
        assert_eq!(physics.removals, vec![prop]);
        assert!(!physics.special_collision);
        assert!(!physics.scored);
    }

    #[test]
    fn test_nodes_without_bounds_are_skipped() {
        let mut scene = Scene::new();
        let drone = scene.spawn(placed(NodeKind::Vehicle(Vehicle::drone()), 0.0, 0.0, 0.0));
        scene.spawn(
            Node::new(NodeKind::Camera).with_transform(Transform::from_translation(Vec3::splat(0.5))),
        );

        Physics::new().update(&mut scene);
        assert_eq!(scene.get(drone).unwrap().translation(), Vec3::ZERO);
    }

    #[test]
    fn test_flags_reset_each_frame() {
        let mut scene = Scene::new();
        let prop = scene.spawn(placed(NodeKind::Prop(FallingProp::default()), 0.0, 0.5, 0.0));
        scene.spawn(placed(NodeKind::Target, 0.0, 0.0, 0.0));

        let mut physics = Physics::new();
        physics.update(&mut scene);
        assert!(physics.scored);

        scene.despawn(prop);
        physics.update(&mut scene);
        assert!(!physics.scored);
        assert!(physics.take_removals().is_empty());
    }

    #[test]
    fn test_child_vehicle_push_respects_parent_scale() {
        let mut scene = Scene::new();
        let rig = scene.spawn(Node::default().with_transform(Transform {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::splat(2.0),
        }));
        let drone = scene.insert(placed(NodeKind::Vehicle(Vehicle::drone()), 0.0, 0.0, 0.0));
        scene.add_child(rig, drone);
        // Drone occupies [0, 2] in world space; wall starts at 1.5
        scene.spawn(placed(NodeKind::Plain, 1.5, 0.0, 0.0));

        Physics::new().update(&mut scene);

        let world = scene.world_bounds(drone).unwrap();
        assert!((world.max.x - 1.5).abs() < 1e-5);
    }
}
