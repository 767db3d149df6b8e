//! Per-frame simulation step
//!
//! One call per rendered frame, in strict order:
//! 1. vehicle kinematics
//! 2. spawner bookkeeping (target choice, marker, falling boxes, player drops)
//! 3. physics pass
//! 4. reactions to the pass (drop-and-retarget, score)
//! 5. removal of flagged nodes
//!
//! The camera update and rendering happen in the host around this call.

use super::UpdateContext;
use super::input::InputState;
use super::state::World;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held keys at the start of the tick
    pub keys: InputState,
    /// Player asked to drop a box (click)
    pub drop: bool,
}

/// Advance the world by one frame of `dt` seconds
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    // Don't tick while paused
    if !world.is_active() {
        return;
    }
    world.time_ticks += 1;

    let ctx = UpdateContext::new(&input.keys);

    // 1: kinematics
    if let Some(node) = world.scene.get_mut(world.player) {
        node.update(dt, &ctx);
    }

    // 2: spawner
    if input.drop {
        world.click();
    }
    world.spawner.update(&mut world.scene, dt, &ctx);

    if world.spawner.take_marker_request() && !world.scene.is_attached(world.marker) {
        world.scene.add_node(world.marker);
    }
    if let Some(anchor) = world.spawner.target_position(&world.scene) {
        let marker_ctx = ctx.with_anchor(anchor);
        if let Some(node) = world.scene.get_mut(world.marker) {
            node.update(dt, &marker_ctx);
        }
    }

    if world.spawner.take_drop_request() {
        world.spawner.spawn(&mut world.scene, world.player);
    }

    // 3: physics sees the post-kinematics pose
    world.physics.update(&mut world.scene);

    // 4: reactions
    if world.physics.special_collision {
        world.spawner.spawn(&mut world.scene, world.player);
        world.spawner.request_retarget();
    }
    if world.physics.scored {
        let points = world.config().points_per_score;
        world.score += points;
        log::info!("Target hit! Score: {}", world.score);
    }

    // 5: removals, strictly after the pass that flagged them
    for id in world.physics.take_removals() {
        log::debug!("Removing {:?}", id);
        world.scene.despawn(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::collision::Bounds;
    use crate::sim::input::Key;
    use crate::sim::node::{Node, NodeKind, Transform};
    use crate::sim::props::{FallingProp, TargetMarker};
    use crate::sim::vehicle::Vehicle;
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    fn cube() -> Bounds {
        Bounds::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    fn at(kind: NodeKind, position: Vec3) -> Node {
        Node::new(kind)
            .with_transform(Transform::from_translation(position))
            .with_aabb(cube())
    }

    /// Drone high above the only target, a 4x4 pad centered on the origin
    fn world() -> World {
        let mut scene = crate::sim::scene::Scene::new();
        scene.spawn(at(NodeKind::Vehicle(Vehicle::drone()), Vec3::new(0.0, 20.0, 0.0)));
        scene.spawn(at(NodeKind::Prop(FallingProp::default()), Vec3::new(50.0, 0.0, 0.0)));
        scene.spawn(at(NodeKind::Marker(TargetMarker::default()), Vec3::ZERO));
        scene.spawn(
            Node::new(NodeKind::Target)
                .with_transform(Transform::default())
                .with_aabb(Bounds::new(Vec3::new(-2.0, -0.5, -2.0), Vec3::new(2.0, 0.5, 2.0))),
        );
        World::new(scene, GameConfig::default()).unwrap()
    }

    #[test]
    fn test_paused_world_does_not_move() {
        let mut world = world();
        world.set_active(false);
        let input = TickInput {
            keys: InputState::with(&[Key::Forward]),
            drop: true,
        };
        tick(&mut world, &input, DT);
        assert_eq!(world.time_ticks, 0);
        assert_eq!(world.scene.get(world.player).unwrap().translation(), Vec3::new(0.0, 20.0, 0.0));
        assert!(world.spawner.props().is_empty());
    }

    #[test]
    fn test_first_tick_places_marker_over_target() {
        let mut world = world();
        tick(&mut world, &TickInput::default(), DT);
        assert!(world.scene.is_attached(world.marker));
        let marker = world.scene.get(world.marker).unwrap().translation();
        assert!(marker.y > 13.0 && marker.y < 17.5);
        assert_eq!(marker.x, 0.0);
    }

    #[test]
    fn test_player_drop_lands_on_target_and_scores() {
        let mut world = world();
        // Over the pad but outside the marker column, so the box misses the arrow
        if let Some(node) = world.scene.get_mut(world.player) {
            node.transform.translation = Vec3::new(1.5, 40.0, 0.0);
            node.update_matrix();
        }
        let drop = TickInput {
            drop: true,
            ..Default::default()
        };
        tick(&mut world, &drop, DT);
        assert_eq!(world.spawner.props().len(), 1);
        let dropped = world.spawner.props()[0];

        let idle = TickInput::default();
        for _ in 0..600 {
            tick(&mut world, &idle, DT);
            if world.score > 0 {
                break;
            }
        }
        assert_eq!(world.score, 100);
        assert!(!world.scene.contains(dropped));
    }

    #[test]
    fn test_box_falling_through_marker_is_removed_without_score() {
        let mut world = world();
        // Straight above the target: the marker sits in the box's path
        let drop = TickInput {
            drop: true,
            ..Default::default()
        };
        tick(&mut world, &drop, DT);
        let dropped = world.spawner.props()[0];

        let idle = TickInput::default();
        for _ in 0..600 {
            tick(&mut world, &idle, DT);
            if !world.scene.contains(dropped) {
                break;
            }
        }
        assert!(!world.scene.contains(dropped));
        assert_eq!(world.score, 0);
        assert!(world.scene.is_attached(world.marker));
    }

    #[test]
    fn test_flying_into_marker_drops_box_and_retargets() {
        let mut world = world();
        // Put the drone right where the marker will appear
        tick(&mut world, &TickInput::default(), DT);
        let marker = world.scene.get(world.marker).unwrap().translation();
        if let Some(node) = world.scene.get_mut(world.player) {
            node.transform.translation = marker;
            node.update_matrix();
        }

        tick(&mut world, &TickInput::default(), DT);
        assert!(world.physics.special_collision);
        assert_eq!(world.spawner.props().len(), 1);
        assert_eq!(world.score, 0);
        // Detection only: the drone was not pushed off the marker
        assert_eq!(world.scene.get(world.player).unwrap().translation(), marker);
    }

    #[test]
    fn test_drone_cannot_pass_through_target() {
        let mut world = world();
        if let Some(node) = world.scene.get_mut(world.player) {
            node.transform.translation = Vec3::new(0.0, 3.0, 0.0);
            node.update_matrix();
        }
        let input = TickInput {
            keys: InputState::with(&[Key::Descend]),
            ..Default::default()
        };
        for _ in 0..300 {
            tick(&mut world, &input, DT);
        }
        let y = world.scene.get(world.player).unwrap().translation().y;
        // Rests on top of the target cube (top face at 0.5)
        assert!(y >= 1.0 - 1e-3);
    }
}
