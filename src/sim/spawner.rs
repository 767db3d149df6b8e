//! Dropped-box pool and target selection
//!
//! The spawner keeps its own bookkeeping of the boxes it created and of the
//! registered targets; the scene owns the nodes. A box stops counting
//! against the cap as soon as it is no longer attached to the scene.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::UpdateContext;
use super::node::{Node, NodeId, NodeKind};
use super::props::FallingProp;
use super::scene::Scene;
use crate::config::SpawnerConfig;

/// Tick counter that blocks repeated player drops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    pub active: bool,
    pub counter: u32,
    pub ticks_to_next: u32,
}

impl Cooldown {
    pub fn new(ticks_to_next: u32) -> Self {
        Self {
            active: false,
            counter: 0,
            ticks_to_next,
        }
    }

    /// Start counting; returns false if already running
    pub fn start(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.counter = 0;
        true
    }

    /// Advance by one tick, clearing the latch once `ticks_to_next` is reached
    pub fn tick(&mut self) {
        if self.active {
            self.counter += 1;
        }
        if self.counter >= self.ticks_to_next {
            self.counter = 0;
            self.active = false;
        }
    }
}

/// Spawner of dropped boxes
#[derive(Debug, Clone)]
pub struct Spawner {
    config: SpawnerConfig,
    /// Box to clone new drops from (detached, never in the scene)
    template: Option<Node>,
    props: Vec<NodeId>,
    targets: Vec<NodeId>,
    current_target: Option<NodeId>,
    /// Pick a new target on the next update
    retarget: bool,
    /// The marker should be (re)attached above the new target
    marker_pending: bool,
    drop_requested: bool,
    pub cooldown: Cooldown,
    rng: Pcg32,
}

impl Spawner {
    pub fn new(config: SpawnerConfig, seed: u64) -> Self {
        Self {
            config,
            template: None,
            props: Vec::new(),
            targets: Vec::new(),
            current_target: None,
            retarget: true,
            marker_pending: false,
            drop_requested: false,
            cooldown: Cooldown::new(config.cooldown_ticks),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Use `node`'s mesh, bounds and scale for future drops
    pub fn set_template(&mut self, node: &Node) {
        let mut template = node.detached_clone();
        template.kind = NodeKind::Prop(FallingProp::from_config(&self.config));
        self.template = Some(template);
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    pub fn add_target(&mut self, id: NodeId) {
        if !self.targets.contains(&id) {
            self.targets.push(id);
        }
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    /// Tracked boxes, oldest first
    pub fn props(&self) -> &[NodeId] {
        &self.props
    }

    pub fn max_props(&self) -> usize {
        self.config.max_props
    }

    /// Forget the current target; a new one is chosen on the next update
    pub fn request_retarget(&mut self) {
        self.retarget = true;
    }

    /// Consume the "attach the marker" request raised by a new target
    pub fn take_marker_request(&mut self) -> bool {
        std::mem::take(&mut self.marker_pending)
    }

    /// Player asked for a drop. Accepted only while the cooldown is idle.
    pub fn request_drop(&mut self) -> bool {
        if self.cooldown.start() {
            self.drop_requested = true;
            true
        } else {
            false
        }
    }

    /// Consume a pending player drop
    pub fn take_drop_request(&mut self) -> bool {
        std::mem::take(&mut self.drop_requested)
    }

    /// Boxes still attached to the scene
    pub fn live_count(&self, scene: &Scene) -> usize {
        self.props.iter().filter(|&&id| scene.is_attached(id)).count()
    }

    /// Per-frame bookkeeping: drop stale ids, choose a target if needed,
    /// advance every live box and the cooldown
    pub fn update(&mut self, scene: &mut Scene, dt: f32, ctx: &UpdateContext) {
        self.props.retain(|&id| scene.is_attached(id));
        self.targets.retain(|&id| scene.contains(id));
        if self.current_target.is_some_and(|id| !scene.contains(id)) {
            self.current_target = None;
            self.retarget = true;
        }

        if self.retarget {
            self.pick_target();
        }

        for &id in &self.props {
            if let Some(node) = scene.get_mut(id) {
                node.update(dt, ctx);
            }
        }

        self.cooldown.tick();
    }

    /// Uniform pick among registered targets; no-op (retried next frame)
    /// when there are none
    fn pick_target(&mut self) {
        if self.targets.is_empty() {
            return;
        }
        let index = self.rng.random_range(0..self.targets.len());
        self.current_target = Some(self.targets[index]);
        self.retarget = false;
        self.marker_pending = true;
        log::info!("New target: {:?}", self.current_target);
    }

    /// Drop a box below `origin` if under the cap. Returns the new node.
    pub fn spawn(&mut self, scene: &mut Scene, origin: NodeId) -> Option<NodeId> {
        self.props.retain(|&id| scene.is_attached(id));
        if self.props.len() >= self.config.max_props {
            log::debug!("Drop refused: {} boxes live (max {})", self.props.len(), self.config.max_props);
            return None;
        }
        let Some(template) = self.template.as_ref() else {
            log::warn!("Drop refused: no box template");
            return None;
        };
        let origin_node = scene.get(origin)?;
        let rotation = origin_node.transform.rotation;
        let (_, _, position) = scene.global_transform(origin).to_scale_rotation_translation();

        let mut node = template.clone();
        node.transform.translation = position + self.config.drop_offset;
        node.transform.rotation = rotation;
        node.update_matrix();

        let id = scene.spawn(node);
        self.props.push(id);
        log::debug!("Dropped box {:?} at {}", id, position + self.config.drop_offset);
        Some(id)
    }

    /// Where the current target sits in world space
    pub fn target_position(&self, scene: &Scene) -> Option<Vec3> {
        let id = self.current_target?;
        if !scene.contains(id) {
            return None;
        }
        let (_, _, position) = scene.global_transform(id).to_scale_rotation_translation();
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::Bounds;
    use crate::sim::input::InputState;
    use crate::sim::node::Transform;

    fn config(max_props: usize) -> SpawnerConfig {
        SpawnerConfig {
            max_props,
            cooldown_ticks: 3,
            ..Default::default()
        }
    }

    fn box_template() -> Node {
        Node::new(NodeKind::Plain)
            .with_name("box")
            .with_transform(Transform {
                scale: Vec3::splat(0.5),
                ..Default::default()
            })
            .with_aabb(Bounds::new(Vec3::splat(-1.0), Vec3::splat(1.0)))
    }

    fn scene_with_origin() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let origin = scene.spawn(
            Node::default().with_transform(Transform::from_translation(Vec3::new(2.0, 8.0, -1.0))),
        );
        (scene, origin)
    }

    #[test]
    fn test_cap_of_one_spawns_once() {
        let (mut scene, origin) = scene_with_origin();
        let mut spawner = Spawner::new(config(1), 1);
        spawner.set_template(&box_template());

        assert!(spawner.spawn(&mut scene, origin).is_some());
        assert!(spawner.spawn(&mut scene, origin).is_none());

        let boxes = scene.find_all(|n| n.kind.is_prop());
        assert_eq!(boxes.len(), 1);
        assert_eq!(spawner.live_count(&scene), 1);
    }

    #[test]
    fn test_spawned_box_copies_template_and_origin() {
        let (mut scene, origin) = scene_with_origin();
        let mut spawner = Spawner::new(config(4), 1);
        spawner.set_template(&box_template());

        let id = spawner.spawn(&mut scene, origin).unwrap();
        let node = scene.get(id).unwrap();
        assert_eq!(node.translation(), Vec3::new(2.0, 5.0, -1.0));
        assert_eq!(node.transform.scale, Vec3::splat(0.5));
        assert!(node.aabb.is_some());
        assert!(node.kind.is_prop());
    }

    #[test]
    fn test_removed_box_frees_a_slot() {
        let (mut scene, origin) = scene_with_origin();
        let mut spawner = Spawner::new(config(1), 1);
        spawner.set_template(&box_template());

        let first = spawner.spawn(&mut scene, origin).unwrap();
        scene.despawn(first);
        assert!(spawner.spawn(&mut scene, origin).is_some());
    }

    #[test]
    fn test_spawn_without_template_is_noop() {
        let (mut scene, origin) = scene_with_origin();
        let mut spawner = Spawner::new(config(4), 1);
        assert!(spawner.spawn(&mut scene, origin).is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_empty_target_list_is_noop() {
        let mut scene = Scene::new();
        let mut spawner = Spawner::new(config(4), 1);
        let input = InputState::default();
        spawner.update(&mut scene, 0.1, &UpdateContext::new(&input));
        assert_eq!(spawner.current_target(), None);
        assert!(!spawner.take_marker_request());
    }

    #[test]
    fn test_target_selection_is_uniform_and_seeded() {
        let mut scene = Scene::new();
        let targets: Vec<_> = (0..4).map(|_| scene.spawn(Node::new(NodeKind::Target))).collect();
        let input = InputState::default();
        let ctx = UpdateContext::new(&input);

        let mut counts = [0usize; 4];
        let mut a = Spawner::new(config(4), 99);
        let mut b = Spawner::new(config(4), 99);
        for &t in &targets {
            a.add_target(t);
            b.add_target(t);
        }
        for _ in 0..400 {
            a.request_retarget();
            b.request_retarget();
            a.update(&mut scene, 0.01, &ctx);
            b.update(&mut scene, 0.01, &ctx);
            assert!(a.take_marker_request());
            assert_eq!(a.current_target(), b.current_target());
            let picked = a.current_target().unwrap();
            counts[targets.iter().position(|&t| t == picked).unwrap()] += 1;
        }
        assert!(counts.iter().all(|&c| c > 50));
    }

    #[test]
    fn test_despawned_target_forces_retarget() {
        let mut scene = Scene::new();
        let t1 = scene.spawn(Node::new(NodeKind::Target));
        let input = InputState::default();
        let ctx = UpdateContext::new(&input);
        let mut spawner = Spawner::new(config(4), 5);
        spawner.add_target(t1);
        spawner.update(&mut scene, 0.01, &ctx);
        assert_eq!(spawner.current_target(), Some(t1));

        scene.despawn(t1);
        let t2 = scene.spawn(Node::new(NodeKind::Target));
        spawner.add_target(t2);
        spawner.update(&mut scene, 0.01, &ctx);
        assert_eq!(spawner.current_target(), Some(t2));
        assert_eq!(spawner.targets(), &[t2]);
    }

    #[test]
    fn test_update_advances_falling_boxes() {
        let (mut scene, origin) = scene_with_origin();
        let mut spawner = Spawner::new(config(4), 1);
        spawner.set_template(&box_template());
        let id = spawner.spawn(&mut scene, origin).unwrap();
        let input = InputState::default();

        spawner.update(&mut scene, 0.1, &UpdateContext::new(&input));
        let y = scene.get(id).unwrap().translation().y;
        assert!((y - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_cooldown_blocks_repeat_drops() {
        let mut scene = Scene::new();
        let mut spawner = Spawner::new(config(4), 1);
        let input = InputState::default();
        let ctx = UpdateContext::new(&input);

        assert!(spawner.request_drop());
        assert!(spawner.take_drop_request());
        assert!(!spawner.take_drop_request());
        assert!(!spawner.request_drop());

        for _ in 0..3 {
            spawner.update(&mut scene, 0.01, &ctx);
        }
        assert!(!spawner.cooldown.active);
        assert!(spawner.request_drop());
    }
}
