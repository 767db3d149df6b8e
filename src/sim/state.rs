//! Game world: the scene plus the gameplay roles found in it
//!
//! Built once from a loaded scene. The player vehicle, the box template and
//! the target marker must exist; a scene without them fails here instead of
//! misbehaving mid-game.

use super::node::{Node, NodeId, NodeKind};
use super::physics::Physics;
use super::props::TargetMarker;
use super::scene::Scene;
use super::spawner::Spawner;
use super::vehicle::Vehicle;
use crate::config::GameConfig;

/// World assembly errors
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Scene has no {0} node")]
    MissingNode(&'static str),
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct World {
    pub scene: Scene,
    /// The player's drone or plane
    pub player: NodeId,
    /// Floating arrow; kept in the arena while detached
    pub marker: NodeId,
    pub spawner: Spawner,
    pub physics: Physics,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Pointer-lock state: ticks are skipped while false
    active: bool,
    config: GameConfig,
}

impl World {
    /// Pick the gameplay nodes out of `scene` and apply `config` to them
    pub fn new(mut scene: Scene, config: GameConfig) -> Result<Self, SimError> {
        let player = scene
            .find(|n| n.kind.is_vehicle())
            .ok_or(SimError::MissingNode("vehicle"))?;
        let template = scene
            .find(|n| n.kind.is_prop())
            .ok_or(SimError::MissingNode("box"))?;
        let marker = scene
            .find(|n| n.kind.is_marker())
            .ok_or(SimError::MissingNode("arrow"))?;

        if let Some(vehicle) = scene.get_mut(player).and_then(Node::vehicle_mut) {
            *vehicle = Vehicle::new(vehicle.model, config.vehicle(vehicle.model));
        }
        if let Some(node) = scene.get_mut(marker) {
            node.kind = NodeKind::Marker(TargetMarker::from_config(&config.marker));
        }

        let mut spawner = Spawner::new(config.spawner, config.seed);
        if let Some(node) = scene.get(template) {
            spawner.set_template(node);
        }
        scene.despawn(template);
        // Shown once a target has been chosen
        scene.detach(marker);

        for target in scene.find_all(|n| n.kind.is_target()) {
            spawner.add_target(target);
        }
        if spawner.targets().is_empty() {
            log::warn!("Scene has no targets; boxes can never score");
        }

        log::info!(
            "World ready: {} nodes, player {:?} ({}), {} targets",
            scene.len(),
            player,
            scene.get(player).map(|n| n.kind.name()).unwrap_or("?"),
            spawner.targets().len()
        );

        Ok(Self {
            scene,
            player,
            marker,
            spawner,
            physics: Physics::new(),
            score: 0,
            time_ticks: 0,
            active: true,
            config,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pause/resume (pointer lock gained or lost)
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            log::info!("Simulation {}", if active { "resumed" } else { "paused" });
        }
        self.active = active;
    }

    /// Player click: latch a drop unless paused or cooling down
    pub fn click(&mut self) -> bool {
        self.active && self.spawner.request_drop()
    }

    pub fn player_vehicle(&self) -> Option<&Vehicle> {
        self.scene.get(self.player).and_then(Node::vehicle)
    }

    /// Flat column-major world matrices of every attached node, for the renderer
    pub fn world_matrices(&self) -> Vec<f32> {
        let matrices: Vec<glam::Mat4> = self
            .scene
            .world_matrices()
            .into_iter()
            .map(|(_, m)| m)
            .collect();
        bytemuck::cast_slice(&matrices).to_vec()
    }

    /// Mesh index of every attached node (`-1` without a mesh), in the same
    /// order as `world_matrices`
    pub fn mesh_ids(&self) -> Vec<i32> {
        self.scene
            .ids()
            .into_iter()
            .map(|id| {
                self.scene
                    .get(id)
                    .and_then(|n| n.mesh)
                    .map_or(-1, |mesh| mesh.0 as i32)
            })
            .collect()
    }

    /// Position of the player's matrix in `world_matrices`, for the camera
    pub fn player_index(&self) -> Option<usize> {
        self.scene.ids().iter().position(|&id| id == self.player)
    }
}
