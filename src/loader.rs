//! Scene description loading
//!
//! The description is glTF-shaped JSON: a list of `scenes` naming root node
//! indices, a flat list of `nodes` (each with an optional TRS or matrix, a
//! mesh index and child indices) and a list of `meshes` carrying their
//! position bounds. Node names pick the gameplay kind:
//!
//! | base name | kind |
//! |---|---|
//! | `drone` / `plane` | player vehicle |
//! | `box` | dropped-box template |
//! | `arrow` | target marker |
//! | `target*` | scoring target |
//! | `light*` | light |
//!
//! The base name is the part before the first `.` (`target.003` → `target`).
//! Nodes carrying a `camera` become camera nodes; anything else is plain
//! geometry.

use std::collections::{HashMap, HashSet};
use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, VehicleModel};
use crate::sim::{
    Bounds, FallingProp, LightParams, MeshId, MeshInfo, Node, NodeId, NodeKind, Scene,
    TargetMarker, Transform, Vehicle,
};

/// Scene description loading errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to parse scene description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Scene index {0} out of range")]
    MissingScene(usize),

    #[error("Node index {0} out of range")]
    MissingNode(usize),

    #[error("Mesh index {mesh} out of range (node {node})")]
    MissingMesh { mesh: usize, node: usize },

    #[error("Node {0} is referenced more than once")]
    SharedNode(usize),
}

/// One scene: its root nodes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneRecord {
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

/// One node record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeRecord {
    pub name: Option<String>,
    pub translation: Option<[f32; 3]>,
    /// Quaternion `[x, y, z, w]`
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    /// Column-major; takes precedence over TRS
    pub matrix: Option<[f32; 16]>,
    pub mesh: Option<usize>,
    pub camera: Option<usize>,
    pub children: Vec<usize>,
}

/// Mesh metadata: only the position bounds matter to the simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshRecord {
    pub name: Option<String>,
    pub min: Option<[f32; 3]>,
    pub max: Option<[f32; 3]>,
}

impl MeshRecord {
    pub fn bounds(&self) -> Option<Bounds> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some(Bounds::new(Vec3::from(min), Vec3::from(max))),
            _ => None,
        }
    }
}

/// A parsed scene description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Default scene index
    pub scene: Option<usize>,
    pub scenes: Vec<SceneRecord>,
    pub nodes: Vec<NodeRecord>,
    pub meshes: Vec<MeshRecord>,
}

/// Record-index → instantiated node map for one load operation.
///
/// Guarantees each node record is instantiated at most once; a record
/// reached a second time (shared child or cycle) is an error.
#[derive(Debug, Default)]
pub struct LoadCache {
    nodes: HashMap<usize, NodeId>,
    in_progress: HashSet<usize>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl SceneDescription {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn default_scene(&self) -> usize {
        self.scene.unwrap_or(0)
    }

    /// Build the default scene
    pub fn load_default(&self, config: &GameConfig) -> Result<Scene, LoadError> {
        self.load_scene(self.default_scene(), config)
    }

    /// Build scene `index` into a fresh `Scene`
    pub fn load_scene(&self, index: usize, config: &GameConfig) -> Result<Scene, LoadError> {
        let record = self.scenes.get(index).ok_or(LoadError::MissingScene(index))?;

        let mut scene = Scene::new();
        scene.meshes = self
            .meshes
            .iter()
            .map(|m| MeshInfo {
                name: m.name.clone(),
                bounds: m.bounds(),
            })
            .collect();

        let mut cache = LoadCache::new();
        for &node_index in &record.nodes {
            let id = self.load_node(node_index, &mut scene, &mut cache, config)?;
            scene.add_node(id);
        }

        log::info!(
            "Loaded scene {} ({}): {} nodes, {} meshes",
            index,
            record.name.as_deref().unwrap_or("unnamed"),
            cache.len(),
            scene.meshes.len()
        );
        Ok(scene)
    }

    fn load_node(
        &self,
        index: usize,
        scene: &mut Scene,
        cache: &mut LoadCache,
        config: &GameConfig,
    ) -> Result<NodeId, LoadError> {
        let record = self.nodes.get(index).ok_or(LoadError::MissingNode(index))?;
        if cache.get(index).is_some() || !cache.in_progress.insert(index) {
            return Err(LoadError::SharedNode(index));
        }

        let mut node = Node::new(node_kind(record, config));
        node.name = record.name.clone();
        if let Some(mesh) = record.mesh {
            let info = self
                .meshes
                .get(mesh)
                .ok_or(LoadError::MissingMesh { mesh, node: index })?;
            node.mesh = Some(MeshId(mesh));
            node.aabb = info.bounds();
        }
        node = match record.matrix {
            Some(matrix) => node.with_matrix(Mat4::from_cols_array(&matrix)),
            None => node.with_transform(Transform {
                translation: record.translation.map(Vec3::from).unwrap_or(Vec3::ZERO),
                rotation: record.rotation.map(quat_to_euler_angles).unwrap_or(Vec3::ZERO),
                scale: record.scale.map(Vec3::from).unwrap_or(Vec3::ONE),
            }),
        };

        let id = scene.insert(node);
        for &child in &record.children {
            let child_id = self.load_node(child, scene, cache, config)?;
            scene.add_child(id, child_id);
        }

        cache.in_progress.remove(&index);
        cache.nodes.insert(index, id);
        Ok(id)
    }
}

/// Gameplay kind from a node record's name / camera reference
fn node_kind(record: &NodeRecord, config: &GameConfig) -> NodeKind {
    let name = record.name.as_deref().unwrap_or("").to_lowercase();
    let base = name.split('.').next().unwrap_or("");

    if let Some(model) = VehicleModel::from_name(base) {
        return NodeKind::Vehicle(Vehicle::new(model, config.vehicle(model)));
    }
    match base {
        "box" => NodeKind::Prop(FallingProp::from_config(&config.spawner)),
        "arrow" => NodeKind::Marker(TargetMarker::from_config(&config.marker)),
        _ if base.starts_with("target") => NodeKind::Target,
        _ if base.starts_with("light") => NodeKind::Light(LightParams::default()),
        _ if record.camera.is_some() => NodeKind::Camera,
        _ => NodeKind::Plain,
    }
}

/// Quaternion `[x, y, z, w]` to `[x, y, z]` Euler angles in the scene
/// graph's Z-Y-X convention.
///
/// At gimbal lock (`|sin y| >= 1`) the y angle is clamped to exactly `±π/2`.
pub fn quat_to_euler_angles(q: [f32; 4]) -> Vec3 {
    let [x, y, z, w] = q;

    let sinr_cosp = 2.0 * (w * x + y * z);
    let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
    let roll = sinr_cosp.atan2(cosr_cosp);

    let sinp = 2.0 * (w * y - z * x);
    let pitch = if sinp.abs() >= 1.0 {
        FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    let siny_cosp = 2.0 * (w * z + x * y);
    let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
    let yaw = siny_cosp.atan2(cosy_cosp);

    Vec3::new(roll, pitch, yaw)
}
