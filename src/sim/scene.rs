//! Arena-backed scene graph
//!
//! Nodes live in a flat table addressed by `NodeId`. Ownership flows from
//! the scene roots down through each node's `children`; the `parent` link is
//! a plain index used only for composing world matrices upward.
//!
//! Nodes can be *detached* (unlinked from the graph but kept in the arena,
//! ready to be re-attached) or *despawned* (freed together with their
//! subtree). Only attached nodes are visited by `traverse`.

use glam::Mat4;

use super::collision::Bounds;
use super::node::{Node, NodeId};

/// Loaded mesh metadata the renderer resolves by `MeshId`
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInfo {
    pub name: Option<String>,
    pub bounds: Option<Bounds>,
}

/// The scene graph
#[derive(Debug, Clone, Default)]
pub struct Scene {
    slots: Vec<Option<Node>>,
    free: Vec<u32>,
    roots: Vec<NodeId>,
    pub meshes: Vec<MeshInfo>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node in the arena without attaching it anywhere
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId((self.slots.len() - 1) as u32)
            }
        }
    }

    /// Insert a node and attach it as a scene root
    pub fn spawn(&mut self, node: Node) -> NodeId {
        let id = self.insert(node);
        self.roots.push(id);
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes stored in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is reachable from a root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            let Some(node) = self.get(current) else {
                return false;
            };
            match node.parent {
                Some(parent) => current = parent,
                None => return self.roots.contains(&current),
            }
        }
    }

    /// Attach an existing node as a root. Detaches it from any parent first.
    pub fn add_node(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        self.detach(id);
        self.roots.push(id);
    }

    /// Unlink a root; no-op if `id` is not a root
    pub fn remove_node(&mut self, id: NodeId) {
        self.roots.retain(|&r| r != id);
    }

    /// Make `child` the last child of `parent`, moving it from wherever it was
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return;
        }
        // Refuse to create a cycle
        if self.is_ancestor(child, parent) {
            log::warn!("Refusing to parent {:?} under its own descendant {:?}", child, parent);
            return;
        }
        self.detach(child);
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Unlink `child` from `parent`; no-op if it is not a child of `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let removed = match self.get_mut(parent) {
            Some(node) => {
                let before = node.children.len();
                node.children.retain(|&c| c != child);
                node.children.len() != before
            }
            None => return,
        };
        if removed {
            if let Some(child) = self.get_mut(child) {
                child.parent = None;
            }
        }
    }

    /// Unlink a node from its parent or from the roots, keeping it in the arena
    pub fn detach(&mut self, id: NodeId) {
        match self.get(id).and_then(|n| n.parent) {
            Some(parent) => self.remove_child(parent, id),
            None => self.remove_node(id),
        }
    }

    /// Detach and free a node and its whole subtree
    pub fn despawn(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.slots[current.index()].take() {
                stack.extend(node.children);
                self.free.push(current.0);
            }
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        let mut current = self.get(of).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Depth-first walk over attached nodes: `before` runs on a node ahead of
    /// its children, `after` once all of them are done
    pub fn traverse<B, A>(&self, mut before: B, mut after: A)
    where
        B: FnMut(NodeId, &Node),
        A: FnMut(NodeId, &Node),
    {
        for &root in &self.roots {
            self.traverse_from(root, &mut before, &mut after);
        }
    }

    fn traverse_from<B, A>(&self, id: NodeId, before: &mut B, after: &mut A)
    where
        B: FnMut(NodeId, &Node),
        A: FnMut(NodeId, &Node),
    {
        let Some(node) = self.get(id) else {
            return;
        };
        before(id, node);
        for &child in &node.children {
            self.traverse_from(child, before, after);
        }
        after(id, node);
    }

    /// Attached node ids in depth-first pre-order
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.slots.len());
        self.traverse(|id, _| out.push(id), |_, _| {});
        out
    }

    /// Pre-order mutable visit; the node set is fixed before visiting starts
    pub fn traverse_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(NodeId, &mut Node),
    {
        for id in self.ids() {
            if let Some(node) = self.get_mut(id) {
                visit(id, node);
            }
        }
    }

    /// First attached node matching `predicate`
    pub fn find(&self, mut predicate: impl FnMut(&Node) -> bool) -> Option<NodeId> {
        self.ids()
            .into_iter()
            .find(|&id| self.get(id).is_some_and(&mut predicate))
    }

    /// Every attached node matching `predicate`, in traversal order
    pub fn find_all(&self, mut predicate: impl FnMut(&Node) -> bool) -> Vec<NodeId> {
        self.ids()
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(&mut predicate))
            .collect()
    }

    /// Local matrix composed with every ancestor's, root first.
    ///
    /// O(depth) per call. Callers comparing many pairs per frame pay this for
    /// every comparison; nothing is cached between calls.
    pub fn global_transform(&self, id: NodeId) -> Mat4 {
        let Some(node) = self.get(id) else {
            return Mat4::IDENTITY;
        };
        match node.parent {
            Some(parent) => self.global_transform(parent) * node.matrix,
            None => node.matrix,
        }
    }

    /// World-space box of a physical node; `None` for nodes without bounds
    pub fn world_bounds(&self, id: NodeId) -> Option<Bounds> {
        let aabb = self.get(id)?.aabb?;
        Some(aabb.to_world(&self.global_transform(id)))
    }

    /// `(id, world matrix)` for every attached node, for the renderer
    pub fn world_matrices(&self) -> Vec<(NodeId, Mat4)> {
        self.ids()
            .into_iter()
            .map(|id| (id, self.global_transform(id)))
            .collect()
    }
}
