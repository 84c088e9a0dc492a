use glam::Mat4;

use super::node::{Light, Mesh, Node, NodeKind, PointCloud, Transform};
use super::{Fog, NodeId, SceneError};
use crate::math::Color;

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A node that should produce output this frame, with its world matrix
#[derive(Debug, Clone, Copy)]
pub struct Renderable<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    pub world: Mat4,
}

/// Owns every object of a scene.
///
/// Nodes live in generation-checked slots, so a `NodeId` kept after its node
/// was removed never resolves to whatever reuses the slot.
#[derive(Debug)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<NodeId>,
    live: usize,
    pub background: Color,
    pub fog: Option<Fog>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            roots: Vec::new(),
            live: 0,
            background: Color::BLACK,
            fog: None,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Add a top-level node
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = self.insert(node, None);
        self.roots.push(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::StaleHandle(parent));
        }
        let id = self.insert(node, Some(parent));
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    fn insert(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        node.parent = parent;
        node.children.clear();
        self.live += 1;

        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    /// Remove a node and all of its descendants. Returns how many nodes were released.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, SceneError> {
        let parent = self.node(id)?.parent;
        match parent {
            Some(p) => {
                if let Some(parent) = self.get_mut(p) {
                    parent.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }

        let mut released = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                stack.extend(node.children);
                released += 1;
            }
        }
        self.live -= released;
        Ok(released)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.get(id).ok_or(SceneError::StaleHandle(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.get_mut(id).ok_or(SceneError::StaleHandle(id))
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Result<&mut Transform, SceneError> {
        self.node_mut(id).map(|n| &mut n.transform)
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Result<&mut Mesh, SceneError> {
        let node = self.node_mut(id)?;
        let found = node.kind.label();
        node.as_mesh_mut().ok_or(SceneError::WrongKind {
            id,
            expected: "mesh",
            found,
        })
    }

    pub fn light_mut(&mut self, id: NodeId) -> Result<&mut Light, SceneError> {
        let node = self.node_mut(id)?;
        let found = node.kind.label();
        node.as_light_mut().ok_or(SceneError::WrongKind {
            id,
            expected: "light",
            found,
        })
    }

    pub fn points_mut(&mut self, id: NodeId) -> Result<&mut PointCloud, SceneError> {
        let node = self.node_mut(id)?;
        let found = node.kind.label();
        node.as_points_mut().ok_or(SceneError::WrongKind {
            id,
            expected: "points",
            found,
        })
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), SceneError> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    /// First live node with the given name, depth-first from the roots
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.descendants_of(&self.roots)
            .into_iter()
            .find(|&id| self.get(id).is_some_and(|n| n.name == name))
    }

    /// Every live node id in depth-first order
    pub fn ids(&self) -> Vec<NodeId> {
        self.descendants_of(&self.roots)
    }

    fn descendants_of(&self, start: &[NodeId]) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = start.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn mesh_count(&self) -> usize {
        self.slots
            .iter()
            .filter_map(|s| s.node.as_ref())
            .filter(|n| matches!(n.kind, NodeKind::Mesh(_)))
            .count()
    }

    /// True when the node and every ancestor are visible
    pub fn is_world_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cid) = current {
            match self.get(cid) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(cid) = current {
            let node = self.node(cid)?;
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        Ok(matrix)
    }

    /// Apply `f` to every mesh in the subtree rooted at `root`, including `root`
    pub fn traverse_meshes_mut(
        &mut self,
        root: NodeId,
        mut f: impl FnMut(&mut Mesh),
    ) -> Result<usize, SceneError> {
        if !self.contains(root) {
            return Err(SceneError::StaleHandle(root));
        }
        let mut touched = 0;
        for id in self.descendants_of(&[root]) {
            if let Some(mesh) = self.get_mut(id).and_then(Node::as_mesh_mut) {
                f(mesh);
                touched += 1;
            }
        }
        Ok(touched)
    }

    /// Meshes and point clouds that are visible along with all their
    /// ancestors, in depth-first order
    pub fn renderables(&self) -> Vec<Renderable<'_>> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Mat4::IDENTITY))
            .collect();

        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            if matches!(node.kind, NodeKind::Mesh(_) | NodeKind::Points(_)) {
                out.push(Renderable { id, node, world });
            }
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }
        out
    }

    /// Every light with its world position; hidden lights contribute nothing
    pub fn lights(&self) -> Vec<(Light, glam::Vec3)> {
        self.ids()
            .into_iter()
            .filter(|&id| self.is_world_visible(id))
            .filter_map(|id| {
                let light = *self.get(id)?.as_light()?;
                let world = self.world_matrix(id).ok()?;
                Some((light, world.transform_point3(glam::Vec3::ZERO)))
            })
            .collect()
    }
}
