//! Scene graph: the renderable and lightable objects of one scene.

mod graph;
mod node;

use std::fmt;

use thiserror::Error;

use crate::math::Color;

pub use graph::{Renderable, SceneGraph};
pub use node::{Light, LightKind, Material, Mesh, Node, NodeKind, PointCloud, Transform};

/// Non-owning handle to a node in a `SceneGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Linear distance fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    pub fn new(color: Color, near: f32, far: f32) -> Self {
        Self { color, near, far }
    }

    /// 0 at `near` and closer, 1 at `far` and beyond
    pub fn factor(&self, distance: f32) -> f32 {
        if self.far <= self.near {
            return if distance >= self.far { 1.0 } else { 0.0 };
        }
        ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("node {0} no longer exists")]
    StaleHandle(NodeId),

    #[error("node {id} is a {found}, expected a {expected}")]
    WrongKind {
        id: NodeId,
        expected: &'static str,
        found: &'static str,
    },
}
