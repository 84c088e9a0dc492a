use anyhow::{bail, Result};
use glam::{Mat4, Vec3};

use super::Renderer;
use crate::camera::PerspectiveCamera;
use crate::math::Color;
use crate::scene::{Fog, NodeId, NodeKind, SceneGraph};

/// One object that produced output in a frame
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub id: NodeId,
    pub name: String,
    /// "mesh" or "points"
    pub kind: &'static str,
    pub geometry: Option<&'static str>,
    pub world: Mat4,
    pub color: Color,
    pub wireframe: bool,
    pub point_count: usize,
}

impl DrawRecord {
    pub fn position(&self) -> Vec3 {
        self.world.transform_point3(Vec3::ZERO)
    }

    pub fn scale(&self) -> Vec3 {
        self.world.to_scale_rotation_translation().0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub background: Color,
    pub fog: Option<Fog>,
    pub camera_position: Vec3,
    pub draws: Vec<DrawRecord>,
}

impl RenderedFrame {
    pub fn find(&self, name: &str) -> Option<&DrawRecord> {
        self.draws.iter().find(|d| d.name == name)
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.draws.iter().filter(|d| d.name == name).count()
    }
}

/// Records what each frame would draw instead of producing pixels
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Vec<RenderedFrame>,
    limit: Option<usize>,
    fail_on: Option<usize>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the most recent `n` frames
    pub fn keep_last(n: usize) -> Self {
        Self {
            limit: Some(n.max(1)),
            ..Self::default()
        }
    }

    /// Fail when asked to render frame `index` (zero based)
    pub fn failing_on(index: usize) -> Self {
        Self {
            fail_on: Some(index),
            ..Self::default()
        }
    }

    pub fn frames(&self) -> &[RenderedFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&RenderedFrame> {
        self.frames.last()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, graph: &SceneGraph, camera: &PerspectiveCamera) -> Result<()> {
        if self.fail_on == Some(self.frames.len()) {
            bail!("render failed on frame {}", self.frames.len());
        }

        let draws = graph
            .renderables()
            .into_iter()
            .map(|r| {
                let (geometry, color, wireframe, point_count) = match &r.node.kind {
                    NodeKind::Mesh(mesh) => (
                        Some(mesh.geometry.label()),
                        mesh.material.color,
                        mesh.material.wireframe,
                        0,
                    ),
                    NodeKind::Points(cloud) => (None, cloud.color, false, cloud.len()),
                    _ => (None, Color::BLACK, false, 0),
                };
                DrawRecord {
                    id: r.id,
                    name: r.node.name.clone(),
                    kind: r.node.kind.label(),
                    geometry,
                    world: r.world,
                    color,
                    wireframe,
                    point_count,
                }
            })
            .collect();

        self.frames.push(RenderedFrame {
            background: graph.background,
            fog: graph.fog,
            camera_position: camera.position,
            draws,
        });
        if let Some(limit) = self.limit {
            if self.frames.len() > limit {
                let excess = self.frames.len() - limit;
                self.frames.drain(..excess);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::scene::{Material, Node};

    #[test]
    fn records_only_visible_nodes() {
        let mut graph = SceneGraph::new();
        graph.add(Node::mesh("shown", Geometry::cube(1.0, 1), Material::default()));
        let hidden = graph.add(Node::mesh("hidden", Geometry::cube(1.0, 1), Material::default()));
        graph.set_visible(hidden, false).unwrap();

        let mut renderer = RecordingRenderer::new();
        renderer.render(&graph, &PerspectiveCamera::default()).unwrap();

        let frame = renderer.last().unwrap();
        assert_eq!(frame.draws.len(), 1);
        assert!(frame.find("hidden").is_none());
    }

    #[test]
    fn keep_last_bounds_history() {
        let graph = SceneGraph::new();
        let mut renderer = RecordingRenderer::keep_last(2);
        for _ in 0..5 {
            renderer.render(&graph, &PerspectiveCamera::default()).unwrap();
        }
        assert_eq!(renderer.frame_count(), 2);
    }

    #[test]
    fn failing_renderer_errors_on_requested_frame() {
        let graph = SceneGraph::new();
        let mut renderer = RecordingRenderer::failing_on(1);
        assert!(renderer.render(&graph, &PerspectiveCamera::default()).is_ok());
        assert!(renderer.render(&graph, &PerspectiveCamera::default()).is_err());
    }
}
