use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::NodeId;
use crate::geometry::{Geometry, Heightfield};
use crate::math::Color;

/// Position, Euler XYZ rotation (radians), and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = Vec3::splat(s);
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub wireframe: bool,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    /// Ignores scene lights when true
    pub unlit: bool,
    pub displacement_scale: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            wireframe: false,
            roughness: 1.0,
            metalness: 0.0,
            opacity: 1.0,
            unlit: false,
            displacement_scale: 0.0,
        }
    }
}

impl Material {
    pub fn standard(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn basic(color: Color) -> Self {
        Self {
            color,
            unlit: true,
            ..Self::default()
        }
    }

    pub fn wireframe(mut self, on: bool) -> Self {
        self.wireframe = on;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
    /// Displaces a plane along its normal, scaled by `material.displacement_scale`
    pub heightfield: Option<Arc<Heightfield>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Shines from its position toward the origin
    Directional,
    Point { distance: f32, decay: f32 },
    RectArea { width: f32, height: f32 },
    Hemisphere { ground: Color },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self { kind: LightKind::Ambient, color, intensity }
    }

    pub fn directional(color: Color, intensity: f32) -> Self {
        Self { kind: LightKind::Directional, color, intensity }
    }

    pub fn point(color: Color, intensity: f32, distance: f32, decay: f32) -> Self {
        Self { kind: LightKind::Point { distance, decay }, color, intensity }
    }

    pub fn rect_area(color: Color, intensity: f32, width: f32, height: f32) -> Self {
        Self { kind: LightKind::RectArea { width, height }, color, intensity }
    }

    pub fn hemisphere(sky: Color, ground: Color, intensity: f32) -> Self {
        Self { kind: LightKind::Hemisphere { ground }, color: sky, intensity }
    }
}

/// Particles drawn as screen-space points
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    /// Per-point colors; `color` is used when absent
    pub colors: Option<Vec<Color>>,
    pub color: Color,
    pub size: f32,
    pub opacity: f32,
}

impl PointCloud {
    pub fn new(positions: Vec<Vec3>, color: Color, size: f32) -> Self {
        Self {
            positions,
            colors: None,
            color,
            size,
            opacity: 1.0,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn color_at(&self, index: usize) -> Color {
        self.colors
            .as_ref()
            .and_then(|c| c.get(index).copied())
            .unwrap_or(self.color)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh(Mesh),
    Light(Light),
    Points(PointCloud),
    Group,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Mesh(_) => "mesh",
            NodeKind::Light(_) => "light",
            NodeKind::Points(_) => "points",
            NodeKind::Group => "group",
        }
    }
}

/// One object in the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            transform: Transform::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: &str, geometry: Geometry, material: Material) -> Self {
        Self::new(
            name,
            NodeKind::Mesh(Mesh {
                geometry,
                material,
                heightfield: None,
            }),
        )
    }

    pub fn light(name: &str, light: Light) -> Self {
        Self::new(name, NodeKind::Light(light))
    }

    pub fn points(name: &str, cloud: PointCloud) -> Self {
        Self::new(name, NodeKind::Points(cloud))
    }

    pub fn group(name: &str) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = Vec3::new(x, y, z);
        self
    }

    pub fn rotated(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.rotation = Vec3::new(x, y, z);
        self
    }

    pub fn scaled(mut self, s: f32) -> Self {
        self.transform.set_uniform_scale(s);
        self
    }

    pub fn with_heightfield(mut self, field: Arc<Heightfield>) -> Self {
        if let NodeKind::Mesh(mesh) = &mut self.kind {
            mesh.heightfield = Some(field);
        }
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn as_points_mut(&mut self) -> Option<&mut PointCloud> {
        match &mut self.kind {
            NodeKind::Points(cloud) => Some(cloud),
            _ => None,
        }
    }
}
