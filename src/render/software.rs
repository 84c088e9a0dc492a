use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use glam::{Mat4, Vec3};

use super::canvas::{Canvas, DrawOp};
use super::Renderer;
use crate::camera::PerspectiveCamera;
use crate::geometry::{Geometry, Tessellation};
use crate::math::Color;
use crate::scene::{Fog, Light, LightKind, Mesh, NodeId, NodeKind, PointCloud, SceneGraph};

/// Cached tessellation and the inputs it was built from
struct CachedShape {
    geometry: Geometry,
    displacement: f32,
    tessellation: Arc<Tessellation>,
}

impl CachedShape {
    fn matches(&self, mesh: &Mesh) -> bool {
        let same_geometry = match (&self.geometry, &mesh.geometry) {
            (Geometry::Triangles(a), Geometry::Triangles(b)) => Arc::ptr_eq(a, b),
            (a, b) => a == b,
        };
        same_geometry && self.displacement == mesh.material.displacement_scale
    }
}

#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    xy: [f32; 2],
    depth: f32,
}

/// Draws the scene into a CPU `Canvas`: painter-sorted flat-shaded triangles,
/// wireframe lines, and point sprites. The viewer uploads the pixels to the
/// window surface.
pub struct CanvasRenderer {
    canvas: Canvas,
    cache: HashMap<NodeId, CachedShape>,
}

impl CanvasRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Canvas::new(width.max(1), height.max(1)),
            cache: HashMap::new(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn pixels(&self) -> &[u8] {
        self.canvas.pixels()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn shape_for(&mut self, id: NodeId, mesh: &Mesh) -> Arc<Tessellation> {
        if let Some(cached) = self.cache.get(&id) {
            if cached.matches(mesh) {
                return cached.tessellation.clone();
            }
        }

        let mut tessellation = mesh.geometry.tessellate();
        if let (Some(field), Geometry::Plane { width, height, .. }) = (&mesh.heightfield, &mesh.geometry) {
            tessellation.displace(field, *width, *height, mesh.material.displacement_scale);
        }
        let tessellation = Arc::new(tessellation);
        self.cache.insert(
            id,
            CachedShape {
                geometry: mesh.geometry.clone(),
                displacement: mesh.material.displacement_scale,
                tessellation: tessellation.clone(),
            },
        );
        tessellation
    }

    fn to_screen(&self, camera: &PerspectiveCamera, world: Vec3) -> Option<ScreenVertex> {
        let ndc = camera.project(world)?;
        let (w, h) = self.canvas.dimensions();
        Some(ScreenVertex {
            xy: [(ndc.x + 1.0) * 0.5 * w as f32, (1.0 - ndc.y) * 0.5 * h as f32],
            depth: camera.depth(world),
        })
    }
}

impl Renderer for CanvasRenderer {
    fn render(&mut self, graph: &SceneGraph, camera: &PerspectiveCamera) -> Result<()> {
        let lights = graph.lights();
        let fog = graph.fog;
        let mut triangles: Vec<(f32, DrawOp)> = Vec::new();
        let mut overlay: Vec<DrawOp> = Vec::new();

        for item in graph.renderables() {
            match &item.node.kind {
                NodeKind::Mesh(mesh) => {
                    let shape = self.shape_for(item.id, mesh);
                    self.mesh_ops(camera, &lights, fog, mesh, &shape, item.world, &mut triangles, &mut overlay);
                }
                NodeKind::Points(cloud) => {
                    self.point_ops(camera, fog, cloud, item.world, &mut overlay);
                }
                _ => {}
            }
        }

        // drop cache entries for nodes that no longer exist
        self.cache.retain(|id, _| graph.contains(*id));

        triangles.sort_by(|a, b| b.0.total_cmp(&a.0));
        self.canvas.push(DrawOp::Clear(graph.background.to_rgba8(1.0)));
        for (_, op) in triangles {
            self.canvas.push(op);
        }
        for op in overlay {
            self.canvas.push(op);
        }
        self.canvas.flush();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width.max(1), height.max(1));
    }
}

impl CanvasRenderer {
    #[allow(clippy::too_many_arguments)]
    fn mesh_ops(
        &self,
        camera: &PerspectiveCamera,
        lights: &[(Light, Vec3)],
        fog: Option<Fog>,
        mesh: &Mesh,
        shape: &Tessellation,
        world: Mat4,
        triangles: &mut Vec<(f32, DrawOp)>,
        overlay: &mut Vec<DrawOp>,
    ) {
        let material = &mesh.material;
        let alpha = material.opacity.clamp(0.0, 1.0);
        let positions: Vec<Vec3> = shape.positions.iter().map(|&p| world.transform_point3(p)).collect();
        let screen: Vec<Option<ScreenVertex>> = positions.iter().map(|&p| self.to_screen(camera, p)).collect();

        if material.wireframe {
            for [a, b] in shape.edges() {
                let (Some(sa), Some(sb)) = (screen[a as usize], screen[b as usize]) else {
                    continue;
                };
                let color = apply_fog(material.color, fog, (sa.depth + sb.depth) * 0.5);
                overlay.push(DrawOp::Line {
                    x1: sa.xy[0] as i32,
                    y1: sa.xy[1] as i32,
                    x2: sb.xy[0] as i32,
                    y2: sb.xy[1] as i32,
                    color: color.to_rgba8(alpha),
                });
            }
            return;
        }

        for &[a, b, c] in &shape.triangles {
            let (Some(sa), Some(sb), Some(sc)) = (screen[a as usize], screen[b as usize], screen[c as usize]) else {
                continue;
            };
            let (pa, pb, pc) = (positions[a as usize], positions[b as usize], positions[c as usize]);
            let normal = (pb - pa).cross(pc - pa).normalize_or_zero();
            let centroid = (pa + pb + pc) / 3.0;
            let depth = (sa.depth + sb.depth + sc.depth) / 3.0;

            let lit = if material.unlit {
                material.color
            } else {
                tone_map(material.color * irradiance(lights, normal, centroid))
            };
            let color = apply_fog(lit, fog, depth);
            triangles.push((
                depth,
                DrawOp::Triangle {
                    points: [sa.xy, sb.xy, sc.xy],
                    color: color.to_rgba8(alpha),
                },
            ));
        }
    }

    fn point_ops(
        &self,
        camera: &PerspectiveCamera,
        fog: Option<Fog>,
        cloud: &PointCloud,
        world: Mat4,
        overlay: &mut Vec<DrawOp>,
    ) {
        let (_, height) = self.canvas.dimensions();
        let focal = height as f32 / (2.0 * (camera.fov.to_radians() * 0.5).tan());
        let alpha = cloud.opacity.clamp(0.0, 1.0);

        for (i, &p) in cloud.positions.iter().enumerate() {
            let Some(s) = self.to_screen(camera, world.transform_point3(p)) else {
                continue;
            };
            let color = apply_fog(cloud.color_at(i), fog, s.depth).to_rgba8(alpha);
            let radius = (cloud.size * focal / s.depth.max(1e-3) * 0.5).round() as u32;
            let (x, y) = (s.xy[0] as i32, s.xy[1] as i32);
            if radius <= 1 {
                overlay.push(DrawOp::Pixel { x, y, color });
            } else {
                overlay.push(DrawOp::FilledCircle { cx: x, cy: y, radius, color });
            }
        }
    }
}

/// Incoming light at a surface point; surfaces are lit from either side
fn irradiance(lights: &[(Light, Vec3)], normal: Vec3, at: Vec3) -> Color {
    let mut total = Color::BLACK;
    for (light, position) in lights {
        let radiance = light.color.scaled(light.intensity);
        total += match light.kind {
            LightKind::Ambient => radiance,
            LightKind::Hemisphere { ground } => {
                let t = normal.y.abs() * 0.5 + 0.5;
                ground.lerp(light.color, t).scaled(light.intensity)
            }
            LightKind::Directional => {
                let dir = position.normalize_or_zero();
                radiance.scaled(normal.dot(dir).abs())
            }
            LightKind::Point { distance, decay } => {
                let to_light = *position - at;
                let dist = to_light.length();
                if distance > 0.0 && dist > distance {
                    continue;
                }
                let falloff = 1.0 / (1.0 + dist.powf(decay.max(0.0)));
                radiance.scaled(normal.dot(to_light.normalize_or_zero()).abs() * falloff)
            }
            LightKind::RectArea { width, height } => {
                let to_light = *position - at;
                let dist_sq = to_light.length_squared();
                let area = (width * height).max(0.0);
                let lambert = normal.dot(to_light.normalize_or_zero()).abs();
                radiance.scaled(lambert * area / (area + dist_sq.max(1e-3) * 4.0))
            }
        };
    }
    total
}

/// Exponential exposure curve keeping bright lights in range
fn tone_map(c: Color) -> Color {
    let curve = |v: f32| 1.0 - (-v.max(0.0)).exp();
    Color::new(curve(c.r), curve(c.g), curve(c.b))
}

fn apply_fog(color: Color, fog: Option<Fog>, depth: f32) -> Color {
    match fog {
        Some(fog) => color.lerp(fog.color, fog.factor(depth)),
        None => color,
    }
}
