//! Geometry descriptors and their CPU tessellation.
//!
//! Scene nodes hold a `Geometry` value (the parameters a 3D library would
//! take in its constructor). Renderers call `tessellate` to get triangles in
//! the node's local space.

mod heightfield;
mod primitives;

use std::sync::Arc;

use glam::Vec3;

pub use heightfield::Heightfield;

/// Indexed triangle list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tessellation {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl Tessellation {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Unique undirected edges, for wireframe drawing
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut edges: Vec<[u32; 2]> = self
            .triangles
            .iter()
            .flat_map(|&[a, b, c]| [[a, b], [b, c], [c, a]])
            .map(|[a, b]| if a < b { [a, b] } else { [b, a] })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Offset every vertex along local +Z by the heightfield sampled at its
    /// (x, y) position within `[-w/2, w/2] x [-h/2, h/2]`.
    pub fn displace(&mut self, field: &Heightfield, width: f32, height: f32, scale: f32) {
        if scale == 0.0 {
            return;
        }
        for p in &mut self.positions {
            let u = p.x / width + 0.5;
            let v = 0.5 - p.y / height;
            p.z += field.sample(u, v) * scale;
        }
    }

    fn append(&mut self, other: Tessellation) {
        let base = self.positions.len() as u32;
        self.positions.extend(other.positions);
        self.triangles
            .extend(other.triangles.into_iter().map(|t| t.map(|i| i + base)));
    }
}

/// Triangles imported from a model file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Shape parameters of a mesh
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
        segments: [u32; 3],
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// A cone when `radius_top` is zero
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
        open_ended: bool,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    TorusKnot {
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    },
    /// Lies in the local XY plane, facing +Z
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Triangles(Arc<TriangleMesh>),
}

impl Geometry {
    pub fn cube(size: f32, segments: u32) -> Self {
        Geometry::Box {
            width: size,
            height: size,
            depth: size,
            segments: [segments; 3],
        }
    }

    pub fn sphere(radius: f32, segments: u32) -> Self {
        Geometry::Sphere {
            radius,
            width_segments: segments,
            height_segments: segments,
        }
    }

    pub fn cylinder(radius: f32, height: f32, radial_segments: u32) -> Self {
        Geometry::Cylinder {
            radius_top: radius,
            radius_bottom: radius,
            height,
            radial_segments,
            open_ended: false,
        }
    }

    pub fn cone(radius: f32, height: f32, radial_segments: u32, open_ended: bool) -> Self {
        Geometry::Cylinder {
            radius_top: 0.0,
            radius_bottom: radius,
            height,
            radial_segments,
            open_ended,
        }
    }

    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        Geometry::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        }
    }

    pub fn torus_knot(radius: f32, tube: f32, tubular_segments: u32, radial_segments: u32) -> Self {
        Geometry::TorusKnot {
            radius,
            tube,
            tubular_segments,
            radial_segments,
            p: 2,
            q: 3,
        }
    }

    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        Geometry::Plane {
            width,
            height,
            width_segments,
            height_segments,
        }
    }

    /// Short lowercase name, used in logs and render records
    pub fn label(&self) -> &'static str {
        match self {
            Geometry::Box { .. } => "box",
            Geometry::Sphere { .. } => "sphere",
            Geometry::Cylinder { radius_top, .. } if *radius_top == 0.0 => "cone",
            Geometry::Cylinder { .. } => "cylinder",
            Geometry::Torus { .. } => "torus",
            Geometry::TorusKnot { .. } => "torus-knot",
            Geometry::Plane { .. } => "plane",
            Geometry::Triangles(_) => "triangles",
        }
    }

    /// Triangles in local space. Segment counts of zero are treated as one.
    pub fn tessellate(&self) -> Tessellation {
        match self {
            Geometry::Box {
                width,
                height,
                depth,
                segments,
            } => primitives::cuboid(Vec3::new(*width, *height, *depth), *segments),
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => primitives::sphere(*radius, (*width_segments).max(3), (*height_segments).max(2)),
            Geometry::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
                open_ended,
            } => primitives::cylinder(
                *radius_top,
                *radius_bottom,
                *height,
                (*radial_segments).max(3),
                *open_ended,
            ),
            Geometry::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => primitives::torus(*radius, *tube, (*radial_segments).max(3), (*tubular_segments).max(3)),
            Geometry::TorusKnot {
                radius,
                tube,
                tubular_segments,
                radial_segments,
                p,
                q,
            } => primitives::torus_knot(
                *radius,
                *tube,
                (*tubular_segments).max(3),
                (*radial_segments).max(3),
                *p as f32,
                *q as f32,
            ),
            Geometry::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => primitives::plane(*width, *height, (*width_segments).max(1), (*height_segments).max(1)),
            Geometry::Triangles(mesh) => Tessellation {
                positions: mesh.positions.clone(),
                triangles: mesh
                    .indices
                    .chunks_exact(3)
                    .map(|t| [t[0], t[1], t[2]])
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn plane_grid_counts() {
        let t = Geometry::plane(5.0, 3.0, 32, 32).tessellate();
        assert_eq!(t.vertex_count(), 33 * 33);
        assert_eq!(t.triangle_count(), 32 * 32 * 2);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let t = Geometry::sphere(0.7, 16).tessellate();
        for p in &t.positions {
            assert_relative_eq!(p.length(), 0.7, epsilon = 1e-4);
        }
    }

    #[test]
    fn cube_spans_its_size() {
        let t = Geometry::cube(1.0, 2).tessellate();
        let max = t.positions.iter().fold(Vec3::splat(f32::MIN), |a, &b| a.max(b));
        let min = t.positions.iter().fold(Vec3::splat(f32::MAX), |a, &b| a.min(b));
        assert_eq!(max, Vec3::splat(0.5));
        assert_eq!(min, Vec3::splat(-0.5));
        assert_eq!(t.triangle_count(), 6 * 2 * 2 * 2);
    }

    #[test]
    fn edges_are_unique() {
        let t = Geometry::plane(1.0, 1.0, 1, 1).tessellate();
        // two triangles share the diagonal
        assert_eq!(t.edges().len(), 5);
    }

    #[test]
    fn open_cone_has_no_caps() {
        let closed = Geometry::cone(1.2, 4.0, 8, false).tessellate();
        let open = Geometry::cone(1.2, 4.0, 8, true).tessellate();
        assert!(open.triangle_count() < closed.triangle_count());
        assert_eq!(Geometry::cone(1.0, 1.0, 8, true).label(), "cone");
    }

    #[test]
    fn triangles_keep_indices() {
        let mesh = TriangleMesh {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            indices: vec![0, 1, 2],
        };
        let t = Geometry::Triangles(Arc::new(mesh)).tessellate();
        assert_eq!(t.triangles, vec![[0, 1, 2]]);
    }
}
