use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::Tessellation;

/// Parametric surface over `[0, 1]^2`, `cols x rows` quads
fn grid(cols: u32, rows: u32, f: impl Fn(f32, f32) -> Vec3) -> Tessellation {
    let stride = cols + 1;
    let mut positions = Vec::with_capacity(((cols + 1) * (rows + 1)) as usize);
    for j in 0..=rows {
        let v = j as f32 / rows as f32;
        for i in 0..=cols {
            positions.push(f(i as f32 / cols as f32, v));
        }
    }

    let mut triangles = Vec::with_capacity((cols * rows * 2) as usize);
    for j in 0..rows {
        for i in 0..cols {
            let a = j * stride + i;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            triangles.push([a, c, b]);
            triangles.push([b, c, d]);
        }
    }

    Tessellation { positions, triangles }
}

pub(super) fn plane(width: f32, height: f32, cols: u32, rows: u32) -> Tessellation {
    grid(cols, rows, |u, v| Vec3::new((u - 0.5) * width, (0.5 - v) * height, 0.0))
}

pub(super) fn cuboid(size: Vec3, segments: [u32; 3]) -> Tessellation {
    let [sx, sy, sz] = segments.map(|s| s.max(1));
    let h = size * 0.5;
    let mut out = Tessellation::default();

    out.append(grid(sz, sy, |u, v| Vec3::new(h.x, (0.5 - v) * size.y, (0.5 - u) * size.z)));
    out.append(grid(sz, sy, |u, v| Vec3::new(-h.x, (0.5 - v) * size.y, (u - 0.5) * size.z)));
    out.append(grid(sx, sz, |u, v| Vec3::new((u - 0.5) * size.x, h.y, (v - 0.5) * size.z)));
    out.append(grid(sx, sz, |u, v| Vec3::new((u - 0.5) * size.x, -h.y, (0.5 - v) * size.z)));
    out.append(grid(sx, sy, |u, v| Vec3::new((u - 0.5) * size.x, (0.5 - v) * size.y, h.z)));
    out.append(grid(sx, sy, |u, v| Vec3::new((0.5 - u) * size.x, (0.5 - v) * size.y, -h.z)));

    out
}

pub(super) fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Tessellation {
    grid(width_segments, height_segments, |u, v| {
        let phi = u * TAU;
        let theta = v * PI;
        Vec3::new(
            -radius * phi.cos() * theta.sin(),
            radius * theta.cos(),
            radius * phi.sin() * theta.sin(),
        )
    })
}

pub(super) fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
    open_ended: bool,
) -> Tessellation {
    let half = height * 0.5;
    let mut out = grid(radial_segments, 1, |u, v| {
        let r = radius_top + (radius_bottom - radius_top) * v;
        let a = u * TAU;
        Vec3::new(r * a.sin(), half - v * height, r * a.cos())
    });

    if !open_ended {
        if radius_top > 0.0 {
            out.append(cap(radius_top, half, radial_segments));
        }
        if radius_bottom > 0.0 {
            out.append(cap(radius_bottom, -half, radial_segments));
        }
    }

    out
}

/// Triangle fan closing one end of a cylinder
fn cap(radius: f32, y: f32, segments: u32) -> Tessellation {
    let mut positions = vec![Vec3::new(0.0, y, 0.0)];
    positions.extend((0..=segments).map(|i| {
        let a = i as f32 / segments as f32 * TAU;
        Vec3::new(radius * a.sin(), y, radius * a.cos())
    }));
    let triangles = (1..=segments).map(|i| [0, i, i + 1]).collect();
    Tessellation { positions, triangles }
}

pub(super) fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Tessellation {
    grid(tubular_segments, radial_segments, |u, v| {
        let a = u * TAU;
        let b = v * TAU;
        let ring = radius + tube * b.cos();
        Vec3::new(ring * a.cos(), ring * a.sin(), tube * b.sin())
    })
}

fn knot_point(u: f32, radius: f32, p: f32, q: f32) -> Vec3 {
    let qu = q / p * u;
    let cs = qu.cos();
    Vec3::new(
        radius * (2.0 + cs) * 0.5 * u.cos(),
        radius * (2.0 + cs) * 0.5 * u.sin(),
        radius * qu.sin() * 0.5,
    )
}

pub(super) fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: f32,
    q: f32,
) -> Tessellation {
    grid(tubular_segments, radial_segments, |s, v| {
        let u = s * p * TAU;
        let p1 = knot_point(u, radius, p, q);
        let p2 = knot_point(u + 0.01, radius, p, q);

        let t = p2 - p1;
        let n = p2 + p1;
        let b = t.cross(n).normalize_or_zero();
        let n = b.cross(t).normalize_or_zero();

        let a = v * TAU;
        p1 + n * (-tube * a.cos()) + b * (tube * a.sin())
    })
}
