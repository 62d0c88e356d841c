//! CPU-side tessellation of shape descriptors.
//!
//! Layouts follow the usual parametric constructions: boxes as six quads, UV spheres,
//! tori swept around Z, and a (2,3) torus knot with a tube swept along the curve.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use shapestage_common::{ShapeDescriptor, ShapeKind};
use std::collections::BTreeSet;
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// Triangle-list mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Tessellate a descriptor around its own origin.
pub fn tessellate(descriptor: &ShapeDescriptor) -> MeshData {
    let a = descriptor.args();
    match descriptor.kind {
        ShapeKind::Cube => box_mesh(a[0] as f32, a[1] as f32, a[2] as f32),
        ShapeKind::Sphere => uv_sphere(a[0] as f32, segments(a[1], 3), segments(a[2], 2)),
        ShapeKind::Torus => torus(a[0] as f32, a[1] as f32, segments(a[2], 2), segments(a[3], 3)),
        ShapeKind::TorusKnot => {
            torus_knot(a[0] as f32, a[1] as f32, segments(a[2], 3), segments(a[3], 3), 2, 3)
        }
    }
}

fn segments(arg: f64, min: u32) -> u32 {
    (arg.floor() as u32).max(min)
}

pub fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0],  [[-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z]]),
        ([0.0, 0.0, -1.0], [[ x, -y, -z], [-x, -y, -z], [-x,  y, -z], [ x,  y, -z]]),
        ([1.0, 0.0, 0.0],  [[ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z]]),
        ([-1.0, 0.0, 0.0], [[-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z]]),
        ([0.0, 1.0, 0.0],  [[-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z]]),
        ([0.0, -1.0, 0.0], [[-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z]]),
    ];
    let mut mesh = MeshData::default();
    for (normal, corners) in faces {
        let base = mesh.vertices.len() as u32;
        mesh.vertices.extend(corners.iter().map(|c| Vertex {
            position: *c,
            normal,
        }));
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let normal = Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            mesh.vertices.push(Vertex::new(normal * radius, normal));
        }
    }
    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // the pole rows collapse to single triangles
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            mesh.vertices
                .push(Vertex::new(position, (position - center).normalize_or_zero()));
        }
    }
    grid_indices(&mut mesh.indices, radial_segments, tubular_segments);
    mesh
}

/// Point on a (p, q) torus knot curve at parameter `u`.
fn knot_curve(u: f32, p: u32, q: u32, radius: f32) -> Vec3 {
    let qu_over_p = q as f32 / p as f32 * u;
    let cs = qu_over_p.cos();
    Vec3::new(
        radius * (2.0 + cs) * 0.5 * u.cos(),
        radius * (2.0 + cs) * 0.5 * u.sin(),
        radius * qu_over_p.sin() * 0.5,
    )
}

pub fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> MeshData {
    let mut mesh = MeshData::default();
    for i in 0..=tubular_segments {
        let u = i as f32 / tubular_segments as f32 * p as f32 * TAU;
        let p1 = knot_curve(u, p, q, radius);
        let p2 = knot_curve(u + 0.01, p, q, radius);
        let t = p2 - p1;
        let n = p2 + p1;
        let b = t.cross(n).normalize_or_zero();
        let n = b.cross(t).normalize_or_zero();
        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let position = p1 + n * cx + b * cy;
            mesh.vertices
                .push(Vertex::new(position, (position - p1).normalize_or_zero()));
        }
    }
    grid_indices(&mut mesh.indices, tubular_segments, radial_segments);
    mesh
}

/// Quads over an `(outer + 1) x (inner + 1)` vertex grid.
fn grid_indices(indices: &mut Vec<u32>, outer: u32, inner: u32) {
    let row = inner + 1;
    for j in 1..=outer {
        for i in 1..=inner {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
}

/// Unique triangle edges as a line list.
pub fn wireframe_edges(indices: &[u32]) -> Vec<u32> {
    let mut edges = BTreeSet::new();
    for tri in indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            edges.insert((a.min(b), a.max(b)));
        }
    }
    edges.into_iter().flat_map(|(a, b)| [a, b]).collect()
}

/// Line segments for a directional-light helper: a square of side `scale` centred on
/// the light, facing its target, plus a line from the light to the target.
pub fn helper_lines(position: Vec3, target: Vec3, scale: f32) -> Vec<Vec3> {
    let forward = (target - position).normalize_or_zero();
    let up_hint = if forward.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    let right = forward.cross(up_hint).normalize_or_zero();
    let up = right.cross(forward);
    let h = scale * 0.5;
    let corners = [
        position + (-right + up) * h,
        position + (right + up) * h,
        position + (right - up) * h,
        position + (-right - up) * h,
    ];
    let mut lines = Vec::with_capacity(10);
    for i in 0..4 {
        lines.push(corners[i]);
        lines.push(corners[(i + 1) % 4]);
    }
    lines.push(position);
    lines.push(target);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use shapestage_common::Color;

    const EPS: f32 = 1e-4;

    fn pos(v: &Vertex) -> Vec3 {
        Vec3::from_array(v.position)
    }

    #[test]
    fn box_has_six_quads() {
        let mesh = box_mesh(1.0, 2.0, 3.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        let max = mesh
            .vertices
            .iter()
            .fold(Vec3::ZERO, |m, v| m.max(pos(v).abs()));
        assert_eq!(max, Vec3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn sphere_vertices_on_radius() {
        let mesh = uv_sphere(0.7, 60, 60);
        assert_eq!(mesh.vertices.len(), 61 * 61);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| (pos(v).length() - 0.7).abs() < EPS));
        // two pole rows of single triangles, the rest quads
        assert_eq!(mesh.triangle_count(), 60 * 60 * 2 - 2 * 60);
    }

    #[test]
    fn torus_vertices_are_tube_away_from_ring() {
        let mesh = torus(0.8, 0.1, 30, 30);
        assert_eq!(mesh.vertices.len(), 31 * 31);
        for v in &mesh.vertices {
            let p = pos(v);
            let ring = Vec3::new(p.x, p.y, 0.0).normalize() * 0.8;
            assert!(((p - ring).length() - 0.1).abs() < EPS);
        }
    }

    #[test]
    fn knot_fits_its_bounding_radius() {
        let d = ShapeDescriptor::torus_knot(DVec3::ZERO, [0.5, 0.1, 100.0, 8.0], Color::WHITE).unwrap();
        let mesh = tessellate(&d);
        assert_eq!(mesh.vertices.len(), 101 * 9);
        let bound = d.bounding_radius() as f32 + EPS;
        assert!(mesh.vertices.iter().all(|v| pos(v).length() <= bound));
    }

    #[test]
    fn knot_radius_scales_geometry() {
        let small = torus_knot(0.5, 0.1, 64, 8, 2, 3);
        let large = torus_knot(1.0, 0.1, 64, 8, 2, 3);
        let extent = |m: &MeshData| m.vertices.iter().map(|v| pos(v).length()).fold(0.0, f32::max);
        assert!(extent(&large) > extent(&small) * 1.5);
    }

    #[test]
    fn segment_args_are_floored_with_minimums() {
        let d = ShapeDescriptor::sphere(DVec3::ZERO, [1.0, 1.5, 1.0], Color::WHITE).unwrap();
        let mesh = tessellate(&d);
        assert_eq!(mesh.vertices.len(), 4 * 3);
    }

    #[test]
    fn wireframe_dedupes_shared_edges() {
        let quad = [0, 1, 2, 2, 3, 0];
        let edges = wireframe_edges(&quad);
        assert_eq!(edges.len(), 5 * 2);
    }

    #[test]
    fn helper_square_has_requested_side() {
        let lines = helper_lines(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, 0.5);
        assert_eq!(lines.len(), 10);
        assert!(((lines[0] - lines[1]).length() - 0.5).abs() < EPS);
        assert!(lines[..8].iter().all(|p| (p.z - 2.0).abs() < EPS));
        assert_eq!(lines[9], Vec3::ZERO);
    }
}
