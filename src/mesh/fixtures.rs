//! Small meshes shared by unit tests.

use super::{MeshVertex, Triangle};
use crate::math::{Point3, Vector3};

fn flat_face(corners: [[f64; 3]; 4]) -> [Triangle; 2] {
    let p = corners.map(|c| Point3::new(c[0], c[1], c[2]));
    let normal = (p[1] - p[0]).cross(&(p[2] - p[0])).normalize();
    let v = p.map(|position| MeshVertex::new(position, normal));
    [
        Triangle::new([v[0], v[1], v[2]]),
        Triangle::new([v[0], v[2], v[3]]),
    ]
}

/// Unit square in the XY plane split along its diagonal, normals `+Z`.
pub(crate) fn quad() -> Vec<Triangle> {
    flat_face([
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ])
    .to_vec()
}

/// Flat-shaded axis-aligned cube with edge length `size`, 12 outward-facing triangles.
pub(crate) fn cube(size: f64) -> Vec<Triangle> {
    let s = size;
    let faces = [
        [[s, 0.0, 0.0], [s, s, 0.0], [s, s, s], [s, 0.0, s]],
        [[0.0, 0.0, 0.0], [0.0, 0.0, s], [0.0, s, s], [0.0, s, 0.0]],
        [[0.0, s, 0.0], [0.0, s, s], [s, s, s], [s, s, 0.0]],
        [[0.0, 0.0, 0.0], [s, 0.0, 0.0], [s, 0.0, s], [0.0, 0.0, s]],
        [[0.0, 0.0, s], [s, 0.0, s], [s, s, s], [0.0, s, s]],
        [[0.0, 0.0, 0.0], [0.0, s, 0.0], [s, s, 0.0], [s, 0.0, 0.0]],
    ];
    faces.into_iter().flat_map(flat_face).collect()
}

/// A single right triangle in the XY plane with legs of length `size`.
pub(crate) fn single_triangle(size: f64) -> Vec<Triangle> {
    let v = |x: f64, y: f64| MeshVertex::new(Point3::new(x, y, 0.0), Vector3::z());
    vec![Triangle::new([v(0.0, 0.0), v(size, 0.0), v(0.0, size)])]
}

/// Two unit quads meeting at a right angle along the X axis: a floor in
/// the XY plane and a wall in the XZ plane, both flat shaded.
pub(crate) fn fold() -> Vec<Triangle> {
    let mut triangles = flat_face([
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ])
    .to_vec();
    triangles.extend(flat_face([
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
    ]));
    triangles
}

/// Same geometry as [`fold`], but the shared crease vertices carry the
/// averaged normal of both faces, as a smooth-shaded export would.
pub(crate) fn smooth_fold() -> Vec<Triangle> {
    let crease = Vector3::new(0.0, 1.0, 1.0).normalize();
    fold()
        .into_iter()
        .map(|tri| {
            let vertices = (*tri.vertices()).map(|mut v| {
                if v.position.y.abs() < 1e-9 && v.position.z.abs() < 1e-9 {
                    v.normal = crease;
                }
                v
            });
            Triangle::with_normal(vertices, *tri.normal())
        })
        .collect()
}

/// Flat L-shaped plate in the XY plane with one reflex corner at `(1, 1)`.
///
/// Corners `a(0.5,0) b(3,0) c(3,1) d(1,1) e(1,2) f(0,2)`, triangulated as
/// `abd`, `bcd`, `adf`, `def`. Only `adf` is reached by the outlines of both
/// edges meeting at the reflex corner.
pub(crate) fn notched_plate() -> Vec<Triangle> {
    let v = |x: f64, y: f64| MeshVertex::new(Point3::new(x, y, 0.0), Vector3::z());
    let (a, b, c) = (v(0.5, 0.0), v(3.0, 0.0), v(3.0, 1.0));
    let (d, e, f) = (v(1.0, 1.0), v(1.0, 2.0), v(0.0, 2.0));
    vec![
        Triangle::new([a, b, d]),
        Triangle::new([b, c, d]),
        Triangle::new([a, d, f]),
        Triangle::new([d, e, f]),
    ]
}

/// Flat 2×1 rectangle whose bottom edge is split at `m(1,0)`.
///
/// Corners `a(0,0) m(1,0) b(2,0) c(2,1) d(0,1)`, triangulated as `amd`,
/// `mcd`, `mbc`. The two bottom edges meet colinearly at `m`.
pub(crate) fn strip() -> Vec<Triangle> {
    let v = |x: f64, y: f64| MeshVertex::new(Point3::new(x, y, 0.0), Vector3::z());
    let (a, m, b) = (v(0.0, 0.0), v(1.0, 0.0), v(2.0, 0.0));
    let (c, d) = (v(2.0, 1.0), v(0.0, 1.0));
    vec![
        Triangle::new([a, m, d]),
        Triangle::new([m, c, d]),
        Triangle::new([m, b, c]),
    ]
}

/// Three narrow flat triangles touching only at the origin.
///
/// Every triangle sees more than two outline edges at its first corner.
pub(crate) fn fan() -> Vec<Triangle> {
    let v = |x: f64, y: f64| MeshVertex::new(Point3::new(x, y, 0.0), Vector3::z());
    let o = v(0.0, 0.0);
    vec![
        Triangle::new([o, v(1.0, -0.2), v(1.0, 0.2)]),
        Triangle::new([o, v(-1.0, 0.2), v(-1.0, -0.2)]),
        Triangle::new([o, v(0.2, 1.0), v(-0.2, 1.0)]),
    ]
}

/// A single needle triangle with its tip at the origin.
///
/// The two long edges are too opposed to link, so both end at the tip.
pub(crate) fn sliver() -> Vec<Triangle> {
    let v = |x: f64, y: f64| MeshVertex::new(Point3::new(x, y, 0.0), Vector3::z());
    vec![Triangle::new([v(0.0, 0.0), v(1.0, -0.002), v(1.0, 0.002)])]
}

/// Two right triangles touching only at the origin, one in the first
/// quadrant and one in the third.
pub(crate) fn bowtie() -> Vec<Triangle> {
    let v = |x: f64, y: f64| MeshVertex::new(Point3::new(x, y, 0.0), Vector3::z());
    let o = v(0.0, 0.0);
    vec![
        Triangle::new([o, v(1.0, 0.0), v(0.0, 1.0)]),
        Triangle::new([o, v(-1.0, 0.0), v(0.0, -1.0)]),
    ]
}
