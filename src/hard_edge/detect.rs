use std::collections::HashMap;

use crate::config::{CreaseMetric, OutlineConfig};
use crate::math::{round_vector, EdgeKey, PositionKey, Vector3};
use crate::mesh::Triangle;

use super::{edge_normal, HardEdge};

/// Hard edges found in a mesh, in discovery order.
#[derive(Debug, Default)]
pub(super) struct Detection {
    pub edges: Vec<HardEdge>,
    pub boundary: usize,
    pub creases: usize,
}

/// Groups triangles by the undirected edges they contain.
///
/// Groups keep first-seen order so results do not depend on hash order.
/// Zero-length edges are skipped.
fn shared_edges(triangles: &[Triangle], decimals: i32) -> Vec<(EdgeKey, Vec<usize>)> {
    let mut slots: HashMap<EdgeKey, usize> = HashMap::new();
    let mut shared: Vec<(EdgeKey, Vec<usize>)> = Vec::new();

    for (tri_idx, triangle) in triangles.iter().enumerate() {
        for (a, b) in triangle.edges() {
            let Some(key) = EdgeKey::new(
                PositionKey::new(&a.position, decimals),
                PositionKey::new(&b.position, decimals),
            ) else {
                continue;
            };
            let slot = *slots.entry(key).or_insert_with(|| {
                shared.push((key, Vec::new()));
                shared.len() - 1
            });
            shared[slot].1.push(tri_idx);
        }
    }

    shared
}

/// The normal compared against the other owners of `key`.
fn crease_normal(
    triangle: &Triangle,
    key: EdgeKey,
    metric: CreaseMetric,
    decimals: i32,
) -> Option<Vector3> {
    match metric {
        CreaseMetric::FaceNormal => Some(round_vector(triangle.normal(), decimals)),
        CreaseMetric::VertexNormal => edge_normal(triangle, key, decimals),
    }
}

/// Finds every hard edge of the mesh.
///
/// An edge owned by a single triangle is a boundary and always hard. A shared
/// edge is hard for an owner when no other owner's normal is within the break
/// angle of its own.
pub(super) fn detect_hard_edges(triangles: &[Triangle], config: &OutlineConfig) -> Detection {
    let decimals = config.tolerances.position_decimals;
    let break_angle = config.break_angle_rad();
    let mut detection = Detection::default();

    for (key, owners) in shared_edges(triangles, decimals) {
        if let [owner] = owners.as_slice() {
            if let Some(edge) = HardEdge::from_triangle(key, *owner, &triangles[*owner], decimals) {
                detection.edges.push(edge);
                detection.boundary += 1;
            }
            continue;
        }

        let normals: Vec<Option<Vector3>> = owners
            .iter()
            .map(|&t| crease_normal(&triangles[t], key, config.crease_metric, decimals))
            .collect();

        for (i, &owner) in owners.iter().enumerate() {
            let Some(normal) = normals[i] else {
                continue;
            };
            let has_close_face = normals
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.is_some_and(|n| n.angle(&normal) < break_angle));
            if has_close_face {
                continue;
            }
            if let Some(edge) = HardEdge::from_triangle(key, owner, &triangles[owner], decimals) {
                detection.edges.push(edge);
                detection.creases += 1;
            }
        }
    }

    let max_distance = config.tolerances.order_correction_distance;
    for edge in &mut detection.edges {
        edge.correct_order(max_distance);
    }

    detection
}
