mod detect;
mod index;

pub use index::HardEdgeIndex;

use crate::math::{
    average, perpendicular_towards, round_vector, EdgeKey, Point3, PositionKey, Vector3,
    TOLERANCE,
};
use crate::mesh::Triangle;

slotmap::new_key_type! {
    /// Unique identifier for a hard edge in a [`HardEdgeIndex`].
    pub struct HardEdgeId;
}

/// A sharp mesh edge seen from one of its adjoining faces.
///
/// The same geometric segment yields one `HardEdge` per face it is sharp
/// for. `prev`/`next` link edges sharing an endpoint into chains; they are
/// `None` at chain ends.
#[derive(Debug, Clone)]
pub struct HardEdge {
    p1: Point3,
    p2: Point3,
    face_normal: Vector3,
    edge_normal: Vector3,
    outline_direction: Vector3,
    triangle: Option<usize>,
    pub(crate) prev: Option<HardEdgeId>,
    pub(crate) next: Option<HardEdgeId>,
}

impl HardEdge {
    /// Creates a free-standing edge that belongs to no mesh triangle.
    ///
    /// The edge normal is taken to be the face normal.
    #[must_use]
    pub fn new(p1: Point3, p2: Point3, face_normal: Vector3, outline_direction: Vector3) -> Self {
        Self {
            p1,
            p2,
            face_normal,
            edge_normal: face_normal,
            outline_direction,
            triangle: None,
            prev: None,
            next: None,
        }
    }

    /// Builds the hard edge `key` as seen from `triangle`.
    ///
    /// Positions, normals and the outline direction are rounded to `decimals`.
    /// Returns `None` if the triangle does not contain both endpoints or is
    /// too degenerate to define an outline direction.
    pub(crate) fn from_triangle(
        key: EdgeKey,
        triangle_index: usize,
        triangle: &Triangle,
        decimals: i32,
    ) -> Option<Self> {
        let (k1, k2) = key.endpoints();
        let p1 = k1.to_point(decimals);
        let p2 = k2.to_point(decimals);
        let face_normal = round_vector(triangle.normal(), decimals);
        let edge_normal = edge_normal(triangle, key, decimals)?;
        let outline_direction = perpendicular_towards(&p1, &p2, &triangle.center())?;

        Some(Self {
            p1,
            p2,
            face_normal,
            edge_normal,
            outline_direction: round_vector(&outline_direction, decimals),
            triangle: Some(triangle_index),
            prev: None,
            next: None,
        })
    }

    /// Orders the endpoints so that `direction × outline_direction` points
    /// along the face normal.
    ///
    /// The endpoints are swapped only when the cross product is further than
    /// `max_distance` from the face normal and the swapped orientation is
    /// closer; applying the correction twice changes nothing.
    pub fn correct_order(&mut self, max_distance: f64) {
        let Some(line) = (self.p2 - self.p1).try_normalize(TOLERANCE) else {
            return;
        };
        let cross = line.cross(&self.outline_direction);
        let distance = (cross - self.face_normal).norm();
        if distance > max_distance && (-cross - self.face_normal).norm() < distance {
            std::mem::swap(&mut self.p1, &mut self.p2);
        }
    }

    /// First endpoint.
    #[must_use]
    pub fn p1(&self) -> &Point3 {
        &self.p1
    }

    /// Second endpoint.
    #[must_use]
    pub fn p2(&self) -> &Point3 {
        &self.p2
    }

    /// Rounded normal of the originating face.
    #[must_use]
    pub fn face_normal(&self) -> &Vector3 {
        &self.face_normal
    }

    /// Rounded average of the endpoint vertex normals.
    #[must_use]
    pub fn edge_normal(&self) -> &Vector3 {
        &self.edge_normal
    }

    /// Unit vector in the face plane, perpendicular to the edge, pointing
    /// from the edge into the originating face.
    #[must_use]
    pub fn outline_direction(&self) -> &Vector3 {
        &self.outline_direction
    }

    /// Index of the originating triangle, `None` for free-standing edges.
    #[must_use]
    pub fn triangle(&self) -> Option<usize> {
        self.triangle
    }

    /// Edge linked at `p1`.
    #[must_use]
    pub fn prev(&self) -> Option<HardEdgeId> {
        self.prev
    }

    /// Edge linked at `p2`.
    #[must_use]
    pub fn next(&self) -> Option<HardEdgeId> {
        self.next
    }

    /// Undirected key of the segment.
    #[must_use]
    pub fn key(&self, decimals: i32) -> Option<EdgeKey> {
        EdgeKey::new(
            PositionKey::new(&self.p1, decimals),
            PositionKey::new(&self.p2, decimals),
        )
    }
}

/// Averaged vertex normal along `key` inside `triangle`, rounded.
///
/// Opposed vertex normals fall back to the face normal.
fn edge_normal(triangle: &Triangle, key: EdgeKey, decimals: i32) -> Option<Vector3> {
    let (k1, k2) = key.endpoints();
    let v1 = triangle.vertex_at(k1, decimals)?;
    let v2 = triangle.vertex_at(k2, decimals)?;
    let normal = average(&v1.normal, &v2.normal)
        .try_normalize(TOLERANCE)
        .unwrap_or(*triangle.normal());
    Some(round_vector(&normal, decimals))
}

/// A run of hard edges connected through `next` links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeChain {
    /// Edges in `next` order.
    pub edges: Vec<HardEdgeId>,
    /// `true` when the last edge links back to the first.
    pub closed: bool,
}
