use std::f64::consts::PI;

use crate::config::OutlineConfig;
use crate::hard_edge::{HardEdge, HardEdgeId, HardEdgeIndex};
use crate::math::intersect_2d::{Segment2D, Triangle2D};
use crate::math::{average, Plane, Point3, PositionKey, Vector3, TOLERANCE};
use crate::mesh::Triangle;

/// A hard edge re-expressed in one triangle's face plane.
///
/// Pair links are indices into the owning [`PlanarEdgeSet`]'s pair list.
#[derive(Debug, Clone, Copy)]
pub struct PlanarEdge {
    hard_edge: Option<HardEdgeId>,
    hard_prev: Option<HardEdgeId>,
    hard_next: Option<HardEdgeId>,
    p1: Point3,
    p2: Point3,
    outline_direction: Vector3,
    direction: Vector3,
    is_triangle_edge: bool,
    prev_pair: Option<usize>,
    next_pair: Option<usize>,
}

impl PlanarEdge {
    /// Projects `edge` into `plane`, the face plane of `triangle`.
    ///
    /// `id` is the edge's arena key, `None` for synthesized edges. Returns
    /// `None` if the edge collapses to a point in the plane.
    #[must_use]
    pub fn project(
        edge: &HardEdge,
        id: Option<HardEdgeId>,
        triangle: &Triangle,
        plane: &Plane,
        config: &OutlineConfig,
    ) -> Option<Self> {
        let p1 = plane.project_point(edge.p1());
        let p2 = plane.project_point(edge.p2());
        let direction = (p2 - p1).try_normalize(TOLERANCE)?;

        let decimals = config.tolerances.position_decimals;
        let normal_distance = (triangle.normal() - edge.face_normal()).norm();
        let is_triangle_edge = triangle
            .contains_position(PositionKey::new(edge.p1(), decimals), decimals)
            && triangle.contains_position(PositionKey::new(edge.p2(), decimals), decimals)
            && normal_distance <= config.tolerances.triangle_edge_normal;

        Some(Self {
            hard_edge: id,
            hard_prev: id.and(edge.prev()),
            hard_next: id.and(edge.next()),
            p1,
            p2,
            outline_direction: plane.project_vector(edge.outline_direction()),
            direction,
            is_triangle_edge,
            prev_pair: None,
            next_pair: None,
        })
    }

    /// Arena key of the underlying hard edge, `None` for synthesized edges.
    #[must_use]
    pub fn hard_edge(&self) -> Option<HardEdgeId> {
        self.hard_edge
    }

    #[must_use]
    pub fn p1(&self) -> &Point3 {
        &self.p1
    }

    #[must_use]
    pub fn p2(&self) -> &Point3 {
        &self.p2
    }

    /// Outline direction projected into the plane (not renormalized).
    #[must_use]
    pub fn outline_direction(&self) -> &Vector3 {
        &self.outline_direction
    }

    /// Unit direction from `p1` to `p2`.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }

    /// `true` if the edge is one of the triangle's own edges.
    #[must_use]
    pub fn is_triangle_edge(&self) -> bool {
        self.is_triangle_edge
    }

    /// Pair linking this edge to its chain predecessor.
    #[must_use]
    pub fn prev_pair(&self) -> Option<usize> {
        self.prev_pair
    }

    /// Pair linking this edge to its chain successor.
    #[must_use]
    pub fn next_pair(&self) -> Option<usize> {
        self.next_pair
    }

    /// Returns `true` if either endpoint is within `tolerance` of `vertex`.
    #[must_use]
    pub fn contains(&self, vertex: &Point3, tolerance: f64) -> bool {
        same_position(&self.p1, vertex, tolerance) || same_position(&self.p2, vertex, tolerance)
    }

    /// The endpoint shared with `other`, checking `p1` first.
    #[must_use]
    pub fn common_vertex(&self, other: &Self, tolerance: f64) -> Option<Point3> {
        if other.contains(&self.p1, tolerance) {
            Some(self.p1)
        } else if other.contains(&self.p2, tolerance) {
            Some(self.p2)
        } else {
            None
        }
    }

    /// The endpoint that is not `vertex`.
    #[must_use]
    pub fn opposite(&self, vertex: &Point3, tolerance: f64) -> Point3 {
        if same_position(&self.p1, vertex, tolerance) {
            self.p2
        } else {
            self.p1
        }
    }

    /// `true` if the edges share an endpoint and run in nearly the same direction.
    #[must_use]
    pub fn colinear(&self, other: &Self, config: &OutlineConfig) -> bool {
        let tol = &config.tolerances;
        if !(other.contains(&self.p1, tol.position_tolerance)
            || other.contains(&self.p2, tol.position_tolerance))
        {
            return false;
        }
        let angle = self.direction.angle(&other.direction);
        angle.is_nan() || angle < tol.colinear_angle
    }

    /// `true` if the underlying hard edge has a chain neighbour at `vertex`.
    ///
    /// Synthesized edges are never linked.
    #[must_use]
    pub fn is_vertex_linked(&self, vertex: &Point3, tolerance: f64) -> bool {
        if same_position(&self.p1, vertex, tolerance) {
            self.hard_prev.is_some()
        } else if same_position(&self.p2, vertex, tolerance) {
            self.hard_next.is_some()
        } else {
            false
        }
    }
}

fn same_position(a: &Point3, b: &Point3, tolerance: f64) -> bool {
    (a - b).norm() < tolerance
}

/// Angle swept by the outline when turning from `a` to `b` at their shared
/// vertex.
///
/// Twice the angle between the averaged outline direction and `a`'s
/// direction away from the shared vertex. Values at or above π mean the
/// offsets must be mitred. Returns `0.0` when the edges share no vertex or
/// their outline directions cancel out.
#[must_use]
pub fn turning_angle(a: &PlanarEdge, b: &PlanarEdge, tolerance: f64) -> f64 {
    let Some(common) = a.common_vertex(b, tolerance) else {
        return 0.0;
    };
    let Some(bisector) =
        average(&a.outline_direction, &b.outline_direction).try_normalize(TOLERANCE)
    else {
        return 0.0;
    };
    let away = a.opposite(&common, tolerance) - common;
    bisector.angle(&away) * 2.0
}

/// Two planar edges of the same triangle meeting at a shared vertex.
#[derive(Debug, Clone, Copy)]
pub struct PlanarEdgePair {
    edge1: usize,
    edge2: usize,
    common_vertex: Option<Point3>,
    total_angle: f64,
    angle_diff: f64,
    bisector: Vector3,
}

impl PlanarEdgePair {
    fn new(edges: &[PlanarEdge], edge1: usize, edge2: usize, tolerance: f64) -> Self {
        let (a, b) = (&edges[edge1], &edges[edge2]);
        Self {
            edge1,
            edge2,
            common_vertex: a.common_vertex(b, tolerance),
            total_angle: turning_angle(a, b, tolerance),
            angle_diff: a.outline_direction.angle(&b.outline_direction),
            bisector: average(&a.outline_direction, &b.outline_direction),
        }
    }

    /// Local index of the edge this pair was created from.
    #[must_use]
    pub fn edge1(&self) -> usize {
        self.edge1
    }

    /// Local index of the linked edge.
    #[must_use]
    pub fn edge2(&self) -> usize {
        self.edge2
    }

    #[must_use]
    pub fn common_vertex(&self) -> Option<&Point3> {
        self.common_vertex.as_ref()
    }

    /// Outline turning angle, see [`turning_angle`].
    #[must_use]
    pub fn total_angle(&self) -> f64 {
        self.total_angle
    }

    /// Angle between the two outline directions.
    #[must_use]
    pub fn angle_diff(&self) -> f64 {
        self.angle_diff
    }

    /// Unnormalized average of the two outline directions.
    #[must_use]
    pub fn bisector(&self) -> &Vector3 {
        &self.bisector
    }

    /// `true` if the outlines must be mitred at the common vertex.
    #[must_use]
    pub fn is_obtuse(&self) -> bool {
        self.total_angle >= PI
    }

    #[must_use]
    pub fn contains(&self, edge: usize) -> bool {
        self.edge1 == edge || self.edge2 == edge
    }

    /// `true` if both pairs join the same two edges, in either order.
    #[must_use]
    pub fn same_edges(&self, other: &Self) -> bool {
        self.contains(other.edge1) && self.contains(other.edge2)
    }
}

/// The planar edges relevant to one triangle and the pairs linking them.
///
/// Each edge keeps its own view of its links: the pair reached through an
/// edge's `prev_pair` was built from that edge, so its angles are measured
/// from that edge's side.
#[derive(Debug, Clone, Default)]
pub struct PlanarEdgeSet {
    edges: Vec<PlanarEdge>,
    pairs: Vec<PlanarEdgePair>,
}

impl PlanarEdgeSet {
    #[must_use]
    pub fn edges(&self) -> &[PlanarEdge] {
        &self.edges
    }

    #[must_use]
    pub fn pairs(&self) -> &[PlanarEdgePair] {
        &self.pairs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Local indices of the edges touching `vertex`.
    #[must_use]
    pub fn edges_at(&self, vertex: &Point3, tolerance: f64) -> Vec<usize> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| edge.contains(vertex, tolerance))
            .map(|(i, _)| i)
            .collect()
    }

    /// The pair joining `a` to `b`, as seen from `a`.
    #[must_use]
    pub fn connection(&self, a: usize, b: usize) -> Option<&PlanarEdgePair> {
        let edge = self.edges.get(a)?;
        [edge.prev_pair, edge.next_pair]
            .into_iter()
            .flatten()
            .map(|p| &self.pairs[p])
            .find(|pair| pair.contains(b))
    }

    /// `true` if `a` and `b` are distinct linked edges.
    #[must_use]
    pub fn is_connected(&self, a: usize, b: usize) -> bool {
        a != b && self.connection(a, b).is_some()
    }

    /// `true` if one of the edge's pairs must be mitred.
    #[must_use]
    pub fn is_used_in_intersection(&self, edge: usize) -> bool {
        self.edges.get(edge).is_some_and(|e| {
            [e.prev_pair, e.next_pair]
                .into_iter()
                .flatten()
                .any(|p| self.pairs[p].is_obtuse())
        })
    }

    /// Drops every link of `edge` that joins the same edges as `pair`.
    fn disconnect(&mut self, edge: usize, pair: &PlanarEdgePair) {
        let pairs = &self.pairs;
        let e = &mut self.edges[edge];
        if e.prev_pair.is_some_and(|p| pairs[p].same_edges(pair)) {
            e.prev_pair = None;
        }
        if e.next_pair.is_some_and(|p| pairs[p].same_edges(pair)) {
            e.next_pair = None;
        }
    }

    /// Keeps the edges for which `keep` is set, remapping pair links and
    /// dropping pairs that lost an edge.
    fn retain(&mut self, keep: &[bool]) {
        let mut edge_map = vec![None; self.edges.len()];
        let mut next_index = 0;
        for (i, &kept) in keep.iter().enumerate() {
            if kept {
                edge_map[i] = Some(next_index);
                next_index += 1;
            }
        }

        let mut pair_map = vec![None; self.pairs.len()];
        let mut pairs = Vec::with_capacity(self.pairs.len());
        for (i, pair) in self.pairs.iter().enumerate() {
            if let (Some(edge1), Some(edge2)) = (edge_map[pair.edge1], edge_map[pair.edge2]) {
                pair_map[i] = Some(pairs.len());
                pairs.push(PlanarEdgePair {
                    edge1,
                    edge2,
                    ..*pair
                });
            }
        }

        let edges = self
            .edges
            .iter()
            .zip(keep)
            .filter(|(_, &kept)| kept)
            .map(|(edge, _)| PlanarEdge {
                prev_pair: edge.prev_pair.and_then(|p| pair_map[p]),
                next_pair: edge.next_pair.and_then(|p| pair_map[p]),
                ..*edge
            })
            .collect();

        self.edges = edges;
        self.pairs = pairs;
    }
}

/// Projects the hard edges around a triangle into its face plane and drops
/// the ones whose outline cannot reach the triangle.
#[derive(Debug)]
pub struct PlanarEdgeProjector<'a> {
    index: &'a HardEdgeIndex,
    config: &'a OutlineConfig,
}

impl<'a> PlanarEdgeProjector<'a> {
    /// Creates a projector reading from `index`.
    #[must_use]
    pub fn new(index: &'a HardEdgeIndex, config: &'a OutlineConfig) -> Self {
        Self { index, config }
    }

    /// Builds the filtered planar edge set of `triangle`.
    #[must_use]
    pub fn execute(&self, triangle: &Triangle) -> PlanarEdgeSet {
        let plane = triangle.face_plane();
        let mut set = PlanarEdgeSet {
            edges: self
                .index
                .edges_for_triangle(triangle)
                .into_iter()
                .filter_map(|id| {
                    let edge = self.index.get(id)?;
                    PlanarEdge::project(edge, Some(id), triangle, &plane, self.config)
                })
                .collect(),
            pairs: Vec::new(),
        };

        let unique = self.link_pairs(&mut set);
        let keep = self.outline_reaches_triangle(&mut set, &unique, triangle, &plane);
        set.retain(&keep);
        set
    }

    /// Creates a pair for every chain link whose both ends are in the set.
    ///
    /// Returns the indices of the first pair created for each pair of edges.
    fn link_pairs(&self, set: &mut PlanarEdgeSet) -> Vec<usize> {
        let tolerance = self.config.tolerances.position_tolerance;
        let mut unique: Vec<usize> = Vec::new();

        for i in 0..set.edges.len() {
            let links = [set.edges[i].hard_prev, set.edges[i].hard_next];
            for (slot, link) in links.into_iter().enumerate() {
                let Some(target) = link else {
                    continue;
                };
                let Some(j) = set.edges.iter().position(|e| e.hard_edge == Some(target)) else {
                    continue;
                };

                let pair = PlanarEdgePair::new(&set.edges, i, j, tolerance);
                let pair_index = set.pairs.len();
                if !unique.iter().any(|&u| set.pairs[u].same_edges(&pair)) {
                    unique.push(pair_index);
                }
                set.pairs.push(pair);
                if slot == 0 {
                    set.edges[i].prev_pair = Some(pair_index);
                } else {
                    set.edges[i].next_pair = Some(pair_index);
                }
            }
        }

        unique
    }

    /// Tests each linked pair's offset lines against the triangle.
    ///
    /// Opposed pairs are unlinked. When exactly one of the two offsets misses
    /// the triangle, that edge is marked for removal.
    fn outline_reaches_triangle(
        &self,
        set: &mut PlanarEdgeSet,
        unique: &[usize],
        triangle: &Triangle,
        plane: &Plane,
    ) -> Vec<bool> {
        let tol = &self.config.tolerances;
        let thickness = self.config.outline_thickness();
        let mut keep = vec![true; set.edges.len()];

        for &pair_index in unique {
            let pair = set.pairs[pair_index];
            if pair.angle_diff >= tol.opposed_pair_angle {
                set.disconnect(pair.edge1, &pair);
                set.disconnect(pair.edge2, &pair);
                continue;
            }

            let Some(common) = pair.common_vertex else {
                continue;
            };
            let Some(frame) = plane.frame(&pair.bisector) else {
                continue;
            };

            let offset_line = |edge: &PlanarEdge| {
                let offset = edge.outline_direction * thickness;
                let far = edge.opposite(&common, tol.position_tolerance);
                Segment2D::new(frame.to_2d(&(common + offset)), frame.to_2d(&(far + offset)))
            };
            let (edge1, edge2) = (set.edges[pair.edge1], set.edges[pair.edge2]);
            let mut line1 = offset_line(&edge1);
            let mut line2 = offset_line(&edge2);

            if line1.is_parallel(&line2) {
                continue;
            }
            let Some(corner) = line1.line_intersection(&line2) else {
                continue;
            };
            line1.start = corner;
            line2.start = corner;

            let corners = (*triangle.vertices()).map(|v| frame.to_2d(&v.position));
            let triangle_2d = Triangle2D::new(corners);
            let good1 = edge1.is_triangle_edge || triangle_2d.intersects_segment(&line1);
            let good2 = edge2.is_triangle_edge || triangle_2d.intersects_segment(&line2);

            match (good1, good2) {
                (false, true) => keep[pair.edge1] = false,
                (true, false) => keep[pair.edge2] = false,
                _ => {}
            }
        }

        keep
    }
}
