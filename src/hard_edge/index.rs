use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;
use tracing::debug;

use crate::config::OutlineConfig;
use crate::math::{EdgeKey, Point3, PositionKey};
use crate::mesh::Triangle;

use super::detect::detect_hard_edges;
use super::{EdgeChain, HardEdge, HardEdgeId};

/// Which endpoint of an edge a neighbour is searched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    P1,
    P2,
}

/// All hard edges of a mesh, linked into chains and indexed by vertex.
///
/// Edges live in a [`SlotMap`] arena; chain links are [`HardEdgeId`]s into
/// the same arena.
#[derive(Debug, Clone)]
pub struct HardEdgeIndex {
    edges: SlotMap<HardEdgeId, HardEdge>,
    by_position: HashMap<PositionKey, Vec<HardEdgeId>>,
    order: Vec<HardEdgeId>,
    break_angle: f64,
    link_outline_angle: f64,
    decimals: i32,
}

impl HardEdgeIndex {
    /// Detects the hard edges of `triangles` and links them into chains.
    #[must_use]
    pub fn build(triangles: &[Triangle], config: &OutlineConfig) -> Self {
        let detection = detect_hard_edges(triangles, config);
        let decimals = config.tolerances.position_decimals;

        let mut index = Self {
            edges: SlotMap::with_capacity_and_key(detection.edges.len()),
            by_position: HashMap::new(),
            order: Vec::with_capacity(detection.edges.len()),
            break_angle: config.break_angle_rad(),
            link_outline_angle: config.tolerances.link_outline_angle,
            decimals,
        };

        for edge in detection.edges {
            let keys = [
                PositionKey::new(edge.p1(), decimals),
                PositionKey::new(edge.p2(), decimals),
            ];
            let id = index.edges.insert(edge);
            index.order.push(id);
            for key in keys {
                index.by_position.entry(key).or_default().push(id);
            }
        }

        index.link_edges();

        debug!(
            hard_edges = index.len(),
            boundary = detection.boundary,
            creases = detection.creases,
            vertices = index.by_position.len(),
            "hard edge index built"
        );

        index
    }

    /// Links each edge to at most one neighbour at each endpoint.
    ///
    /// Links are set in pairs: an edge's `prev` and the neighbour's `next`.
    /// Edges are visited in detection order so the result is deterministic.
    fn link_edges(&mut self) {
        for i in 0..self.order.len() {
            let id = self.order[i];

            if self.edges[id].prev.is_none() {
                if let Some(other) = self.shared_vertex_neighbour(id, Endpoint::P1) {
                    self.edges[id].prev = Some(other);
                    self.edges[other].next = Some(id);
                }
            }

            if self.edges[id].next.is_none() {
                if let Some(other) = self.shared_vertex_neighbour(id, Endpoint::P2) {
                    self.edges[id].next = Some(other);
                    self.edges[other].prev = Some(id);
                }
            }
        }
    }

    /// Best unlinked neighbour of `id` at one of its endpoints.
    ///
    /// Candidates must have a face normal within the break angle and an
    /// outline direction within the link limit. The smallest face-normal
    /// angle wins, ties broken by the outline angle, then by detection order.
    ///
    /// Only neighbours whose opposite link is still free are considered, so
    /// an edge already claimed at this vertex is never relinked. The chosen
    /// edge is therefore the best free candidate, not necessarily the best
    /// one overall.
    fn shared_vertex_neighbour(&self, id: HardEdgeId, end: Endpoint) -> Option<HardEdgeId> {
        let edge = &self.edges[id];
        let vertex = match end {
            Endpoint::P1 => edge.p1(),
            Endpoint::P2 => edge.p2(),
        };

        self.edges_at(vertex)
            .iter()
            .filter(|&&other_id| other_id != id)
            .filter(|&&other_id| {
                let other = &self.edges[other_id];
                match end {
                    Endpoint::P1 => other.next.is_none(),
                    Endpoint::P2 => other.prev.is_none(),
                }
            })
            .filter_map(|&other_id| {
                let other = &self.edges[other_id];
                let face_angle = edge.face_normal().angle(other.face_normal());
                let outline_angle = edge.outline_direction().angle(other.outline_direction());
                (face_angle <= self.break_angle && outline_angle <= self.link_outline_angle)
                    .then_some((other_id, face_angle, outline_angle))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.2.total_cmp(&b.2)))
            .map(|(other_id, _, _)| other_id)
    }

    /// Number of hard edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the mesh has no hard edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Returns the edge with the given id.
    #[must_use]
    pub fn get(&self, id: HardEdgeId) -> Option<&HardEdge> {
        self.edges.get(id)
    }

    /// Iterates over all edges in detection order.
    pub fn iter(&self) -> impl Iterator<Item = (HardEdgeId, &HardEdge)> {
        self.order.iter().map(|&id| (id, &self.edges[id]))
    }

    /// Rounding precision used for position lookups.
    #[must_use]
    pub fn decimals(&self) -> i32 {
        self.decimals
    }

    /// Hard edges having `vertex` as an endpoint, in detection order.
    ///
    /// Returns an empty slice for vertices on no hard edge.
    #[must_use]
    pub fn edges_at(&self, vertex: &Point3) -> &[HardEdgeId] {
        self.by_position
            .get(&PositionKey::new(vertex, self.decimals))
            .map_or(&[], Vec::as_slice)
    }

    /// Hard edges touching any corner of `triangle` whose edge normal is
    /// within the break angle of the triangle's normal.
    ///
    /// Each edge appears once, in corner order.
    #[must_use]
    pub fn edges_for_triangle(&self, triangle: &Triangle) -> Vec<HardEdgeId> {
        let mut seen = HashSet::new();
        triangle
            .vertices()
            .iter()
            .flat_map(|v| self.edges_at(&v.position).iter().copied())
            .filter(|&id| {
                triangle.normal().angle(self.edges[id].edge_normal()) <= self.break_angle
            })
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// The chain containing `start`, in `next` order.
    ///
    /// Returns an empty chain for unknown ids.
    #[must_use]
    pub fn chain(&self, start: HardEdgeId) -> EdgeChain {
        if !self.edges.contains_key(start) {
            return EdgeChain::default();
        }

        let mut visited = HashSet::from([start]);
        let mut forward = vec![start];
        let mut current = start;
        while let Some(next) = self.edges[current].next {
            if next == start {
                return EdgeChain {
                    edges: forward,
                    closed: true,
                };
            }
            if !visited.insert(next) {
                break;
            }
            forward.push(next);
            current = next;
        }

        let mut backward = Vec::new();
        current = start;
        while let Some(prev) = self.edges[current].prev {
            if !visited.insert(prev) {
                break;
            }
            backward.push(prev);
            current = prev;
        }

        backward.reverse();
        backward.extend(forward);
        EdgeChain {
            edges: backward,
            closed: false,
        }
    }

    /// Distinct hard-edge segments, ignoring which face they were seen from.
    #[must_use]
    pub fn segments(&self) -> Vec<EdgeKey> {
        let mut seen = HashSet::new();
        self.iter()
            .filter_map(|(_, edge)| edge.key(self.decimals))
            .filter(|key| seen.insert(*key))
            .collect()
    }
}
