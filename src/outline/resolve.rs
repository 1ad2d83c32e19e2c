use std::f64::consts::PI;

use crate::config::OutlineConfig;
use crate::math::{Plane, Point3};
use crate::mesh::Triangle;

use super::planar::{turning_angle, PlanarEdgeSet};
use super::projected::ProjectedEdge;

/// Outcome of resolving one triangle corner.
#[derive(Debug, Clone)]
pub enum VertexResolution {
    /// No outline passes through the corner.
    None,
    /// One edge, drawn on its own.
    Single(ProjectedEdge),
    /// A dead-end edge bounded by a synthesized clipping edge.
    Clipped {
        edge: ProjectedEdge,
        clip: ProjectedEdge,
    },
    /// Two edges meeting at the corner.
    Pair {
        first: ProjectedEdge,
        second: ProjectedEdge,
    },
    /// More than two edges remain; nothing is emitted.
    Unresolved { edge_count: usize },
}

/// One coordinate-pair slot worth of edges.
#[derive(Debug, Clone, Copy)]
pub struct Emission {
    pub first: ProjectedEdge,
    pub second: Option<ProjectedEdge>,
}

impl Emission {
    /// `true` if the emission carries a partner edge.
    #[must_use]
    pub fn is_combined(&self) -> bool {
        self.second.is_some()
    }
}

impl VertexResolution {
    /// The slots this resolution fills.
    #[must_use]
    pub fn emissions(&self) -> Vec<Emission> {
        match self {
            Self::None | Self::Unresolved { .. } => Vec::new(),
            Self::Single(edge) => vec![Emission {
                first: *edge,
                second: None,
            }],
            Self::Clipped { edge, clip } => vec![Emission {
                first: *edge,
                second: Some(*clip),
            }],
            Self::Pair { first, second } => vec![Emission {
                first: *first,
                second: Some(*second),
            }],
        }
    }
}

/// Reduces the planar edges at each corner of a triangle to at most two.
#[derive(Debug)]
pub struct VertexOutlineResolver<'a> {
    triangle: &'a Triangle,
    set: &'a PlanarEdgeSet,
    config: &'a OutlineConfig,
    face_plane: Plane,
}

impl<'a> VertexOutlineResolver<'a> {
    /// Creates a resolver for `triangle` over its filtered planar edges.
    #[must_use]
    pub fn new(triangle: &'a Triangle, set: &'a PlanarEdgeSet, config: &'a OutlineConfig) -> Self {
        Self {
            triangle,
            set,
            config,
            face_plane: triangle.face_plane(),
        }
    }

    /// Resolves the corner at index `corner` (0..3).
    #[must_use]
    pub fn resolve(&self, corner: usize) -> VertexResolution {
        let Some(vertex) = self.triangle.vertices().get(corner).map(|v| v.position) else {
            return VertexResolution::None;
        };
        let tolerance = self.config.tolerances.position_tolerance;

        let candidates = self.prune_dangling(self.set.edges_at(&vertex, tolerance));

        let mut projections: Vec<ProjectedEdge> = candidates
            .into_iter()
            .filter_map(|i| {
                ProjectedEdge::project(
                    &self.set.edges()[i],
                    Some(i),
                    self.triangle,
                    &vertex,
                    self.config,
                )
            })
            .filter(|p| !p.is_outside_triangle())
            .collect();

        self.keep_closest_dead_end(&mut projections, &vertex);

        match projections.as_slice() {
            [] => VertexResolution::None,
            [edge] => self.resolve_single(*edge),
            [first, second] => self.resolve_pair(*first, *second),
            many => VertexResolution::Unresolved {
                edge_count: many.len(),
            },
        }
    }

    /// Drops edges that take part in a mitred joint with an edge that does
    /// not reach this corner.
    fn prune_dangling(&self, mut candidates: Vec<usize>) -> Vec<usize> {
        let intersecting: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| self.set.is_used_in_intersection(i))
            .collect();

        for edge in intersecting {
            if !candidates.iter().any(|&other| self.set.is_connected(edge, other)) {
                candidates.retain(|&c| c != edge);
            }
        }
        candidates
    }

    /// Of several dead ends, keeps the one whose outline offset points most
    /// towards the triangle centroid.
    fn keep_closest_dead_end(&self, projections: &mut Vec<ProjectedEdge>, vertex: &Point3) {
        if projections.iter().filter(|p| p.is_dead_end()).count() < 2 {
            return;
        }
        let center = self.triangle.center();
        let distance = |p: &ProjectedEdge| (vertex + p.edge().outline_direction() - center).norm();
        let keep = projections
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_dead_end())
            .min_by(|(_, a), (_, b)| distance(a).total_cmp(&distance(b)))
            .map(|(i, _)| i);

        let mut index = 0;
        projections.retain(|p| {
            let kept = !p.is_dead_end() || Some(index) == keep;
            index += 1;
            kept
        });
    }

    fn resolve_single(&self, edge: ProjectedEdge) -> VertexResolution {
        if !edge.needs_clip() {
            return VertexResolution::Single(edge);
        }
        match edge.clipping_edge(self.triangle, &self.face_plane, self.config) {
            Some(clip) => VertexResolution::Clipped { edge, clip },
            None => VertexResolution::Single(edge),
        }
    }

    fn resolve_pair(
        &self,
        mut first: ProjectedEdge,
        mut second: ProjectedEdge,
    ) -> VertexResolution {
        let (a, b) = (first.edge(), second.edge());
        if a.colinear(b, self.config) && !(first.needs_clip() || second.needs_clip()) {
            return VertexResolution::Single(first);
        }

        let linked = match (first.planar_index(), second.planar_index()) {
            (Some(i), Some(j)) => self.set.connection(i, j),
            _ => None,
        };
        let must_intersect = match linked {
            Some(pair) => pair.is_obtuse(),
            None => turning_angle(a, b, self.config.tolerances.position_tolerance) >= PI,
        };

        if must_intersect {
            first.needs_clip = true;
            second.needs_clip = true;
        }
        VertexResolution::Pair { first, second }
    }
}
