use crate::config::OutlineConfig;
use crate::hard_edge::HardEdge;
use crate::math::{Plane, Point2, Point3, TOLERANCE};
use crate::mesh::Triangle;

use super::planar::PlanarEdge;

/// A planar edge seen from one triangle corner.
///
/// The frame is anchored at the corner with its X axis along the edge and
/// its Y axis pointing along the outline offset. `corners` holds the
/// triangle's three vertices in that frame.
#[derive(Debug, Clone, Copy)]
pub struct ProjectedEdge {
    edge: PlanarEdge,
    planar_index: Option<usize>,
    target_vertex: Point3,
    corners: [Point2; 3],
    min_x: f64,
    max_x: f64,
    pub(crate) needs_clip: bool,
    outside_triangle: bool,
    dead_end: bool,
}

impl ProjectedEdge {
    /// Projects `edge` into the frame at `vertex`.
    ///
    /// `planar_index` is the edge's index in its planar set, `None` for
    /// synthesized edges, which are not validated. Returns `None` if the
    /// edge runs along the triangle normal.
    #[must_use]
    pub fn project(
        edge: &PlanarEdge,
        planar_index: Option<usize>,
        triangle: &Triangle,
        vertex: &Point3,
        config: &OutlineConfig,
    ) -> Option<Self> {
        let frame = Plane::new(*vertex, *triangle.normal()).frame(edge.direction())?;
        let x1 = frame.to_2d(edge.p1()).x;
        let x2 = frame.to_2d(edge.p2()).x;

        let mut projected = Self {
            edge: *edge,
            planar_index,
            target_vertex: *vertex,
            corners: (*triangle.vertices()).map(|v| frame.to_2d(&v.position)),
            min_x: x1.min(x2),
            max_x: x1.max(x2),
            needs_clip: false,
            outside_triangle: false,
            dead_end: false,
        };
        if edge.hard_edge().is_some() {
            projected.validate(config);
        }
        Some(projected)
    }

    /// Sets the clipping, outside and dead-end flags from the triangle's
    /// extent around the edge.
    fn validate(&mut self, config: &OutlineConfig) {
        let thickness = config.outline_thickness();
        let (min_y, max_y) = self.y_range();

        if min_y < 0.0 && min_y.abs() > thickness {
            self.needs_clip = true;
        }
        if max_y < thickness && max_y - min_y > thickness {
            self.outside_triangle = true;
        }
        if !self
            .edge
            .is_vertex_linked(&self.target_vertex, config.tolerances.position_tolerance)
        {
            self.dead_end = true;
            self.needs_clip = true;
        }
    }

    fn y_range(&self) -> (f64, f64) {
        self.corners
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)))
    }

    /// Builds the perpendicular edge that bounds a dead-end outline at
    /// `vertex`.
    ///
    /// The clipping edge starts at the vertex, runs along this edge's outline
    /// direction and offsets away from this edge's far end. It always needs
    /// clipping.
    #[must_use]
    pub fn clipping_edge(
        &self,
        triangle: &Triangle,
        face_plane: &Plane,
        config: &OutlineConfig,
    ) -> Option<Self> {
        let tolerance = config.tolerances.position_tolerance;
        let vertex = self.target_vertex;
        let far = self.edge.opposite(&vertex, tolerance);
        let outline_direction = (vertex - far).try_normalize(TOLERANCE)?;

        let mut hard = HardEdge::new(
            vertex,
            vertex + self.edge.outline_direction(),
            *face_plane.plane_normal(),
            outline_direction,
        );
        hard.correct_order(config.tolerances.order_correction_distance);

        let planar = PlanarEdge::project(&hard, None, triangle, face_plane, config)?;
        let mut clip = Self::project(&planar, None, triangle, &vertex, config)?;
        clip.needs_clip = true;
        Some(clip)
    }

    /// The planar edge this projection was built from.
    #[must_use]
    pub fn edge(&self) -> &PlanarEdge {
        &self.edge
    }

    /// Index of the source edge in its planar set, `None` if synthesized.
    #[must_use]
    pub fn planar_index(&self) -> Option<usize> {
        self.planar_index
    }

    /// The triangle corner the frame is anchored at.
    #[must_use]
    pub fn target_vertex(&self) -> &Point3 {
        &self.target_vertex
    }

    /// Triangle vertices in the edge frame.
    #[must_use]
    pub fn corners(&self) -> &[Point2; 3] {
        &self.corners
    }

    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// `true` if the outline must be intersected with a partner edge.
    #[must_use]
    pub fn needs_clip(&self) -> bool {
        self.needs_clip
    }

    /// `true` if the offset outline misses the triangle.
    #[must_use]
    pub fn is_outside_triangle(&self) -> bool {
        self.outside_triangle
    }

    /// `true` if the hard edge has no chain neighbour at the target vertex.
    #[must_use]
    pub fn is_dead_end(&self) -> bool {
        self.dead_end
    }

    /// Corner coordinates shifted so the smallest X is zero, then divided by
    /// `multiplier`.
    #[must_use]
    pub fn normalized_coords(&self, multiplier: f64) -> [Point2; 3] {
        let min_x = self.corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        self.corners
            .map(|p| Point2::new((p.x - min_x) / multiplier, p.y / multiplier))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::hard_edge::HardEdgeIndex;
    use crate::math::Vector3;
    use crate::mesh::fixtures;
    use crate::outline::planar::PlanarEdgeProjector;
    use approx::assert_relative_eq;

    fn first_corner_projection(triangles: &[Triangle], tri: usize) -> Vec<ProjectedEdge> {
        let config = OutlineConfig::default();
        let index = HardEdgeIndex::build(triangles, &config);
        let set = PlanarEdgeProjector::new(&index, &config).execute(&triangles[tri]);
        let vertex = triangles[tri].vertices()[0].position;
        set.edges_at(&vertex, config.tolerances.position_tolerance)
            .into_iter()
            .map(|i| {
                ProjectedEdge::project(&set.edges()[i], Some(i), &triangles[tri], &vertex, &config)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn triangle_lies_on_the_outline_side() {
        let triangles = fixtures::single_triangle(1.0);
        let projections = first_corner_projection(&triangles, 0);
        assert_eq!(projections.len(), 2);
        for p in &projections {
            assert!(p.corners().iter().all(|c| c.y > -1e-9));
            assert!(!p.needs_clip());
            assert!(!p.is_outside_triangle());
            assert!(!p.is_dead_end());
            assert_relative_eq!(p.max_x() - p.min_x(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn synthesized_edges_skip_validation() {
        let config = OutlineConfig::default();
        let triangles = fixtures::single_triangle(1.0);
        let tri = &triangles[0];
        let hard = HardEdge::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Vector3::z(),
            Vector3::y(),
        );
        let plane = tri.face_plane();
        let planar = PlanarEdge::project(&hard, None, tri, &plane, &config).unwrap();
        let projected =
            ProjectedEdge::project(&planar, None, tri, &Point3::origin(), &config).unwrap();
        assert!(!projected.is_dead_end());
        assert!(!projected.needs_clip());
    }

    #[test]
    fn open_chain_end_needs_clipping() {
        // Floor of the smooth fold with a vertex-normal crease metric: the
        // floor's three boundary edges form an open chain.
        let config = OutlineConfig::default()
            .with_crease_metric(crate::config::CreaseMetric::VertexNormal);
        let triangles = fixtures::smooth_fold();
        let index = HardEdgeIndex::build(&triangles, &config);
        let set = PlanarEdgeProjector::new(&index, &config).execute(&triangles[0]);

        let origin = Point3::origin();
        let ends: Vec<_> = set
            .edges_at(&origin, config.tolerances.position_tolerance)
            .into_iter()
            .map(|i| {
                ProjectedEdge::project(&set.edges()[i], Some(i), &triangles[0], &origin, &config)
                    .unwrap()
            })
            .collect();
        assert_eq!(ends.len(), 1);
        assert!(ends[0].is_dead_end());
        assert!(ends[0].needs_clip());
    }

    #[test]
    fn clipping_edge_is_perpendicular() {
        let triangles = fixtures::single_triangle(1.0);
        let config = OutlineConfig::default();
        let base = first_corner_projection(&triangles, 0)[0];
        let clip = base
            .clipping_edge(&triangles[0], &triangles[0].face_plane(), &config)
            .unwrap();
        assert!(clip.needs_clip());
        assert!(clip.planar_index().is_none());
        assert_relative_eq!(
            clip.edge().direction().dot(base.edge().direction()),
            0.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(*clip.target_vertex(), *base.target_vertex());
    }

    #[test]
    fn normalized_coords_start_at_zero_and_scale() {
        let triangles = fixtures::single_triangle(1.0);
        let p = first_corner_projection(&triangles, 0)[0];
        let unit = p.normalized_coords(1.0);
        let double = p.normalized_coords(2.0);
        let min_x = unit.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
        assert_relative_eq!(min_x, 0.0);
        for (a, b) in unit.iter().zip(&double) {
            assert_relative_eq!(a.x, b.x * 2.0, epsilon = 1e-12);
            assert_relative_eq!(a.y, b.y * 2.0, epsilon = 1e-12);
        }
    }
}
