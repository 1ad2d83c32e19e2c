use std::fmt;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::config::OutlineConfig;
use crate::error::Result;
use crate::hard_edge::HardEdgeIndex;
use crate::math::EdgeKey;
use crate::mesh::{Triangle, TriangleMesh};

use super::planar::PlanarEdgeProjector;
use super::resolve::{Emission, VertexOutlineResolver, VertexResolution};
use super::writer::{OutlineBuffer, OutlineCoordinateWriter, OutlineSink, PAIRS_PER_VERTEX};

/// Resolved outline of one triangle, ready to be written.
#[derive(Debug, Clone, Default)]
pub struct TriangleOutline {
    /// At most three emissions, combined pairs first.
    pub emissions: Vec<Emission>,
    /// Emissions that did not fit in the three slots.
    ///
    /// Each corner currently yields at most one emission, so this stays zero
    /// unless a resolution starts producing more.
    pub dropped: usize,
    /// Corners left without outline because too many edges met there.
    pub unresolved: usize,
}

/// Counters collected during one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutlineStats {
    pub triangles: usize,
    pub hard_edges: usize,
    /// Triangles that received at least one coordinate pair.
    pub outlined_triangles: usize,
    pub emitted_pairs: usize,
    pub dropped_pairs: usize,
    pub unresolved_vertices: usize,
}

impl fmt::Display for OutlineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Outlines: {} hard edges, {}/{} triangles outlined ({} pairs, {} dropped, {} unresolved vertices)",
            self.hard_edges,
            self.outlined_triangles,
            self.triangles,
            self.emitted_pairs,
            self.dropped_pairs,
            self.unresolved_vertices
        )
    }
}

/// Result of [`OutlineGenerator::execute`].
#[derive(Debug, Clone)]
pub struct OutlineResult {
    pub buffer: OutlineBuffer,
    pub stats: OutlineStats,
}

/// Generates per-corner outline coordinates for a triangle mesh.
#[derive(Debug, Clone)]
pub struct OutlineGenerator {
    config: OutlineConfig,
}

impl Default for OutlineGenerator {
    fn default() -> Self {
        Self {
            config: OutlineConfig::default(),
        }
    }
}

impl OutlineGenerator {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::ParameterOutOfRange`] if the
    /// configuration is invalid.
    pub fn new(config: OutlineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Detects and links the hard edges of `triangles`.
    #[must_use]
    pub fn build_index(&self, triangles: &[Triangle]) -> HardEdgeIndex {
        HardEdgeIndex::build(triangles, &self.config)
    }

    /// Distinct hard-edge segments of `triangles`.
    #[must_use]
    pub fn hard_edge_segments(&self, triangles: &[Triangle]) -> Vec<EdgeKey> {
        self.build_index(triangles).segments()
    }

    /// Resolves all three corners of `triangle`.
    #[must_use]
    pub fn outline_triangle(&self, index: &HardEdgeIndex, triangle: &Triangle) -> TriangleOutline {
        let set = PlanarEdgeProjector::new(index, &self.config).execute(triangle);
        let resolver = VertexOutlineResolver::new(triangle, &set, &self.config);

        let mut emissions = Vec::new();
        let mut unresolved = 0;
        for corner in 0..3 {
            let resolution = resolver.resolve(corner);
            if let VertexResolution::Unresolved { edge_count } = resolution {
                trace!(corner, edge_count, "too many outline edges at vertex");
                unresolved += 1;
            }
            emissions.extend(resolution.emissions());
        }

        let dropped = cap_emissions(&mut emissions);

        TriangleOutline {
            emissions,
            dropped,
            unresolved,
        }
    }

    /// Generates outlines into a new [`OutlineBuffer`].
    #[must_use]
    pub fn execute(&self, triangles: &[Triangle]) -> OutlineResult {
        let mut buffer = OutlineBuffer::new(triangles.len());
        let stats = self.execute_into(triangles, &mut buffer);
        OutlineResult { buffer, stats }
    }

    /// Generates outlines for an indexed mesh.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::MeshError`] if the mesh's index or normal
    /// buffers are inconsistent.
    pub fn execute_mesh(&self, mesh: &TriangleMesh) -> Result<OutlineResult> {
        let triangles = mesh.triangles()?;
        Ok(self.execute(&triangles))
    }

    /// Generates outlines and writes them to `sink`.
    ///
    /// Triangles are addressed in `sink` by their position in `triangles`.
    pub fn execute_into<S: OutlineSink + ?Sized>(
        &self,
        triangles: &[Triangle],
        sink: &mut S,
    ) -> OutlineStats {
        info!(
            triangles = triangles.len(),
            break_angle = self.config.break_angle_deg,
            thickness = self.config.outline_thickness(),
            "Generating outlines"
        );

        let start = Instant::now();
        let index = self.build_index(triangles);
        info!(
            hard_edges = index.len(),
            elapsed = ?start.elapsed(),
            "Hard edges calculated"
        );

        let start = Instant::now();
        let outlines: Vec<TriangleOutline> = if self.config.parallel {
            triangles
                .par_iter()
                .map(|triangle| self.outline_triangle(&index, triangle))
                .collect()
        } else {
            triangles
                .iter()
                .map(|triangle| self.outline_triangle(&index, triangle))
                .collect()
        };

        let writer = OutlineCoordinateWriter::new(self.config.thickness_multiplier);
        let mut stats = OutlineStats {
            triangles: triangles.len(),
            hard_edges: index.len(),
            ..OutlineStats::default()
        };
        for (tri_idx, outline) in outlines.iter().enumerate() {
            for (pair_index, emission) in outline.emissions.iter().enumerate() {
                writer.write(sink, tri_idx, pair_index, emission);
            }
            if !outline.emissions.is_empty() {
                stats.outlined_triangles += 1;
            }
            stats.emitted_pairs += outline.emissions.len();
            stats.dropped_pairs += outline.dropped;
            stats.unresolved_vertices += outline.unresolved;
        }

        debug!(
            outlined = stats.outlined_triangles,
            pairs = stats.emitted_pairs,
            dropped = stats.dropped_pairs,
            unresolved = stats.unresolved_vertices,
            "Outline statistics"
        );
        info!(elapsed = ?start.elapsed(), "Outlines calculated");

        stats
    }
}

/// Moves combined emissions ahead of lone ones, keeping corner order within
/// each group, and truncates to the slot count. Returns the number dropped.
fn cap_emissions(emissions: &mut Vec<Emission>) -> usize {
    emissions.sort_by_key(|e| !e.is_combined());
    let dropped = emissions.len().saturating_sub(PAIRS_PER_VERTEX);
    emissions.truncate(PAIRS_PER_VERTEX);
    dropped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::fixtures;
    use crate::outline::writer::{JoinMode, EMPTY_COORD};
    use approx::assert_relative_eq;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(OutlineGenerator::new(OutlineConfig::default().with_break_angle(-1.0)).is_err());
        assert!(OutlineGenerator::new(OutlineConfig::new(35.0, 1.0)).is_ok());
    }

    #[test]
    fn single_triangle_gets_three_pairs() {
        init_tracing();
        let result = OutlineGenerator::default().execute(&fixtures::single_triangle(1.0));
        assert_eq!(result.stats.hard_edges, 3);
        assert_eq!(result.stats.outlined_triangles, 1);
        assert_eq!(result.stats.emitted_pairs, 3);
        assert_eq!(result.stats.dropped_pairs, 0);

        for vertex in result.buffer.triangle(0).unwrap() {
            assert_eq!(vertex.len(), 3);
            for i in 0..3 {
                let pair = vertex.pair(i).unwrap();
                assert_eq!(pair.mode, JoinMode::Union);
                assert!(pair.second.is_some());
            }
        }
    }

    #[test]
    fn lone_edge_writes_union_with_sentinel() {
        let config = OutlineConfig::default().with_parallel(false);
        let generator = OutlineGenerator::new(config).unwrap();
        let triangles = fixtures::notched_plate();
        let index = generator.build_index(&triangles);
        let outline = generator.outline_triangle(&index, &triangles[1]);

        let slot = outline
            .emissions
            .iter()
            .position(|e| !e.is_combined())
            .unwrap();
        assert!(outline.emissions[slot..].iter().all(|e| !e.is_combined()));
        assert!(!outline.emissions[slot].first.needs_clip());

        let result = generator.execute(&triangles);
        let corners = result.buffer.triangle(1).unwrap();
        for vertex in corners {
            let flat = vertex.flattened();
            assert_eq!(flat.modes[slot], JoinMode::Union);
            assert_eq!(flat.coords[2 * slot + 1], EMPTY_COORD);
        }
    }

    #[test]
    fn reflex_corner_writes_intersection() {
        let result = OutlineGenerator::default().execute(&fixtures::notched_plate());
        let corners = result.buffer.triangle(2).unwrap();
        let modes: Vec<JoinMode> = (0..3)
            .filter_map(|i| corners[0].pair(i).map(|p| p.mode))
            .collect();
        assert!(modes.contains(&JoinMode::Intersection));
    }

    #[test]
    fn thickness_multiplier_scales_inversely() {
        let triangles = fixtures::single_triangle(10.0);
        let unit = OutlineGenerator::new(OutlineConfig::new(35.0, 1.0))
            .unwrap()
            .execute(&triangles);
        let double = OutlineGenerator::new(OutlineConfig::new(35.0, 2.0))
            .unwrap()
            .execute(&triangles);

        for (a, b) in unit.buffer.iter().zip(double.buffer.iter()) {
            for (va, vb) in a.iter().zip(b) {
                for i in 0..3 {
                    let (pa, pb) = (va.pair(i).unwrap(), vb.pair(i).unwrap());
                    assert_eq!(pa.mode, pb.mode);
                    assert_relative_eq!(pa.first.coords, pb.first.coords * 2.0, epsilon = 1e-9);
                    assert_relative_eq!(
                        pa.second_or_empty().coords,
                        pb.second_or_empty().coords * 2.0,
                        epsilon = 1e-9
                    );
                }
            }
        }
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let triangles = fixtures::cube(2.0);
        let parallel = OutlineGenerator::default().execute(&triangles);
        let sequential = OutlineGenerator::new(OutlineConfig::default().with_parallel(false))
            .unwrap()
            .execute(&triangles);
        assert_eq!(parallel.buffer, sequential.buffer);
        assert_eq!(parallel.stats, sequential.stats);
    }

    #[test]
    fn cube_faces_are_outlined() {
        let result = OutlineGenerator::default().execute(&fixtures::cube(1.0));
        assert_eq!(result.stats.triangles, 12);
        assert_eq!(result.stats.hard_edges, 24);
        assert_eq!(result.stats.outlined_triangles, 12);
        assert_eq!(result.stats.unresolved_vertices, 0);
    }

    #[test]
    fn smooth_mesh_has_no_outline() {
        let config = OutlineConfig::default().with_break_angle(120.0);
        let result = OutlineGenerator::new(config).unwrap().execute(&fixtures::cube(1.0));
        assert_eq!(result.stats.hard_edges, 0);
        assert_eq!(result.stats.emitted_pairs, 0);
        assert!(result.buffer.iter().flatten().all(|v| v.is_empty()));
    }

    #[test]
    fn indexed_mesh_matches_expanded_triangles() {
        let triangles = fixtures::single_triangle(1.0);
        let mesh = TriangleMesh {
            vertices: triangles[0].vertices().iter().map(|v| v.position).collect(),
            normals: triangles[0].vertices().iter().map(|v| v.normal).collect(),
            indices: vec![[0, 1, 2]],
        };
        let generator = OutlineGenerator::default();
        let from_mesh = generator.execute_mesh(&mesh).unwrap();
        assert_eq!(from_mesh.buffer, generator.execute(&triangles).buffer);

        let broken = TriangleMesh {
            indices: vec![[0, 1, 7]],
            ..mesh
        };
        assert!(matches!(
            generator.execute_mesh(&broken),
            Err(crate::OutlineError::Mesh(_))
        ));
    }

    #[test]
    fn crowded_corners_are_counted() {
        let result = OutlineGenerator::default().execute(&fixtures::fan());
        assert_eq!(result.stats.triangles, 3);
        assert_eq!(result.stats.hard_edges, 9);
        assert_eq!(result.stats.unresolved_vertices, 3);
        assert_eq!(result.stats.dropped_pairs, 0);
        assert_eq!(result.stats.outlined_triangles, 3);
        assert!(result.stats.to_string().contains("3 unresolved vertices"));
    }

    #[test]
    fn overflowing_emissions_keep_combined_pairs_first() {
        let generator = OutlineGenerator::default();
        let triangles = fixtures::single_triangle(1.0);
        let index = generator.build_index(&triangles);
        let pair = generator.outline_triangle(&index, &triangles[0]).emissions[0];
        let lone = Emission {
            second: None,
            ..pair
        };

        let mut emissions = vec![lone, pair, lone, pair, pair];
        assert_eq!(cap_emissions(&mut emissions), 2);
        assert_eq!(emissions.len(), PAIRS_PER_VERTEX);
        assert!(emissions.iter().all(Emission::is_combined));

        let mut emissions = vec![lone, pair, lone, lone];
        assert_eq!(cap_emissions(&mut emissions), 1);
        let combined: Vec<bool> = emissions.iter().map(Emission::is_combined).collect();
        assert_eq!(combined, vec![true, false, false]);
    }

    #[test]
    fn segments_are_distinct() {
        let segments = OutlineGenerator::default().hard_edge_segments(&fixtures::cube(1.0));
        assert_eq!(segments.len(), 12);
    }

    #[test]
    fn stats_display() {
        let stats = OutlineStats {
            triangles: 12,
            hard_edges: 24,
            outlined_triangles: 12,
            emitted_pairs: 36,
            dropped_pairs: 0,
            unresolved_vertices: 0,
        };
        let text = stats.to_string();
        assert!(text.contains("24 hard edges"));
        assert!(text.contains("12/12 triangles"));
    }
}
