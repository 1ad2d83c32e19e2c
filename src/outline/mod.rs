//! Per-triangle outline construction: projection of hard edges into each
//! triangle's plane, per-corner resolution and coordinate output.

mod generator;
pub mod planar;
pub mod projected;
pub mod resolve;
pub mod writer;

pub use generator::{OutlineGenerator, OutlineResult, OutlineStats, TriangleOutline};
pub use planar::{turning_angle, PlanarEdge, PlanarEdgePair, PlanarEdgeProjector, PlanarEdgeSet};
pub use projected::ProjectedEdge;
pub use resolve::{Emission, VertexOutlineResolver, VertexResolution};
pub use writer::{
    CoordPair, FlatOutline, JoinMode, OutlineBuffer, OutlineCoordinateWriter, OutlineSink,
    VertexOutline, EMPTY_COORD, PAIRS_PER_VERTEX,
};
