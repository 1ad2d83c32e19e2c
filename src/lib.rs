pub mod config;
pub mod error;
pub mod hard_edge;
pub mod math;
pub mod mesh;
pub mod outline;

pub use config::{CreaseMetric, OutlineConfig, Tolerances};
pub use error::{OutlineError, Result};
pub use mesh::{MeshVertex, Triangle, TriangleMesh};
pub use outline::{OutlineBuffer, OutlineGenerator, OutlineResult, OutlineSink, OutlineStats};
