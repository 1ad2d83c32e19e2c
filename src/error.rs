use thiserror::Error;

/// Top-level error type for outline generation.
#[derive(Debug, Error)]
pub enum OutlineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Errors related to generator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Errors raised while converting input meshes into triangles.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("mesh has {positions} positions but {normals} normals")]
    NormalCountMismatch { positions: usize, normals: usize },
}

/// Convenience type alias for results using [`OutlineError`].
pub type Result<T> = std::result::Result<T, OutlineError>;
