#[cfg(test)]
pub(crate) mod fixtures;

use crate::error::{MeshError, Result};
use crate::math::{Plane, Point3, PositionKey, Vector3, TOLERANCE};

/// A triangle corner: position plus shading normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: Point3,
    pub normal: Vector3,
}

impl MeshVertex {
    /// Creates a vertex from a position and a normal.
    #[must_use]
    pub fn new(position: Point3, normal: Vector3) -> Self {
        Self { position, normal }
    }
}

/// A mesh triangle with three ordered vertices and a unit face normal.
#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [MeshVertex; 3],
    normal: Vector3,
}

impl Triangle {
    /// Creates a triangle, deriving the face normal from the winding order.
    ///
    /// Zero-area triangles fall back to the averaged vertex normal, then to `+Z`.
    #[must_use]
    pub fn new(vertices: [MeshVertex; 3]) -> Self {
        let normal = derive_face_normal(&vertices);
        Self { vertices, normal }
    }

    /// Creates a triangle with an explicitly supplied face normal.
    ///
    /// The normal is normalized; a zero vector is replaced by the derived one.
    #[must_use]
    pub fn with_normal(vertices: [MeshVertex; 3], normal: Vector3) -> Self {
        let normal = normal
            .try_normalize(TOLERANCE)
            .unwrap_or_else(|| derive_face_normal(&vertices));
        Self { vertices, normal }
    }

    /// Returns the three vertices in winding order.
    #[must_use]
    pub fn vertices(&self) -> &[MeshVertex; 3] {
        &self.vertices
    }

    /// Returns the unit face normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the centroid.
    #[must_use]
    pub fn center(&self) -> Point3 {
        let [a, b, c] = &self.vertices;
        Point3::from((a.position.coords + b.position.coords + c.position.coords) / 3.0)
    }

    /// The three edges `(v0, v1)`, `(v1, v2)`, `(v2, v0)`.
    #[must_use]
    pub fn edges(&self) -> [(&MeshVertex, &MeshVertex); 3] {
        let [a, b, c] = &self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    /// Finds the vertex whose rounded position equals `key`.
    #[must_use]
    pub fn vertex_at(&self, key: PositionKey, decimals: i32) -> Option<&MeshVertex> {
        self.vertices
            .iter()
            .find(|v| PositionKey::new(&v.position, decimals) == key)
    }

    /// Returns `true` if one of the vertices rounds to `key`.
    #[must_use]
    pub fn contains_position(&self, key: PositionKey, decimals: i32) -> bool {
        self.vertex_at(key, decimals).is_some()
    }

    /// The plane through the centroid, oriented by the face normal.
    #[must_use]
    pub fn face_plane(&self) -> Plane {
        Plane::new(self.center(), self.normal)
    }
}

fn derive_face_normal(vertices: &[MeshVertex; 3]) -> Vector3 {
    let [a, b, c] = vertices;
    (b.position - a.position)
        .cross(&(c.position - a.position))
        .try_normalize(TOLERANCE)
        .or_else(|| (a.normal + b.normal + c.normal).try_normalize(TOLERANCE))
        .unwrap_or_else(Vector3::z)
}

/// An indexed triangle mesh with per-vertex normals.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals, parallel to `vertices`.
    pub normals: Vec<Vector3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Expands the index buffer into standalone triangles.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::NormalCountMismatch`] if normals and positions
    /// differ in length, or [`MeshError::IndexOutOfRange`] if a triangle
    /// references a vertex that does not exist.
    pub fn triangles(&self) -> Result<Vec<Triangle>> {
        if self.normals.len() != self.vertices.len() {
            return Err(MeshError::NormalCountMismatch {
                positions: self.vertices.len(),
                normals: self.normals.len(),
            }
            .into());
        }

        self.indices
            .iter()
            .enumerate()
            .map(|(tri_idx, face)| {
                let mut corners = [MeshVertex::new(Point3::origin(), Vector3::zeros()); 3];
                for (corner, &index) in corners.iter_mut().zip(face) {
                    let i = index as usize;
                    let (Some(position), Some(normal)) = (self.vertices.get(i), self.normals.get(i))
                    else {
                        return Err(MeshError::IndexOutOfRange {
                            triangle: tri_idx,
                            index,
                            vertex_count: self.vertices.len(),
                        }
                        .into());
                    };
                    *corner = MeshVertex::new(*position, *normal);
                }
                Ok(Triangle::new(corners))
            })
            .collect()
    }
}
