use super::{Point2, Point3, Vector3, TOLERANCE};

/// An infinite plane in 3D space, defined by an origin and a unit normal.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    origin: Point3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane through `origin` with the given unit `normal`.
    #[must_use]
    pub fn new(origin: Point3, normal: Vector3) -> Self {
        Self { origin, normal }
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the normal vector of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Orthogonal projection of `point` onto the plane.
    #[must_use]
    pub fn project_point(&self, point: &Point3) -> Point3 {
        point - self.normal * self.normal.dot(&(point - self.origin))
    }

    /// Removes the normal component of `v`.
    #[must_use]
    pub fn project_vector(&self, v: &Vector3) -> Vector3 {
        v - self.normal * self.normal.dot(v)
    }

    /// Builds a 2D frame on the plane whose X axis is `axis` projected into
    /// the plane and whose Y axis is `normal × X`.
    ///
    /// Returns `None` if `axis` is (nearly) parallel to the normal.
    #[must_use]
    pub fn frame(&self, axis: &Vector3) -> Option<PlaneFrame> {
        let x_axis = self.project_vector(axis).try_normalize(TOLERANCE)?;
        let y_axis = self.normal.cross(&x_axis);
        Some(PlaneFrame {
            origin: self.origin,
            x_axis,
            y_axis,
        })
    }
}

/// A 2D coordinate system lying on a [`Plane`].
#[derive(Debug, Clone, Copy)]
pub struct PlaneFrame {
    origin: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
}

impl PlaneFrame {
    /// Expresses `point` in frame coordinates, dropping its distance from the plane.
    #[must_use]
    pub fn to_2d(&self, point: &Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(&self.x_axis), d.dot(&self.y_axis))
    }

    /// Returns the unit X axis.
    #[must_use]
    pub fn x_axis(&self) -> &Vector3 {
        &self.x_axis
    }

    /// Returns the unit Y axis.
    #[must_use]
    pub fn y_axis(&self) -> &Vector3 {
        &self.y_axis
    }
}
