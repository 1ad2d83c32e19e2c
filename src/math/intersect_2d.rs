use super::{Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let cross = d1.perp(d2);
    if cross.abs() < TOLERANCE {
        return None;
    }
    let diff = p2 - p1;
    let t = diff.perp(d2) / cross;
    let u = diff.perp(d1) / cross;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        Some((a0 + da * t_clamped, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// A bounded 2D line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment2D {
    pub start: Point2,
    pub end: Point2,
}

impl Segment2D {
    /// Creates a segment from `start` to `end`.
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Returns the (non-normalized) direction `end - start`.
    #[must_use]
    pub fn direction(&self) -> Vector2 {
        self.end - self.start
    }

    /// Returns `true` when the supporting lines of both segments are parallel
    /// (or either segment is degenerate).
    #[must_use]
    pub fn is_parallel(&self, other: &Segment2D) -> bool {
        match (
            self.direction().try_normalize(TOLERANCE),
            other.direction().try_normalize(TOLERANCE),
        ) {
            (Some(a), Some(b)) => a.perp(&b).abs() < TOLERANCE,
            _ => true,
        }
    }

    /// Intersection point of the two infinite supporting lines.
    #[must_use]
    pub fn line_intersection(&self, other: &Segment2D) -> Option<Point2> {
        let d = self.direction();
        let (t, _) = line_line_intersect_2d(&self.start, &d, &other.start, &other.direction())?;
        Some(self.start + d * t)
    }

    /// Returns `true` if the two bounded segments touch or cross.
    #[must_use]
    pub fn intersects(&self, other: &Segment2D) -> bool {
        segment_segment_intersect_2d(&self.start, &self.end, &other.start, &other.end).is_some()
    }
}

/// A triangle flattened into a 2D frame.
#[derive(Debug, Clone, Copy)]
pub struct Triangle2D {
    pub corners: [Point2; 3],
}

impl Triangle2D {
    /// Creates a 2D triangle from its three corners.
    #[must_use]
    pub fn new(corners: [Point2; 3]) -> Self {
        Self { corners }
    }

    /// The three edges `(c0, c1)`, `(c1, c2)`, `(c2, c0)`.
    #[must_use]
    pub fn edges(&self) -> [Segment2D; 3] {
        let [a, b, c] = self.corners;
        [Segment2D::new(a, b), Segment2D::new(b, c), Segment2D::new(c, a)]
    }

    /// Returns `true` if `segment` crosses or touches any edge of the triangle.
    #[must_use]
    pub fn intersects_segment(&self, segment: &Segment2D) -> bool {
        self.edges().iter().any(|edge| edge.intersects(segment))
    }
}
