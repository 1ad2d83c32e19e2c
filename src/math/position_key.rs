use super::Point3;

/// Default number of decimals positions are rounded to before hashing.
pub const POSITION_DECIMALS: i32 = 4;

/// A position rounded to a fixed decimal precision, usable as a hash key.
///
/// Two points map to the same key when they round to the same grid cell,
/// which is how coincident vertices of neighbouring triangles are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey([i64; 3]);

impl PositionKey {
    /// Rounds `point` to `decimals` decimal places.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(point: &Point3, decimals: i32) -> Self {
        let scale = 10_f64.powi(decimals);
        Self([
            (point.x * scale).round() as i64,
            (point.y * scale).round() as i64,
            (point.z * scale).round() as i64,
        ])
    }

    /// The rounded position this key stands for.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_point(self, decimals: i32) -> Point3 {
        let scale = 10_f64.powi(decimals);
        Point3::new(
            self.0[0] as f64 / scale,
            self.0[1] as f64 / scale,
            self.0[2] as f64 / scale,
        )
    }
}

/// An undirected edge identified by its two rounded endpoint positions.
///
/// Endpoints are stored sorted, so `(a, b)` and `(b, a)` compare and hash equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    lo: PositionKey,
    hi: PositionKey,
}

impl EdgeKey {
    /// Creates a key for the edge between `a` and `b`.
    ///
    /// Returns `None` for zero-length edges (both ends round to the same key).
    #[must_use]
    pub fn new(a: PositionKey, b: PositionKey) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { lo: a, hi: b }),
            std::cmp::Ordering::Greater => Some(Self { lo: b, hi: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The two endpoint keys, lowest first.
    #[must_use]
    pub fn endpoints(&self) -> (PositionKey, PositionKey) {
        (self.lo, self.hi)
    }

    /// Returns `true` if `key` is one of the endpoints.
    #[must_use]
    pub fn contains(&self, key: PositionKey) -> bool {
        self.lo == key || self.hi == key
    }
}
