use std::fmt;

use crate::math::{Point2, Vector2};

use super::resolve::Emission;

/// Coordinate written where a pair has no second edge.
pub const EMPTY_COORD: Point2 = Point2 {
    coords: Vector2::new(100.0, 100.0),
};

/// Number of coordinate-pair slots per triangle corner.
pub const PAIRS_PER_VERTEX: usize = 3;

/// How the renderer combines the two outlines of a coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinMode {
    /// Both outlines are drawn independently.
    #[default]
    Union,
    /// Outlines are clipped to their overlap.
    Intersection,
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Union => write!(f, "union"),
            Self::Intersection => write!(f, "intersection"),
        }
    }
}

/// Outline coordinates of one triangle corner for one pair slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordPair {
    pub first: Point2,
    pub second: Option<Point2>,
    pub mode: JoinMode,
}

impl CoordPair {
    /// The second coordinate, or [`EMPTY_COORD`] if absent.
    #[must_use]
    pub fn second_or_empty(&self) -> Point2 {
        self.second.unwrap_or(EMPTY_COORD)
    }
}

/// Fixed-layout outline data of one triangle corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatOutline {
    /// `first, second` for each of the three pairs.
    pub coords: [Point2; 2 * PAIRS_PER_VERTEX],
    pub modes: [JoinMode; PAIRS_PER_VERTEX],
}

/// All outline pairs written to one triangle corner.
///
/// Slots start empty, meaning no outline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VertexOutline {
    pairs: [Option<CoordPair>; PAIRS_PER_VERTEX],
}

impl VertexOutline {
    /// Stores `pair` in slot `index`. Out-of-range slots are ignored.
    pub fn set_pair(&mut self, index: usize, pair: CoordPair) {
        if let Some(slot) = self.pairs.get_mut(index) {
            *slot = Some(pair);
        }
    }

    #[must_use]
    pub fn pair(&self, index: usize) -> Option<&CoordPair> {
        self.pairs.get(index)?.as_ref()
    }

    /// Number of filled slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.iter().all(Option::is_none)
    }

    /// Flattens the slots, filling gaps with [`EMPTY_COORD`] and
    /// [`JoinMode::Union`].
    #[must_use]
    pub fn flattened(&self) -> FlatOutline {
        let mut flat = FlatOutline {
            coords: [EMPTY_COORD; 2 * PAIRS_PER_VERTEX],
            modes: [JoinMode::Union; PAIRS_PER_VERTEX],
        };
        for (i, pair) in self.pairs.iter().enumerate() {
            if let Some(pair) = pair {
                flat.coords[2 * i] = pair.first;
                flat.coords[2 * i + 1] = pair.second_or_empty();
                flat.modes[i] = pair.mode;
            }
        }
        flat
    }
}

/// Receives outline coordinates per triangle corner.
pub trait OutlineSink {
    /// Stores `pair` for corner `corner` (0..3) of triangle `triangle`, in
    /// slot `pair_index` (0..3).
    fn set_coords_pair(
        &mut self,
        triangle: usize,
        corner: usize,
        pair_index: usize,
        pair: CoordPair,
    );
}

/// In-memory outline storage: three [`VertexOutline`]s per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlineBuffer {
    triangles: Vec<[VertexOutline; 3]>,
}

impl OutlineBuffer {
    /// Creates an empty buffer for `triangle_count` triangles.
    #[must_use]
    pub fn new(triangle_count: usize) -> Self {
        Self {
            triangles: vec![[VertexOutline::default(); 3]; triangle_count],
        }
    }

    /// Corner outlines of triangle `index`.
    #[must_use]
    pub fn triangle(&self, index: usize) -> Option<&[VertexOutline; 3]> {
        self.triangles.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[VertexOutline; 3]> {
        self.triangles.iter()
    }
}

impl OutlineSink for OutlineBuffer {
    fn set_coords_pair(
        &mut self,
        triangle: usize,
        corner: usize,
        pair_index: usize,
        pair: CoordPair,
    ) {
        if let Some(vertex) = self
            .triangles
            .get_mut(triangle)
            .and_then(|corners| corners.get_mut(corner))
        {
            vertex.set_pair(pair_index, pair);
        }
    }
}

/// Turns resolved emissions into normalized per-corner coordinates.
#[derive(Debug, Clone, Copy)]
pub struct OutlineCoordinateWriter {
    thickness_multiplier: f64,
}

impl OutlineCoordinateWriter {
    /// Creates a writer dividing coordinates by `thickness_multiplier`.
    #[must_use]
    pub fn new(thickness_multiplier: f64) -> Self {
        Self {
            thickness_multiplier,
        }
    }

    /// Join mode of an emission.
    ///
    /// Intersection when either edge needs clipping, except for a lone edge,
    /// which is always a union.
    #[must_use]
    pub fn join_mode(emission: &Emission) -> JoinMode {
        match emission.second {
            Some(second) if emission.first.needs_clip() || second.needs_clip() => {
                JoinMode::Intersection
            }
            _ => JoinMode::Union,
        }
    }

    /// Coordinate pairs for the three corners of the triangle.
    #[must_use]
    pub fn coord_pairs(&self, emission: &Emission) -> [CoordPair; 3] {
        let mode = Self::join_mode(emission);
        let first = emission.first.normalized_coords(self.thickness_multiplier);
        let second = emission
            .second
            .map(|edge| edge.normalized_coords(self.thickness_multiplier));

        std::array::from_fn(|corner| CoordPair {
            first: first[corner],
            second: second.map(|coords| coords[corner]),
            mode,
        })
    }

    /// Writes `emission` into slot `pair_index` of all three corners of
    /// `triangle`.
    pub fn write<S: OutlineSink + ?Sized>(
        &self,
        sink: &mut S,
        triangle: usize,
        pair_index: usize,
        emission: &Emission,
    ) {
        for (corner, pair) in self.coord_pairs(emission).into_iter().enumerate() {
            sink.set_coords_pair(triangle, corner, pair_index, pair);
        }
    }
}
