use crate::math::{Point, Real, Vector};
use crate::shape::BoxCorners;

/// A periodic lattice cell: an origin and three primitive translation vectors.
#[derive(PartialEq, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LatticeCell {
    /// The lattice point the cell is centered on.
    pub origin: Point<Real>,
    /// The three primitive translation vectors.
    pub vectors: [Vector<Real>; 3],
}

impl LatticeCell {
    /// Creates a lattice cell from its origin and translation vectors.
    pub fn new(origin: Point<Real>, a: Vector<Real>, b: Vector<Real>, c: Vector<Real>) -> Self {
        Self {
            origin,
            vectors: [a, b, c],
        }
    }

    /// The translations from the origin to its 26 nearest lattice neighbors,
    /// `i * a + j * b + k * c` for `(i, j, k)` in `{-1, 0, 1}³ \ {0}`, with
    /// `i` varying slowest.
    pub fn neighbor_offsets(&self) -> impl Iterator<Item = Vector<Real>> + '_ {
        const STEPS: [Real; 3] = [-1.0, 0.0, 1.0];
        let [a, b, c] = self.vectors;

        STEPS
            .iter()
            .flat_map(move |i| {
                STEPS
                    .iter()
                    .flat_map(move |j| STEPS.iter().map(move |k| (*i, *j, *k)))
            })
            .filter(|(i, j, k)| *i != 0.0 || *j != 0.0 || *k != 0.0)
            .map(move |(i, j, k)| a * i + b * j + c * k)
    }

    /// The corners of the parallelepiped spanned by this cell's vectors from its origin.
    pub fn corners(&self) -> BoxCorners {
        let [a, b, c] = self.vectors;
        BoxCorners::from_oabc(self.origin, a, b, c)
    }
}
