//! Oriented planes used as cutting surfaces.

use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use core::fmt;
use na;

/// The plane of all the points `p` such that `normal · p + w = 0`.
///
/// The plane is oriented: points with a positive signed distance lie on the
/// side `normal` points to. When slicing, that side is the one discarded.
#[derive(PartialEq, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Plane {
    /// The plane normal. Not necessarily unit-length.
    pub normal: Vector<Real>,
    /// The plane offset.
    pub w: Real,
}

impl Plane {
    /// Builds a plane from its normal and offset.
    #[inline]
    pub fn new(normal: Vector<Real>, w: Real) -> Self {
        Self { normal, w }
    }

    /// Builds the plane `a * x + b * y + c * z + d = 0`.
    #[inline]
    pub fn from_coefficients(a: Real, b: Real, c: Real, d: Real) -> Self {
        Self::new(Vector::new(a, b, c), d)
    }

    /// The plane containing the three given points.
    ///
    /// The normal follows the counter-clockwise winding of `a`, `b`, `c`.
    /// Returns `None` if the points are collinear.
    pub fn through_points(a: &Point<Real>, b: &Point<Real>, c: &Point<Real>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a)).try_normalize(DEFAULT_EPSILON)?;
        Some(Self::new(normal, -normal.dot(&a.coords)))
    }

    /// The perpendicular bisector of the segment `[from, to]`, with its normal
    /// pointing toward `to`.
    ///
    /// Returns `None` if both points coincide.
    pub fn bisecting(from: &Point<Real>, to: &Point<Real>) -> Option<Self> {
        let normal = (to - from).try_normalize(DEFAULT_EPSILON)?;
        let midpoint = na::center(from, to);
        Some(Self::new(normal, -normal.dot(&midpoint.coords)))
    }

    /// Does this plane have a zero normal?
    pub fn is_degenerate(&self) -> bool {
        abs_diff_eq!(self.normal.norm_squared(), 0.0)
    }

    /// This plane scaled so its normal is unit-length.
    ///
    /// A degenerate plane is replaced by the plane `z = 0`.
    pub fn normalized(&self) -> Self {
        if self.is_degenerate() {
            return Self::new(Vector::z(), 0.0);
        }

        let norm = self.normal.norm();
        Self::new(self.normal / norm, self.w / norm)
    }

    /// The same plane with the opposite orientation.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self::new(-self.normal, -self.w)
    }

    /// The signed distance from `pt` to this plane, positive on the side the
    /// normal points to.
    pub fn signed_distance(&self, pt: &Point<Real>) -> Real {
        let unit = self.normalized();
        unit.normal.dot(&pt.coords) + unit.w
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{} {} {} {}}}",
            self.normal.x, self.normal.y, self.normal.z, self.w
        )
    }
}
