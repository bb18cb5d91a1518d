use crate::math::{Point, Real, Vector};
use crate::shape::Plane;
use crate::utils::BitSet;

/// A surface splitting space into a kept side (negative distances) and a
/// discarded side (positive distances).
#[derive(Copy, Clone, Debug)]
pub(crate) enum CutSurface<'a> {
    Plane(Plane),
    /// The sphere of radius `|distance|` around the nearest center.
    Sphere {
        distance: Real,
        centers: &'a [Point<Real>],
    },
    /// Discards the vertices whose value is below the threshold.
    MinValue(Real),
    /// Discards the vertices whose value is above the threshold.
    MaxValue(Real),
    /// Discards the vertices with a non-positive entry.
    Data(&'a [Real]),
    /// Discards the vertices whose source is in the set.
    Sources(&'a BitSet),
}

impl CutSurface<'_> {
    /// The signed distance of the `i`-th vertex, at `pt`, with the scalar
    /// `value` and generated from `source`.
    pub fn distance(
        &self,
        i: usize,
        pt: &Point<Real>,
        value: Option<Real>,
        source: Option<u32>,
    ) -> Real {
        match self {
            CutSurface::Plane(plane) => plane.signed_distance(pt),
            CutSurface::Sphere { distance, .. } => {
                let nearest = self.nearest_center(pt).map_or(Real::MAX, |(_, d)| d);
                if *distance > 0.0 {
                    nearest - distance
                } else {
                    -distance - nearest
                }
            }
            CutSurface::MinValue(min) => value.map_or(Real::NAN, |v| min - v),
            CutSurface::MaxValue(max) => value.map_or(Real::NAN, |v| v - max),
            CutSurface::Data(data) => data.get(i).map_or(Real::NAN, |v| -v),
            CutSurface::Sources(set) => {
                if source.is_some_and(|s| set.contains(s as usize)) {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }

    /// The normal of a plane cut, used to orient its cap.
    pub fn normal(&self) -> Option<Vector<Real>> {
        match self {
            CutSurface::Plane(plane) => Some(plane.normalized().normal),
            _ => None,
        }
    }

    fn nearest_center(&self, pt: &Point<Real>) -> Option<(&Point<Real>, Real)> {
        let CutSurface::Sphere { centers, .. } = self else {
            return None;
        };

        centers
            .iter()
            .map(|c| (c, na::distance(c, pt)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// The fraction of the segment `[a, b]` where it crosses this surface,
    /// knowing the signed distances `da` and `db` of its endpoints.
    pub fn crossing_fraction(
        &self,
        a: &Point<Real>,
        b: &Point<Real>,
        da: Real,
        db: Real,
    ) -> Real {
        let linear = da / (da - db);

        let fraction = match self {
            CutSurface::Sphere { distance, .. } => {
                // The endpoint inside the sphere is the one closer to a center.
                let inside_a = (da < db) == (*distance > 0.0);
                let inside = if inside_a { a } else { b };
                self.nearest_center(inside)
                    .map(|(center, _)| sphere_crossing(center, distance.abs(), a, b))
                    .filter(|f| f.is_finite())
                    .unwrap_or(linear)
            }
            _ => linear,
        };

        fraction.clamp(0.0, 1.0)
    }
}

/// The fraction `f` such that `a + f * (b - a)` lies on the sphere, taking
/// the exit point if `a` is inside and the entry point otherwise.
fn sphere_crossing(center: &Point<Real>, radius: Real, a: &Point<Real>, b: &Point<Real>) -> Real {
    let len = na::distance(a, b);
    let ra = na::distance(center, a) / len;
    let rb = na::distance(center, b) / len;
    let r = radius / len;

    let q = ra * ra - rb * rb + 1.0;
    let p = 4.0 * (r * r - ra * ra);
    let sign = if ra < rb { 1.0 } else { -1.0 };
    (q + sign * (q * q + p).sqrt()) / 2.0
}
