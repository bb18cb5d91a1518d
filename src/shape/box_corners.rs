use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::Plane;
use core::fmt;

/// For each face of a [`BoxCorners`], three corner indices winding
/// counter-clockwise when seen from outside of a right-handed box.
pub const BOX_FACE_POINTS: [[usize; 3]; 6] = [
    [4, 0, 6],
    [4, 6, 5],
    [5, 7, 1],
    [1, 3, 0],
    [6, 2, 7],
    [1, 0, 5],
];

/// The eight corners of a parallelepiped.
///
/// Corner `i` is offset from the first corner along the first edge vector if
/// bit `4` of `i` is set, along the second if bit `2` is set, and along the
/// third if bit `1` is set.
#[derive(PartialEq, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BoxCorners(pub [Point<Real>; 8]);

impl BoxCorners {
    /// The box spanned by the three edge vectors `a`, `b`, `c` from `origin`.
    pub fn from_oabc(
        origin: Point<Real>,
        a: Vector<Real>,
        b: Vector<Real>,
        c: Vector<Real>,
    ) -> Self {
        let mut corners = [origin; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            if i & 4 != 0 {
                *corner += a;
            }
            if i & 2 != 0 {
                *corner += b;
            }
            if i & 1 != 0 {
                *corner += c;
            }
        }
        Self(corners)
    }

    /// The corners of an axis-aligned box.
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self(aabb.vertices())
    }

    /// The centroid of the eight corners.
    pub fn center(&self) -> Point<Real> {
        let sum = self.0.iter().fold(Vector::zeros(), |acc, pt| acc + pt.coords);
        Point::from(sum / 8.0)
    }

    /// The six face planes of this box, oriented so that the interior of the
    /// box has a negative signed distance to each of them.
    ///
    /// Returns `None` if one of the faces is degenerate.
    pub fn face_planes(&self) -> Option<[Plane; 6]> {
        let center = self.center();
        let mut planes = [Plane::new(Vector::zeros(), 0.0); 6];

        for (plane, face) in planes.iter_mut().zip(BOX_FACE_POINTS.iter()) {
            let [a, b, c] = face.map(|i| self.0[i]);
            let face_plane = Plane::through_points(&a, &b, &c)?;
            // Left-handed edge vectors turn every face inside-out.
            *plane = if face_plane.signed_distance(&center) > 0.0 {
                face_plane.flipped()
            } else {
                face_plane
            };
        }

        Some(planes)
    }
}

impl fmt::Display for BoxCorners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, pt) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{{{} {} {}}}", pt.x, pt.y, pt.z)?;
        }
        write!(f, "]")
    }
}
