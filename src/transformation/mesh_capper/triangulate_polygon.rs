use super::{CapError, CapTriangle, MeshCapper};
use crate::math::{Point, Real};
use core::ops::Range;

/// Triangulates a simple polygon, convex or not.
///
/// The triangles refer to the polygon points by their index in `points`, and
/// are wound like the polygon. Their edge flags tell which of their edges are
/// edges of the polygon. Points in the middle of a straight stretch of the
/// boundary are not used as corners.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "f32")] {
/// use meshcap::transformation::triangulate_polygon;
/// use nalgebra::Point3;
///
/// let l_shape = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(2.0, 1.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(1.0, 2.0, 0.0),
///     Point3::new(0.0, 2.0, 0.0),
/// ];
/// let triangles = triangulate_polygon(&l_shape).unwrap();
/// assert_eq!(triangles.len(), 4);
/// # }
/// ```
pub fn triangulate_polygon(points: &[Point<Real>]) -> Result<Vec<CapTriangle>, CapError> {
    if points.len() < 3 {
        return Err(CapError::TooFewVertices {
            count: points.len(),
        });
    }

    let mut capper = MeshCapper::new();
    capper.add_loop(points);
    let mut triangles = Vec::new();
    let _ = capper.create_cap(None, &mut triangles)?;
    Ok(triangles)
}

/// Triangulates several polygons given as index lists into `vertices`.
///
/// Returns every triangle, in global vertex indices, and for each face the
/// range of its triangles in the returned list.
pub fn triangulate_faces(
    faces: &[Vec<u32>],
    vertices: &[Point<Real>],
) -> Result<(Vec<CapTriangle>, Vec<Range<usize>>), CapError> {
    let mut triangles = Vec::new();
    let mut ranges = Vec::with_capacity(faces.len());
    let mut points = Vec::new();

    for face in faces {
        points.clear();
        points.extend(face.iter().map(|i| vertices[*i as usize]));

        let start = triangles.len();
        for tri in triangulate_polygon(&points)? {
            triangles.push(CapTriangle {
                indices: tri.indices.map(|i| face[i as usize]),
                edges: tri.edges,
            });
        }
        ranges.push(start..triangles.len());
    }

    Ok((triangles, ranges))
}
