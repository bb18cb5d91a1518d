//! Triangulation of the boundary loops left open by a slice.
//!
//! The boundary is projected on a plane, cut into y-monotone loops by a
//! downward sweep, and each monotone loop is triangulated with a stack walk
//! along its two chains.

pub use self::error::CapError;
pub use self::mesh_capper::MeshCapper;
pub use self::triangulate_polygon::{triangulate_faces, triangulate_polygon};

use crate::shape::EdgeFlags;

mod cap_vertex;
mod error;
mod mesh_capper;
mod monotone;
mod sweep;
mod triangulate_polygon;

/// A triangle produced by the [`MeshCapper`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CapTriangle {
    /// The caller's indices of the triangle vertices, counterclockwise around the cap normal.
    pub indices: [u32; 3],
    /// The triangle edges lying on the input boundary.
    pub edges: EdgeFlags,
}

/// Receives the triangles of a successful cap.
pub trait CapSink {
    /// Adds one cap triangle.
    fn push_cap_triangle(&mut self, triangle: CapTriangle);
}

impl CapSink for Vec<CapTriangle> {
    fn push_cap_triangle(&mut self, triangle: CapTriangle) {
        self.push(triangle);
    }
}
