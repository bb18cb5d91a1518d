/// Errors that can occur while triangulating a cap.
///
/// A failed cap never emits any triangle: [`MeshCapper::create_cap`](super::MeshCapper::create_cap)
/// only forwards its output to the sink once the whole boundary was triangulated.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum CapError {
    /// Fewer than three vertices remain once the open boundary ends were repaired.
    #[error("a cap needs at least three boundary vertices, found {count}")]
    TooFewVertices {
        /// The number of usable boundary vertices.
        count: usize,
    },
    /// The boundary vertices are all coincident or collinear, so no projection plane exists.
    #[error("unable to build a projection frame from the boundary vertices")]
    DegenerateFrame,
    /// A boundary vertex has a NaN or infinite coordinate.
    #[error("the boundary vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex {
        /// The external index of the vertex.
        vertex: u32,
    },
    /// Following the `next` links from a vertex never returned to it.
    #[error("the boundary loop through the vertex {vertex} is not closed")]
    BrokenLoop {
        /// The external index of the vertex.
        vertex: u32,
    },
    /// A vertex closing a region was reached, but no such region was open.
    #[error("no open region ends at the vertex {vertex}")]
    MissingRegion {
        /// The external index of the vertex.
        vertex: u32,
    },
    /// A vertex lies left of every open region, which happens on self-intersecting boundaries.
    #[error("no open region encloses the vertex {vertex}")]
    NoEnclosingRegion {
        /// The external index of the vertex.
        vertex: u32,
    },
}
