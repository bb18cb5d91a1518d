use crate::utils::hashmap::HashMap;
use crate::utils::SortedPair;

/// The identity of a vertex created while slicing, used to share it between
/// every polygon that needs it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VertexKey {
    /// A vertex that is never shared.
    Unkeyed,
    /// The crossing point on the edge between two existing vertices.
    Edge(SortedPair<u32>),
    /// A displaced copy of an existing vertex.
    Copy(u32),
}

impl VertexKey {
    /// The key of the crossing point on the edge `(a, b)`, regardless of the edge direction.
    pub fn edge(a: u32, b: u32) -> Self {
        VertexKey::Edge(SortedPair::new(a, b))
    }
}

/// Maps vertex keys to the index of the vertex created for them.
pub type VertexKeyMap = HashMap<VertexKey, u32>;
