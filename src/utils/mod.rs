//! Various unsorted geometrical and logical operators.

pub use self::bit_set::BitSet;
pub use self::cleanup::{remove_unused_vertices, retain_remapped};
pub use self::sorted_pair::SortedPair;
pub use self::vertex_key::{VertexKey, VertexKeyMap};

mod bit_set;
mod cleanup;
pub mod hashmap;
mod sorted_pair;
mod vertex_key;
