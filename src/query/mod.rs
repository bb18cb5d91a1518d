//! Cutting queries on meshes.
//!
//! A [`Slab`] describes what a mesh is cut with, whether the cut is capped,
//! and whether the discarded side is kept as a ghost. It is applied with
//! [`Mesh::slab`](crate::shape::Mesh::slab).

pub use self::slab::{Slab, SlabError, SlabOptions, SlabPrimitive};

mod slab;
