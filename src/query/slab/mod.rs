//! Slicing of meshes by planes, distance fields, value thresholds, boxes and
//! Brillouin zones.

pub use self::slab::{Slab, SlabError, SlabOptions, SlabPrimitive};

mod cut_surface;
mod slab;
mod slab_brillouin;
mod slab_mesh;
