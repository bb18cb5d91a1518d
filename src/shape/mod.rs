//! Shapes and mesh storage supported by meshcap.

pub use self::box_corners::{BoxCorners, BOX_FACE_POINTS};
pub use self::lattice_cell::LatticeCell;
pub use self::mesh::{
    EdgeFlags, Mesh, MeshBuilderError, MeshPolygon, VertexAttributes, Visibility,
};
pub use self::plane::Plane;

mod box_corners;
mod lattice_cell;
mod mesh;
mod plane;
