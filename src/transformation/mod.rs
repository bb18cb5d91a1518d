//! Transformation of boundary loops into triangle caps.

pub use self::mesh_capper::{
    triangulate_faces, triangulate_polygon, CapError, CapSink, CapTriangle, MeshCapper,
};

mod mesh_capper;
