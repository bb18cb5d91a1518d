/*!
meshcap
=======

**meshcap** cuts triangle meshes against clipping primitives (planes,
distance-to-point fields, scalar thresholds, boxes and Brillouin zones),
hides or ghosts the discarded fragments, and optionally closes the exposed
boundary with a triangulated cap.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![warn(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)]
#![warn(unused_qualifications)]

#[cfg(all(feature = "f32", feature = "f64"))]
std::compile_error!("The `f32` and `f64` features are mutually exclusive.");
#[cfg(not(any(feature = "f32", feature = "f64")))]
std::compile_error!("Exactly one of the `f32` or `f64` features must be enabled.");

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod query;
pub mod shape;
pub mod transformation;
pub mod utils;

mod real {
    /// The scalar type used throughout this crate.
    #[cfg(feature = "f64")]
    pub use f64 as Real;

    /// The scalar type used throughout this crate.
    #[cfg(feature = "f32")]
    pub use f32 as Real;
}

/// Compilation flags dependent aliases for mathematical types.
pub mod math {
    pub use super::real::*;
    pub use na::{Matrix3, Point3, UnitQuaternion, UnitVector3, Vector3};

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// Signed distances closer than this to a cutting surface are snapped onto it.
    pub const DEFAULT_DISTANCE_EPSILON: Real = 1.0e-4;

    /// Interpolation fractions closer than this to an edge endpoint are snapped onto it.
    pub const DEFAULT_FRACTION_EPSILON: Real = 1.0e-4;

    /// Open boundary ends closer than this (squared) are merged into a single cap vertex.
    pub const STITCH_DISTANCE_SQUARED: Real = 1.0e-6;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;

    /// The unit vector type.
    pub use UnitVector3 as UnitVector;

    /// The matrix type.
    pub use Matrix3 as Matrix;

    /// The rotation type.
    pub type Rotation<N> = UnitQuaternion<N>;
}
