use crate::math::{Point, Real, DEFAULT_DISTANCE_EPSILON, DEFAULT_FRACTION_EPSILON};
use crate::shape::{BoxCorners, LatticeCell, Plane};
use crate::utils::BitSet;
use core::fmt::Write;

/// Errors that can occur while applying a [`Slab`] to a mesh.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlabError {
    /// The mesh has neither polygons nor vertices.
    #[error("cannot slab a mesh without vertices")]
    EmptyMesh,
    /// A range slab was applied to a mesh without per-vertex values.
    #[error("a range slab needs per-vertex values")]
    MissingVertexValues,
    /// A source slab was applied to a mesh without per-vertex sources.
    #[error("a source slab needs per-vertex sources")]
    MissingVertexSources,
    /// The data array of a data slab does not cover every vertex.
    #[error("{found} data values were given for {expected} vertices")]
    DataLengthMismatch {
        /// The length of the data array.
        found: usize,
        /// The number of vertices of the mesh.
        expected: usize,
    },
    /// A distance slab was given no reference point.
    #[error("a distance slab needs at least one reference point")]
    NoReferencePoints,
    /// The box corners do not span a volume.
    #[error("the box corners do not define six face planes")]
    DegenerateBox,
    /// A Brillouin slab was applied without a lattice cell, and the mesh has none.
    #[error("a Brillouin slab needs a lattice cell")]
    MissingLatticeCell,
}

/// What a [`Slab`] cuts the mesh with.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum SlabPrimitive {
    /// Undoes every slab applied so far.
    None,
    /// Keeps the side of the plane opposite to its normal.
    Plane(Plane),
    /// Keeps the points closer than `distance` to the nearest center if
    /// `distance` is positive, or farther than `-distance` if it is negative.
    Within {
        /// The distance threshold.
        distance: Real,
        /// The reference points.
        centers: Vec<Point<Real>>,
    },
    /// Keeps the points whose vertex value lies in `[min, max]`, or outside of
    /// `[max, min]` if `max < min`.
    Range {
        /// The lower value bound.
        min: Real,
        /// The upper value bound.
        max: Real,
    },
    /// Keeps the inside of a parallelepiped.
    Box(BoxCorners),
    /// Keeps the vertices with a positive entry in a per-vertex data array.
    Data(Vec<Real>),
    /// Discards the vertices generated from one of the sources in the set.
    /// Vertices without a source are kept.
    Sources(BitSet),
    /// Folds the mesh into the first Brillouin zone of a lattice, using the
    /// mesh unit cell if `None`.
    Brillouin(Option<LatticeCell>),
}

impl SlabPrimitive {
    fn can_cap(&self) -> bool {
        matches!(
            self,
            SlabPrimitive::Plane(_) | SlabPrimitive::Range { .. } | SlabPrimitive::Sources(_)
        )
    }
}

/// A request to cut a mesh.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Slab {
    /// The cutting primitive.
    pub primitive: SlabPrimitive,
    /// Should the cut be closed with a cap? Only plane, range and source cuts are capped.
    pub cap: bool,
    /// Should the discarded side be kept as a ghost instead of being hidden?
    pub ghost: bool,
}

impl Slab {
    /// A slab hiding the discarded side, without cap.
    pub fn new(primitive: SlabPrimitive) -> Self {
        Self {
            primitive,
            cap: false,
            ghost: false,
        }
    }

    /// A slab keeping the side of `plane` opposite to its normal.
    pub fn plane(plane: Plane) -> Self {
        Self::new(SlabPrimitive::Plane(plane))
    }

    /// A slab undoing every slab applied so far.
    pub fn none() -> Self {
        Self::new(SlabPrimitive::None)
    }

    /// Sets whether the cut is capped.
    pub fn with_cap(mut self, cap: bool) -> Self {
        self.cap = cap;
        self
    }

    /// Sets whether the discarded side is ghosted.
    pub fn with_ghost(mut self, ghost: bool) -> Self {
        self.ghost = ghost;
        self
    }

    /// Is the cut actually capped?
    pub fn is_capped(&self) -> bool {
        self.cap && !self.ghost && self.primitive.can_cap()
    }

    /// A textual description of this slab, as recorded in
    /// [`Mesh::slab_options`](crate::shape::Mesh::slab_options).
    pub fn description(&self) -> String {
        let mut result = String::new();
        result.push_str(if self.is_capped() { "cap " } else { "slab " });
        if self.ghost {
            result.push_str("ghost ");
        }

        // Writing to a `String` never fails.
        let _ = match &self.primitive {
            SlabPrimitive::None => write!(result, "none"),
            SlabPrimitive::Plane(plane) => write!(result, "plane {}", plane),
            SlabPrimitive::Within { distance, centers } => {
                let _ = write!(result, "within {}", distance);
                centers
                    .iter()
                    .try_for_each(|c| write!(result, " {{{} {} {}}}", c.x, c.y, c.z))
            }
            SlabPrimitive::Range { min, max } => write!(result, "within range {} {}", min, max),
            SlabPrimitive::Box(corners) => write!(result, "within box {}", corners),
            SlabPrimitive::Data(_) => write!(result, "data"),
            SlabPrimitive::Sources(set) => {
                let sources: Vec<String> = set.ones().map(|i| i.to_string()).collect();
                write!(result, "sources {{{}}}", sources.join(" "))
            }
            SlabPrimitive::Brillouin(_) => write!(result, "brillouin"),
        };

        result
    }
}

/// Tolerances of the slicing operations.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SlabOptions {
    /// Signed distances smaller than this are snapped to zero.
    pub distance_epsilon: Real,
    /// Edge crossing fractions closer than this to an endpoint are snapped onto it.
    pub fraction_epsilon: Real,
    /// The maximum number of restarts of a Brillouin reduction.
    pub max_brillouin_passes: usize,
}

impl Default for SlabOptions {
    fn default() -> Self {
        Self {
            distance_epsilon: DEFAULT_DISTANCE_EPSILON,
            fraction_epsilon: DEFAULT_FRACTION_EPSILON,
            max_brillouin_passes: 1000,
        }
    }
}
