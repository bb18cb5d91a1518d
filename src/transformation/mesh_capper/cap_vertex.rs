use crate::math::{Point, Real};

/// The role of a vertex in the downward sweep.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum VertexKind {
    /// Both neighbors are below and the interior is below the vertex.
    Start,
    /// Both neighbors are below and the interior is above the vertex.
    Split,
    /// Both neighbors are above and the interior is above the vertex.
    End,
    /// Both neighbors are above and the interior is below the vertex.
    Merge,
    /// The interior is on the right of the vertex.
    LeftChain,
    /// The interior is on the left of the vertex.
    RightChain,
}

#[derive(Clone, Debug)]
pub(super) struct CapVertex {
    /// World coordinates until the cap frame is built, then local ones.
    pub pt: Point<Real>,
    /// The caller's index of this vertex.
    pub ipt: u32,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    /// The caller's index of the next vertex on the input boundary.
    pub boundary_next: Option<u32>,
    /// Position in the sweep order.
    pub rank: usize,
    /// The vertex this one was copied from when splitting a loop, or itself.
    pub origin: usize,
    pub kind: Option<VertexKind>,
}

impl CapVertex {
    pub fn new(pt: Point<Real>, ipt: u32, origin: usize) -> Self {
        Self {
            pt,
            ipt,
            prev: None,
            next: None,
            boundary_next: None,
            rank: 0,
            origin,
            kind: None,
        }
    }

    /// Is this vertex swept before `other`?
    #[inline]
    pub fn is_above(&self, other: &CapVertex) -> bool {
        self.pt.y > other.pt.y || (self.pt.y == other.pt.y && self.pt.x < other.pt.x)
    }
}

/// Twice the signed area of the triangle `abc` in the `xy` plane.
#[inline]
pub(super) fn orient2d(a: &Point<Real>, b: &Point<Real>, c: &Point<Real>) -> Real {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
