use super::cap_vertex::CapVertex;
use super::{CapError, CapSink, CapTriangle};
use crate::math::{Point, Real, Vector, DEFAULT_EPSILON, STITCH_DISTANCE_SQUARED};
use crate::utils::hashmap::{Entry, HashMap};
use na::Rotation3;
use smallvec::SmallVec;

/// Sine of the angle under which a boundary turn is considered straight.
const COLLINEAR_EPSILON: Real = 1.0e-5;

/// Builds the triangles closing the boundary exposed by a slice.
///
/// The boundary is fed one directed edge at a time with [`MeshCapper::add_edge`]
/// (or one closed polygon at a time with [`MeshCapper::add_loop`]), then
/// [`MeshCapper::create_cap`] triangulates the area enclosed by the loops.
/// Loops may be nested: a loop running clockwise around the cap normal is a hole.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "f32")] {
/// use meshcap::transformation::MeshCapper;
/// use nalgebra::{Point3, Vector3};
///
/// let square = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
///
/// let mut capper = MeshCapper::new();
/// for i in 0..4 {
///     capper.add_edge(i, (i + 1) % 4, &square);
/// }
///
/// let mut triangles = Vec::new();
/// let count = capper.create_cap(Some(&Vector3::z()), &mut triangles).unwrap();
/// assert_eq!(count, 2);
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct MeshCapper {
    pub(super) vertices: Vec<CapVertex>,
    cap_map: HashMap<u32, usize>,
    pub(super) copies: HashMap<usize, SmallVec<[usize; 4]>>,
}

impl MeshCapper {
    /// Creates an empty capper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every boundary edge added so far.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.cap_map.clear();
        self.copies.clear();
    }

    /// The number of distinct boundary vertices added so far.
    pub fn vertex_count(&self) -> usize {
        self.cap_map.len()
    }

    fn add_point(&mut self, ipt: u32, pt: Point<Real>) -> usize {
        match self.cap_map.entry(ipt) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let id = self.vertices.len();
                self.vertices.push(CapVertex::new(pt, ipt, id));
                let _ = e.insert(id);
                id
            }
        }
    }

    /// Adds the directed boundary edge from `vertices[ipt1]` to `vertices[ipt2]`.
    ///
    /// Edges must be oriented counterclockwise around the outward normal of the cap.
    /// Vertices are identified by their index, so edges sharing an index are chained.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds of `vertices`.
    pub fn add_edge(&mut self, ipt1: u32, ipt2: u32, vertices: &[Point<Real>]) {
        let a = self.add_point(ipt1, vertices[ipt1 as usize]);
        let b = self.add_point(ipt2, vertices[ipt2 as usize]);
        self.link(a, b);
    }

    /// Adds a closed polygon.
    ///
    /// The points are numbered consecutively after the vertices already added,
    /// and the triangles of the cap refer to them by these numbers.
    pub fn add_loop(&mut self, points: &[Point<Real>]) {
        let first = self.vertices.len();
        let n = points.len();
        for (i, pt) in points.iter().enumerate() {
            let _ = self.add_point((first + i) as u32, *pt);
        }
        for i in 0..n {
            self.link(first + i, first + (i + 1) % n);
        }
    }

    /// Triangulates the boundary added so far and forwards the triangles to `sink`.
    ///
    /// If `normal` is `None`, the cap normal is fitted to the boundary loops.
    /// Returns the number of triangles emitted. On failure nothing is emitted.
    /// The capper is cleared in both cases.
    pub fn create_cap(
        &mut self,
        normal: Option<&Vector<Real>>,
        sink: &mut impl CapSink,
    ) -> Result<usize, CapError> {
        let result = self.triangulate(normal);
        self.clear();

        let triangles = result?;
        for tri in &triangles {
            sink.push_cap_triangle(*tri);
        }
        Ok(triangles.len())
    }

    fn triangulate(&mut self, normal: Option<&Vector<Real>>) -> Result<Vec<CapTriangle>, CapError> {
        if self.vertices.is_empty() {
            return Ok(Vec::new());
        }

        self.fix_ends();
        self.drop_collinear();

        let live: Vec<usize> = (0..self.vertices.len())
            .filter(|i| self.vertices[*i].next.is_some())
            .collect();
        if live.len() < 3 {
            return Err(CapError::TooFewVertices { count: live.len() });
        }

        if let Some(v) = live
            .iter()
            .map(|i| &self.vertices[*i])
            .find(|v| !v.pt.coords.iter().all(|x| x.is_finite()))
        {
            return Err(CapError::NonFiniteVertex { vertex: v.ipt });
        }

        let normal = normal
            .filter(|n| n.norm_squared() > 0.0)
            .copied()
            .or_else(|| Some(self.newell_normal(&live)).filter(|n| n.norm_squared() > 0.0));
        let frame = self.projection_frame(&live, normal.as_ref())?;

        for i in &live {
            let next = self.next_of(*i)?;
            let next_ipt = self.vertices[next].ipt;
            self.vertices[*i].boundary_next = Some(next_ipt);
        }
        for v in &mut self.vertices {
            v.pt = frame.inverse_transform_point(&v.pt);
        }

        let diagonals = self.sweep(&live)?;
        for (a, b) in diagonals {
            self.split_loop(a, b)?;
        }

        let mut triangles = Vec::new();
        let dropped = self.triangulate_loops(&mut triangles)?;
        log::debug!(
            "cap of {} boundary vertices: {} triangles, {} dropped",
            live.len(),
            triangles.len(),
            dropped
        );
        Ok(triangles)
    }

    pub(super) fn link(&mut self, a: usize, b: usize) {
        self.vertices[a].next = Some(b);
        self.vertices[b].prev = Some(a);
    }

    fn detach(&mut self, i: usize) {
        let v = &mut self.vertices[i];
        let (prev, next) = (v.prev.take(), v.next.take());
        if let Some(p) = prev {
            if self.vertices[p].next == Some(i) {
                self.vertices[p].next = None;
            }
        }
        if let Some(n) = next {
            if self.vertices[n].prev == Some(i) {
                self.vertices[n].prev = None;
            }
        }
    }

    /// Removes `i` from its loop, linking its neighbors together.
    fn unlink(&mut self, i: usize) {
        if let (Some(p), Some(n)) = (self.vertices[i].prev, self.vertices[i].next) {
            self.link(p, n);
            self.vertices[i].prev = None;
            self.vertices[i].next = None;
        }
    }

    pub(super) fn next_of(&self, i: usize) -> Result<usize, CapError> {
        self.vertices[i].next.ok_or(CapError::BrokenLoop {
            vertex: self.vertices[i].ipt,
        })
    }

    pub(super) fn prev_of(&self, i: usize) -> Result<usize, CapError> {
        self.vertices[i].prev.ok_or(CapError::BrokenLoop {
            vertex: self.vertices[i].ipt,
        })
    }

    /// Closes the loops left open by numerical noise.
    ///
    /// Every dangling end is linked to the nearest dangling start. If both are
    /// closer than the stitching distance, the start is merged into the end.
    /// Chains that still cannot be closed are discarded.
    fn fix_ends(&mut self) {
        let n = self.vertices.len();
        let tails: Vec<usize> = (0..n)
            .filter(|i| self.vertices[*i].next.is_none() && self.vertices[*i].prev.is_some())
            .collect();
        let mut heads: Vec<usize> = (0..n)
            .filter(|i| self.vertices[*i].next.is_some() && self.vertices[*i].prev.is_none())
            .collect();

        for tail in tails {
            let tail_pt = self.vertices[tail].pt;
            let mut best: Option<(usize, Real)> = None;
            for (k, head) in heads.iter().enumerate() {
                let dist = na::distance_squared(&tail_pt, &self.vertices[*head].pt);
                if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                    best = Some((k, dist));
                }
            }

            let Some((k, dist)) = best else {
                log::warn!(
                    "unable to close the cap boundary at vertex {}",
                    self.vertices[tail].ipt
                );
                self.detach(tail);
                continue;
            };

            let head = heads.remove(k);
            self.link(tail, head);
            if dist < STITCH_DISTANCE_SQUARED && self.vertices[head].next != Some(tail) {
                self.unlink(head);
            }
        }

        self.prune_open_chains();
    }

    fn prune_open_chains(&mut self) {
        loop {
            let mut changed = false;
            for i in 0..self.vertices.len() {
                let dangling = match (self.vertices[i].prev, self.vertices[i].next) {
                    (None, None) => false,
                    (Some(p), Some(n)) => p == n || p == i,
                    _ => true,
                };
                if dangling {
                    self.detach(i);
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }
    }

    /// Removes every boundary vertex lying on the segment joining its
    /// neighbors. Each loop keeps at least three vertices.
    fn drop_collinear(&mut self) {
        let n = self.vertices.len();
        let mut visited = vec![false; n];
        let mut boundary = Vec::new();

        for start in 0..n {
            if visited[start] || self.vertices[start].next.is_none() {
                continue;
            }

            boundary.clear();
            let mut v = start;
            while let Some(next) = self.vertices[v].next {
                boundary.push(v);
                visited[v] = true;
                v = next;
                if visited[v] {
                    break;
                }
            }

            let mut len = boundary.len();
            for v in &boundary {
                if len <= 3 {
                    break;
                }
                if self.is_straight(*v) {
                    self.unlink(*v);
                    len -= 1;
                }
            }
        }
    }

    /// Does the boundary go straight through `i`?
    fn is_straight(&self, i: usize) -> bool {
        let v = &self.vertices[i];
        let (Some(prev), Some(next)) = (v.prev, v.next) else {
            return false;
        };

        let a = v.pt - self.vertices[prev].pt;
        let b = self.vertices[next].pt - v.pt;
        a.dot(&b) > 0.0 && a.cross(&b).norm() <= COLLINEAR_EPSILON * a.norm() * b.norm()
    }

    /// Newell's normal of the boundary loops.
    fn newell_normal(&self, live: &[usize]) -> Vector<Real> {
        let origin = self.vertices[live[0]].pt;
        live.iter()
            .filter_map(|i| {
                let v = &self.vertices[*i];
                let w = &self.vertices[v.next?];
                Some((v.pt - origin).cross(&(w.pt - origin)))
            })
            .sum()
    }

    /// The rotation mapping the cap plane onto the `xy` plane, with the cap
    /// normal along `+z`.
    fn projection_frame(
        &self,
        live: &[usize],
        normal: Option<&Vector<Real>>,
    ) -> Result<Rotation3<Real>, CapError> {
        let p0 = self.vertices[live[0]].pt;
        let vab = live[1..]
            .iter()
            .map(|i| p0 - self.vertices[*i].pt)
            .find(|d| d.norm_squared() > DEFAULT_EPSILON * DEFAULT_EPSILON)
            .ok_or(CapError::DegenerateFrame)?;
        let vac = match normal {
            Some(n) => n.cross(&vab),
            None => p0 - self.vertices[live[live.len() - 1]].pt,
        };

        let x = vab
            .try_normalize(DEFAULT_EPSILON)
            .ok_or(CapError::DegenerateFrame)?;
        let z = x
            .cross(&vac.try_normalize(DEFAULT_EPSILON).ok_or(CapError::DegenerateFrame)?)
            .try_normalize(DEFAULT_EPSILON)
            .ok_or(CapError::DegenerateFrame)?;
        let y = z.cross(&x);

        Ok(Rotation3::from_basis_unchecked(&[x, y, z]))
    }
}
