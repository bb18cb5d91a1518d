use super::cap_vertex::{orient2d, VertexKind};
use super::{CapError, MeshCapper};
use crate::math::Real;
use core::cmp::Reverse;
use na::RealField;
use ordered_float::OrderedFloat;
use smallvec::smallvec;

/// A region of the cap still open below the sweep line.
///
/// It is bounded on its left by the boundary edge starting at `descender`.
/// `helper` is the lowest swept vertex a diagonal may reach from below.
#[derive(Copy, Clone, Debug)]
struct Region {
    descender: usize,
    helper: usize,
}

impl MeshCapper {
    /// Sweeps the boundary from top to bottom, ranking every vertex and
    /// returning the diagonals that split the boundary into y-monotone loops.
    pub(super) fn sweep(&mut self, live: &[usize]) -> Result<Vec<(usize, usize)>, CapError> {
        let mut order = live.to_vec();
        order.sort_by_key(|i| {
            let pt = self.vertices[*i].pt;
            (Reverse(OrderedFloat(pt.y)), OrderedFloat(pt.x))
        });
        for (rank, i) in order.iter().enumerate() {
            self.vertices[*i].rank = rank;
        }

        let mut regions: Vec<Region> = Vec::new();
        let mut diagonals = Vec::new();

        for v in order {
            let kind = self.classify(v)?;
            self.vertices[v].kind = Some(kind);
            let prev = self.prev_of(v)?;

            match kind {
                VertexKind::Start => regions.push(Region {
                    descender: v,
                    helper: v,
                }),
                VertexKind::End => {
                    let region = self.close_region(&mut regions, prev, v)?;
                    self.fix_merge(&region, v, &mut diagonals);
                }
                VertexKind::Split => {
                    let k = self.region_left_of(&regions, v)?;
                    diagonals.push((v, regions[k].helper));
                    regions[k].helper = v;
                    regions.push(Region {
                        descender: v,
                        helper: v,
                    });
                }
                VertexKind::Merge => {
                    let region = self.close_region(&mut regions, prev, v)?;
                    self.fix_merge(&region, v, &mut diagonals);
                    let k = self.region_left_of(&regions, v)?;
                    self.fix_merge(&regions[k], v, &mut diagonals);
                    regions[k].helper = v;
                }
                VertexKind::LeftChain => {
                    let region = self.close_region(&mut regions, prev, v)?;
                    self.fix_merge(&region, v, &mut diagonals);
                    regions.push(Region {
                        descender: v,
                        helper: v,
                    });
                }
                VertexKind::RightChain => {
                    let k = self.region_left_of(&regions, v)?;
                    self.fix_merge(&regions[k], v, &mut diagonals);
                    regions[k].helper = v;
                }
            }
        }

        Ok(diagonals)
    }

    fn classify(&self, v: usize) -> Result<VertexKind, CapError> {
        let vertex = &self.vertices[v];
        let prev = &self.vertices[self.prev_of(v)?];
        let next = &self.vertices[self.next_of(v)?];
        let convex = orient2d(&prev.pt, &vertex.pt, &next.pt) > 0.0;

        Ok(match (prev.is_above(vertex), next.is_above(vertex)) {
            (false, false) if convex => VertexKind::Start,
            (false, false) => VertexKind::Split,
            (true, true) if convex => VertexKind::End,
            (true, true) => VertexKind::Merge,
            (true, false) => VertexKind::LeftChain,
            (false, true) => VertexKind::RightChain,
        })
    }

    /// Removes the region bounded by the edge starting at `descender`.
    fn close_region(
        &self,
        regions: &mut Vec<Region>,
        descender: usize,
        v: usize,
    ) -> Result<Region, CapError> {
        let k = regions
            .iter()
            .position(|r| r.descender == descender)
            .ok_or(CapError::MissingRegion {
                vertex: self.vertices[v].ipt,
            })?;
        Ok(regions.remove(k))
    }

    /// Connects `v` to the helper of `region` if that helper is a merge vertex.
    fn fix_merge(&self, region: &Region, v: usize, diagonals: &mut Vec<(usize, usize)>) {
        if self.vertices[region.helper].kind == Some(VertexKind::Merge) {
            diagonals.push((v, region.helper));
        }
    }

    /// The region whose left edge is the closest one on the left of `v`.
    fn region_left_of(&self, regions: &[Region], v: usize) -> Result<usize, CapError> {
        let pt = self.vertices[v].pt;
        let mut best: Option<(usize, Real)> = None;

        for (k, region) in regions.iter().enumerate() {
            let x = self.edge_x_at(region.descender, pt.y)?;
            if x <= pt.x && best.map_or(true, |(_, best_x)| x > best_x) {
                best = Some((k, x));
            }
        }

        best.map(|(k, _)| k).ok_or(CapError::NoEnclosingRegion {
            vertex: self.vertices[v].ipt,
        })
    }

    /// The abscissa of the boundary edge starting at `e` at the height `y`.
    fn edge_x_at(&self, e: usize, y: Real) -> Result<Real, CapError> {
        let a = self.vertices[e].pt;
        let b = self.vertices[self.next_of(e)?].pt;
        let dy = b.y - a.y;
        if dy == 0.0 {
            Ok(a.x.max(b.x))
        } else {
            Ok(a.x + (y - a.y) * (b.x - a.x) / dy)
        }
    }

    /// Splits the loop through `a` and `b` into two loops sharing the diagonal `ab`.
    ///
    /// Both endpoints are duplicated, so a vertex touched by several diagonals
    /// ends up with one copy per loop. The copy used is the one whose interior
    /// angle contains the diagonal.
    pub(super) fn split_loop(&mut self, a: usize, b: usize) -> Result<(), CapError> {
        if self.vertices[a].pt == self.vertices[b].pt {
            log::debug!(
                "skipping zero-length cap diagonal between {} and {}",
                self.vertices[a].ipt,
                self.vertices[b].ipt
            );
            return Ok(());
        }

        let (root_a, root_b) = (self.vertices[a].origin, self.vertices[b].origin);
        let a = self.pick_copy(root_a, b);
        let b = self.pick_copy(root_b, a);
        let a = self.pick_copy(root_a, b);

        let a_next = self.next_of(a)?;
        let b_prev = self.prev_of(b)?;
        let a2 = self.copy_vertex(a);
        let b2 = self.copy_vertex(b);

        self.link(a, b);
        self.link(b_prev, b2);
        self.link(b2, a2);
        self.link(a2, a_next);
        Ok(())
    }

    fn copy_vertex(&mut self, i: usize) -> usize {
        let id = self.vertices.len();
        let mut copy = self.vertices[i].clone();
        copy.prev = None;
        copy.next = None;
        let root = copy.origin;
        self.vertices.push(copy);
        self.copies
            .entry(root)
            .or_insert_with(|| smallvec![root])
            .push(id);
        id
    }

    fn pick_copy(&self, root: usize, target: usize) -> usize {
        match self.copies.get(&root) {
            Some(copies) => copies
                .iter()
                .copied()
                .find(|c| self.wedge_contains(*c, target))
                .unwrap_or(root),
            None => root,
        }
    }

    /// Does the direction from `c` to `target` lie strictly inside the
    /// interior angle of the loop at `c`?
    fn wedge_contains(&self, c: usize, target: usize) -> bool {
        let vertex = &self.vertices[c];
        let (Some(prev), Some(next)) = (vertex.prev, vertex.next) else {
            return false;
        };

        let angle = |i: usize| {
            let d = self.vertices[i].pt - vertex.pt;
            d.y.atan2(d.x)
        };
        let tau = Real::two_pi();
        let start = angle(next);
        let span = (angle(prev) - start).rem_euclid(tau);
        let dir = (angle(target) - start).rem_euclid(tau);

        if span > 0.0 {
            0.0 < dir && dir < span
        } else {
            0.0 < dir
        }
    }
}
