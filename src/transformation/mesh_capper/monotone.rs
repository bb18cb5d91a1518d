use super::cap_vertex::{orient2d, CapVertex};
use super::{CapError, CapTriangle, MeshCapper};
use crate::shape::EdgeFlags;

/// A vertex of a monotone loop and whether it lies on the left chain.
type ChainVertex = (usize, bool);

impl MeshCapper {
    /// Triangulates every loop left once the diagonals were applied.
    ///
    /// Returns the number of triangles dropped because they were degenerate
    /// or wound clockwise.
    pub(super) fn triangulate_loops(&self, out: &mut Vec<CapTriangle>) -> Result<usize, CapError> {
        let n = self.vertices.len();
        let mut visited = vec![false; n];
        let mut dropped = 0;
        let mut boundary = Vec::new();

        for start in 0..n {
            if visited[start] || self.vertices[start].next.is_none() {
                continue;
            }

            boundary.clear();
            let mut v = start;
            loop {
                boundary.push(v);
                visited[v] = true;
                v = self.next_of(v)?;
                if v == start {
                    break;
                }
                if boundary.len() > n {
                    return Err(CapError::BrokenLoop {
                        vertex: self.vertices[start].ipt,
                    });
                }
            }

            dropped += self.triangulate_monotone(&boundary, out);
        }

        Ok(dropped)
    }

    /// Triangulates a y-monotone loop, given in boundary order.
    fn triangulate_monotone(&self, boundary: &[usize], out: &mut Vec<CapTriangle>) -> usize {
        let n = boundary.len();
        let mut dropped = 0;

        if n < 3 {
            return 0;
        }
        if n == 3 {
            return usize::from(!self.emit(boundary[0], boundary[1], boundary[2], out));
        }

        let rank = |k: usize| self.vertices[boundary[k]].rank;
        let mut top = 0;
        let mut bottom = 0;
        for k in 1..n {
            if rank(k) < rank(top) {
                top = k;
            }
            if rank(k) > rank(bottom) {
                bottom = k;
            }
        }

        // The left chain runs from the top to the bottom along `next` links.
        let left_len = (bottom + n - top) % n;
        let mut sorted: Vec<ChainVertex> = (0..n)
            .map(|k| (boundary[k], (k + n - top) % n < left_len))
            .collect();
        sorted.sort_by_key(|(v, _)| self.vertices[*v].rank);

        let mut stack: Vec<ChainVertex> = vec![sorted[0], sorted[1]];
        for j in 2..n - 1 {
            let u = sorted[j];
            let on_other_chain = stack.last().is_some_and(|top| top.1 != u.1);

            if on_other_chain {
                while stack.len() > 1 {
                    if let (Some(a), Some(b)) = (stack.pop(), stack.last().copied()) {
                        dropped += self.emit_across(u, a, b, u.1, out);
                    }
                }
                stack.clear();
                stack.push(sorted[j - 1]);
                stack.push(u);
            } else if let Some(mut last) = stack.pop() {
                while let Some(&b) = stack.last() {
                    let pu = &self.vertices[u.0].pt;
                    let pl = &self.vertices[last.0].pt;
                    let pb = &self.vertices[b.0].pt;
                    let visible = if u.1 {
                        orient2d(pb, pl, pu)
                    } else {
                        orient2d(pu, pl, pb)
                    };
                    if visible <= 0.0 {
                        break;
                    }

                    dropped += self.emit_same(u, last, b, out);
                    last = b;
                    let _ = stack.pop();
                }
                stack.push(last);
                stack.push(u);
            }
        }

        let u = sorted[n - 1];
        while stack.len() > 1 {
            if let (Some(a), Some(b)) = (stack.pop(), stack.last().copied()) {
                dropped += self.emit_across(u, a, b, !a.1, out);
            }
        }

        dropped
    }

    /// Emits the triangle joining `u` to the stack edge `ab`, with `u` on the
    /// chain opposite to the stack.
    fn emit_across(
        &self,
        u: ChainVertex,
        a: ChainVertex,
        b: ChainVertex,
        u_on_left: bool,
        out: &mut Vec<CapTriangle>,
    ) -> usize {
        let emitted = if u_on_left {
            self.emit(u.0, a.0, b.0, out)
        } else {
            self.emit(b.0, a.0, u.0, out)
        };
        usize::from(!emitted)
    }

    /// Emits the ear cut between `u` and the stack vertex `b` over `last`.
    fn emit_same(
        &self,
        u: ChainVertex,
        last: ChainVertex,
        b: ChainVertex,
        out: &mut Vec<CapTriangle>,
    ) -> usize {
        let emitted = if u.1 {
            self.emit(b.0, last.0, u.0, out)
        } else {
            self.emit(u.0, last.0, b.0, out)
        };
        usize::from(!emitted)
    }

    /// Emits the triangle `abc` if it is wound counterclockwise.
    fn emit(&self, a: usize, b: usize, c: usize, out: &mut Vec<CapTriangle>) -> bool {
        let [va, vb, vc] = [a, b, c].map(|i| &self.vertices[i]);
        if orient2d(&va.pt, &vb.pt, &vc.pt) <= 0.0 {
            log::debug!(
                "dropping degenerate cap triangle ({}, {}, {})",
                va.ipt,
                vb.ipt,
                vc.ipt
            );
            return false;
        }

        let on_boundary = |from: &CapVertex, to: &CapVertex| from.boundary_next == Some(to.ipt);
        out.push(CapTriangle {
            indices: [va.ipt, vb.ipt, vc.ipt],
            edges: EdgeFlags::from_edges([
                on_boundary(va, vb),
                on_boundary(vb, vc),
                on_boundary(vc, va),
            ]),
        });
        true
    }
}
