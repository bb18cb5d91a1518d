use super::cut_surface::CutSurface;
use super::slab_mesh::MeshSlicer;
use crate::math::{Real, Vector};
use crate::shape::{LatticeCell, Mesh, MeshPolygon, Plane, Visibility};
use crate::utils::{BitSet, VertexKey, VertexKeyMap};

impl Mesh {
    /// Folds this mesh into the Wigner-Seitz cell of `cell` around its origin.
    ///
    /// For each of the 26 neighbor lattice points, the part of the mesh beyond
    /// the bisecting plane is ghosted, copied, translated back by the lattice
    /// vector, and displayed again. Polygons lying on a bisecting plane stay
    /// where they are. The loop over the neighbors restarts after any
    /// translation, until a full pass translates nothing.
    pub(crate) fn slab_brillouin(&mut self, cell: &LatticeCell, slicer: &mut MeshSlicer) {
        slicer.keep_coplanar = true;
        let offsets: Vec<Vector<Real>> = cell.neighbor_offsets().collect();
        let max_passes = slicer.options.max_brillouin_passes;
        let mut passes = 0;
        let mut i = 0;

        while i < offsets.len() {
            let offset = offsets[i];
            let Some(plane) = Plane::bisecting(&cell.origin, &(cell.origin + offset)) else {
                i += 1;
                continue;
            };

            let moved = if self.is_point_cloud() {
                self.fold_points(&plane, &offset, slicer)
            } else {
                self.fold_polygons(&plane, &offset, slicer)
            };

            if !moved {
                i += 1;
                continue;
            }

            passes += 1;
            if passes >= max_passes {
                log::warn!(
                    "Brillouin reduction stopped after {} passes without reaching a fixed point",
                    passes
                );
                break;
            }
            i = 0;
        }

        log::debug!("Brillouin reduction done after {} passes", passes);
        self.ghost = None;
        self.recompute_bounding_box();
    }

    /// Moves the polygons beyond `plane` back by `offset`. Returns `true` if
    /// anything moved.
    fn fold_polygons(&mut self, plane: &Plane, offset: &Vector<Real>, slicer: &mut MeshSlicer) -> bool {
        self.ghost = Some(BitSet::new(self.polygons.len()));
        slicer.intersect(self, &CutSurface::Plane(*plane), false, true);

        let ghosts: Vec<usize> = self.ghost.iter().flat_map(|g| g.ones()).collect();
        self.ghost = Some(BitSet::new(self.polygons.len()));
        if ghosts.is_empty() {
            return false;
        }

        let shift = -offset;
        let mut copies = VertexKeyMap::default();
        for j in ghosts {
            let Some(polygon) = self.polygons[j] else {
                continue;
            };

            let mut indices = polygon.indices;
            for v in &mut indices {
                let count = self.vertices.len();
                let pt = self.vertices[*v as usize];
                let attributes = self.vertex_attributes(*v);
                let copy =
                    self.add_intersection_vertex(pt, attributes, VertexKey::Copy(*v), &mut copies);
                if copy as usize == count {
                    self.translate_vertex(copy, &shift);
                }
                *v = copy;
            }

            let _ = self.push_polygon(MeshPolygon { indices, ..polygon }, Visibility::Displayed);
        }

        true
    }

    /// Moves the displayed points beyond `plane` back by `offset`. Returns
    /// `true` if anything moved.
    fn fold_points(&mut self, plane: &Plane, offset: &Vector<Real>, slicer: &MeshSlicer) -> bool {
        let d = slicer.vertex_distances(self, &CutSurface::Plane(*plane));
        let shift = -offset;
        let mut moved = false;

        for (i, di) in d.iter().enumerate() {
            if *di > 0.0 && self.vertex_display.contains(i) {
                self.translate_vertex(i as u32, &shift);
                moved = true;
            }
        }

        moved
    }
}
