use super::cut_surface::CutSurface;
use super::{Slab, SlabError, SlabOptions, SlabPrimitive};
use crate::math::{Point, Real};
use crate::shape::{EdgeFlags, Mesh, MeshPolygon, VertexAttributes, Visibility};
use crate::transformation::{CapSink, CapTriangle, MeshCapper};
use crate::utils::hashmap::{Entry, HashMap};
use crate::utils::{BitSet, VertexKey, VertexKeyMap};

impl Mesh {
    /// Applies a slab with the default tolerances.
    ///
    /// # Example
    ///
    /// ```
    /// # #[cfg(feature = "f32")] {
    /// use meshcap::query::Slab;
    /// use meshcap::shape::{Mesh, Plane};
    /// use nalgebra::Point3;
    ///
    /// let vertices = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 0.0, 1.0),
    /// ];
    /// let mut mesh = Mesh::new(vertices, vec![[0, 1, 2]]).unwrap();
    ///
    /// // Keep the half below `z = 0.5`.
    /// let plane = Plane::from_coefficients(0.0, 0.0, 1.0, -0.5);
    /// mesh.slab(&Slab::plane(plane)).unwrap();
    /// assert_eq!(mesh.displayed_polygons().count(), 2);
    /// assert_eq!(mesh.slab_options(), "slab plane {0 0 1 -0.5}");
    /// # }
    /// ```
    pub fn slab(&mut self, slab: &Slab) -> Result<(), SlabError> {
        self.slab_with_options(slab, &SlabOptions::default())
    }

    /// Applies several slabs in order, stopping at the first failure.
    pub fn slab_all(&mut self, slabs: &[Slab]) -> Result<(), SlabError> {
        let options = SlabOptions::default();
        slabs
            .iter()
            .try_for_each(|slab| self.slab_with_options(slab, &options))
    }

    /// Applies a slab with custom tolerances.
    pub fn slab_with_options(
        &mut self,
        slab: &Slab,
        options: &SlabOptions,
    ) -> Result<(), SlabError> {
        let brillouin_cell = match &slab.primitive {
            SlabPrimitive::None => {
                self.reset_slab();
                return Ok(());
            }
            SlabPrimitive::Brillouin(cell) => {
                let cell = cell
                    .or(self.unit_cell)
                    .ok_or(SlabError::MissingLatticeCell)?;
                self.reset_slab();
                Some(cell)
            }
            _ => None,
        };

        if self.vertices.is_empty() {
            return Err(SlabError::EmptyMesh);
        }
        self.check_slab(&slab.primitive)?;
        self.begin_slab();

        if slab.ghost && self.ghost.is_none() {
            self.ghost = Some(BitSet::new(self.polygons.len()));
        }

        let mut slicer = MeshSlicer::new(*options);
        let (cap, ghost) = (slab.is_capped(), slab.ghost);

        match &slab.primitive {
            SlabPrimitive::None => {}
            SlabPrimitive::Plane(plane) => {
                slicer.intersect(self, &CutSurface::Plane(*plane), cap, ghost)
            }
            SlabPrimitive::Within { distance, centers } => {
                let surface = CutSurface::Sphere {
                    distance: *distance,
                    centers,
                };
                slicer.intersect(self, &surface, false, ghost);
            }
            SlabPrimitive::Range { min, max } => {
                // Outside of `[max, min]`: union of the two one-sided cuts.
                let before = (max < min).then(|| self.active_display().clone());
                slicer.intersect(self, &CutSurface::MinValue(*min), cap, ghost);
                let after_min = before.map(|before| core::mem::replace(self.active_display_mut(), before));
                slicer.intersect(self, &CutSurface::MaxValue(*max), cap, ghost);
                if let Some(after_min) = after_min {
                    self.active_display_mut().union_with(&after_min);
                }
            }
            SlabPrimitive::Box(corners) => {
                let faces = corners.face_planes().ok_or(SlabError::DegenerateBox)?;
                for face in faces {
                    slicer.intersect(self, &CutSurface::Plane(face), false, ghost);
                }
            }
            SlabPrimitive::Data(data) => {
                slicer.intersect(self, &CutSurface::Data(data), false, ghost)
            }
            SlabPrimitive::Sources(set) => {
                slicer.intersect(self, &CutSurface::Sources(set), cap, ghost)
            }
            SlabPrimitive::Brillouin(_) => {
                if let Some(cell) = brillouin_cell {
                    self.slab_brillouin(&cell, &mut slicer);
                }
            }
        }

        self.record_slab_option(&slab.description());
        Ok(())
    }

    fn check_slab(&self, primitive: &SlabPrimitive) -> Result<(), SlabError> {
        match primitive {
            SlabPrimitive::Range { .. } if self.values.is_none() => {
                Err(SlabError::MissingVertexValues)
            }
            SlabPrimitive::Sources(_) if self.sources.is_none() => {
                Err(SlabError::MissingVertexSources)
            }
            SlabPrimitive::Data(data) if data.len() < self.vertices.len() => {
                Err(SlabError::DataLengthMismatch {
                    found: data.len(),
                    expected: self.vertices.len(),
                })
            }
            SlabPrimitive::Within { centers, .. } if centers.is_empty() => {
                Err(SlabError::NoReferencePoints)
            }
            SlabPrimitive::Box(corners) if corners.face_planes().is_none() => {
                Err(SlabError::DegenerateBox)
            }
            _ => Ok(()),
        }
    }

    /// The polygon display set, or the vertex display set of a point cloud.
    fn active_display(&self) -> &BitSet {
        if self.is_point_cloud() {
            &self.vertex_display
        } else {
            &self.display
        }
    }

    fn active_display_mut(&mut self) -> &mut BitSet {
        if self.is_point_cloud() {
            &mut self.vertex_display
        } else {
            &mut self.display
        }
    }

    fn clear_visibility(&mut self, i: usize, target: Visibility) {
        match target {
            Visibility::Displayed => self.display.remove(i),
            Visibility::Ghost => self.set_ghost(i, false),
            Visibility::Hidden => {}
        }
    }
}

/// Splits the polygons of a mesh along a [`CutSurface`].
pub(crate) struct MeshSlicer {
    pub options: SlabOptions,
    /// Keep the polygons lying on the cutting surface instead of discarding them.
    pub keep_coplanar: bool,
    /// One capper per vertex set.
    cappers: HashMap<u32, MeshCapper>,
}

impl MeshSlicer {
    pub fn new(options: SlabOptions) -> Self {
        Self {
            options,
            keep_coplanar: false,
            cappers: HashMap::default(),
        }
    }

    fn snap_distance(&self, d: Real) -> Real {
        if d.abs() < self.options.distance_epsilon {
            0.0
        } else {
            d
        }
    }

    fn snap_fraction(&self, f: Real) -> Real {
        if f < self.options.fraction_epsilon {
            0.0
        } else if f > 1.0 - self.options.fraction_epsilon {
            1.0
        } else {
            f
        }
    }

    /// The snapped signed distance of every vertex of the mesh.
    pub fn vertex_distances(&self, mesh: &Mesh, surface: &CutSurface) -> Vec<Real> {
        mesh.vertices
            .iter()
            .enumerate()
            .map(|(i, pt)| {
                let value = mesh.values.as_ref().map(|v| v[i]);
                let source = mesh.sources.as_ref().and_then(|s| s[i]);
                self.snap_distance(surface.distance(i, pt, value, source))
            })
            .collect()
    }

    /// Cuts every polygon of `mesh` along `surface`.
    ///
    /// Polygons on the discarded side (positive distances) leave their set,
    /// and join the ghost set if `ghost` is set. Polygons crossing the surface
    /// are replaced by their fragments. The new boundary is closed if `cap` is
    /// set, separately for each vertex set.
    pub fn intersect(&mut self, mesh: &mut Mesh, surface: &CutSurface, cap: bool, ghost: bool) {
        self.cut(mesh, surface, cap, ghost);
        if cap {
            self.close_caps(mesh, surface);
        }
    }

    /// Splits the polygons, collecting the new boundary in the cappers if
    /// `cap` is set.
    fn cut(&mut self, mesh: &mut Mesh, surface: &CutSurface, cap: bool, ghost: bool) {
        let d = self.vertex_distances(mesh, surface);

        if mesh.is_point_cloud() {
            for (i, di) in d.iter().enumerate() {
                if di.is_nan() || *di > 0.0 {
                    mesh.vertex_display.remove(i);
                }
            }
            return;
        }

        self.cappers.clear();
        let mut edge_map = VertexKeyMap::default();
        let polygon_count = mesh.polygons.len();

        for i in 0..polygon_count {
            let Some(tri) = mesh.valid_triangle(i) else {
                continue;
            };
            let Some(polygon) = mesh.polygons[i] else {
                continue;
            };

            let target = if mesh.is_ghost(i) {
                Visibility::Ghost
            } else {
                Visibility::Displayed
            };
            let tossed_set = if ghost {
                Visibility::Ghost
            } else {
                Visibility::Hidden
            };

            let dist = tri.map(|v| d[v as usize]);
            let kept = dist.map(|x| x < 0.0);
            let kept_count = kept.iter().filter(|k| **k).count();
            let vertex_set = mesh.vertex_attributes(tri[0]).set;

            match kept_count {
                3 => continue,
                0 if self.keep_coplanar && dist.iter().all(|x| *x == 0.0) => continue,
                0 => {
                    mesh.clear_visibility(i, target);
                    if ghost {
                        mesh.set_ghost(i, true);
                    }
                    continue;
                }
                _ => {}
            }

            // The lone vertex is the one alone on its side of the cut.
            let lone_kept = kept_count == 1;
            let k = kept.iter().position(|x| *x == lone_kept).unwrap_or(0);
            let (l, n1, n2) = (tri[k], tri[(k + 1) % 3], tri[(k + 2) % 3]);
            let (dl, d1, d2) = (dist[k], dist[(k + 1) % 3], dist[(k + 2) % 3]);
            let edges = [0, 1, 2].map(|j| polygon.edges.edge(k + j));

            let fd = self.fraction(mesh, surface, l, n1, dl, d1);
            let fe = self.fraction(mesh, surface, l, n2, dl, d2);
            let (kd, ke) = if lone_kept { (l, l) } else { (n1, n2) };

            // The cut goes through the lone vertex.
            if fd == 0.0 || fe == 0.0 {
                if lone_kept {
                    mesh.clear_visibility(i, target);
                    if ghost {
                        mesh.set_ghost(i, true);
                    }
                }

                // It still runs along an edge when only one side snapped.
                if cap && fd != fe {
                    let vd = Self::crossing_vertex(mesh, &mut edge_map, l, n1, fd, kd);
                    let ve = Self::crossing_vertex(mesh, &mut edge_map, l, n2, fe, ke);
                    let (from, to) = if lone_kept { (ve, vd) } else { (vd, ve) };
                    self.add_cap_edge(vertex_set, from, to, mesh);
                }
                continue;
            }

            // The cut runs along the edge opposite to the lone vertex.
            if fd == 1.0 && fe == 1.0 {
                if !lone_kept {
                    mesh.clear_visibility(i, target);
                    if ghost {
                        mesh.set_ghost(i, true);
                    }
                }
                if cap {
                    let (from, to) = if lone_kept { (n2, n1) } else { (n1, n2) };
                    self.add_cap_edge(vertex_set, from, to, mesh);
                }
                continue;
            }

            let vd = Self::crossing_vertex(mesh, &mut edge_map, l, n1, fd, kd);
            let ve = Self::crossing_vertex(mesh, &mut edge_map, l, n2, fe, ke);

            let (lone_set, other_set) = if lone_kept {
                (target, tossed_set)
            } else {
                (tossed_set, target)
            };
            let pieces = [
                ([l, vd, ve], [edges[0], true, edges[2]], lone_set),
                ([vd, n1, n2], [edges[0], edges[1], false], other_set),
                ([vd, n2, ve], [false, edges[2], true], other_set),
            ];

            for (indices, flags, set) in pieces {
                if set == Visibility::Hidden || !is_proper_triangle(&indices) {
                    continue;
                }

                let piece = MeshPolygon {
                    indices,
                    edges: EdgeFlags::from_edges(flags),
                    contour: polygon.contour,
                };
                let _ = mesh.push_polygon(piece, set);
            }

            mesh.clear_visibility(i, target);

            if cap {
                let (from, to) = if lone_kept { (ve, vd) } else { (vd, ve) };
                self.add_cap_edge(vertex_set, from, to, mesh);
            }
        }
    }

    /// Triangulates the boundary collected by each capper, in set order.
    fn close_caps(&mut self, mesh: &mut Mesh, surface: &CutSurface) {
        let normal = surface.normal();
        let mut writer = CapWriter {
            mesh,
            copies: HashMap::default(),
        };
        let mut sets: Vec<u32> = self.cappers.keys().copied().collect();
        sets.sort_unstable();

        for set in sets {
            let Some(capper) = self.cappers.get_mut(&set) else {
                continue;
            };
            if capper.vertex_count() == 0 {
                continue;
            }
            match capper.create_cap(normal.as_ref(), &mut writer) {
                Ok(count) => {
                    log::debug!("capped the cut of set {} with {} triangles", set, count)
                }
                Err(err) => log::error!("abandoning the cap of set {}: {}", set, err),
            }
        }
    }

    fn add_cap_edge(&mut self, set: u32, from: u32, to: u32, mesh: &Mesh) {
        self.cappers
            .entry(set)
            .or_default()
            .add_edge(from, to, &mesh.vertices);
    }

    fn fraction(
        &self,
        mesh: &Mesh,
        surface: &CutSurface,
        a: u32,
        b: u32,
        da: Real,
        db: Real,
    ) -> Real {
        let (pa, pb) = (&mesh.vertices[a as usize], &mesh.vertices[b as usize]);
        self.snap_fraction(surface.crossing_fraction(pa, pb, da, db))
    }

    /// The vertex at the fraction `f` of the edge `[a, b]`, shared with the
    /// polygons cutting the same edge.
    ///
    /// Its value is interpolated, and its source and set are those of `kept`,
    /// the endpoint on the kept side.
    fn crossing_vertex(
        mesh: &mut Mesh,
        map: &mut VertexKeyMap,
        a: u32,
        b: u32,
        f: Real,
        kept: u32,
    ) -> u32 {
        if f == 0.0 {
            return a;
        }
        if f == 1.0 {
            return b;
        }

        let (pa, pb) = (mesh.vertices[a as usize], mesh.vertices[b as usize]);
        let pt: Point<Real> = pa + (pb - pa) * f;
        let value = mesh
            .values
            .as_ref()
            .map_or(0.0, |v| v[a as usize] + (v[b as usize] - v[a as usize]) * f);
        let attributes = VertexAttributes {
            value,
            ..mesh.vertex_attributes(kept)
        };
        mesh.add_intersection_vertex(pt, attributes, VertexKey::edge(a, b), map)
    }
}

fn is_proper_triangle(indices: &[u32; 3]) -> bool {
    indices[0] != indices[1] && indices[1] != indices[2] && indices[2] != indices[0]
}

/// Appends cap triangles to a mesh, on fresh copies of the boundary vertices.
struct CapWriter<'a> {
    mesh: &'a mut Mesh,
    copies: HashMap<u32, u32>,
}

impl CapWriter<'_> {
    fn copy_vertex(&mut self, v: u32) -> u32 {
        match self.copies.entry(v) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let pt = self.mesh.vertices[v as usize];
                let attributes = VertexAttributes {
                    source: None,
                    ..self.mesh.vertex_attributes(v)
                };
                *e.insert(self.mesh.add_vertex_with_attributes(pt, attributes))
            }
        }
    }
}

impl CapSink for CapWriter<'_> {
    fn push_cap_triangle(&mut self, triangle: CapTriangle) {
        let indices = triangle.indices.map(|v| self.copy_vertex(v));
        let polygon = MeshPolygon::with_edges(indices, EdgeFlags::empty());
        let _ = self.mesh.push_polygon(polygon, Visibility::Displayed);
    }
}
