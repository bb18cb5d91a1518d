use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::LatticeCell;
use crate::utils::hashmap::Entry;
use crate::utils::{remove_unused_vertices, retain_remapped, BitSet, VertexKey, VertexKeyMap};

/// Indicated an inconsistency while building a mesh.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeshBuilderError {
    /// A triangle references a vertex that does not exist.
    #[error("the triangle {triangle} references the vertex {index}, but the mesh only has {vertex_count} vertices.")]
    IndexOutOfBounds {
        /// The offending triangle.
        triangle: u32,
        /// The out-of-bounds vertex index.
        index: u32,
        /// The number of vertices of the mesh.
        vertex_count: u32,
    },
    /// The number of vertex values differs from the number of vertices.
    #[error("{values} vertex values were given for {vertices} vertices.")]
    ValueCountMismatch {
        /// The number of values given.
        values: usize,
        /// The number of vertices of the mesh.
        vertices: usize,
    },
    /// The number of vertex sources differs from the number of vertices.
    #[error("{sources} vertex sources were given for {vertices} vertices.")]
    SourceCountMismatch {
        /// The number of sources given.
        sources: usize,
        /// The number of vertices of the mesh.
        vertices: usize,
    },
    /// The number of vertex set ids differs from the number of vertices.
    #[error("{sets} vertex set ids were given for {vertices} vertices.")]
    SetCountMismatch {
        /// The number of set ids given.
        sets: usize,
        /// The number of vertices of the mesh.
        vertices: usize,
    },
}

/// The data a mesh may carry for each vertex besides its position.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VertexAttributes {
    /// The scalar value. Ignored if the mesh carries no values.
    pub value: Real,
    /// The source the vertex was generated from, e.g. an atom index.
    /// Ignored if the mesh carries no sources.
    pub source: Option<u32>,
    /// The vertex set, e.g. the connected component, the vertex belongs to.
    /// Ignored if the mesh carries no sets.
    pub set: u32,
}

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
/// The edges of a polygon drawn as boundary edges.
pub struct EdgeFlags(u8);

bitflags::bitflags! {
    impl EdgeFlags: u8 {
        /// The edge from the first to the second vertex.
        const AB = 1;
        /// The edge from the second to the third vertex.
        const BC = 1 << 1;
        /// The edge from the third to the first vertex.
        const CA = 1 << 2;
    }
}

impl EdgeFlags {
    /// Is the edge starting at the `i`-th vertex of the polygon flagged?
    #[inline]
    pub fn edge(self, i: usize) -> bool {
        self.bits() & (1 << (i % 3)) != 0
    }

    /// Builds the flags from one boolean per edge, in `AB`, `BC`, `CA` order.
    #[inline]
    pub fn from_edges(edges: [bool; 3]) -> Self {
        let mut result = EdgeFlags::empty();
        for (i, flagged) in edges.into_iter().enumerate() {
            if flagged {
                result |= EdgeFlags::from_bits_truncate(1 << i);
            }
        }
        result
    }
}

/// The set a polygon belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// The polygon is rendered normally.
    Displayed,
    /// The polygon is part of the translucent preview of a pending slab.
    Ghost,
    /// The polygon is kept in storage but not rendered.
    Hidden,
}

/// A triangle of a [`Mesh`].
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MeshPolygon {
    /// The vertex indices of this triangle.
    pub indices: [u32; 3],
    /// The edges of this triangle rendered as boundary edges.
    pub edges: EdgeFlags,
    /// The contour this triangle belongs to.
    pub contour: u32,
}

impl MeshPolygon {
    /// A triangle with all its edges flagged and no contour.
    pub fn new(indices: [u32; 3]) -> Self {
        Self::with_edges(indices, EdgeFlags::all())
    }

    /// A triangle with the given edge flags and no contour.
    pub fn with_edges(indices: [u32; 3], edges: EdgeFlags) -> Self {
        Self {
            indices,
            edges,
            contour: 0,
        }
    }
}

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SlabBaseline {
    pub polygon_count: usize,
    pub vertex_count: usize,
}

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
/// A triangle mesh, or a point cloud, that can be sliced.
///
/// Polygons are never removed by slicing: the discarded ones are only taken
/// out of the display set, and the new fragments are appended. Use
/// [`Mesh::compact`] to actually drop them.
pub struct Mesh {
    pub(crate) vertices: Vec<Point<Real>>,
    pub(crate) values: Option<Vec<Real>>,
    pub(crate) sources: Option<Vec<Option<u32>>>,
    pub(crate) vertex_sets: Option<Vec<u32>>,
    pub(crate) polygons: Vec<Option<MeshPolygon>>,
    pub(crate) display: BitSet,
    pub(crate) ghost: Option<BitSet>,
    pub(crate) vertex_display: BitSet,
    pub(crate) baseline: Option<SlabBaseline>,
    pub(crate) unit_cell: Option<LatticeCell>,
    bounding_box: Aabb,
    slab_options: String,
}

impl Mesh {
    /// Creates a mesh with every triangle displayed.
    pub fn new(
        vertices: Vec<Point<Real>>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, MeshBuilderError> {
        for (i, tri) in triangles.iter().enumerate() {
            for index in tri {
                if *index as usize >= vertices.len() {
                    return Err(MeshBuilderError::IndexOutOfBounds {
                        triangle: i as u32,
                        index: *index,
                        vertex_count: vertices.len() as u32,
                    });
                }
            }
        }

        let bounding_box = Aabb::from_points(vertices.iter().copied());
        let display = BitSet::full(triangles.len());
        let vertex_display = BitSet::full(vertices.len());
        let polygons = triangles
            .into_iter()
            .map(|idx| Some(MeshPolygon::new(idx)))
            .collect();

        Ok(Self {
            vertices,
            values: None,
            sources: None,
            vertex_sets: None,
            polygons,
            display,
            ghost: None,
            vertex_display,
            baseline: None,
            unit_cell: None,
            bounding_box,
            slab_options: String::new(),
        })
    }

    /// Creates a mesh carrying one scalar value per vertex.
    pub fn with_values(
        vertices: Vec<Point<Real>>,
        values: Vec<Real>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, MeshBuilderError> {
        if values.len() != vertices.len() {
            return Err(MeshBuilderError::ValueCountMismatch {
                values: values.len(),
                vertices: vertices.len(),
            });
        }

        let mut result = Self::new(vertices, triangles)?;
        result.values = Some(values);
        Ok(result)
    }

    /// Creates a mesh without polygons.
    pub fn from_points(vertices: Vec<Point<Real>>) -> Self {
        let bounding_box = Aabb::from_points(vertices.iter().copied());
        Self {
            vertex_display: BitSet::full(vertices.len()),
            vertices,
            values: None,
            sources: None,
            vertex_sets: None,
            polygons: Vec::new(),
            display: BitSet::default(),
            ghost: None,
            baseline: None,
            unit_cell: None,
            bounding_box,
            slab_options: String::new(),
        }
    }

    /// The vertex buffer of this mesh.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The per-vertex scalar values, if any.
    #[inline]
    pub fn values(&self) -> Option<&[Real]> {
        self.values.as_deref()
    }

    /// The source of every vertex, if this mesh carries sources.
    #[inline]
    pub fn vertex_sources(&self) -> Option<&[Option<u32>]> {
        self.sources.as_deref()
    }

    /// Attaches one source to every vertex, or drops the sources.
    ///
    /// Vertices created by slicing take the source of the vertex they were
    /// interpolated from on the kept side.
    pub fn set_vertex_sources(
        &mut self,
        sources: Option<Vec<Option<u32>>>,
    ) -> Result<(), MeshBuilderError> {
        if let Some(sources) = &sources {
            if sources.len() != self.vertices.len() {
                return Err(MeshBuilderError::SourceCountMismatch {
                    sources: sources.len(),
                    vertices: self.vertices.len(),
                });
            }
        }

        self.sources = sources;
        Ok(())
    }

    /// The set id of every vertex, if this mesh carries vertex sets.
    #[inline]
    pub fn vertex_sets(&self) -> Option<&[u32]> {
        self.vertex_sets.as_deref()
    }

    /// Attaches one set id to every vertex, or drops the sets.
    ///
    /// The boundary of a capped cut is capped separately for each set.
    pub fn set_vertex_sets(&mut self, sets: Option<Vec<u32>>) -> Result<(), MeshBuilderError> {
        if let Some(sets) = &sets {
            if sets.len() != self.vertices.len() {
                return Err(MeshBuilderError::SetCountMismatch {
                    sets: sets.len(),
                    vertices: self.vertices.len(),
                });
            }
        }

        self.vertex_sets = sets;
        Ok(())
    }

    /// The value, source and set of the `i`-th vertex.
    ///
    /// Data this mesh does not carry reads as the default.
    pub fn vertex_attributes(&self, i: u32) -> VertexAttributes {
        let i = i as usize;
        VertexAttributes {
            value: self.values.as_ref().map_or(0.0, |v| v[i]),
            source: self.sources.as_ref().and_then(|s| s[i]),
            set: self.vertex_sets.as_ref().map_or(0, |s| s[i]),
        }
    }

    /// The polygons of this mesh. Invalidated polygons are `None`.
    #[inline]
    pub fn polygons(&self) -> &[Option<MeshPolygon>] {
        &self.polygons
    }

    /// The `i`-th polygon, unless it does not exist or was invalidated.
    #[inline]
    pub fn polygon(&self, i: usize) -> Option<&MeshPolygon> {
        self.polygons.get(i).and_then(|p| p.as_ref())
    }

    /// The number of vertices of this mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The number of polygons of this mesh, invalidated ones included.
    #[inline]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Is this mesh a point cloud?
    #[inline]
    pub fn is_point_cloud(&self) -> bool {
        self.polygons.is_empty()
    }

    /// The set of displayed polygons.
    #[inline]
    pub fn display(&self) -> &BitSet {
        &self.display
    }

    /// The set of ghost polygons, if the last slab was a ghost slab.
    #[inline]
    pub fn ghost(&self) -> Option<&BitSet> {
        self.ghost.as_ref()
    }

    /// The set of displayed vertices of a point cloud.
    #[inline]
    pub fn vertex_display(&self) -> &BitSet {
        &self.vertex_display
    }

    /// Is the `i`-th polygon displayed?
    #[inline]
    pub fn is_displayed(&self, i: usize) -> bool {
        self.display.contains(i)
    }

    /// Is the `i`-th polygon a ghost?
    #[inline]
    pub fn is_ghost(&self, i: usize) -> bool {
        self.ghost.as_ref().is_some_and(|g| g.contains(i))
    }

    /// The set the `i`-th polygon belongs to. Displayed polygons take precedence.
    pub fn visibility(&self, i: usize) -> Visibility {
        if self.is_displayed(i) {
            Visibility::Displayed
        } else if self.is_ghost(i) {
            Visibility::Ghost
        } else {
            Visibility::Hidden
        }
    }

    /// Sets the display bit of the `i`-th polygon.
    pub fn set_display(&mut self, i: usize, displayed: bool) {
        self.display.set(i, displayed);
    }

    /// Sets the ghost bit of the `i`-th polygon, creating the ghost set if needed.
    pub fn set_ghost(&mut self, i: usize, ghost: bool) {
        if ghost {
            self.ghost.get_or_insert_with(BitSet::default).insert(i);
        } else if let Some(set) = &mut self.ghost {
            set.remove(i);
        }
    }

    /// Iterates through the displayed polygons and their indices.
    pub fn displayed_polygons(&self) -> impl Iterator<Item = (usize, &MeshPolygon)> + '_ {
        self.display
            .ones()
            .filter_map(|i| self.polygon(i).map(|p| (i, p)))
    }

    /// Iterates through the ghost polygons and their indices.
    pub fn ghost_polygons(&self) -> impl Iterator<Item = (usize, &MeshPolygon)> + '_ {
        self.ghost
            .iter()
            .flat_map(|g| g.ones())
            .filter_map(|i| self.polygon(i).map(|p| (i, p)))
    }

    /// The vertex positions of the displayed polygons.
    pub fn displayed_triangles(&self) -> impl Iterator<Item = [Point<Real>; 3]> + '_ {
        self.displayed_polygons()
            .map(|(_, p)| p.indices.map(|i| self.vertices[i as usize]))
    }

    /// Appends a vertex with default attributes.
    pub fn add_vertex(&mut self, pt: Point<Real>) -> u32 {
        self.add_vertex_with_attributes(pt, VertexAttributes::default())
    }

    /// Appends a vertex with its scalar value.
    ///
    /// The value is ignored if this mesh does not carry values.
    pub fn add_vertex_with_value(&mut self, pt: Point<Real>, value: Real) -> u32 {
        self.add_vertex_with_attributes(
            pt,
            VertexAttributes {
                value,
                ..VertexAttributes::default()
            },
        )
    }

    /// Appends a vertex with its value, source and set.
    pub fn add_vertex_with_attributes(&mut self, pt: Point<Real>, attributes: VertexAttributes) -> u32 {
        let id = self.vertices.len();
        self.vertices.push(pt);
        if let Some(values) = &mut self.values {
            values.push(attributes.value);
        }
        if let Some(sources) = &mut self.sources {
            sources.push(attributes.source);
        }
        if let Some(sets) = &mut self.vertex_sets {
            sets.push(attributes.set);
        }
        self.vertex_display.insert(id);
        id as u32
    }

    /// Appends a displayed triangle with all its edges flagged.
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) -> Result<u32, MeshBuilderError> {
        self.add_polygon(MeshPolygon::new([a, b, c]), Visibility::Displayed)
    }

    /// Appends a polygon to the set selected by `visibility`.
    pub fn add_polygon(
        &mut self,
        polygon: MeshPolygon,
        visibility: Visibility,
    ) -> Result<u32, MeshBuilderError> {
        if let Some(index) = polygon
            .indices
            .iter()
            .find(|i| **i as usize >= self.vertices.len())
        {
            return Err(MeshBuilderError::IndexOutOfBounds {
                triangle: self.polygons.len() as u32,
                index: *index,
                vertex_count: self.vertices.len() as u32,
            });
        }

        Ok(self.push_polygon(polygon, visibility))
    }

    pub(crate) fn push_polygon(&mut self, polygon: MeshPolygon, visibility: Visibility) -> u32 {
        let id = self.polygons.len();
        self.polygons.push(Some(polygon));
        self.display.resize(id + 1);
        if let Some(ghost) = &mut self.ghost {
            ghost.resize(id + 1);
        }

        match visibility {
            Visibility::Displayed => self.display.insert(id),
            Visibility::Ghost => self.set_ghost(id, true),
            Visibility::Hidden => {}
        }

        id as u32
    }

    /// Appends a vertex created while slicing, or returns the vertex already
    /// registered in `map` under the same key.
    ///
    /// [`VertexKey::Unkeyed`] vertices are always created.
    pub fn add_intersection_vertex(
        &mut self,
        pt: Point<Real>,
        attributes: VertexAttributes,
        key: VertexKey,
        map: &mut VertexKeyMap,
    ) -> u32 {
        if key == VertexKey::Unkeyed {
            return self.add_vertex_with_attributes(pt, attributes);
        }

        match map.entry(key) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let id = self.vertices.len() as u32;
                let _ = e.insert(id);
                self.add_vertex_with_attributes(pt, attributes)
            }
        }
    }

    fn is_valid_vertex(&self, i: u32) -> bool {
        let i = i as usize;
        i < self.vertices.len()
            && !self.vertices[i].coords.iter().any(|x| x.is_nan())
            && self
                .values
                .as_ref()
                .map_or(true, |values| !values[i].is_nan())
    }

    /// The vertex indices of the `i`-th polygon if it can be sliced.
    ///
    /// A polygon can be sliced if it is displayed or a ghost, and none of its
    /// vertices have a NaN coordinate or value.
    pub fn valid_triangle(&self, i: usize) -> Option<[u32; 3]> {
        if !self.is_displayed(i) && !self.is_ghost(i) {
            return None;
        }

        let polygon = self.polygon(i)?;
        polygon
            .indices
            .iter()
            .all(|v| self.is_valid_vertex(*v))
            .then_some(polygon.indices)
    }

    /// Replaces by `None` every displayed polygon referencing a NaN vertex or value.
    pub fn invalidate_polygons(&mut self) {
        for i in 0..self.polygons.len() {
            if !self.display.contains(i) {
                continue;
            }

            let invalid = match &self.polygons[i] {
                Some(p) => !p.indices.iter().all(|v| self.is_valid_vertex(*v)),
                None => false,
            };

            if invalid {
                self.polygons[i] = None;
                self.display.remove(i);
            }
        }
    }

    /// Removes invalidated polygons, polygons referencing NaN data and
    /// unreferenced vertices, then remaps every index.
    ///
    /// The slab baseline is forgotten: slabs applied before compaction can no
    /// longer be undone.
    pub fn compact(&mut self) {
        self.baseline = None;

        if self.polygons.is_empty() {
            return;
        }

        let mut kept = Vec::with_capacity(self.polygons.len());
        let mut display = BitSet::new(0);
        let mut ghost = self.ghost.as_ref().map(|_| BitSet::new(0));

        for i in 0..self.polygons.len() {
            let Some(polygon) = self.polygons[i] else {
                continue;
            };
            if !polygon.indices.iter().all(|v| self.is_valid_vertex(*v)) {
                continue;
            }

            let id = kept.len();
            display.set(id, self.display.contains(i));
            if let Some(ghost) = &mut ghost {
                ghost.set(id, self.is_ghost(i));
            }
            kept.push(polygon);
        }

        let mut idx: Vec<[u32; 3]> = kept.iter().map(|p| p.indices).collect();
        let remap = remove_unused_vertices(&mut self.vertices, self.values.as_mut(), &mut idx);
        if let Some(sources) = &mut self.sources {
            retain_remapped(sources, &remap);
        }
        if let Some(sets) = &mut self.vertex_sets {
            retain_remapped(sets, &remap);
        }

        let mut vertex_display = BitSet::new(self.vertices.len());
        for (old, new) in remap.iter().enumerate() {
            if let Some(new) = new {
                vertex_display.set(*new as usize, self.vertex_display.contains(old));
            }
        }

        for (polygon, indices) in kept.iter_mut().zip(idx) {
            polygon.indices = indices;
        }

        display.resize(kept.len());
        if let Some(ghost) = &mut ghost {
            ghost.resize(kept.len());
        }

        log::debug!(
            "compacted mesh from {} to {} polygons",
            self.polygons.len(),
            kept.len()
        );

        self.polygons = kept.into_iter().map(Some).collect();
        self.display = display;
        self.ghost = ghost;
        self.vertex_display = vertex_display;
    }

    /// Records the current polygon and vertex counts if no slab was applied yet.
    pub(crate) fn begin_slab(&mut self) {
        if self.baseline.is_none() {
            self.baseline = Some(SlabBaseline {
                polygon_count: self.polygons.len(),
                vertex_count: self.vertices.len(),
            });
        }
    }

    /// Undoes every slab applied since the first one.
    ///
    /// Polygons and vertices appended by slicing are dropped, every polygon is
    /// displayed again, and the ghost set is removed.
    pub fn reset_slab(&mut self) {
        if let Some(baseline) = self.baseline {
            self.polygons.truncate(baseline.polygon_count);
            self.vertices.truncate(baseline.vertex_count);
            if let Some(values) = &mut self.values {
                values.truncate(baseline.vertex_count);
            }
            if let Some(sources) = &mut self.sources {
                sources.truncate(baseline.vertex_count);
            }
            if let Some(sets) = &mut self.vertex_sets {
                sets.truncate(baseline.vertex_count);
            }
        }

        self.display = BitSet::full(self.polygons.len());
        self.vertex_display = BitSet::full(self.vertices.len());
        self.ghost = None;
        self.slab_options.clear();
        self.record_slab_option("slab none");
    }

    /// The descriptions of the slabs applied to this mesh, separated by `"; "`.
    pub fn slab_options(&self) -> &str {
        &self.slab_options
    }

    pub(crate) fn record_slab_option(&mut self, description: &str) {
        if self.slab_options.split("; ").any(|s| s == description) {
            return;
        }

        if !self.slab_options.is_empty() {
            self.slab_options.push_str("; ");
        }
        self.slab_options.push_str(description);
    }

    /// The bounding box of this mesh.
    pub fn bounding_box(&self) -> &Aabb {
        &self.bounding_box
    }

    /// Recomputes the bounding box from the vertices of the displayed
    /// polygons, or from the displayed vertices of a point cloud.
    pub fn recompute_bounding_box(&mut self) {
        self.bounding_box = if self.is_point_cloud() {
            Aabb::from_points(self.vertex_display.ones().map(|i| self.vertices[i]))
        } else {
            Aabb::from_points(
                self.displayed_polygons()
                    .flat_map(|(_, p)| p.indices)
                    .map(|i| self.vertices[i as usize]),
            )
        };
    }

    /// The lattice cell used by Brillouin slabs that do not carry their own.
    pub fn unit_cell(&self) -> Option<&LatticeCell> {
        self.unit_cell.as_ref()
    }

    /// Sets the lattice cell used by Brillouin slabs that do not carry their own.
    pub fn set_unit_cell(&mut self, cell: Option<LatticeCell>) {
        self.unit_cell = cell;
    }

    pub(crate) fn translate_vertex(&mut self, i: u32, shift: &Vector<Real>) {
        self.vertices[i as usize] += shift;
    }
}
