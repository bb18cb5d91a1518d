use crate::{cube_points, cube_triangles, displayed_area};
use meshcap::math::{Point, Real, Vector};
use meshcap::query::{Slab, SlabError, SlabOptions, SlabPrimitive};
use meshcap::shape::{LatticeCell, Mesh};

fn cubic_cell() -> LatticeCell {
    LatticeCell::new(Point::origin(), Vector::x(), Vector::y(), Vector::z())
}

/// A cube of side `1.6` centered on the origin, overlapping its neighbor cells.
fn large_cube() -> Mesh {
    let points = cube_points()
        .into_iter()
        .map(|p| Point::from(p.coords * 1.6 - Vector::repeat(0.8)))
        .collect();
    Mesh::new(points, cube_triangles()).unwrap()
}

#[test]
fn folds_a_point_back_into_the_cell() {
    let mut mesh = Mesh::from_points(vec![Point::new(0.9, 0.0, 0.0)]);
    let slab = Slab::new(SlabPrimitive::Brillouin(Some(cubic_cell())));

    mesh.slab(&slab).unwrap();
    assert_relative_eq!(mesh.vertices()[0], Point::new(-0.1, 0.0, 0.0), epsilon = 1.0e-6);

    // The folded point is a fixed point.
    mesh.slab(&slab).unwrap();
    assert_relative_eq!(mesh.vertices()[0], Point::new(-0.1, 0.0, 0.0), epsilon = 1.0e-6);
}

#[test]
fn folds_a_surface_into_the_cell() {
    let mut mesh = large_cube();
    let area = displayed_area(&mesh);
    mesh.set_unit_cell(Some(cubic_cell()));
    mesh.slab(&Slab::new(SlabPrimitive::Brillouin(None))).unwrap();

    assert!(mesh.ghost().is_none());
    assert_relative_eq!(displayed_area(&mesh), area, epsilon = 1.0e-2);
    for pt in mesh.displayed_triangles().flatten() {
        assert!(pt.iter().all(|x| x.abs() <= 0.5 + 1.0e-3), "{:?}", pt);
    }

    let aabb = mesh.bounding_box();
    assert!(aabb.maxs.iter().all(|x| *x <= 0.5 + 1.0e-3));
    assert!(aabb.mins.iter().all(|x| *x >= -0.5 - 1.0e-3));
    assert_eq!(mesh.slab_options(), "slab none; slab brillouin");
}

#[test]
fn surface_inside_the_cell_is_untouched() {
    let points = cube_points()
        .into_iter()
        .map(|p| Point::from(p.coords * 0.5 - Vector::repeat(0.25)))
        .collect();
    let mut mesh = Mesh::new(points, cube_triangles()).unwrap();
    mesh.slab(&Slab::new(SlabPrimitive::Brillouin(Some(cubic_cell()))))
        .unwrap();

    assert_eq!(mesh.displayed_polygons().count(), 12);
    assert_eq!(mesh.vertex_count(), 8);
}

#[test]
fn bounded_number_of_passes() {
    let mut mesh = large_cube();
    let area = displayed_area(&mesh);
    let options = SlabOptions {
        max_brillouin_passes: 1,
        ..SlabOptions::default()
    };
    mesh.slab_with_options(
        &Slab::new(SlabPrimitive::Brillouin(Some(cubic_cell()))),
        &options,
    )
    .unwrap();

    assert!(mesh.ghost().is_none());
    assert_relative_eq!(displayed_area(&mesh), area, epsilon = 1.0e-2);
    let max: Real = mesh
        .displayed_triangles()
        .flatten()
        .map(|p| p.x.max(p.y).max(p.z))
        .fold(Real::MIN, Real::max);
    assert!(max > 0.5);
}

#[test]
fn folds_into_a_skewed_cell() {
    // Faces of the folded surface end up lying on the bisecting planes of
    // this lattice, and must stay there.
    let cell = LatticeCell::new(
        Point::origin(),
        Vector::new(1.0, 0.0, 0.0),
        Vector::new(0.5, 0.866, 0.0),
        Vector::new(0.0, 0.3, 1.0),
    );
    let fold = |max_brillouin_passes: usize| {
        let points = cube_points()
            .into_iter()
            .map(|p| Point::from(p.coords * 1.7 - Vector::repeat(0.85)))
            .collect();
        let mut mesh = Mesh::new(points, cube_triangles()).unwrap();
        let options = SlabOptions {
            max_brillouin_passes,
            ..SlabOptions::default()
        };
        mesh.slab_with_options(&Slab::new(SlabPrimitive::Brillouin(Some(cell))), &options)
            .unwrap();
        mesh
    };

    let mesh = fold(SlabOptions::default().max_brillouin_passes);
    assert_relative_eq!(displayed_area(&mesh), 1.7 * 1.7 * 6.0, max_relative = 1.0e-2);
    for pt in mesh.displayed_triangles().flatten() {
        for offset in cell.neighbor_offsets() {
            let d = (offset.dot(&pt.coords) - offset.norm_squared() / 2.0) / offset.norm();
            assert!(d <= 1.0e-3, "{:?} beyond the bisector of {:?}", pt, offset);
        }
    }

    // The fold reaches its fixed point long before the pass limit.
    let bounded = fold(100);
    assert_eq!(bounded.polygon_count(), mesh.polygon_count());
    assert_eq!(bounded.vertex_count(), mesh.vertex_count());
}

#[test]
fn needs_a_lattice_cell() {
    let mut mesh = large_cube();
    assert_eq!(
        mesh.slab(&Slab::new(SlabPrimitive::Brillouin(None))),
        Err(SlabError::MissingLatticeCell)
    );
}
