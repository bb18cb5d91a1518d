use crate::{cube, cube_points, cube_triangles, displayed_area};
use meshcap::math::{Point, Real, Vector};
use meshcap::query::{Slab, SlabError};
use meshcap::shape::{Mesh, MeshBuilderError, Plane, Visibility};

#[test]
fn reset_restores_the_original_mesh() {
    let mut mesh = cube();
    let plane = Plane::from_coefficients(0.0, 0.0, 1.0, -0.5);
    mesh.slab(&Slab::plane(plane).with_cap(true)).unwrap();
    assert!(mesh.vertex_count() > 8);

    mesh.slab(&Slab::none()).unwrap();
    assert_eq!(mesh.polygon_count(), 12);
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.displayed_polygons().count(), 12);
    assert_eq!(mesh.slab_options(), "slab none");

    mesh.slab(&Slab::none()).unwrap();
    assert_eq!(mesh.polygon_count(), 12);
    assert_eq!(mesh.slab_options(), "slab none");

    // Slabs can be applied again from the restored state.
    mesh.slab(&Slab::plane(plane)).unwrap();
    assert_eq!(mesh.displayed_polygons().count(), 14);
    assert_eq!(mesh.slab_options(), "slab none; slab plane {0 0 1 -0.5}");
}

#[test]
fn reset_drops_ghosts() {
    let mut mesh = cube();
    let plane = Plane::from_coefficients(0.0, 0.0, 1.0, -0.5);
    mesh.slab(&Slab::plane(plane).with_ghost(true)).unwrap();
    assert!(mesh.ghost().is_some());

    mesh.slab(&Slab::none()).unwrap();
    assert!(mesh.ghost().is_none());
    assert_eq!(mesh.visibility(0), Visibility::Displayed);
}

#[test]
fn repeated_slab_is_logged_once() {
    let mut mesh = cube();
    let slab = Slab::plane(Plane::from_coefficients(0.0, 0.0, 1.0, -0.5));
    mesh.slab_all(&[slab.clone(), slab]).unwrap();
    assert_eq!(mesh.slab_options(), "slab plane {0 0 1 -0.5}");
    assert_eq!(mesh.displayed_polygons().count(), 14);
}

#[test]
fn slab_all_stops_at_the_first_error() {
    let mut mesh = cube();
    let slabs = [
        Slab::plane(Plane::from_coefficients(0.0, 0.0, 1.0, -0.5)),
        Slab::new(meshcap::query::SlabPrimitive::Range { min: 0.0, max: 1.0 }),
        Slab::plane(Plane::from_coefficients(1.0, 0.0, 0.0, -0.5)),
    ];
    assert_eq!(mesh.slab_all(&slabs), Err(SlabError::MissingVertexValues));
    assert_eq!(mesh.slab_options(), "slab plane {0 0 1 -0.5}");
}

#[test]
fn compact_drops_unused_data() {
    let mut points = cube_points();
    points.push(Point::new(Real::NAN, 0.0, 0.0));
    let mut triangles = cube_triangles();
    triangles.push([0, 1, 8]);
    let mut mesh = Mesh::new(points, triangles).unwrap();

    // Polygons with NaN vertices are never sliced.
    mesh.slab(&Slab::plane(Plane::from_coefficients(0.0, 0.0, 1.0, -0.5)))
        .unwrap();
    assert!(mesh.is_displayed(12));

    mesh.invalidate_polygons();
    assert!(mesh.polygon(12).is_none());

    let area = displayed_area(&mesh);
    mesh.compact();
    assert!(mesh.polygons().iter().all(|p| p.is_some()));
    assert!(mesh.vertices().iter().all(|p| !p.x.is_nan()));
    assert_relative_eq!(displayed_area(&mesh), area, epsilon = 1.0e-5);
    assert_eq!(mesh.displayed_polygons().count(), 14);

    // The baseline is gone: resetting redisplays every stored polygon.
    let count = mesh.polygon_count();
    mesh.slab(&Slab::none()).unwrap();
    assert_eq!(mesh.polygon_count(), count);
    assert_eq!(mesh.displayed_polygons().count(), count);
}

#[test]
fn builder_errors() {
    assert_eq!(
        Mesh::new(cube_points(), vec![[0, 1, 8]]).unwrap_err(),
        MeshBuilderError::IndexOutOfBounds {
            triangle: 0,
            index: 8,
            vertex_count: 8
        }
    );
    assert_eq!(
        Mesh::with_values(cube_points(), vec![0.0; 3], cube_triangles()).unwrap_err(),
        MeshBuilderError::ValueCountMismatch {
            values: 3,
            vertices: 8
        }
    );

    let mut mesh = cube();
    assert!(mesh.add_triangle(0, 1, 9).is_err());
    assert_eq!(mesh.add_triangle(0, 1, 2), Ok(12));
}

#[test]
fn empty_mesh_cannot_be_sliced() {
    let mut mesh = Mesh::new(Vec::new(), Vec::new()).unwrap();
    assert_eq!(
        mesh.slab(&Slab::plane(Plane::from_coefficients(0.0, 0.0, 1.0, 0.0))),
        Err(SlabError::EmptyMesh)
    );
}

#[test]
fn bounding_box_follows_the_display() {
    let mut mesh = cube();
    mesh.slab(&Slab::plane(Plane::from_coefficients(0.0, 0.0, 1.0, -0.5)))
        .unwrap();
    mesh.recompute_bounding_box();
    assert_relative_eq!(mesh.bounding_box().maxs, Point::new(1.0, 1.0, 0.5), epsilon = 1.0e-5);
    assert_relative_eq!(mesh.bounding_box().mins, Point::origin());
    assert_relative_eq!(
        mesh.bounding_box().extents(),
        Vector::new(1.0, 1.0, 0.5),
        epsilon = 1.0e-5
    );
}
