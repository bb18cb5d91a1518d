use crate::{cube, displayed_area, displayed_volume, triangle_area};
use meshcap::math::{Point, Real};
use meshcap::query::Slab;
use meshcap::shape::{EdgeFlags, Mesh, Plane};

#[test]
fn uncut_cube_is_closed() {
    let mesh = cube();
    assert_eq!(mesh.displayed_polygons().count(), 12);
    assert_relative_eq!(displayed_area(&mesh), 6.0, epsilon = 1.0e-5);
    assert_relative_eq!(displayed_volume(&mesh), 1.0, epsilon = 1.0e-5);
}

fn cap_triangles(mesh: &Mesh) -> Vec<[Point<Real>; 3]> {
    mesh.displayed_polygons()
        .filter(|(_, p)| p.edges == EdgeFlags::empty())
        .map(|(_, p)| p.indices.map(|i| mesh.vertices()[i as usize]))
        .collect()
}

#[test]
fn capped_half_cube() {
    let plane = Plane::from_coefficients(0.0, 0.0, 1.0, -0.5);

    for (plane, up) in [(plane, 1.0), (plane.flipped(), -1.0)] {
        let mut mesh = cube();
        mesh.slab(&Slab::plane(plane).with_cap(true)).unwrap();

        assert_eq!(mesh.displayed_polygons().count(), 16);
        // The side diagonals cross the cut in the middle of the square
        // edges, and those points are not cap corners.
        let caps = cap_triangles(&mesh);
        assert_eq!(caps.len(), 2);

        let cap_area: Real = caps.iter().map(triangle_area).sum();
        assert_relative_eq!(cap_area, 1.0, epsilon = 1.0e-5);
        for tri in &caps {
            for pt in tri {
                assert_relative_eq!(pt.z, 0.5, epsilon = 1.0e-5);
            }
            // Caps face along the cutting plane normal.
            assert!((tri[1] - tri[0]).cross(&(tri[2] - tri[0])).z * up > 0.0);
        }

        assert_relative_eq!(displayed_volume(&mesh), 0.5, epsilon = 1.0e-5);
    }

    let mut mesh = cube();
    mesh.slab(&Slab::plane(plane).with_cap(true)).unwrap();
    assert_eq!(mesh.slab_options(), "cap plane {0 0 1 -0.5}");
}

#[test]
fn cut_next_to_a_vertex_is_capped() {
    // The plane passes within the snapping distance of vertex 0 but not of
    // vertex 2, so one crossing of the face `[0, 1, 2]` lands on vertex 0.
    let vertices = vec![
        Point::new(0.0, 0.0, -1.5e-4),
        Point::new(2.0, 0.0, 2.0),
        Point::new(0.0, 2.0, 1.5e-4),
        Point::new(0.5, 0.5, -1.0),
    ];
    let triangles = vec![[0, 1, 2], [0, 3, 1], [1, 3, 2], [2, 3, 0]];
    let mut mesh = Mesh::new(vertices, triangles).unwrap();
    assert_relative_eq!(displayed_volume(&mesh), 1.0, epsilon = 1.0e-3);

    let plane = Plane::from_coefficients(0.0, 0.0, 1.0, 0.0);
    mesh.slab(&Slab::plane(plane).with_cap(true)).unwrap();

    let cap_area: Real = cap_triangles(&mesh).iter().map(triangle_area).sum();
    assert_relative_eq!(cap_area, 1.0, epsilon = 1.0e-3);
    assert_relative_eq!(displayed_volume(&mesh), 1.0 / 3.0, epsilon = 1.0e-3);
}

#[test]
fn cap_vertices_are_copies() {
    let mut mesh = cube();
    let plane = Plane::from_coefficients(0.0, 0.0, 1.0, -0.5);
    mesh.slab(&Slab::plane(plane).with_cap(true)).unwrap();

    let shell: Vec<u32> = mesh
        .displayed_polygons()
        .filter(|(_, p)| p.edges != EdgeFlags::empty())
        .flat_map(|(_, p)| p.indices)
        .collect();
    for (_, cap) in mesh
        .displayed_polygons()
        .filter(|(_, p)| p.edges == EdgeFlags::empty())
    {
        assert!(cap.indices.iter().all(|i| !shell.contains(i)));
    }
}

#[test]
fn both_halves_partition_the_surface() {
    let plane = Plane::from_coefficients(0.0, 0.0, 1.0, -0.5);

    let mut below = cube();
    below.slab(&Slab::plane(plane)).unwrap();
    let mut above = cube();
    above.slab(&Slab::plane(plane.flipped())).unwrap();

    assert_eq!(below.displayed_polygons().count(), 14);
    assert_eq!(above.displayed_polygons().count(), 14);
    assert_relative_eq!(
        displayed_area(&below) + displayed_area(&above),
        6.0,
        epsilon = 1.0e-4
    );
    assert!(below.displayed_triangles().flatten().all(|p| p.z <= 0.5 + 1.0e-5));
    assert!(above.displayed_triangles().flatten().all(|p| p.z >= 0.5 - 1.0e-5));
}

#[test]
fn ghost_keeps_the_discarded_side() {
    let mut mesh = cube();
    let plane = Plane::from_coefficients(0.0, 0.0, 1.0, -0.5);
    let slab = Slab::plane(plane).with_cap(true).with_ghost(true);
    assert!(!slab.is_capped());
    mesh.slab(&slab).unwrap();

    assert_eq!(mesh.displayed_polygons().count(), 14);
    assert_eq!(mesh.ghost_polygons().count(), 14);
    for (i, _) in mesh.displayed_polygons() {
        assert!(!mesh.is_ghost(i));
    }
    let ghost_area: Real = mesh
        .ghost_polygons()
        .map(|(_, p)| triangle_area(&p.indices.map(|i| mesh.vertices()[i as usize])))
        .sum();
    assert_relative_eq!(ghost_area + displayed_area(&mesh), 6.0, epsilon = 1.0e-4);
    assert_eq!(mesh.slab_options(), "slab ghost plane {0 0 1 -0.5}");
}

#[test]
fn diagonal_cut() {
    let mut mesh = cube();
    let plane = Plane::from_coefficients(1.0, 1.0, 0.0, -1.0);
    mesh.slab(&Slab::plane(plane).with_cap(true)).unwrap();

    let cap_area: Real = mesh
        .displayed_polygons()
        .filter(|(_, p)| p.edges == EdgeFlags::empty())
        .map(|(_, p)| triangle_area(&p.indices.map(|i| mesh.vertices()[i as usize])))
        .sum();
    assert_relative_eq!(cap_area, (2.0 as Real).sqrt(), epsilon = 1.0e-4);
    assert_relative_eq!(displayed_volume(&mesh), 0.5, epsilon = 1.0e-4);
}

#[test]
fn plane_missing_the_mesh() {
    let mut mesh = cube();
    mesh.slab(&Slab::plane(Plane::from_coefficients(0.0, 0.0, 1.0, -2.0)).with_cap(true))
        .unwrap();
    assert_eq!(mesh.displayed_polygons().count(), 12);
    assert_eq!(mesh.vertex_count(), 8);

    mesh.slab(&Slab::plane(Plane::from_coefficients(0.0, 0.0, 1.0, 2.0)))
        .unwrap();
    assert_eq!(mesh.displayed_polygons().count(), 0);
}

#[test]
fn cut_through_a_face() {
    // The cube face `z = 0` lies on the plane and is discarded with the rest.
    let mut mesh = cube();
    mesh.slab(&Slab::plane(Plane::from_coefficients(0.0, 0.0, 1.0, 0.0)))
        .unwrap();
    assert_eq!(mesh.displayed_polygons().count(), 0);

    // Flipped, only that face goes: the side triangles touch the plane
    // through a vertex or an edge and are kept whole.
    let mut mesh = cube();
    mesh.slab(&Slab::plane(Plane::from_coefficients(0.0, 0.0, -1.0, 0.0)))
        .unwrap();
    assert_eq!(mesh.displayed_polygons().count(), 10);
    assert_eq!(mesh.vertex_count(), 8);
    assert_relative_eq!(displayed_area(&mesh), 5.0, epsilon = 1.0e-5);
}

#[test]
fn successive_cuts() {
    let mut mesh = cube();
    let slabs = [
        Slab::plane(Plane::from_coefficients(0.0, 0.0, 1.0, -0.5)).with_cap(true),
        Slab::plane(Plane::from_coefficients(1.0, 0.0, 0.0, -0.5)).with_cap(true),
    ];
    mesh.slab_all(&slabs).unwrap();

    assert_relative_eq!(displayed_volume(&mesh), 0.25, epsilon = 1.0e-4);
    assert_relative_eq!(displayed_area(&mesh), 2.5, epsilon = 1.0e-4);
    assert_eq!(
        mesh.slab_options(),
        "cap plane {0 0 1 -0.5}; cap plane {1 0 0 -0.5}"
    );
}
