use crate::{cube_points, triangle_area};
use meshcap::math::{Point, Real, Vector};
use meshcap::transformation::{triangulate_faces, CapSink, CapTriangle, MeshCapper};

#[test]
fn cube_faces() {
    let faces = vec![
        vec![0, 2, 6, 4],
        vec![4, 6, 7, 5],
        vec![5, 7, 3, 1],
        vec![1, 3, 2, 0],
        vec![2, 3, 7, 6],
        vec![0, 4, 5, 1],
    ];
    let points = cube_points();
    let (triangles, ranges) = triangulate_faces(&faces, &points).unwrap();

    assert_eq!(triangles.len(), 12);
    for (face, range) in faces.iter().zip(ranges) {
        assert_eq!(range.len(), 2);
        let area: Real = triangles[range]
            .iter()
            .map(|t| {
                assert!(t.indices.iter().all(|i| face.contains(i)));
                // The diagonal is the only unflagged edge.
                assert_eq!(t.edges.bits().count_ones(), 2);
                triangle_area(&t.indices.map(|i| points[i as usize]))
            })
            .sum();
        assert_relative_eq!(area, 1.0, epsilon = 1.0e-6);
    }
}

/// Sums the triangles and checks their orientation against a normal.
struct Oriented {
    vertices: Vec<Point<Real>>,
    normal: Vector<Real>,
    area: Real,
    count: usize,
}

impl CapSink for Oriented {
    fn push_cap_triangle(&mut self, triangle: CapTriangle) {
        let [a, b, c] = triangle.indices.map(|i| self.vertices[i as usize]);
        let n = (b - a).cross(&(c - a));
        assert!(n.dot(&self.normal) > 0.0);
        self.area += n.norm() / 2.0;
        self.count += 1;
    }
}

#[test]
fn tilted_frame_with_hole() {
    // A square frame in the plane `x + y + z = 0`, given edge by edge.
    let u = Vector::new(1.0, -1.0, 0.0).normalize();
    let v = Vector::new(1.0, 1.0, -2.0).normalize();
    let at = |x: Real, y: Real| Point::origin() + u * x + v * y;
    let vertices = vec![
        at(-2.0, -2.0),
        at(2.0, -2.0),
        at(2.0, 2.0),
        at(-2.0, 2.0),
        at(-1.0, -1.0),
        at(-1.0, 1.0),
        at(1.0, 1.0),
        at(1.0, -1.0),
    ];

    let mut capper = MeshCapper::new();
    for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0), (4, 5), (5, 6), (6, 7), (7, 4)] {
        capper.add_edge(a, b, &vertices);
    }

    let normal = u.cross(&v);
    let mut sink = Oriented {
        vertices,
        normal,
        area: 0.0,
        count: 0,
    };
    let count = capper.create_cap(None, &mut sink).unwrap();
    assert_eq!(count, 8);
    assert_eq!(sink.count, 8);
    assert_relative_eq!(sink.area, 12.0, epsilon = 1.0e-4);
    assert_eq!(capper.vertex_count(), 0);
}
