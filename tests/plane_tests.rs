mod support;

use bspcsg::{
    environment::{GeometryEnvironment, Tolerances},
    float_types::Real,
    mesh::{
        plane::{BACK, COPLANAR, FRONT, INDETERMINATE, Plane, SPANNING},
        polygon::Polygon,
    },
    scratch::ScratchPool,
};
use nalgebra::{Point3, Vector3};

use crate::support::make_polygon_3d;

#[test]
fn flip() {
    let plane = Plane::from_normal(Vector3::y(), 2.0);
    let flipped = plane.flipped();
    assert_eq!(flipped.normal(), Vector3::new(0.0, -1.0, 0.0));
    assert_eq!(flipped.offset(), -2.0);
    assert_eq!(flipped.flipped(), plane);
}

#[test]
fn from_points_orientation_and_collinearity() {
    let env = GeometryEnvironment::default();
    let plane = Plane::from_points(
        &Point3::new(0.0, 0.0, 2.0),
        &Point3::new(1.0, 0.0, 2.0),
        &Point3::new(0.0, 1.0, 2.0),
        &env,
    )
    .unwrap();
    assert_eq!(plane.normal(), Vector3::z());
    assert_eq!(plane.offset(), 2.0);

    let collinear = Plane::from_points(
        &Point3::new(0.0, 0.0, 0.0),
        &Point3::new(1.0, 1.0, 1.0),
        &Point3::new(2.0, 2.0, 2.0),
        &env,
    );
    assert!(collinear.is_none());
}

#[test]
fn classification_labels_combine() {
    assert_eq!(FRONT | BACK, SPANNING);
    assert_eq!(COPLANAR | FRONT, FRONT);

    let plane = Plane::from_normal(Vector3::z(), 0.0);
    let tol = 1e-5;
    assert_eq!(plane.orient_point(&Point3::new(0.0, 0.0, 1.0), tol), FRONT);
    assert_eq!(plane.orient_point(&Point3::new(0.0, 0.0, -1.0), tol), BACK);
    assert_eq!(plane.orient_point(&Point3::new(5.0, 5.0, 1e-7), tol), COPLANAR);

    let spanning = make_polygon_3d(&[[0.0, 0.0, -1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]]);
    assert_eq!(plane.classify_polygon(&spanning, tol), SPANNING);
}

#[test]
fn invalid_plane_never_panics() {
    let env = GeometryEnvironment::default();
    let plane = Plane::invalid();
    assert_eq!(plane.orient_point(&Point3::origin(), 1e-5), INDETERMINATE);

    // indeterminate classification keeps the polygon whole
    let poly = make_polygon_3d(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let out = plane.split(&poly, &env);
    assert_eq!(out.coplanar_front, vec![poly]);
    assert_eq!(out.len(), 1);
}

#[test]
fn coplanar_pass_through() {
    let env = GeometryEnvironment::default();
    let poly = make_polygon_3d(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ]);

    let same = Plane::from_normal(Vector3::z(), 0.0);
    let out = same.split(&poly, &env);
    assert_eq!(out.coplanar_front.len(), 1);
    assert_eq!(out.coplanar_front[0].vertices.len(), 4);
    assert!(out.coplanar_back.is_empty() && out.front.is_empty() && out.back.is_empty());

    // opposite normal: routed by the sign of the normal dot product
    let opposite = Plane::from_normal(-Vector3::z(), 0.0);
    let out = opposite.split(&poly, &env);
    assert_eq!(out.coplanar_back.len(), 1);
    assert_eq!(out.coplanar_back[0].vertices.len(), 4);
    assert!(out.coplanar_front.is_empty());
}

#[test]
fn coplanar_by_vertex_classification() {
    let env = GeometryEnvironment::default();
    // tilted a hair off z=0, within the on-plane tolerance
    let poly = make_polygon_3d(&[[0.0, 0.0, 0.0], [1.0, 0.0, 1e-7], [0.0, 1.0, 0.0]]);
    let plane = Plane::from_normal(Vector3::z(), 0.0);
    let out = plane.split(&poly, &env);
    assert_eq!(out.coplanar_front.len(), 1);
    assert_eq!(out.coplanar_front[0].vertices.len(), 3);
}

#[test]
fn spanning_split_triangle_into_triangle_and_quad() {
    let env = GeometryEnvironment::default();
    let plane = Plane::from_normal(Vector3::y(), 0.0);

    // one vertex in front, two behind
    let poly = make_polygon_3d(&[[0.0, 1.0, 0.0], [-1.0, -1.0, 0.0], [1.0, -1.0, 0.0]]);
    let out = plane.split(&poly, &env);

    assert!(out.coplanar_front.is_empty() && out.coplanar_back.is_empty());
    assert_eq!(out.front.len(), 1);
    assert_eq!(out.back.len(), 1);
    assert_eq!(out.front[0].vertices.len(), 3);
    assert_eq!(out.back[0].vertices.len(), 4);

    // the two interpolated vertices lie on the plane and are shared by both sides
    let on_plane: Vec<_> = out.front[0]
        .vertices
        .iter()
        .filter(|v| plane.point_distance(&v.pos).abs() <= env.tolerances.epsilon_on_plane)
        .collect();
    assert_eq!(on_plane.len(), 2);
    for v in on_plane {
        assert!(out.back[0].vertices.contains(v));
    }

    // fragments keep the parent's plane and material
    assert_eq!(out.front[0].plane, poly.plane);
    assert_eq!(out.back[0].material_index, poly.material_index);
}

#[test]
fn spanning_quad_splits_into_two_quads() {
    let env = GeometryEnvironment::default();
    let plane = Plane::from_normal(Vector3::new(0.0, 1.0, 0.0), 0.0);
    let poly = make_polygon_3d(&[
        [-1.0, -1.0, 0.0],
        [1.0, -1.0, 0.0],
        [1.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0],
    ]);

    let mut pool = ScratchPool::new();
    let mut out = Default::default();
    let lost = plane.split_polygon(&poly, 1, &env, &mut pool, &mut out);
    assert_eq!(lost, 0);

    let front = &out.front[0];
    let back = &out.back[0];
    assert_eq!(front.vertices.len(), 4);
    assert_eq!(back.vertices.len(), 4);
    assert!(front.vertices.iter().all(|v| v.pos.y >= -1e-12));
    assert!(back.vertices.iter().all(|v| v.pos.y <= 1e-12));

    // the scratch buffers were handed back
    assert_eq!(pool.pooled(), (2, 1));
}

fn with_max_eccentricity(max_eccentricity: Real) -> GeometryEnvironment {
    let env = GeometryEnvironment::default();
    let tolerances = Tolerances {
        max_eccentricity,
        ..env.tolerances
    };
    env.with_tolerances(tolerances)
}

// a tall thin spike: cut at y = 0 it leaves a sliver in front (eccentricity ~5.5)
// and a squat quad behind (eccentricity ~2)
fn spike() -> Polygon {
    make_polygon_3d(&[[0.0, 10.0, 0.0], [-1.0, -1.0, 0.0], [1.0, -1.0, 0.0]])
}

#[test]
fn collapsed_fragment_is_dropped_and_counted() {
    let env = with_max_eccentricity(5.0);
    let plane = Plane::from_normal(Vector3::y(), 0.0);

    let mut pool = ScratchPool::new();
    let mut out = Default::default();
    let lost = plane.split_polygon(&spike(), 1, &env, &mut pool, &mut out);

    assert_eq!(lost, 3);
    assert!(out.front.is_empty());
    assert_eq!(out.back.len(), 1);
    assert_eq!(out.back[0].vertices.len(), 4);
    assert!(out.coplanar_front.is_empty() && out.coplanar_back.is_empty());
}

#[test]
fn both_fragments_collapsed_falls_back_to_coplanar() {
    let env = with_max_eccentricity(1.5);
    let plane = Plane::from_normal(Vector3::y(), 0.0);
    let poly = spike();

    let mut pool = ScratchPool::new();
    let mut out = Default::default();
    let lost = plane.split_polygon(&poly, 1, &env, &mut pool, &mut out);

    assert_eq!(lost, 0);
    assert!(out.front.is_empty() && out.back.is_empty());
    // the polygon faces +z, perpendicular to the plane, so it lands behind
    assert!(out.coplanar_front.is_empty());
    assert_eq!(out.coplanar_back, vec![poly]);
}

#[test]
fn depth_scales_the_tolerance() {
    let env = GeometryEnvironment::default();
    let plane = Plane::from_normal(Vector3::z(), 0.0);
    let offset: Real = 3.0 * env.tolerances.epsilon_on_plane;
    let poly = make_polygon_3d(&[[0.0, 0.0, offset], [1.0, 0.0, offset], [0.0, 1.0, offset]]);

    let mut pool = ScratchPool::new();

    let mut shallow = Default::default();
    plane.split_polygon(&poly, 1, &env, &mut pool, &mut shallow);
    assert_eq!(shallow.front.len(), 1);

    // at depth 4 the slab is 4 epsilons thick, so the polygon is coplanar
    let mut deep = Default::default();
    plane.split_polygon(&poly, 4, &env, &mut pool, &mut deep);
    assert_eq!(deep.coplanar_front.len(), 1);

    let flat = env.with_depth_scaled_tolerance(false);
    let mut fixed = Default::default();
    plane.split_polygon(&poly, 4, &flat, &mut pool, &mut fixed);
    assert_eq!(fixed.front.len(), 1);
}

#[test]
fn intersect_line_parameter() {
    let env = GeometryEnvironment::default();
    let plane = Plane::from_normal(Vector3::x(), 1.0);
    let (point, t) = plane
        .intersect_line(&Point3::new(0.0, 2.0, 0.0), &Point3::new(4.0, 2.0, 0.0), &env)
        .unwrap();
    assert_eq!(t, 0.25);
    assert_eq!(point, Point3::new(1.0, 2.0, 0.0));

    // parallel line
    assert!(plane
        .intersect_line(&Point3::new(0.0, 0.0, 0.0), &Point3::new(0.0, 1.0, 0.0), &env)
        .is_none());
}
