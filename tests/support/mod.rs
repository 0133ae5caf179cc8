//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use bspcsg::{
    environment::GeometryEnvironment,
    float_types::Real,
    mesh::{polygon::Polygon, vertex::Vertex},
};
use nalgebra::{Point3, Vector3};

/// Returns the approximate bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]`
/// for a set of polygons.
pub fn bounding_box(polygons: &[Polygon]) -> [Real; 6] {
    let mut bounds = [
        Real::MAX,
        Real::MAX,
        Real::MAX,
        Real::MIN,
        Real::MIN,
        Real::MIN,
    ];

    for v in polygons.iter().flat_map(|p| &p.vertices) {
        for axis in 0..3 {
            bounds[axis] = bounds[axis].min(v.pos[axis]);
            bounds[axis + 3] = bounds[axis + 3].max(v.pos[axis]);
        }
    }

    bounds
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Helper to make a simple Polygon in 3D with given vertices, through the
/// degeneracy-checking factory under the default environment.
pub fn make_polygon_3d(points: &[[Real; 3]]) -> Polygon {
    make_polygon_with_material(points, 0)
}

pub fn make_polygon_with_material(points: &[[Real; 3]], material_index: i32) -> Polygon {
    let env = GeometryEnvironment::default();
    let verts: Vec<Vertex> = points
        .iter()
        .map(|p| Vertex::new(Point3::new(p[0], p[1], p[2]), Vector3::z()))
        .collect();
    let mut poly =
        Polygon::create(&verts, material_index, &env).expect("non-degenerate test polygon");
    let normal = poly.plane.normal();
    for v in &mut poly.vertices {
        v.normal = normal;
    }
    poly
}
