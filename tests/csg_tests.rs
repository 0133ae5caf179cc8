mod support;

use bspcsg::{
    environment::{GeometryEnvironment, Precision},
    float_types::Real,
    mesh::{
        Mesh,
        boolean::{self, BooleanEngine, BooleanOp},
        bsp::TreeStatus,
    },
    traits::CSGOps,
};

use crate::support::{approx_eq, bounding_box};

const EPS: Real = 1e-9;

fn overlapping_cubes() -> (Mesh, Mesh) {
    let a = Mesh::cube(1.0, 0);
    let b = Mesh::cube(1.0, 1).translate(0.5, 0.5, 0.5);
    (a, b)
}

fn assert_bounds(mesh: &Mesh, expected: [Real; 6]) {
    let bb = bounding_box(&mesh.polygons);
    for (got, want) in bb.iter().zip(expected) {
        assert!(approx_eq(*got, want, EPS), "bounds {bb:?} != {expected:?}");
    }
}

#[test]
fn union_of_overlapping_cubes() {
    let env = GeometryEnvironment::default();
    let (a, b) = overlapping_cubes();

    let (union, report) = a.boolean(BooleanOp::Union, &b, &env).unwrap();
    assert!(report.is_valid());
    assert_eq!(report.input_polygons, (6, 6));
    assert_eq!(report.lost_vertices, 0);

    assert_bounds(&union, [0.0, 0.0, 0.0, 1.5, 1.5, 1.5]);
    assert_eq!(union.bounding_box().maxs.x, 1.5);

    // the three interior quarter-faces of each cube are gone
    let naive_area = a.surface_area() + b.surface_area();
    assert!(approx_eq(naive_area, 12.0, EPS));
    assert!(approx_eq(union.surface_area(), 10.5, 1e-6));
    assert!(approx_eq(union.volume(), 2.0 - 0.125, 1e-6));

    // both materials survive and every polygon keeps its source's tag
    let groups = union.polygons_by_material();
    assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn difference_of_overlapping_cubes() {
    let (a, b) = overlapping_cubes();
    let diff = a.difference(&b);

    assert_bounds(&diff, [0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    assert!(approx_eq(diff.volume(), 1.0 - 0.125, 1e-6));
    // three quarter-faces removed from the cube, three carved faces added from b
    assert!(approx_eq(diff.surface_area(), 6.0, 1e-6));
    assert!(diff.polygons.iter().any(|p| p.material_index == 1));
}

#[test]
fn intersection_is_commutative() {
    let (a, b) = overlapping_cubes();
    let ab = a.intersection(&b);
    let ba = b.intersection(&a);

    // a closed half-size cube either way round
    assert_eq!(ab.polygons.len(), 6);
    assert_eq!(ab.polygons.len(), ba.polygons.len());
    for mesh in [&ab, &ba] {
        assert_bounds(mesh, [0.5, 0.5, 0.5, 1.0, 1.0, 1.0]);
        assert!(approx_eq(mesh.volume(), 0.125, 1e-6));
        assert!(approx_eq(mesh.surface_area(), 1.5, 1e-6));
    }
}

#[test]
fn union_with_itself_is_idempotent() {
    let a = Mesh::cube(1.0, 0);
    let union = a.union(&a);

    assert_eq!(union.polygons.len(), a.polygons.len());
    for poly in &union.polygons {
        assert!(a.polygons.contains(poly));
    }
    assert!(approx_eq(union.surface_area(), 6.0, EPS));
}

#[test]
fn sphere_minus_itself_is_empty() {
    let sphere = Mesh::sphere(1.0, 16, 8, 0);
    let env = GeometryEnvironment::default();

    let (diff, report) = sphere.boolean(BooleanOp::Difference, &sphere, &env).unwrap();
    assert!(report.is_valid());
    assert!(diff.polygons.is_empty());
}

#[test]
fn disjoint_union_keeps_everything() {
    let a = Mesh::cube(1.0, 0);
    let b = Mesh::cube(1.0, 0).translate(3.0, 0.0, 0.0);
    let union = a.union(&b);

    assert_eq!(union.polygons.len(), 12);
    assert!(approx_eq(union.volume(), 2.0, EPS));
    assert!(a.intersection(&b).polygons.is_empty());
}

#[test]
fn merge_keeps_both_surfaces() {
    let (a, b) = overlapping_cubes();
    let merged = a.merge(&b);

    assert_eq!(merged.polygons.len(), 12);
    assert_eq!(merged.polygons[..6], a.polygons[..]);
    assert_eq!(merged.polygons[6..], b.polygons[..]);
}

#[test]
fn depth_limit_is_reported_not_fatal() {
    let env = GeometryEnvironment::default().with_max_depth(2);
    let (a, b) = overlapping_cubes();

    let (union, report) = a.boolean(BooleanOp::Union, &b, &env).unwrap();
    assert!(matches!(report.status, TreeStatus::CorruptedAtDepth(3)));
    assert!(!union.polygons.is_empty());
}

#[test]
fn invalid_environment_is_an_error() {
    let env = GeometryEnvironment::default().with_max_depth(0);
    let (a, b) = overlapping_cubes();
    assert!(a.boolean(BooleanOp::Union, &b, &env).is_err());
    assert!(boolean::apply_batch(&[], BooleanOp::Union, &env).is_err());
}

#[test]
fn batch_matches_sequential_results() {
    let env = GeometryEnvironment::default();
    let engine = BooleanEngine::new(&env).unwrap();
    let (a, b) = overlapping_cubes();
    let far = Mesh::cube(1.0, 2).translate(5.0, 5.0, 5.0);

    let pairs = vec![
        (a.polygons.clone(), b.polygons.clone()),
        (b.polygons.clone(), far.polygons.clone()),
        (a.polygons.clone(), a.polygons.clone()),
    ];
    let batch = boolean::apply_batch(&pairs, BooleanOp::Difference, &env).unwrap();

    assert_eq!(batch.len(), pairs.len());
    for ((a, b), result) in pairs.iter().zip(&batch) {
        assert_eq!(*result, engine.difference(a, b));
    }
    // a cube minus itself vanishes
    assert!(batch[2].polygons.is_empty());
}

#[test]
fn single_precision_union() {
    let env = GeometryEnvironment::new(Precision::Single);
    let (a, b) = overlapping_cubes();

    let (union, report) = a.boolean(BooleanOp::Union, &b, &env).unwrap();
    assert!(report.is_valid());
    assert_bounds(&union, [0.0, 0.0, 0.0, 1.5, 1.5, 1.5]);
    assert!(approx_eq(union.volume(), 1.875, 1e-4));
}
