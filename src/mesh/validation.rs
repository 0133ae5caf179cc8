//! Structural checks on polygon sets

use crate::environment::GeometryEnvironment;
use crate::float_types::Real;
#[cfg(feature = "hashmap")]
use crate::mesh::Mesh;
use crate::mesh::polygon::Polygon;

/// A structural problem found in a polygon list. Indices refer to the list checked.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuralIssue {
    #[error("polygon {polygon} has only {found} vertices")]
    TooFewVertices { polygon: usize, found: usize },

    #[error("polygon {polygon} has an invalid plane")]
    InvalidPlane { polygon: usize },

    #[error("vertex {vertex} of polygon {polygon} is {distance:e} off its plane")]
    VertexOffPlane {
        polygon: usize,
        vertex: usize,
        distance: Real,
    },

    #[error("vertex {vertex} of polygon {polygon} has a normal of length {length}")]
    NonUnitNormal {
        polygon: usize,
        vertex: usize,
        length: Real,
    },
}

/// Check every polygon for a valid plane, vertices on that plane (within
/// `epsilon_on_plane`) and unit vertex normals.
pub fn validate_polygons(polygons: &[Polygon], env: &GeometryEnvironment) -> Vec<StructuralIssue> {
    let tolerance = env.tolerances.epsilon_on_plane;
    let mut issues = Vec::new();

    for (polygon, poly) in polygons.iter().enumerate() {
        if poly.vertices.len() < 3 {
            issues.push(StructuralIssue::TooFewVertices {
                polygon,
                found: poly.vertices.len(),
            });
        }

        if !poly.plane.is_valid() {
            issues.push(StructuralIssue::InvalidPlane { polygon });
            continue;
        }

        for (vertex, v) in poly.vertices.iter().enumerate() {
            let distance = poly.plane.point_distance(&v.pos);
            if distance.abs() > tolerance {
                issues.push(StructuralIssue::VertexOffPlane {
                    polygon,
                    vertex,
                    distance,
                });
            }
            if !v.has_unit_normal(env) {
                issues.push(StructuralIssue::NonUnitNormal {
                    polygon,
                    vertex,
                    length: v.normal.norm(),
                });
            }
        }
    }

    issues
}

#[cfg(feature = "hashmap")]
impl Mesh {
    /// Checks if the Mesh object is manifold
    ///
    /// ### Returns
    /// Returns `true` if every edge of the triangulated surface appears exactly 2 times
    ///
    /// ### Notes:
    /// - Edges that are split on one side only (T-junctions left by BSP clipping)
    ///   make the result `false` even when the surface is watertight.
    /// - Uses a `QUANTIZATION_FACTOR` for `Real` coordinates
    pub fn is_manifold(&self) -> bool {
        use hashbrown::HashMap;
        use nalgebra::Point3;

        const QUANTIZATION_FACTOR: Real = 1e7;

        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        struct QuantizedPoint(i64, i64, i64);

        fn quantize_point(p: &Point3<Real>) -> QuantizedPoint {
            QuantizedPoint(
                (p.x * QUANTIZATION_FACTOR).round() as i64,
                (p.y * QUANTIZATION_FACTOR).round() as i64,
                (p.z * QUANTIZATION_FACTOR).round() as i64,
            )
        }

        let mut edge_counts: HashMap<(QuantizedPoint, QuantizedPoint), u32> = HashMap::new();

        for tri in self.triangulate() {
            for (i0, i1) in [(0, 1), (1, 2), (2, 0)] {
                let p0 = quantize_point(&tri[i0].pos);
                let p1 = quantize_point(&tri[i1].pos);

                // (p0, p1) and (p1, p0) share a key
                let key = if p0 < p1 { (p0, p1) } else { (p1, p0) };
                *edge_counts.entry(key).or_insert(0) += 1;
            }
        }

        // closed surface: each edge belongs to exactly 2 triangles
        !edge_counts.is_empty() && edge_counts.values().all(|&count| count == 2)
    }
}
