//! `Mesh` struct and implementations of the `CSGOps` trait for `Mesh`

use crate::environment::GeometryEnvironment;
use crate::errors::CsgError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::mesh::{
    boolean::{BooleanEngine, BooleanOp, BooleanReport},
    plane::Plane,
    polygon::Polygon,
    vertex::Vertex,
};
use crate::traits::CSGOps;
use nalgebra::{Matrix4, Point3};
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub mod boolean;
pub mod bsp;
pub mod plane;
pub mod polygon;
pub mod shapes;
pub mod validation;
pub mod vertex;

/// A polygon soup describing the boundary of a solid.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// 3D polygons for volumetric shapes
    pub polygons: Vec<Polygon>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,
}

impl Mesh {
    /// Build a Mesh from an existing polygon list
    pub fn from_polygons(polygons: &[Polygon]) -> Self {
        let mut mesh = Mesh::new();
        mesh.polygons = polygons.to_vec();
        mesh
    }

    /// Helper to collect all vertices from the Mesh.
    #[cfg(not(feature = "parallel"))]
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.iter().copied())
            .collect()
    }

    /// Parallel helper to collect all vertices from the Mesh.
    #[cfg(feature = "parallel")]
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .par_iter()
            .flat_map_iter(|p| p.vertices.iter().copied())
            .collect()
    }

    /// Fan-triangulate every polygon.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        self.polygons.iter().flat_map(Polygon::triangulate).collect()
    }

    /// Number of triangles [`Mesh::triangulate`] produces.
    pub fn triangle_count(&self) -> usize {
        self.polygons.iter().map(|p| p.vertices.len().saturating_sub(2)).sum()
    }

    /// Polygons grouped by `material_index`, in ascending material order. This is
    /// the hand-off to vertex/index buffer assembly.
    pub fn polygons_by_material(&self) -> BTreeMap<i32, Vec<&Polygon>> {
        let mut groups: BTreeMap<i32, Vec<&Polygon>> = BTreeMap::new();
        for polygon in &self.polygons {
            groups.entry(polygon.material_index).or_default().push(polygon);
        }
        groups
    }

    /// Total area of all polygons.
    pub fn surface_area(&self) -> Real {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// Enclosed volume by the divergence theorem. Meaningful for closed, outward-facing
    /// surfaces; T-junctions left by clipping do not affect it.
    pub fn volume(&self) -> Real {
        self.triangulate()
            .iter()
            .map(|[a, b, c]| a.pos.coords.dot(&b.pos.coords.cross(&c.pos.coords)))
            .sum::<Real>()
            / 6.0
    }

    /// Apply `op` with `other` under an explicit environment.
    ///
    /// Fails only when `env` does not validate. Geometric trouble is described by the
    /// returned [`BooleanReport`] instead.
    pub fn boolean(
        &self,
        op: BooleanOp,
        other: &Mesh,
        env: &GeometryEnvironment,
    ) -> Result<(Mesh, BooleanReport), CsgError> {
        let engine = BooleanEngine::new(env)?;
        let result = engine.apply(op, &self.polygons, &other.polygons);
        Ok((Mesh::from_polygons(&result.polygons), result.report))
    }

    fn boolean_with_default(&self, op: BooleanOp, other: &Mesh) -> Mesh {
        let env = GeometryEnvironment::resolve(None);
        let result = BooleanEngine::trusted(&env).apply(op, &self.polygons, &other.polygons);
        Mesh {
            polygons: result.polygons,
            bounding_box: OnceLock::new(),
        }
    }
}

impl CSGOps for Mesh {
    /// Returns a new empty Mesh
    fn new() -> Self {
        Mesh {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
        }
    }

    /// Return a new Mesh representing union of the two Meshes.
    ///
    /// ```text
    /// let c = a.union(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   b   |            |   c   |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    fn union(&self, other: &Mesh) -> Mesh {
        self.boolean_with_default(BooleanOp::Union, other)
    }

    /// Return a new Mesh representing difference of the two Meshes.
    ///
    /// ```text
    /// let c = a.difference(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |    +--+
    ///     +----+--+    |       +----+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn difference(&self, other: &Mesh) -> Mesh {
        self.boolean_with_default(BooleanOp::Difference, other)
    }

    /// Return a new Mesh representing intersection of the two Meshes.
    ///
    /// ```text
    /// let c = a.intersection(b);
    ///     +-------+
    ///     |       |
    ///     |   a   |
    ///     |    +--+----+   =   +--+
    ///     +----+--+    |       +--+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn intersection(&self, other: &Mesh) -> Mesh {
        self.boolean_with_default(BooleanOp::Intersection, other)
    }

    /// Both polygon sets side by side, without trimming.
    fn merge(&self, other: &Mesh) -> Mesh {
        self.boolean_with_default(BooleanOp::Merge, other)
    }

    /// Apply an arbitrary 3D transform (as a 4x4 matrix) to the mesh.
    ///
    /// Mirroring transforms reverse every vertex loop so polygons keep facing
    /// outward. A singular matrix leaves the mesh unchanged.
    fn transform(&self, mat: &Matrix4<Real>) -> Mesh {
        let Some(mat_inv_transpose) = mat.try_inverse().map(|inv| inv.transpose()) else {
            log::warn!("ignoring transform by a singular matrix");
            return self.clone();
        };
        // normals see only the linear part
        let normal_matrix = mat_inv_transpose.fixed_view::<3, 3>(0, 0).clone_owned();
        let mirrored = mat.fixed_view::<3, 3>(0, 0).clone_owned().determinant() < 0.0;
        let mut mesh = self.clone();

        for poly in &mut mesh.polygons {
            for vert in &mut poly.vertices {
                vert.pos = mat.transform_point(&vert.pos);
                vert.normal = (normal_matrix * vert.normal)
                    .try_normalize(Real::EPSILON)
                    .unwrap_or(vert.normal);
            }
            if mirrored {
                poly.vertices.reverse();
            }

            // keep the cached plane consistent with the new vertex positions
            let anchor = poly.vertices[0].pos;
            poly.plane = match (normal_matrix * poly.plane.normal()).try_normalize(Real::EPSILON) {
                Some(normal) => Plane::from_normal(normal, normal.dot(&anchor.coords)),
                None => Plane::invalid(),
            };
        }

        // invalidate the old cached bounding box
        mesh.bounding_box = OnceLock::new();

        mesh
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] indicating the 3D bounds of all `polygons`.
    fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);

            for v in self.polygons.iter().flat_map(|p| &p.vertices) {
                mins = mins.inf(&v.pos);
                maxs = maxs.sup(&v.pos);
            }

            // If still uninitialized (e.g., no polygons), return a trivial AABB at origin
            if mins.x > maxs.x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }

            Aabb::new(mins, maxs)
        })
    }

    /// Invalidates object's cached bounding box.
    fn invalidate_bounding_box(&mut self) {
        self.bounding_box = OnceLock::new();
    }

    /// Invert this Mesh (flip inside vs. outside)
    fn inverse(&self) -> Mesh {
        Mesh {
            polygons: self.polygons.iter().map(Polygon::flipped).collect(),
            bounding_box: OnceLock::new(),
        }
    }
}
