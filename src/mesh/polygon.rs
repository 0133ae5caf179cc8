//! Struct and functions for working with planar `Polygon`s

use crate::environment::GeometryEnvironment;
use crate::errors::CsgError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::mesh::plane::Plane;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};

/// A convex polygon lying in one plane, tagged with a material index.
///
/// Polygons are values: `flipped` and the factories return new polygons, and the
/// vertex list is owned (copied on construction), so no two polygons alias storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Vertices in winding order (counter-clockwise seen from the front)
    pub vertices: Vec<Vertex>,

    /// The plane on which this polygon lies, cached from the vertices
    pub plane: Plane,

    /// External material / mesh-group tag, carried through every split
    pub material_index: i32,
}

impl Polygon {
    /// Low-level constructor. Panics with fewer than 3 vertices; no repair is attempted.
    pub fn new(vertices: Vec<Vertex>, plane: Plane, material_index: i32) -> Self {
        assert!(vertices.len() >= 3, "degenerate polygon");

        Polygon {
            vertices,
            plane,
            material_index,
        }
    }

    /// Non-panicking form of [`Polygon::new`].
    pub fn try_new(
        vertices: Vec<Vertex>,
        plane: Plane,
        material_index: i32,
    ) -> Result<Self, CsgError> {
        if vertices.len() < 3 {
            return Err(CsgError::TooFewVertices {
                found: vertices.len(),
            });
        }
        if !plane.is_valid() {
            return Err(CsgError::NonFinitePlane {
                offset: plane.offset(),
            });
        }
        Ok(Self::new(vertices, plane, material_index))
    }

    /// Factory for polygons coming from mesh data.
    ///
    /// Compresses the vertex loop (near-duplicate consecutive vertices merged, wildly
    /// eccentric loops rejected), then derives the plane from the first non-collinear
    /// vertices. Returns `None` for degenerate input, which is logged and skipped.
    pub fn create(
        vertices: &[Vertex],
        material_index: i32,
        env: &GeometryEnvironment,
    ) -> Option<Self> {
        let Some(compressed) = compress_vertices(vertices, env) else {
            log::warn!(
                "dropping degenerate polygon: {} vertices did not survive compression",
                vertices.len()
            );
            return None;
        };
        let compressed: Vec<Vertex> = compressed.iter().map(|v| v.rounded(env)).collect();

        let Some(plane) = Plane::from_vertices(&compressed, env) else {
            log::warn!(
                "dropping degenerate polygon: {} collinear vertices",
                compressed.len()
            );
            return None;
        };

        for v in compressed.iter().filter(|v| !v.has_unit_normal(env)) {
            log::warn!("vertex at {} has a non-unit normal (length {})", v.pos, v.normal.norm());
        }

        Some(Polygon {
            vertices: compressed,
            plane,
            material_index,
        })
    }

    /// Factory for fragments produced by a plane split: the parent's plane is kept
    /// so fragments stay exactly coplanar with their siblings.
    pub fn create_fragment(
        vertices: &[Vertex],
        plane: Plane,
        material_index: i32,
        env: &GeometryEnvironment,
    ) -> Option<Self> {
        if vertices.is_empty() {
            return None;
        }
        let compressed = compress_vertices(vertices, env)?;
        Some(Polygon {
            vertices: compressed,
            plane,
            material_index,
        })
    }

    /// Reverse the winding, negate every vertex normal and flip the plane.
    pub fn flipped(&self) -> Polygon {
        Polygon {
            vertices: self.vertices.iter().rev().map(Vertex::flipped).collect(),
            plane: self.plane.flipped(),
            material_index: self.material_index,
        }
    }

    /// `self` unchanged when `flip` is false, otherwise [`Polygon::flipped`].
    pub fn oriented(self, flip: bool) -> Polygon {
        if flip { self.flipped() } else { self }
    }

    /// Returns an iterator over the edges `(start, end)` of the polygon, closing the loop.
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> {
        self.vertices.iter().zip(self.vertices.iter().cycle().skip(1))
    }

    /// Fan triangulation. The polygons this crate produces are convex, so the fan
    /// from the first vertex covers them exactly.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        let first = self.vertices[0];
        self.vertices
            .windows(2)
            .skip(1)
            .map(|pair| [first, pair[0], pair[1]])
            .collect()
    }

    /// Vector area (Newell); its length is twice the polygon area.
    fn newell_normal(&self) -> Vector3<Real> {
        self.edges().fold(Vector3::zeros(), |acc, (curr, next)| {
            acc + curr.pos.coords.cross(&next.pos.coords)
        })
    }

    /// Area of the polygon.
    pub fn area(&self) -> Real {
        self.newell_normal().norm() * 0.5
    }

    /// Average of the vertex positions.
    pub fn centroid(&self) -> Point3<Real> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.pos.coords);
        Point3::from(sum / self.vertices.len() as Real)
    }

    /// Axis-aligned bounding box of the vertices.
    pub fn bounding_box(&self) -> Aabb {
        let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
        let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
        for v in &self.vertices {
            mins = mins.inf(&v.pos);
            maxs = maxs.sup(&v.pos);
        }
        Aabb::new(mins, maxs)
    }

    /// Same material, same vertex count and the same loop (up to a cyclic rotation),
    /// vertex positions within `epsilon`.
    pub fn same_surface(&self, other: &Polygon, epsilon: Real) -> bool {
        let n = self.vertices.len();
        if n != other.vertices.len() || self.material_index != other.material_index {
            return false;
        }
        let eps2 = epsilon * epsilon;
        (0..n).any(|shift| {
            self.vertices.iter().enumerate().all(|(i, v)| {
                v.distance_squared_to(&other.vertices[(i + shift) % n]) <= eps2
            })
        })
    }
}

/// Remove duplicated surfaces from a polygon list, keeping the first occurrence.
///
/// Returns the number of polygons removed.
pub fn dedup_polygons(polygons: &mut Vec<Polygon>, env: &GeometryEnvironment) -> usize {
    let epsilon = env.tolerances.epsilon_between_points;
    let before = polygons.len();
    let mut kept: Vec<Polygon> = Vec::with_capacity(before);
    for polygon in polygons.drain(..) {
        if !kept.iter().any(|k| k.plane == polygon.plane && k.same_surface(&polygon, epsilon)) {
            kept.push(polygon);
        }
    }
    *polygons = kept;
    before - polygons.len()
}

/// Ratio of the longest to the shortest edge of a closed vertex loop.
pub fn eccentricity(vertices: &[Vertex]) -> Real {
    let (shortest, longest) = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.distance_to(b))
        .fold((Real::MAX, 0.0 as Real), |(lo, hi), d| (lo.min(d), hi.max(d)));
    if shortest > 0.0 {
        longest / shortest
    } else {
        Real::INFINITY
    }
}

/// Merge consecutive vertices closer than `epsilon_between_points` (including the
/// closing edge) and reject loops whose eccentricity exceeds `max_eccentricity`.
///
/// Returns `None` when fewer than 3 vertices survive or the loop is rejected.
pub(crate) fn compress_vertices(
    vertices: &[Vertex],
    env: &GeometryEnvironment,
) -> Option<Vec<Vertex>> {
    let epsilon = env.tolerances.epsilon_between_points;
    let mut out: Vec<Vertex> = Vec::with_capacity(vertices.len());
    for v in vertices {
        if out.last().is_none_or(|last| last.distance_to(v) >= epsilon) {
            out.push(*v);
        }
    }
    while out.len() > 1 && out[0].distance_to(&out[out.len() - 1]) < epsilon {
        out.pop();
    }

    if out.len() < 3 {
        return None;
    }

    let ratio = eccentricity(&out);
    if ratio > env.tolerances.max_eccentricity {
        log::warn!(
            "rejecting {}-vertex loop with eccentricity {ratio:e}",
            out.len()
        );
        return None;
    }

    Some(out)
}
