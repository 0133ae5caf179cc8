//! Struct and functions for working with planar `Polygon`s
//!
//! A [`Plane`] is stored in Hessian normal form: a unit `normal` and the offset
//! `w = normal · p` for any point `p` on the plane. Planes are values; flipping
//! returns a new plane.

use crate::environment::GeometryEnvironment;
use crate::errors::CsgError;
use crate::float_types::Real;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use crate::scratch::ScratchPool;
use nalgebra::{Point3, Vector3};

// Plane classification labels. They combine with bitwise OR:
// FRONT | BACK == SPANNING.
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;
/// The point could not be classified (invalid plane or non-finite input).
pub const INDETERMINATE: i8 = 4;

/// A plane in 3D space defined by a unit normal and an offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<Real>,
    w: Real,
}

/// Output buckets of [`Plane::split_polygon`].
#[derive(Debug, Clone, Default)]
pub struct SplitBuckets {
    pub coplanar_front: Vec<Polygon>,
    pub coplanar_back: Vec<Polygon>,
    pub front: Vec<Polygon>,
    pub back: Vec<Polygon>,
}

impl SplitBuckets {
    pub fn is_empty(&self) -> bool {
        self.coplanar_front.is_empty()
            && self.coplanar_back.is_empty()
            && self.front.is_empty()
            && self.back.is_empty()
    }

    pub fn len(&self) -> usize {
        self.coplanar_front.len() + self.coplanar_back.len() + self.front.len() + self.back.len()
    }
}

impl Plane {
    /// Plane that fails every classification closed.
    pub fn invalid() -> Self {
        Plane {
            normal: Vector3::zeros(),
            w: Real::NAN,
        }
    }

    /// Create a plane from a normal (normalised here) and offset.
    /// A zero or non-finite normal, or a non-finite offset, yields an invalid plane.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        match normal.try_normalize(Real::EPSILON) {
            Some(n) if w.is_finite() && n.iter().all(|c| c.is_finite()) => Plane { normal: n, w },
            _ => Self::invalid(),
        }
    }

    /// Strict variant of [`Plane::from_normal`].
    pub fn try_from_normal(normal: Vector3<Real>, w: Real) -> Result<Self, CsgError> {
        let plane = Self::from_normal(normal, w);
        if plane.is_valid() {
            Ok(plane)
        } else {
            Err(CsgError::NonFinitePlane { offset: w })
        }
    }

    /// Plane through three points, oriented by the right-hand rule `(b - a) × (c - a)`.
    ///
    /// Returns `None` when the points are collinear (the cross product is zero
    /// relative to the edge lengths). With `rationalize_planes` enabled, normal
    /// components negligible next to the largest one are zeroed before normalising.
    pub fn from_points(
        a: &Point3<Real>,
        b: &Point3<Real>,
        c: &Point3<Real>,
        env: &GeometryEnvironment,
    ) -> Option<Self> {
        let ab = b - a;
        let ac = c - a;
        let cross = ab.cross(&ac);
        let len = cross.norm();
        let scale = ab.norm() * ac.norm();

        // also rejects NaN lengths
        if !(len > env.tolerances.epsilon_near_zero * scale) {
            return None;
        }

        let mut normal = cross / len;
        if env.rationalize_planes {
            normal = rationalize_normal(normal, env.tolerances.rationalize_exponent_range)?;
        }
        let normal = env.round_vector(normal);
        let w = env.round(normal.dot(&a.coords));
        Some(Plane { normal, w })
    }

    /// Plane of a vertex loop: the first non-degenerate fan triangle `(v0, vi, vi+1)`.
    pub fn from_vertices(vertices: &[Vertex], env: &GeometryEnvironment) -> Option<Self> {
        let first = vertices.first()?;
        vertices
            .windows(2)
            .skip(1)
            .find_map(|pair| Self::from_points(&first.pos, &pair[0].pos, &pair[1].pos, env))
    }

    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    pub const fn offset(&self) -> Real {
        self.w
    }

    /// `false` for planes built from degenerate input; they classify everything as
    /// [`INDETERMINATE`].
    pub fn is_valid(&self) -> bool {
        self.w.is_finite() && self.normal.iter().all(|c| c.is_finite())
    }

    /// The same plane facing the other way.
    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Signed distance `normal · p - w`; positive in front. NaN for invalid planes.
    #[inline]
    pub fn point_distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.w
    }

    /// Classify a point as [`FRONT`], [`BACK`], [`COPLANAR`] or [`INDETERMINATE`].
    #[inline]
    pub fn orient_point(&self, point: &Point3<Real>, tolerance: Real) -> i8 {
        let distance = self.point_distance(point);
        if !distance.is_finite() {
            INDETERMINATE
        } else if distance > tolerance {
            FRONT
        } else if distance < -tolerance {
            BACK
        } else {
            COPLANAR
        }
    }

    /// OR of the labels of all vertices of `polygon`.
    pub fn classify_polygon(&self, polygon: &Polygon, tolerance: Real) -> i8 {
        polygon
            .vertices
            .iter()
            .fold(COPLANAR, |acc, v| acc | self.orient_point(&v.pos, tolerance))
    }

    /// Offsets match exactly and every normal component differs by less than `tolerance`.
    pub fn equals_within(&self, other: &Plane, tolerance: Real) -> bool {
        self.w == other.w
            && self
                .normal
                .iter()
                .zip(other.normal.iter())
                .all(|(a, b)| (a - b).abs() < tolerance)
    }

    /// Intersection of the line through `a` and `b` with this plane.
    ///
    /// Returns the point and its parameter `t` (`a` at 0, `b` at 1), or `None` when
    /// the line is parallel to the plane.
    pub fn intersect_line(
        &self,
        a: &Point3<Real>,
        b: &Point3<Real>,
        env: &GeometryEnvironment,
    ) -> Option<(Point3<Real>, Real)> {
        let direction = b - a;
        let denom = self.normal.dot(&direction);
        if !(denom.abs() > env.tolerances.epsilon_near_zero) {
            return None;
        }
        let t = (self.w - self.normal.dot(&a.coords)) / denom;
        t.is_finite().then(|| (a + direction * t, t))
    }

    /// Split `polygon` by this plane into `out`.
    ///
    /// Coplanar polygons go to `coplanar_front` or `coplanar_back` by the sign of
    /// `self.normal · polygon.normal`. Spanning polygons are cut: each crossing edge
    /// gets one interpolated vertex, shared by the front and back fragments.
    ///
    /// The classification tolerance is `env.plane_tolerance(depth)`. Buffers for the
    /// per-vertex loop come from `scratch`.
    ///
    /// Returns the number of vertices lost to degeneracy (0 when nothing was dropped).
    pub fn split_polygon(
        &self,
        polygon: &Polygon,
        depth: usize,
        env: &GeometryEnvironment,
        scratch: &mut ScratchPool,
        out: &mut SplitBuckets,
    ) -> usize {
        // identical plane: trivially coplanar, same orientation
        if polygon.plane == *self {
            out.coplanar_front.push(polygon.clone());
            return 0;
        }

        if !self.is_valid() || !polygon.plane.is_valid() {
            log::warn!(
                "cannot classify a {}-vertex polygon against an invalid plane at depth {depth}",
                polygon.vertices.len()
            );
            out.coplanar_front.push(polygon.clone());
            return 0;
        }

        let tolerance = env.plane_tolerance(depth);
        if self.equals_within(&polygon.plane, tolerance) {
            self.push_coplanar(polygon.clone(), out);
            return 0;
        }

        let mut labels = scratch.take_labels();
        let mut polygon_type = COPLANAR;
        for v in &polygon.vertices {
            let label = self.orient_point(&v.pos, tolerance);
            polygon_type |= label;
            labels.push(label);
        }

        let lost = match polygon_type {
            COPLANAR => {
                self.push_coplanar(polygon.clone(), out);
                0
            },
            FRONT => {
                out.front.push(polygon.clone());
                0
            },
            BACK => {
                out.back.push(polygon.clone());
                0
            },
            SPANNING => self.split_spanning(polygon, &labels, depth, env, scratch, out),
            _ => {
                log::warn!("non-finite vertex distance at depth {depth}; polygon kept unsplit");
                out.coplanar_front.push(polygon.clone());
                0
            },
        };

        scratch.give_labels(labels);
        lost
    }

    /// Convenience form of [`Plane::split_polygon`] at depth 1 with a private scratch pool.
    pub fn split(&self, polygon: &Polygon, env: &GeometryEnvironment) -> SplitBuckets {
        let mut out = SplitBuckets::default();
        self.split_polygon(polygon, 1, env, &mut ScratchPool::new(), &mut out);
        out
    }

    fn push_coplanar(&self, polygon: Polygon, out: &mut SplitBuckets) {
        if self.normal.dot(&polygon.plane.normal) > 0.0 {
            out.coplanar_front.push(polygon);
        } else {
            out.coplanar_back.push(polygon);
        }
    }

    fn split_spanning(
        &self,
        polygon: &Polygon,
        labels: &[i8],
        depth: usize,
        env: &GeometryEnvironment,
        scratch: &mut ScratchPool,
        out: &mut SplitBuckets,
    ) -> usize {
        let mut before = scratch.take_vertices();
        let mut behind = scratch.take_vertices();
        let n = polygon.vertices.len();

        for i in 0..n {
            // j is the vertex following i, wrapping around to the first vertex after the last
            let j = (i + 1) % n;
            let (type_i, type_j) = (labels[i], labels[j]);
            let vertex_i = &polygon.vertices[i];
            let vertex_j = &polygon.vertices[j];

            if type_i != BACK {
                before.push(*vertex_i);
            }
            if type_i != FRONT {
                behind.push(*vertex_i);
            }

            // the edge crosses the plane: one new vertex, shared by both sides
            if (type_i | type_j) == SPANNING {
                if let Some((_, t)) = self.intersect_line(&vertex_i.pos, &vertex_j.pos, env) {
                    let vertex_new = vertex_i.interpolate_in(vertex_j, t, env);
                    before.push(vertex_new);
                    behind.push(vertex_new);
                }
            }
        }

        let front_part =
            Polygon::create_fragment(&before, polygon.plane, polygon.material_index, env);
        let back_part =
            Polygon::create_fragment(&behind, polygon.plane, polygon.material_index, env);

        let lost = match (front_part, back_part) {
            (Some(f), Some(b)) => {
                let lost = (before.len() - f.vertices.len()) + (behind.len() - b.vertices.len());
                out.front.push(f);
                out.back.push(b);
                lost
            },
            (Some(f), None) => {
                log::warn!(
                    "back fragment collapsed at depth {depth}; discarding its {} vertices",
                    behind.len()
                );
                let lost = (before.len() - f.vertices.len()) + behind.len();
                out.front.push(f);
                lost
            },
            (None, Some(b)) => {
                log::warn!(
                    "front fragment collapsed at depth {depth}; discarding its {} vertices",
                    before.len()
                );
                let lost = before.len() + (behind.len() - b.vertices.len());
                out.back.push(b);
                lost
            },
            (None, None) => {
                log::warn!(
                    "both fragments of a {n}-vertex polygon collapsed at depth {depth}; \
                     kept as coplanar"
                );
                self.push_coplanar(polygon.clone(), out);
                0
            },
        };

        scratch.give_vertices(before);
        scratch.give_vertices(behind);
        lost
    }
}

/// Zero normal components smaller than `max_component * 10^-range`, then renormalise.
fn rationalize_normal(normal: Vector3<Real>, range: i32) -> Option<Vector3<Real>> {
    let threshold = normal.amax() * (10.0 as Real).powi(-range);
    normal
        .map(|c| if c.abs() < threshold { 0.0 } else { c })
        .try_normalize(Real::EPSILON)
}
