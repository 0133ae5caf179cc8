//! Struct and functions for working with `Vertex`s from which `Polygon`s are composed.

use crate::environment::GeometryEnvironment;
use crate::float_types::Real;
use nalgebra::{Point3, Vector2, Vector3};

mod interpolation_methods;

/// A vertex of a polygon, holding position, normal and texture coordinate.
///
/// Vertices are plain values: every operation returns a new vertex.
#[derive(Debug, Clone, PartialEq, Copy)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
    pub uv: Vector2<Real>,
}

impl Vertex {
    /// Create a new [`Vertex`] with a zero texture coordinate.
    ///
    /// * `pos`    – the position in model space
    /// * `normal` – the shading normal; it is **copied verbatim**, so make sure it is oriented
    ///   the way you need it.
    ///
    /// Non-finite components are replaced by zero.
    #[inline]
    pub fn new(pos: Point3<Real>, normal: Vector3<Real>) -> Self {
        Self::with_uv(pos, normal, Vector2::zeros())
    }

    /// Create a new [`Vertex`] with an explicit texture coordinate.
    #[inline]
    pub fn with_uv(
        mut pos: Point3<Real>,
        mut normal: Vector3<Real>,
        mut uv: Vector2<Real>,
    ) -> Self {
        let mut sanitised = false;
        for c in pos
            .coords
            .iter_mut()
            .chain(normal.iter_mut())
            .chain(uv.iter_mut())
        {
            if !c.is_finite() {
                *c = 0.0;
                sanitised = true;
            }
        }
        if sanitised {
            log::warn!("vertex had non-finite components, replaced with zero (pos {pos})");
        }

        Vertex { pos, normal, uv }
    }

    /// Return a copy of this vertex with the normal negated.
    ///
    /// # Example
    /// ```rust
    /// # use nalgebra::{Point3, Vector3};
    /// # use bspcsg::mesh::vertex::Vertex;
    /// let v = Vertex::new(Point3::new(1.0, 2.0, 3.0), Vector3::x());
    /// let f = v.flipped();
    /// assert_eq!(f.pos, v.pos, "position remains the same");
    /// assert_eq!(f.normal, -Vector3::x(), "the normal is negated");
    /// ```
    #[inline]
    pub fn flipped(&self) -> Vertex {
        Vertex {
            normal: -self.normal,
            ..*self
        }
    }

    /// Euclidean distance between vertex positions.
    pub fn distance_to(&self, other: &Vertex) -> Real {
        (self.pos - other.pos).norm()
    }

    /// Squared Euclidean distance between vertex positions.
    pub fn distance_squared_to(&self, other: &Vertex) -> Real {
        (self.pos - other.pos).norm_squared()
    }

    /// Whether the normal has unit length within `epsilon_near_zero`.
    pub fn has_unit_normal(&self, env: &GeometryEnvironment) -> bool {
        (self.normal.norm() - 1.0).abs() <= env.tolerances.epsilon_near_zero
    }

    /// Copy of this vertex with every component passed through the environment's
    /// precision path.
    pub fn rounded(&self, env: &GeometryEnvironment) -> Vertex {
        Vertex {
            pos: env.round_point(self.pos),
            normal: env.round_vector(self.normal),
            uv: env.round_uv(self.uv),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct VertexEpsilon {
    pub position: <Point3<Real> as approx::AbsDiffEq>::Epsilon,
    pub normal: <Vector3<Real> as approx::AbsDiffEq>::Epsilon,
    pub uv: <Vector2<Real> as approx::AbsDiffEq>::Epsilon,
}

impl approx::AbsDiffEq for Vertex {
    type Epsilon = VertexEpsilon;

    fn default_epsilon() -> Self::Epsilon {
        Self::Epsilon {
            position: Point3::<Real>::default_epsilon(),
            normal: Vector3::<Real>::default_epsilon(),
            uv: Vector2::<Real>::default_epsilon(),
        }
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        approx::AbsDiffEq::abs_diff_eq(&self.pos, &other.pos, epsilon.position)
            && approx::AbsDiffEq::abs_diff_eq(&self.normal, &other.normal, epsilon.normal)
            && approx::AbsDiffEq::abs_diff_eq(&self.uv, &other.uv, epsilon.uv)
    }
}

impl approx::RelativeEq for Vertex {
    fn default_max_relative() -> Self::Epsilon {
        Self::Epsilon {
            position: Point3::<Real>::default_max_relative(),
            normal: Vector3::<Real>::default_max_relative(),
            uv: Vector2::<Real>::default_max_relative(),
        }
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        approx::RelativeEq::relative_eq(
            &self.pos,
            &other.pos,
            epsilon.position,
            max_relative.position,
        ) && approx::RelativeEq::relative_eq(
            &self.normal,
            &other.normal,
            epsilon.normal,
            max_relative.normal,
        ) && approx::RelativeEq::relative_eq(&self.uv, &other.uv, epsilon.uv, max_relative.uv)
    }
}
