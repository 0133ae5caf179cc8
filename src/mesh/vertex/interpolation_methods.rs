use crate::{environment::GeometryEnvironment, float_types::Real, mesh::vertex::Vertex};

impl Vertex {
    /// **Mathematical Foundation: Linear Interpolation**
    ///
    /// Interpolate between `self` (`t = 0`) and `other` (`t = 1`):
    /// - **Position**: p(t) = p₀ + t·(p₁ - p₀)
    /// - **Normal**: n(t) = normalize(n₀ + t·(n₁ - n₀))
    /// - **UV**: uv(t) = uv₀ + t·(uv₁ - uv₀)
    ///
    /// The normal keeps the linearly interpolated direction but is rescaled to unit
    /// length, so split vertices satisfy the same invariant as mesh vertices. When the
    /// blend cancels out (opposite normals at `t = 0.5`) the raw blend is kept.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        let pos = self.pos + (other.pos - self.pos) * t;
        let blended = self.normal + (other.normal - self.normal) * t;
        let normal = blended.try_normalize(Real::EPSILON).unwrap_or(blended);
        let uv = self.uv + (other.uv - self.uv) * t;
        Vertex::with_uv(pos, normal, uv)
    }

    /// [`Vertex::interpolate`] followed by the environment's precision path.
    pub fn interpolate_in(&self, other: &Vertex, t: Real, env: &GeometryEnvironment) -> Vertex {
        self.interpolate(other, t).rounded(env)
    }
}
