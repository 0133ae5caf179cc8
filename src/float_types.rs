// Re-export parry for the appropriate float size
#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

// Pi
/// Archimedes' constant (π)
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
/// Archimedes' constant (π)
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// Tau
/// The full circle constant (τ)
#[cfg(feature = "f32")]
pub const TAU: Real = core::f32::consts::TAU;
/// The full circle constant (τ)
#[cfg(feature = "f64")]
pub const TAU: Real = core::f64::consts::TAU;

/// Round a value through `f32` storage, used by the single-precision arithmetic path.
#[inline]
pub fn round_to_single(value: Real) -> Real {
    value as f32 as Real
}

/// Parse a tolerance override baked in at build time
/// (e.g. `BSPCSG_EPSILON_ON_PLANE=1e-6 cargo build`).
pub(crate) fn build_time_override(raw: Option<&'static str>) -> Option<Real> {
    use core::str::FromStr;

    raw.and_then(|value| Real::from_str(value.trim()).ok())
        .filter(|value| value.is_finite() && *value > 0.0)
        .map(|value| value.max(Real::EPSILON))
}
