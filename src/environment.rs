//! Explicit geometry configuration threaded through every operation.
//!
//! Nothing in the crate reads a hidden default: operations take a
//! `&GeometryEnvironment`, and the only fallback is [`GeometryEnvironment::resolve`],
//! which is called at the outermost API boundary ([`crate::traits::CSGOps`]).

use crate::errors::CsgError;
use crate::float_types::{Real, build_time_override, round_to_single};
use nalgebra::{Point3, Vector2, Vector3};

/// Arithmetic path used for derived vertex and plane quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Round every derived quantity through `f32`
    Single,
    /// Keep values as computed
    #[default]
    Double,
}

/// Numeric tolerances for classification and degeneracy rejection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Magnitude below which a length, cross product or denominator counts as zero.
    /// Also the allowed deviation of a vertex normal from unit length.
    pub epsilon_near_zero: Real,
    /// Half-thickness of a plane when classifying points (scaled by BSP depth).
    pub epsilon_on_plane: Real,
    /// Consecutive polygon vertices closer than this are merged.
    pub epsilon_between_points: Real,
    /// Plane normal components smaller than `max_component * 10^-range` are zeroed.
    pub rationalize_exponent_range: i32,
    /// Largest accepted ratio of longest to shortest polygon edge.
    pub max_eccentricity: Real,
}

impl Tolerances {
    /// Defaults for the given precision. The on-plane epsilon can be overridden at
    /// build time with `BSPCSG_EPSILON_ON_PLANE`.
    pub fn for_precision(precision: Precision) -> Self {
        let on_plane_override = build_time_override(option_env!("BSPCSG_EPSILON_ON_PLANE"));
        match precision {
            Precision::Double => Self {
                epsilon_near_zero: 1e-10,
                epsilon_on_plane: on_plane_override.unwrap_or(1e-5),
                epsilon_between_points: 1e-7,
                rationalize_exponent_range: 12,
                max_eccentricity: 1e9,
            },
            Precision::Single => Self {
                epsilon_near_zero: 1e-6,
                epsilon_on_plane: on_plane_override.unwrap_or(1e-4),
                epsilon_between_points: 1e-5,
                rationalize_exponent_range: 6,
                max_eccentricity: 1e6,
            },
        }
    }
}

/// Diagnostics toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugFlags {
    /// Run structural validation on every Boolean result and log the issues found.
    pub validate_structure: bool,
    /// Trace the clip/invert/build sequence at `trace` level.
    pub trace_operations: bool,
}

/// Configuration value for one Boolean operation (or any lower-level call).
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryEnvironment {
    pub precision: Precision,
    pub tolerances: Tolerances,
    /// Deepest BSP level that may be built; deeper subtrees are marked corrupted.
    pub max_depth: usize,
    /// Zero ill-conditioned normal components when deriving planes from points.
    pub rationalize_planes: bool,
    /// Multiply the on-plane epsilon by the BSP depth. This is an empirical damping
    /// factor against over-fragmenting slivers deep in the tree.
    pub depth_scaled_tolerance: bool,
    pub debug: DebugFlags,
}

impl Default for GeometryEnvironment {
    fn default() -> Self {
        Self::new(Precision::Double)
    }
}

impl GeometryEnvironment {
    pub const DEFAULT_MAX_DEPTH: usize = 1024;

    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            tolerances: Tolerances::for_precision(precision),
            max_depth: Self::DEFAULT_MAX_DEPTH,
            rationalize_planes: true,
            depth_scaled_tolerance: true,
            debug: DebugFlags::default(),
        }
    }

    /// The single "use the default if none given" entry point.
    pub fn resolve(env: Option<&GeometryEnvironment>) -> GeometryEnvironment {
        env.cloned().unwrap_or_default()
    }

    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub const fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub const fn with_debug(mut self, debug: DebugFlags) -> Self {
        self.debug = debug;
        self
    }

    pub const fn with_rationalize_planes(mut self, enabled: bool) -> Self {
        self.rationalize_planes = enabled;
        self
    }

    pub const fn with_depth_scaled_tolerance(mut self, enabled: bool) -> Self {
        self.depth_scaled_tolerance = enabled;
        self
    }

    /// Check that every tolerance is finite and positive and the depth limit is usable.
    pub fn validate(&self) -> Result<(), CsgError> {
        let t = &self.tolerances;
        let named = [
            ("epsilon_near_zero", t.epsilon_near_zero),
            ("epsilon_on_plane", t.epsilon_on_plane),
            ("epsilon_between_points", t.epsilon_between_points),
            ("max_eccentricity", t.max_eccentricity),
        ];
        if let Some((name, value)) = named
            .iter()
            .find(|(_, value)| !value.is_finite() || *value <= 0.0)
        {
            return Err(CsgError::InvalidEnvironment(format!(
                "{name} must be finite and positive, got {value}"
            )));
        }
        if t.rationalize_exponent_range <= 0 {
            return Err(CsgError::InvalidEnvironment(format!(
                "rationalize_exponent_range must be positive, got {}",
                t.rationalize_exponent_range
            )));
        }
        if self.max_depth == 0 {
            return Err(CsgError::InvalidEnvironment(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Classification tolerance used at the given BSP depth (root = 1).
    pub fn plane_tolerance(&self, depth: usize) -> Real {
        if self.depth_scaled_tolerance {
            self.tolerances.epsilon_on_plane * depth.max(1) as Real
        } else {
            self.tolerances.epsilon_on_plane
        }
    }

    #[inline]
    pub fn round(&self, value: Real) -> Real {
        match self.precision {
            Precision::Single => round_to_single(value),
            Precision::Double => value,
        }
    }

    #[inline]
    pub fn round_point(&self, p: Point3<Real>) -> Point3<Real> {
        match self.precision {
            Precision::Single => p.map(round_to_single),
            Precision::Double => p,
        }
    }

    #[inline]
    pub fn round_vector(&self, v: Vector3<Real>) -> Vector3<Real> {
        match self.precision {
            Precision::Single => v.map(round_to_single),
            Precision::Double => v,
        }
    }

    #[inline]
    pub fn round_uv(&self, uv: Vector2<Real>) -> Vector2<Real> {
        match self.precision {
            Precision::Single => uv.map(round_to_single),
            Precision::Double => uv,
        }
    }
}
