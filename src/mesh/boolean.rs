//! Boolean operations on polygon lists through BSP trees.
//!
//! Every operator follows the classic clip/invert/build recipe:
//!
//! - union: `a.clip_to(b); b.clip_to(a); b.invert(); b.clip_to(a); b.invert();`
//!   `a.build(b.all_polygons())`
//! - difference: `a.invert()`, then the union steps, then `a.invert()`
//! - intersection: `a.invert(); b.clip_to(a); b.invert(); a.clip_to(b); b.clip_to(a);`
//!   `a.build(b.all_polygons()); a.invert()`
//! - merge: concatenation without any clipping
//!
//! One [`SerialBspOps`] (and so one scratch pool checkout) serves a whole operation.

use crate::environment::GeometryEnvironment;
use crate::errors::CsgError;
use crate::mesh::bsp::{BspOps, Node, SerialBspOps, TreeStatus};
use crate::mesh::polygon::Polygon;
use crate::mesh::validation;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Boolean operator applied to two polygon sets `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    /// Space in `a` or `b`
    Union,
    /// Space in `a` and not in `b`
    Difference,
    /// Space in both `a` and `b`
    Intersection,
    /// Both surfaces kept as they are, as a compound of independent parts
    Merge,
}

/// Data-quality summary of one Boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BooleanReport {
    /// `Valid`, or the first depth at which a BSP build hit the depth limit. A corrupted
    /// result is still returned; whether to accept it is up to the caller.
    pub status: TreeStatus,
    /// Vertices discarded by degenerate splits.
    pub lost_vertices: usize,
    /// Polygon counts of `a` and `b`.
    pub input_polygons: (usize, usize),
}

impl BooleanReport {
    pub const fn is_valid(&self) -> bool {
        self.status.is_valid()
    }
}

/// Output polygons plus the [`BooleanReport`] describing how they were obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanResult {
    pub polygons: Vec<Polygon>,
    pub report: BooleanReport,
}

/// Runs Boolean operators under one validated [`GeometryEnvironment`].
#[derive(Debug, Clone, Copy)]
pub struct BooleanEngine<'env> {
    env: &'env GeometryEnvironment,
}

impl<'env> BooleanEngine<'env> {
    /// Validate `env` once and bind it to the engine.
    pub fn new(env: &'env GeometryEnvironment) -> Result<Self, CsgError> {
        env.validate()?;
        Ok(Self { env })
    }

    /// Engine for an environment that is valid by construction, such as the resolved default.
    pub(crate) fn trusted(env: &'env GeometryEnvironment) -> Self {
        debug_assert!(env.validate().is_ok());
        Self { env }
    }

    pub const fn env(&self) -> &'env GeometryEnvironment {
        self.env
    }

    pub fn union(&self, a: &[Polygon], b: &[Polygon]) -> BooleanResult {
        self.apply(BooleanOp::Union, a, b)
    }

    pub fn difference(&self, a: &[Polygon], b: &[Polygon]) -> BooleanResult {
        self.apply(BooleanOp::Difference, a, b)
    }

    pub fn intersection(&self, a: &[Polygon], b: &[Polygon]) -> BooleanResult {
        self.apply(BooleanOp::Intersection, a, b)
    }

    pub fn merge(&self, a: &[Polygon], b: &[Polygon]) -> BooleanResult {
        self.apply(BooleanOp::Merge, a, b)
    }

    /// Apply `op` to `a` and `b`.
    pub fn apply(&self, op: BooleanOp, a: &[Polygon], b: &[Polygon]) -> BooleanResult {
        let ops = SerialBspOps::new(self.env);
        let (polygons, status) = match op {
            // A tree without a plane clips nothing, so an empty operand would act as
            // "everything" inside the recipes. It is the empty solid instead.
            BooleanOp::Difference | BooleanOp::Intersection if a.is_empty() => {
                (Vec::new(), TreeStatus::Valid)
            },
            BooleanOp::Intersection if b.is_empty() => (Vec::new(), TreeStatus::Valid),
            BooleanOp::Union => self.union_with(&ops, a, b),
            BooleanOp::Difference => self.difference_with(&ops, a, b),
            BooleanOp::Intersection => self.intersection_with(&ops, a, b),
            BooleanOp::Merge => {
                let mut polygons = Vec::with_capacity(a.len() + b.len());
                polygons.extend_from_slice(a);
                polygons.extend_from_slice(b);
                (polygons, TreeStatus::Valid)
            },
        };

        let report = BooleanReport {
            status,
            lost_vertices: ops.lost_vertices(),
            input_polygons: (a.len(), b.len()),
        };

        log::debug!(
            "{op:?}: {} + {} polygons -> {} ({} vertices lost, {:?})",
            a.len(),
            b.len(),
            polygons.len(),
            report.lost_vertices,
            report.status
        );
        if let TreeStatus::CorruptedAtDepth(depth) = report.status {
            log::warn!("{op:?}: BSP depth limit hit at level {depth}; result is approximate");
        }

        if self.env.debug.validate_structure {
            for issue in validation::validate_polygons(&polygons, self.env) {
                log::warn!("{op:?}: {issue}");
            }
        }

        BooleanResult { polygons, report }
    }

    fn trace(&self, op: &str, step: &str) {
        if self.env.debug.trace_operations {
            log::trace!("{op}: {step}");
        }
    }

    /// Build one tree per operand.
    fn build_pair(
        &self,
        ops: &SerialBspOps<'_>,
        a_polys: &[Polygon],
        b_polys: &[Polygon],
    ) -> (Node, Node, TreeStatus) {
        let mut a = Node::new();
        let mut b = Node::new();
        let status = ops.build(&mut a, a_polys).combine(ops.build(&mut b, b_polys));
        (a, b, status)
    }

    fn union_with(
        &self,
        ops: &SerialBspOps<'_>,
        a_polys: &[Polygon],
        b_polys: &[Polygon],
    ) -> (Vec<Polygon>, TreeStatus) {
        let (mut a, mut b, status) = self.build_pair(ops, a_polys, b_polys);

        self.trace("union", "a.clip_to(b)");
        ops.clip_to(&mut a, &b);
        self.trace("union", "b.clip_to(a)");
        ops.clip_to(&mut b, &a);
        self.trace("union", "b.invert()");
        ops.invert(&mut b);
        self.trace("union", "b.clip_to(a)");
        ops.clip_to(&mut b, &a);
        self.trace("union", "b.invert()");
        ops.invert(&mut b);
        self.trace("union", "a.build(b.all_polygons())");
        let status = status.combine(ops.build(&mut a, &ops.all_polygons(&b)));

        (ops.all_polygons(&a), status)
    }

    fn difference_with(
        &self,
        ops: &SerialBspOps<'_>,
        a_polys: &[Polygon],
        b_polys: &[Polygon],
    ) -> (Vec<Polygon>, TreeStatus) {
        let (mut a, mut b, status) = self.build_pair(ops, a_polys, b_polys);

        self.trace("difference", "a.invert()");
        ops.invert(&mut a);
        self.trace("difference", "a.clip_to(b)");
        ops.clip_to(&mut a, &b);
        self.trace("difference", "b.clip_to(a)");
        ops.clip_to(&mut b, &a);
        self.trace("difference", "b.invert()");
        ops.invert(&mut b);
        self.trace("difference", "b.clip_to(a)");
        ops.clip_to(&mut b, &a);
        self.trace("difference", "b.invert()");
        ops.invert(&mut b);
        self.trace("difference", "a.build(b.all_polygons())");
        let status = status.combine(ops.build(&mut a, &ops.all_polygons(&b)));
        self.trace("difference", "a.invert()");
        ops.invert(&mut a);

        (ops.all_polygons(&a), status)
    }

    fn intersection_with(
        &self,
        ops: &SerialBspOps<'_>,
        a_polys: &[Polygon],
        b_polys: &[Polygon],
    ) -> (Vec<Polygon>, TreeStatus) {
        let (mut a, mut b, status) = self.build_pair(ops, a_polys, b_polys);

        self.trace("intersection", "a.invert()");
        ops.invert(&mut a);
        self.trace("intersection", "b.clip_to(a)");
        ops.clip_to(&mut b, &a);
        self.trace("intersection", "b.invert()");
        ops.invert(&mut b);
        self.trace("intersection", "a.clip_to(b)");
        ops.clip_to(&mut a, &b);
        self.trace("intersection", "b.clip_to(a)");
        ops.clip_to(&mut b, &a);
        self.trace("intersection", "a.build(b.all_polygons())");
        let status = status.combine(ops.build(&mut a, &ops.all_polygons(&b)));
        self.trace("intersection", "a.invert()");
        ops.invert(&mut a);

        (ops.all_polygons(&a), status)
    }
}

/// Evaluate `op` on many independent operand pairs.
///
/// With the `parallel` feature the pairs are spread over rayon's pool; each worker
/// checks out its own thread's scratch pool.
pub fn apply_batch(
    pairs: &[(Vec<Polygon>, Vec<Polygon>)],
    op: BooleanOp,
    env: &GeometryEnvironment,
) -> Result<Vec<BooleanResult>, CsgError> {
    let engine = BooleanEngine::new(env)?;

    #[cfg(feature = "parallel")]
    let results = pairs
        .par_iter()
        .map(|(a, b)| engine.apply(op, a, b))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results = pairs
        .iter()
        .map(|(a, b)| engine.apply(op, a, b))
        .collect();

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::Real;
    use crate::mesh::vertex::Vertex;
    use nalgebra::{Point3, Vector3};

    fn square(z: Real, material: i32, env: &GeometryEnvironment) -> Polygon {
        let n = Vector3::z();
        let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let vertices: Vec<Vertex> = corners
            .iter()
            .map(|&(x, y)| Vertex::new(Point3::new(x, y, z), n))
            .collect();
        Polygon::create(&vertices, material, env).unwrap()
    }

    #[test]
    fn engine_rejects_invalid_environment() {
        let env = GeometryEnvironment::default().with_max_depth(0);
        assert!(matches!(
            BooleanEngine::new(&env),
            Err(CsgError::InvalidEnvironment(_))
        ));
    }

    #[test]
    fn merge_concatenates_in_order() {
        let env = GeometryEnvironment::default();
        let engine = BooleanEngine::new(&env).unwrap();
        let a = vec![square(0.0, 1, &env)];
        let b = vec![square(0.0, 2, &env), square(1.0, 3, &env)];

        let result = engine.merge(&a, &b);
        let materials: Vec<i32> = result.polygons.iter().map(|p| p.material_index).collect();
        assert_eq!(materials, vec![1, 2, 3]);
        assert_eq!(result.report.input_polygons, (1, 2));
        assert!(result.report.is_valid());
        assert_eq!(result.report.lost_vertices, 0);
    }

    #[test]
    fn empty_operands() {
        let env = GeometryEnvironment::default();
        let engine = BooleanEngine::new(&env).unwrap();
        let a = vec![square(0.0, 0, &env)];

        assert!(engine.union(&[], &[]).polygons.is_empty());
        assert_eq!(engine.union(&a, &[]).polygons, a);
        assert_eq!(engine.difference(&a, &[]).polygons, a);
        assert!(engine.difference(&[], &a).polygons.is_empty());
        assert!(engine.intersection(&a, &[]).polygons.is_empty());
        assert!(engine.intersection(&[], &a).polygons.is_empty());
    }

    #[test]
    fn batch_matches_single_calls() {
        let env = GeometryEnvironment::default();
        let engine = BooleanEngine::new(&env).unwrap();
        let pairs = vec![
            (vec![square(0.0, 0, &env)], vec![square(1.0, 1, &env)]),
            (vec![square(2.0, 2, &env)], Vec::new()),
        ];

        let batch = apply_batch(&pairs, BooleanOp::Merge, &env).unwrap();
        assert_eq!(batch.len(), 2);
        for ((a, b), result) in pairs.iter().zip(&batch) {
            assert_eq!(*result, engine.merge(a, b));
        }
    }
}
