//! Binary Space Partitioning (BSP) tree implementation
//!
//! This module provides BSP tree operations with dependency inversion: the
//! algorithms live behind [`BspOps`], and [`Node`] exposes convenience wrappers
//! that run them with a fresh [`SerialBspOps`] for the given environment.

pub mod node;
pub mod serial;
pub mod traits;

pub use node::{Node, TreeStatus};
pub use serial::SerialBspOps;
pub use traits::{BalancedSplittingStrategy, BspOps, FirstPolygonStrategy, SplittingPlaneStrategy};

use crate::environment::GeometryEnvironment;
use crate::mesh::polygon::Polygon;

impl Node {
    /// Creates a new BSP tree from polygons. Check [`Node::subtree_status`] for
    /// depth-limit corruption.
    pub fn from_polygons(polygons: &[Polygon], env: &GeometryEnvironment) -> Self {
        let mut node = Self::new();
        node.build(polygons, env);
        node
    }

    /// Invert all polygons in the BSP tree
    pub fn invert(&mut self, env: &GeometryEnvironment) {
        SerialBspOps::new(env).invert(self);
    }

    /// Recursively remove all polygons that are inside this BSP tree
    pub fn clip_polygons(&self, polygons: &[Polygon], env: &GeometryEnvironment) -> Vec<Polygon> {
        SerialBspOps::new(env).clip_polygons(self, polygons)
    }

    /// Remove all polygons in this BSP tree that are inside the other BSP tree
    pub fn clip_to(&mut self, bsp: &Node, env: &GeometryEnvironment) {
        SerialBspOps::new(env).clip_to(self, bsp);
    }

    /// Return all polygons in this BSP tree: local, then front, then back
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = Vec::new();
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            result.extend_from_slice(&current.polygons);
            stack.extend(
                [&current.back, &current.front]
                    .into_iter()
                    .filter_map(|child| child.as_deref()),
            );
        }
        result
    }

    /// Build a BSP tree from the given polygons
    pub fn build(&mut self, polygons: &[Polygon], env: &GeometryEnvironment) -> TreeStatus {
        SerialBspOps::new(env).build(self, polygons)
    }
}
