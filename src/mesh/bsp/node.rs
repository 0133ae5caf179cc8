//! BSP tree node data structure

use crate::mesh::plane::Plane;
use crate::mesh::polygon::Polygon;

/// Outcome of building a (sub)tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStatus {
    #[default]
    Valid,
    /// Recursion reached the environment's depth limit at this level; the polygons
    /// that would have been split further are stored unsplit.
    CorruptedAtDepth(usize),
}

impl TreeStatus {
    pub const fn is_valid(&self) -> bool {
        matches!(self, TreeStatus::Valid)
    }

    /// Keep the first corruption seen.
    pub const fn combine(self, other: TreeStatus) -> TreeStatus {
        match self {
            TreeStatus::Valid => other,
            corrupted => corrupted,
        }
    }
}

/// A BSP tree node, containing polygons plus optional front/back subtrees
#[derive(Debug, Clone)]
pub struct Node {
    /// Splitting plane for this node *or* **None** for an empty node, which
    /// passes every clip through unchanged.
    pub plane: Option<Plane>,

    /// Polygons in *front* half‑spaces.
    pub front: Option<Box<Node>>,

    /// Polygons in *back* half‑spaces.
    pub back: Option<Box<Node>>,

    /// Polygons that lie on `plane` (after the node has been built).
    pub polygons: Vec<Polygon>,

    /// Depth of this node, the root is level 1.
    pub level: usize,

    /// Whether building this node hit the depth limit.
    pub status: TreeStatus,

    /// Material of the polygon whose plane this node adopted.
    pub material_index: i32,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Create a new empty root node
    pub const fn new() -> Self {
        Self::with_level(1)
    }

    /// Create a new empty node at the given depth
    pub const fn with_level(level: usize) -> Self {
        Self {
            plane: None,
            front: None,
            back: None,
            polygons: Vec::new(),
            level,
            status: TreeStatus::Valid,
            material_index: 0,
        }
    }

    /// Status of the whole subtree: the first corrupted node found in pre-order.
    pub fn subtree_status(&self) -> TreeStatus {
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            if !current.status.is_valid() {
                return current.status;
            }
            stack.extend(
                [&current.back, &current.front]
                    .into_iter()
                    .filter_map(|child| child.as_deref()),
            );
        }
        TreeStatus::Valid
    }

    /// Deepest level present in the subtree.
    pub fn max_level(&self) -> usize {
        let mut deepest = self.level;
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            deepest = deepest.max(current.level);
            stack.extend(
                [&current.front, &current.back]
                    .into_iter()
                    .filter_map(|child| child.as_deref()),
            );
        }
        deepest
    }
}
