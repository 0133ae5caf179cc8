//! Serial implementation of BSP operations

use crate::environment::GeometryEnvironment;
use crate::mesh::bsp::node::{Node, TreeStatus};
use crate::mesh::bsp::traits::{BspOps, FirstPolygonStrategy, SplittingPlaneStrategy};
use crate::mesh::plane::{Plane, SplitBuckets};
use crate::mesh::polygon::{Polygon, dedup_polygons};
use crate::scratch::{self, ScratchCheckout};
use std::cell::{Cell, RefCell};

/// Serial implementation of BSP operations.
///
/// One instance serves one top-level operation: it holds the environment, a scratch
/// pool checked out of the calling thread and a running count of vertices lost to
/// degeneracy.
pub struct SerialBspOps<'env, SP: SplittingPlaneStrategy = FirstPolygonStrategy> {
    env: &'env GeometryEnvironment,
    splitting_strategy: SP,
    scratch: RefCell<ScratchCheckout>,
    lost_vertices: Cell<usize>,
}

impl<'env> SerialBspOps<'env, FirstPolygonStrategy> {
    pub fn new(env: &'env GeometryEnvironment) -> Self {
        Self::with_strategy(env, FirstPolygonStrategy)
    }
}

impl<'env, SP: SplittingPlaneStrategy> SerialBspOps<'env, SP> {
    pub fn with_strategy(env: &'env GeometryEnvironment, strategy: SP) -> Self {
        Self {
            env,
            splitting_strategy: strategy,
            scratch: RefCell::new(scratch::checkout()),
            lost_vertices: Cell::new(0),
        }
    }

    pub const fn env(&self) -> &'env GeometryEnvironment {
        self.env
    }

    /// Vertices dropped by degenerate splits since this instance was created.
    pub fn lost_vertices(&self) -> usize {
        self.lost_vertices.get()
    }

    fn split(&self, plane: &Plane, polygon: &Polygon, depth: usize, out: &mut SplitBuckets) {
        let lost = {
            let mut scratch = self.scratch.borrow_mut();
            plane.split_polygon(polygon, depth, self.env, &mut scratch, out)
        };
        self.lost_vertices.set(self.lost_vertices.get() + lost);
    }
}

impl<SP: SplittingPlaneStrategy> BspOps for SerialBspOps<'_, SP> {
    fn invert(&self, node: &mut Node) {
        // Use iterative approach with a stack
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            // Flip all polygons and plane in this node
            for polygon in current.polygons.iter_mut() {
                *polygon = polygon.flipped();
            }
            current.plane = current.plane.map(|plane| plane.flipped());

            // Swap front and back
            std::mem::swap(&mut current.front, &mut current.back);

            // Add children to stack
            if let Some(ref mut front) = current.front {
                stack.push(front.as_mut());
            }
            if let Some(ref mut back) = current.back {
                stack.push(back.as_mut());
            }
        }
    }

    fn clip_polygons(&self, node: &Node, polygons: &[Polygon]) -> Vec<Polygon> {
        // A node without a plane clips nothing
        let Some(plane) = node.plane else {
            return polygons.to_vec();
        };

        let mut buckets = SplitBuckets::default();
        for polygon in polygons {
            self.split(&plane, polygon, node.level, &mut buckets);
        }

        // Coplanar pieces follow their orientation
        let SplitBuckets {
            coplanar_front: mut front_polys,
            coplanar_back: mut back_polys,
            mut front,
            mut back,
        } = buckets;
        front_polys.append(&mut front);
        back_polys.append(&mut back);

        let mut result = if let Some(front_node) = &node.front {
            self.clip_polygons(front_node, &front_polys)
        } else {
            front_polys
        };

        // Without a back child the back pieces are inside: drop them
        if let Some(back_node) = &node.back {
            result.extend(self.clip_polygons(back_node, &back_polys));
        }

        result
    }

    fn clip_to(&self, node: &mut Node, bsp: &Node) {
        node.polygons = self.clip_polygons(bsp, &node.polygons);

        if let Some(ref mut front) = node.front {
            self.clip_to(front, bsp);
        }

        if let Some(ref mut back) = node.back {
            self.clip_to(back, bsp);
        }
    }

    fn all_polygons(&self, node: &Node) -> Vec<Polygon> {
        node.all_polygons()
    }

    fn build(&self, node: &mut Node, polygons: &[Polygon]) -> TreeStatus {
        if polygons.is_empty() {
            return TreeStatus::Valid;
        }

        let depth = node.level;
        if depth > self.env.max_depth {
            log::warn!(
                "BSP depth limit {} exceeded at level {depth}; storing {} polygons unsplit",
                self.env.max_depth,
                polygons.len()
            );
            node.polygons.extend_from_slice(polygons);
            node.status = TreeStatus::CorruptedAtDepth(depth);
            return node.status;
        }

        // Choose the splitting plane if not already set
        let plane = match node.plane {
            Some(plane) => plane,
            None => {
                let chosen =
                    &polygons[self.splitting_strategy.pick_splitting_polygon(polygons, self.env)];
                node.material_index = chosen.material_index;
                *node.plane.insert(chosen.plane)
            },
        };

        let mut buckets = SplitBuckets::default();
        for polygon in polygons {
            self.split(&plane, polygon, depth, &mut buckets);
        }

        node.polygons.append(&mut buckets.coplanar_front);
        node.polygons.append(&mut buckets.coplanar_back);
        let removed = dedup_polygons(&mut node.polygons, self.env);
        if removed > 0 {
            log::debug!("removed {removed} duplicate coplanar polygons at level {depth}");
        }

        // Build child nodes lazily
        let mut status = TreeStatus::Valid;
        if !buckets.front.is_empty() {
            let front = node
                .front
                .get_or_insert_with(|| Box::new(Node::with_level(depth + 1)));
            status = status.combine(self.build(front, &buckets.front));
        }

        if !buckets.back.is_empty() {
            let back = node
                .back
                .get_or_insert_with(|| Box::new(Node::with_level(depth + 1)));
            status = status.combine(self.build(back, &buckets.back));
        }

        status
    }
}
