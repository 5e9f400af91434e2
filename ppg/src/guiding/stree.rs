use glam::Vec3;

use super::{
    arena::{DirArena, SpatialArena, SpatialHandle, SpatialNode, SPATIAL_CHILDREN},
    dtree::DTreeMut,
};
use crate::{math::Bounds3, ppg_trace, ppg_warn};

/// Binary tree partitioning the unit cube by recursively bisecting along
/// cycling axes (x at depth 0, then y, then z, then x again).
///
/// Nodes carry no bounds; a node's interval is reconstructed from its depth
/// and the left/right choices taken while descending from the root. Each
/// leaf owns the directional segment that shares its handle index.
pub struct STree {
    arena: SpatialArena,
}

impl STree {
    pub fn new(capacity: u32) -> Self {
        Self {
            arena: SpatialArena::new(capacity),
        }
    }

    #[inline]
    pub fn arena(&self) -> &SpatialArena {
        &self.arena
    }

    /// Descends to the leaf whose interval contains `p`, bumping its sample
    /// counter. This is the per-path-vertex "which cell owns this point"
    /// query.
    ///
    /// `p` must lie in `[0,1]^3`; a coordinate exactly on a split midpoint
    /// resolves to the upper half.
    pub fn find_leaf(&mut self, p: Vec3) -> SpatialHandle {
        debug_assert!(Bounds3::unit_cube().contains(p));
        let handle = self.descend(p);
        self.arena.add_flux(handle, 1);
        handle
    }

    /// [`STree::find_leaf`] without the sample counter bump.
    pub fn leaf_at(&self, p: Vec3) -> SpatialHandle {
        self.descend(p)
    }

    fn descend(&self, p: Vec3) -> SpatialHandle {
        let mut handle = SpatialHandle::ROOT;
        let mut bounds = Bounds3::unit_cube();
        let mut depth = 0usize;
        loop {
            match self.arena.node(handle) {
                SpatialNode::Leaf => return handle,
                SpatialNode::Interior { first_child } => {
                    let (half, child_bounds) = bounds.half(depth % 3, p);
                    handle = first_child.sibling(half as u32);
                    bounds = child_bounds;
                    depth += 1;
                }
            }
        }
    }

    /// Post-iteration refinement pass.
    ///
    /// A leaf whose sample counter exceeds `threshold` splits in two, each
    /// child inheriting half the counter and a full copy of the parent's
    /// directional segment; the pass recurses into the new children so hot
    /// cells cascade in one call. Every leaf that survives the pass gets a
    /// directional refinement pass of its own. Arena exhaustion skips the
    /// split and leaves the branch at its current resolution.
    ///
    /// `threshold` scaling across iterations is the caller's policy.
    pub fn update(&mut self, dtrees: &mut DirArena, threshold: u32) {
        self.update_node(dtrees, SpatialHandle::ROOT, threshold);
    }

    fn update_node(&mut self, dtrees: &mut DirArena, handle: SpatialHandle, threshold: u32) {
        match self.arena.node(handle) {
            SpatialNode::Leaf => {
                let flux = self.arena.flux(handle);
                if flux > threshold {
                    if let Some(first_child) = self.arena.allocate() {
                        self.arena.make_interior(handle, first_child);
                        let half_flux = flux / SPATIAL_CHILDREN;
                        for i in 0..SPATIAL_CHILDREN {
                            let child = first_child.sibling(i);
                            self.arena.set_flux(child, half_flux);
                            dtrees.copy_segment(handle.segment(), child.segment());
                        }
                        for i in 0..SPATIAL_CHILDREN {
                            self.update_node(dtrees, first_child.sibling(i), threshold);
                        }
                        return;
                    }
                }
                // Still a leaf, refine its distribution in place
                DTreeMut::new(dtrees, handle.segment()).update();
            }
            SpatialNode::Interior { first_child } => {
                for i in 0..SPATIAL_CHILDREN {
                    self.update_node(dtrees, first_child.sibling(i), threshold);
                }
            }
        }
    }

    /// Eagerly pre-splits to `depth` regardless of flux, so training starts
    /// with `2^depth` cells instead of one.
    pub fn initial_split(&mut self, depth: u32) {
        self.split_node(SpatialHandle::ROOT, depth);
    }

    fn split_node(&mut self, handle: SpatialHandle, depth: u32) {
        if depth == 0 {
            return;
        }
        let Some(first_child) = self.arena.allocate() else {
            ppg_warn!("Spatial arena exhausted, initial split stops early");
            return;
        };
        self.arena.make_interior(handle, first_child);
        for i in 0..SPATIAL_CHILDREN {
            self.split_node(first_child.sibling(i), depth - 1);
        }
    }

    /// Visits every leaf with its handle, reconstructed interval and depth.
    pub fn for_each_leaf(&self, f: &mut impl FnMut(SpatialHandle, Bounds3, u32)) {
        self.visit_leaves(SpatialHandle::ROOT, Bounds3::unit_cube(), 0, f);
    }

    fn visit_leaves(
        &self,
        handle: SpatialHandle,
        bounds: Bounds3,
        depth: u32,
        f: &mut impl FnMut(SpatialHandle, Bounds3, u32),
    ) {
        match self.arena.node(handle) {
            SpatialNode::Leaf => f(handle, bounds, depth),
            SpatialNode::Interior { first_child } => {
                for i in 0..SPATIAL_CHILDREN {
                    self.visit_leaves(
                        first_child.sibling(i),
                        bounds.half_bounds(depth as usize % 3, i as usize),
                        depth + 1,
                        f,
                    );
                }
            }
        }
    }

    pub fn leaf_count(&self) -> u32 {
        let mut count = 0;
        self.for_each_leaf(&mut |_, _, _| count += 1);
        count
    }

    /// Logs the tree at trace level, one node per line.
    pub fn log_tree(&self) {
        self.log_node(SpatialHandle::ROOT, Bounds3::unit_cube(), 0);
    }

    fn log_node(&self, handle: SpatialHandle, bounds: Bounds3, depth: u32) {
        ppg_trace!(
            "{:indent$}{}: flux {} {:?}",
            "",
            handle.index(),
            self.arena.flux(handle),
            bounds,
            indent = (depth * 2) as usize
        );
        if let SpatialNode::Interior { first_child } = self.arena.node(handle) {
            for i in 0..SPATIAL_CHILDREN {
                self.log_node(
                    first_child.sibling(i),
                    bounds.half_bounds(depth as usize % 3, i as usize),
                    depth + 1,
                );
            }
        }
    }

    /// Back to the freshly constructed single-leaf state.
    pub fn reset(&mut self) {
        self.arena.reset();
    }

    pub(super) fn arena_mut(&mut self) -> &mut SpatialArena {
        &mut self.arena
    }
}
