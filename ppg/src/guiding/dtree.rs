use glam::Vec2;

use super::arena::{DirArena, DirHandle, DirNode, DIR_CHILDREN};
use crate::{math::Bounds2, ppg_trace, ppg_warn};

// Based on "Practical Path Guiding for Efficient Light-Transport Simulation",
// Müller et al. 2017

/// Relative flux density above which a directional leaf is worth splitting.
pub const RHO: f32 = 0.01;

/// Read-only view of the directional quadtree stored in one arena segment.
///
/// The tree approximates incident radiance over the normalized (theta, phi)
/// square; each interior node's four children quarter its rectangle.
pub struct DTreeRef<'a> {
    arena: &'a DirArena,
    segment: u32,
}

/// Mutating view of the directional quadtree stored in one arena segment.
pub struct DTreeMut<'a> {
    arena: &'a mut DirArena,
    segment: u32,
}

impl<'a> DTreeRef<'a> {
    pub fn new(arena: &'a DirArena, segment: u32) -> Self {
        debug_assert!(segment < arena.segments());
        Self { arena, segment }
    }

    #[inline]
    fn root(&self) -> DirHandle {
        DirHandle::root_of(self.segment)
    }

    /// Total flux deposited into this distribution.
    pub fn total_flux(&self) -> f32 {
        self.arena.flux(self.root())
    }

    /// The number of allocated nodes in this segment.
    pub fn node_count(&self) -> u32 {
        self.arena.allocated(self.segment)
    }

    /// Descends to the leaf whose rectangle contains `p` without mutating
    /// anything. Coordinates exactly on a midpoint resolve to the upper half.
    pub fn leaf_for(&self, p: Vec2) -> (DirHandle, Bounds2) {
        let mut handle = self.root();
        let mut bounds = Bounds2::unit_square();
        loop {
            match self.arena.node(handle) {
                DirNode::Leaf => return (handle, bounds),
                DirNode::Interior { first_child } => {
                    let (quadrant, child_bounds) = bounds.quadrant(p);
                    handle = DirHandle {
                        segment: self.segment,
                        offset: first_child + quadrant as u32,
                    };
                    bounds = child_bounds;
                }
            }
        }
    }

    /// The density the learned distribution assigns to `p`, with respect to
    /// the normalized (theta, phi) square. Host-side mirror of the sampler
    /// the GPU runs over the serialized layout.
    pub fn pdf(&self, p: Vec2) -> f32 {
        let mut handle = self.root();
        let mut bounds = Bounds2::unit_square();
        let mut density = 1.0;
        loop {
            match self.arena.node(handle) {
                DirNode::Leaf => return density,
                DirNode::Interior { first_child } => {
                    let node_flux = self.arena.flux(handle);
                    if node_flux <= 0.0 {
                        return 0.0;
                    }
                    let (quadrant, child_bounds) = bounds.quadrant(p);
                    let child = DirHandle {
                        segment: self.segment,
                        offset: first_child + quadrant as u32,
                    };
                    density *= DIR_CHILDREN as f32 * self.arena.flux(child) / node_flux;
                    handle = child;
                    bounds = child_bounds;
                }
            }
        }
    }

    /// Logs the distribution at trace level, one node per line.
    pub fn log_tree(&self) {
        self.log_node(self.root(), Bounds2::unit_square(), 0);
    }

    fn log_node(&self, handle: DirHandle, bounds: Bounds2, depth: u32) {
        ppg_trace!(
            "{:indent$}{}.{}: flux {} {:?}",
            "",
            handle.segment,
            handle.offset,
            self.arena.flux(handle),
            bounds,
            indent = (depth * 2) as usize
        );
        if let DirNode::Interior { first_child } = self.arena.node(handle) {
            for i in 0..DIR_CHILDREN {
                let child = DirHandle {
                    segment: self.segment,
                    offset: first_child + i,
                };
                self.log_node(child, bounds.quadrant_bounds(i as usize), depth + 1);
            }
        }
    }
}

impl<'a> DTreeMut<'a> {
    pub fn new(arena: &'a mut DirArena, segment: u32) -> Self {
        debug_assert!(segment < arena.segments());
        Self { arena, segment }
    }

    #[inline]
    fn root(&self) -> DirHandle {
        DirHandle::root_of(self.segment)
    }

    /// Deposits `radiance` along the path from the root to the leaf whose
    /// rectangle contains `p`.
    ///
    /// `p` must lie in `[0,1]^2`; coordinates exactly on a midpoint resolve
    /// to the upper half.
    pub fn fill(&mut self, p: Vec2, radiance: f32) {
        debug_assert!(Bounds2::unit_square().contains(p));
        let mut handle = self.root();
        let mut bounds = Bounds2::unit_square();
        loop {
            self.arena.add_flux(handle, radiance);
            match self.arena.node(handle) {
                DirNode::Leaf => return,
                DirNode::Interior { first_child } => {
                    let (quadrant, child_bounds) = bounds.quadrant(p);
                    handle = DirHandle {
                        segment: self.segment,
                        offset: first_child + quadrant as u32,
                    };
                    bounds = child_bounds;
                }
            }
        }
    }

    /// Post-iteration refinement pass over the whole segment.
    ///
    /// A leaf holding more than [`RHO`] of the segment root's flux splits,
    /// each child seeded with a quarter of its flux; the seed is re-tested so
    /// hot leaves cascade multiple levels in one pass. Exhausting the segment
    /// leaves the branch at its current resolution.
    pub fn update(&mut self) {
        self.update_node(self.root(), 0.0);
    }

    fn update_node(&mut self, handle: DirHandle, seed_flux: f32) {
        self.arena.add_flux(handle, seed_flux);
        match self.arena.node(handle) {
            DirNode::Leaf => {
                let root_flux = self.arena.flux(self.root());
                if root_flux <= 0.0 || self.arena.flux(handle) / root_flux <= RHO {
                    return;
                }
                let Some(first_child) = self.arena.allocate(self.segment) else {
                    return;
                };
                self.arena.make_interior(handle, first_child);
                let quarter = self.arena.flux(handle) / DIR_CHILDREN as f32;
                for i in 0..DIR_CHILDREN {
                    self.update_node(first_child.sibling(i), quarter);
                }
            }
            DirNode::Interior { first_child } => {
                for i in 0..DIR_CHILDREN {
                    let child = DirHandle {
                        segment: self.segment,
                        offset: first_child + i,
                    };
                    self.update_node(child, 0.0);
                }
            }
        }
    }

    /// Unconditionally pre-subdivides a fresh segment to `depth`, giving the
    /// distribution a minimum angular resolution before any samples arrive.
    pub fn initial_split(&mut self, depth: u32) {
        self.split_node(self.root(), depth);
    }

    fn split_node(&mut self, handle: DirHandle, depth: u32) {
        if depth == 0 {
            return;
        }
        let Some(first_child) = self.arena.allocate(self.segment) else {
            ppg_warn!(
                "Directional segment {} exhausted, initial split stops early",
                self.segment
            );
            return;
        };
        self.arena.make_interior(handle, first_child);
        for i in 0..DIR_CHILDREN {
            self.split_node(first_child.sibling(i), depth - 1);
        }
    }
}
