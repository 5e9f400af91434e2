mod arena;
mod dtree;
mod gpu;
mod stree;

pub use arena::{
    DirArena, DirHandle, DirNode, SpatialArena, SpatialHandle, SpatialNode, DIR_CHILDREN,
    DIR_OFFSET_BITS, DIR_SEGMENT_SLOTS, SPATIAL_CHILDREN,
};
pub use dtree::{DTreeMut, DTreeRef, RHO};
pub use gpu::{GpuDirNode, GpuLayout, GpuSpatialNode, INVALID_NODE};
pub use stree::STree;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::direction_to_canonical;

#[derive(Copy, Clone, Debug, Deserialize, Serialize)]
pub struct GuidingConfig {
    /// Spatial node slots; directional capacity follows as
    /// `spatial_capacity * DIR_SEGMENT_SLOTS`.
    pub spatial_capacity: u32,
    /// Eager spatial subdivision depth at construction.
    pub spatial_initial_depth: u32,
    /// Eager angular subdivision depth for every fresh leaf distribution.
    pub directional_initial_depth: u32,
}

impl Default for GuidingConfig {
    fn default() -> Self {
        Self {
            spatial_capacity: 10000,
            spatial_initial_depth: 3,
            directional_initial_depth: 2,
        }
    }
}

/// The adaptive spatial-directional radiance cache.
///
/// Owns both node arenas and their flux arrays; the renderer deposits path
/// samples with [`GuidingCache::record`], refines once per training
/// iteration with [`GuidingCache::refine`] and uploads
/// [`GuidingCache::gpu_layout`] to the buffers its sampling shader reads.
/// All mutation is single-threaded; the renderer's submit/fence discipline
/// keeps it ordered against GPU reads.
pub struct GuidingCache {
    config: GuidingConfig,
    stree: STree,
    dtrees: DirArena,
}

impl GuidingCache {
    pub fn new(config: GuidingConfig) -> Self {
        let mut stree = STree::new(config.spatial_capacity);
        let mut dtrees = DirArena::new(config.spatial_capacity);
        Self::initial_splits(&mut stree, &mut dtrees, &config);
        Self {
            config,
            stree,
            dtrees,
        }
    }

    fn initial_splits(stree: &mut STree, dtrees: &mut DirArena, config: &GuidingConfig) {
        stree.initial_split(config.spatial_initial_depth);
        let mut leaves = Vec::new();
        stree.for_each_leaf(&mut |handle, _, _| leaves.push(handle));
        for leaf in leaves {
            DTreeMut::new(dtrees, leaf.segment()).initial_split(config.directional_initial_depth);
        }
    }

    #[inline]
    pub fn config(&self) -> &GuidingConfig {
        &self.config
    }

    /// Deposits one path-vertex sample: finds the leaf cell owning
    /// `position` and fills its distribution with `radiance` towards
    /// `direction`. Returns the owning leaf.
    ///
    /// `position` must lie in `[0,1]^3` (the renderer normalizes scene
    /// coordinates before depositing) and `direction` must be a unit vector.
    pub fn record(&mut self, position: Vec3, direction: Vec3, radiance: f32) -> SpatialHandle {
        let leaf = self.stree.find_leaf(position);
        DTreeMut::new(&mut self.dtrees, leaf.segment())
            .fill(direction_to_canonical(direction), radiance);
        leaf
    }

    /// Once-per-iteration refinement: splits hot spatial cells (seeding the
    /// children from the parent's distribution) and refines every surviving
    /// leaf's directional tree.
    pub fn refine(&mut self, threshold: u32) {
        self.stree.update(&mut self.dtrees, threshold);
    }

    /// Zeroes all transient flux ahead of a new sample batch, keeping
    /// topology.
    pub fn begin_iteration(&mut self) {
        self.stree.arena_mut().zero_flux();
        self.dtrees.zero_flux();
    }

    /// Full teardown to the freshly constructed state, for an independent
    /// training run. Capacities are unchanged.
    pub fn reset(&mut self) {
        self.stree.reset();
        self.dtrees.reset();
        Self::initial_splits(&mut self.stree, &mut self.dtrees, &self.config);
    }

    /// The learned distribution governing `position`.
    pub fn distribution_at(&self, position: Vec3) -> DTreeRef<'_> {
        let leaf = self.stree.leaf_at(position);
        DTreeRef::new(&self.dtrees, leaf.segment())
    }

    /// The density the cache assigns to scattering towards `direction` at
    /// `position`, over the normalized (theta, phi) square.
    pub fn pdf(&self, position: Vec3, direction: Vec3) -> f32 {
        self.distribution_at(position)
            .pdf(direction_to_canonical(direction))
    }

    #[inline]
    pub fn stree(&self) -> &STree {
        &self.stree
    }

    #[inline]
    pub fn dtrees(&self) -> &DirArena {
        &self.dtrees
    }

    pub fn spatial_node_count(&self) -> u32 {
        self.stree.arena().allocated()
    }

    pub fn spatial_leaf_count(&self) -> u32 {
        self.stree.leaf_count()
    }

    /// Allocated directional nodes over all live leaf distributions.
    pub fn directional_node_count(&self) -> u32 {
        let mut count = 0;
        self.stree
            .for_each_leaf(&mut |handle, _, _| count += self.dtrees.allocated(handle.segment()));
        count
    }

    /// Samples deposited since the flux counters were last zeroed.
    pub fn sample_count(&self) -> u32 {
        let mut count = 0;
        self.stree
            .for_each_leaf(&mut |handle, _, _| count += self.stree.arena().flux(handle));
        count
    }

    /// Serializes both arenas for upload to the GPU-visible buffers.
    pub fn gpu_layout(&self) -> GpuLayout {
        gpu::serialize(self.stree.arena(), &self.dtrees)
    }
}
