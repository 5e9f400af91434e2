/// Children per spatial node split.
pub const SPATIAL_CHILDREN: u32 = 2;
/// Children per directional node split.
pub const DIR_CHILDREN: u32 = 4;
/// Width of the offset field in a packed directional handle.
pub const DIR_OFFSET_BITS: u32 = 9;
/// Node slots in one directional segment.
pub const DIR_SEGMENT_SLOTS: u32 = 1 << DIR_OFFSET_BITS;

/// Index of a node in the flat spatial arena.
///
/// Doubles as the identifier of the directional segment owned by the node:
/// segment ids and spatial indices share the same space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpatialHandle(u32);

impl SpatialHandle {
    /// The root of the spatial tree.
    pub const ROOT: Self = Self(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn segment(self) -> u32 {
        self.0
    }

    /// Child `i` of a node whose children start at `self`.
    #[inline]
    pub fn sibling(self, i: u32) -> Self {
        debug_assert!(i < SPATIAL_CHILDREN);
        Self(self.0 + i)
    }
}

/// Position of a node in the segmented directional arena.
///
/// Kept as an explicit pair; the packed `segment << DIR_OFFSET_BITS | offset`
/// form only appears in the serialized layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DirHandle {
    pub segment: u32,
    pub offset: u32,
}

impl DirHandle {
    /// The root node of `segment`, reachable from any handle in it.
    #[inline]
    pub fn root_of(segment: u32) -> Self {
        Self { segment, offset: 0 }
    }

    /// The root of this handle's own segment.
    #[inline]
    pub fn root(self) -> Self {
        Self::root_of(self.segment)
    }

    /// Child `i` of a node whose children start at `self`.
    #[inline]
    pub fn sibling(self, i: u32) -> Self {
        debug_assert!(i < DIR_CHILDREN);
        Self {
            segment: self.segment,
            offset: self.offset + i,
        }
    }

    /// Index of this node in a capacity-spanning flat array. Widened so
    /// segment ids past `u32::MAX >> DIR_OFFSET_BITS` still index correctly.
    #[inline]
    pub fn slot(self) -> usize {
        debug_assert!(self.offset < DIR_SEGMENT_SLOTS);
        self.segment as usize * DIR_SEGMENT_SLOTS as usize + self.offset as usize
    }

    /// The serialized handle encoding, segment in the high bits.
    #[inline]
    pub fn packed(self) -> u32 {
        debug_assert!(self.offset < DIR_SEGMENT_SLOTS);
        self.segment << DIR_OFFSET_BITS | self.offset
    }

    #[inline]
    pub fn unpack(packed: u32) -> Self {
        Self {
            segment: packed >> DIR_OFFSET_BITS,
            offset: packed & (DIR_SEGMENT_SLOTS - 1),
        }
    }
}

/// A spatial node is either a leaf or a full pair of children.
///
/// Children of one split are contiguous so only the first index is stored;
/// a partial child set is unrepresentable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpatialNode {
    Leaf,
    Interior { first_child: SpatialHandle },
}

/// A directional node is either a leaf or a full quartet of children,
/// addressed relative to the node's own segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DirNode {
    Leaf,
    Interior { first_child: u32 },
}

/// Flat bump-allocated storage for spatial nodes and their flux counters.
///
/// Nodes are appended monotonically and never freed; running out of slots is
/// a normal outcome surfaced as `None` from [`SpatialArena::allocate`].
pub struct SpatialArena {
    nodes: Vec<SpatialNode>,
    flux: Vec<u32>,
    next: u32,
}

impl SpatialArena {
    pub fn new(capacity: u32) -> Self {
        assert!(capacity >= 1, "Spatial arena needs at least a root slot");
        Self {
            nodes: vec![SpatialNode::Leaf; capacity as usize],
            flux: vec![0; capacity as usize],
            next: 1,
        }
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// The number of slots handed out so far, root included.
    #[inline]
    pub fn allocated(&self) -> u32 {
        self.next
    }

    /// Reserves a contiguous pair of child slots. Returns `None` when the
    /// arena is exhausted; the caller is expected to skip the split.
    pub fn allocate(&mut self) -> Option<SpatialHandle> {
        if self.next + SPATIAL_CHILDREN > self.capacity() {
            return None;
        }
        let handle = SpatialHandle(self.next);
        self.next += SPATIAL_CHILDREN;
        Some(handle)
    }

    /// The handle of allocated slot `index`.
    #[inline]
    pub fn handle(&self, index: u32) -> SpatialHandle {
        debug_assert!(index < self.next);
        SpatialHandle(index)
    }

    #[inline]
    pub fn node(&self, handle: SpatialHandle) -> SpatialNode {
        self.nodes[handle.index()]
    }

    pub fn make_interior(&mut self, handle: SpatialHandle, first_child: SpatialHandle) {
        debug_assert_eq!(self.nodes[handle.index()], SpatialNode::Leaf);
        debug_assert!(first_child.0 + SPATIAL_CHILDREN <= self.next);
        self.nodes[handle.index()] = SpatialNode::Interior { first_child };
    }

    #[inline]
    pub fn flux(&self, handle: SpatialHandle) -> u32 {
        self.flux[handle.index()]
    }

    #[inline]
    pub fn add_flux(&mut self, handle: SpatialHandle, amount: u32) {
        self.flux[handle.index()] += amount;
    }

    #[inline]
    pub fn set_flux(&mut self, handle: SpatialHandle, flux: u32) {
        self.flux[handle.index()] = flux;
    }

    /// Clears all flux counters, keeping topology.
    pub fn zero_flux(&mut self) {
        self.flux.fill(0);
    }

    /// Back to a freshly constructed arena, capacity unchanged.
    pub fn reset(&mut self) {
        self.nodes.fill(SpatialNode::Leaf);
        self.flux.fill(0);
        self.next = 1;
    }

    pub(super) fn raw_nodes(&self) -> &[SpatialNode] {
        &self.nodes
    }

    pub(super) fn raw_flux(&self) -> &[u32] {
        &self.flux
    }
}

/// Bump-allocated storage for directional nodes, partitioned into private
/// fixed-size segments, one per possible spatial node.
pub struct DirArena {
    nodes: Vec<DirNode>,
    flux: Vec<f32>,
    // Slots handed out per segment, segment root included
    next: Vec<u32>,
}

impl DirArena {
    pub fn new(segments: u32) -> Self {
        let slots = segments as usize * DIR_SEGMENT_SLOTS as usize;
        Self {
            nodes: vec![DirNode::Leaf; slots],
            flux: vec![0.0; slots],
            next: vec![1; segments as usize],
        }
    }

    #[inline]
    pub fn segments(&self) -> u32 {
        self.next.len() as u32
    }

    /// The number of slots handed out in `segment`, root included.
    #[inline]
    pub fn allocated(&self, segment: u32) -> u32 {
        self.next[segment as usize]
    }

    /// Reserves a contiguous quartet of child slots in `segment`. Returns
    /// `None` when the segment is exhausted; the caller is expected to skip
    /// the split.
    pub fn allocate(&mut self, segment: u32) -> Option<DirHandle> {
        let next = &mut self.next[segment as usize];
        if *next + DIR_CHILDREN > DIR_SEGMENT_SLOTS {
            return None;
        }
        let handle = DirHandle {
            segment,
            offset: *next,
        };
        *next += DIR_CHILDREN;
        Some(handle)
    }

    #[inline]
    pub fn node(&self, handle: DirHandle) -> DirNode {
        self.nodes[handle.slot()]
    }

    pub fn make_interior(&mut self, handle: DirHandle, first_child: DirHandle) {
        debug_assert_eq!(handle.segment, first_child.segment);
        debug_assert_eq!(self.nodes[handle.slot()], DirNode::Leaf);
        debug_assert!(first_child.offset + DIR_CHILDREN <= self.next[handle.segment as usize]);
        self.nodes[handle.slot()] = DirNode::Interior {
            first_child: first_child.offset,
        };
    }

    #[inline]
    pub fn flux(&self, handle: DirHandle) -> f32 {
        self.flux[handle.slot()]
    }

    #[inline]
    pub fn add_flux(&mut self, handle: DirHandle, amount: f32) {
        self.flux[handle.slot()] += amount;
    }

    /// Clears all flux accumulators, keeping topology.
    pub fn zero_flux(&mut self) {
        self.flux.fill(0.0);
    }

    /// Duplicates segment `src` into segment `dst`, topology and flux both.
    ///
    /// Child links are segment-relative so they stay valid as-is under the
    /// destination segment.
    pub fn copy_segment(&mut self, src: u32, dst: u32) {
        debug_assert_ne!(src, dst);
        let count = self.next[src as usize] as usize;
        let src_base = DirHandle::root_of(src).slot();
        let dst_base = DirHandle::root_of(dst).slot();
        self.nodes.copy_within(src_base..src_base + count, dst_base);
        self.flux.copy_within(src_base..src_base + count, dst_base);
        self.next[dst as usize] = count as u32;
    }

    /// Back to a freshly constructed arena, capacity unchanged.
    pub fn reset(&mut self) {
        self.nodes.fill(DirNode::Leaf);
        self.flux.fill(0.0);
        self.next.fill(1);
    }

    pub(super) fn raw_nodes(&self) -> &[DirNode] {
        &self.nodes
    }

    pub(super) fn raw_flux(&self) -> &[f32] {
        &self.flux
    }
}
