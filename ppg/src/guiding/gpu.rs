use bytemuck::{Pod, Zeroable};

use super::arena::{DirArena, DirHandle, DirNode, SpatialArena, SpatialNode, DIR_SEGMENT_SLOTS};

/// Child slot value marking a leaf in the serialized arrays.
pub const INVALID_NODE: i32 = -1;

/// Serialized spatial node, 16 bytes as the sampler shader expects.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct GpuSpatialNode {
    /// Flat arena indices, or [`INVALID_NODE`] for a leaf.
    pub children: [i32; 2],
    pub _pad: [i32; 2],
}

/// Serialized directional node, children in the packed
/// segment-in-high-bits encoding, or [`INVALID_NODE`] for a leaf.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct GpuDirNode {
    pub children: [i32; 4],
}

/// The four flat arrays the renderer uploads into GPU-visible buffers.
///
/// Arrays span full arena capacity so buffer sizes stay fixed across
/// iterations; unallocated slots serialize as leaves with zero flux.
pub struct GpuLayout {
    pub spatial_nodes: Vec<GpuSpatialNode>,
    pub spatial_flux: Vec<u32>,
    pub directional_nodes: Vec<GpuDirNode>,
    pub directional_flux: Vec<f32>,
}

impl GpuLayout {
    pub fn spatial_node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.spatial_nodes)
    }

    pub fn spatial_flux_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.spatial_flux)
    }

    pub fn directional_node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.directional_nodes)
    }

    pub fn directional_flux_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.directional_flux)
    }
}

pub(super) fn serialize(spatial: &SpatialArena, dirs: &DirArena) -> GpuLayout {
    let spatial_nodes = spatial
        .raw_nodes()
        .iter()
        .map(|node| match node {
            SpatialNode::Leaf => GpuSpatialNode {
                children: [INVALID_NODE; 2],
                _pad: [0; 2],
            },
            SpatialNode::Interior { first_child } => GpuSpatialNode {
                children: [first_child.index() as i32, first_child.sibling(1).index() as i32],
                _pad: [0; 2],
            },
        })
        .collect();

    let directional_nodes = dirs
        .raw_nodes()
        .iter()
        .enumerate()
        .map(|(slot, node)| match node {
            DirNode::Leaf => GpuDirNode {
                children: [INVALID_NODE; 4],
            },
            DirNode::Interior { first_child } => {
                let segment = (slot / DIR_SEGMENT_SLOTS as usize) as u32;
                let mut children = [INVALID_NODE; 4];
                for (i, child) in children.iter_mut().enumerate() {
                    *child = DirHandle {
                        segment,
                        offset: first_child + i as u32,
                    }
                    .packed() as i32;
                }
                GpuDirNode { children }
            }
        })
        .collect();

    GpuLayout {
        spatial_nodes,
        spatial_flux: spatial.raw_flux().to_vec(),
        directional_nodes,
        directional_flux: dirs.raw_flux().to_vec(),
    }
}
