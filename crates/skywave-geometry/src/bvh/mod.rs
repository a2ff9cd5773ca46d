//! Bounding volume hierarchy over the scene triangles.
//!
//! The tree is a median-split binary BVH: at each level the triangle range
//! is sorted by centroid along the longest axis of the node bounds and cut
//! at the median. No surface-area heuristic is evaluated; for a picker and
//! a coarse propagation tracer the deterministic median split is enough,
//! and the depth cap bounds the worst case.
//!
//! Nodes live in a flat pool ([`Bvh::nodes`]) with `u32` child links,
//! allocated in pre-order with the root at index 0. The pool form drops
//! without recursion and serialises trivially (see [`cache`]).

pub mod cache;
mod query;

use crate::bounds::Aabb;
use crate::mesh::Triangle;

/// Leaf capacity: ranges at or below this size stop splitting.
pub const LEAF_SIZE: usize = 50;

/// Maximum tree depth; splitting stops here even for oversized ranges.
pub const MAX_DEPTH: usize = 15;

/// One node of the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct BvhNode {
    pub bounds: Aabb,
    pub content: NodeContent,
}

/// Leaf payload or child links into the node pool.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Leaf(Vec<u32>),
    Split { left: u32, right: u32 },
}

/// A BVH owning its triangle array and node pool.
pub struct Bvh {
    triangles: Vec<Triangle>,
    nodes: Vec<BvhNode>,
    scene_bounds: Aabb,
}

impl Bvh {
    /// Build the hierarchy over `triangles`. An empty input produces an
    /// empty tree that misses every ray.
    pub fn build(triangles: Vec<Triangle>) -> Self {
        log::info!("building BVH over {} triangles", triangles.len());

        let mut scene_bounds = Aabb::empty();
        for tri in &triangles {
            scene_bounds.expand_box(&tri.bounds());
        }

        let mut nodes = Vec::new();
        if !triangles.is_empty() {
            let mut indices: Vec<u32> = (0..triangles.len() as u32).collect();
            build_node(&triangles, &mut nodes, &mut indices, 0);
        }

        log::info!("BVH built: {} nodes", nodes.len());
        Self {
            triangles,
            nodes,
            scene_bounds,
        }
    }

    /// Assemble a BVH from already-validated parts (cache loading).
    pub(crate) fn from_parts(
        triangles: Vec<Triangle>,
        nodes: Vec<BvhNode>,
        scene_bounds: Aabb,
    ) -> Self {
        Self {
            triangles,
            nodes,
            scene_bounds,
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Bounds of the whole scene.
    pub fn scene_bounds(&self) -> Aabb {
        self.scene_bounds
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Log a one-line summary of the indexed scene.
    pub fn log_stats(&self) {
        let size = [
            self.scene_bounds.max[0] - self.scene_bounds.min[0],
            self.scene_bounds.max[1] - self.scene_bounds.min[1],
            self.scene_bounds.max[2] - self.scene_bounds.min[2],
        ];
        log::info!(
            "spatial index: {} triangles, {:.0}x{:.0}x{:.0} m",
            self.triangles.len(),
            size[0],
            size[1],
            size[2]
        );
    }
}

/// Recursively build the subtree for `indices`, returning its pool slot.
///
/// The slot is reserved before the children so the pool ends up in
/// pre-order with parents before their subtrees.
fn build_node(
    triangles: &[Triangle],
    nodes: &mut Vec<BvhNode>,
    indices: &mut [u32],
    depth: usize,
) -> u32 {
    let mut bounds = Aabb::empty();
    for &idx in indices.iter() {
        bounds.expand_box(&triangles[idx as usize].bounds());
    }

    let slot = nodes.len() as u32;
    nodes.push(BvhNode {
        bounds,
        content: NodeContent::Leaf(Vec::new()),
    });

    if indices.len() <= LEAF_SIZE || depth >= MAX_DEPTH {
        nodes[slot as usize].content = NodeContent::Leaf(indices.to_vec());
        return slot;
    }

    let axis = bounds.longest_axis();
    indices.sort_unstable_by(|&a, &b| {
        let ca = triangles[a as usize].centroid()[axis];
        let cb = triangles[b as usize].centroid()[axis];
        ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mid = indices.len() / 2;
    let (left_ids, right_ids) = indices.split_at_mut(mid);
    let left = build_node(triangles, nodes, left_ids, depth + 1);
    let right = build_node(triangles, nodes, right_ids, depth + 1);

    nodes[slot as usize].content = NodeContent::Split { left, right };
    slot
}
