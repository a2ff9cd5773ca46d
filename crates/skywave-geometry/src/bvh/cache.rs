//! Binary cache for built hierarchies.
//!
//! City meshes take long enough to index that the tree is persisted next to
//! the source mesh (same basename, `.bvh` extension) and reloaded on start.
//! The format is little-endian and tightly packed:
//!
//! ```text
//! magic[4] = "BVH1"
//! triangle_count : u64
//! triangles      : v0 v1 v2 normal (12 x f32) + id (u32)   -- 52 bytes each
//! scene_bounds   : min, max (6 x f32)
//! nodes          : pre-order; per node:
//!     is_null : u8
//!     bounds  : 6 x f32
//!     is_leaf : u8
//!     leaf  -> index_count : u64, indices : [u32]
//!     split -> left subtree, right subtree
//! ```
//!
//! A file whose magic does not match is rejected outright; there is no
//! version migration. Callers treat any load failure as a cache miss and
//! rebuild from triangles.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::bounds::Aabb;
use crate::bvh::{Bvh, BvhNode, NodeContent};
use crate::mesh::Triangle;

/// File magic for the current cache layout.
pub const MAGIC: [u8; 4] = *b"BVH1";

/// Errors reading or writing the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a BVH cache file (bad magic)")]
    InvalidMagic,

    #[error("corrupt BVH cache: {0}")]
    Corrupt(String),
}

impl Bvh {
    /// Write this hierarchy to `path`.
    pub fn save_cache(&self, path: &Path) -> Result<(), CacheError> {
        let mut out = BufWriter::new(File::create(path)?);

        out.write_all(&MAGIC)?;
        write_u64(&mut out, self.triangles().len() as u64)?;
        for tri in self.triangles() {
            write_vec3(&mut out, tri.v0)?;
            write_vec3(&mut out, tri.v1)?;
            write_vec3(&mut out, tri.v2)?;
            write_vec3(&mut out, tri.normal)?;
            out.write_all(&tri.id.to_le_bytes())?;
        }

        write_vec3(&mut out, self.scene_bounds().min)?;
        write_vec3(&mut out, self.scene_bounds().max)?;

        if self.is_empty() {
            out.write_all(&[1u8])?;
        } else {
            write_node(&mut out, self.nodes(), 0)?;
        }

        out.flush()?;
        log::info!("BVH cache saved to {}", path.display());
        Ok(())
    }

    /// Load a hierarchy from `path`.
    pub fn load_cache(path: &Path) -> Result<Bvh, CacheError> {
        let mut input = BufReader::new(File::open(path)?);

        let mut magic = [0u8; 4];
        input.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(CacheError::InvalidMagic);
        }

        let triangle_count = read_u64(&mut input)? as usize;
        let mut triangles = Vec::with_capacity(triangle_count.min(1 << 24));
        for _ in 0..triangle_count {
            let v0 = read_vec3(&mut input)?;
            let v1 = read_vec3(&mut input)?;
            let v2 = read_vec3(&mut input)?;
            let normal = read_vec3(&mut input)?;
            let id = read_u32(&mut input)?;
            triangles.push(Triangle {
                v0,
                v1,
                v2,
                normal,
                id,
            });
        }

        let scene_bounds = Aabb::new(read_vec3(&mut input)?, read_vec3(&mut input)?);

        let mut nodes = Vec::new();
        read_node(&mut input, &mut nodes, triangle_count)?;

        log::info!(
            "BVH cache loaded from {} ({} triangles)",
            path.display(),
            triangle_count
        );
        Ok(Bvh::from_parts(triangles, nodes, scene_bounds))
    }
}

/// Load the cache at `path`, or build from `triangles` and save on a miss.
///
/// A corrupt or missing cache is not an error: the tree is rebuilt and the
/// cache rewritten. Only the rebuild-save failure is logged, since the
/// in-memory tree is still usable.
pub fn load_or_build(path: &Path, triangles: impl FnOnce() -> Vec<Triangle>) -> Bvh {
    match Bvh::load_cache(path) {
        Ok(bvh) => bvh,
        Err(err) => {
            log::info!(
                "BVH cache unavailable ({}), building from triangles",
                err
            );
            let bvh = Bvh::build(triangles());
            if let Err(err) = bvh.save_cache(path) {
                log::warn!("failed to save BVH cache to {}: {}", path.display(), err);
            }
            bvh
        }
    }
}

/// Serialise the subtree at `index` in pre-order.
fn write_node(out: &mut impl Write, nodes: &[BvhNode], index: u32) -> Result<(), CacheError> {
    out.write_all(&[0u8])?;

    let node = &nodes[index as usize];
    write_vec3(out, node.bounds.min)?;
    write_vec3(out, node.bounds.max)?;

    match &node.content {
        NodeContent::Leaf(ids) => {
            out.write_all(&[1u8])?;
            write_u64(out, ids.len() as u64)?;
            for &id in ids {
                out.write_all(&id.to_le_bytes())?;
            }
        }
        NodeContent::Split { left, right } => {
            out.write_all(&[0u8])?;
            write_node(out, nodes, *left)?;
            write_node(out, nodes, *right)?;
        }
    }
    Ok(())
}

/// Deserialise a subtree, appending nodes in pre-order. Returns the slot of
/// the subtree root, or `None` for a null marker.
fn read_node(
    input: &mut impl Read,
    nodes: &mut Vec<BvhNode>,
    triangle_count: usize,
) -> Result<Option<u32>, CacheError> {
    let mut flag = [0u8; 1];
    input.read_exact(&mut flag)?;
    if flag[0] != 0 {
        return Ok(None);
    }

    let bounds = Aabb::new(read_vec3(input)?, read_vec3(input)?);

    let slot = nodes.len() as u32;
    nodes.push(BvhNode {
        bounds,
        content: NodeContent::Leaf(Vec::new()),
    });

    input.read_exact(&mut flag)?;
    match flag[0] {
        1 => {
            let count = read_u64(input)? as usize;
            if count > triangle_count {
                return Err(CacheError::Corrupt(format!(
                    "leaf claims {} indices but file has {} triangles",
                    count, triangle_count
                )));
            }
            let mut ids = Vec::with_capacity(count);
            for _ in 0..count {
                let id = read_u32(input)?;
                if id as usize >= triangle_count {
                    return Err(CacheError::Corrupt(format!(
                        "triangle index {} out of range",
                        id
                    )));
                }
                ids.push(id);
            }
            nodes[slot as usize].content = NodeContent::Leaf(ids);
        }
        0 => {
            let left = read_node(input, nodes, triangle_count)?
                .ok_or_else(|| CacheError::Corrupt("split node with null left child".into()))?;
            let right = read_node(input, nodes, triangle_count)?
                .ok_or_else(|| CacheError::Corrupt("split node with null right child".into()))?;
            nodes[slot as usize].content = NodeContent::Split { left, right };
        }
        other => {
            return Err(CacheError::Corrupt(format!(
                "invalid leaf flag {}",
                other
            )));
        }
    }

    Ok(Some(slot))
}

fn write_vec3(out: &mut impl Write, v: [f32; 3]) -> Result<(), CacheError> {
    for component in v {
        out.write_all(&component.to_le_bytes())?;
    }
    Ok(())
}

fn write_u64(out: &mut impl Write, value: u64) -> Result<(), CacheError> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_vec3(input: &mut impl Read) -> Result<[f32; 3], CacheError> {
    let mut buf = [0u8; 12];
    input.read_exact(&mut buf)?;
    Ok([
        f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
        f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
    ])
}

fn read_u32(input: &mut impl Read) -> Result<u32, CacheError> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(input: &mut impl Read) -> Result<u64, CacheError> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
