//! # Skywave Geometry
//!
//! Scene geometry handling for the Skywave framework. This crate provides:
//!
//! - **Mesh intake** ([`mesh`]) — Builds the triangle soup from the host's
//!   `(positions, indices)` buffers, deriving face normals and stable ids.
//! - **Bounds and rays** ([`bounds`], [`ray`]) — Axis-aligned boxes with the
//!   slab intersection test, ray and hit records, ray-sphere picking.
//! - **BVH** ([`bvh`]) — A median-split bounding volume hierarchy over the
//!   triangles, with closest-hit/any-hit queries and a versioned binary
//!   cache so large city meshes index instantly on reload.
//! - **Vector helpers** ([`vec3`]) — Minimal `[f32; 3]` arithmetic shared by
//!   the modules above.

pub mod bounds;
pub mod bvh;
pub mod mesh;
pub mod ray;
pub mod vec3;

pub use bounds::Aabb;
pub use bvh::Bvh;
pub use mesh::{triangles_from_buffers, Triangle};
pub use ray::{Ray, RayHit};
