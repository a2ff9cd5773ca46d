//! GPU compute backend.
//!
//! **Status: Stub for future implementation.**
//!
//! The reference design dispatches the E- and H-update kernels as 8x8x8
//! workgroups over the field volume, with the material arrays bound as
//! read-only storage. A wgpu port keeps the same shape:
//!
//! - One compute pipeline per update pass, ping-ponging field buffers.
//! - `fill_cells` maps to a dispatch plus a buffer read-back barrier, so the
//!   synchronous contract of [`ComputeBackend`](crate::backend::ComputeBackend)
//!   is preserved.
//! - Device loss surfaces as `ComputeError::DeviceError` at construction.

// This module is intentionally left as a stub.
// Gated behind the `gpu` feature flag.
