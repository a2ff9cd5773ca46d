//! Compute backend trait and device abstraction.
//!
//! The [`ComputeBackend`] trait abstracts over different execution
//! environments (CPU thread pool, GPU compute queue) so that the field-update
//! code in `skywave-core` remains device-agnostic.

use thiserror::Error;

/// Errors originating from compute backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Device error: {0}")]
    DeviceError(String),
}

/// Describes the capabilities of a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub memory_bytes: Option<usize>,
    pub compute_units: Option<usize>,
}

/// The type of compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Cpu,
    Gpu,
}

/// Abstraction over compute backends.
///
/// The field-update code operates against this trait. Implementations
/// provide device-specific execution for the hot-path operation: evaluating
/// a per-cell kernel across a flat scalar block.
///
/// `fill_cells` is a synchronisation point: when it returns, every element
/// of `out` holds the kernel result for its index. Kernels may read shared
/// input arrays freely but must not depend on any other output cell, which
/// is exactly the contract the FDTD leapfrog stencil satisfies.
pub trait ComputeBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Evaluate `kernel(i)` for every index of `out` and store the results.
    fn fill_cells(&self, out: &mut [f32], kernel: &(dyn Fn(usize) -> f32 + Send + Sync));
}
