//! CPU compute backend using Rayon for shared-memory parallelism.

use rayon::prelude::*;

use crate::backend::{BackendType, ComputeBackend, ComputeError, DeviceInfo};

/// CPU backend that parallelises the per-cell kernel across threads via Rayon.
pub struct CpuBackend {
    num_threads: usize,
}

impl CpuBackend {
    /// Create a new CPU backend using all available threads.
    pub fn new() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
        }
    }

    /// Create a CPU backend with a specified thread count.
    pub fn with_threads(num_threads: usize) -> Self {
        Self { num_threads }
    }

    /// Probe availability. The CPU backend always exists; this mirrors the
    /// fallible construction of device-backed implementations.
    pub fn try_new() -> Result<Self, ComputeError> {
        Ok(Self::new())
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("CPU ({} threads)", self.num_threads),
            backend_type: BackendType::Cpu,
            memory_bytes: None,
            compute_units: Some(self.num_threads),
        }
    }

    fn fill_cells(&self, out: &mut [f32], kernel: &(dyn Fn(usize) -> f32 + Send + Sync)) {
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, cell)| *cell = kernel(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_cells_applies_kernel() {
        let backend = CpuBackend::new();
        let mut out = vec![0.0f32; 1000];
        backend.fill_cells(&mut out, &|i| i as f32 * 2.0);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[499], 998.0);
        assert_eq!(out[999], 1998.0);
    }

    #[test]
    fn test_device_info_reports_cpu() {
        let backend = CpuBackend::with_threads(4);
        let info = backend.device_info();
        assert_eq!(info.backend_type, BackendType::Cpu);
        assert_eq!(info.compute_units, Some(4));
    }
}
