//! FDTD domain geometry.
//!
//! A [`GridDescriptor`] fixes the uniform cubic lattice the solver runs on:
//! integer cell count per axis, nominal voxel spacing, and the world-space
//! placement of the volume. The time step is derived from the spacing via
//! the Courant condition and is not independently configurable.

use serde::{Deserialize, Serialize};

/// Speed of light in vacuum (m/s).
pub const C0: f32 = 299_792_458.0;

/// Vacuum permittivity (F/m).
pub const EPSILON_0: f32 = 8.854_187_817e-12;

/// Vacuum permeability (H/m).
pub const MU_0: f32 = 1.256_637_061_4e-6;

/// Smallest supported cell count per axis.
pub const MIN_CELLS: usize = 32;

/// Largest supported cell count per axis.
pub const MAX_CELLS: usize = 128;

/// Immutable parameters of the FDTD domain.
///
/// The simulated volume is a cube of `n` cells per axis, centred at
/// `center` and spanning `2 * half_extent` in world units. `spacing` is the
/// nominal metres-per-voxel used to derive the cell count and the time step;
/// the actual world size of a cell is `2 * half_extent / n` per axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridDescriptor {
    /// Cells per axis, in `[MIN_CELLS, MAX_CELLS]`.
    pub n: usize,
    /// Nominal voxel spacing (m).
    pub spacing: f32,
    /// World-space centre of the volume (m).
    pub center: [f32; 3],
    /// World-space half-extent per axis (m).
    pub half_extent: [f32; 3],
}

impl GridDescriptor {
    /// Create a descriptor, clamping out-of-range parameters into the valid
    /// domain (no error is reported for a bad cell count or spacing).
    pub fn new(n: usize, spacing: f32, center: [f32; 3], half_extent: [f32; 3]) -> Self {
        Self {
            n: n.clamp(MIN_CELLS, MAX_CELLS),
            spacing: spacing.max(f32::EPSILON),
            center,
            half_extent,
        }
    }

    /// The cell count required to cover `half_extent` at `spacing` metres
    /// per voxel: `ceil(max(2H) / spacing)`, clamped to the supported range.
    pub fn required_cells(half_extent: [f32; 3], spacing: f32) -> usize {
        let span = 2.0 * half_extent[0].max(half_extent[1]).max(half_extent[2]);
        let cells = (span / spacing.max(f32::EPSILON)).ceil().max(0.0) as usize;
        cells.clamp(MIN_CELLS, MAX_CELLS)
    }

    /// Courant-stable time step (s): `spacing / (c0 * sqrt(3))`.
    ///
    /// Equality holds in the 3D stability bound, so any smaller step would
    /// also be valid; a larger one is forbidden.
    pub fn time_step(&self) -> f32 {
        self.spacing / (C0 * 3.0f32.sqrt())
    }

    /// Total number of cells (`n^3`).
    pub fn cell_count(&self) -> usize {
        self.n * self.n * self.n
    }

    /// World-space size of one cell per axis.
    pub fn cell_size(&self) -> [f32; 3] {
        let n = self.n as f32;
        [
            2.0 * self.half_extent[0] / n,
            2.0 * self.half_extent[1] / n,
            2.0 * self.half_extent[2] / n,
        ]
    }

    /// Map a world position to the voxel containing it.
    ///
    /// The mapping is monotone per axis and clamps to `[0, n)`, so positions
    /// outside the volume land on the boundary voxel (silent clamp policy).
    pub fn world_to_voxel(&self, position: [f32; 3]) -> [usize; 3] {
        let mut voxel = [0usize; 3];
        for axis in 0..3 {
            let half = self.half_extent[axis].max(f32::EPSILON);
            let local = (position[axis] - self.center[axis]) / half;
            let scaled = (local * 0.5 + 0.5) * self.n as f32;
            voxel[axis] = (scaled.floor().max(0.0) as usize).min(self.n - 1);
        }
        voxel
    }

    /// World position of a voxel centre.
    pub fn voxel_to_world(&self, voxel: [usize; 3]) -> [f32; 3] {
        let mut world = [0.0f32; 3];
        for axis in 0..3 {
            let frac = (voxel[axis] as f32 + 0.5) / self.n as f32 - 0.5;
            world[axis] = self.center[axis] + frac * 2.0 * self.half_extent[axis];
        }
        world
    }
}
