//! Per-frame simulation orchestration.
//!
//! A [`SimulationDriver`] borrows nothing from the host: it owns the grid
//! descriptor, the field store, the stepper, and the node catalogue, and
//! holds the scene BVH behind an `Arc` shared with pickers. One
//! [`advance`](SimulationDriver::advance) call is one frame:
//!
//! 1. Recentre the grid on the active transmitters (when enabled).
//! 2. Reinitialise the field store if the required cell count changed.
//! 3. Re-voxelise when the volume moved far enough from the last pass,
//!    resetting the fields first (stale waves would be incoherent with the
//!    new material grid).
//! 4. Run the configured number of FDTD sub-steps, injecting source
//!    currents before each one.
//!
//! While paused only step 4 is skipped, so the host can move nodes and
//! still see a coherent static field.

use std::sync::Arc;

use skywave_compute::ComputeBackend;
use skywave_core::{FdtdStepper, FieldStore, GridDescriptor};
use skywave_geometry::Bvh;

use crate::sources::SourceManager;
use crate::voxelize::{voxelize, VoxelizeSettings};

/// World-distance the volume must move before geometry is re-voxelised.
pub const RELOCATE_THRESHOLD: f32 = 20.0;

/// Upper bound on sub-steps per frame.
pub const MAX_SIMULATION_SPEED: u32 = 10;

/// Host-tunable driver knobs.
#[derive(Debug, Clone, Copy)]
pub struct DriverSettings {
    pub paused: bool,
    /// FDTD sub-steps per frame, clamped to `[1, MAX_SIMULATION_SPEED]`.
    pub simulation_speed: u32,
    /// Amplitude of injected source currents.
    pub emission_strength: f32,
    /// Recentre the grid on the active transmitters each frame.
    pub auto_center: bool,
    pub voxelize: VoxelizeSettings,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            paused: false,
            simulation_speed: 1,
            emission_strength: 0.5,
            auto_center: true,
            voxelize: VoxelizeSettings::default(),
        }
    }
}

/// Owns and advances the whole simulation session.
pub struct SimulationDriver {
    grid: GridDescriptor,
    fields: FieldStore,
    stepper: FdtdStepper,
    sources: SourceManager,
    bvh: Arc<Bvh>,
    pub settings: DriverSettings,
    /// Centre and half-extent at the time of the last voxelisation.
    last_voxelized: Option<([f32; 3], [f32; 3])>,
}

impl SimulationDriver {
    pub fn new(
        bvh: Arc<Bvh>,
        backend: Arc<dyn ComputeBackend>,
        spacing: f32,
        center: [f32; 3],
        half_extent: [f32; 3],
    ) -> Self {
        let n = GridDescriptor::required_cells(half_extent, spacing);
        let grid = GridDescriptor::new(n, spacing, center, half_extent);
        log::info!(
            "simulation driver: {} cells/axis, {:.2} m/voxel, dt {:.3e} s",
            grid.n,
            grid.spacing,
            grid.time_step()
        );
        Self {
            grid,
            fields: FieldStore::new(grid.n),
            stepper: FdtdStepper::new(backend),
            sources: SourceManager::new(),
            bvh,
            settings: DriverSettings::default(),
            last_voxelized: None,
        }
    }

    /// Advance one frame.
    pub fn advance(&mut self) {
        if self.settings.auto_center {
            if let Some((min, max)) = self.sources.transmitter_bounds() {
                self.grid.center = [
                    (min[0] + max[0]) * 0.5,
                    (min[1] + max[1]) * 0.5,
                    (min[2] + max[2]) * 0.5,
                ];
            }
        }

        let required = GridDescriptor::required_cells(self.grid.half_extent, self.grid.spacing);
        if required != self.grid.n {
            log::info!("grid resized: {} -> {} cells/axis", self.grid.n, required);
            self.grid = GridDescriptor::new(
                required,
                self.grid.spacing,
                self.grid.center,
                self.grid.half_extent,
            );
            self.fields = FieldStore::new(self.grid.n);
            self.last_voxelized = None;
        }

        let moved = match self.last_voxelized {
            None => true,
            Some((center, half_extent)) => {
                max_abs_diff(center, self.grid.center) > RELOCATE_THRESHOLD
                    || max_abs_diff(half_extent, self.grid.half_extent) > RELOCATE_THRESHOLD
            }
        };
        if moved {
            self.fields.reset();
            voxelize(
                &mut self.fields,
                &self.grid,
                self.bvh.triangles(),
                &self.settings.voxelize,
            );
            self.last_voxelized = Some((self.grid.center, self.grid.half_extent));
        }

        if !self.settings.paused {
            let steps = self.settings.simulation_speed.clamp(1, MAX_SIMULATION_SPEED);
            for _ in 0..steps {
                self.fields.clear_emission();
                self.sources.inject_currents(
                    &mut self.fields,
                    &self.grid,
                    self.settings.emission_strength,
                );
                self.stepper.update(&mut self.fields, &self.grid);
            }
        }
    }

    pub fn grid(&self) -> &GridDescriptor {
        &self.grid
    }

    /// Field arrays for the visualisation sink. Snapshot between frames;
    /// values change inside `advance`.
    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    pub fn sources(&self) -> &SourceManager {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut SourceManager {
        &mut self.sources
    }

    pub fn bvh(&self) -> &Arc<Bvh> {
        &self.bvh
    }

    pub fn set_center(&mut self, center: [f32; 3]) {
        self.grid.center = center;
    }

    pub fn set_half_extent(&mut self, half_extent: [f32; 3]) {
        self.grid.half_extent = half_extent;
    }
}

fn max_abs_diff(a: [f32; 3], b: [f32; 3]) -> f32 {
    (a[0] - b[0])
        .abs()
        .max((a[1] - b[1]).abs())
        .max((a[2] - b[2]).abs())
}
