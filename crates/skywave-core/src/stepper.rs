//! The FDTD leapfrog update.
//!
//! One [`FdtdStepper::update`] call advances the simulation by a single
//! tick: the E-field update consumes the current H-field and the injected
//! source currents, then the H-field update consumes the freshly written
//! E-field. Every component is damped by a uniform factor each tick, which
//! acts as a crude absorbing boundary and bounds long-term energy.
//!
//! All six components are sampled at the same `(x, y, z)` cell centre
//! rather than at the half-cell offsets of a textbook Yee lattice. This
//! co-located scheme has different numerical dispersion but matches the
//! renderer the solver feeds, so it is kept deliberately.
//!
//! The update body is data-parallel per cell: each output depends only on
//! its own cell and first-order neighbours of the input arrays, so it is
//! dispatched through a [`ComputeBackend`] and presents a synchronous
//! interface to the driver. `update` never fails; if the fields diverge,
//! NaN propagates into the visualisation rather than surfacing as an error.

use std::sync::Arc;

use skywave_compute::ComputeBackend;

use crate::fields::FieldStore;
use crate::grid::{GridDescriptor, EPSILON_0, MU_0};

/// Per-tick damping applied to every field component.
pub const DAMPING: f32 = 0.999;

/// Advances a [`FieldStore`] through the leapfrog curl equations.
pub struct FdtdStepper {
    backend: Arc<dyn ComputeBackend>,
    scratch: Vec<f32>,
}

impl FdtdStepper {
    pub fn new(backend: Arc<dyn ComputeBackend>) -> Self {
        Self {
            backend,
            scratch: Vec::new(),
        }
    }

    /// The backend this stepper dispatches to.
    pub fn backend(&self) -> &Arc<dyn ComputeBackend> {
        &self.backend
    }

    /// Advance the fields by one tick.
    ///
    /// Ordering within the tick: source-current reads happen before any E
    /// write, and every E write happens before the first H read. Cells on
    /// the low boundary (E) and high boundary (H) retain their previous
    /// value, then damping is applied everywhere.
    pub fn update(&mut self, fields: &mut FieldStore, grid: &GridDescriptor) {
        let n = fields.resolution();
        let plane = n * n;
        self.scratch.resize(fields.cell_count(), 0.0);

        let dt = grid.time_step();
        let inv_dx = 1.0 / grid.spacing;
        // dt / eps0, divided per cell by the relative permittivity.
        let e_coef = dt / EPSILON_0;
        let j_coef = dt / EPSILON_0;
        let h_coef = dt / MU_0;

        // E pass. Each component reads only itself and H neighbours, so the
        // components can be committed one at a time.
        {
            let (ex, hy, hz, eps) = (fields.ex(), fields.hy(), fields.hz(), fields.epsilon());
            self.backend.fill_cells(&mut self.scratch, &|i| {
                let (x, y, z) = (i % n, (i / n) % n, i / plane);
                let mut value = ex[i];
                if x >= 1 && y >= 1 && z >= 1 {
                    let curl = (hz[i] - hz[i - n]) * inv_dx - (hy[i] - hy[i - plane]) * inv_dx;
                    value += e_coef / eps[i] * curl;
                }
                value * DAMPING
            });
        }
        fields.ex_mut().copy_from_slice(&self.scratch);

        {
            let (ey, hx, hz, eps) = (fields.ey(), fields.hx(), fields.hz(), fields.epsilon());
            self.backend.fill_cells(&mut self.scratch, &|i| {
                let (x, y, z) = (i % n, (i / n) % n, i / plane);
                let mut value = ey[i];
                if x >= 1 && y >= 1 && z >= 1 {
                    let curl = (hx[i] - hx[i - plane]) * inv_dx - (hz[i] - hz[i - 1]) * inv_dx;
                    value += e_coef / eps[i] * curl;
                }
                value * DAMPING
            });
        }
        fields.ey_mut().copy_from_slice(&self.scratch);

        {
            let (ez, hx, hy, eps, emission) = (
                fields.ez(),
                fields.hx(),
                fields.hy(),
                fields.epsilon(),
                fields.emission(),
            );
            self.backend.fill_cells(&mut self.scratch, &|i| {
                let (x, y, z) = (i % n, (i / n) % n, i / plane);
                let mut value = ez[i];
                if x >= 1 && y >= 1 && z >= 1 {
                    let curl = (hy[i] - hy[i - 1]) * inv_dx - (hx[i] - hx[i - n]) * inv_dx;
                    // Source currents drive the vertical E component only.
                    value += e_coef / eps[i] * curl + emission[i] * j_coef;
                }
                value * DAMPING
            });
        }
        fields.ez_mut().copy_from_slice(&self.scratch);

        // H pass, reading the E fields written above.
        {
            let (hx, ey, ez) = (fields.hx(), fields.ey(), fields.ez());
            self.backend.fill_cells(&mut self.scratch, &|i| {
                let (x, y, z) = (i % n, (i / n) % n, i / plane);
                let mut value = hx[i];
                if x + 1 < n && y + 1 < n && z + 1 < n {
                    let curl = (ey[i + plane] - ey[i]) * inv_dx - (ez[i + n] - ez[i]) * inv_dx;
                    value += h_coef * curl;
                }
                value * DAMPING
            });
        }
        fields.hx_mut().copy_from_slice(&self.scratch);

        {
            let (hy, ex, ez) = (fields.hy(), fields.ex(), fields.ez());
            self.backend.fill_cells(&mut self.scratch, &|i| {
                let (x, y, z) = (i % n, (i / n) % n, i / plane);
                let mut value = hy[i];
                if x + 1 < n && y + 1 < n && z + 1 < n {
                    let curl = (ez[i + 1] - ez[i]) * inv_dx - (ex[i + plane] - ex[i]) * inv_dx;
                    value += h_coef * curl;
                }
                value * DAMPING
            });
        }
        fields.hy_mut().copy_from_slice(&self.scratch);

        {
            let (hz, ex, ey) = (fields.hz(), fields.ex(), fields.ey());
            self.backend.fill_cells(&mut self.scratch, &|i| {
                let (x, y, z) = (i % n, (i / n) % n, i / plane);
                let mut value = hz[i];
                if x + 1 < n && y + 1 < n && z + 1 < n {
                    let curl = (ex[i + n] - ex[i]) * inv_dx - (ey[i + 1] - ey[i]) * inv_dx;
                    value += h_coef * curl;
                }
                value * DAMPING
            });
        }
        fields.hz_mut().copy_from_slice(&self.scratch);
    }
}
