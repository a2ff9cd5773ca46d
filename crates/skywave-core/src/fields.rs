//! Field and material storage.
//!
//! A [`FieldStore`] owns nine `n^3` scalar blocks: the six electromagnetic
//! field components, the relative permittivity and permeability, and the
//! per-cell source current. Blocks are exposed to consumers (the volume
//! renderer, probes) as flat slices in the index order
//! `idx = x + n * (y + n * z)`.
//!
//! Write access is partitioned: the stepper is the sole writer of E and H,
//! the geometry voxeliser writes permittivity, and the source manager writes
//! the current block through [`FieldStore::add_emission`].

use ndarray::Array3;

use crate::grid::GridDescriptor;

/// One scalar per cell for each simulated quantity.
///
/// Arrays are stored with axes ordered `[z, y, x]` so that the flat memory
/// layout matches the `x + n * (y + n * z)` contract.
pub struct FieldStore {
    n: usize,
    ex: Array3<f32>,
    ey: Array3<f32>,
    ez: Array3<f32>,
    hx: Array3<f32>,
    hy: Array3<f32>,
    hz: Array3<f32>,
    epsilon: Array3<f32>,
    mu: Array3<f32>,
    emission: Array3<f32>,
}

fn flat(array: &Array3<f32>) -> &[f32] {
    array
        .as_slice()
        .expect("field arrays are allocated in standard layout")
}

fn flat_mut(array: &mut Array3<f32>) -> &mut [f32] {
    array
        .as_slice_mut()
        .expect("field arrays are allocated in standard layout")
}

impl FieldStore {
    /// Allocate storage for an `n^3` grid. Fields and currents start at
    /// zero; both material arrays start at 1.0 (vacuum).
    pub fn new(n: usize) -> Self {
        let dim = (n, n, n);
        Self {
            n,
            ex: Array3::zeros(dim),
            ey: Array3::zeros(dim),
            ez: Array3::zeros(dim),
            hx: Array3::zeros(dim),
            hy: Array3::zeros(dim),
            hz: Array3::zeros(dim),
            epsilon: Array3::from_elem(dim, 1.0),
            mu: Array3::from_elem(dim, 1.0),
            emission: Array3::zeros(dim),
        }
    }

    /// Cells per axis.
    pub fn resolution(&self) -> usize {
        self.n
    }

    /// Total cell count.
    pub fn cell_count(&self) -> usize {
        self.n * self.n * self.n
    }

    /// Flat index of cell `(x, y, z)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.n * (y + self.n * z)
    }

    /// Zero all field components and the current block. Material arrays are
    /// left untouched.
    pub fn reset(&mut self) {
        for array in [
            &mut self.ex,
            &mut self.ey,
            &mut self.ez,
            &mut self.hx,
            &mut self.hy,
            &mut self.hz,
            &mut self.emission,
        ] {
            array.fill(0.0);
        }
    }

    /// Write a source current into cell `(x, y, z)`. Out-of-bounds
    /// coordinates are silently ignored.
    pub fn add_emission(&mut self, x: usize, y: usize, z: usize, value: f32) {
        if x < self.n && y < self.n && z < self.n {
            self.emission[[z, y, x]] = value;
        }
    }

    /// Zero the current block.
    pub fn clear_emission(&mut self) {
        self.emission.fill(0.0);
    }

    /// Electric field components, flat, in `x + n(y + nz)` order.
    pub fn ex(&self) -> &[f32] {
        flat(&self.ex)
    }
    pub fn ey(&self) -> &[f32] {
        flat(&self.ey)
    }
    pub fn ez(&self) -> &[f32] {
        flat(&self.ez)
    }

    /// Magnetic field components.
    pub fn hx(&self) -> &[f32] {
        flat(&self.hx)
    }
    pub fn hy(&self) -> &[f32] {
        flat(&self.hy)
    }
    pub fn hz(&self) -> &[f32] {
        flat(&self.hz)
    }

    /// Relative permittivity.
    pub fn epsilon(&self) -> &[f32] {
        flat(&self.epsilon)
    }

    /// Relative permeability.
    pub fn mu(&self) -> &[f32] {
        flat(&self.mu)
    }

    /// Source current.
    pub fn emission(&self) -> &[f32] {
        flat(&self.emission)
    }

    /// Mutable permittivity, for the geometry voxeliser.
    pub fn epsilon_mut(&mut self) -> &mut [f32] {
        flat_mut(&mut self.epsilon)
    }

    pub(crate) fn ex_mut(&mut self) -> &mut [f32] {
        flat_mut(&mut self.ex)
    }
    pub(crate) fn ey_mut(&mut self) -> &mut [f32] {
        flat_mut(&mut self.ey)
    }
    pub(crate) fn ez_mut(&mut self) -> &mut [f32] {
        flat_mut(&mut self.ez)
    }
    pub(crate) fn hx_mut(&mut self) -> &mut [f32] {
        flat_mut(&mut self.hx)
    }
    pub(crate) fn hy_mut(&mut self) -> &mut [f32] {
        flat_mut(&mut self.hy)
    }
    pub(crate) fn hz_mut(&mut self) -> &mut [f32] {
        flat_mut(&mut self.hz)
    }

    /// Total electromagnetic energy over the volume (J).
    ///
    /// Energy density `u = (eps |E|^2 + mu |H|^2) / 2` integrated over the
    /// world-space cell volume of `grid`.
    pub fn total_energy(&self, grid: &GridDescriptor) -> f64 {
        let cell = grid.cell_size();
        let dv = cell[0] as f64 * cell[1] as f64 * cell[2] as f64;

        let (ex, ey, ez) = (self.ex(), self.ey(), self.ez());
        let (hx, hy, hz) = (self.hx(), self.hy(), self.hz());
        let eps = self.epsilon();

        let mut energy = 0.0f64;
        for i in 0..self.cell_count() {
            let e_sq = (ex[i] * ex[i] + ey[i] * ey[i] + ez[i] * ez[i]) as f64;
            let h_sq = (hx[i] * hx[i] + hy[i] * hy[i] + hz[i] * hz[i]) as f64;
            energy += 0.5
                * ((crate::grid::EPSILON_0 * eps[i]) as f64 * e_sq
                    + crate::grid::MU_0 as f64 * h_sq)
                * dv;
        }
        energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let fields = FieldStore::new(8);
        assert!(fields.ex().iter().all(|&v| v == 0.0));
        assert!(fields.hz().iter().all(|&v| v == 0.0));
        assert!(fields.emission().iter().all(|&v| v == 0.0));
        assert!(fields.epsilon().iter().all(|&v| v == 1.0));
        assert!(fields.mu().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_reset_preserves_materials() {
        let mut fields = FieldStore::new(8);
        fields.ex_mut()[3] = 1.5;
        fields.hy_mut()[7] = -2.0;
        fields.add_emission(1, 1, 1, 0.7);
        fields.epsilon_mut()[10] = 50.0;

        fields.reset();

        assert!(fields.ex().iter().all(|&v| v == 0.0));
        assert!(fields.hy().iter().all(|&v| v == 0.0));
        assert!(fields.emission().iter().all(|&v| v == 0.0));
        assert_eq!(fields.epsilon()[10], 50.0);
    }

    #[test]
    fn test_emission_index_order() {
        let mut fields = FieldStore::new(4);
        fields.add_emission(1, 2, 3, 0.5);
        let idx = fields.index(1, 2, 3);
        assert_eq!(idx, 1 + 4 * (2 + 4 * 3));
        assert_eq!(fields.emission()[idx], 0.5);
    }

    #[test]
    fn test_emission_out_of_bounds_ignored() {
        let mut fields = FieldStore::new(4);
        fields.add_emission(4, 0, 0, 1.0);
        fields.add_emission(0, 7, 0, 1.0);
        assert!(fields.emission().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_clear_emission() {
        let mut fields = FieldStore::new(4);
        fields.add_emission(2, 2, 2, 3.0);
        fields.clear_emission();
        assert!(fields.emission().iter().all(|&v| v == 0.0));
    }
}
