//! Geometry voxelisation.
//!
//! Stamps the scene's triangle soup into the solver's permittivity grid:
//! voxels below the ground plane or within half a voxel of a triangle get
//! the material permittivity, everything else stays vacuum. The FDTD
//! stencil then slows and scatters waves at the stamped cells.
//!
//! Triangles are pre-filtered to those whose bounds overlap the grid volume
//! padded by 50%, then each survivor sweeps only the voxel sub-box around
//! its own bounds. The pass rewrites the whole permittivity block, so for
//! fixed inputs it is idempotent.

use skywave_core::{FieldStore, GridDescriptor};
use skywave_geometry::{Aabb, Triangle};

/// Parameters of the voxelisation pass.
#[derive(Debug, Clone, Copy)]
pub struct VoxelizeSettings {
    /// Relative permittivity stamped into occupied voxels.
    pub material_permittivity: f32,
    /// World height below which everything counts as ground.
    pub ground_level: f32,
}

impl Default for VoxelizeSettings {
    fn default() -> Self {
        Self {
            material_permittivity: 50.0,
            ground_level: 0.0,
        }
    }
}

/// Fraction of the half-extent added around the grid when pre-filtering
/// triangles.
const FILTER_PADDING: f32 = 0.5;

/// Rewrite the permittivity block from the triangle soup.
///
/// Never fails; an empty triangle list leaves every voxel above ground at
/// vacuum.
pub fn voxelize(
    fields: &mut FieldStore,
    grid: &GridDescriptor,
    triangles: &[Triangle],
    settings: &VoxelizeSettings,
) {
    let n = fields.resolution();
    let cell = grid.cell_size();
    // Proximity threshold: half the largest cell dimension.
    let threshold = 0.5 * cell[0].max(cell[1]).max(cell[2]);
    let threshold_sq = threshold * threshold;

    let eps = fields.epsilon_mut();
    eps.fill(1.0);

    // Ground plane: whole xz slabs below the ground level.
    let mut ground_cells = 0usize;
    for y in 0..n {
        let world_y = grid.voxel_to_world([0, y, 0])[1];
        if world_y >= settings.ground_level {
            continue;
        }
        for z in 0..n {
            for x in 0..n {
                eps[x + n * (y + n * z)] = settings.material_permittivity;
            }
        }
        ground_cells += n * n;
    }

    // Pre-filter to the padded grid volume.
    let padded = {
        let pad = 1.0 + FILTER_PADDING;
        Aabb::new(
            [
                grid.center[0] - pad * grid.half_extent[0],
                grid.center[1] - pad * grid.half_extent[1],
                grid.center[2] - pad * grid.half_extent[2],
            ],
            [
                grid.center[0] + pad * grid.half_extent[0],
                grid.center[1] + pad * grid.half_extent[1],
                grid.center[2] + pad * grid.half_extent[2],
            ],
        )
    };

    let mut stamped = 0usize;
    let mut filtered = 0usize;
    for tri in triangles {
        let bounds = tri.bounds();
        if !bounds.overlaps(&padded) {
            continue;
        }
        filtered += 1;

        // Voxel sub-box covering the triangle bounds plus the threshold.
        let lo = grid.world_to_voxel([
            bounds.min[0] - threshold,
            bounds.min[1] - threshold,
            bounds.min[2] - threshold,
        ]);
        let hi = grid.world_to_voxel([
            bounds.max[0] + threshold,
            bounds.max[1] + threshold,
            bounds.max[2] + threshold,
        ]);

        for z in lo[2]..=hi[2] {
            for y in lo[1]..=hi[1] {
                for x in lo[0]..=hi[0] {
                    let world = grid.voxel_to_world([x, y, z]);
                    if tri.distance_squared(world) <= threshold_sq {
                        eps[x + n * (y + n * z)] = settings.material_permittivity;
                        stamped += 1;
                    }
                }
            }
        }
    }

    log::debug!(
        "voxelised {} of {} triangles: {} surface cells, {} ground cells",
        filtered,
        triangles.len(),
        stamped,
        ground_cells
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridDescriptor {
        GridDescriptor::new(32, 5.0, [0.0, 100.0, 0.0], [80.0; 3])
    }

    #[test]
    fn test_empty_scene_leaves_vacuum() {
        let grid = grid();
        let mut fields = FieldStore::new(grid.n);
        // Grid floats above ground: no cells below y = 0.
        voxelize(&mut fields, &grid, &[], &VoxelizeSettings::default());
        assert!(fields.epsilon().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_ground_plane_marks_slabs() {
        let grid = GridDescriptor::new(32, 5.0, [0.0; 3], [80.0; 3]);
        let mut fields = FieldStore::new(grid.n);
        voxelize(&mut fields, &grid, &[], &VoxelizeSettings::default());

        let below = fields.index(16, 0, 16);
        let above = fields.index(16, 31, 16);
        assert_eq!(fields.epsilon()[below], 50.0);
        assert_eq!(fields.epsilon()[above], 1.0);
    }

    #[test]
    fn test_wall_marks_nearby_voxels_only() {
        let grid = grid();
        let mut fields = FieldStore::new(grid.n);

        // Vertical wall through a column of voxel centres.
        let wall = [
            Triangle::new(
                [2.5, 40.0, -60.0],
                [2.5, 160.0, -60.0],
                [2.5, 160.0, 60.0],
                0,
            ),
            Triangle::new(
                [2.5, 40.0, -60.0],
                [2.5, 160.0, 60.0],
                [2.5, 40.0, 60.0],
                1,
            ),
        ];
        voxelize(&mut fields, &grid, &wall, &VoxelizeSettings::default());

        let on_wall = grid.world_to_voxel([2.5, 100.0, 0.0]);
        let off_wall = grid.world_to_voxel([60.0, 100.0, 0.0]);
        assert_eq!(
            fields.epsilon()[fields.index(on_wall[0], on_wall[1], on_wall[2])],
            50.0
        );
        assert_eq!(
            fields.epsilon()[fields.index(off_wall[0], off_wall[1], off_wall[2])],
            1.0
        );
    }

    #[test]
    fn test_idempotent_for_fixed_inputs() {
        let grid = grid();
        let mut fields = FieldStore::new(grid.n);
        let wall = [Triangle::new(
            [-20.0, 60.0, -20.0],
            [20.0, 60.0, -20.0],
            [0.0, 140.0, 20.0],
            0,
        )];
        let settings = VoxelizeSettings::default();

        voxelize(&mut fields, &grid, &wall, &settings);
        let first: Vec<f32> = fields.epsilon().to_vec();
        voxelize(&mut fields, &grid, &wall, &settings);
        assert_eq!(fields.epsilon(), &first[..]);
    }

    #[test]
    fn test_revoxelise_clears_stale_material() {
        let grid = grid();
        let mut fields = FieldStore::new(grid.n);
        let wall = [Triangle::new(
            [-20.0, 60.0, -20.0],
            [20.0, 60.0, -20.0],
            [0.0, 140.0, 20.0],
            0,
        )];
        let settings = VoxelizeSettings::default();

        voxelize(&mut fields, &grid, &wall, &settings);
        assert!(fields.epsilon().iter().any(|&v| v != 1.0));

        // Same grid, geometry gone: stale cells must revert to vacuum.
        voxelize(&mut fields, &grid, &[], &settings);
        assert!(fields.epsilon().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_distant_triangles_filtered_out() {
        let grid = grid();
        let mut fields = FieldStore::new(grid.n);
        let distant = [Triangle::new(
            [5000.0, 0.0, 0.0],
            [5010.0, 0.0, 0.0],
            [5000.0, 10.0, 0.0],
            0,
        )];
        voxelize(&mut fields, &grid, &distant, &VoxelizeSettings::default());
        assert!(fields.epsilon().iter().all(|&v| v == 1.0));
    }
}
