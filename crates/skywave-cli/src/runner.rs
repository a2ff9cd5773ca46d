//! Headless simulation runner: ties together the BVH cache, scene file,
//! and driver loop, and writes CSV outputs.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use skywave_compute::{ComputeBackend, CpuBackend};
use skywave_geometry::Bvh;
use skywave_scene::scene_file::{self, SceneData};
use skywave_scene::voxelize::VoxelizeSettings;
use skywave_scene::{NodeKind, SimulationDriver};

use crate::config::JobConfig;

/// Results of a headless run.
pub struct RunOutput {
    /// Total field energy after each frame (J).
    pub energy: Vec<f64>,
    /// Final grid resolution.
    pub grid_cells: usize,
}

/// Run a full simulation from a parsed job configuration.
pub fn run_simulation(job: &JobConfig) -> Result<RunOutput> {
    let bvh = Bvh::load_cache(Path::new(&job.scene.bvh_cache))
        .with_context(|| format!("loading BVH cache '{}'", job.scene.bvh_cache))?;
    bvh.log_stats();
    let bvh = Arc::new(bvh);

    let backend: Arc<dyn ComputeBackend> = Arc::new(CpuBackend::new());
    println!("Backend: {}", backend.device_info().name);

    let mut spacing = job.grid.spacing;
    let mut half_extent = job.grid.half_extent;
    let mut scene_data = SceneData::default();
    let mut loaded_nodes = None;

    if let Some(scene_path) = &job.scene.scene_file {
        let mut manager = skywave_scene::SourceManager::new();
        scene_file::load_scene(Path::new(scene_path), &mut manager, &mut scene_data)
            .with_context(|| format!("loading scene '{}'", scene_path))?;
        spacing = scene_data.voxel_spacing;
        half_extent = scene_data.grid_half_extent;
        loaded_nodes = Some(manager);
    }

    let mut driver = SimulationDriver::new(bvh, backend, spacing, job.grid.center, half_extent);
    driver.settings.auto_center = job.grid.auto_center;
    driver.settings.simulation_speed = job.simulation.simulation_speed;
    driver.settings.emission_strength = job.simulation.emission_strength;
    driver.settings.voxelize = VoxelizeSettings {
        material_permittivity: job.grid.material_permittivity,
        ground_level: job.grid.ground_level,
    };

    match loaded_nodes {
        Some(manager) => {
            let count = manager.len();
            *driver.sources_mut() = manager;
            println!("Scene nodes: {}", count);
        }
        None => {
            // No scene: a single transmitter at the grid centre keeps the
            // run from being trivially empty.
            driver
                .sources_mut()
                .add(job.grid.center, 2.4e9, 20.0, NodeKind::Transmitter);
            println!("No scene file; placed a default transmitter at the grid centre");
        }
    }

    let frames = job.simulation.frames;
    let mut energy = Vec::with_capacity(frames);
    for frame in 0..frames {
        driver.advance();
        energy.push(driver.fields().total_energy(driver.grid()));

        if (frame + 1) % 50 == 0 || frame == 0 || frame + 1 == frames {
            println!(
                "  [{}/{}] N={} E_total={:.3e} J",
                frame + 1,
                frames,
                driver.grid().n,
                energy[frame]
            );
        }
    }

    let output = RunOutput {
        energy,
        grid_cells: driver.grid().n,
    };

    let out_dir = Path::new(&job.output.directory);
    if job.output.save_energy {
        write_energy_csv(&output.energy, &out_dir.join("energy.csv"))?;
    }
    if job.output.save_field_slice {
        write_field_slice_csv(&driver, &out_dir.join("ez_slice.csv"))?;
    }

    Ok(output)
}

/// Write the per-frame energy trace as CSV.
pub fn write_energy_csv(energy: &[f64], path: &Path) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;

    writeln!(file, "# Skywave headless run — total field energy")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "frame,energy_j")?;
    for (frame, value) in energy.iter().enumerate() {
        writeln!(file, "{},{:.6e}", frame, value)?;
    }

    println!("Energy trace written to: {}", path.display());
    Ok(())
}

/// Write the mid-height Ez slice (`y = n/2`) as CSV rows of `x,z,ez`.
pub fn write_field_slice_csv(driver: &SimulationDriver, path: &Path) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;

    let fields = driver.fields();
    let n = fields.resolution();
    let y = n / 2;
    writeln!(file, "# Skywave headless run — Ez slice at y={}", y)?;
    writeln!(file, "x,z,ez")?;
    let ez = fields.ez();
    for z in 0..n {
        for x in 0..n {
            writeln!(file, "{},{},{:.6e}", x, z, ez[fields.index(x, y, z)])?;
        }
    }

    println!("Field slice written to: {}", path.display());
    Ok(())
}
