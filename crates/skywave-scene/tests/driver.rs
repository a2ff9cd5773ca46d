//! Integration tests for the simulation driver.
//!
//! Coverage:
//! - Grid resize: growing the half-extent reinitialises the field store at
//!   the new resolution with zeroed fields and re-voxelised materials.
//! - Auto-centre follows the active transmitters.
//! - Pausing skips sub-steps but keeps grid maintenance alive.
//! - A driven transmitter produces a nonzero field through the full loop.

use std::sync::Arc;

use skywave_compute::CpuBackend;
use skywave_geometry::{Bvh, Triangle};
use skywave_scene::{NodeKind, SimulationDriver};

fn empty_bvh() -> Arc<Bvh> {
    Arc::new(Bvh::build(Vec::new()))
}

fn driver_with(bvh: Arc<Bvh>, half_extent: [f32; 3]) -> SimulationDriver {
    SimulationDriver::new(
        bvh,
        Arc::new(CpuBackend::new()),
        5.0,
        [0.0; 3],
        half_extent,
    )
}

#[test]
fn test_grid_resize_reinitialises_fields() {
    let mut driver = driver_with(empty_bvh(), [80.0; 3]);
    driver.settings.auto_center = false;
    driver.advance();
    assert_eq!(driver.grid().n, 32);

    // Put some energy into the field first.
    driver
        .sources_mut()
        .add([0.0; 3], 2.4e9, 20.0, NodeKind::Transmitter);
    for _ in 0..5 {
        driver.advance();
    }
    assert!(driver.fields().ez().iter().any(|&v| v != 0.0));

    // Grow the volume so the required resolution becomes 96, and pause so
    // the first frame after the resize does not inject new energy.
    driver.settings.paused = true;
    driver.set_half_extent([240.0; 3]);
    driver.advance();

    assert_eq!(driver.grid().n, 96);
    assert_eq!(driver.fields().resolution(), 96);
    assert!(driver.fields().ez().iter().all(|&v| v == 0.0));
    assert!(driver.fields().hx().iter().all(|&v| v == 0.0));
    // Centre sits at the origin, so the lower half of the volume is below
    // ground and must have been re-voxelised.
    assert!(driver.fields().epsilon().iter().any(|&v| v != 1.0));
}

#[test]
fn test_auto_center_follows_transmitters() {
    let mut driver = driver_with(empty_bvh(), [80.0; 3]);
    driver
        .sources_mut()
        .add([100.0, 40.0, -60.0], 2.4e9, 20.0, NodeKind::Transmitter);
    driver
        .sources_mut()
        .add([200.0, 80.0, 60.0], 2.4e9, 20.0, NodeKind::Transmitter);
    // Receivers must not affect the centre.
    driver
        .sources_mut()
        .add([-900.0, 0.0, 0.0], 2.4e9, 20.0, NodeKind::Receiver);

    driver.advance();

    assert_eq!(driver.grid().center, [150.0, 60.0, 0.0]);
}

#[test]
fn test_paused_driver_keeps_fields_static() {
    let mut driver = driver_with(empty_bvh(), [80.0; 3]);
    driver.settings.auto_center = false;
    driver
        .sources_mut()
        .add([0.0; 3], 2.4e9, 20.0, NodeKind::Transmitter);

    driver.settings.paused = true;
    for _ in 0..10 {
        driver.advance();
    }
    assert!(driver.fields().ez().iter().all(|&v| v == 0.0));

    driver.settings.paused = false;
    driver.advance();
    driver.advance();
    assert!(driver.fields().ez().iter().any(|&v| v != 0.0));
}

#[test]
fn test_simulation_speed_runs_multiple_substeps() {
    let mut single = driver_with(empty_bvh(), [80.0; 3]);
    single.settings.auto_center = false;
    single
        .sources_mut()
        .add([0.0; 3], 2.4e9, 20.0, NodeKind::Transmitter);

    let mut multi = driver_with(empty_bvh(), [80.0; 3]);
    multi.settings.auto_center = false;
    multi.settings.simulation_speed = 5;
    multi
        .sources_mut()
        .add([0.0; 3], 2.4e9, 20.0, NodeKind::Transmitter);

    single.advance();
    multi.advance();

    // Five sub-steps advance the oscillation clock five times as far.
    assert!(multi.sources().clock() > single.sources().clock() * 4.9);
}

#[test]
fn test_geometry_stamped_into_material_grid() {
    // A wall through the volume; the driver voxelises on first advance. The
    // wall plane passes through voxel centres so its column is marked.
    let wall = vec![
        Triangle::new([2.5, -60.0, -60.0], [2.5, 60.0, -60.0], [2.5, 60.0, 60.0], 0),
        Triangle::new([2.5, -60.0, -60.0], [2.5, 60.0, 60.0], [2.5, -60.0, 60.0], 1),
    ];
    let mut driver = driver_with(Arc::new(Bvh::build(wall)), [80.0; 3]);
    driver.settings.auto_center = false;
    driver.settings.paused = true;

    driver.advance();

    let grid = driver.grid();
    let fields = driver.fields();
    let on_wall = grid.world_to_voxel([2.5, 30.0, 30.0]);
    let off_wall = grid.world_to_voxel([60.0, 30.0, 30.0]);
    assert_eq!(
        fields.epsilon()[fields.index(on_wall[0], on_wall[1], on_wall[2])],
        driver.settings.voxelize.material_permittivity
    );
    assert_eq!(
        fields.epsilon()[fields.index(off_wall[0], off_wall[1], off_wall[2])],
        1.0
    );
}
