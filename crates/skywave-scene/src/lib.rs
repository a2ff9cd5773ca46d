//! # Skywave Scene
//!
//! The session layer of the Skywave framework: everything between the raw
//! numerical solver (`skywave-core`) and a host application. This crate
//! owns the catalogue of radio nodes, stamps scene geometry into the
//! solver's material grid, and orchestrates the per-frame simulation loop.
//!
//! ## Modules
//!
//! - [`sources`] — Radio node catalogue, per-step current injection,
//!   picking and surface placement.
//! - [`voxelize`] — Marks grid voxels occupied by geometry with an elevated
//!   permittivity so the FDTD stencil respects scatterers.
//! - [`driver`] — The per-frame orchestration: grid relocation,
//!   re-voxelisation, and sub-stepping.
//! - [`scene_file`] — Plain-text `[Section]`/`key=value` scene persistence.
//! - [`propagation`] — Geometric signal-ray overlay (Fibonacci sphere +
//!   reflections) for coverage sketching.

pub mod driver;
pub mod propagation;
pub mod scene_file;
pub mod sources;
pub mod voxelize;

pub use driver::{DriverSettings, SimulationDriver};
pub use sources::{NodeKind, RadioSource, SourceManager};
pub use voxelize::VoxelizeSettings;
