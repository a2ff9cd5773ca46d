//! # Skywave Core
//!
//! The numerical backbone of the Skywave framework. This crate implements
//! the Finite-Difference Time-Domain (FDTD) solver that propagates
//! electromagnetic waves through a voxelised urban scene.
//!
//! ## Architecture
//!
//! The solver is split into three pieces: an immutable [`grid::GridDescriptor`]
//! fixing the domain geometry and the Courant-stable time step, a
//! [`fields::FieldStore`] owning the nine per-cell scalar arrays, and a
//! [`stepper::FdtdStepper`] that advances the leapfrog update through a
//! [`ComputeBackend`](skywave_compute::ComputeBackend).
//!
//! ## Modules
//!
//! - [`grid`] — Domain extent, voxel spacing, world/voxel mapping.
//! - [`fields`] — Field and material storage, emission injection.
//! - [`stepper`] — The leapfrog curl update with edge damping.

pub mod fields;
pub mod grid;
pub mod stepper;

pub use fields::FieldStore;
pub use grid::GridDescriptor;
pub use stepper::FdtdStepper;
