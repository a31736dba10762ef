//! fluidbox: a 2D particle fluid in a rectangular box.
//!
//! Particles carry mass, position and velocity. Each step projects them onto
//! a density grid, treats the (floored) density as pressure, and pushes every
//! particle down the pressure gradient sampled at its cell. Gravity, damping
//! and wall clamping complete the step.

pub mod actions;
pub mod config;
pub mod density;
pub mod differentiate;
pub mod error;
pub mod field;
pub mod particle;
pub mod runner;
pub mod solver;

pub use density::{DensityMapper, Stencil};
pub use differentiate::{FieldDifferentiator, OutsideValue};
pub use error::{Result, SimError};
pub use field::{ScalarField, VectorField};
pub use glam::DVec2;
pub use particle::Particle;
pub use runner::{RunSummary, Runner};
pub use solver::{FluidSolver, SolverParams, StepStats, TickHook};
