use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::density::Stencil;
use crate::differentiate::OutsideValue;
use crate::error::{ensure_finite, ensure_positive, Result, SimError};

/// How the local pressure value scales the gradient force.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCurve {
    #[default]
    Linear,
    /// Stiffer at high compression.
    Quadratic,
}

impl ResponseCurve {
    #[inline]
    pub fn apply(self, density: f64) -> f64 {
        match self {
            ResponseCurve::Linear => density,
            ResponseCurve::Quadratic => density * density,
        }
    }
}

/// Solver constants. Set before or between steps, never during one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    pub width: f64,
    pub height: f64,
    /// Particles per unit length along an axis; lattice spacing is its inverse.
    pub particle_density: f64,
    /// Mass per unit area of seeded fluid.
    pub fluid_mass_density: f64,
    /// Pressure-response sensitivity.
    pub sensitivity: f64,
    /// Linear drag coefficient.
    pub damping: f64,
    /// Amplitude of the per-cell pressure noise.
    pub noise: f64,
    pub gravity: DVec2,
    /// Closest a particle may get to any wall.
    pub wall_thickness: f64,
    pub dt: f64,
    pub response: ResponseCurve,
    pub stencil: Stencil,
    pub outside: OutsideValue,
    /// Lattice particles per physics-grid cell side.
    pub particles_per_cell: f64,
    /// Extra physics-grid cells beyond each wall.
    pub grid_margin: usize,
    pub seed: u64,
    /// Pairwise velocity smoothing; 0 disables the O(n²) pass.
    pub viscosity: f64,
    /// Gaussian width of the viscosity kernel.
    pub interaction_range: f64,
    /// Pairwise overlap resolution passes per step; 0 disables.
    pub collision_passes: usize,
    pub particle_radius: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            width: 2.0,
            height: 4.0,
            particle_density: 25.0,
            fluid_mass_density: 1000.0,
            sensitivity: 20.0,
            damping: 0.5,
            noise: 0.0,
            gravity: DVec2::new(0.0, -9.81),
            wall_thickness: 0.02,
            dt: 0.01,
            response: ResponseCurve::Linear,
            stencil: Stencil::Single,
            outside: OutsideValue::Own,
            particles_per_cell: 4.0,
            grid_margin: 2,
            seed: 42,
            viscosity: 0.0,
            interaction_range: 0.1,
            collision_passes: 0,
            particle_radius: 0.01,
        }
    }
}

/// Fraction of the Gaussian kernel below which viscosity is ignored.
const INTERACTION_THRESHOLD: f64 = 0.01;

impl SolverParams {
    /// Gravity only: no pressure, damping, noise or wall inset.
    pub fn free_fall() -> Self {
        Self {
            sensitivity: 0.0,
            damping: 0.0,
            noise: 0.0,
            wall_thickness: 0.0,
            ..Self::default()
        }
    }

    /// Quadratic response over the smoothed stencil with a little sub-grid noise.
    pub fn stiff() -> Self {
        Self {
            sensitivity: 8.0,
            damping: 1.0,
            noise: 0.02,
            response: ResponseCurve::Quadratic,
            stencil: Stencil::Weighted,
            ..Self::default()
        }
    }

    /// Spacing between seeded lattice points.
    pub fn spacing(&self) -> f64 {
        1.0 / self.particle_density
    }

    /// Mass of one seeded particle so that a region's total approximates `fluid_mass_density × area`.
    pub fn particle_mass(&self) -> f64 {
        self.fluid_mass_density / (self.particle_density * self.particle_density)
    }

    /// Side length of a physics-grid cell.
    pub fn cell_size(&self) -> f64 {
        self.particles_per_cell / self.particle_density
    }

    /// Points per cell at rest density.
    pub fn expected_cell_count(&self) -> f64 {
        self.particles_per_cell * self.particles_per_cell
    }

    /// Distance beyond which the viscosity kernel falls under 1 %.
    pub fn interaction_radius(&self) -> f64 {
        self.interaction_range * (-INTERACTION_THRESHOLD.ln()).sqrt()
    }

    /// Reject any combination that would produce a degenerate grid or step.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("width", self.width)?;
        ensure_positive("height", self.height)?;
        ensure_positive("particle_density", self.particle_density)?;
        ensure_positive("fluid_mass_density", self.fluid_mass_density)?;
        ensure_positive("dt", self.dt)?;
        ensure_positive("particles_per_cell", self.particles_per_cell)?;
        ensure_finite("sensitivity", self.sensitivity)?;
        ensure_finite("gravity.x", self.gravity.x)?;
        ensure_finite("gravity.y", self.gravity.y)?;
        non_negative("damping", self.damping)?;
        non_negative("noise", self.noise)?;
        non_negative("wall_thickness", self.wall_thickness)?;
        non_negative("viscosity", self.viscosity)?;
        if 2.0 * self.wall_thickness >= self.width.min(self.height) {
            return Err(SimError::WallTooThick {
                wall: self.wall_thickness,
                width: self.width,
                height: self.height,
            });
        }
        if self.viscosity > 0.0 {
            ensure_positive("interaction_range", self.interaction_range)?;
        }
        if self.collision_passes > 0 {
            ensure_positive("particle_radius", self.particle_radius)?;
        }
        if let OutsideValue::Fixed(v) = self.outside {
            ensure_finite("outside value", v)?;
        }
        Ok(())
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64> {
    ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(SimError::NonPositive { name, value });
    }
    Ok(value)
}
