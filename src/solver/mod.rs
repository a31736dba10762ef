mod boundary;
pub mod diagnostics;
mod pairwise;
mod params;
mod pressure;

// Re-export public API
pub use boundary::clamp_particle;
pub use diagnostics::StepStats;
pub use params::{ResponseCurve, SolverParams};
pub use pressure::{floor_field, PRESSURE_FLOOR};

use glam::DVec2;
use log::{debug, trace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::density::{DensityMapper, Stencil};
use crate::differentiate::FieldDifferentiator;
use crate::error::{ensure_positive, Result};
use crate::field::ScalarField;
use crate::particle::Particle;

/// Called once after every completed [`FluidSolver::step`].
pub type TickHook = Box<dyn FnMut(&mut FluidSolver)>;

/// Slack for lattice counts so `2.0 * 25.0` style extents stay inclusive.
const LATTICE_EPS: f64 = 1e-9;

/// Particle fluid in a `width × height` box with origin at the bottom-left corner.
pub struct FluidSolver {
    params: SolverParams,
    mapper: DensityMapper,
    differentiator: FieldDifferentiator,
    particles: Vec<Particle>,
    rng: ChaCha8Rng,
    time: f64,
    steps: u64,
    last_stats: StepStats,
    tick_hook: Option<TickHook>,
}

/// Physics grid: cells hold `particles_per_cell²` particles at rest and
/// extend `grid_margin` cells past every wall.
fn physics_mapper(params: &SolverParams) -> Result<DensityMapper> {
    DensityMapper::covering(
        DVec2::ZERO,
        DVec2::new(params.width, params.height),
        params.cell_size(),
        params.grid_margin,
        params.expected_cell_count(),
        params.stencil,
    )
}

/// Inclusive lattice points along an extent.
fn lattice_count(extent: f64, density: f64) -> usize {
    if !extent.is_finite() || extent < 0.0 {
        return 0;
    }
    (extent * density + LATTICE_EPS).floor() as usize + 1
}

fn in_rect(p: DVec2, bl: DVec2, tr: DVec2) -> bool {
    p.x >= bl.x && p.x <= tr.x && p.y >= bl.y && p.y <= tr.y
}

impl FluidSolver {
    pub fn new(params: SolverParams) -> Result<Self> {
        params.validate()?;
        let mapper = physics_mapper(&params)?;
        debug!(
            "physics grid {:?} cells of {:.4} covering {:?}..{:?}",
            mapper.resolution(),
            mapper.step(),
            mapper.start(),
            mapper.end()
        );
        Ok(Self {
            differentiator: FieldDifferentiator::new(params.outside),
            rng: ChaCha8Rng::seed_from_u64(params.seed),
            mapper,
            params,
            particles: Vec::new(),
            time: 0.0,
            steps: 0,
            last_stats: StepStats::default(),
            tick_hook: None,
        })
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Replace the solver constants between steps. The physics grid is
    /// rebuilt; the random source is reseeded only if the seed changed.
    pub fn set_params(&mut self, params: SolverParams) -> Result<()> {
        params.validate()?;
        self.mapper = physics_mapper(&params)?;
        self.differentiator = FieldDifferentiator::new(params.outside);
        if params.seed != self.params.seed {
            self.rng = ChaCha8Rng::seed_from_u64(params.seed);
        }
        self.params = params;
        Ok(())
    }

    pub fn mapper(&self) -> &DensityMapper {
        &self.mapper
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Elapsed simulated seconds.
    pub fn simulation_time(&self) -> f64 {
        self.time
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn last_stats(&self) -> StepStats {
        self.last_stats
    }

    pub fn add_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Fill the closed rectangle `[bl, tr]` with a lattice of particles at rest,
    /// spaced `1 / particle_density`. Returns how many were added.
    pub fn seed_region(&mut self, bl: DVec2, tr: DVec2) -> usize {
        let density = self.params.particle_density;
        let nx = lattice_count(tr.x - bl.x, density);
        let ny = lattice_count(tr.y - bl.y, density);
        let mass = self.params.particle_mass();

        self.particles.reserve(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                let offset = DVec2::new(i as f64, j as f64) / density;
                // The tolerant count can put the last row a rounding error past `tr`.
                self.particles.push(Particle::at_rest(mass, (bl + offset).min(tr)));
            }
        }
        trace!("seeded {} particles in {:?}..{:?}", nx * ny, bl, tr);
        nx * ny
    }

    /// Remove every particle inside the closed rectangle `[bl, tr]`.
    pub fn clear_region(&mut self, bl: DVec2, tr: DVec2) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| !in_rect(p.position, bl, tr));
        before - self.particles.len()
    }

    pub fn clear_all(&mut self) {
        self.particles.clear();
    }

    /// Copy of the current positions; independent of later steps.
    pub fn snapshot(&self) -> Vec<DVec2> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Density over the domain grown by `margin` on each side, at a cell size
    /// independent of the physics grid. A cell at rest density reads ≈ 1.
    pub fn map(&self, cell_size: f64, margin: f64) -> Result<ScalarField> {
        ensure_positive("cell size", cell_size)?;
        let margin = DVec2::splat(margin);
        let expected = (self.params.particle_density * cell_size).powi(2);
        let mapper = DensityMapper::covering(
            -margin,
            DVec2::new(self.params.width, self.params.height) + margin,
            cell_size,
            0,
            expected,
            Stencil::Single,
        )?;
        Ok(mapper.map(self.particles.iter().map(|p| p.position)))
    }

    /// Floored pressure on the physics grid, as the next step would see it before noise.
    pub fn pressure_field(&self) -> ScalarField {
        let mut field = self.mapper.map(self.particles.iter().map(|p| p.position));
        floor_field(&mut field);
        field
    }

    pub fn set_tick_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&mut FluidSolver) + 'static,
    {
        self.tick_hook = Some(Box::new(hook));
    }

    pub fn clear_tick_hook(&mut self) {
        self.tick_hook = None;
    }

    /// Advance by one fixed timestep:
    /// gravity → pressure → damping → integration → walls.
    pub fn step(&mut self) -> StepStats {
        let dt = self.params.dt;
        let mut stats = StepStats::default();

        let gravity = self.params.gravity;
        for p in self.particles.iter_mut() {
            *p = p.accelerate(gravity, dt);
        }

        pressure::apply_pressure(
            &mut self.particles,
            &self.mapper,
            &self.differentiator,
            &self.params,
            &mut self.rng,
            &mut stats,
        );

        if self.params.viscosity > 0.0 {
            pairwise::apply_viscosity(&mut self.particles, &self.params);
        }

        // Damping acts on the post-force velocity of this tick.
        let damping = self.params.damping;
        for p in self.particles.iter_mut() {
            *p = p.accelerate(-p.velocity * damping, dt);
        }

        for p in self.particles.iter_mut() {
            *p = p.advance(dt);
        }

        for _ in 0..self.params.collision_passes {
            stats.degenerate_pairs +=
                pairwise::resolve_collisions(&mut self.particles, self.params.particle_radius, &mut self.rng);
        }

        boundary::clamp_to_walls(
            &mut self.particles,
            self.params.width,
            self.params.height,
            self.params.wall_thickness,
        );

        self.time += dt;
        self.steps += 1;
        self.last_stats = stats;
        trace!("step {} t={:.4} n={} {:?}", self.steps, self.time, self.particles.len(), stats);

        self.run_tick_hook();
        stats
    }

    fn run_tick_hook(&mut self) {
        if let Some(mut hook) = self.tick_hook.take() {
            hook(self);
            // A hook may install its own replacement.
            if self.tick_hook.is_none() {
                self.tick_hook = Some(hook);
            }
        }
    }
}
