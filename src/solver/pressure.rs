//! Pressure phase: particles → density grid → gradient → per-particle acceleration.

use log::{trace, warn};
use rand::Rng;

use super::diagnostics::StepStats;
use super::params::SolverParams;
use crate::density::DensityMapper;
use crate::differentiate::FieldDifferentiator;
use crate::field::{ScalarField, VectorField};
use crate::particle::Particle;

/// Lowest pressure a cell may hold; anything below is treated as at rest.
pub const PRESSURE_FLOOR: f64 = 1.0;

/// Raise every cell to [`PRESSURE_FLOOR`], replacing non-finite cells.
/// Returns how many cells were non-finite.
pub fn floor_field(field: &mut ScalarField) -> usize {
    let mut sanitized = 0;
    for v in field.iter_mut() {
        if !v.is_finite() {
            *v = PRESSURE_FLOOR;
            sanitized += 1;
        } else if *v < PRESSURE_FLOOR {
            *v = PRESSURE_FLOOR;
        }
    }
    sanitized
}

/// Independent uniform noise in `[-amplitude, amplitude]` per cell.
pub fn add_noise<R: Rng>(field: &mut ScalarField, amplitude: f64, rng: &mut R) {
    if amplitude <= 0.0 {
        return;
    }
    for v in field.iter_mut() {
        *v += rng.gen_range(-amplitude..=amplitude);
    }
}

/// Floored (and possibly noised) pressure with its gradient.
pub struct PressureField {
    pub pressure: ScalarField,
    pub gradient: VectorField,
    pub sanitized_cells: usize,
}

pub fn compute_pressure<R: Rng>(
    particles: &[Particle],
    mapper: &DensityMapper,
    differentiator: &FieldDifferentiator,
    noise: f64,
    rng: &mut R,
) -> PressureField {
    let mut pressure = mapper.map(particles.iter().map(|p| p.position));
    let sanitized_cells = floor_field(&mut pressure);
    add_noise(&mut pressure, noise, rng);
    let gradient = differentiator.differentiate(&pressure);
    PressureField { pressure, gradient, sanitized_cells }
}

/// Accelerate every particle down the pressure gradient of its own cell.
///
/// All particles read the same completed field. Particles outside the
/// grid are skipped and counted in `stats.escaped`.
pub fn apply_pressure<R: Rng>(
    particles: &mut [Particle],
    mapper: &DensityMapper,
    differentiator: &FieldDifferentiator,
    params: &SolverParams,
    rng: &mut R,
    stats: &mut StepStats,
) {
    let field = compute_pressure(particles, mapper, differentiator, params.noise, rng);
    stats.sanitized_cells += field.sanitized_cells;
    if field.sanitized_cells > 0 {
        warn!("replaced {} non-finite pressure cells", field.sanitized_cells);
    }

    let mut escaped = 0;
    for p in particles.iter_mut() {
        let Some((x, y)) = mapper.cell_of(p.position) else {
            trace!("particle at {:?} is outside the pressure grid", p.position);
            escaped += 1;
            continue;
        };
        let density = field.pressure.get(x, y);
        let accel = -field.gradient.get(x, y) * params.response.apply(density) * params.sensitivity;
        if accel.is_finite() {
            *p = p.accelerate(accel, params.dt);
        }
    }

    if escaped > 0 {
        warn!("{escaped} particles escaped the pressure grid; no pressure applied to them");
    }
    stats.escaped += escaped;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::Stencil;
    use glam::DVec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mapper() -> DensityMapper {
        DensityMapper::new(8, 8, 1.0, DVec2::new(4.0, 4.0), 1.0, Stencil::Single).unwrap()
    }

    #[test]
    fn test_floor_field() {
        let mut f = ScalarField::zeros(3, 1);
        f.set(1, 0, 2.5);
        f.set(2, 0, f64::NAN);
        let sanitized = floor_field(&mut f);
        assert_eq!(sanitized, 1);
        assert_eq!(f.as_slice(), &[1.0, 2.5, 1.0]);
    }

    #[test]
    fn test_noise_bounded_and_seeded() {
        let mut a = ScalarField::filled(10, 10, 1.0);
        let mut b = a.clone();
        add_noise(&mut a, 0.05, &mut ChaCha8Rng::seed_from_u64(3));
        add_noise(&mut b, 0.05, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b, "same seed must give the same noise");
        assert!(a.iter().all(|v| (v - 1.0).abs() <= 0.05));
        assert!(a.iter().any(|&v| v != 1.0));
    }

    #[test]
    fn test_zero_noise_consumes_nothing() {
        let mut f = ScalarField::filled(2, 2, 1.0);
        add_noise(&mut f, 0.0, &mut ChaCha8Rng::seed_from_u64(0));
        assert!(f.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_crowded_cell_pushes_neighbours_away() {
        let params = SolverParams { sensitivity: 1.0, dt: 0.1, ..SolverParams::default() };
        let mut ps = vec![Particle::at_rest(1.0, DVec2::new(4.5, 4.5)); 5];
        ps.push(Particle::at_rest(1.0, DVec2::new(5.5, 4.5)));
        ps.push(Particle::at_rest(1.0, DVec2::new(3.5, 4.5)));
        let mut stats = StepStats::default();
        apply_pressure(
            &mut ps,
            &mapper(),
            &FieldDifferentiator::default(),
            &params,
            &mut ChaCha8Rng::seed_from_u64(0),
            &mut stats,
        );
        assert!(ps[5].velocity.x > 0.0, "right neighbour should move right: {:?}", ps[5].velocity);
        assert!(ps[6].velocity.x < 0.0, "left neighbour should move left: {:?}", ps[6].velocity);
        assert_eq!(stats.escaped, 0);
    }

    #[test]
    fn test_escaped_particles_counted_not_moved() {
        let params = SolverParams { sensitivity: 5.0, ..SolverParams::default() };
        let outside = Particle::at_rest(1.0, DVec2::new(-3.0, 4.0));
        let mut ps = vec![outside, Particle::at_rest(1.0, DVec2::new(4.5, 4.5))];
        let mut stats = StepStats::default();
        apply_pressure(
            &mut ps,
            &mapper(),
            &FieldDifferentiator::default(),
            &params,
            &mut ChaCha8Rng::seed_from_u64(0),
            &mut stats,
        );
        assert_eq!(stats.escaped, 1);
        assert_eq!(ps[0], outside);
    }
}
