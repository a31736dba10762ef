//! Optional O(n²) pair passes: Gaussian viscosity and overlap resolution.
//!
//! Both are disabled by default; the grid pressure is the primary force.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;

use super::params::SolverParams;
use crate::particle::Particle;

/// Pull each close pair's velocities toward their mean, weighted by a Gaussian of the distance.
///
/// Pairs are visited in both orders, so every close pair is blended twice per call.
pub fn apply_viscosity(particles: &mut [Particle], params: &SolverParams) {
    let radius = params.interaction_radius();
    let range_sq = params.interaction_range * params.interaction_range;
    let n = particles.len();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let (a, b) = (particles[i], particles[j]);
            let r = a.distance(&b);
            if r.is_nan() || r >= radius {
                continue;
            }
            let mean = (a.velocity + b.velocity) * 0.5;
            let t = ((-r * r / range_sq).exp() * params.viscosity * params.dt).min(1.0);
            particles[i] = Particle { velocity: a.velocity.lerp(mean, t), ..a };
            particles[j] = Particle { velocity: b.velocity.lerp(mean, t), ..b };
        }
    }
}

/// Crowding priority: Σ 1/r over every other particle, ignoring coincident ones.
fn crowding(particles: &[Particle], i: usize) -> f64 {
    particles
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(_, q)| 1.0 / particles[i].distance(q))
        .filter(|w| w.is_finite())
        .sum()
}

fn random_unit<R: Rng>(rng: &mut R) -> DVec2 {
    DVec2::from_angle(rng.gen_range(0.0..TAU))
}

/// Push overlapping particles apart to exactly `radius`, most crowded first.
///
/// Half the relative normal velocity is exchanged on contact. A zero or
/// non-finite separation has no direction, so the particle is placed
/// `radius` away along a random unit vector instead. Returns how many
/// such degenerate pairs were met.
pub fn resolve_collisions<R: Rng>(particles: &mut [Particle], radius: f64, rng: &mut R) -> usize {
    let n = particles.len();
    let mut order: Vec<(usize, f64)> = (0..n).map(|i| (i, crowding(particles, i))).collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut degenerate = 0;
    for (i, _) in order {
        for j in 0..n {
            if i == j {
                continue;
            }
            let offset = particles[i].offset(&particles[j]);
            let r = offset.length();
            if r.is_finite() && r >= radius {
                continue;
            }
            let anchor = particles[j].position;
            if !(r.is_finite() && r > 0.0) {
                particles[i].position = anchor - radius * random_unit(rng);
                degenerate += 1;
                continue;
            }
            particles[i].position = anchor - offset * (radius / r);

            let normal = offset / r;
            let dv = normal * (particles[i].velocity - particles[j].velocity).dot(normal);
            particles[i].velocity -= dv * 0.5;
            particles[j].velocity += dv * 0.5;
        }
    }
    degenerate
}
