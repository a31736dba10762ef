use glam::DVec2;

use crate::particle::Particle;

/// Anomalies observed while advancing one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Particles outside the physics grid; they got no pressure force this tick.
    pub escaped: usize,
    /// Non-finite pressure cells replaced before differentiation.
    pub sanitized_cells: usize,
    /// Coincident or non-finite pairs resolved with a random push.
    pub degenerate_pairs: usize,
}

impl StepStats {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Total kinetic energy: Σ ½ m |v|².
pub fn kinetic_energy(particles: &[Particle]) -> f64 {
    particles.iter().map(Particle::kinetic_energy).sum()
}

pub fn total_mass(particles: &[Particle]) -> f64 {
    particles.iter().map(|p| p.mass).sum()
}

pub fn max_speed(particles: &[Particle]) -> f64 {
    particles.iter().map(|p| p.velocity.length()).fold(0.0, f64::max)
}

/// Mass-weighted centre; `None` for an empty or massless set.
pub fn centroid(particles: &[Particle]) -> Option<DVec2> {
    let mass = total_mass(particles);
    if mass > 0.0 {
        Some(particles.iter().map(|p| p.position * p.mass).sum::<DVec2>() / mass)
    } else {
        None
    }
}
