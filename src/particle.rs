use glam::DVec2;

use crate::error::{Result, SimError};

/// A point mass carrying position and velocity.
///
/// Every kinematic operation returns a new value; the solver replaces the
/// stored particle rather than mutating it in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub mass: f64,
    pub position: DVec2,
    pub velocity: DVec2,
}

impl Particle {
    pub fn new(mass: f64, position: DVec2, velocity: DVec2) -> Self {
        Self { mass, position, velocity }
    }

    /// Particle at rest.
    pub fn at_rest(mass: f64, position: DVec2) -> Self {
        Self::new(mass, position, DVec2::ZERO)
    }

    /// v += a * dt
    #[inline]
    pub fn accelerate(self, acceleration: DVec2, dt: f64) -> Self {
        Self { velocity: self.velocity + acceleration * dt, ..self }
    }

    /// v += F / m * dt. Fails instead of dividing by a non-positive mass.
    pub fn apply_force(self, force: DVec2, dt: f64) -> Result<Self> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(SimError::InvalidMass(self.mass));
        }
        Ok(self.accelerate(force / self.mass, dt))
    }

    /// x += v * dt
    #[inline]
    pub fn advance(self, dt: f64) -> Self {
        Self { position: self.position + self.velocity * dt, ..self }
    }

    pub fn distance(&self, other: &Particle) -> f64 {
        self.position.distance(other.position)
    }

    /// Vector pointing from `self` to `other`.
    pub fn offset(&self, other: &Particle) -> DVec2 {
        other.position - self.position
    }

    /// Velocity of `other` as seen from `self`.
    pub fn relative_velocity(&self, other: &Particle) -> DVec2 {
        other.velocity - self.velocity
    }

    /// Magnitude of the velocity difference.
    pub fn delta_v(&self, other: &Particle) -> f64 {
        self.velocity.distance(other.velocity)
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accelerate_leaves_position() {
        let p = Particle::at_rest(2.0, DVec2::new(1.0, 1.0));
        let q = p.accelerate(DVec2::new(0.0, -10.0), 0.1);
        assert_eq!(q.position, p.position);
        assert_relative_eq!(q.velocity.y, -1.0);
        assert_eq!(p.velocity, DVec2::ZERO, "original value must be untouched");
    }

    #[test]
    fn test_apply_force_divides_by_mass() {
        let p = Particle::at_rest(2.0, DVec2::ZERO);
        let q = p.apply_force(DVec2::new(4.0, 0.0), 0.5).unwrap();
        assert_relative_eq!(q.velocity.x, 1.0);
    }

    #[test]
    fn test_apply_force_rejects_zero_mass() {
        let p = Particle::at_rest(0.0, DVec2::ZERO);
        assert!(matches!(p.apply_force(DVec2::X, 0.1), Err(SimError::InvalidMass(_))));
        let p = Particle::at_rest(f64::NAN, DVec2::ZERO);
        assert!(p.apply_force(DVec2::X, 0.1).is_err());
    }

    #[test]
    fn test_advance() {
        let p = Particle::new(1.0, DVec2::new(0.0, 1.0), DVec2::new(2.0, -1.0));
        let q = p.advance(0.25);
        assert_relative_eq!(q.position.x, 0.5);
        assert_relative_eq!(q.position.y, 0.75);
        assert_eq!(q.velocity, p.velocity);
    }

    #[test]
    fn test_pair_helpers() {
        let a = Particle::new(1.0, DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0));
        let b = Particle::new(1.0, DVec2::new(3.0, 4.0), DVec2::new(1.0, 2.0));
        assert_relative_eq!(a.distance(&b), 5.0);
        assert_eq!(a.offset(&b), DVec2::new(3.0, 4.0));
        assert_eq!(a.relative_velocity(&b), DVec2::new(0.0, 2.0));
        assert_relative_eq!(a.delta_v(&b), 2.0);
        assert_relative_eq!(b.kinetic_energy(), 2.5);
    }
}
