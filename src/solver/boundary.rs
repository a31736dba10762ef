use crate::particle::Particle;

/// Inelastic walls inset by `wall` from each side of a `width × height` box.
///
/// Per axis: a coordinate past the wall is moved onto it and any outward
/// velocity component is zeroed. Nothing is reflected.
pub fn clamp_to_walls(particles: &mut [Particle], width: f64, height: f64, wall: f64) {
    for p in particles.iter_mut() {
        *p = clamp_particle(*p, width, height, wall);
    }
}

#[inline]
pub fn clamp_particle(mut p: Particle, width: f64, height: f64, wall: f64) -> Particle {
    (p.position.x, p.velocity.x) = clamp_axis(p.position.x, p.velocity.x, wall, width - wall);
    (p.position.y, p.velocity.y) = clamp_axis(p.position.y, p.velocity.y, wall, height - wall);
    p
}

#[inline]
fn clamp_axis(pos: f64, vel: f64, lo: f64, hi: f64) -> (f64, f64) {
    if pos < lo {
        (lo, vel.max(0.0))
    } else if pos > hi {
        (hi, vel.min(0.0))
    } else {
        (pos, vel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn particle(pos: (f64, f64), vel: (f64, f64)) -> Particle {
        Particle::new(1.0, DVec2::new(pos.0, pos.1), DVec2::new(vel.0, vel.1))
    }

    #[test]
    fn test_low_wall_absorbs_outward_velocity() {
        let p = clamp_particle(particle((-0.5, 1.0), (-2.0, 0.5)), 2.0, 4.0, 0.1);
        assert_eq!(p.position, DVec2::new(0.1, 1.0));
        assert_eq!(p.velocity, DVec2::new(0.0, 0.5));
    }

    #[test]
    fn test_high_wall_absorbs_outward_velocity() {
        let p = clamp_particle(particle((1.0, 5.0), (0.3, 4.0)), 2.0, 4.0, 0.1);
        assert_eq!(p.position, DVec2::new(1.0, 3.9));
        assert_eq!(p.velocity, DVec2::new(0.3, 0.0));
    }

    #[test]
    fn test_inward_velocity_kept_at_wall() {
        let p = clamp_particle(particle((-0.1, -0.1), (1.0, 2.0)), 2.0, 4.0, 0.0);
        assert_eq!(p.position, DVec2::ZERO);
        assert_eq!(p.velocity, DVec2::new(1.0, 2.0));
    }

    #[test]
    fn test_particle_on_wall_untouched() {
        let before = particle((0.1, 0.1), (0.0, 0.0));
        let after = clamp_particle(before, 2.0, 4.0, 0.1);
        assert_eq!(before, after);
    }

    #[test]
    fn test_clamp_all() {
        let mut ps = vec![particle((3.0, 1.0), (1.0, 0.0)), particle((1.0, 1.0), (1.0, 0.0))];
        clamp_to_walls(&mut ps, 2.0, 4.0, 0.0);
        assert_eq!(ps[0].position.x, 2.0);
        assert_eq!(ps[0].velocity.x, 0.0);
        assert_eq!(ps[1].velocity.x, 1.0);
    }
}
