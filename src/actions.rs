//! Ready-made tick hooks for driving fluid in and out between steps.

use glam::DVec2;
use log::{debug, trace};

use crate::solver::{FluidSolver, TickHook};

/// Seed `[bl, tr]` on the first tick and again whenever more than
/// `interval` simulated seconds have passed since the last spawn.
pub fn periodic_spawner(interval: f64, bl: DVec2, tr: DVec2) -> impl FnMut(&mut FluidSolver) {
    let mut last_spawn: Option<f64> = None;
    move |solver| {
        let t = solver.simulation_time();
        if last_spawn.map_or(true, |last| t > last + interval) {
            last_spawn = Some(t);
            let added = solver.seed_region(bl, tr);
            debug!("spawned {added} particles at t={t:.3}");
        }
    }
}

/// Remove everything inside `[bl, tr]` after every tick.
pub fn drain(bl: DVec2, tr: DVec2) -> impl FnMut(&mut FluidSolver) {
    move |solver| {
        let removed = solver.clear_region(bl, tr);
        if removed > 0 {
            trace!("drained {removed} particles");
        }
    }
}

/// Run several hooks in order as one.
pub fn chain(mut hooks: Vec<TickHook>) -> impl FnMut(&mut FluidSolver) {
    move |solver| {
        for hook in hooks.iter_mut() {
            hook(solver);
        }
    }
}
