use std::io::Write;

use fluidbox::actions;
use fluidbox::config::{self, Config};
use fluidbox::solver::diagnostics;
use fluidbox::{FluidSolver, SimError, TickHook};
use log::{debug, error, info, warn};

struct Defaults;

impl Defaults {
    const LOG_FILTER: &'static str = "info";
    const PROGRESS_WIDTH: usize = 40;
}

/// Value following `flag` on the command line, if any.
fn parse_flag(flag: &str) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

fn load_config() -> fluidbox::Result<Config> {
    let mut cfg = match parse_flag("--config") {
        Some(path) => config::load_from(&path)?,
        None => config::load()?,
    };
    if let Some(seed) = parse_flag("--seed") {
        cfg.physics.seed = seed
            .parse()
            .map_err(|_| SimError::InvalidArgument(format!("--seed expects an unsigned integer, got {seed:?}")))?;
    }
    Ok(cfg)
}

fn build_solver(cfg: &Config) -> fluidbox::Result<FluidSolver> {
    let mut solver = FluidSolver::new(cfg.physics.clone())?;
    for region in &cfg.scene.fluid {
        let added = solver.seed_region(region.bl, region.tr);
        debug!("seeded {added} particles in {:?}..{:?}", region.bl, region.tr);
    }

    let mut hooks: Vec<TickHook> = Vec::new();
    if let Some(spawner) = cfg.scene.spawner {
        hooks.push(Box::new(actions::periodic_spawner(
            spawner.interval,
            spawner.region.bl,
            spawner.region.tr,
        )));
    }
    if let Some(drain) = cfg.scene.drain {
        hooks.push(Box::new(actions::drain(drain.bl, drain.tr)));
    }
    if !hooks.is_empty() {
        solver.set_tick_hook(actions::chain(hooks));
    }
    Ok(solver)
}

/// Redraws `[#####.....] NN%` on stderr when the percentage changes.
struct ProgressBar {
    last_percent: Option<usize>,
}

impl ProgressBar {
    fn new() -> Self {
        Self { last_percent: None }
    }

    fn update(&mut self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        let percent = (fraction * 100.0).round() as usize;
        if self.last_percent == Some(percent) {
            return;
        }
        self.last_percent = Some(percent);
        let filled = (fraction * Defaults::PROGRESS_WIDTH as f64).round() as usize;
        let bar = format!(
            "{}{}",
            "#".repeat(filled),
            ".".repeat(Defaults::PROGRESS_WIDTH - filled)
        );
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r[{bar}] {percent:3}%");
        let _ = stderr.flush();
    }

    fn finish(&self) {
        if self.last_percent.is_some() {
            eprintln!();
        }
    }
}

fn run() -> fluidbox::Result<()> {
    let cfg = load_config()?;
    let mut solver = build_solver(&cfg)?;
    info!(
        "{} particles in a {}x{} box, {} frames of {} steps (dt={})",
        solver.particle_count(),
        cfg.physics.width,
        cfg.physics.height,
        cfg.run.frame_count(),
        cfg.run.steps_per_frame,
        cfg.physics.dt
    );

    let mut progress = ProgressBar::new();
    let summary = cfg.run.run(
        &mut solver,
        |fraction| progress.update(fraction),
        |frame, s| {
            let particles = s.particles();
            debug!(
                "frame {frame}: t={:.3} n={} ke={:.4} max_speed={:.4}",
                s.simulation_time(),
                particles.len(),
                diagnostics::kinetic_energy(particles),
                diagnostics::max_speed(particles)
            );
        },
    );
    progress.finish();

    info!(
        "done: {} frames, {} steps, t={:.3}, {} particles",
        summary.frames,
        summary.steps,
        solver.simulation_time(),
        solver.particle_count()
    );
    if summary.escaped > 0 || summary.sanitized_cells > 0 || summary.degenerate_pairs > 0 {
        warn!(
            "anomalies: {} escapes, {} sanitized cells, {} degenerate pairs",
            summary.escaped, summary.sanitized_cells, summary.degenerate_pairs
        );
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(Defaults::LOG_FILTER)).init();
    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}
