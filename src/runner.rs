use serde::{Deserialize, Serialize};

use crate::solver::{FluidSolver, StepStats};

/// Fixed-length frame loop: `steps_per_frame` solver steps per output frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Runner {
    /// Simulated seconds of output.
    pub duration: f64,
    pub fps: u32,
    pub steps_per_frame: u32,
}

impl Default for Runner {
    fn default() -> Self {
        Self { duration: 5.0, fps: 30, steps_per_frame: 4 }
    }
}

/// Totals accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub steps: usize,
    pub escaped: usize,
    pub sanitized_cells: usize,
    pub degenerate_pairs: usize,
}

impl RunSummary {
    fn absorb(&mut self, stats: StepStats) {
        self.steps += 1;
        self.escaped += stats.escaped;
        self.sanitized_cells += stats.sanitized_cells;
        self.degenerate_pairs += stats.degenerate_pairs;
    }
}

impl Runner {
    pub fn frame_count(&self) -> usize {
        (self.duration * self.fps as f64).max(0.0).floor() as usize
    }

    pub fn total_steps(&self) -> usize {
        self.frame_count() * self.steps_per_frame as usize
    }

    /// Timestep that makes one output second equal one simulated second.
    pub fn realtime_dt(&self) -> Option<f64> {
        let steps_per_second = self.fps as f64 * self.steps_per_frame as f64;
        (steps_per_second > 0.0).then(|| 1.0 / steps_per_second)
    }

    /// Drive `solver` for every frame. `on_progress` receives the completed
    /// fraction after each step; `on_frame` sees the solver after each frame.
    pub fn run<P, F>(&self, solver: &mut FluidSolver, mut on_progress: P, mut on_frame: F) -> RunSummary
    where
        P: FnMut(f64),
        F: FnMut(usize, &FluidSolver),
    {
        let total = self.total_steps();
        let mut summary = RunSummary::default();
        for frame in 0..self.frame_count() {
            for _ in 0..self.steps_per_frame {
                summary.absorb(solver.step());
                on_progress(summary.steps as f64 / total as f64);
            }
            on_frame(frame, solver);
            summary.frames += 1;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverParams;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_values() {
        let r = Runner::default();
        assert_eq!(r.fps, 30);
        assert_eq!(r.steps_per_frame, 4);
        assert_eq!(r.frame_count(), 150);
        assert_eq!(r.total_steps(), 600);
        assert_relative_eq!(r.realtime_dt().unwrap(), 1.0 / 120.0);
    }

    #[test]
    fn test_zero_fps_has_no_frames() {
        let r = Runner { fps: 0, ..Runner::default() };
        assert_eq!(r.frame_count(), 0);
        assert!(r.realtime_dt().is_none());
    }

    #[test]
    fn test_run_reports_progress_and_frames() {
        let mut solver = FluidSolver::new(SolverParams::default()).unwrap();
        let runner = Runner { duration: 0.5, fps: 10, steps_per_frame: 3 };
        let mut progress = Vec::new();
        let mut frames = Vec::new();
        let summary = runner.run(&mut solver, |p| progress.push(p), |i, s| frames.push((i, s.steps())));
        assert_eq!(summary.frames, 5);
        assert_eq!(summary.steps, 15);
        assert_eq!(progress.len(), 15);
        assert_relative_eq!(*progress.last().unwrap(), 1.0);
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(frames, vec![(0, 3), (1, 6), (2, 9), (3, 12), (4, 15)]);
    }
}
