//! Projection of a point cloud onto a scalar density grid.
//!
//! The grid is an axis-aligned rectangle of `cells_x × cells_y` square cells
//! of side `step`, centred on `center`. A point belongs to cell
//! `floor((point - start) / step)`; points outside the rectangle are dropped.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_positive, Result, SimError};
use crate::field::{in_bounds, Grid, ScalarField};

/// How a point's count is spread over the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stencil {
    /// +1 in the point's own cell.
    #[default]
    Single,
    /// 3×3 neighbourhood weighted 4 (centre), 2 (edges), 1 (corners).
    Weighted,
}

/// (dx, dy, weight) taps of the weighted stencil.
const WEIGHTED_TAPS: [(i64, i64, u32); 9] = [
    (0, 0, 4),
    (1, 0, 2),
    (-1, 0, 2),
    (0, 1, 2),
    (0, -1, 2),
    (1, 1, 1),
    (1, -1, 1),
    (-1, 1, 1),
    (-1, -1, 1),
];

/// Tolerance so an extent that is an exact multiple of the step is not rounded up a cell.
const COVER_EPS: f64 = 1e-9;

impl Stencil {
    /// Total weight one point deposits when the full stencil is in range.
    pub fn weight_total(self) -> u32 {
        match self {
            Stencil::Single => 1,
            Stencil::Weighted => 16,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DensityMapper {
    cells_x: usize,
    cells_y: usize,
    step: f64,
    center: DVec2,
    /// Points per cell that should map to a value of 1.
    expected_density: f64,
    stencil: Stencil,
}

impl DensityMapper {
    pub fn new(
        cells_x: usize,
        cells_y: usize,
        step: f64,
        center: DVec2,
        expected_density: f64,
        stencil: Stencil,
    ) -> Result<Self> {
        if cells_x == 0 || cells_y == 0 {
            return Err(SimError::InvalidResolution { cells_x, cells_y });
        }
        ensure_positive("cell step", step)?;
        ensure_positive("expected density", expected_density)?;
        ensure_finite("grid center x", center.x)?;
        ensure_finite("grid center y", center.y)?;
        Ok(Self { cells_x, cells_y, step, center, expected_density, stencil })
    }

    /// Mapper whose cells cover `[min, max]` plus `margin` extra cells on every side.
    pub fn covering(
        min: DVec2,
        max: DVec2,
        step: f64,
        margin: usize,
        expected_density: f64,
        stencil: Stencil,
    ) -> Result<Self> {
        ensure_positive("cell step", step)?;
        let extent = max - min;
        let cells_x = (extent.x / step - COVER_EPS).ceil().max(0.0) as usize + 2 * margin;
        let cells_y = (extent.y / step - COVER_EPS).ceil().max(0.0) as usize + 2 * margin;
        Self::new(cells_x, cells_y, step, (min + max) * 0.5, expected_density, stencil)
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.cells_x, self.cells_y)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn center(&self) -> DVec2 {
        self.center
    }

    pub fn expected_density(&self) -> f64 {
        self.expected_density
    }

    pub fn stencil(&self) -> Stencil {
        self.stencil
    }

    /// Bottom-left corner of the grid rectangle.
    pub fn start(&self) -> DVec2 {
        self.center - 0.5 * self.step * DVec2::new(self.cells_x as f64, self.cells_y as f64)
    }

    /// Top-right corner of the grid rectangle.
    pub fn end(&self) -> DVec2 {
        self.start() + self.step * DVec2::new(self.cells_x as f64, self.cells_y as f64)
    }

    /// Signed cell coordinates of a world point; may lie outside the grid.
    /// Non-finite coordinates saturate, so check [`Self::cell_of`] before trusting them.
    #[inline]
    pub fn pixel_of(&self, point: DVec2) -> (i64, i64) {
        let cell = ((point - self.start()) / self.step).floor();
        (cell.x as i64, cell.y as i64)
    }

    /// Cell of a world point, or `None` when it falls outside the grid or is not finite.
    #[inline]
    pub fn cell_of(&self, point: DVec2) -> Option<(usize, usize)> {
        if !point.is_finite() {
            return None;
        }
        let (x, y) = self.pixel_of(point);
        self.in_range(x, y).then_some((x as usize, y as usize))
    }

    #[inline]
    fn in_range(&self, x: i64, y: i64) -> bool {
        in_bounds(x, y, self.cells_x, self.cells_y)
    }

    /// Project points onto the grid and normalise by the expected density.
    pub fn map<I>(&self, points: I) -> ScalarField
    where
        I: IntoIterator<Item = DVec2>,
    {
        let mut counts: Grid<u32> = Grid::filled(self.cells_x, self.cells_y, 0);
        let mut deposit = |x: i64, y: i64, amount: u32| {
            if self.in_range(x, y) {
                let (x, y) = (x as usize, y as usize);
                counts.set(x, y, counts.get(x, y) + amount);
            }
        };

        for point in points {
            if !point.is_finite() {
                continue;
            }
            let (x, y) = self.pixel_of(point);
            match self.stencil {
                Stencil::Single => deposit(x, y, 1),
                Stencil::Weighted => {
                    for (dx, dy, w) in WEIGHTED_TAPS {
                        // Far-off points saturate at the i64 range.
                        if let (Some(tx), Some(ty)) = (x.checked_add(dx), y.checked_add(dy)) {
                            deposit(tx, ty, w);
                        }
                    }
                }
            }
        }

        let norm = self.expected_density * self.stencil.weight_total() as f64;
        let mut field = ScalarField::zeros(self.cells_x, self.cells_y);
        for (out, &count) in field.iter_mut().zip(counts.iter()) {
            *out = count as f64 / norm;
        }
        field
    }
}
