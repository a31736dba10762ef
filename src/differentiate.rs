//! Eight-neighbour finite-difference gradient of a scalar grid.
//!
//! Each cell sums the value delta to its Moore neighbours along the unit
//! direction to that neighbour; diagonal directions are `(±1, ±1) / √2`.
//! The result points from low to high values.

use std::f64::consts::FRAC_1_SQRT_2;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::field::{ScalarField, VectorField};

/// Value assumed for neighbours that fall outside the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutsideValue {
    /// One sentinel shared by every out-of-bounds lookup.
    Fixed(f64),
    /// The value of the cell being differentiated (zero-gradient boundary).
    #[default]
    Own,
}

/// Neighbour offsets paired with their unit directions.
const STENCIL: [(i64, i64, DVec2); 8] = [
    (1, 0, DVec2::new(1.0, 0.0)),
    (1, 1, DVec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2)),
    (0, 1, DVec2::new(0.0, 1.0)),
    (-1, 1, DVec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2)),
    (-1, 0, DVec2::new(-1.0, 0.0)),
    (-1, -1, DVec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2)),
    (0, -1, DVec2::new(0.0, -1.0)),
    (1, -1, DVec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2)),
];

/// Stateless apart from its boundary policy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldDifferentiator {
    pub outside: OutsideValue,
}

impl FieldDifferentiator {
    pub fn new(outside: OutsideValue) -> Self {
        Self { outside }
    }

    pub fn differentiate(&self, field: &ScalarField) -> VectorField {
        let (nx, ny) = field.shape();
        let mut out = VectorField::filled(nx, ny, DVec2::ZERO);

        for y in 0..ny {
            for x in 0..nx {
                let here = field.get(x, y);
                let fallback = match self.outside {
                    OutsideValue::Fixed(v) => v,
                    OutsideValue::Own => here,
                };
                let mut grad = DVec2::ZERO;
                for (dx, dy, dir) in STENCIL {
                    let there = field.try_get(x as i64 + dx, y as i64 + dy).unwrap_or(fallback);
                    grad += dir * (there - here);
                }
                out.set(x, y, grad);
            }
        }
        out
    }
}
