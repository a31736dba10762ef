use glam::DVec2;

/// Dense 2D grid stored row-major, addressed as `(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    nx: usize,
    ny: usize,
    data: Vec<T>,
}

/// Scalar density/pressure field.
pub type ScalarField = Grid<f64>;

/// Discrete gradient of a scalar field.
pub type VectorField = Grid<DVec2>;

/// Flat index for in-bounds coordinates.
#[inline(always)]
pub const fn idx(x: usize, y: usize, nx: usize) -> usize {
    y * nx + x
}

/// Whether signed coordinates fall inside an `nx × ny` grid.
#[inline]
pub fn in_bounds(x: i64, y: i64, nx: usize, ny: usize) -> bool {
    x >= 0 && y >= 0 && (x as usize) < nx && (y as usize) < ny
}

impl<T: Copy> Grid<T> {
    pub fn filled(nx: usize, ny: usize, value: T) -> Self {
        Self { nx, ny, data: vec![value; nx * ny] }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        in_bounds(x, y, self.nx, self.ny)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[idx(x, y, self.nx)]
    }

    /// Value at signed coordinates, or `None` outside the grid.
    #[inline]
    pub fn try_get(&self, x: i64, y: i64) -> Option<T> {
        if self.contains(x, y) {
            Some(self.data[idx(x as usize, y as usize, self.nx)])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.data[idx(x, y, self.nx)] = value;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }
}

impl ScalarField {
    pub fn zeros(nx: usize, ny: usize) -> Self {
        Self::filled(nx, ny, 0.0)
    }

    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_layout() {
        let mut g = ScalarField::zeros(3, 2);
        g.set(2, 1, 5.0);
        assert_eq!(g.as_slice()[idx(2, 1, 3)], 5.0);
        assert_eq!(g.as_slice()[5], 5.0);
        assert_eq!(g.get(2, 1), 5.0);
    }

    #[test]
    fn test_try_get_bounds() {
        let g = ScalarField::filled(4, 3, 1.0);
        assert_eq!(g.try_get(0, 0), Some(1.0));
        assert_eq!(g.try_get(3, 2), Some(1.0));
        assert_eq!(g.try_get(-1, 0), None);
        assert_eq!(g.try_get(4, 0), None);
        assert_eq!(g.try_get(0, 3), None);
    }

    #[test]
    fn test_contains_matches_in_bounds() {
        let g = ScalarField::zeros(4, 3);
        for y in -2..5 {
            for x in -2..6 {
                assert_eq!(g.contains(x, y), in_bounds(x, y, 4, 3), "({x}, {y})");
            }
        }
        assert!(in_bounds(3, 2, 4, 3));
        assert!(!in_bounds(4, 0, 4, 3));
        assert!(!in_bounds(i64::MIN, 0, 4, 3));
    }

    #[test]
    fn test_scalar_helpers() {
        let mut g = ScalarField::zeros(2, 2);
        g.set(0, 1, 3.0);
        g.set(1, 1, -1.0);
        assert_eq!(g.max_value(), 3.0);
        assert_eq!(g.sum(), 2.0);
        assert_eq!(g.shape(), (2, 2));
    }
}
