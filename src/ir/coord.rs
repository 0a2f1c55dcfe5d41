//! Typed 2D points.

use std::marker::PhantomData;

/// A point tagged with its coordinate space.
///
/// `x` is the column axis and `y` the row axis. Scene files list points
/// row-first; use [`Coord::from_row_col`] when reading them so the axes are
/// swapped exactly once.
#[derive(Clone, Copy, PartialEq)]
pub struct Coord<TSpace> {
    pub x: f64,
    pub y: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> Coord<TSpace> {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }

    /// Builds a point from a `[row, col]` pair.
    #[inline]
    pub fn from_row_col(point: [f64; 2]) -> Self {
        Self::new(point[1], point[0])
    }
}

impl<TSpace> std::fmt::Debug for Coord<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coord")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}
