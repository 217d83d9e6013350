//! Doubled offset-row ("brick") hexagonal lattice.
//!
//! Flat-topped hexagons of height `h` have a circumradius (and side length)
//! `r = h / √3`. Neighbouring cells touch when columns are `1.5 r` apart and
//! rows `h / 2` apart, with alternate columns shifted by half a row. The
//! lattice uses doubled coordinates: a cell `(row, col)` exists only when
//! `row + col` is even.
//!
//! ```text
//!  col:   0     1     2     3
//! row 0   ⬡           ⬡
//! row 1         ⬡           ⬡
//! row 2   ⬡           ⬡
//! ```

use crate::error::{Error, Result};
use crate::math::vec2::Vec2;

/// Cell layout over a canvas of fixed size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexLattice {
    tile_height: f32,
    radius: f32,
    rows: usize,
    cols: usize,
}

impl HexLattice {
    /// Lays out enough cells to cover `canvas` with tiles of `tile_height`.
    pub fn new(tile_height: f32, canvas: (u32, u32)) -> Result<Self> {
        if !(tile_height > 0.0) || !tile_height.is_finite() {
            return Err(Error::InvalidGeometry(format!(
                "tile height must be positive, got {tile_height}"
            )));
        }
        if canvas.0 == 0 || canvas.1 == 0 {
            return Err(Error::InvalidGeometry(format!(
                "canvas {}x{} has zero area",
                canvas.0, canvas.1
            )));
        }
        let radius = tile_height / 3f32.sqrt();
        let cols = 1 + (canvas.0 as f32 * 2.0 / (3.0 * radius)).ceil() as usize;
        let rows = 1 + (canvas.1 as f32 * 2.0 / tile_height).ceil() as usize;
        log::debug!(
            "hex lattice: {rows} rows x {cols} cols, radius {radius:.2} over {}x{}",
            canvas.0,
            canvas.1
        );
        Ok(Self {
            tile_height,
            radius,
            rows,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Circumradius of a tile.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn tile_height(&self) -> f32 {
        self.tile_height
    }

    pub fn spacing(&self) -> Vec2 {
        Vec2::new(1.5 * self.radius, 0.5 * self.tile_height)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && (row + col) % 2 == 0
    }

    /// Pixel-space center of a cell.
    pub fn center(&self, row: usize, col: usize) -> Vec2 {
        let spacing = self.spacing();
        Vec2::new(col as f32 * spacing.x, row as f32 * spacing.y)
    }

    /// All cells in visiting order (row-major).
    ///
    /// Row 0 and column 0 are always visited before their wrap partners on
    /// the last row and column.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows).flat_map(move |row| ((row % 2)..self.cols).step_by(2).map(move |col| (row, col)))
    }

    /// The cell on row 0 / column 0 that a cell on the last row / column must
    /// copy to keep the plane seamless when repeated.
    ///
    /// Returns `None` for interior cells. The partner may not exist on the
    /// lattice when the canvas does not divide evenly; check with
    /// [`HexLattice::contains`].
    pub fn wrap_partner(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        let last_row = row + 1 == self.rows;
        let last_col = col + 1 == self.cols;
        match (last_row, last_col) {
            (true, true) => Some((0, 0)),
            (true, false) => Some((0, col)),
            (false, true) => Some((row, 0)),
            (false, false) => None,
        }
    }
}
