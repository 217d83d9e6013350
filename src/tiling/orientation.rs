//! Tile orientations: the twelve symmetries of a regular hexagon.
//!
//! An [`Orientation`] is an element of the dihedral group D6, stored as the
//! signed code used throughout the tiler:
//!
//! | code      | transform                                   |
//! |-----------|---------------------------------------------|
//! | `0..=5`   | rotate by `code * 60°`                      |
//! | `-5..=-1` | flip horizontally, then rotate `|code| * 60°` |
//! | `-6`      | flip horizontally (rotation of 360°)        |
//!
//! Rotations are counter-clockwise as seen on screen (y axis pointing down).

use rand::Rng;

use crate::raster::Raster;

/// One of the 12 hexagon symmetries (6 rotations x optional reflection).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Orientation {
    code: i8,
}

/// A 2x2 linear map acting on y-down screen coordinates.
pub type Mat2 = [[f32; 2]; 2];

impl Orientation {
    pub const IDENTITY: Self = Self { code: 0 };

    /// Every orientation, in code order `-6..6`.
    pub const ALL: [Self; 12] = {
        let mut all = [Self::IDENTITY; 12];
        let mut i = 0;
        while i < 12 {
            all[i] = Self {
                code: i as i8 - 6,
            };
            i += 1;
        }
        all
    };

    /// Decodes a signed code; `None` outside `[-6, 6)`.
    pub fn from_code(code: i32) -> Option<Self> {
        (-6..6).contains(&code).then_some(Self { code: code as i8 })
    }

    fn from_parts(steps: i32, reflected: bool) -> Self {
        let steps = steps.rem_euclid(6) as i8;
        let code = match (reflected, steps) {
            (false, k) => k,
            (true, 0) => -6,
            (true, k) => -k,
        };
        Self { code }
    }

    /// Uniform choice among all twelve codes.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            code: rng.gen_range(-6..6),
        }
    }

    pub fn code(self) -> i32 {
        self.code as i32
    }

    pub fn is_reflected(self) -> bool {
        self.code < 0
    }

    /// Number of 60° counter-clockwise steps, in `0..6`.
    pub fn rotation_steps(self) -> u8 {
        self.code.unsigned_abs() % 6
    }

    pub fn degrees(self) -> f32 {
        self.rotation_steps() as f32 * 60.0
    }

    /// `self` applied first, then `next`.
    pub fn then(self, next: Orientation) -> Orientation {
        // flip . rotate(k) = rotate(-k) . flip
        let carried = if next.is_reflected() {
            -(self.rotation_steps() as i32)
        } else {
            self.rotation_steps() as i32
        };
        Self::from_parts(
            next.rotation_steps() as i32 + carried,
            self.is_reflected() ^ next.is_reflected(),
        )
    }

    pub fn inverse(self) -> Orientation {
        if self.is_reflected() {
            // Every reflection is its own inverse
            self
        } else {
            Self::from_parts(-(self.rotation_steps() as i32), false)
        }
    }

    /// The transform as a matrix on y-down screen coordinates.
    pub fn matrix(self) -> Mat2 {
        let (s, c) = self.degrees().to_radians().sin_cos();
        let rotate = [[c, s], [-s, c]];
        if self.is_reflected() {
            mat2_mul(rotate, FLIP)
        } else {
            rotate
        }
    }

    /// Applies the transform to a tile raster.
    ///
    /// The tile is flipped first (for reflected codes) and then rotated into
    /// an expanded bounding box, ready to be blitted centered on its cell.
    pub fn apply(self, tile: &Raster) -> Raster {
        let flipped;
        let source = if self.is_reflected() {
            flipped = tile.flipped_horizontal();
            &flipped
        } else {
            tile
        };
        match self.rotation_steps() {
            0 => source.clone(),
            _ => source.rotated(self.degrees()),
        }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Horizontal mirror.
pub const FLIP: Mat2 = [[-1.0, 0.0], [0.0, 1.0]];

pub fn mat2_mul(a: Mat2, b: Mat2) -> Mat2 {
    let mut out = [[0.0; 2]; 2];
    for (row, out_row) in out.iter_mut().enumerate() {
        for (col, cell) in out_row.iter_mut().enumerate() {
            *cell = a[row][0] * b[0][col] + a[row][1] * b[1][col];
        }
    }
    out
}
