//! Where tile pixels come from: fixed rasters or per-cell generators.

use std::fmt;

use crate::colors::{Color, TRANSPARENT};
use crate::math::vec2::Vec2;
use crate::raster::Raster;

/// Generator evaluated once per cell at the cell's fractional canvas
/// position, each coordinate in `[0, 1]`.
pub type TileGenerator = Box<dyn Fn(f32, f32) -> Raster>;

/// One tile variant handed to the tiler.
pub enum TileSource {
    /// The same raster for every cell.
    Fixed(Raster),
    /// A raster computed per cell, e.g. for a gradient across the plane.
    /// Every evaluation must produce the same dimensions.
    Generated(TileGenerator),
}

impl TileSource {
    pub fn generated(f: impl Fn(f32, f32) -> Raster + 'static) -> Self {
        TileSource::Generated(Box::new(f))
    }

    /// Resolves the raster for a cell at fractional position `(fx, fy)`.
    pub fn evaluate(&self, fx: f32, fy: f32) -> std::borrow::Cow<'_, Raster> {
        match self {
            TileSource::Fixed(raster) => std::borrow::Cow::Borrowed(raster),
            TileSource::Generated(f) => {
                std::borrow::Cow::Owned(f(fx.clamp(0.0, 1.0), fy.clamp(0.0, 1.0)))
            }
        }
    }
}

impl From<Raster> for TileSource {
    fn from(raster: Raster) -> Self {
        TileSource::Fixed(raster)
    }
}

impl fmt::Debug for TileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileSource::Fixed(r) => write!(f, "Fixed({}x{})", r.width(), r.height()),
            TileSource::Generated(_) => write!(f, "Generated(..)"),
        }
    }
}

//        2___1      ^
//       /     \     |
//     3/       \0   | h
//      \       /    |
//       \4___5/     v
//        <--->
//        side

/// Raster size of a flat-topped hexagonal tile of the given height.
pub fn hex_tile_size(height: u32) -> (u32, u32) {
    let side = height as f32 / 3f32.sqrt();
    ((side * 2.0).round() as u32, height)
}

/// The six vertices of a flat-topped hexagon of height `height`, numbered
/// anti-clockwise from the rightmost one.
pub fn hex_vertices(height: f32) -> [Vec2; 6] {
    let side = height / 3f32.sqrt();
    [
        Vec2::new(2.0 * side, height / 2.0),
        Vec2::new(side * 1.5, 0.0),
        Vec2::new(side / 2.0, 0.0),
        Vec2::new(0.0, height / 2.0),
        Vec2::new(side / 2.0, height),
        Vec2::new(side * 1.5, height),
    ]
}

/// A hexagon filled with a single color on a transparent background.
///
/// A pixel is filled when its center lies inside or on the hexagon.
pub fn solid_hex_tile(height: u32, color: Color) -> Raster {
    let (width, _) = hex_tile_size(height);
    // The rounded width shifts the hexagon to stay centered
    let shift = Vec2::new(width as f32 / 2.0 - height as f32 / 3f32.sqrt(), 0.0);
    let corners = hex_vertices(height as f32).map(|v| v + shift);
    Raster::from_fn(width, height, |x, y| {
        let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
        let inside = (0..6).all(|i| {
            let (a, b) = (corners[i], corners[(i + 1) % 6]);
            (b - a).cross(p - a) <= 0.0
        });
        if inside {
            color
        } else {
            TRANSPARENT
        }
    })
}
