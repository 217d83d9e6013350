//! Render target for one projection pass.
//!
//! A [`RenderLayer`] owns a color raster plus a parallel depth buffer of the
//! same size. Depth is a `u8` code: the camera-space Z of each fragment,
//! remapped linearly over the Z range of the surface being rendered, so
//! `0` is nearest and [`DEPTH_EMPTY`] (255) marks a pixel nothing has been
//! written to. Alpha in the color raster is always plain opacity.
//!
//! Depth is only meaningful inside one pass. Once the pass is done, the layer
//! is merged onto a canvas with ordinary source-over blending and the depth
//! buffer is discarded.

use crate::colors::Color;
use crate::raster::Raster;

/// Depth code of a pixel no fragment has reached.
pub const DEPTH_EMPTY: u8 = 255;

/// Linear map from camera-space Z onto depth codes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthRange {
    z_min: f32,
    scale: f32,
}

impl DepthRange {
    pub fn new(z_min: f32, z_max: f32) -> Self {
        let span = z_max - z_min;
        // A flat range maps everything to the nearest code
        let scale = if span > f32::EPSILON && span.is_finite() {
            255.0 / span
        } else {
            0.0
        };
        Self { z_min, scale }
    }

    /// Range spanning the Z values of the given points.
    pub fn spanning(zs: impl IntoIterator<Item = f32>) -> Self {
        let (lo, hi) = zs
            .into_iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), z| (lo.min(z), hi.max(z)));
        if lo > hi {
            return Self::new(0.0, 0.0);
        }
        Self::new(lo, hi)
    }

    #[inline]
    pub fn encode(&self, z: f32) -> u8 {
        ((z - self.z_min) * self.scale).round().clamp(0.0, 255.0) as u8
    }
}

/// Color and depth buffers for one projection pass.
#[derive(Clone, Debug)]
pub struct RenderLayer {
    color: Raster,
    depth: Vec<u8>,
}

impl RenderLayer {
    /// A fully transparent, empty layer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            color: Raster::new(width, height),
            depth: vec![DEPTH_EMPTY; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.color.width()
    }

    pub fn height(&self) -> u32 {
        self.color.height()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width() as i32 && y >= 0 && y < self.height() as i32 {
            Some(y as usize * self.width() as usize + x as usize)
        } else {
            None
        }
    }

    /// Write a fragment without depth testing (single-layer surfaces).
    /// The stored pixel is opaque. Silently ignores out-of-bounds coordinates.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.depth[i] = 0;
            self.color.pixels_mut()[i] = color.with_alpha(255);
        }
    }

    /// Write a fragment with depth testing.
    ///
    /// The fragment wins only if its depth code is strictly smaller (closer)
    /// than what is stored. An opaque winner replaces the stored color; a
    /// translucent winner is blended over the farther color it covers. Written
    /// pixels are always opaque. Returns whether the fragment was written.
    #[inline]
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, depth: u8, color: Color) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        let stored = self.depth[i];
        if depth >= stored {
            return false;
        }
        let pixels = self.color.pixels_mut();
        pixels[i] = if stored == DEPTH_EMPTY {
            color.with_alpha(255)
        } else {
            color.over(pixels[i])
        };
        self.depth[i] = depth;
        true
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.color.get(x, y)
    }

    pub fn depth_at(&self, x: i32, y: i32) -> Option<u8> {
        self.index(x, y).map(|i| self.depth[i])
    }

    pub fn is_written(&self, x: i32, y: i32) -> bool {
        self.depth_at(x, y).is_some_and(|d| d != DEPTH_EMPTY)
    }

    pub fn written_count(&self) -> usize {
        self.depth.iter().filter(|&&d| d != DEPTH_EMPTY).count()
    }

    /// Unwritten pixels whose four neighbours were all written: pinholes
    /// left by undersampling a surface that should be continuous there.
    pub fn count_holes(&self) -> usize {
        let (w, h) = (self.width() as i32, self.height() as i32);
        let mut holes = 0;
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                if !self.is_written(x, y)
                    && self.is_written(x - 1, y)
                    && self.is_written(x + 1, y)
                    && self.is_written(x, y - 1)
                    && self.is_written(x, y + 1)
                {
                    holes += 1;
                }
            }
        }
        holes
    }

    /// Finishes the pass: drops the depth buffer and returns the colors.
    ///
    /// Written pixels are opaque and unwritten ones transparent, so
    /// compositing the result leaves the canvas untouched only where nothing
    /// was drawn.
    pub fn resolve(self) -> Raster {
        self.color
    }

    /// Source-over merge of this layer onto `canvas`, top-left at `offset`.
    pub fn composite_onto(&self, canvas: &mut Raster, offset: (i32, i32)) {
        canvas.blit(&self.color, offset.0, offset.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{BLACK, TRANSPARENT, WHITE};

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    #[test]
    fn depth_range_encoding() {
        let range = DepthRange::new(10.0, 20.0);
        assert_eq!(range.encode(10.0), 0);
        assert_eq!(range.encode(20.0), 255);
        assert_eq!(range.encode(15.0), 128);
        assert_eq!(range.encode(-5.0), 0);
        assert_eq!(range.encode(99.0), 255);
        assert_eq!(DepthRange::new(3.0, 3.0).encode(3.0), 0);
        assert_eq!(DepthRange::spanning([4.0, 2.0, 12.0]), DepthRange::new(2.0, 12.0));
    }

    #[test]
    fn nearest_fragment_wins_either_order() {
        let mut layer = RenderLayer::new(2, 1);
        assert!(layer.set_pixel_with_depth(0, 0, 200, BLUE));
        assert!(layer.set_pixel_with_depth(0, 0, 10, RED));
        assert!(layer.set_pixel_with_depth(1, 0, 10, RED));
        assert!(!layer.set_pixel_with_depth(1, 0, 200, BLUE));
        assert_eq!(layer.get_pixel(0, 0), Some(RED));
        assert_eq!(layer.get_pixel(1, 0), Some(RED));
        assert_eq!(layer.depth_at(0, 0), Some(10));

        let mut canvas = Raster::filled(2, 1, WHITE);
        layer.composite_onto(&mut canvas, (0, 0));
        assert_eq!(canvas.get(0, 0), Some(RED));
        assert_eq!(canvas.get(0, 0).unwrap().a, 255);
    }

    #[test]
    fn farthest_code_never_writes() {
        let mut layer = RenderLayer::new(1, 1);
        assert!(!layer.set_pixel_with_depth(0, 0, DEPTH_EMPTY, RED));
        assert!(!layer.is_written(0, 0));
    }

    #[test]
    fn translucent_fragment_blends_with_farther_color() {
        let mut layer = RenderLayer::new(1, 1);
        layer.set_pixel_with_depth(0, 0, 100, BLACK);
        layer.set_pixel_with_depth(0, 0, 50, Color::rgba(255, 255, 255, 128));
        let c = layer.get_pixel(0, 0).unwrap();
        assert_eq!(c.a, 255);
        assert_eq!(c.r, 128);
        assert_eq!(layer.depth_at(0, 0), Some(50));
    }

    #[test]
    fn translucent_fragments_end_opaque() {
        let glass = Color::rgba(40, 80, 120, 100);
        let mut layer = RenderLayer::new(2, 1);
        assert!(layer.set_pixel_with_depth(0, 0, 30, glass));
        layer.set_pixel(1, 0, glass);
        let resolved = layer.resolve();
        assert_eq!(resolved.get(0, 0), Some(Color::rgb(40, 80, 120)));
        assert_eq!(resolved.get(1, 0), Some(Color::rgb(40, 80, 120)));
    }

    #[test]
    fn unwritten_pixels_leave_canvas_alone() {
        let mut layer = RenderLayer::new(3, 3);
        layer.set_pixel(1, 1, RED);
        let mut canvas = Raster::filled(5, 5, BLUE);
        layer.composite_onto(&mut canvas, (1, 1));
        assert_eq!(canvas.get(2, 2), Some(RED));
        let blue = canvas.pixels().iter().filter(|c| **c == BLUE).count();
        assert_eq!(blue, 24);
        assert_eq!(layer.resolve().get(0, 0), Some(TRANSPARENT));
    }

    #[test]
    fn holes_are_surrounded_gaps() {
        let mut layer = RenderLayer::new(5, 5);
        for y in 0..5 {
            for x in 0..5 {
                if (x, y) != (2, 2) && (x, y) != (0, 0) {
                    layer.set_pixel(x, y, RED);
                }
            }
        }
        // (0, 0) is on the border and does not count
        assert_eq!(layer.count_holes(), 1);
        assert_eq!(layer.written_count(), 23);
    }
}
