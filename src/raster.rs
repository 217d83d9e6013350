//! Rectangular RGBA8 pixel grid.
//!
//! [`Raster`] is the currency of the whole crate: tiles, planes, render layers
//! and the accumulator canvas are all rasters. Pixels are straight-alpha
//! [`Color`] values stored row-major with a top-left origin.

use std::path::Path;

use image::imageops::FilterType;
use image::RgbaImage;

use crate::colors::{Color, TRANSPARENT};
use crate::error::{Error, Result};

/// A rectangular grid of RGBA pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    data: Vec<Color>, // Row-major, index = y * width + x
    width: u32,
    height: u32,
}

impl Raster {
    /// Creates a fully transparent raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    /// Creates a raster with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            data: vec![color; (width as usize) * (height as usize)],
            width,
            height,
        }
    }

    /// Builds a raster by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Color) -> Self {
        let mut data = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Wraps an existing pixel buffer, checking that its length matches.
    pub fn from_pixels(width: u32, height: u32, data: Vec<Color>) -> Result<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return Err(Error::InvalidGeometry(format!(
                "pixel buffer of length {} cannot back a {}x{} raster",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Load a raster from an image file (PNG, JPG, etc.)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path)?.to_rgba8();
        Ok(Self::from(img))
    }

    /// Save the raster; the format follows the file extension.
    ///
    /// Formats without an alpha channel (JPEG) receive the RGB channels only.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let is_jpeg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
        let img = self.to_rgba_image();
        if is_jpeg {
            image::DynamicImage::ImageRgba8(img).to_rgb8().save(path)?;
        } else {
            img.save(path)?;
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.data
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.data[i])
    }

    /// Set a pixel. Silently ignores out-of-bounds coordinates.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = color;
        }
    }

    /// Nearest-neighbour sample with repeat wrapping on both axes.
    ///
    /// `u` and `v` are continuous pixel coordinates; the texel whose area
    /// contains `(u + 0.5, v + 0.5)` modulo the raster size is returned, so
    /// the plane behaves as an infinite periodic texture.
    #[inline]
    pub fn sample_wrapped(&self, u: f32, v: f32) -> Color {
        if self.is_empty() {
            return TRANSPARENT;
        }
        // rem_euclid handles negative values correctly, unlike %
        let x = ((0.5 + u).rem_euclid(self.width as f32) as u32).min(self.width - 1);
        let y = ((0.5 + v).rem_euclid(self.height as f32) as u32).min(self.height - 1);
        self.data[(y * self.width + x) as usize]
    }

    /// Fills every pixel whose center lies within `radius` of `(cx, cy)`.
    pub fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        let r2 = radius * radius;
        let min_y = ((cy - radius).floor() as i32).max(0);
        let max_y = ((cy + radius).ceil() as i32).min(self.height as i32 - 1);
        let min_x = ((cx - radius).floor() as i32).max(0);
        let max_x = ((cx + radius).ceil() as i32).min(self.width as i32 - 1);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.set(x, y, color);
                }
            }
        }
    }

    /// Draws `src` over `self` with its top-left corner at `(x, y)`.
    ///
    /// Uses source-over blending; fully transparent source pixels leave the
    /// destination untouched. Parts of `src` falling outside are clipped.
    pub fn blit(&mut self, src: &Raster, x: i32, y: i32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + src.width as i32).min(self.width as i32);
        let y1 = (y + src.height as i32).min(self.height as i32);
        for dy in y0..y1 {
            for dx in x0..x1 {
                let s = src.data[((dy - y) as u32 * src.width + (dx - x) as u32) as usize];
                if s.is_transparent() {
                    continue;
                }
                let i = dy as usize * self.width as usize + dx as usize;
                self.data[i] = s.over(self.data[i]);
            }
        }
    }

    /// Draws `src` centered on `(cx, cy)`.
    pub fn blit_centered(&mut self, src: &Raster, cx: f32, cy: f32) {
        self.blit(
            src,
            (cx - src.width as f32 / 2.0).round() as i32,
            (cy - src.height as f32 / 2.0).round() as i32,
        );
    }

    /// Mirror image about the vertical axis.
    pub fn flipped_horizontal(&self) -> Raster {
        Raster::from_fn(self.width, self.height, |x, y| {
            self.data[(y * self.width + (self.width - 1 - x)) as usize]
        })
    }

    /// Rotates counter-clockwise (as seen on screen) by `degrees`.
    ///
    /// The result is sized to the rotated bounding box; pixels that map
    /// outside the source are transparent. Uses nearest-neighbour inverse
    /// mapping, so rotations by multiples of 90° are exact.
    pub fn rotated(&self, degrees: f32) -> Raster {
        let angle = degrees.to_radians();
        let (sin, cos) = angle.sin_cos();
        let (w, h) = (self.width as f32, self.height as f32);

        // Shave float noise so that 90° turns don't grow by a pixel
        let out_w = ((w * cos.abs() + h * sin.abs()) - 1e-3).ceil().max(0.0) as u32;
        let out_h = ((w * sin.abs() + h * cos.abs()) - 1e-3).ceil().max(0.0) as u32;

        let (half_w, half_h) = (w / 2.0, h / 2.0);
        let (out_half_w, out_half_h) = (out_w as f32 / 2.0, out_h as f32 / 2.0);

        Raster::from_fn(out_w, out_h, |x, y| {
            let dx = x as f32 + 0.5 - out_half_w;
            let dy = y as f32 + 0.5 - out_half_h;
            // Inverse of the y-down counter-clockwise rotation
            let sx = dx * cos - dy * sin + half_w;
            let sy = dx * sin + dy * cos + half_h;
            self.get(sx.floor() as i32, sy.floor() as i32)
                .unwrap_or(TRANSPARENT)
        })
    }

    /// Smoothly rescales by `factor`; a factor of 1 returns a plain copy.
    pub fn scaled(&self, factor: f32) -> Result<Raster> {
        if !(factor > 0.0) || !factor.is_finite() {
            return Err(Error::InvalidGeometry(format!(
                "scale factor must be positive, got {factor}"
            )));
        }
        if (factor - 1.0).abs() < f32::EPSILON {
            return Ok(self.clone());
        }
        let w = ((self.width as f32 * factor).round() as u32).max(1);
        let h = ((self.height as f32 * factor).round() as u32).max(1);
        let resized = image::imageops::resize(&self.to_rgba_image(), w, h, FilterType::Triangle);
        Ok(Raster::from(resized))
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        let bytes: Vec<u8> = self
            .data
            .iter()
            .flat_map(|&c| <[u8; 4]>::from(c))
            .collect();
        RgbaImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

impl From<RgbaImage> for Raster {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let data = img.pixels().map(|p| Color::from(p.0)).collect();
        Self {
            data,
            width,
            height,
        }
    }
}
