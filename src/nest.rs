//! Nested spheres.
//!
//! A nest is a stack of sphere projections drawn back to front on one
//! canvas. Layer `i` has radius `R · shrinkⁱ` and shadow amount
//! `base_shadow · growthⁱ`; the outermost index is drawn first and the
//! terminal layer `i = 0` (full radius, base shadow, plane centered) last.
//! Inner layers only show where the layers in front of them have transparent
//! texels, so the planes are usually tilings with a transparent background.
//!
//! ```text
//!   canvas 2R x 2R: background, then an opaque backdrop disc
//!   i = n-1 .. 1:   random plane center, radius R·shrinkⁱ, centered on canvas
//!   i = 0:          plane center, radius R, drawn last
//! ```

use log::{debug, info};
use rand::Rng;
use serde::Deserialize;

use crate::colors::{Color, BLACK, WHITE};
use crate::error::{Error, Result};
use crate::light::AttachedShadow;
use crate::math::vec2::Vec2;
use crate::progress::Progress;
use crate::raster::Raster;
use crate::render::sphere::SphereProjector;

/// Layer stack parameters. Ranges are not validated: a shrink factor of 1 or
/// more grows the inner layers past the canvas, where only their central
/// `2R` window is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NestOptions {
    pub layer_count: usize,
    pub shrink_factor: f32,
    pub base_shadow: f32,
    pub shadow_growth: f32,
    /// Fill outside the outermost disc.
    pub background: Color,
    /// Fill inside the disc, seen through every layer's transparent texels.
    pub backdrop: Color,
    pub shadow: AttachedShadow,
}

impl Default for NestOptions {
    fn default() -> Self {
        Self {
            layer_count: 3,
            shrink_factor: 0.8,
            base_shadow: 0.3,
            shadow_growth: 1.0,
            background: WHITE,
            backdrop: BLACK,
            shadow: AttachedShadow::default(),
        }
    }
}

/// Supplies the plane projected at each layer index.
pub trait PlaneSource {
    /// The plane for layer `index`, or `None` when there is no plane at all.
    fn plane(&self, index: usize) -> Option<&Raster>;
}

/// The same plane on every layer.
impl PlaneSource for Raster {
    fn plane(&self, _index: usize) -> Option<&Raster> {
        Some(self)
    }
}

/// One plane per layer; layers past the end reuse the last plane.
impl PlaneSource for [Raster] {
    fn plane(&self, index: usize) -> Option<&Raster> {
        self.get(index).or_else(|| self.last())
    }
}

impl PlaneSource for Vec<Raster> {
    fn plane(&self, index: usize) -> Option<&Raster> {
        self.as_slice().plane(index)
    }
}

/// Largest sphere radius handled; keeps pixel offsets within `i32`.
const MAX_RADIUS: u32 = i32::MAX as u32 / 2;

/// Uniform center at least `margin` away from every plane edge, or the plane
/// center along an axis too short for the margin.
fn random_center<R: Rng + ?Sized>(plane: &Raster, margin: f32, rng: &mut R) -> Vec2 {
    let mut pick = |extent: f32| {
        if extent > 2.0 * margin {
            rng.gen_range(margin..extent - margin)
        } else {
            extent / 2.0
        }
    };
    let x = pick(plane.width() as f32);
    let y = pick(plane.height() as f32);
    Vec2::new(x, y)
}

/// Renders a nest of `options.layer_count` spheres with outer radius
/// `radius` into a new `2·radius` square canvas.
///
/// # Arguments
/// * `planes` - A single [`Raster`] for every layer, or one per layer
/// * `radius` - Radius of the terminal (front) sphere
/// * `rng` - Source of the inner layers' plane centers
/// * `progress` - Receives the completion fraction over all layers
///
/// # Errors
///
/// [`Error::InvalidGeometry`] for a zero or oversized radius or when `planes`
/// is empty.
pub fn build_nest<P, R>(
    planes: &P,
    radius: u32,
    options: &NestOptions,
    rng: &mut R,
    progress: &mut impl Progress,
) -> Result<Raster>
where
    P: PlaneSource + ?Sized,
    R: Rng + ?Sized,
{
    if radius == 0 || radius > MAX_RADIUS {
        return Err(Error::InvalidGeometry(format!(
            "nest radius must be in 1..={MAX_RADIUS}, got {radius}"
        )));
    }
    let size = 2 * radius;
    info!(
        "building nest of {} layer(s), radius {}",
        options.layer_count.max(1),
        radius
    );

    let mut canvas = Raster::filled(size, size, options.background);
    canvas.fill_disc(radius as f32, radius as f32, radius as f32, options.backdrop);

    let total = options.layer_count.max(1) as f32;
    let mut done = 0.0;

    // ─── Inner layers, back to front ───
    for i in (1..options.layer_count).rev() {
        let plane = planes
            .plane(i)
            .ok_or_else(|| Error::InvalidGeometry("no plane to project".into()))?;
        let scaled = f64::from(radius) * f64::from(options.shrink_factor).powi(i as i32);
        let layer_radius = scaled.round().min(f64::from(MAX_RADIUS)) as u32;
        if layer_radius == 0 {
            debug!("layer {i} shrinks to nothing, skipped");
            done += 1.0;
            continue;
        }
        let shadow = options.base_shadow * options.shadow_growth.powi(i as i32);
        // The rim samples the plane 2r away from the chosen center
        let center = random_center(plane, 2.0 * layer_radius as f32, rng);
        debug!(
            "layer {i}: radius {layer_radius}, shadow {shadow:.3}, plane center ({:.1}, {:.1})",
            center.x, center.y
        );

        let mut scoped = |f: f32| progress.report((done + f) / total);
        // Only the part under the canvas is ever visible
        let visible = layer_radius.min(radius);
        let layer = SphereProjector::new(layer_radius, shadow)
            .with_center(center)
            .with_shadow(options.shadow)
            .project_window(plane, 2 * visible, &mut scoped)?;
        let offset = (radius - visible) as i32;
        layer.composite_onto(&mut canvas, (offset, offset));
        done += 1.0;
    }

    // ─── Terminal layer ───
    let plane = planes
        .plane(0)
        .ok_or_else(|| Error::InvalidGeometry("no plane to project".into()))?;
    let mut scoped = |f: f32| progress.report((done + f) / total);
    let layer = SphereProjector::new(radius, options.base_shadow)
        .with_shadow(options.shadow)
        .project(plane, &mut scoped)?;
    layer.composite_onto(&mut canvas, (0, 0));

    Ok(canvas)
}
