//! Stereographic sphere projection.
//!
//! Renders a plane wrapped around a sphere into a `2R x 2R` layer, one output
//! pixel at a time. A sphere never occludes itself from this viewpoint, so
//! fragments are written without depth testing.

use log::{debug, info};
use serde::Deserialize;

use crate::error::Result;
use crate::light::AttachedShadow;
use crate::math::vec2::Vec2;
use crate::progress::Progress;
use crate::raster::Raster;
use crate::render::layer::RenderLayer;
use crate::surface::StereographicSphere;

/// Sphere settings as read from the `[sphere]` config section.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub radius: u32,
    pub shadow_amount: f32,
    /// Plane point shown at the disc center; the plane center when unset.
    pub center: Option<[f32; 2]>,
    pub center_z: Option<f32>,
    pub shadow: AttachedShadow,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: 1200,
            shadow_amount: 0.3,
            center: None,
            center_z: None,
            shadow: AttachedShadow::default(),
        }
    }
}

/// Projects planes onto a sphere of fixed radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereProjector {
    radius: u32,
    shadow_amount: f32,
    center: Option<Vec2>,
    center_z: Option<f32>,
    shadow: AttachedShadow,
}

impl SphereProjector {
    pub fn new(radius: u32, shadow_amount: f32) -> Self {
        Self {
            radius,
            shadow_amount,
            center: None,
            center_z: None,
            shadow: AttachedShadow::default(),
        }
    }

    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_center_z(mut self, center_z: f32) -> Self {
        self.center_z = Some(center_z);
        self
    }

    pub fn with_shadow(mut self, shadow: AttachedShadow) -> Self {
        self.shadow = shadow;
        self
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Side length of the full layer.
    pub fn output_size(&self) -> u32 {
        self.radius.saturating_mul(2)
    }

    /// Renders `plane` onto the sphere.
    ///
    /// Pixels outside the disc and pixels whose source texel is transparent
    /// are left unwritten. `progress` receives one report per output row.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGeometry`](crate::error::Error::InvalidGeometry) for a
    /// zero radius or an empty plane.
    pub fn project(&self, plane: &Raster, progress: &mut impl Progress) -> Result<RenderLayer> {
        self.project_window(plane, self.output_size(), progress)
    }

    /// Renders only the centered `side x side` window of the full layer.
    ///
    /// Pixel `(x, y)` of the result sits `(x - side / 2, y - side / 2)` from
    /// the disc center. `side` is capped at [`output_size`](Self::output_size),
    /// so a sphere much larger than the window costs no more than the window.
    ///
    /// # Errors
    ///
    /// Same as [`project`](Self::project).
    pub fn project_window(
        &self,
        plane: &Raster,
        side: u32,
        progress: &mut impl Progress,
    ) -> Result<RenderLayer> {
        let sphere = StereographicSphere::new(
            self.radius as f32,
            plane.dimensions(),
            self.center,
            self.center_z,
        )?;
        let size = side.min(self.output_size());
        info!(
            "projecting {}x{} plane onto sphere of radius {}, {}x{} window",
            plane.width(),
            plane.height(),
            self.radius,
            size,
            size
        );
        debug!(
            "sphere center {:?}, shadow amount {}",
            sphere.center(),
            self.shadow_amount
        );

        let half = i64::from(size / 2);
        let mut layer = RenderLayer::new(size, size);
        for y in 0..size {
            let dy = (i64::from(y) - half) as f32;
            for x in 0..size {
                let dx = (i64::from(x) - half) as f32;
                let Some(sample) = sphere.unproject(dx, dy) else {
                    continue;
                };
                let texel = plane.sample_wrapped(sample.point.uv.x, sample.point.uv.y);
                if texel.is_transparent() {
                    continue;
                }
                let color = self.shadow.shade(
                    texel,
                    sample.latitude,
                    sample.longitude,
                    self.shadow_amount,
                );
                layer.set_pixel(x as i32, y as i32, color);
            }
            progress.report((y + 1) as f32 / size as f32);
        }

        info!("sphere pass wrote {} pixels", layer.written_count());
        Ok(layer)
    }
}

impl From<&SphereConfig> for SphereProjector {
    fn from(config: &SphereConfig) -> Self {
        let mut projector =
            SphereProjector::new(config.radius, config.shadow_amount).with_shadow(config.shadow);
        if let Some([x, y]) = config.center {
            projector = projector.with_center(Vec2::new(x, y));
        }
        if let Some(center_z) = config.center_z {
            projector = projector.with_center_z(center_z);
        }
        projector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{Color, TRANSPARENT};
    use crate::progress::NoProgress;

    const TEAL: Color = Color::rgb(20, 160, 150);

    fn inside_disc(x: i32, y: i32, r: i32) -> bool {
        let (dx, dy) = (x - r, y - r);
        dx * dx + dy * dy <= r * r
    }

    #[test]
    fn solid_plane_fills_exactly_the_disc() {
        let plane = Raster::filled(64, 48, TEAL);
        let layer = SphereProjector::new(20, 0.0)
            .project(&plane, &mut NoProgress)
            .unwrap();
        assert_eq!(layer.width(), 40);
        for y in 0..40 {
            for x in 0..40 {
                if inside_disc(x, y, 20) {
                    assert_eq!(layer.get_pixel(x, y), Some(TEAL), "({x}, {y})");
                } else {
                    assert!(!layer.is_written(x, y), "({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn transparent_hole_passes_through() {
        let plane = Raster::from_fn(100, 100, |x, y| {
            if (40..60).contains(&x) && (40..60).contains(&y) {
                TRANSPARENT
            } else {
                TEAL
            }
        });
        let layer = SphereProjector::new(30, 0.3)
            .project(&plane, &mut NoProgress)
            .unwrap();
        let backdrop = Color::rgb(200, 10, 10);
        let mut canvas = Raster::filled(60, 60, backdrop);
        layer.composite_onto(&mut canvas, (0, 0));
        assert_eq!(canvas.get(30, 30), Some(backdrop));
        assert_ne!(canvas.get(30, 5), Some(backdrop));
        assert_eq!(canvas.get(0, 0), Some(backdrop));
    }

    #[test]
    fn shadow_darkens_towards_the_anchor() {
        let plane = Raster::filled(200, 200, Color::rgb(200, 200, 200));
        let layer = SphereProjector::new(50, 0.3)
            .project(&plane, &mut NoProgress)
            .unwrap();
        // The anchor lies beyond the lower-left rim
        let lit = layer.get_pixel(50, 50).unwrap();
        let shaded = layer.get_pixel(20, 80).unwrap();
        assert_eq!(lit.r, 200);
        assert!(shaded.r < lit.r);
        assert_eq!(shaded.a, 255);
    }

    #[test]
    fn progress_reports_every_row() {
        let plane = Raster::filled(16, 16, TEAL);
        let mut reports = Vec::new();
        SphereProjector::new(4, 0.0)
            .project(&plane, &mut |f: f32| reports.push(f))
            .unwrap();
        assert_eq!(reports.len(), 8);
        assert_eq!(reports.last(), Some(&1.0));
    }

    #[test]
    fn zero_radius_is_rejected() {
        let plane = Raster::filled(16, 16, TEAL);
        assert!(SphereProjector::new(0, 0.3)
            .project(&plane, &mut NoProgress)
            .is_err());
    }

    #[test]
    fn window_is_the_center_of_the_full_layer() {
        let plane = Raster::from_fn(90, 70, |x, y| Color::rgb((x * 3) as u8, (y * 3) as u8, 40));
        let projector = SphereProjector::new(20, 0.3);
        let full = projector.project(&plane, &mut NoProgress).unwrap();
        let window = projector.project_window(&plane, 10, &mut NoProgress).unwrap();
        assert_eq!(window.width(), 10);
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(window.get_pixel(x, y), full.get_pixel(x + 15, y + 15), "({x}, {y})");
            }
        }
    }

    #[test]
    fn huge_sphere_renders_only_the_window() {
        let plane = Raster::filled(64, 64, TEAL);
        let projector = SphereProjector::new(u32::MAX / 2, 0.0);
        assert_eq!(projector.output_size(), u32::MAX - 1);
        assert_eq!(SphereProjector::new(u32::MAX, 0.0).output_size(), u32::MAX);
        let layer = projector.project_window(&plane, 8, &mut NoProgress).unwrap();
        assert_eq!(layer.width(), 8);
        assert_eq!(layer.written_count(), 64);
        assert_eq!(layer.get_pixel(4, 4), Some(TEAL));
    }

    #[test]
    fn config_conversion_keeps_center() {
        let config = SphereConfig {
            radius: 10,
            center: Some([3.0, 4.0]),
            ..SphereConfig::default()
        };
        let projector = SphereProjector::from(&config);
        assert_eq!(projector.radius(), 10);
        assert_eq!(projector.center, Some(Vec2::new(3.0, 4.0)));
    }
}
