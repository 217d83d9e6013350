//! Perspective torus projection.
//!
//! Unlike the sphere, the torus folds over itself, so it is rendered by
//! walking the `(θ, φ)` parameter domain and scattering each sample to its
//! nearest output pixel. Several samples can hit the same pixel; the
//! [`RenderLayer`] depth test keeps the one closest to the camera.
//!
//! ```text
//! for θ in linspace(0, 2π, n_θ):          // one progress report per θ
//!     for φ in linspace(0, 2π, n_φ):
//!         texel = plane[u(θ), v(φ)]       // skip transparent
//!         point = torus(θ, φ) -> camera   // skip Z <= 0, optional culling
//!         layer[round(screen)] <- shade(texel) at depth(Z)
//! ```

use std::f32::consts::TAU;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::camera::{CameraConfig, TorusCamera};
use crate::error::{Error, Result};
use crate::light::{DirectionalLight, ShadingModel};
use crate::math::vec3::Vec3;
use crate::progress::Progress;
use crate::raster::Raster;
use crate::render::layer::RenderLayer;
use crate::surface::Torus;

/// How densely the parameter domain is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Sampling {
    /// `round(density · max(width, height))` samples along each of θ and φ.
    Uniform { density: f32 },
    /// Sample counts chosen so neighbouring samples land at most
    /// `max_step_px` pixels apart, measured at the fastest-moving point of a
    /// coarse survey of the surface. Counts are capped at
    /// `ADAPTIVE_DENSITY_CAP · max(width, height)`.
    Adaptive { max_step_px: f32 },
}

impl Default for Sampling {
    fn default() -> Self {
        Sampling::Uniform { density: 4.5 }
    }
}

/// Grid resolution of the adaptive survey along each parameter.
const SURVEY_STEPS: usize = 64;

/// Adaptive sampling never exceeds eight times the default uniform density.
/// Surface points close to the eye plane move arbitrarily fast on screen.
pub const ADAPTIVE_DENSITY_CAP: f32 = 36.0;

impl Sampling {
    /// Number of samples along θ and along φ, each at least 2.
    pub fn sample_counts(&self, torus: &Torus, camera: &TorusCamera, output: (u32, u32)) -> (usize, usize) {
        let (n_theta, n_phi) = match *self {
            Sampling::Uniform { density } => {
                let n = (density * output.0.max(output.1) as f32).round() as usize;
                (n, n)
            }
            Sampling::Adaptive { max_step_px } => {
                let step = max_step_px.max(1e-2);
                let (mut fastest_theta, mut fastest_phi) = (0.0f32, 0.0f32);
                for i in 0..SURVEY_STEPS {
                    for j in 0..SURVEY_STEPS {
                        let theta = i as f32 * TAU / SURVEY_STEPS as f32;
                        let phi = j as f32 * TAU / SURVEY_STEPS as f32;
                        if let Some((dt, dp)) = camera.screen_speed(torus, theta, phi) {
                            fastest_theta = fastest_theta.max(dt);
                            fastest_phi = fastest_phi.max(dp);
                        }
                    }
                }
                let cap = (ADAPTIVE_DENSITY_CAP * output.0.max(output.1) as f32).round() as usize;
                let wanted = |fastest: f32| {
                    let n = f64::from(TAU * fastest / step).ceil() + 1.0;
                    if n > cap as f64 {
                        None
                    } else {
                        Some(n as usize)
                    }
                };
                match (wanted(fastest_theta), wanted(fastest_phi)) {
                    (Some(n_theta), Some(n_phi)) => (n_theta, n_phi),
                    (n_theta, n_phi) => {
                        warn!(
                            "adaptive sampling capped at {cap} samples per axis; \
                             fastest screen speed {:.0} px/rad",
                            fastest_theta.max(fastest_phi)
                        );
                        (n_theta.unwrap_or(cap), n_phi.unwrap_or(cap))
                    }
                }
            }
        };
        (n_theta.max(2), n_phi.max(2))
    }
}

/// Torus settings as read from the `[torus]` config section.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TorusConfig {
    pub output_size: [u32; 2],
    pub shading: ShadingModel,
    /// Direction the light travels, in model space.
    pub light_direction: [f32; 3],
    /// Strength of [`ShadingModel::Simple`]; ignored by the other models.
    pub shadow_amount: f32,
    pub sampling: Sampling,
    pub backface_culling: bool,
    pub camera: CameraConfig,
}

impl Default for TorusConfig {
    fn default() -> Self {
        Self {
            output_size: [400, 400],
            shading: ShadingModel::default(),
            light_direction: [-1.0, -1.0, 1.0],
            shadow_amount: 0.6,
            sampling: Sampling::default(),
            backface_culling: false,
            camera: CameraConfig::default(),
        }
    }
}

impl TorusConfig {
    pub fn light(&self) -> DirectionalLight {
        let [x, y, z] = self.light_direction;
        DirectionalLight::new(Vec3::new(x, y, z))
    }
}

/// Counters gathered during one torus pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Parameter samples visited.
    pub samples: usize,
    /// Samples that won the depth test at the time they were written.
    pub fragments: usize,
    /// Unwritten pixels enclosed by written ones.
    pub holes: usize,
}

impl RenderReport {
    /// The advisory undersampling error, if the pass left holes.
    ///
    /// Logs a warning when it does. Holes degrade the image but never
    /// invalidate it, so callers decide whether to act on this.
    pub fn underrun(&self) -> Option<Error> {
        if self.holes == 0 {
            return None;
        }
        warn!(
            "torus pass left {} hole(s) after {} samples; raise the sampling density",
            self.holes, self.samples
        );
        Some(Error::SamplingUnderrun { holes: self.holes })
    }
}

/// Renders `plane` wrapped once around a torus.
///
/// The plane's width runs around the wheel and its height around the tube.
/// Transparent texels are skipped. `progress` receives one report per θ step.
///
/// # Errors
///
/// [`Error::InvalidGeometry`] for a plane smaller than 2x2 or an empty output.
pub fn project_torus(
    plane: &Raster,
    config: &TorusConfig,
    progress: &mut impl Progress,
) -> Result<(RenderLayer, RenderReport)> {
    let [width, height] = config.output_size;
    let torus = Torus::for_plane(plane.width(), plane.height())?;
    let camera = TorusCamera::new(&torus, (width, height), &config.camera)?;
    let light = config.light();
    let (n_theta, n_phi) = config.sampling.sample_counts(&torus, &camera, (width, height));

    info!(
        "projecting {}x{} plane onto torus, {}x{} output, {} model",
        plane.width(),
        plane.height(),
        width,
        height,
        config.shading
    );
    debug!(
        "torus radii {:.2}/{:.2}, {}x{} samples",
        torus.major(),
        torus.minor(),
        n_theta,
        n_phi
    );

    // φ only depends on the inner index
    let phis: Vec<f32> = (0..n_phi)
        .map(|j| TAU * j as f32 / (n_phi - 1) as f32)
        .collect();

    let mut layer = RenderLayer::new(width, height);
    let mut report = RenderReport::default();
    for i in 0..n_theta {
        let theta = TAU * i as f32 / (n_theta - 1) as f32;
        for &phi in &phis {
            report.samples += 1;
            let point = torus.point(theta, phi);
            let texel = plane.sample_wrapped(point.uv.x, point.uv.y);
            if texel.is_transparent() {
                continue;
            }

            let camera_point = camera.to_camera(point.position);
            if config.backface_culling && !camera.faces_camera(camera_point, point.normal) {
                continue;
            }
            let Some(screen) = camera.project(camera_point) else {
                continue;
            };

            let color = config
                .shading
                .shade(texel, point.normal, &light, config.shadow_amount);
            let depth = camera.depth_code(camera_point.z);
            if layer.set_pixel_with_depth(
                screen.x.round() as i32,
                screen.y.round() as i32,
                depth,
                color,
            ) {
                report.fragments += 1;
            }
        }
        progress.report((i + 1) as f32 / n_theta as f32);
    }

    report.holes = layer.count_holes();
    info!(
        "torus pass: {} samples, {} fragments, {} pixels written",
        report.samples,
        report.fragments,
        layer.written_count()
    );
    Ok((layer, report))
}
