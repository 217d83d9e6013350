//! Lighting and shading models.
//!
//! Two independent models are used:
//!
//! - [`AttachedShadow`] for the stereographic sphere, which darkens fragments
//!   by their great-circle distance to a fixed point on the sphere.
//! - [`DirectionalLight`] + [`ShadingModel`] for the torus, which compare the
//!   surface normal with a parallel light direction.
//!
//! All shading works on opaque RGB and preserves the source alpha.

use std::f32::consts::{FRAC_PI_4, TAU};

use serde::Deserialize;

use crate::colors::{Color, BLACK, WHITE};
use crate::math::vec3::Vec3;

/// A directional light that illuminates the scene uniformly from a direction.
///
/// Directional lights are ideal for simulating distant light sources like the sun,
/// where all rays are effectively parallel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    /// The normalized direction the light is pointing (not where it comes from).
    pub direction: Vec3,
}

impl DirectionalLight {
    /// Create a new directional light pointing in the given direction.
    /// The direction will be normalized automatically; a zero vector falls
    /// back to light shining straight down the view axis.
    pub fn new(direction: Vec3) -> Self {
        DirectionalLight {
            direction: direction.normalize_or(Vec3::new(0.0, 0.0, -1.0)),
        }
    }

    /// Cosine between the light direction and a unit normal, in [-1, 1].
    ///
    /// Positive means the light travels the same way the surface faces,
    /// i.e. the surface is turned away from the light.
    #[inline]
    pub fn alignment(&self, normal: Vec3) -> f32 {
        self.direction.dot(normal).clamp(-1.0, 1.0)
    }

    /// Lambertian intensity in [0, 1].
    pub fn intensity(&self, normal: Vec3) -> f32 {
        // Negate direction: light pointing at surface = positive dot product
        (-self.alignment(normal)).max(0.0)
    }

    /// Half-Lambertian intensity: the dot product remapped from [-1, 1] to
    /// [0, 1], so the terminator is soft and the back side is only dimmed.
    pub fn half_lambert(&self, normal: Vec3) -> f32 {
        0.5 - 0.5 * self.alignment(normal)
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::new(-1.0, -1.0, 1.0))
    }
}

/// How torus fragments react to the light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadingModel {
    /// Darken toward black (facing away) or lighten toward white (facing the
    /// light), proportionally to the signed dot product and `amount`.
    Simple,
    /// Scale by the clamped Lambertian intensity.
    Lambertian,
    /// Scale by the half-Lambertian intensity.
    #[default]
    HalfLambertian,
}

impl ShadingModel {
    /// Shades one fragment. `amount` only affects [`ShadingModel::Simple`].
    pub fn shade(self, color: Color, normal: Vec3, light: &DirectionalLight, amount: f32) -> Color {
        match self {
            ShadingModel::Simple => {
                let shade = light.alignment(normal) * amount;
                if shade > 0.0 {
                    color.lerp(BLACK.with_alpha(color.a), shade)
                } else {
                    color.lerp(WHITE.with_alpha(color.a), -shade)
                }
            }
            ShadingModel::Lambertian => color.modulate(light.intensity(normal)),
            ShadingModel::HalfLambertian => color.modulate(light.half_lambert(normal)),
        }
    }
}

impl std::fmt::Display for ShadingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShadingModel::Simple => write!(f, "simple"),
            ShadingModel::Lambertian => write!(f, "lambertian"),
            ShadingModel::HalfLambertian => write!(f, "half-lambertian"),
        }
    }
}

/// Attached shadow on the stereographic sphere.
///
/// Fragments are scaled by their angular distance (haversine formula) from an
/// anchor at `(latitude, longitude)`, divided by `2π · amount`: the anchor
/// itself is black and everything more than `2π · amount` radians away keeps
/// its full color. Latitudes use the sphere's view parametrisation, with the
/// north pole facing the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AttachedShadow {
    pub latitude: f32,
    pub longitude: f32,
}

impl Default for AttachedShadow {
    fn default() -> Self {
        Self {
            latitude: -FRAC_PI_4,
            longitude: -FRAC_PI_4,
        }
    }
}

fn hav(angle: f32) -> f32 {
    0.5 * (1.0 - angle.cos())
}

fn ahav(x: f32) -> f32 {
    (1.0 - 2.0 * x).clamp(-1.0, 1.0).acos()
}

impl AttachedShadow {
    /// Great-circle distance from the anchor, in radians.
    pub fn angular_distance(&self, latitude: f32, longitude: f32) -> f32 {
        let h = hav(self.latitude - latitude)
            + latitude.cos() * self.latitude.cos() * hav(self.longitude - longitude);
        ahav(h)
    }

    /// Brightness factor in [0, 1]; exactly 1 when `amount <= 0`.
    pub fn factor(&self, latitude: f32, longitude: f32, amount: f32) -> f32 {
        if amount <= 0.0 {
            return 1.0;
        }
        (self.angular_distance(latitude, longitude) / (TAU * amount)).clamp(0.0, 1.0)
    }

    pub fn shade(&self, color: Color, latitude: f32, longitude: f32, amount: f32) -> Color {
        if amount <= 0.0 {
            return color;
        }
        color.modulate(self.factor(latitude, longitude, amount))
    }
}
