//! Fixed perspective camera for torus rendering.
//!
//! # Coordinate System
//!
//! Model space is the torus' own frame: the wheel lies in the XY plane and Z
//! points towards the viewer before the camera tilt. Camera space keeps X to
//! the right and Y up, with Z increasing away from the eye, so anything with
//! `Z <= 0` is behind the camera.
//!
//! # Canonical configuration
//!
//! The view transform is `translate(0, 0, d · (Rw + Rh)) · rotate_x(tilt)`:
//! the torus is tilted by `tilt` around X, then pushed `d` combined radii
//! away. Defaults are a 50° tilt and `d = 1.5`. Camera-space points are
//! divided by Z (unit focal length) and the resulting NDC square `[-1, 1]²`
//! is stretched over the output raster with +Y up.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::math::mat4::Mat4;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::render::layer::DepthRange;
use crate::surface::Torus;

/// Camera placement relative to the torus.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Rotation around X applied to the torus, in degrees.
    pub tilt_degrees: f32,
    /// Viewer distance as a multiple of `Rw + Rh`.
    pub distance_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            tilt_degrees: 50.0,
            distance_factor: 1.5,
        }
    }
}

/// Perspective camera looking at one torus.
#[derive(Debug, Clone)]
pub struct TorusCamera {
    view: Mat4,
    half_width: f32,
    half_height: f32,
    depth: DepthRange,
}

impl TorusCamera {
    /// Creates the camera for `torus` rendered into a `width x height` raster.
    ///
    /// The depth range spans the camera-space Z of the torus' bounding box,
    /// so every point of the surface encodes to a code in `[0, 255]`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGeometry`] for an empty output raster.
    pub fn new(torus: &Torus, output: (u32, u32), config: &CameraConfig) -> Result<Self> {
        if output.0 == 0 || output.1 == 0 {
            return Err(Error::InvalidGeometry(format!(
                "output raster {}x{} has zero area",
                output.0, output.1
            )));
        }
        let distance = config.distance_factor * (torus.major() + torus.minor());
        let view = Mat4::translation(0.0, 0.0, distance)
            * Mat4::rotation_x(config.tilt_degrees.to_radians());
        let depth = DepthRange::spanning(
            torus
                .bounding_box()
                .iter()
                .map(|&corner| view.transform_point(corner).z),
        );

        Ok(Self {
            view,
            half_width: output.0 as f32 / 2.0,
            half_height: output.1 as f32 / 2.0,
            depth,
        })
    }

    /// Model space to camera space.
    #[inline]
    pub fn to_camera(&self, point: Vec3) -> Vec3 {
        self.view.transform_point(point)
    }

    /// Camera space to raster coordinates (not rounded).
    ///
    /// Returns `None` for points on or behind the eye plane.
    #[inline]
    pub fn project(&self, camera_point: Vec3) -> Option<Vec2> {
        if camera_point.z <= 0.0 {
            return None;
        }
        let inv_z = 1.0 / camera_point.z;
        Some(Vec2::new(
            self.half_width + camera_point.x * self.half_width * inv_z,
            self.half_height - camera_point.y * self.half_height * inv_z,
        ))
    }

    /// Whether a surface with model-space `normal` at `camera_point` is turned
    /// towards the eye.
    #[inline]
    pub fn faces_camera(&self, camera_point: Vec3, normal: Vec3) -> bool {
        self.view.transform_vector(normal).dot(-camera_point) >= 0.0
    }

    #[inline]
    pub fn depth_code(&self, camera_z: f32) -> u8 {
        self.depth.encode(camera_z)
    }

    /// Screen-space speed of the surface at `(θ, φ)`, in pixels per radian
    /// along θ and along φ.
    ///
    /// Estimated with a forward difference; `None` when either point is
    /// behind the camera.
    pub fn screen_speed(&self, torus: &Torus, theta: f32, phi: f32) -> Option<(f32, f32)> {
        const STEP: f32 = 1e-3;
        let at = |t: f32, p: f32| self.project(self.to_camera(torus.position(t, p)));
        let origin = at(theta, phi)?;
        let along_theta = at(theta + STEP, phi)?;
        let along_phi = at(theta, phi + STEP)?;
        Some((
            (along_theta - origin).length() / STEP,
            (along_phi - origin).length() / STEP,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::TAU;

    fn setup() -> (Torus, TorusCamera) {
        let torus = Torus::new(10.0, 4.0).unwrap();
        let camera = TorusCamera::new(&torus, (100, 80), &CameraConfig::default()).unwrap();
        (torus, camera)
    }

    #[test]
    fn model_origin_lands_on_screen_center() {
        let (_, camera) = setup();
        let p = camera.to_camera(Vec3::ZERO);
        assert_relative_eq!(p.z, 21.0, epsilon = 1e-4);
        let screen = camera.project(p).unwrap();
        assert_relative_eq!(screen.x, 50.0, epsilon = 1e-4);
        assert_relative_eq!(screen.y, 40.0, epsilon = 1e-4);
    }

    #[test]
    fn screen_y_points_down() {
        let (_, camera) = setup();
        let up = camera.project(Vec3::new(0.0, 2.0, 10.0)).unwrap();
        assert!(up.y < 40.0);
        let right = camera.project(Vec3::new(2.0, 0.0, 10.0)).unwrap();
        assert!(right.x > 50.0);
    }

    #[test]
    fn points_behind_the_eye_are_rejected() {
        let (_, camera) = setup();
        assert!(camera.project(Vec3::new(1.0, 1.0, 0.0)).is_none());
        assert!(camera.project(Vec3::new(1.0, 1.0, -3.0)).is_none());
    }

    #[test]
    fn whole_torus_is_in_front_and_inside_depth_range() {
        let (torus, camera) = setup();
        let mut codes = Vec::new();
        for i in 0..36 {
            for j in 0..36 {
                let p = camera.to_camera(torus.position(i as f32 * TAU / 36.0, j as f32 * TAU / 36.0));
                assert!(p.z > 0.0);
                codes.push(camera.depth_code(p.z));
            }
        }
        let min = codes.iter().min().copied().unwrap();
        let max = codes.iter().max().copied().unwrap();
        // The bounding box is slightly larger than the surface
        assert!(max < 255);
        assert!(max - min > 150);
    }

    #[test]
    fn outer_rim_facing_the_eye_is_front_facing() {
        let (torus, camera) = setup();
        // After the tilt, -Y of the model comes towards the viewer
        let near = torus.point(-TAU / 4.0, 0.0);
        let far = torus.point(TAU / 4.0, 0.0);
        assert!(camera.faces_camera(camera.to_camera(near.position), near.normal));
        assert!(!camera.faces_camera(camera.to_camera(far.position), far.normal));
        assert!(
            camera.to_camera(near.position).z < camera.to_camera(far.position).z
        );
    }

    #[test]
    fn screen_speed_grows_towards_the_viewer() {
        let (torus, camera) = setup();
        let (near_theta, _) = camera.screen_speed(&torus, -TAU / 4.0, 0.0).unwrap();
        let (far_theta, _) = camera.screen_speed(&torus, TAU / 4.0, 0.0).unwrap();
        assert!(near_theta > far_theta);
    }

    #[test]
    fn empty_output_is_rejected() {
        let torus = Torus::new(10.0, 4.0).unwrap();
        assert!(TorusCamera::new(&torus, (0, 10), &CameraConfig::default()).is_err());
    }
}
