//! Parametrized surfaces that a plane texture can be wrapped onto.
//!
//! Both surfaces are pure functions from a 2-parameter domain to model space.
//! They carry no pixels; the projectors in [`crate::render`] pair them with a
//! plane raster and a camera.
//!
//! # Sphere
//!
//! The sphere is viewed orthographically from above its north pole. The plane
//! is wrapped around it by inverse stereographic projection from the north
//! pole, so the visible disc shows the southern hemisphere's texture: a screen
//! offset `s` from the disc center maps to the half-angle
//! `θ = ½·asin(s / R)` at the pole and then to a plane distance
//! `d = (R + center_z)·tan θ`.
//!
//! # Torus
//!
//! The plane's two axes wrap exactly once around the major and minor circles:
//! `θ = u / Rw`, `φ = v / Rh`, with `Rw = (width − 1) / 2π` and
//! `Rh = (height − 1) / 2π`.
//!
//! ```text
//!       _____
//!      /     \     z towards viewer
//!     |   O   |    ---> x
//!      \     /     |
//!       -----      v y
//! ```

use std::f32::consts::TAU;

use crate::error::{Error, Result};
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;

/// A point on a surface, as needed to shade and place one fragment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    /// Model-space position.
    pub position: Vec3,
    /// Unit outward normal.
    pub normal: Vec3,
    /// Source-plane coordinates, in pixels.
    pub uv: Vec2,
}

/// Result of unprojecting one screen pixel onto the sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereSample {
    pub point: SurfacePoint,
    /// Angle above the sphere's equator, `π/2` at the disc center.
    pub latitude: f32,
    /// Angle around the view axis, measured from screen +y toward +x.
    pub longitude: f32,
}

/// Below this distance from the disc center, `d / s` is not evaluated.
const DEGENERATE_OFFSET: f32 = 1e-3;

/// Stereographic wrapping of a plane around a sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StereographicSphere {
    radius: f32,
    center: Vec2,
    center_z: f32,
    plane_size: Vec2,
}

impl StereographicSphere {
    /// `center` is the plane point shown at the disc center (defaults to the
    /// plane's own center); `center_z` defaults to `radius`, putting the
    /// projection pole at twice the radius above the plane.
    pub fn new(
        radius: f32,
        plane_size: (u32, u32),
        center: Option<Vec2>,
        center_z: Option<f32>,
    ) -> Result<Self> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(Error::InvalidGeometry(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        if plane_size.0 == 0 || plane_size.1 == 0 {
            return Err(Error::InvalidGeometry("plane has zero area".into()));
        }
        let plane_size = Vec2::new(plane_size.0 as f32, plane_size.1 as f32);
        Ok(Self {
            radius,
            center: center.unwrap_or(plane_size * 0.5),
            center_z: center_z.unwrap_or(radius),
            plane_size,
        })
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Maps a screen offset from the disc center to a surface sample.
    ///
    /// Returns `None` for offsets outside the disc.
    pub fn unproject(&self, dx: f32, dy: f32) -> Option<SphereSample> {
        let r = self.radius;
        let distance_squared = dx * dx + dy * dy;
        if distance_squared > r * r {
            return None;
        }
        let s = distance_squared.sqrt();

        let uv = if s < DEGENERATE_OFFSET {
            self.center
        } else {
            // Angle subtended at the north pole
            let theta = 0.5 * (s / r).min(1.0).asin();
            let d = (r + self.center_z) * theta.tan();
            Vec2::new(self.center.x + dx * d / s, self.center.y + dy * d / s)
        };
        let uv = Vec2::new(
            uv.x.rem_euclid(self.plane_size.x),
            uv.y.rem_euclid(self.plane_size.y),
        );

        // Visible hemisphere, north pole facing the viewer
        let height = (r * r - distance_squared).max(0.0).sqrt();
        let position = Vec3::new(dx, dy, height);
        Some(SphereSample {
            point: SurfacePoint {
                position,
                normal: position.normalize_or(Vec3::UP),
                uv,
            },
            latitude: (s / r).min(1.0).acos(),
            longitude: dx.atan2(dy),
        })
    }
}

/// A torus whose surface carries a plane texture exactly once in each
/// direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Torus {
    /// Radius of the wheel (major circle), `Rw`.
    major: f32,
    /// Radius of the tube (minor circle), `Rh`.
    minor: f32,
}

impl Torus {
    pub fn new(major: f32, minor: f32) -> Result<Self> {
        if !(major > 0.0 && minor > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "torus radii must be positive, got {major} and {minor}"
            )));
        }
        Ok(Self { major, minor })
    }

    /// Sizes the torus so a `width` x `height` plane wraps once around it.
    pub fn for_plane(width: u32, height: u32) -> Result<Self> {
        if width < 2 || height < 2 {
            return Err(Error::InvalidGeometry(format!(
                "a {width}x{height} plane is too small to wrap a torus"
            )));
        }
        Self::new((width - 1) as f32 / TAU, (height - 1) as f32 / TAU)
    }

    pub fn major(&self) -> f32 {
        self.major
    }

    pub fn minor(&self) -> f32 {
        self.minor
    }

    /// Unit tangents along θ (major circle) and φ (minor circle).
    pub fn tangents(&self, theta: f32, phi: f32) -> (Vec3, Vec3) {
        let (st, ct) = theta.sin_cos();
        let (sp, cp) = phi.sin_cos();
        (
            Vec3::new(-st, ct, 0.0),
            Vec3::new(-sp * ct, -sp * st, cp),
        )
    }

    /// Model-space position only.
    pub fn position(&self, theta: f32, phi: f32) -> Vec3 {
        let (st, ct) = theta.sin_cos();
        let (sp, cp) = phi.sin_cos();
        let l = self.major + self.minor * cp;
        Vec3::new(l * ct, l * st, self.minor * sp)
    }

    /// Position, outward normal and plane coordinates at `(θ, φ)`.
    pub fn point(&self, theta: f32, phi: f32) -> SurfacePoint {
        let (d_theta, d_phi) = self.tangents(theta, phi);
        // Outward: points away from the tube's center circle
        let fallback = {
            let (st, ct) = theta.sin_cos();
            Vec3::new(ct, st, 0.0)
        };
        SurfacePoint {
            position: self.position(theta, phi),
            normal: d_theta.cross(d_phi).normalize_or(fallback),
            uv: Vec2::new(self.major * theta, self.minor * phi),
        }
    }

    /// Corners of the model-space bounding box.
    pub fn bounding_box(&self) -> [Vec3; 8] {
        let extent = self.major + self.minor;
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let pick = |bit: usize, v: f32| if i & bit == 0 { -v } else { v };
            *corner = Vec3::new(pick(1, extent), pick(2, extent), pick(4, self.minor));
        }
        corners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn sphere(radius: f32) -> StereographicSphere {
        StereographicSphere::new(radius, (1000, 800), None, None).unwrap()
    }

    #[test]
    fn sphere_rejects_outside_disc() {
        let s = sphere(10.0);
        assert!(s.unproject(10.0, 0.5).is_none());
        assert!(s.unproject(7.0, 7.0).is_some());
    }

    #[test]
    fn sphere_center_is_degenerate_case() {
        let s = sphere(50.0);
        let sample = s.unproject(0.0, 0.0).unwrap();
        assert_eq!(sample.point.uv, Vec2::new(500.0, 400.0));
        assert_relative_eq!(sample.latitude, FRAC_PI_2, epsilon = 1e-6);
        assert_relative_eq!(sample.point.normal.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn sphere_rim_maps_to_twice_the_radius() {
        // θ = ½·asin(1) = π/4, d = 2R·tan(π/4) = 2R
        let s = sphere(50.0);
        let sample = s.unproject(50.0, 0.0).unwrap();
        assert_relative_eq!(sample.point.uv.x, 600.0, epsilon = 1e-3);
        assert_relative_eq!(sample.point.uv.y, 400.0, epsilon = 1e-3);
        assert_relative_eq!(sample.latitude, 0.0, epsilon = 1e-3);
        assert_relative_eq!(sample.longitude, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn sphere_wraps_around_the_plane() {
        let s = StereographicSphere::new(50.0, (60, 60), Some(Vec2::new(5.0, 5.0)), None).unwrap();
        let uv = s.unproject(-50.0, 0.0).unwrap().point.uv;
        // 5 - 100 wraps to 25 on a 60 px plane
        assert_relative_eq!(uv.x, 25.0, epsilon = 1e-3);
        assert!(uv.y >= 0.0 && uv.y < 60.0);
    }

    #[test]
    fn sphere_center_z_scales_distance() {
        let s = StereographicSphere::new(50.0, (1000, 1000), None, Some(150.0)).unwrap();
        let uv = s.unproject(50.0, 0.0).unwrap().point.uv;
        assert_relative_eq!(uv.x, 700.0, epsilon = 1e-2);
    }

    #[test]
    fn sphere_normals_are_unit() {
        let s = sphere(20.0);
        let n = s.unproject(12.0, -5.0).unwrap().point.normal;
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-5);
        assert!(n.z > 0.0);
    }

    #[test]
    fn sphere_rejects_bad_radius() {
        assert!(StereographicSphere::new(0.0, (10, 10), None, None).is_err());
        assert!(StereographicSphere::new(f32::NAN, (10, 10), None, None).is_err());
        assert!(StereographicSphere::new(5.0, (0, 10), None, None).is_err());
    }

    #[test]
    fn torus_radii_from_plane() {
        let t = Torus::for_plane(629, 315).unwrap();
        assert_relative_eq!(t.major(), 628.0 / TAU, epsilon = 1e-4);
        assert_relative_eq!(t.minor(), 314.0 / TAU, epsilon = 1e-4);
        assert!(Torus::for_plane(1, 100).is_err());
    }

    #[test]
    fn torus_uv_covers_plane_once() {
        let t = Torus::for_plane(629, 315).unwrap();
        let end = t.point(TAU, TAU).uv;
        assert_relative_eq!(end.x, 628.0, epsilon = 1e-2);
        assert_relative_eq!(end.y, 314.0, epsilon = 1e-2);
    }

    #[test]
    fn torus_normal_points_outward() {
        let t = Torus::new(10.0, 3.0).unwrap();
        // Outer equator
        let p = t.point(0.0, 0.0);
        assert_relative_eq!(p.position.x, 13.0, epsilon = 1e-5);
        assert_relative_eq!(p.normal.x, 1.0, epsilon = 1e-5);
        // Inner equator faces the hole
        let p = t.point(0.0, PI);
        assert_relative_eq!(p.position.x, 7.0, epsilon = 1e-5);
        assert_relative_eq!(p.normal.x, -1.0, epsilon = 1e-5);
        // Top of the tube
        let p = t.point(FRAC_PI_4, FRAC_PI_2);
        assert_relative_eq!(p.normal.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn torus_normal_matches_radial_direction() {
        let t = Torus::new(10.0, 3.0).unwrap();
        for &(theta, phi) in &[(0.3, 1.1), (2.0, 4.0), (5.5, 0.2)] {
            let p = t.point(theta, phi);
            let (st, ct) = f32::sin_cos(theta);
            let tube_center = Vec3::new(10.0 * ct, 10.0 * st, 0.0);
            let radial = (p.position - tube_center).normalize_or(Vec3::UP);
            assert_relative_eq!(p.normal.dot(radial), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn torus_bounding_box_encloses_surface() {
        let t = Torus::new(10.0, 3.0).unwrap();
        let bbox = t.bounding_box();
        assert!(bbox.iter().any(|c| c.x == 13.0 && c.y == 13.0 && c.z == 3.0));
        assert!(bbox.iter().any(|c| c.x == -13.0 && c.y == -13.0 && c.z == -3.0));
    }
}
