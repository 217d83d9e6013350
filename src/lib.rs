//! Hexagonal tilings wrapped onto spheres and tori.
//!
//! The crate builds large seamless textures by scattering randomly oriented
//! hexagonal tiles over a plane, then wraps such planes onto curved surfaces
//! in a CPU-only software renderer:
//!
//! - [`tiling`]: random hex tiling, optionally toroidal (seamless repeat)
//! - [`render::sphere`]: stereographic sphere with an attached shadow
//! - [`render::torus`]: perspective torus with depth-tested scattering
//! - [`nest`]: several spheres layered back to front
//!
//! File I/O lives at the edges ([`Raster::open`], [`Raster::save`],
//! [`config::RenderConfig::load`]); everything else is pure computation over
//! owned rasters.
//!
//! # Quick Start
//!
//! ```ignore
//! use hexsphere::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let tile = solid_hex_tile(64, Color::rgb(250, 200, 180));
//! let options = TilingOptions { canvas_size: (1024, 1024), ..Default::default() };
//! let plane = tile_plane(&[tile.into()], &options, &mut rng)?.raster;
//! let sphere = SphereProjector::new(300, 0.3).project(&plane, &mut NoProgress)?;
//! sphere.resolve().save("sphere.png")?;
//! ```

pub mod camera;
pub mod colors;
pub mod config;
pub mod error;
pub mod light;
pub mod math;
pub mod nest;
pub mod progress;
pub mod raster;
pub mod render;
pub mod surface;
pub mod tiling;

pub use colors::Color;
pub use error::{Error, Result};
pub use raster::Raster;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use hexsphere::prelude::*;
/// ```
pub mod prelude {
    // Pixels
    pub use crate::colors::{Color, BLACK, TRANSPARENT, WHITE};
    pub use crate::raster::Raster;

    // Tiling
    pub use crate::tiling::{
        solid_hex_tile, tile_plane, Orientation, TileSource, TiledPlane, TilingOptions,
    };

    // Projection
    pub use crate::light::{AttachedShadow, DirectionalLight, ShadingModel};
    pub use crate::nest::{build_nest, NestOptions, PlaneSource};
    pub use crate::render::{
        composite, project_torus, RenderLayer, RenderReport, Sampling, SphereProjector,
        TorusConfig,
    };

    // Configuration & progress
    pub use crate::config::RenderConfig;
    pub use crate::error::{Error, Result};
    pub use crate::progress::{NoProgress, Progress, Throttled};

    // Math
    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::camera::TorusCamera;
    pub use crate::surface::{StereographicSphere, Torus};
    pub use crate::tiling::HexLattice;
}
