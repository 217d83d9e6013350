//! TOML render configuration.
//!
//! Every section and field is optional; anything missing takes its default.
//!
//! ```toml
//! [tiling]
//! canvas_size = [6400, 6400]
//! tile_scale = 0.5
//! toroidal = true
//!
//! [sphere]
//! radius = 1200
//! shadow_amount = 0.3
//!
//! [torus]
//! output_size = [400, 400]
//! shading = "half-lambertian"
//! sampling = { mode = "adaptive", max_step_px = 0.5 }
//!
//! [nest]
//! layer_count = 3
//! background = "#ffffff"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::nest::NestOptions;
use crate::render::sphere::SphereConfig;
use crate::render::torus::TorusConfig;
use crate::tiling::TilingOptions;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub tiling: TilingOptions,
    pub sphere: SphereConfig,
    pub torus: TorusConfig,
    pub nest: NestOptions,
}

impl RenderConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded render config from {}", path.as_ref().display());
        Ok(config)
    }
}
