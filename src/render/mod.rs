//! Projection passes and depth compositing.
//!
//! Each pass renders into its own [`RenderLayer`]; depth only orders
//! fragments within that layer. Layers are then painted onto a canvas in call
//! order, later calls in front.

pub mod layer;
pub mod sphere;
pub mod torus;

pub use layer::{DepthRange, RenderLayer, DEPTH_EMPTY};
pub use sphere::{SphereConfig, SphereProjector};
pub use torus::{project_torus, RenderReport, Sampling, TorusConfig};

use crate::raster::Raster;

/// Paints a finished layer onto `canvas` with its top-left corner at `offset`.
///
/// Unwritten layer pixels leave the canvas untouched.
pub fn composite(layer: &RenderLayer, canvas: &mut Raster, offset: (i32, i32)) {
    layer.composite_onto(canvas, offset);
}
