//! Random hexagonal tiling of a plane.
//!
//! [`tile_plane`] repeats one or more tile variants over a [`HexLattice`],
//! giving every cell a random variant and a random [`Orientation`]. With
//! `toroidal` set, cells on the last row and column copy the choice made for
//! their partner on row 0 / column 0, so the bottom and right edges reproduce
//! the top and left ones and the plane repeats without a visible seam. Such a
//! plane is the texture source for the curved-surface projectors.
//!
//! # Visiting order
//!
//! Cells are visited row-major. Every wrap partner sits on row 0 or column 0,
//! so it has always been resolved by the time its dependent edge cell is
//! reached; interior cells have no ordering constraints.

pub mod lattice;
pub mod orientation;
pub mod source;

pub use lattice::HexLattice;
pub use orientation::Orientation;
pub use source::{hex_tile_size, hex_vertices, solid_hex_tile, TileGenerator, TileSource};

use rand::Rng;
use serde::Deserialize;

use crate::colors::{Color, WHITE};
use crate::error::{Error, Result};
use crate::math::vec2::Vec2;
use crate::raster::Raster;

/// Parameters of a tiling pass, also the `[tiling]` config section.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TilingOptions {
    /// Output raster size in pixels.
    pub canvas_size: (u32, u32),
    /// Scale applied to every tile before measuring and placing it.
    pub tile_scale: f32,
    /// Fill shown through transparent tile regions; `None` leaves them clear.
    pub background: Option<Color>,
    /// Make opposite edges match so the plane repeats seamlessly.
    pub toroidal: bool,
}

impl Default for TilingOptions {
    fn default() -> Self {
        Self {
            canvas_size: (6400, 6400),
            tile_scale: 1.0,
            background: Some(WHITE),
            toroidal: false,
        }
    }
}

/// A placed lattice cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexCell {
    pub row: usize,
    pub col: usize,
    /// Pixel-space center on the canvas.
    pub center: Vec2,
    /// Index into the tile list.
    pub variant: usize,
    pub orientation: Orientation,
}

/// Every cell chosen during one tiling pass, addressable by `(row, col)`.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<HexCell>>,
}

impl TileGrid {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&HexCell> {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col].as_ref()
        } else {
            None
        }
    }

    fn insert(&mut self, cell: HexCell) {
        let i = cell.row * self.cols + cell.col;
        debug_assert!(self.cells[i].is_none(), "cell placed twice");
        self.cells[i] = Some(cell);
    }

    /// Placed cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &HexCell> {
        self.cells.iter().flatten()
    }

    /// `(variant, orientation)` of a cell, the part the seam property is about.
    pub fn selection(&self, row: usize, col: usize) -> Option<(usize, Orientation)> {
        self.get(row, col).map(|c| (c.variant, c.orientation))
    }
}

/// Output of [`tile_plane`]: the pixels and the choices that produced them.
#[derive(Clone, Debug)]
pub struct TiledPlane {
    pub raster: Raster,
    pub grid: TileGrid,
}

/// Caches oriented copies of fixed tiles; generated tiles are never cached.
struct OrientedTiles {
    entries: Vec<Option<Raster>>,
}

impl OrientedTiles {
    fn new(variants: usize) -> Self {
        Self {
            entries: vec![None; variants * Orientation::ALL.len()],
        }
    }

    fn get(&mut self, variant: usize, orientation: Orientation, tile: &Raster) -> &Raster {
        let slot = variant * Orientation::ALL.len() + (orientation.code() + 6) as usize;
        self.entries[slot].get_or_insert_with(|| orientation.apply(tile))
    }
}

/// Tiles a plane with randomly oriented copies of `tiles`.
///
/// All variants (and all generator evaluations) must share the same pixel
/// size after scaling by `options.tile_scale`, otherwise
/// [`Error::DimensionMismatch`] is returned. The lattice is derived from the
/// scaled height of the first variant.
pub fn tile_plane<R: Rng + ?Sized>(
    tiles: &[TileSource],
    options: &TilingOptions,
    rng: &mut R,
) -> Result<TiledPlane> {
    let first = tiles
        .first()
        .ok_or_else(|| Error::InvalidGeometry("no tile variants supplied".into()))?;

    // ─────────────────────────────────────────────────────────────────────
    // Step 1: Scale fixed variants and measure the repeating unit
    // ─────────────────────────────────────────────────────────────────────
    let scaled: Vec<Option<Raster>> = tiles
        .iter()
        .map(|t| match t {
            TileSource::Fixed(raster) => raster.scaled(options.tile_scale).map(Some),
            TileSource::Generated(_) => Ok(None),
        })
        .collect::<Result<_>>()?;

    let tile_size = match (&scaled[0], first) {
        (Some(raster), _) => raster.dimensions(),
        (None, source) => source.evaluate(0.0, 0.0).scaled(options.tile_scale)?.dimensions(),
    };
    for raster in scaled.iter().flatten() {
        check_dimensions(tile_size, raster)?;
    }

    let (canvas_w, canvas_h) = options.canvas_size;
    let lattice = HexLattice::new(tile_size.1 as f32, options.canvas_size)?;
    log::info!(
        "tiling {}x{} canvas with {} variant(s) of {}x{} (toroidal: {})",
        canvas_w,
        canvas_h,
        tiles.len(),
        tile_size.0,
        tile_size.1,
        options.toroidal
    );

    let mut canvas = match options.background {
        Some(color) => Raster::filled(canvas_w, canvas_h, color),
        None => Raster::new(canvas_w, canvas_h),
    };
    let mut grid = TileGrid::new(lattice.rows(), lattice.cols());
    let mut cache = OrientedTiles::new(tiles.len());

    // ─────────────────────────────────────────────────────────────────────
    // Step 2: Choose, orient and place each cell
    // ─────────────────────────────────────────────────────────────────────
    for (row, col) in lattice.cells() {
        let (variant, orientation) = select(&lattice, &grid, row, col, tiles.len(), options, rng);
        let center = lattice.center(row, col);

        match &scaled[variant] {
            Some(tile) => {
                canvas.blit_centered(cache.get(variant, orientation, tile), center.x, center.y);
            }
            None => {
                let raw = tiles[variant].evaluate(center.x / canvas_w as f32, center.y / canvas_h as f32);
                let tile = raw.scaled(options.tile_scale)?;
                check_dimensions(tile_size, &tile)?;
                canvas.blit_centered(&orientation.apply(&tile), center.x, center.y);
            }
        }

        grid.insert(HexCell {
            row,
            col,
            center,
            variant,
            orientation,
        });
    }

    Ok(TiledPlane {
        raster: canvas,
        grid,
    })
}

/// Picks `(variant, orientation)` for a cell, honouring its wrap partner.
fn select<R: Rng + ?Sized>(
    lattice: &HexLattice,
    grid: &TileGrid,
    row: usize,
    col: usize,
    variants: usize,
    options: &TilingOptions,
    rng: &mut R,
) -> (usize, Orientation) {
    if options.toroidal {
        if let Some((partner_row, partner_col)) = lattice.wrap_partner(row, col) {
            match grid.selection(partner_row, partner_col) {
                Some(choice) => return choice,
                None => log::warn!(
                    "cell ({row}, {col}) has no wrap partner at ({partner_row}, {partner_col}); \
                     canvas does not divide evenly into the lattice"
                ),
            }
        }
    }
    let variant = if variants > 1 {
        rng.gen_range(0..variants)
    } else {
        0
    };
    (variant, Orientation::random(rng))
}

fn check_dimensions(expected: (u32, u32), tile: &Raster) -> Result<()> {
    if tile.dimensions() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            found: tile.dimensions(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{BLACK, TRANSPARENT};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TILE_HEIGHT: u32 = 20;

    fn pastel_tiles() -> Vec<TileSource> {
        ["#fd8a8a", "#ffcbcb", "#9ea1d4", "#f1f7b5", "#a8d1d1", "#dfebeb"]
            .iter()
            .filter_map(|hex| Color::from_hex(hex))
            .map(|c| TileSource::Fixed(solid_hex_tile(TILE_HEIGHT, c)))
            .collect()
    }

    /// A canvas whose last row and column land on even lattice indices.
    fn even_options(toroidal: bool) -> TilingOptions {
        // 8 rows of h/2 and 8 columns of 1.5 r
        let radius = TILE_HEIGHT as f32 / 3f32.sqrt();
        TilingOptions {
            canvas_size: ((8.0 * 1.5 * radius).floor() as u32, 4 * TILE_HEIGHT),
            tile_scale: 1.0,
            background: Some(BLACK),
            toroidal,
        }
    }

    #[test]
    fn toroidal_edges_copy_row_and_column_zero() {
        let mut rng = StdRng::seed_from_u64(42);
        let plane = tile_plane(&pastel_tiles(), &even_options(true), &mut rng).unwrap();
        let grid = &plane.grid;
        let (last_row, last_col) = (grid.rows() - 1, grid.cols() - 1);
        assert_eq!(last_row % 2, 0);
        assert_eq!(last_col % 2, 0);

        for col in (0..grid.cols()).step_by(2) {
            assert!(grid.selection(0, col).is_some());
            assert_eq!(grid.selection(last_row, col), grid.selection(0, col));
        }
        for row in (0..grid.rows()).step_by(2) {
            assert_eq!(grid.selection(row, last_col), grid.selection(row, 0));
        }
        assert_eq!(grid.selection(last_row, last_col), grid.selection(0, 0));
    }

    #[test]
    fn same_seed_same_plane() {
        let options = even_options(false);
        let a = tile_plane(&pastel_tiles(), &options, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = tile_plane(&pastel_tiles(), &options, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.raster, b.raster);

        let c = tile_plane(&pastel_tiles(), &options, &mut StdRng::seed_from_u64(10)).unwrap();
        assert_ne!(a.grid, c.grid);
    }

    #[test]
    fn every_lattice_cell_is_placed() {
        let mut rng = StdRng::seed_from_u64(1);
        let plane = tile_plane(&pastel_tiles(), &even_options(false), &mut rng).unwrap();
        let lattice = HexLattice::new(TILE_HEIGHT as f32, even_options(false).canvas_size).unwrap();
        assert_eq!(plane.grid.iter().count(), lattice.cells().count());
        assert!(plane.grid.iter().all(|c| c.variant < 6));
    }

    #[test]
    fn tiles_cover_the_canvas() {
        let mut rng = StdRng::seed_from_u64(3);
        let tiles = vec![TileSource::Fixed(solid_hex_tile(40, crate::colors::WHITE))];
        let options = TilingOptions {
            canvas_size: (200, 200),
            background: None,
            ..even_options(false)
        };
        let plane = tile_plane(&tiles, &options, &mut rng).unwrap();
        let holes = plane.raster.pixels().iter().filter(|c| c.is_transparent()).count();
        // Only pixel-rounding slivers along hexagon edges may remain uncovered
        assert!(holes * 10 < plane.raster.pixels().len(), "{holes} holes");
    }

    #[test]
    fn background_shows_through_transparent_tiles() {
        let mut rng = StdRng::seed_from_u64(3);
        let tiles = vec![TileSource::Fixed(Raster::new(10, TILE_HEIGHT))];
        let plane = tile_plane(&tiles, &even_options(false), &mut rng).unwrap();
        assert!(plane.raster.pixels().iter().all(|c| *c == BLACK));

        let options = TilingOptions {
            background: None,
            ..even_options(false)
        };
        let plane = tile_plane(&tiles, &options, &mut rng).unwrap();
        assert!(plane.raster.pixels().iter().all(|c| *c == TRANSPARENT));
    }

    #[test]
    fn mismatched_variants_are_rejected() {
        let tiles = vec![
            TileSource::Fixed(solid_hex_tile(TILE_HEIGHT, BLACK)),
            TileSource::Fixed(solid_hex_tile(TILE_HEIGHT + 2, BLACK)),
        ];
        let err = tile_plane(&tiles, &even_options(false), &mut StdRng::seed_from_u64(0));
        assert!(matches!(err, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn generator_size_drift_is_rejected() {
        let tiles = vec![TileSource::generated(|fx, _| {
            let h = if fx > 0.5 { TILE_HEIGHT + 4 } else { TILE_HEIGHT };
            solid_hex_tile(h, BLACK)
        })];
        let err = tile_plane(&tiles, &even_options(false), &mut StdRng::seed_from_u64(0));
        assert!(matches!(err, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn generator_varies_across_the_plane() {
        let tiles = vec![TileSource::generated(|fx, _| {
            solid_hex_tile(TILE_HEIGHT, Color::rgb((fx * 255.0).round() as u8, 0, 0))
        })];
        let options = even_options(false);
        let plane = tile_plane(&tiles, &options, &mut StdRng::seed_from_u64(5)).unwrap();
        let left = plane.raster.get(2, 10).unwrap();
        let right = plane.raster.get(options.canvas_size.0 as i32 - 3, 10).unwrap();
        assert!(left.r < right.r, "{left:?} vs {right:?}");
    }

    #[test]
    fn empty_input_and_zero_canvas_fail() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            tile_plane(&[], &TilingOptions::default(), &mut rng),
            Err(Error::InvalidGeometry(_))
        ));
        let options = TilingOptions {
            canvas_size: (0, 10),
            ..TilingOptions::default()
        };
        assert!(matches!(
            tile_plane(&pastel_tiles(), &options, &mut rng),
            Err(Error::InvalidGeometry(_))
        ));
    }
}
