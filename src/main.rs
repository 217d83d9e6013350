use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hexsphere::config::RenderConfig;
use hexsphere::light::ShadingModel;
use hexsphere::nest::build_nest;
use hexsphere::progress::{Progress, Throttled};
use hexsphere::render::{project_torus, Sampling, SphereProjector};
use hexsphere::tiling::{solid_hex_tile, tile_plane, TileSource};
use hexsphere::{Color, Error, Raster, Result};

#[derive(Parser, Debug)]
#[command(name = "hexsphere", version, about = "Hexagonal tilings wrapped onto spheres and tori")]
struct Cli {
    /// TOML file with [tiling], [sphere], [torus] and [nest] sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for tile orientations and nest centers; random when omitted.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tile a plane with randomly oriented hexagons.
    Tile {
        /// Tile images; each one is a variant.
        #[arg(long = "tile")]
        tiles: Vec<PathBuf>,
        /// Solid hexagon variants given as hex colors, used when no --tile is given.
        #[arg(long = "hex-color", default_values = ["#fd8a8a", "#a8d1d1"])]
        hex_colors: Vec<String>,
        /// Height of the solid hexagons in pixels.
        #[arg(long, default_value_t = 64)]
        hex_height: u32,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(long)]
        scale: Option<f32>,
        /// Make opposite edges match.
        #[arg(long)]
        toroidal: bool,
        /// Leave uncovered areas transparent instead of filling the background.
        #[arg(long)]
        transparent: bool,
        #[arg(short, long, default_value = "plane.png")]
        output: PathBuf,
    },
    /// Wrap a plane around a sphere.
    Sphere {
        plane: PathBuf,
        #[arg(long)]
        radius: Option<u32>,
        #[arg(long)]
        shadow: Option<f32>,
        #[arg(short, long, default_value = "sphere.png")]
        output: PathBuf,
    },
    /// Wrap a plane around a torus.
    Torus {
        plane: PathBuf,
        /// Output width and height.
        #[arg(long)]
        size: Option<u32>,
        #[arg(long, value_enum)]
        shading: Option<ShadingArg>,
        /// Pick sample counts for at most this many pixels between samples.
        #[arg(long)]
        adaptive: Option<f32>,
        /// Skip samples facing away from the camera.
        #[arg(long)]
        cull: bool,
        #[arg(short, long, default_value = "torus.png")]
        output: PathBuf,
    },
    /// Layer several spheres back to front.
    Nest {
        /// One plane per layer, front first; the last one fills any remaining layers.
        #[arg(required = true)]
        planes: Vec<PathBuf>,
        #[arg(long, default_value_t = 1200)]
        radius: u32,
        #[arg(long)]
        layers: Option<usize>,
        #[arg(long)]
        shrink: Option<f32>,
        #[arg(short, long, default_value = "nested_spheres.png")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShadingArg {
    Simple,
    Lambertian,
    HalfLambertian,
}

impl From<ShadingArg> for ShadingModel {
    fn from(arg: ShadingArg) -> Self {
        match arg {
            ShadingArg::Simple => ShadingModel::Simple,
            ShadingArg::Lambertian => ShadingModel::Lambertian,
            ShadingArg::HalfLambertian => ShadingModel::HalfLambertian,
        }
    }
}

/// Percentage line on stderr, rewritten in place.
fn progress_line(label: &'static str) -> impl Progress {
    Throttled::new(move |fraction: f32| {
        eprint!("\r{label}: {:.0}%", fraction * 100.0);
        if fraction >= 1.0 {
            eprintln!();
        }
        let _ = std::io::stderr().flush();
    })
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    let seed = cli.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("random seed {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    match cli.command {
        Command::Tile {
            tiles,
            hex_colors,
            hex_height,
            width,
            height,
            scale,
            toroidal,
            transparent,
            output,
        } => {
            let options = &mut config.tiling;
            options.canvas_size.0 = width.unwrap_or(options.canvas_size.0);
            options.canvas_size.1 = height.unwrap_or(options.canvas_size.1);
            options.tile_scale = scale.unwrap_or(options.tile_scale);
            options.toroidal |= toroidal;
            if transparent {
                options.background = None;
            }

            let sources = if tiles.is_empty() {
                hex_colors
                    .iter()
                    .map(|hex| {
                        Color::from_hex(hex)
                            .map(|c| TileSource::from(solid_hex_tile(hex_height, c)))
                            .ok_or_else(|| Error::InvalidGeometry(format!("bad tile color {hex:?}")))
                    })
                    .collect::<Result<Vec<_>>>()?
            } else {
                tiles
                    .iter()
                    .map(|path| Raster::open(path).map(TileSource::from))
                    .collect::<Result<Vec<_>>>()?
            };

            let plane = tile_plane(&sources, &config.tiling, &mut rng)?;
            plane.raster.save(&output)?;
            info!("wrote {}", output.display());
        }
        Command::Sphere {
            plane,
            radius,
            shadow,
            output,
        } => {
            let sphere = &mut config.sphere;
            sphere.radius = radius.unwrap_or(sphere.radius);
            sphere.shadow_amount = shadow.unwrap_or(sphere.shadow_amount);

            let plane = Raster::open(&plane)?;
            let mut progress = progress_line("sphere");
            let layer = SphereProjector::from(&config.sphere).project(&plane, &mut progress)?;
            let size = layer.width();
            // Outside the disc shows white, as a standalone image
            let mut canvas = Raster::filled(size, size, hexsphere::colors::WHITE);
            layer.composite_onto(&mut canvas, (0, 0));
            canvas.save(&output)?;
            info!("wrote {}", output.display());
        }
        Command::Torus {
            plane,
            size,
            shading,
            adaptive,
            cull,
            output,
        } => {
            let torus = &mut config.torus;
            if let Some(size) = size {
                torus.output_size = [size, size];
            }
            if let Some(shading) = shading {
                torus.shading = shading.into();
            }
            if let Some(max_step_px) = adaptive {
                torus.sampling = Sampling::Adaptive { max_step_px };
            }
            torus.backface_culling |= cull;

            let plane = Raster::open(&plane)?;
            let mut progress = progress_line("torus");
            let (layer, report) = project_torus(&plane, &config.torus, &mut progress)?;
            if let Some(advisory) = report.underrun() {
                info!("writing the image anyway: {advisory}");
            }
            layer.resolve().save(&output)?;
            info!("wrote {}", output.display());
        }
        Command::Nest {
            planes,
            radius,
            layers,
            shrink,
            output,
        } => {
            let nest = &mut config.nest;
            nest.layer_count = layers.unwrap_or(nest.layer_count);
            nest.shrink_factor = shrink.unwrap_or(nest.shrink_factor);

            let planes = planes
                .iter()
                .map(Raster::open)
                .collect::<Result<Vec<_>>>()?;
            let mut progress = progress_line("nest");
            let canvas = build_nest(&planes, radius, &config.nest, &mut rng, &mut progress)?;
            canvas.save(&output)?;
            info!("wrote {}", output.display());
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Cli::parse()) {
        error!("{err}");
        std::process::exit(1);
    }
}
