#![deny(unsafe_code)]
//! Headless CLI for the backdrop particle field.
//!
//! Subcommands:
//! - `render`: run the field N frames on a software surface, write a PNG
//! - `simulate`: run N frames (optionally shrinking mid-run) and report bounds
//! - `config`: print the default field configuration

mod error;

use std::path::PathBuf;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use backdrop_core::surface::{BackingStore, Surface, SurfaceSize};
use backdrop_core::{
    run_frames, BackdropError, FieldConfig, FrameLoop, ParticleField, Theme, Tint,
};
use backdrop_raster::{page_background, RasterSurface};
use clap::{Parser, Subcommand, ValueEnum};
use error::CliError;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Synthetic frame interval (60 Hz).
const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Parser)]
#[command(name = "backdrop", about = "Headless particle background renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Light => Theme::Light,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the field for N frames and write a PNG snapshot.
    Render {
        /// Surface width in CSS pixels.
        #[arg(short = 'W', long, default_value_t = 800.0)]
        width: f64,

        /// Surface height in CSS pixels.
        #[arg(short = 'H', long, default_value_t = 600.0)]
        height: f64,

        /// Device pixel ratio (capped by the config).
        #[arg(short, long, default_value_t = 1.0)]
        ratio: f64,

        /// Number of frames to advance before the snapshot.
        #[arg(short, long, default_value_t = 120)]
        frames: usize,

        #[arg(short, long, value_enum, default_value_t = ThemeArg::Dark)]
        theme: ThemeArg,

        /// PRNG seed; overrides the config's seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Field configuration as a JSON string.
        #[arg(long, default_value = "{}")]
        config: String,

        /// Output file path.
        #[arg(short, long, default_value = "backdrop.png")]
        output: PathBuf,
    },
    /// Run the field headlessly and report how far particles strayed.
    Simulate {
        #[arg(short = 'W', long, default_value_t = 800.0)]
        width: f64,

        #[arg(short = 'H', long, default_value_t = 600.0)]
        height: f64,

        #[arg(short, long, default_value_t = 1000)]
        frames: usize,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value = "{}")]
        config: String,

        /// Resize the surface mid-run, e.g. `300x200`.
        #[arg(long)]
        shrink_to: Option<String>,

        /// Frame at which the resize notification fires (default: half way).
        #[arg(long)]
        shrink_at: Option<usize>,
    },
    /// Print the default field configuration.
    Config,
}

/// Surface that discards all drawing.
struct NullSurface;

impl Surface for NullSurface {
    fn configure(&mut self, _store: &BackingStore) {}
    fn clear(&mut self, _size: SurfaceSize) {}
    fn set_fill(&mut self, _tint: &Tint) {}
    fn fill_circle(&mut self, _x: f64, _y: f64, _radius: f64) {}
}

/// Running min/max of particle positions plus particle-frames spent out of
/// bounds. The ranges stay `None` until a frame is observed.
#[derive(Debug, Default)]
struct BoundsReport {
    x: Option<[f64; 2]>,
    y: Option<[f64; 2]>,
    out_of_bounds: usize,
}

fn widen(range: &mut Option<[f64; 2]>, v: f64) {
    *range = Some(match *range {
        Some([lo, hi]) => [lo.min(v), hi.max(v)],
        None => [v, v],
    });
}

impl BoundsReport {
    fn observe(&mut self, x: f64, y: f64, inside: bool) {
        widen(&mut self.x, x);
        widen(&mut self.y, y);
        if !inside {
            self.out_of_bounds += 1;
        }
    }

    fn to_json(&self, count: usize, frames: usize) -> serde_json::Value {
        let mut info = serde_json::json!({
            "count": count,
            "frames": frames,
            "out_of_bounds": self.out_of_bounds,
        });
        if let (Some([min_x, max_x]), Some([min_y, max_y])) = (self.x, self.y) {
            info["min_x"] = min_x.into();
            info["max_x"] = max_x.into();
            info["min_y"] = min_y.into();
            info["max_y"] = max_y.into();
        }
        info
    }
}

fn format_range(range: Option<[f64; 2]>) -> String {
    match range {
        Some([lo, hi]) => format!("[{lo:.2}, {hi:.2}]"),
        None => "n/a".to_owned(),
    }
}

fn load_config(json: &str, seed: Option<u64>) -> Result<FieldConfig, CliError> {
    let mut config = FieldConfig::from_json_str(json).map_err(|e| match e {
        BackdropError::Serialization(msg) => {
            CliError::Input(format!("invalid --config JSON: {msg}"))
        }
        other => CliError::Config(other),
    })?;
    if seed.is_some() {
        config.seed = seed;
    }
    Ok(config)
}

fn parse_size(spec: &str) -> Result<SurfaceSize, CliError> {
    let invalid = || CliError::Input(format!("expected WIDTHxHEIGHT, got {spec:?}"));
    let (w, h) = spec.split_once('x').ok_or_else(invalid)?;
    let w: f64 = w.trim().parse().map_err(|_| invalid())?;
    let h: f64 = h.trim().parse().map_err(|_| invalid())?;
    Ok(SurfaceSize::new(w, h))
}

fn wall_clock_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}

fn build_field(size: SurfaceSize, ratio: f64, config: FieldConfig) -> ParticleField {
    let mut rng = config.rng(wall_clock_ms());
    ParticleField::new(size, ratio, config, &mut rng)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&FieldConfig::default())?);
        }
        Command::Render {
            width,
            height,
            ratio,
            frames,
            theme,
            seed,
            config,
            output,
        } => {
            let config = load_config(&config, seed)?;
            let theme = Theme::from(theme);
            let field = build_field(SurfaceSize::new(width, height), ratio, config);
            let count = field.len();
            let mut frame_loop = FrameLoop::new(field, RasterSurface::new(), theme);
            run_frames(&mut frame_loop, frames, 0.0, FRAME_MS, |_, _| {});

            backdrop_raster::snapshot::write_png(
                frame_loop.surface(),
                page_background(theme),
                &output,
            )?;
            info!(count, frames, "snapshot written");

            if cli.json {
                let info = serde_json::json!({
                    "width": width,
                    "height": height,
                    "ratio": frame_loop.field().backing_store().scale,
                    "particles": count,
                    "frames": frames,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {count} particles ({width}x{height}, {frames} frames) -> {}",
                    output.display()
                );
            }
        }
        Command::Simulate {
            width,
            height,
            frames,
            seed,
            config,
            shrink_to,
            shrink_at,
        } => {
            let config = load_config(&config, seed)?;
            let shrink = shrink_to.as_deref().map(parse_size).transpose()?;
            let shrink_at = shrink_at.unwrap_or(frames / 2);
            let margin = config.edge.margin();

            let field = build_field(SurfaceSize::new(width, height), 1.0, config);
            let count = field.len();
            let mut frame_loop = FrameLoop::new(field, NullSurface, Theme::Dark);
            let mut report = BoundsReport::default();

            run_frames(&mut frame_loop, frames, 0.0, FRAME_MS, |i, l| {
                let size = l.field().size();
                for p in l.field().particles() {
                    report.observe(p.position.x, p.position.y, p.within(size, margin));
                }
                if let Some(target) = shrink {
                    if i == shrink_at {
                        l.request_resize(target, 1.0, i as f64 * FRAME_MS);
                    }
                }
            });

            if cli.json {
                let info = report.to_json(count, frames);
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("particles:     {count}");
                println!("frames:        {frames}");
                println!("x range:       {}", format_range(report.x));
                println!("y range:       {}", format_range(report.y));
                println!("out of bounds: {}", report.out_of_bounds);
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
