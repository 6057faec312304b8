//! quadcell CLI - inspect geometry decks, locate points and trace rays.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use quadcell_kernel::{
    integrate_attenuation, Diagnostics, GeometryDeck, GeometryManager, Ray, TraceSettings, Track,
};
use quadcell_math::{Point3, Vec3};

#[derive(Parser)]
#[command(name = "quadcell")]
#[command(about = "Quadric CSG geometry: point location and ray tracing", long_about = None)]
struct Cli {
    /// TOML trace settings (tolerances, distance solver, materials)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a deck, build its index and list the cells
    Check {
        /// Geometry deck
        deck: PathBuf,
    },
    /// Report the cell holding a point
    Locate {
        /// Geometry deck
        deck: PathBuf,
        /// Point coordinates
        #[arg(num_args = 3, allow_negative_numbers = true)]
        point: Vec<f64>,
    },
    /// Trace a ray and print the cell spans along it
    Trace {
        /// Geometry deck
        deck: PathBuf,
        /// Ray origin
        #[arg(long, num_args = 3, allow_negative_numbers = true)]
        origin: Vec<f64>,
        /// Ray direction (normalized internally)
        #[arg(long, num_args = 3, allow_negative_numbers = true)]
        direction: Vec<f64>,
        /// Wavelength in ångström for the transmission estimate
        #[arg(short, long)]
        wavelength: Option<f64>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct SpanReport {
    cell: i32,
    material: i32,
    entry: [f64; 3],
    exit: [f64; 3],
    from: f64,
    to: f64,
    length: f64,
}

#[derive(Serialize)]
struct TraceReport {
    spans: Vec<SpanReport>,
    total_length: f64,
    transmission: Option<f64>,
    diagnostics: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref())?;

    match cli.command {
        Commands::Check { deck } => check(&deck, &settings)?,
        Commands::Locate { deck, point } => {
            let manager = load_manager(&deck, &settings)?;
            let p = Point3::from(triple(&point)?);
            match manager.locate_cell(&p, None).and_then(|id| manager.cell(id)) {
                Some(cell) => println!("cell {}", cell.number()),
                None => println!("vacuum"),
            }
        }
        Commands::Trace {
            deck,
            origin,
            direction,
            wavelength,
            json,
        } => {
            let manager = load_manager(&deck, &settings)?;
            let ray = Ray::new(Point3::from(triple(&origin)?), Vec3::from(triple(&direction)?))
                .context("ray direction must be non-zero")?;
            let mut diagnostics = Diagnostics::new();
            let track = manager.trace_ray_with(&ray, &mut diagnostics)?;
            let transmission = match wavelength {
                Some(w) => Some(integrate_attenuation(&track, w, &settings.material_library()?)),
                None => None,
            };
            let report = report(&track, transmission, &diagnostics);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_table(&report);
            }
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<TraceSettings> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(TraceSettings::from_toml_str(&text)?)
        }
        None => Ok(TraceSettings::default()),
    }
}

fn load_manager(deck: &Path, settings: &TraceSettings) -> Result<GeometryManager> {
    let text =
        std::fs::read_to_string(deck).with_context(|| format!("reading {}", deck.display()))?;
    let manager = GeometryDeck::parse(&text)
        .and_then(|d| d.into_manager(settings))
        .with_context(|| format!("building geometry from {}", deck.display()))?;
    tracing::info!(cells = manager.len(), "geometry ready");
    Ok(manager)
}

fn check(deck: &Path, settings: &TraceSettings) -> Result<()> {
    let manager = load_manager(deck, settings)?;
    println!("{}: {} cells", deck.display(), manager.len());
    for cell in manager.cells() {
        println!("  {cell}");
        println!("    surfaces: {:?}", cell.surface_ids());
    }
    Ok(())
}

fn triple(values: &[f64]) -> Result<[f64; 3]> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => anyhow::bail!("expected 3 coordinates, got {}", values.len()),
    }
}

fn report(track: &Track, transmission: Option<f64>, diagnostics: &Diagnostics) -> TraceReport {
    let spans = track
        .links()
        .iter()
        .map(|l| SpanReport {
            cell: l.cell,
            material: l.material,
            entry: [l.entry.x, l.entry.y, l.entry.z],
            exit: [l.exit.x, l.exit.y, l.exit.z],
            from: l.entry_distance,
            to: l.exit_distance,
            length: l.length(),
        })
        .collect();
    TraceReport {
        spans,
        total_length: track.total_length(),
        transmission,
        diagnostics: diagnostics.to_string(),
    }
}

fn print_table(report: &TraceReport) {
    println!("{:>6} {:>8} {:>12} {:>12} {:>10}", "cell", "material", "from", "to", "length");
    for s in &report.spans {
        println!(
            "{:>6} {:>8} {:>12.6} {:>12.6} {:>10.6}",
            s.cell, s.material, s.from, s.to, s.length
        );
    }
    println!("total length: {:.6}", report.total_length);
    if let Some(t) = report.transmission {
        println!("transmission: {t:.6}");
    }
    println!("diagnostics: {}", report.diagnostics);
}
