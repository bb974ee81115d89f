//! Command line front end for the geocoding engine.
//!
//! Loads the boundary corpus, runs one operation and prints the results as
//! JSON lines on stdout. Logs go to stderr.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geomapper::infer::find_lat_lon;
use geomapper::{EngineConfig, GeoEngine, IdentifierType};

mod input;
use input::Table;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "geocode")]
#[command(about = "Map coordinates and identifiers to administrative regions")]
struct Args {
    /// Boundary corpus directory (overrides the config file)
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve coordinates to regions
    Reverse {
        /// Admin level: 0 country, 1 first subdivision, 2 second subdivision
        #[arg(short, long, default_value = "0")]
        level: u8,

        /// Read coordinates from a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Latitude column of the CSV file (inferred if omitted)
        #[arg(long)]
        lat: Option<String>,

        /// Longitude column of the CSV file (inferred if omitted)
        #[arg(long)]
        lon: Option<String>,

        /// Coordinates as LAT,LON
        #[arg(allow_hyphen_values = true)]
        coords: Vec<String>,
    },

    /// Resolve names or codes to regions
    Encode {
        /// Identifier scheme (detected if omitted)
        #[arg(short, long)]
        scheme: Option<IdentifierType>,

        #[arg(long)]
        csv: Option<PathBuf>,

        /// Column of the CSV file holding the identifiers
        #[arg(long)]
        column: Option<String>,

        values: Vec<String>,
    },

    /// Detect the identifier scheme of a list of values
    Detect {
        #[arg(long)]
        csv: Option<PathBuf>,

        #[arg(long)]
        column: Option<String>,

        values: Vec<String>,
    },

    /// Bounding rectangle of region ids
    Bounds { ids: Vec<String> },

    /// List every value a scheme recognizes
    Values {
        #[arg(short, long)]
        scheme: IdentifierType,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = args.corpus {
        config.corpus_dir = dir;
    }
    config.validate()?;

    let engine = GeoEngine::spawn(config);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.command {
        Command::Reverse {
            level,
            csv,
            lat,
            lon,
            coords,
        } => {
            let coords = match csv {
                Some(path) => coords_from_csv(&Table::read(&path)?, lat, lon)?,
                None => coords
                    .iter()
                    .map(|c| parse_coord(c))
                    .collect::<Result<Vec<_>>>()?,
            };
            let records = engine.resolve(&coords, level).await?;
            info!(
                "Resolved {}/{} coordinates",
                records.iter().filter(|r| !r.is_null()).count(),
                records.len()
            );
            write_lines(&mut out, &records)?;
        }
        Command::Encode {
            scheme,
            csv,
            column,
            values,
        } => {
            let values = collect_values(csv, column, values)?;
            let scheme = match scheme {
                Some(scheme) => scheme,
                None => engine
                    .detect_scheme(&values)
                    .await?
                    .context("Could not detect the identifier scheme, pass --scheme")?,
            };
            info!("Encoding {} values as {}", values.len(), scheme.label());
            let records = engine.encode(&values, scheme).await?;
            write_lines(&mut out, &records)?;
        }
        Command::Detect {
            csv,
            column,
            values,
        } => {
            let values = collect_values(csv, column, values)?;
            let scheme = engine.detect_scheme(&values).await?;
            write_lines(&mut out, &[scheme])?;
        }
        Command::Bounds { ids } => {
            let rect = engine.bounding_rect(&ids).await?;
            write_lines(&mut out, &[rect])?;
        }
        Command::Values { scheme } => {
            let values = engine.valid_values(scheme).await?;
            write_lines(&mut out, &values)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn write_lines<W: Write, T: Serialize>(out: &mut W, items: &[T]) -> Result<()> {
    for item in items {
        serde_json::to_writer(&mut *out, item)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Parse `LAT,LON`
fn parse_coord(value: &str) -> Result<[f64; 2]> {
    let (lat, lon) = value
        .split_once(',')
        .with_context(|| format!("Expected LAT,LON, got '{}'", value))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid latitude in '{}'", value))?;
    let lon = lon
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid longitude in '{}'", value))?;
    Ok([lat, lon])
}

fn coords_from_csv(
    table: &Table,
    lat: Option<String>,
    lon: Option<String>,
) -> Result<Vec<[f64; 2]>> {
    let columns = table.numeric_columns();
    let (inferred_lat, inferred_lon) = find_lat_lon(&columns);
    let name_of = |index: Option<usize>| index.map(|i| columns[i].name.clone());

    let lat = lat
        .or_else(|| name_of(inferred_lat))
        .context("No latitude column found, pass --lat")?;
    let lon = lon
        .or_else(|| name_of(inferred_lon))
        .context("No longitude column found, pass --lon")?;
    if lat == lon {
        bail!("Cannot tell latitude from longitude (both '{}'), pass --lat and --lon", lat);
    }
    info!("Using columns '{}' (latitude) and '{}' (longitude)", lat, lon);

    let lats = table.numbers(&lat)?;
    let lons = table.numbers(&lon)?;
    Ok(lats.into_iter().zip(lons).map(|(lat, lon)| [lat, lon]).collect())
}

fn collect_values(
    csv: Option<PathBuf>,
    column: Option<String>,
    values: Vec<String>,
) -> Result<Vec<String>> {
    match (csv, column) {
        (Some(path), Some(column)) => Table::read(&path)?.strings(&column),
        (Some(_), None) => bail!("--csv needs --column"),
        (None, _) => Ok(values),
    }
}
