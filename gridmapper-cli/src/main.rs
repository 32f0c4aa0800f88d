//! gridmapper CLI - Command-line interface
//!
//! This binary provides a command-line interface to the gridmapper library:
//! ingesting upload batches, exporting tiles and maintaining the pyramid.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::ingest::IngestArgs;
use commands::tile::TileArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "gridmapper")]
#[command(version = gridmapper::VERSION)]
#[command(about = "Stitch uploaded map grids into zoomable tile pyramids", long_about = None)]
struct Cli {
    /// Config file (default: ~/.gridmapper/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place an upload batch and rebuild the affected pyramid
    Ingest {
        /// Tenant owning the maps
        #[arg(long)]
        tenant: String,

        /// Batch file: one line per row, comma-separated grid ids
        #[arg(long)]
        batch: PathBuf,

        /// Directory holding <grid_id>.png images
        #[arg(long)]
        images: Option<PathBuf>,
    },

    /// Export one tile as PNG
    Tile {
        #[arg(long)]
        tenant: String,

        /// Map id
        #[arg(long)]
        map: u64,

        #[arg(long, allow_hyphen_values = true)]
        x: i32,

        #[arg(long, allow_hyphen_values = true)]
        y: i32,

        /// Zoom level (0 = most zoomed out, 7 = full grid resolution)
        #[arg(long)]
        zoom: u8,

        /// Output PNG path
        #[arg(long)]
        output: PathBuf,
    },

    /// List a tenant's maps
    Maps {
        #[arg(long)]
        tenant: String,
    },

    /// Run one repair pass over every map
    Repair {
        /// Maximum tiles to recomposite (default: from config)
        #[arg(long)]
        max_tiles: Option<usize>,
    },

    /// Run scheduled repair passes until interrupted
    Daemon,

    /// Write a default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    if let Commands::InitConfig { force } = cli.command {
        return commands::init::run(config_path, force);
    }

    let runner = CliRunner::new(config_path)?;

    match cli.command {
        Commands::Ingest {
            tenant,
            batch,
            images,
        } => commands::ingest::run(
            &runner,
            IngestArgs {
                tenant,
                batch,
                images,
            },
        ),
        Commands::Tile {
            tenant,
            map,
            x,
            y,
            zoom,
            output,
        } => commands::tile::run(
            &runner,
            TileArgs {
                tenant,
                map,
                x,
                y,
                zoom,
                output,
            },
        ),
        Commands::Maps { tenant } => commands::maps::run(&runner, &tenant),
        Commands::Repair { max_tiles } => commands::repair::run(&runner, max_tiles),
        Commands::Daemon => commands::daemon::run(&runner),
        Commands::InitConfig { .. } => Ok(()),
    }
}
