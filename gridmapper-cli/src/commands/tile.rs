//! Tile command - export one pyramid tile to a PNG file.

use std::fs;
use std::path::PathBuf;

use gridmapper::coord::Coord;
use gridmapper::store::MapId;
use tracing::info;

use super::ingest::parse_tenant;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the tile command.
pub struct TileArgs {
    pub tenant: String,
    pub map: u64,
    pub x: i32,
    pub y: i32,
    /// Exposed zoom, where the maximum is full grid resolution
    pub zoom: u8,
    pub output: PathBuf,
}

/// Run the tile command.
pub fn run(runner: &CliRunner, args: TileArgs) -> Result<(), CliError> {
    runner.log_startup("tile");

    let tenant = parse_tenant(&args.tenant)?;
    let coord = Coord::new(args.x, args.y);
    let service = runner.open_service()?;

    let Some(tile) = service.get_tile(&tenant, MapId(args.map), coord, args.zoom)? else {
        return Err(CliError::InvalidArgument(format!(
            "no tile at map {} coord {} zoom {}",
            args.map, coord, args.zoom
        )));
    };

    fs::write(&args.output, &tile.bytes).map_err(|error| CliError::FileWrite {
        path: args.output.clone(),
        error,
    })?;

    info!(
        output = %args.output.display(),
        bytes = tile.bytes.len(),
        "Tile exported"
    );
    println!(
        "Saved {} ({} bytes, updated {})",
        args.output.display(),
        tile.bytes.len(),
        tile.updated.to_rfc3339()
    );
    Ok(())
}
