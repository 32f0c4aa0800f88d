//! Ingest command - place an upload batch described by a batch file.
//!
//! A batch file has one line per batch row with comma-separated grid ids.
//! Empty fields are blank cells, so `a,,b` places `a` and `b` two columns
//! apart. Images are read from `<images>/<grid_id>.png` when present.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gridmapper::ingest::{IngestReport, UploadBatch};
use gridmapper::store::{is_safe_name, TenantId};
use tracing::{debug, info};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the ingest command.
pub struct IngestArgs {
    pub tenant: String,
    pub batch: PathBuf,
    pub images: Option<PathBuf>,
}

/// Run the ingest command.
pub fn run(runner: &CliRunner, args: IngestArgs) -> Result<(), CliError> {
    runner.log_startup("ingest");

    let tenant = parse_tenant(&args.tenant)?;
    let text = fs::read_to_string(&args.batch).map_err(|error| CliError::FileRead {
        path: args.batch.clone(),
        error,
    })?;
    let cells = parse_batch(&text);
    let batch = attach_images(UploadBatch::new(tenant, cells), args.images.as_deref())?;

    info!(
        batch = %args.batch.display(),
        images = batch.images.len(),
        "Ingesting batch"
    );

    let service = runner.open_service()?;
    let report = service.ingest(&batch)?;
    runner.persist(&service)?;

    print_report(&report);
    Ok(())
}

/// Parse a tenant name from the command line.
pub fn parse_tenant(name: &str) -> Result<TenantId, CliError> {
    TenantId::new(name)
        .map_err(|e| CliError::InvalidArgument(format!("tenant '{}': {}", name, e)))
}

/// Parse batch file text into rows of cells.
pub fn parse_batch(text: &str) -> Vec<Vec<Option<String>>> {
    text.lines()
        .map(|line| {
            line.split(',')
                .map(|field| {
                    let id = field.trim();
                    (!id.is_empty()).then(|| id.to_string())
                })
                .collect()
        })
        .collect()
}

/// Load `<dir>/<grid_id>.png` for every cell that has one.
pub fn attach_images(
    mut batch: UploadBatch,
    images_dir: Option<&Path>,
) -> Result<UploadBatch, CliError> {
    let Some(dir) = images_dir else {
        return Ok(batch);
    };

    let ids: Vec<String> = batch
        .cells
        .iter()
        .flatten()
        .flatten()
        .filter(|id| is_safe_name(id))
        .cloned()
        .collect();

    for id in ids {
        let path = dir.join(format!("{}.png", id));
        match fs::read(&path) {
            Ok(data) => {
                debug!(grid = %id, path = %path.display(), "Attached grid image");
                batch.images.insert(id, data);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(CliError::FileRead { path, error }),
        }
    }
    Ok(batch)
}

fn print_report(report: &IngestReport) {
    match report.map {
        Some(map) => println!("Map:       {}", map),
        None => println!("Map:       (empty batch)"),
    }
    println!("Accepted:  {}", report.accepted);
    println!("Merges:    {}", report.merges);
    if report.inconsistent > 0 {
        println!("Inconsistent placements: {}", report.inconsistent);
    }
    println!(
        "Rebuilt:   {} tiles up to pyramid level {}",
        report.rebuild.tiles_written, report.rebuild.top_zoom
    );

    if !report.failures.is_empty() {
        println!();
        println!("Failed cells ({}):", report.failure_count());
        for failure in &report.failures {
            println!("  {}: {}", failure.grid_id, failure.reason);
        }
    }

    if !report.requested_uploads.is_empty() {
        println!();
        println!("Requested uploads:");
        for id in &report.requested_uploads {
            println!("  {}", id);
        }
    }
}
