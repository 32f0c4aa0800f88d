//! Integration tests for the gridmapper CLI.
//!
//! Each test runs the built binary against a config file pointing storage
//! and logs into a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

/// Temporary workspace with a config file, an images directory and storage.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let ws = Self { dir };
        fs::create_dir_all(ws.images()).unwrap();
        fs::write(
            ws.config(),
            format!(
                "[storage]\ndirectory = {}\n\n[logging]\ndirectory = {}\nfile = test.log\n",
                ws.path().join("data").display(),
                ws.path().join("logs").display()
            ),
        )
        .unwrap();
        ws
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> PathBuf {
        self.path().join("config.ini")
    }

    fn images(&self) -> PathBuf {
        self.path().join("images")
    }

    fn add_image(&self, grid_id: &str, color: [u8; 4]) {
        RgbaImage::from_pixel(100, 100, Rgba(color))
            .save(self.images().join(format!("{}.png", grid_id)))
            .unwrap();
    }

    fn write_batch(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Run the CLI with `--config` pointing at this workspace.
    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_gridmapper"))
            .arg("--config")
            .arg(self.config())
            .args(args)
            .env("RUST_LOG", "warn")
            .output()
            .expect("Failed to execute CLI command")
    }

    fn ingest(&self, batch: &Path) -> Output {
        self.run(&[
            "ingest",
            "--tenant",
            "guild",
            "--batch",
            batch.to_str().unwrap(),
            "--images",
            self.images().to_str().unwrap(),
        ])
    }
}

/// Assert a command succeeded.
fn assert_success(output: &Output, context: &str) {
    if !output.status.success() {
        panic!(
            "{} failed:\nstdout: {}\nstderr: {}",
            context,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_ingest_then_export_top_tile() {
    let ws = Workspace::new();
    ws.add_image("a", [255, 0, 0, 255]);
    let batch = ws.write_batch("batch.txt", "a\n");

    let output = ws.ingest(&batch);
    assert_success(&output, "ingest");
    assert!(stdout(&output).contains("Accepted:  1"));

    let tile = ws.path().join("top.png");
    let output = ws.run(&[
        "tile", "--tenant", "guild", "--map", "1", "--x", "0", "--y", "0", "--zoom", "0",
        "--output", tile.to_str().unwrap(),
    ]);
    assert_success(&output, "tile");

    let img = image::open(&tile).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (100, 100));
    assert_eq!(*img.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
}

#[test]
fn test_state_persists_between_runs() {
    let ws = Workspace::new();
    ws.add_image("a", [0, 255, 0, 255]);
    assert_success(&ws.ingest(&ws.write_batch("one.txt", "a")), "first ingest");

    // Second run anchors on the known grid and reports the new one as wanted
    let output = ws.ingest(&ws.write_batch("two.txt", "a,b"));
    assert_success(&output, "second ingest");
    let out = stdout(&output);
    assert!(out.contains("Map:       1"));
    assert!(out.contains("Requested uploads:\n  b"));

    let output = ws.run(&["maps", "--tenant", "guild"]);
    assert_success(&output, "maps");
    assert_eq!(stdout(&output).lines().count(), 2);
}

#[test]
fn test_missing_tile_fails() {
    let ws = Workspace::new();
    let tile = ws.path().join("none.png");

    let output = ws.run(&[
        "tile", "--tenant", "guild", "--map", "9", "--x", "-3", "--y", "4", "--zoom", "7",
        "--output", tile.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(!tile.exists());
}

#[test]
fn test_invalid_zoom_fails() {
    let ws = Workspace::new();
    let tile = ws.path().join("none.png");

    let output = ws.run(&[
        "tile", "--tenant", "guild", "--map", "1", "--x", "0", "--y", "0", "--zoom", "8",
        "--output", tile.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("zoom"));
}

#[test]
fn test_repair_on_consistent_store_repairs_nothing() {
    let ws = Workspace::new();
    ws.add_image("a", [0, 0, 255, 255]);
    assert_success(&ws.ingest(&ws.write_batch("b.txt", "a")), "ingest");

    let output = ws.run(&["repair"]);
    assert_success(&output, "repair");
    assert!(stdout(&output).contains("Tiles repaired: 0"));
}

#[test]
fn test_init_config_respects_force() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("config.ini");
    let run = |args: &[&str]| {
        Command::new(env!("CARGO_BIN_EXE_gridmapper"))
            .arg("--config")
            .arg(&config)
            .args(args)
            .output()
            .unwrap()
    };

    assert_success(&run(&["init-config"]), "init-config");
    assert!(fs::read_to_string(&config).unwrap().contains("[storage]"));

    fs::write(&config, "# edited\n").unwrap();
    assert_success(&run(&["init-config"]), "init-config without force");
    assert_eq!(fs::read_to_string(&config).unwrap(), "# edited\n");

    assert_success(&run(&["init-config", "--force"]), "init-config --force");
    assert!(fs::read_to_string(&config).unwrap().contains("[repair]"));
}
