//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use gridmapper::config::ConfigFileError;
use gridmapper::service::ServiceError;
use gridmapper::store::StoreError;
use std::fmt;
use std::path::PathBuf;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Failed to open the map service
    ServiceCreation(ServiceError),
    /// A map operation failed
    Service(ServiceError),
    /// Failed to read an input file
    FileRead { path: PathBuf, error: std::io::Error },
    /// Failed to write output file
    FileWrite { path: PathBuf, error: std::io::Error },
    /// Failed to set up the async runtime
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::ServiceCreation(ServiceError::Store(StoreError::SnapshotVersion {
                ..
            })) => {
                eprintln!();
                eprintln!("The metadata snapshot was written by an incompatible version.");
                eprintln!("Move it aside and run 'gridmapper repair' to rebuild tiles.");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'gridmapper init-config --force' to write a fresh config file.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::ServiceCreation(e) => write!(f, "Failed to open map storage: {}", e),
            CliError::Service(e) => write!(f, "{}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path.display(), error)
            }
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ServiceCreation(e) => Some(e),
            CliError::Service(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Service(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}
