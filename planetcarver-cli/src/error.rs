//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use planetcarver::bootstrap::BootstrapError;
use planetcarver::catalog::CatalogError;
use planetcarver::scheduler::SchedulerError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Failed to prepare the working or output directory
    Directory {
        path: std::path::PathBuf,
        error: std::io::Error,
    },
    /// Failed to create the catalog client
    Catalog(CatalogError),
    /// Bootstrap (download / root seeding) failed
    Bootstrap(BootstrapError),
    /// Scheduler could not start
    Scheduler(SchedulerError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Scheduler(SchedulerError::MissingRoot { .. }) => {
                eprintln!();
                eprintln!("The working directory has no root extent (0_0_0.pbf).");
                eprintln!("Run without --skip-download, or place a planet dump there manually.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Directory { path, error } => {
                write!(f, "Failed to prepare directory {}: {}", path.display(), error)
            }
            CliError::Catalog(e) => write!(f, "Failed to create catalog client: {}", e),
            CliError::Bootstrap(e) => write!(f, "Bootstrap failed: {}", e),
            CliError::Scheduler(e) => write!(f, "Scheduler failed to start: {}", e),
        }
    }
}

impl std::error::Error for CliError {}
