//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// lcmv - build live contact map vertices in HDF5 ensemble files
///
/// Finds the spatial position group anywhere in the file, concatenates its
/// numbered datasets in index order, and writes the result into every
/// top-level group sharing the given prefix.
///
/// Examples:
///   lcmv --filename run.h5 --prefix ens_
///   lcmv -f run.h5 -p ens_ --dry-run
///   lcmv --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// HDF5 file to modify in place
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub filename: Option<PathBuf>,

    /// Prefix shared amongst all ensemble groups
    #[arg(short, long, value_name = "PREFIX", required_unless_present = "init_config")]
    pub prefix: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .lcmv.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "LCMV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: locate and concatenate without writing to the file
    ///
    /// Opens the file read-only and reports the shape each ensemble
    /// group would receive.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .lcmv.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the file path (empty if not set; validate first).
    pub fn file_path(&self) -> PathBuf {
        self.filename.clone().unwrap_or_default()
    }

    /// Get the group prefix (empty if not set; validate first).
    pub fn group_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        let Some(ref path) = self.filename else {
            return Err("An HDF5 file is required (--filename)".to_string());
        };

        if self.prefix.is_none() {
            return Err("An ensemble group prefix is required (--prefix)".to_string());
        }

        if !path.exists() {
            return Err(format!("File does not exist: {}", path.display()));
        }
        if !path.is_file() {
            return Err(format!("Path is not a file: {}", path.display()));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
