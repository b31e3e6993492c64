//! lcmv - live contact map vertices for HDF5 ensemble files
//!
//! A CLI tool that locates the spatial position group inside an HDF5
//! file, concatenates its numbered datasets in index order, and writes
//! the result into every ensemble group sharing a name prefix.
//!
//! Exit codes:
//!   0 - Success (including runs where no group matches the prefix)
//!   1 - Runtime error (arguments, config, HDF5 I/O, lookup, naming, shape)

mod aggregate;
mod cli;
mod config;
mod error;
mod locator;
mod models;
mod pipeline;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is loaded before logging so it can raise the log level
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(log_level(&args, &config));

    info!("lcmv v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Layout: {:?}", config.layout);

    match run(&args, &config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .lcmv.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change the source group, output dataset, or index convention.");
    Ok(())
}

/// Effective log level: --quiet wins, then verbose from flags or config.
fn log_level(args: &Args, config: &Config) -> tracing::Level {
    if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Process the file named on the command line. Returns the exit code.
fn run(args: &Args, config: &Config) -> Result<i32> {
    let start_time = Instant::now();
    let path = args.file_path();
    let prefix = args.group_prefix();

    // The handle closes when it goes out of scope, including on error
    let file = if args.dry_run {
        hdf5::File::open(&path)
    } else {
        hdf5::File::open_rw(&path)
    }
    .with_context(|| format!("Failed to open HDF5 file: {}", path.display()))?;

    if !args.quiet {
        let mode = if args.dry_run { "read-only, dry run" } else { "read-write" };
        println!("📂 Opened {} ({})", path.display(), mode);
        println!("   Ensemble prefix: '{}'", prefix);
        println!("   Source group: '{}'", config.layout.source_group);
        println!("   Output dataset: '{}'\n", config.layout.output_dataset);
    }

    let summary = pipeline::process(&file, prefix, &config.layout, args.dry_run, |outcome| {
        println!("{}", outcome.report_line())
    })
    .with_context(|| format!("Failed to process {}", path.display()))?;

    info!("Finished in {:.2}s", start_time.elapsed().as_secs_f64());

    if args.quiet {
        return Ok(0);
    }

    if summary.targets.is_empty() {
        println!("⚠️  No groups starting with '{}' found. Nothing to do.", prefix);
        return Ok(0);
    }

    println!("\n📊 Summary:");
    if let Some(ref source) = summary.source_path {
        println!("   Source: {} ({} datasets)", source, summary.members.len());
    }
    println!("   Ensemble groups: {}", summary.targets.len());
    println!("   Replaced existing: {}", summary.replaced_count());

    if args.dry_run {
        println!("\n✅ Dry run complete. The file was not modified.");
    } else {
        println!("\n✅ Done.");
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", DEFAULT_CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
