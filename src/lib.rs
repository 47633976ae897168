//! Labelpack: annotation pack storage for image labeling tools.
//!
//! Labelpack persists collections of labeled images as on-disk packs
//! (an `annotations.json` metadata file plus a `Media/` directory of
//! PNG blobs), keeps the media directory in sync across saves with an
//! incremental diff, and converts region geometry between image,
//! viewport, and detection coordinate spaces.
//!
//! # Modules
//!
//! - [`model`]: Core types (Collection, Item, Region, History, etc.)
//! - [`pack`]: Reading and writing on-disk packs
//! - [`sync`]: Media diffing and sync strategy selection
//! - [`geometry`]: Conversions between image, view, and detection spaces
//! - [`raster`]: PNG decode/encode for item rasters
//! - [`progress`]: Hierarchical progress reporting and cancellation
//! - [`inspect`]: Collection statistics and reports
//! - [`error`]: Error types for labelpack operations

pub mod error;
pub mod geometry;
pub mod inspect;
pub mod model;
pub mod pack;
pub mod progress;
pub mod raster;
pub mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::LabelpackError;

use sync::SyncStrategy;

/// The labelpack CLI application.
#[derive(Parser)]
#[command(name = "labelpack")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Summarize a pack: counts, label histogram, geometry quality.
    Inspect(InspectArgs),
    /// Write a hand-off copy of a pack in export format.
    Export(ExportArgs),
    /// Rename a label across every region in a pack.
    Relabel(RelabelArgs),
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Pack directory to inspect.
    pack: PathBuf,

    /// Number of top labels to show in the histogram.
    #[arg(long, default_value_t = 10)]
    top_labels: usize,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the export subcommand.
#[derive(clap::Args)]
struct ExportArgs {
    /// Pack directory to read.
    input: PathBuf,

    /// Directory to write the export-format pack to.
    output: PathBuf,

    /// Media sync strategy ('auto', 'incremental', or 'rebuild').
    #[arg(long, default_value = "auto")]
    sync: String,
}

/// Arguments for the relabel subcommand.
#[derive(clap::Args)]
struct RelabelArgs {
    /// Pack directory to rewrite in place.
    pack: PathBuf,

    /// Label to rename.
    #[arg(long)]
    from: String,

    /// Replacement label.
    #[arg(long)]
    to: String,

    /// Media sync strategy ('auto', 'incremental', or 'rebuild').
    #[arg(long, default_value = "auto")]
    sync: String,
}

/// Run the labelpack CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LabelpackError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Export(args)) => run_export(args),
        Some(Commands::Relabel(args)) => run_relabel(args),
        None => {
            // No subcommand: print a short banner and exit successfully
            println!("labelpack {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("The annotation pack toolkit.");
            println!();
            println!("Run 'labelpack --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), LabelpackError> {
    let loaded = pack::read_pack(&args.pack)?;

    let opts = inspect::InspectOptions {
        top_labels: args.top_labels,
        ..inspect::InspectOptions::default()
    };
    let report = inspect::inspect_pack(&loaded, &opts);

    match args.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{report}"),
    }
    Ok(())
}

/// Execute the export subcommand.
fn run_export(args: ExportArgs) -> Result<(), LabelpackError> {
    let loaded = pack::read_pack(&args.input)?;
    warn_dropped(&loaded);

    let options = pack::WriteOptions {
        format: pack::PackFormat::Export,
        strategy: parse_sync(&args.sync)?,
        ..pack::WriteOptions::default()
    };
    let report = pack::write_pack_with_options(&args.output, &loaded.collection, &options)?;

    let exported = loaded
        .collection
        .items
        .iter()
        .filter(|item| options.format.retains(item))
        .count()
        - report.skipped.len();
    println!(
        "Exported {} of {} items to {} ({} blobs written, {} carried over)",
        exported,
        loaded.collection.len(),
        args.output.display(),
        report.written,
        report.carried_over,
    );
    warn_skipped(&report);
    Ok(())
}

/// Execute the relabel subcommand.
fn run_relabel(args: RelabelArgs) -> Result<(), LabelpackError> {
    let loaded = pack::read_pack(&args.pack)?;
    warn_dropped(&loaded);

    let touched = loaded.collection.label_index(&args.from).len();
    if touched == 0 {
        println!(
            "No regions labeled '{}' in {}",
            args.from,
            args.pack.display()
        );
        return Ok(());
    }

    let renamed = loaded.collection.with_label_renamed(&args.from, &args.to);
    let options = pack::WriteOptions {
        strategy: parse_sync(&args.sync)?,
        ..pack::WriteOptions::default()
    };
    let report = pack::write_pack_with_options(&args.pack, &renamed, &options)?;

    println!(
        "Relabeled {} region(s) from '{}' to '{}' ({} media blobs carried over)",
        touched, args.from, args.to, report.carried_over,
    );
    warn_skipped(&report);
    Ok(())
}

fn parse_sync(value: &str) -> Result<Option<SyncStrategy>, LabelpackError> {
    match value {
        "auto" => Ok(None),
        "incremental" => Ok(Some(SyncStrategy::Incremental)),
        "rebuild" => Ok(Some(SyncStrategy::Rebuild)),
        other => Err(LabelpackError::UnsupportedOption(format!(
            "--sync '{}' (supported: auto, incremental, rebuild)",
            other
        ))),
    }
}

fn warn_dropped(loaded: &pack::LoadedPack) {
    for entry in &loaded.dropped {
        eprintln!(
            "warning: dropped entry #{} ({}): {}",
            entry.index, entry.media_path, entry.reason
        );
    }
}

fn warn_skipped(report: &pack::WriteReport) {
    for skip in &report.skipped {
        eprintln!("warning: skipped item #{} ({}): {}", skip.index, skip.id, skip.message);
    }
}
