//! Synthrec: synthetic detection annotations to TFRecord.
//!
//! Synthrec reads per-image scene annotations produced by a
//! domain-randomization renderer (one JSON file per JPEG) and writes them as
//! `tf.train.Example` records spread across TFRecord shards, together with a
//! COCO-style JSON sidecar describing the same boxes.
//!
//! # Modules
//!
//! - [`ir`]: Scene records, ids, label maps and the format readers/writers
//! - [`conversion`]: The per-image transform and the sharding driver
//! - [`inspect`]: Read-back checks over written shards
//! - [`error`]: Error types for synthrec operations

pub mod conversion;
pub mod error;
pub mod inspect;
pub mod ir;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use error::SynthrecError;

use conversion::{ConvertOptions, Subset, Year, DEFAULT_VISIBILITY_THRESHOLD};

/// The synthrec CLI application.
#[derive(Parser)]
#[command(name = "synthrec")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a synthetic dataset into TFRecord shards and a COCO sidecar.
    Convert(ConvertArgs),
    /// Check TFRecord shards and summarize their contents.
    Inspect(InspectArgs),
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Root directory of the raw dataset [default: current directory].
    #[arg(long = "data_dir")]
    data_dir: Option<PathBuf>,

    /// Convert training set, validation set or merged set.
    #[arg(long, value_enum, default_value_t = SetArg::Train)]
    set: SetArg,

    /// (Relative) path to annotations directory.
    #[arg(long = "annotations_dir", default_value = "Annotations")]
    annotations_dir: String,

    /// Desired challenge year.
    #[arg(long, value_enum, default_value_t = YearArg::Esm2020)]
    year: YearArg,

    /// Path to output TFRecord prefix.
    #[arg(long = "output_path")]
    output_path: PathBuf,

    /// Path to label map JSON (`exported_object_classes`).
    #[arg(long = "label_map_json_path")]
    label_map_json_path: Option<PathBuf>,

    /// Path to camera settings JSON (`camera_settings`).
    #[arg(long = "camera_settings_json_path")]
    camera_settings_json_path: Option<PathBuf>,

    /// Whether to ignore difficult instances.
    #[arg(long = "ignore_difficult_instances")]
    ignore_difficult_instances: bool,

    /// Number of TFRecord shards.
    #[arg(long = "num_shards", default_value_t = 1)]
    num_shards: usize,

    /// Maximum number of images to convert per subdirectory.
    #[arg(long = "num_images")]
    num_images: Option<usize>,

    /// Objects with visibility above this are marked truncated.
    #[arg(long = "visibility_threshold", default_value_t = DEFAULT_VISIBILITY_THRESHOLD)]
    visibility_threshold: f64,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// TFRecord shards to read, in order.
    #[arg(required = true)]
    shards: Vec<PathBuf>,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,

    /// Skip recomputing the SHA-256 of each encoded image.
    #[arg(long)]
    no_verify_keys: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SetArg {
    Train,
    Val,
    Trainval,
    Test,
}

impl From<SetArg> for Subset {
    fn from(value: SetArg) -> Self {
        match value {
            SetArg::Train => Subset::Train,
            SetArg::Val => Subset::Val,
            SetArg::Trainval => Subset::TrainVal,
            SetArg::Test => Subset::Test,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum YearArg {
    #[value(name = "ESM2020")]
    Esm2020,
    #[value(name = "ESM2020_test")]
    Esm2020Test,
    #[value(name = "merged")]
    Merged,
}

impl From<YearArg> for Year {
    fn from(value: YearArg) -> Self {
        match value {
            YearArg::Esm2020 => Year::Esm2020,
            YearArg::Esm2020Test => Year::Esm2020Test,
            YearArg::Merged => Year::Merged,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the synthrec CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), SynthrecError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        None => {
            println!("synthrec {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Synthetic detection annotations to TFRecord.");
            println!();
            println!("Run 'synthrec --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), SynthrecError> {
    let opts = ConvertOptions {
        data_dir: args.data_dir.unwrap_or_default(),
        set: args.set.into(),
        annotations_dir: args.annotations_dir,
        year: args.year.into(),
        output_path: args.output_path,
        label_map_json_path: args.label_map_json_path,
        camera_settings_json_path: args.camera_settings_json_path,
        ignore_difficult_instances: args.ignore_difficult_instances,
        num_shards: args.num_shards,
        num_images: args.num_images,
        visibility_threshold: args.visibility_threshold,
    };

    let report = conversion::convert_dataset(&opts)?;
    print!("{}", report);
    Ok(())
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), SynthrecError> {
    let opts = inspect::InspectOptions {
        verify_keys: !args.no_verify_keys,
        ..Default::default()
    };
    let report = inspect::inspect_shards(&args.shards, &opts)?;

    match args.output {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
            println!("{}", json);
        }
        ReportFormat::Text => print!("{}", report),
    }

    if report.is_ok() {
        Ok(())
    } else {
        Err(SynthrecError::InspectFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report: Box::new(report),
        })
    }
}
