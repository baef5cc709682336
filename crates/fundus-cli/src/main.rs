//! fundus: batch retinal vessel extraction and per-image diagnostics.
//!
//! - `process` runs every image of a directory through the pipeline and
//!   writes the eight stage images plus a composite sheet per image.
//! - `datasets` does the same for the DRIVE, STARE and HRF directory
//!   layouts, each with its tuned parameter preset.
//! - `inspect` runs one image with per-stage timing and counts, without
//!   writing stage files.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin fundus -- process datasets/DRIVE/test/images out/DRIVE/test
//! cargo run --release --bin fundus -- datasets datasets resultados/segmentacao
//! cargo run --release --bin fundus -- inspect im0001.ppm --composite im0001.png
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod params;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand, ValueEnum};
use fundus_io::{BatchSummary, KnownDataset};
use fundus_pipeline::diagnostics::{Clock, PipelineDiagnostics, run_with_diagnostics};
use log::{error, info, warn};

use crate::params::ParameterArgs;

/// Extract blood-vessel maps from retinal fundus photographs.
#[derive(Parser)]
#[command(name = "fundus", version)]
struct Cli {
    /// Log every pipeline stage (overrides `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process every image in a directory.
    Process(ProcessArgs),
    /// Process the DRIVE, STARE and HRF layouts under a datasets root.
    Datasets(DatasetsArgs),
    /// Run one image with diagnostics and print the report.
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ProcessArgs {
    /// Directory holding the input images (ppm, tif, jpg, png).
    input_dir: PathBuf,

    /// Directory receiving the per-stage and composite images.
    output_dir: PathBuf,

    #[command(flatten)]
    params: ParameterArgs,

    /// Print per-stage diagnostics for every image.
    #[arg(long)]
    diagnostics: bool,

    /// Print diagnostics as JSON instead of a human-readable report.
    #[arg(long, requires = "diagnostics")]
    json: bool,
}

#[derive(Args)]
struct DatasetsArgs {
    /// Root containing `DRIVE/`, `stare-dataset/` and `HRF/`.
    datasets_root: PathBuf,

    /// Root receiving one result tree per dataset.
    output_root: PathBuf,

    /// Process only this dataset.
    #[arg(long, value_enum)]
    only: Option<DatasetChoice>,
}

#[derive(Args)]
struct InspectArgs {
    /// Path to the input image.
    image_path: PathBuf,

    #[command(flatten)]
    params: ParameterArgs,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Write the composite sheet to this PNG file.
    #[arg(long)]
    composite: Option<PathBuf>,
}

/// Dataset selection for `datasets --only`.
#[derive(Clone, Copy, ValueEnum)]
enum DatasetChoice {
    Drive,
    Stare,
    Hrf,
}

impl From<DatasetChoice> for KnownDataset {
    fn from(choice: DatasetChoice) -> Self {
        match choice {
            DatasetChoice::Drive => Self::Drive,
            DatasetChoice::Stare => Self::Stare,
            DatasetChoice::Hrf => Self::Hrf,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    match cli.command {
        Command::Process(args) => process(&args),
        Command::Datasets(args) => datasets(&args),
        Command::Inspect(args) => inspect(&args),
    }
}

fn process(args: &ProcessArgs) -> ExitCode {
    let params = match args.params.resolve() {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let result = if args.diagnostics {
        fundus_io::process_dataset_with(&args.input_dir, &args.output_dir, |path, image| {
            let (stages, diagnostics) = run_with_diagnostics(image, &params, &StdClock)?;
            print_diagnostics(path, &diagnostics, args.json);
            Ok(stages)
        })
    } else {
        fundus_io::process_dataset(&args.input_dir, &args.output_dir, &params)
    };

    match result {
        Ok(summary) => finish(&summary),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn datasets(args: &DatasetsArgs) -> ExitCode {
    let selected: Vec<KnownDataset> = args
        .only
        .map_or_else(|| KnownDataset::ALL.to_vec(), |d| vec![d.into()]);

    let mut summary = BatchSummary::default();
    let mut aborted = false;

    for dataset in selected {
        let params = dataset.parameters();
        for subset in dataset.subsets() {
            let input = args.datasets_root.join(subset.input);
            if !input.is_dir() {
                warn!("{dataset}: {} not found, skipping", input.display());
                continue;
            }

            info!("{dataset}: {}", subset.output);
            let output = args.output_root.join(subset.output);
            match fundus_io::process_dataset(&input, &output, &params) {
                Ok(s) => summary.merge(s),
                Err(e) => {
                    error!("{dataset}: {e}");
                    aborted = true;
                }
            }
        }
    }

    let code = finish(&summary);
    if aborted { ExitCode::FAILURE } else { code }
}

fn inspect(args: &InspectArgs) -> ExitCode {
    let params = match args.params.resolve() {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image = match fundus_io::raster::load_image(&args.image_path) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({}x{})",
        args.image_path.display(),
        image.width(),
        image.height(),
    );
    eprintln!("Parameters: {params:#?}");
    eprintln!();

    let (stages, diagnostics) = match run_with_diagnostics(&image, &params, &StdClock) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Pipeline error: {e}");
            return ExitCode::FAILURE;
        }
    };

    print_diagnostics(&args.image_path, &diagnostics, args.json);

    if let Some(ref composite_path) = args.composite {
        let sheet = fundus_pipeline::compose(&stages);
        match fundus_io::raster::save_rgb(composite_path, &sheet) {
            Ok(()) => eprintln!("Composite written to {}", composite_path.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn print_diagnostics(path: &Path, diagnostics: &PipelineDiagnostics, json: bool) {
    if json {
        match serde_json::to_string_pretty(diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => error!("{}: cannot serialize diagnostics: {e}", path.display()),
        }
    } else {
        println!("{}\n{}", path.display(), diagnostics.report());
    }
}

/// Report per-file failures and turn the summary into an exit code.
/// Report the batch totals. Each failure was already logged by the batch
/// as it happened.
fn finish(summary: &BatchSummary) -> ExitCode {
    eprintln!(
        "{} of {} image(s) processed",
        summary.processed,
        summary.total(),
    );

    if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
