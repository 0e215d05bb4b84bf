use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use glob::glob;
use log::LevelFilter;
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};
use serde::Serialize;
use thiserror::Error;

use pcd_core::classes::{get_airborne_lidar_info, ObjectClass};
use pcd_core::pointcloud::point::{ClassCounts, LabeledPointCloud};
use pcd_exporter::h5::{read_features, write_point_cloud};
use pcd_exporter::ExportError;
use pcd_parser::{open_reader, PointIterator};
use train_logger::reader::last_epoch_summary;
use train_logger::{print_metric, write_config, LoggerError, Metric};

#[derive(Parser, Debug)]
#[command(
    name = "Lidar Prep",
    about = "A tool for preparing labeled airborne lidar tiles for classification training",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert LAS/LAZ/CSV tiles into labeled HDF5 tiles
    Prepare(PrepareArgs),
    /// Print the point count and class histogram of an HDF5 tile
    Inspect(InspectArgs),
    /// Print the last logged epoch of a metric
    Report(ReportArgs),
}

#[derive(Args, Debug, Serialize)]
struct PrepareArgs {
    #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
    input: Vec<String>,

    #[arg(short, long, required = true, value_name = "DIR")]
    output: PathBuf,

    /// Points read per batch. A tile is still written in one piece, so this
    /// does not bound memory use.
    #[arg(long, default_value_t = 1_000_000)]
    chunk_size: usize,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[arg(short, long, required = true, value_name = "DIR")]
    log_folder: PathBuf,

    #[arg(short, long, default_value = "train")]
    mode: String,

    #[arg(long, default_value = "iou")]
    metric: String,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Logger(#[from] LoggerError),

    #[error("{first:?} and {second:?} would both be written to {output:?}")]
    DuplicateOutput {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    },

    #[error("{0} of {1} tiles failed")]
    TilesFailed(usize, usize),

    #[error("no input files matched")]
    NoInput,
}

fn expand_globs(input_patterns: &[String]) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    for pattern in input_patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            for entry in glob(pattern)? {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => log::warn!("skipping unreadable path: {:?}", e),
                }
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    output_dir.join(format!("{}.h5", stem.to_string_lossy()))
}

/// Pairs every input with its output tile, rejecting inputs whose outputs
/// would collide.
fn plan_outputs(inputs: &[PathBuf], output_dir: &Path) -> Result<Vec<(PathBuf, PathBuf)>, AppError> {
    let mut seen: HashMap<PathBuf, &PathBuf> = HashMap::new();
    let mut plan = Vec::with_capacity(inputs.len());

    for input in inputs {
        let output = output_path_for(input, output_dir);
        if let Some(first) = seen.insert(output.clone(), input) {
            return Err(AppError::DuplicateOutput {
                first: first.clone(),
                second: input.clone(),
                output,
            });
        }
        plan.push((input.clone(), output));
    }

    Ok(plan)
}

fn read_tile(input: &Path, chunk_size: usize) -> Result<LabeledPointCloud, AppError> {
    let reader = open_reader(input)?;
    let mut chunks = PointIterator::new(reader, chunk_size);

    let mut cloud = LabeledPointCloud::default();
    for chunk in chunks.by_ref() {
        cloud.extend(LabeledPointCloud::from_points(&chunk));
    }
    if let Some(e) = chunks.take_error() {
        return Err(e.into());
    }

    Ok(cloud)
}

fn prepare_tile(input: &Path, output: &Path, chunk_size: usize) -> Result<ClassCounts, AppError> {
    let cloud = read_tile(input, chunk_size)?;
    if cloud.is_empty() {
        log::warn!("{:?} contains no points", input);
    }
    write_point_cloud(output, &cloud)?;
    Ok(cloud.class_counts())
}

fn format_counts(counts: &ClassCounts) -> String {
    let mut parts: Vec<String> = ObjectClass::ALL
        .iter()
        .map(|&class| format!("{}={}", class.name(), counts.get(class)))
        .collect();
    if counts.unknown > 0 {
        parts.push(format!("unknown={}", counts.unknown));
    }
    parts.join(", ")
}

fn run_prepare(args: PrepareArgs) -> Result<(), AppError> {
    log::info!("input files: {:?}", args.input);
    log::info!("output folder: {:?}", args.output);
    log::info!("chunk size: {}", args.chunk_size);

    let input_files = expand_globs(&args.input)?;
    if input_files.is_empty() {
        return Err(AppError::NoInput);
    }
    log::info!("Expanded input files: {:?}", input_files);

    std::fs::create_dir_all(&args.output)?;
    write_config(&args.output, &args)?;

    let plan = plan_outputs(&input_files, &args.output)?;

    log::info!("start preparing {} tiles...", plan.len());
    let start = std::time::Instant::now();
    let chunk_size = args.chunk_size;
    let results: Vec<(&PathBuf, Result<ClassCounts, String>)> = plan
        .par_iter()
        .map(|(input, output)| {
            let result = prepare_tile(input, output, chunk_size).map_err(|e| e.to_string());
            (output, result)
        })
        .collect();

    let mut failed = 0;
    for (output, result) in &results {
        match result {
            Ok(counts) => log::info!(
                "wrote {:?}: {} points ({})",
                output,
                counts.total(),
                format_counts(counts)
            ),
            Err(e) => {
                log::error!("failed to write {:?}: {}", output, e);
                failed += 1;
            }
        }
    }
    log::info!("Finish preparing in {:?}", start.elapsed());

    if failed > 0 {
        return Err(AppError::TilesFailed(failed, results.len()));
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<(), AppError> {
    let cloud = read_features(&args.file)?;
    let counts = cloud.class_counts();

    println!("{}", args.file.display());
    println!("  Points: {}", cloud.len());
    if let Some(bv) = cloud.bounds() {
        println!("  Min: {:.3} {:.3} {:.3}", bv.min[0], bv.min[1], bv.min[2]);
        println!("  Max: {:.3} {:.3} {:.3}", bv.max[0], bv.max[1], bv.max[2]);
    }

    let mut classes: Vec<(&str, u8)> = get_airborne_lidar_info().into_iter().collect();
    classes.sort_by_key(|&(_, label)| label);
    for (name, label) in classes {
        let count = ObjectClass::from_label(label)
            .map(|class| counts.get(class))
            .unwrap_or_default();
        println!("  {} ({}): {}", name, label, count);
    }
    if counts.unknown > 0 {
        println!("  unknown: {}", counts.unknown);
    }

    Ok(())
}

fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let metric: Metric = args.metric.parse()?;
    match last_epoch_summary(&args.log_folder, &args.mode, metric)? {
        Some((epoch, values)) => {
            println!("epoch {}", epoch);
            print_metric(&args.mode, metric.as_str(), values);
        }
        None => log::warn!("no {} values logged for mode '{}'", metric, args.mode),
    }
    Ok(())
}

fn main() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Prepare(args) => run_prepare(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Report(args) => run_report(args),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
