use clap::{Parser, Subcommand};
use simple_darkroom::batch::{self, BatchOptions, BatchOutcome, Operation};
use simple_darkroom::config::{self, DarkroomConfig};
use simple_darkroom::imaging::rust_backend::is_supported_image;
use simple_darkroom::imaging::{FilterKind, FilterSet, RustBackend, TargetFormat, kernel};
use simple_darkroom::record::{self, ImageRecord};
use simple_darkroom::selection::Selection;
use simple_darkroom::{metadata, output};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

mod logging;

/// Shared flags for commands that write a batch of outputs.
#[derive(clap::Args, Clone)]
struct BatchArgs {
    /// Destination directory (omitted = cancelled, nothing is written)
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Also write the batch report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Image files, or directories to search for images
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn version_string() -> &'static str {
    let on_tag = env!("DARKROOM_ON_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("DARKROOM_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-darkroom")]
#[command(about = "Batch filters, custom kernels and format conversion for images")]
#[command(long_about = "\
Batch filters, custom kernels and format conversion for images

Every command takes image files or directories (searched recursively for
png, jpg, jpeg, bmp and gif). Outputs are named after their source:

  photo.png  --filter-->   photo_filtered.png
  photo.png  --custom-->   photo_custom_filtered.png
  photo.png  --convert-->  photo_converted.jpeg
  photo.png  --download--> photo_downloaded.png

One failing image never stops the rest; the summary lists every failure.

Run 'simple-darkroom gen-config' to generate a documented darkroom.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-encode images into one or more formats
    Convert {
        /// Target formats, comma separated (png, jpeg/jpg, bmp, gif)
        #[arg(long, value_delimiter = ',')]
        format: Vec<TargetFormat>,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Apply built-in filters (always in order grayscale, sepia, blur)
    Filter {
        #[arg(long)]
        grayscale: bool,
        #[arg(long)]
        sepia: bool,
        #[arg(long)]
        blur: bool,
        /// Filters as a comma-separated list (grayscale, sepia, blur), added to the flags
        #[arg(long, value_delimiter = ',')]
        filters: Vec<FilterKind>,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Convolve images with a custom N x N kernel
    Custom {
        /// Kernel size N
        #[arg(long)]
        size: String,
        /// N*N weights, row by row, separated by spaces or commas
        #[arg(long, allow_hyphen_values = true)]
        values: String,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Copy images unchanged
    Download {
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Show size, format and camera metadata
    Info {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Print a stock darkroom.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    match cli.command {
        Command::Convert { format, batch } => {
            let config = setup(&cli.config)?;
            run_batch_command(&config, Operation::Convert(format), batch)?;
        }
        Command::Filter {
            grayscale,
            sepia,
            blur,
            filters,
            batch,
        } => {
            let config = setup(&cli.config)?;
            let flagged = [
                (grayscale, FilterKind::Grayscale),
                (sepia, FilterKind::Sepia),
                (blur, FilterKind::Blur),
            ];
            let set: FilterSet = flagged
                .into_iter()
                .filter_map(|(on, kind)| on.then_some(kind))
                .chain(filters)
                .collect();
            run_batch_command(&config, Operation::ApplyFilters(set), batch)?;
        }
        Command::Custom {
            size,
            values,
            batch,
        } => {
            let config = setup(&cli.config)?;
            let kernel = kernel::parse_flat(&size, &values, config.kernel.max_size)?;
            run_batch_command(&config, Operation::CustomKernel(kernel), batch)?;
        }
        Command::Download { batch } => {
            let config = setup(&cli.config)?;
            run_batch_command(&config, Operation::Download, batch)?;
        }
        Command::Info { inputs } => {
            let config = setup(&cli.config)?;
            let records = load_records(&build_codec(&config), &expand_inputs(&inputs));
            for (i, record) in records.iter().enumerate() {
                let meta = metadata::read(record.source_path());
                output::print_record_info(i + 1, record, &meta);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config and size the worker pool.
fn setup(path: &Path) -> Result<DarkroomConfig, config::ConfigError> {
    let config = config::load_config(path)?;
    init_thread_pool(&config.processing);
    Ok(config)
}

fn build_codec(config: &DarkroomConfig) -> RustBackend {
    RustBackend::with_jpeg_quality(config.convert.jpeg_quality)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Files pass through; directories expand to the supported images inside,
/// sorted by name. Argument order is kept.
fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(
                WalkDir::new(input)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file() && is_supported_image(e.path()))
                    .map(|e| e.into_path()),
            );
        } else {
            paths.push(input.clone());
        }
    }
    paths
}

fn load_records(codec: &RustBackend, paths: &[PathBuf]) -> Vec<ImageRecord> {
    let (records, errors) = record::load_all(codec, paths);
    for (path, error) in &errors {
        output::print_load_failure(path, &error.to_string());
    }
    records
}

fn run_batch_command(
    config: &DarkroomConfig,
    operation: Operation,
    args: BatchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let codec = build_codec(config);
    let records = load_records(&codec, &expand_inputs(&args.inputs));
    let selection = Selection::all(&records);
    output::print_selection_summary(selection.len());
    let items = selection.resolve(&records);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_batch_event(&event) {
                println!("{}", line);
            }
        }
    });
    let options = BatchOptions {
        converter: config.convert.converter(),
        events: Some(tx),
        ..Default::default()
    };
    let outcome =
        batch::run_batch_with_codec(&codec, &items, &operation, args.dest.as_deref(), &options);
    drop(options);
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    match outcome? {
        BatchOutcome::Cancelled => output::print_cancelled(),
        BatchOutcome::Completed(report) => {
            println!();
            output::print_batch_summary(&report);
            if let Some(path) = args.report {
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(&path, json)?;
            }
        }
    }
    Ok(())
}
