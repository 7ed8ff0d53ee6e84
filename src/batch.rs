//! Batch orchestration: one operation across many images.
//!
//! A batch takes an ordered list of [`ImageRecord`]s, an [`Operation`], and a
//! destination directory, and produces a [`BatchReport`].
//!
//! ## Work units
//!
//! | Operation | Units | Output name |
//! |---|---|---|
//! | `Convert(formats)` | item × format | `<base>_converted.<format ext>` |
//! | `ApplyFilters(set)` | item | `<base>_filtered.<source ext>` |
//! | `CustomKernel(k)` | item | `<base>_custom_filtered.<source ext>` |
//! | `Download` | item | `<base>_downloaded.<source ext>` |
//!
//! Conversion re-decodes the source file, so a file that changed or broke
//! since it was loaded fails on its own unit. Filters work on the record's
//! decoded buffer. Download copies the file's bytes.
//!
//! ## Failure model
//!
//! Pre-conditions ([`BatchError`]) are checked before any unit runs: an empty
//! selection, an operation with nothing to do, or a destination that cannot be
//! created. After that, every unit either writes its output or is recorded as
//! a [`Failure`]; one bad unit never stops the others.
//!
//! ## Parallel Processing
//!
//! Units run on the global [rayon](https://docs.rs/rayon) pool. Results are
//! collected back into unit order before the report is built, so failures are
//! always listed in selection order. Output paths are claimed while planning:
//! when two units would write the same file (same-named sources from
//! different directories, say), the later unit fails up front and the first
//! keeps the name. Workers therefore never share an output or partial file.

use crate::imaging::backend::{CodecError, ImageCodec, write_atomically};
use crate::imaging::{
    ConvertError, FilterError, FilterSet, FormatConverter, Kernel, RustBackend, TargetFormat,
    convolve,
};
use crate::naming::output_name;
use crate::record::ImageRecord;
use rayon::prelude::*;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("No images selected")]
    EmptySelection,
    #[error("No operation selected")]
    NoOperationSelected,
    #[error("Destination unavailable: {path}: {source}")]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single unit failed. Rendered into [`Failure::reason`].
#[derive(Error, Debug)]
enum UnitError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("Output {name} is already written by {owner}")]
    OutputTaken { name: String, owner: String },
}

/// What a batch does to each item.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Re-encode into every listed format.
    Convert(Vec<TargetFormat>),
    /// Apply built-in filters (grayscale → sepia → blur).
    ApplyFilters(FilterSet),
    /// Convolve with a user kernel.
    CustomKernel(Kernel),
    /// Copy the source file unchanged.
    Download,
}

impl Operation {
    /// Output name suffix for this operation.
    pub fn suffix(&self) -> &'static str {
        match self {
            Operation::Convert(_) => "converted",
            Operation::ApplyFilters(_) => "filtered",
            Operation::CustomKernel(_) => "custom_filtered",
            Operation::Download => "downloaded",
        }
    }

    /// `true` when there is nothing to run (no formats, no filters).
    pub fn is_empty(&self) -> bool {
        match self {
            Operation::Convert(formats) => formats.is_empty(),
            Operation::ApplyFilters(set) => set.is_empty(),
            Operation::CustomKernel(_) | Operation::Download => false,
        }
    }

    /// Short human label, e.g. `convert to PNG, JPEG`.
    pub fn label(&self) -> String {
        match self {
            Operation::Convert(formats) => {
                let names: Vec<String> = formats.iter().map(|f| f.to_string()).collect();
                format!("convert to {}", names.join(", "))
            }
            Operation::ApplyFilters(set) => {
                let names: Vec<String> = set.kinds().map(|k| k.to_string()).collect();
                format!("filter ({})", names.join(" → "))
            }
            Operation::CustomKernel(kernel) => {
                format!("custom {0}x{0} kernel", kernel.size())
            }
            Operation::Download => "download".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub item: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub success_count: usize,
    /// In unit order.
    pub failures: Vec<Failure>,
    /// Units never started because the batch was cancelled.
    pub skipped: usize,
    /// Written files, in unit order.
    pub outputs: Vec<PathBuf>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }
}

/// Result of a batch whose pre-conditions passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed(BatchReport),
    /// No destination was chosen. Not an error; nothing ran.
    Cancelled,
}

/// Progress events sent while a batch runs.
///
/// Unit events arrive in completion order, not unit order; `index` is the
/// unit's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Started {
        operation: String,
        unit_count: usize,
        destination: PathBuf,
    },
    UnitWritten {
        index: usize,
        item: String,
        output: PathBuf,
    },
    UnitFailed {
        index: usize,
        item: String,
        reason: String,
    },
}

/// Cancellation handle shared between the caller and running workers.
///
/// Cancelling stops new units from starting; units already running finish.
#[derive(Debug, Clone, Default)]
pub struct BatchControl {
    cancelled: Arc<AtomicBool>,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub converter: FormatConverter,
    pub control: BatchControl,
    pub events: Option<Sender<BatchEvent>>,
}

/// Run `operation` over `items` with the `image`-crate codec.
///
/// `destination` is `None` when the user cancelled the directory chooser.
pub fn run_batch<R>(
    items: &[R],
    operation: &Operation,
    destination: Option<&Path>,
    options: &BatchOptions,
) -> Result<BatchOutcome, BatchError>
where
    R: Borrow<ImageRecord> + Sync,
{
    run_batch_with_codec(&RustBackend::new(), items, operation, destination, options)
}

/// Run a batch with a specific codec (allows testing with mock).
pub fn run_batch_with_codec<R>(
    codec: &impl ImageCodec,
    items: &[R],
    operation: &Operation,
    destination: Option<&Path>,
    options: &BatchOptions,
) -> Result<BatchOutcome, BatchError>
where
    R: Borrow<ImageRecord> + Sync,
{
    if items.is_empty() {
        return Err(BatchError::EmptySelection);
    }
    if operation.is_empty() {
        return Err(BatchError::NoOperationSelected);
    }
    let Some(destination) = destination else {
        info!("no destination chosen, batch cancelled");
        return Ok(BatchOutcome::Cancelled);
    };
    std::fs::create_dir_all(destination).map_err(|source| BatchError::DestinationUnavailable {
        path: destination.to_path_buf(),
        source,
    })?;

    let units = plan_units(items, operation, destination);
    info!(
        operation = %operation.label(),
        units = units.len(),
        destination = %destination.display(),
        "starting batch"
    );
    if let Some(tx) = &options.events {
        tx.send(BatchEvent::Started {
            operation: operation.label(),
            unit_count: units.len(),
            destination: destination.to_path_buf(),
        })
        .ok();
    }

    let outcomes: Vec<UnitOutcome> = units
        .par_iter()
        .enumerate()
        .map(|(index, unit)| {
            if options.control.is_cancelled() {
                return UnitOutcome::Skipped;
            }
            let result = match &unit.output {
                Ok(output) => run_unit(codec, unit, output, &options.converter)
                    .map(|()| output.clone())
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            let outcome = match result {
                Ok(output) => {
                    debug!(item = %unit.item, output = %output.display(), "unit written");
                    UnitOutcome::Written(output)
                }
                Err(reason) => {
                    warn!(item = %unit.item, error = %reason, "unit failed");
                    UnitOutcome::Failed(reason)
                }
            };
            if let (Some(tx), Some(event)) = (&options.events, outcome.event(index, &unit.item)) {
                tx.send(event).ok();
            }
            outcome
        })
        .collect();

    let report = build_report(&units, outcomes);
    info!(
        succeeded = report.success_count,
        failed = report.failures.len(),
        skipped = report.skipped,
        "batch finished"
    );
    Ok(BatchOutcome::Completed(report))
}

// ============================================================================
// Units
// ============================================================================

struct Unit<'a> {
    record: &'a ImageRecord,
    step: Step<'a>,
    item: String,
    /// Where the unit writes, or why it cannot write at all.
    output: Result<PathBuf, UnitError>,
}

/// What one unit does, resolved from the batch's [`Operation`].
#[derive(Clone, Copy)]
enum Step<'a> {
    Convert(TargetFormat),
    Filters(&'a FilterSet),
    Kernel(&'a Kernel),
    Download,
}

enum UnitOutcome {
    Written(PathBuf),
    Failed(String),
    Skipped,
}

impl UnitOutcome {
    fn event(&self, index: usize, item: &str) -> Option<BatchEvent> {
        match self {
            UnitOutcome::Written(output) => Some(BatchEvent::UnitWritten {
                index,
                item: item.to_string(),
                output: output.clone(),
            }),
            UnitOutcome::Failed(reason) => Some(BatchEvent::UnitFailed {
                index,
                item: item.to_string(),
                reason: reason.clone(),
            }),
            UnitOutcome::Skipped => None,
        }
    }
}

/// Expand items into units. Conversion is items (outer) × formats (inner),
/// with repeated formats collapsed.
fn plan_units<'a, R: Borrow<ImageRecord>>(
    items: &'a [R],
    operation: &'a Operation,
    destination: &Path,
) -> Vec<Unit<'a>> {
    let suffix = operation.suffix();
    let unit = &|record: &'a ImageRecord, step: Step<'a>, item: String| Unit {
        record,
        step,
        item,
        output: planned_output(record, step, suffix, destination),
    };

    let mut units: Vec<Unit<'a>> = match operation {
        Operation::Convert(formats) => {
            let mut targets: Vec<TargetFormat> = Vec::with_capacity(formats.len());
            for f in formats {
                if !targets.contains(f) {
                    targets.push(*f);
                }
            }
            items
                .iter()
                .flat_map(|item| {
                    let record = item.borrow();
                    targets.iter().map(move |&target| {
                        let label = format!("{} to {}", record.file_name(), target);
                        unit(record, Step::Convert(target), label)
                    })
                })
                .collect()
        }
        Operation::ApplyFilters(set) => single_step(items, Step::Filters(set), unit),
        Operation::CustomKernel(kernel) => single_step(items, Step::Kernel(kernel), unit),
        Operation::Download => single_step(items, Step::Download, unit),
    };
    claim_outputs(&mut units);
    units
}

fn single_step<'a, R: Borrow<ImageRecord>>(
    items: &'a [R],
    step: Step<'a>,
    unit: impl Fn(&'a ImageRecord, Step<'a>, String) -> Unit<'a>,
) -> Vec<Unit<'a>> {
    items
        .iter()
        .map(|item| {
            let record = item.borrow();
            unit(record, step, record.file_name())
        })
        .collect()
}

/// `<destination>/<base>_<suffix>.<ext>`. Conversion uses the target's
/// extension; everything else keeps the source's.
fn planned_output(
    record: &ImageRecord,
    step: Step<'_>,
    suffix: &str,
    destination: &Path,
) -> Result<PathBuf, UnitError> {
    let extension = match step {
        Step::Convert(target) => target.extension().to_string(),
        _ => record
            .output_extension()
            .ok_or_else(|| unsupported_source(record))?,
    };
    Ok(destination.join(output_name(&record.file_name(), suffix, &extension)))
}

/// First unit to name an output keeps it; later units naming the same path
/// fail instead of overwriting it.
fn claim_outputs(units: &mut [Unit<'_>]) {
    let mut owners: HashMap<PathBuf, String> = HashMap::new();
    for unit in units.iter_mut() {
        let Ok(output) = &unit.output else {
            continue;
        };
        match owners.entry(output.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(unit.record.source_path().display().to_string());
            }
            Entry::Occupied(slot) => {
                let name = slot
                    .key()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                warn!(item = %unit.item, output = %name, "output name already claimed");
                unit.output = Err(UnitError::OutputTaken {
                    name,
                    owner: slot.get().clone(),
                });
            }
        }
    }
}

fn unsupported_source(record: &ImageRecord) -> ConvertError {
    ConvertError::UnsupportedFormat(record.format().to_string())
}

fn run_unit(
    codec: &impl ImageCodec,
    unit: &Unit<'_>,
    output: &Path,
    converter: &FormatConverter,
) -> Result<(), UnitError> {
    let record = unit.record;

    let filtered = match unit.step {
        Step::Convert(target) => {
            let decoded = codec.decode(record.source_path())?;
            let prepared = converter.convert(decoded, record.format(), target);
            codec.encode(&prepared, target, output)?;
            return Ok(());
        }
        Step::Download => {
            let source = record.source_path();
            write_atomically(output, |partial| {
                std::fs::copy(source, partial)
                    .map(|_| ())
                    .map_err(|e| CodecError::io(source, e))
            })?;
            return Ok(());
        }
        Step::Filters(set) => set.apply(record.buffer())?,
        Step::Kernel(kernel) => convolve(record.buffer(), kernel)?,
    };

    // Written back in the source's own format.
    let target = record
        .format()
        .target()
        .ok_or_else(|| unsupported_source(record))?;
    let prepared = converter.convert(filtered, record.format(), target);
    codec.encode(&prepared, target, output)?;
    Ok(())
}

fn build_report(units: &[Unit<'_>], outcomes: Vec<UnitOutcome>) -> BatchReport {
    let mut report = BatchReport::default();
    for (unit, outcome) in units.iter().zip(outcomes) {
        match outcome {
            UnitOutcome::Written(path) => {
                report.success_count += 1;
                report.outputs.push(path);
            }
            UnitOutcome::Failed(reason) => report.failures.push(Failure {
                item: unit.item.clone(),
                reason,
            }),
            UnitOutcome::Skipped => report.skipped += 1,
        }
    }
    report
}
