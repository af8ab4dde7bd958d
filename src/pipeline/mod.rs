// Batch stages: TSV -> JSON (transform) and JSON -> img/ (acquire)

pub mod acquire;
pub mod transform;
pub mod tsv;

use crate::app::ports::HttpClientPort;
use crate::error::Result;
use crate::metrics;
use crate::types::ImageEntry;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub use acquire::{AcquireSummary, ImageAcquirer, ImageOutcome};
pub use tsv::TsvLayout;

/// Result of a transform run
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSummary {
    pub layout: TsvLayout,
    pub rows: usize,
    /// Flat: one per row. Grouped: one per distinct slug.
    pub records: usize,
    pub output_file: PathBuf,
}

/// Read `input` with the given layout and write the JSON array to `output`.
///
/// Any unreadable or malformed row aborts the run before `output` is touched.
/// `height_cm` is only used by the flat layout, which has no height column.
#[instrument(skip_all, fields(layout = layout.as_str(), input = %input.display()))]
pub fn run_transform(
    input: &Path,
    output: &Path,
    layout: TsvLayout,
    height_cm: f64,
) -> Result<TransformSummary> {
    let reader = BufReader::new(File::open(input)?);

    let (rows, records) = match layout {
        TsvLayout::Flat => {
            let rows: Vec<tsv::FlatRow> = tsv::read_rows(reader)?;
            let records = transform::transform_flat(&rows, height_cm);
            write_json(output, &records)?;
            (rows.len(), records.len())
        }
        TsvLayout::Grouped => {
            let rows: Vec<tsv::GroupedRow> = tsv::read_rows(reader)?;
            let entities = transform::transform_grouped(&rows);
            write_json(output, &entities)?;
            (rows.len(), entities.len())
        }
    };

    metrics::transform::rows_transformed(layout.as_str(), rows);
    metrics::transform::records_written(layout.as_str(), records);
    info!("Transformed {} rows into {} records -> {}", rows, records, output.display());

    Ok(TransformSummary {
        layout,
        rows,
        records,
        output_file: output.to_path_buf(),
    })
}

/// Download every face/body image referenced by the flat JSON at `input`.
///
/// Only an unreadable/invalid JSON file or an unusable image directory is an
/// error; individual image failures are reported in the summary.
#[instrument(skip_all, fields(input = %input.display(), img_dir = %img_dir.display()))]
pub fn run_download(
    input: &Path,
    img_dir: &Path,
    http: &dyn HttpClientPort,
) -> Result<AcquireSummary> {
    let entries = read_entries(input)?;
    info!("Loaded {} entries", entries.len());

    let acquirer = ImageAcquirer::new(http, img_dir)?;
    let summary = acquirer.acquire_all(&entries);

    info!(
        "Download finished: {} downloaded, {} assumed png, {} skipped, {} failed",
        summary.downloaded,
        summary.assumed_png,
        summary.skipped,
        summary.failed.len()
    );
    Ok(summary)
}

pub fn read_entries(input: &Path) -> Result<Vec<ImageEntry>> {
    let reader = BufReader::new(File::open(input)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Pretty JSON with 4-space indentation; non-ASCII is written as-is.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut out = BufWriter::new(File::create(path)?);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    out.flush()?;
    Ok(())
}
