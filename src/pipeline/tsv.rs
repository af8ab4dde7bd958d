//! Positional TSV input.
//!
//! There is no header row. Two layouts exist and are kept apart on purpose:
//!
//! | layout  | columns                                                                  |
//! |---------|--------------------------------------------------------------------------|
//! | flat    | name, faceLink, bodyLink, weightThresholdLb, mainShape, [secondaryShape] |
//! | grouped | name, faceLink, bodyLink, weightThresholdLb, heightCm, mainShape, [secondaryShape] |

use crate::error::{ImportError, Result};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TsvLayout {
    /// One JSON record per row, with face/body links (download input)
    Flat,
    /// One JSON entity per name, outfits nested
    Grouped,
}

impl TsvLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            TsvLayout::Flat => "flat",
            TsvLayout::Grouped => "grouped",
        }
    }
}

/// A row in the flat layout
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub name: String,
    pub face_link: String,
    pub body_link: String,
    pub weight_threshold_lb: f64,
    pub main_shape: String,
    pub secondary_shape: Option<String>,
}

/// A row in the grouped layout (height column before the shapes)
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedRow {
    pub name: String,
    pub face_link: String,
    pub body_link: String,
    pub weight_threshold_lb: f64,
    pub height_cm: f64,
    pub main_shape: String,
    pub secondary_shape: Option<String>,
}

/// Built from one positional TSV record. `row` is 1-based, for error messages.
pub trait FromRecord: Sized {
    fn from_record(record: &StringRecord, row: usize) -> Result<Self>;
}

impl FromRecord for FlatRow {
    fn from_record(record: &StringRecord, row: usize) -> Result<Self> {
        Ok(Self {
            name: required(record, row, 0, "name")?.to_string(),
            face_link: required(record, row, 1, "faceLink")?.to_string(),
            body_link: required(record, row, 2, "bodyLink")?.to_string(),
            weight_threshold_lb: number(record, row, 3, "weightThresholdLb")?,
            main_shape: required(record, row, 4, "mainShape")?.to_string(),
            secondary_shape: optional(record, 5),
        })
    }
}

impl FromRecord for GroupedRow {
    fn from_record(record: &StringRecord, row: usize) -> Result<Self> {
        Ok(Self {
            name: required(record, row, 0, "name")?.to_string(),
            face_link: required(record, row, 1, "faceLink")?.to_string(),
            body_link: required(record, row, 2, "bodyLink")?.to_string(),
            weight_threshold_lb: number(record, row, 3, "weightThresholdLb")?,
            height_cm: number(record, row, 4, "heightCm")?,
            main_shape: required(record, row, 5, "mainShape")?.to_string(),
            secondary_shape: optional(record, 6),
        })
    }
}

/// Read every row of a tab-separated source. The first malformed row aborts the read.
pub fn read_rows<T: FromRecord, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 1);
        rows.push(T::from_record(&record, row)?);
    }
    Ok(rows)
}

fn required<'a>(
    record: &'a StringRecord,
    row: usize,
    idx: usize,
    column: &'static str,
) -> Result<&'a str> {
    record
        .get(idx)
        .ok_or(ImportError::MissingField { row, column })
}

fn optional(record: &StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn number(record: &StringRecord, row: usize, idx: usize, column: &'static str) -> Result<f64> {
    let raw = required(record, row, idx, column)?;
    // NaN and infinities parse but cannot be written as JSON numbers
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ImportError::InvalidNumber {
            row,
            column,
            value: raw.to_string(),
        })
}
