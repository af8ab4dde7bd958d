//! Run counters for both stages.
//!
//! Recorded through the `metrics` facade. Nothing is exported by this crate;
//! the calls are no-ops unless an embedding program installs a recorder.

pub mod transform {
    /// Rows turned into records by one transform run
    pub fn rows_transformed(layout: &'static str, rows: usize) {
        ::metrics::counter!("roster_rows_transformed_total", "layout" => layout)
            .increment(rows as u64);
    }

    /// Records or entities written to the JSON output
    pub fn records_written(layout: &'static str, records: usize) {
        ::metrics::counter!("roster_records_written_total", "layout" => layout)
            .increment(records as u64);
    }
}

pub mod acquire {
    /// One image reached a terminal state (`skipped`, `downloaded`, `assumed_png`, `failed`)
    pub fn image_outcome(outcome: &'static str) {
        ::metrics::counter!("roster_images_total", "outcome" => outcome).increment(1);
    }

    /// Size of a downloaded image body
    pub fn bytes_downloaded(bytes: u64) {
        ::metrics::histogram!("roster_image_bytes").record(bytes as f64);
    }
}
