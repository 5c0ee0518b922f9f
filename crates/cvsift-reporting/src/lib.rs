//! CSV export of extracted CV records.

use std::path::Path;

use thiserror::Error;

use cvsift_core::CvRecord;

/// The fixed CSV header, in canonical column order. Must stay in sync with
/// the field order of [`CvRecord`].
pub const CSV_COLUMNS: [&str; 13] = [
    "filename",
    "name",
    "email",
    "phone",
    "location",
    "linkedin",
    "github",
    "professional_summary",
    "current_job_title",
    "current_company",
    "years_experience",
    "education",
    "institution",
];

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write `records` to `path`, overwriting any existing file.
///
/// The header row is always written, even for an empty run. `None` fields
/// render as empty cells.
pub fn write_csv(records: &[CvRecord], path: &Path) -> Result<(), ReportError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;

    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = records.len(), "wrote CSV");
    Ok(())
}
