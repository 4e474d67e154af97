use camino::Utf8PathBuf;
use thiserror::Error;

/// Crate-wide error type.
///
/// Input-format problems are fatal: they are reported to the caller before
/// any aggregation begins and no partial report is written. Data-quality
/// exclusions (negative values, all-zero rows) are *not* errors; they are
/// silently dropped during cleaning.
#[derive(Error, Debug)]
pub enum UrbanFpError {
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid field count in {file} record {record}: expected {expected} fields")]
    InvalidFieldCount {
        file: Utf8PathBuf,
        record: u64,
        expected: usize,
    },

    #[error("Invalid numeric field in {file} record {record}: {field}")]
    InvalidNumericField {
        file: Utf8PathBuf,
        record: u64,
        field: String,
    },

    #[error("Reference area indices must be sequential starting at 0, got index {found} in {file}")]
    NonSequentialReferenceAreas { file: Utf8PathBuf, found: i64 },

    #[error("Reference area file {0} contains no areas")]
    EmptyReferenceAreas(Utf8PathBuf),

    #[error("No update files matching day-*-updates.csv under {0}")]
    NoUpdateFiles(Utf8PathBuf),
}
