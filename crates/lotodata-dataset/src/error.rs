//! Error types for dataset construction.

use thiserror::Error;

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while turning an archive into a dataset
#[derive(Debug, Error)]
pub enum DataError {
    /// The spreadsheet container could not be read
    #[error(transparent)]
    Xlsx(#[from] lotodata_xlsx::XlsxError),

    /// The first sheet has no rows at all
    #[error("Workbook has no rows")]
    EmptyWorkbook,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
