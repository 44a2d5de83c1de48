//! Error types for XLSX container reading

use thiserror::Error;

/// Errors that can occur while reading a spreadsheet container
#[derive(Error, Debug)]
pub enum XlsxError {
    /// The byte stream is not a readable ZIP container
    #[error("Corrupt archive: {0}")]
    CorruptArchive(#[from] zip::result::ZipError),

    /// A mandatory part is missing from the container
    #[error("Required part not found: {0}")]
    PartNotFound(String),

    /// A column label is not a valid alphabetic label
    #[error("Invalid column label: {0:?}")]
    InvalidColumnLabel(String),

    /// The workbook descriptor declares no sheets
    #[error("Workbook declares no sheets")]
    NoSheetsDeclared,

    /// The first sheet's relationship id has no target
    #[error("Unresolved sheet relationship: {0:?}")]
    UnresolvedRelationship(String),

    /// Error parsing XML content of a part
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Error reading files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for XLSX operations
pub type Result<T> = std::result::Result<T, XlsxError>;
