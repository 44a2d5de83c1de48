//! # lotodata-xlsx
//!
//! Tolerant reader for the first worksheet of an XLSX container.
//!
//! This crate provides functionality to:
//! - Unpack the ZIP container and look up parts by internal path
//! - Resolve the first declared sheet through the workbook relationships
//! - Parse the shared-string pool
//! - Decode sparse cell records into a dense [`RowMatrix`]
//!
//! Hand-edited spreadsheets are common input, so individual cells degrade
//! gracefully (an unknown shared-string index keeps its raw text) while
//! structural problems (no sheets, missing worksheet part) are errors.
//!
//! ## Example
//!
//! ```no_run
//! use lotodata_xlsx::{read_first_sheet, XlsxArchive};
//!
//! let archive = XlsxArchive::open("Mega-Sena.xlsx")?;
//! let matrix = read_first_sheet(&archive)?;
//!
//! for row in matrix.rows() {
//!     println!("{:?}", row);
//! }
//! # Ok::<(), lotodata_xlsx::XlsxError>(())
//! ```

pub mod archive;
pub mod column;
pub mod error;
pub mod relationships;
pub mod shared_strings;
pub mod sheet;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use archive::XlsxArchive;
pub use column::column_index;
pub use error::{Result, XlsxError};
pub use relationships::{first_sheet_path, Relationships, Workbook};
pub use shared_strings::SharedStrings;
pub use sheet::{CellValue, RowMatrix};

impl XlsxArchive {
    /// Internal path of the first declared worksheet
    pub fn first_sheet_path(&self) -> Result<String> {
        first_sheet_path(self.workbook_xml()?, self.workbook_rels_xml()?)
    }
}

/// Read the first worksheet of an archive as a dense row matrix
///
/// A missing shared-string pool is treated as empty; a missing worksheet
/// part is [`XlsxError::PartNotFound`].
pub fn read_first_sheet(archive: &XlsxArchive) -> Result<RowMatrix> {
    let shared = SharedStrings::parse(archive.shared_strings_xml())?;
    let sheet_path = archive.first_sheet_path()?;
    let sheet_xml = archive.read_part(&sheet_path)?;
    RowMatrix::build(sheet_xml, &shared)
}
