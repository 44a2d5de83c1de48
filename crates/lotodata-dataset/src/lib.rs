//! # lotodata-dataset
//!
//! Turns the first sheet of a lottery results spreadsheet into a normalized
//! dataset: one record per draw plus frequency statistics of the drawn
//! numbers.
//!
//! ## Features
//!
//! - **Header cleaning**: blank headers dropped, duplicates numbered
//! - **Number columns**: `Bola N`, `Trevo N` and `Coluna N` headers feed
//!   each record's derived `__numbers`
//! - **Statistics**: total count and per-number frequency
//!
//! ## Example
//!
//! ```rust,ignore
//! use lotodata_dataset::DataEngine;
//!
//! let dataset = DataEngine::new().convert_file("data/raw/Mega-Sena.xlsx")?;
//! println!("{} draws, last {:?}", dataset.meta.rows, dataset.last.draw_number);
//! ```

pub mod dataset;
pub mod error;
pub mod headers;
pub mod numeric;
pub mod transformer;

use std::path::Path;

use lotodata_xlsx::{read_first_sheet, XlsxArchive};
use tracing::debug;

// Re-exports
pub use dataset::{Dataset, LastDraw, Meta, Record, Stats, NUMBERS_FIELD};
pub use error::{DataError, Result};
pub use headers::{HeaderSet, NumberColumnMatcher, DEFAULT_NUMBER_FAMILIES};
pub use numeric::{to_int, Scalar};
pub use transformer::{format_timestamp, DatasetTransformer};

/// Runs the whole pipeline for one archive
///
/// container → first sheet → row matrix → dataset. Each call is independent,
/// so separate archives may be converted on separate threads.
#[derive(Debug, Clone, Default)]
pub struct DataEngine {
    transformer: DatasetTransformer,
}

impl DataEngine {
    /// Engine with the default number families
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with a custom transformer
    pub fn with_transformer(transformer: DatasetTransformer) -> Self {
        Self { transformer }
    }

    /// Convert an archive held in memory
    pub fn convert_bytes(&self, bytes: &[u8], game_name: &str, source_file: &str) -> Result<Dataset> {
        let archive = XlsxArchive::from_bytes(bytes)?;
        self.convert_archive(&archive, game_name, source_file)
    }

    /// Convert an unpacked archive
    pub fn convert_archive(
        &self,
        archive: &XlsxArchive,
        game_name: &str,
        source_file: &str,
    ) -> Result<Dataset> {
        let matrix = read_first_sheet(archive)?;
        debug!(
            source = source_file,
            rows = matrix.len(),
            width = matrix.width(),
            "first sheet decoded"
        );
        self.transformer.transform(&matrix, game_name, source_file)
    }

    /// Convert an archive on disk
    ///
    /// The game name is the file stem and the source name the file name.
    pub fn convert_file(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let (game_name, source_file) = names_for(path);
        self.convert_bytes(&bytes, &game_name, &source_file)
    }
}

/// Game name (file stem) and source name (file name) for an archive path
pub fn names_for(path: &Path) -> (String, String) {
    let game_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source_file = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (game_name, source_file)
}
