//! Archive handling for XLSX files
//!
//! XLSX files are ZIP archives containing XML parts. The whole container is
//! unpacked into memory on open; parts are then looked up by internal path.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use zip::read::ZipArchive;
use zip::result::ZipError;

use crate::error::{Result, XlsxError};

/// Workbook descriptor path
pub const WORKBOOK_PATH: &str = "xl/workbook.xml";

/// Workbook relationship table path
pub const WORKBOOK_RELS_PATH: &str = "xl/_rels/workbook.xml.rels";

/// Shared-string pool path
pub const SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";

/// Represents an unpacked XLSX container
#[derive(Debug)]
pub struct XlsxArchive {
    /// All parts in the archive, keyed by internal path
    parts: HashMap<String, Vec<u8>>,
}

impl XlsxArchive {
    /// Open and unpack an XLSX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack an XLSX container already held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents).map_err(ZipError::Io)?;
            parts.insert(name, contents);
        }

        Ok(Self { parts })
    }

    /// Get an optional part's contents by path
    pub fn part(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(|v| v.as_slice())
    }

    /// Get a mandatory part's contents by path
    pub fn read_part(&self, path: &str) -> Result<&[u8]> {
        self.part(path)
            .ok_or_else(|| XlsxError::PartNotFound(path.to_string()))
    }

    /// Get the workbook descriptor (xl/workbook.xml)
    pub fn workbook_xml(&self) -> Result<&[u8]> {
        self.read_part(WORKBOOK_PATH)
    }

    /// Get the workbook relationships (xl/_rels/workbook.xml.rels)
    pub fn workbook_rels_xml(&self) -> Result<&[u8]> {
        self.read_part(WORKBOOK_RELS_PATH)
    }

    /// Get the shared-string pool (xl/sharedStrings.xml), if present
    pub fn shared_strings_xml(&self) -> Option<&[u8]> {
        self.part(SHARED_STRINGS_PATH)
    }

    /// Check if a part exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    /// List all part names, sorted
    pub fn part_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parts.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::XlsxBuilder;

    #[test]
    fn test_open_from_bytes() {
        let bytes = XlsxBuilder::new()
            .row(&["Concurso"])
            .row(&["1"])
            .build();
        let archive = XlsxArchive::from_bytes(&bytes).unwrap();

        assert!(archive.contains(WORKBOOK_PATH));
        assert!(archive.contains(WORKBOOK_RELS_PATH));
        assert!(archive.contains("xl/worksheets/sheet1.xml"));
        assert!(archive.workbook_xml().is_ok());
        assert!(archive.workbook_rels_xml().is_ok());
    }

    #[test]
    fn test_corrupt_archive() {
        let result = XlsxArchive::from_bytes(b"definitely not a zip file");
        assert!(matches!(result, Err(XlsxError::CorruptArchive(_))));
    }

    #[test]
    fn test_empty_input_is_corrupt() {
        let result = XlsxArchive::from_bytes(&[]);
        assert!(matches!(result, Err(XlsxError::CorruptArchive(_))));
    }

    #[test]
    fn test_missing_part() {
        let bytes = XlsxBuilder::new().row(&["A"]).build();
        let archive = XlsxArchive::from_bytes(&bytes).unwrap();

        match archive.read_part("xl/worksheets/sheet9.xml") {
            Err(XlsxError::PartNotFound(path)) => {
                assert_eq!(path, "xl/worksheets/sheet9.xml")
            }
            other => panic!("Expected PartNotFound, got {:?}", other),
        }
        assert!(archive.part("xl/worksheets/sheet9.xml").is_none());
    }

    #[test]
    fn test_shared_strings_optional() {
        let bytes = XlsxBuilder::new()
            .without_shared_strings()
            .row(&["1", "2"])
            .build();
        let archive = XlsxArchive::from_bytes(&bytes).unwrap();

        assert!(archive.shared_strings_xml().is_none());
    }

    #[test]
    fn test_part_names_sorted() {
        let bytes = XlsxBuilder::new().row(&["A"]).build();
        let archive = XlsxArchive::from_bytes(&bytes).unwrap();

        let names = archive.part_names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"[Content_Types].xml"));
    }
}
