//! Shared test utilities for lotodata-xlsx
//!
//! Builds small in-memory XLSX containers so tests across the workspace can
//! exercise the reader without binary fixtures.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

const WORKBOOK_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const DOC_RELS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Builder for a minimal single-sheet XLSX container
///
/// Cell values that parse as numbers are written as raw `<v>` literals,
/// other text goes through the shared-string pool (or inline strings when
/// the pool is disabled). Empty strings produce no cell record at all.
///
/// # Example
/// ```ignore
/// use lotodata_xlsx::test_utils::XlsxBuilder;
/// let bytes = XlsxBuilder::new()
///     .row(&["Concurso", "Bola1"])
///     .row(&["1", "5"])
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct XlsxBuilder {
    rows: Vec<Vec<String>>,
    use_shared_strings: bool,
    sheet_target: String,
    sheet_xml: Option<String>,
    shared_strings_xml: Option<String>,
    workbook_xml: Option<String>,
    rels_xml: Option<String>,
}

impl Default for XlsxBuilder {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            use_shared_strings: true,
            sheet_target: "worksheets/sheet1.xml".to_string(),
            sheet_xml: None,
            shared_strings_xml: None,
            workbook_xml: None,
            rels_xml: None,
        }
    }
}

impl XlsxBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of cell values
    pub fn row(mut self, values: &[&str]) -> Self {
        self.rows
            .push(values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Write text cells as inline strings and omit xl/sharedStrings.xml
    pub fn without_shared_strings(mut self) -> Self {
        self.use_shared_strings = false;
        self
    }

    /// Relationship target of the first sheet (default "worksheets/sheet1.xml")
    pub fn sheet_target(mut self, target: &str) -> Self {
        self.sheet_target = target.to_string();
        self
    }

    /// Use a hand-written worksheet instead of the generated one
    pub fn sheet_xml(mut self, xml: &str) -> Self {
        self.sheet_xml = Some(xml.to_string());
        self
    }

    /// Use a hand-written shared-string pool instead of the generated one
    pub fn shared_strings_xml(mut self, xml: &str) -> Self {
        self.shared_strings_xml = Some(xml.to_string());
        self
    }

    /// Use a hand-written workbook descriptor
    pub fn workbook_xml(mut self, xml: &str) -> Self {
        self.workbook_xml = Some(xml.to_string());
        self
    }

    /// Use a hand-written workbook relationship table
    pub fn rels_xml(mut self, xml: &str) -> Self {
        self.rels_xml = Some(xml.to_string());
        self
    }

    /// Internal path the worksheet part is stored at
    fn sheet_part_path(&self) -> String {
        let target = self.sheet_target.trim_start_matches('/');
        if target.starts_with("xl/") {
            target.to_string()
        } else {
            format!("xl/{}", target)
        }
    }

    /// Produce the ZIP bytes
    pub fn build(&self) -> Vec<u8> {
        let (generated_sheet, pool) = self.generate_sheet();

        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let sheet_path = self.sheet_part_path();

        // [Content_Types].xml
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/{}" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#,
                sheet_path
            )
            .as_bytes(),
        )
        .unwrap();

        // _rels/.rels
        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
                PKG_RELS_NS
            )
            .as_bytes(),
        )
        .unwrap();

        // xl/workbook.xml
        let workbook = self.workbook_xml.clone().unwrap_or_else(|| {
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{}" xmlns:r="{}">
  <sheets>
    <sheet name="Resultados" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>"#,
                WORKBOOK_NS, DOC_RELS_NS
            )
        });
        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook.as_bytes()).unwrap();

        // xl/_rels/workbook.xml.rels
        let rels = self.rels_xml.clone().unwrap_or_else(|| {
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="{}"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#,
                PKG_RELS_NS,
                escape(self.sheet_target.as_str())
            )
        });
        zip.start_file("xl/_rels/workbook.xml.rels", options)
            .unwrap();
        zip.write_all(rels.as_bytes()).unwrap();

        // xl/sharedStrings.xml
        let shared = match (&self.shared_strings_xml, self.use_shared_strings) {
            (Some(xml), _) => Some(xml.clone()),
            (None, true) => Some(shared_strings_document(&pool)),
            (None, false) => None,
        };
        if let Some(shared) = shared {
            zip.start_file("xl/sharedStrings.xml", options).unwrap();
            zip.write_all(shared.as_bytes()).unwrap();
        }

        // worksheet
        let sheet = self.sheet_xml.clone().unwrap_or(generated_sheet);
        zip.start_file(sheet_path.as_str(), options).unwrap();
        zip.write_all(sheet.as_bytes()).unwrap();

        zip.finish().unwrap();
        buffer.into_inner()
    }

    /// Generate worksheet XML and the shared-string pool it references
    fn generate_sheet(&self) -> (String, Vec<String>) {
        let mut pool: Vec<String> = Vec::new();
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<worksheet xmlns="{}"><sheetData>"#, WORKBOOK_NS));

        for (row_idx, row) in self.rows.iter().enumerate() {
            let row_number = row_idx + 1;
            xml.push_str(&format!(r#"<row r="{}">"#, row_number));

            for (col_idx, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let reference = format!("{}{}", column_label(col_idx), row_number);

                if value.parse::<f64>().is_ok() {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value));
                } else if self.use_shared_strings {
                    let index = match pool.iter().position(|s| s == value) {
                        Some(index) => index,
                        None => {
                            pool.push(value.clone());
                            pool.len() - 1
                        }
                    };
                    xml.push_str(&format!(
                        r#"<c r="{}" t="s"><v>{}</v></c>"#,
                        reference, index
                    ));
                } else {
                    xml.push_str(&format!(
                        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                        reference,
                        escape(value.as_str())
                    ));
                }
            }

            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        (xml, pool)
    }
}

/// Render a shared-string pool document
fn shared_strings_document(pool: &[String]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(&format!(
        r#"<sst xmlns="{}" count="{}" uniqueCount="{}">"#,
        WORKBOOK_NS,
        pool.len(),
        pool.len()
    ));
    for s in pool {
        xml.push_str(&format!(
            r#"<si><t xml:space="preserve">{}</t></si>"#,
            escape(s.as_str())
        ));
    }
    xml.push_str("</sst>");
    xml
}

/// Encode a 0-indexed column as letters (0 -> A, 26 -> AA)
pub fn column_label(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::XlsxArchive;

    #[test]
    fn test_column_label() {
        assert_eq!(column_label(0), "A");
        assert_eq!(column_label(25), "Z");
        assert_eq!(column_label(26), "AA");
        assert_eq!(column_label(27), "AB");
        assert_eq!(column_label(702), "AAA");
    }

    #[test]
    fn test_builder_writes_expected_parts() {
        let bytes = XlsxBuilder::new()
            .row(&["Concurso", "Bola1"])
            .row(&["1", "5"])
            .build();
        let archive = XlsxArchive::from_bytes(&bytes).unwrap();

        assert!(archive.contains("[Content_Types].xml"));
        assert!(archive.contains("xl/workbook.xml"));
        assert!(archive.contains("xl/_rels/workbook.xml.rels"));
        assert!(archive.contains("xl/sharedStrings.xml"));
        assert!(archive.contains("xl/worksheets/sheet1.xml"));

        let sheet =
            String::from_utf8_lossy(archive.part("xl/worksheets/sheet1.xml").unwrap()).into_owned();
        assert!(sheet.contains(r#"<c r="A1" t="s"><v>0</v></c>"#));
        assert!(sheet.contains(r#"<c r="B2"><v>5</v></c>"#));
    }

    #[test]
    fn test_builder_custom_target() {
        let bytes = XlsxBuilder::new()
            .sheet_target("/xl/worksheets/data.xml")
            .row(&["A"])
            .build();
        let archive = XlsxArchive::from_bytes(&bytes).unwrap();

        assert!(archive.contains("xl/worksheets/data.xml"));
    }
}
