//! Workbook descriptor and relationship parsing
//!
//! The workbook descriptor (`xl/workbook.xml`) lists sheets by relationship
//! id; the relationship table (`xl/_rels/workbook.xml.rels`) maps those ids
//! to part paths relative to the `xl/` folder.
//!
//! # Example
//!
//! ```ignore
//! use lotodata_xlsx::relationships::first_sheet_path;
//!
//! let path = first_sheet_path(archive.workbook_xml()?, archive.workbook_rels_xml()?)?;
//! assert_eq!(path, "xl/worksheets/sheet1.xml");
//! ```

use std::collections::HashMap;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, XlsxError};

/// Root folder of spreadsheet parts inside the container
pub const ROOT_FOLDER: &str = "xl/";

/// Parsed relationships from a .rels file
///
/// Keeps document order alongside an id index.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Ordered list of relationship IDs
    order: Vec<String>,
    /// Map of relationship ID to target
    map: HashMap<String, RelationshipTarget>,
}

/// A relationship target with its type
#[derive(Debug, Clone)]
pub struct RelationshipTarget {
    /// The target path, relative to the descriptor's folder
    pub target: String,
    /// The relationship type URI
    pub rel_type: String,
}

impl Relationships {
    /// Parse relationships from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Relationships::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;

                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            match attr.key.as_ref() {
                                b"Id" => {
                                    id = Some(attribute_text(&attr)?);
                                }
                                b"Target" => {
                                    target = Some(attribute_text(&attr)?);
                                }
                                b"Type" => {
                                    rel_type = Some(attribute_text(&attr)?);
                                }
                                _ => {}
                            }
                        }

                        if let Some(id) = id {
                            // Later duplicates replace earlier ones
                            if !rels.map.contains_key(&id) {
                                rels.order.push(id.clone());
                            }
                            rels.map.insert(
                                id,
                                RelationshipTarget {
                                    target: target.unwrap_or_default(),
                                    rel_type: rel_type.unwrap_or_default(),
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Look up a relationship by ID
    pub fn get(&self, id: &str) -> Option<&RelationshipTarget> {
        self.map.get(id)
    }

    /// Target path of a relationship, if it has a non-empty one
    pub fn target(&self, id: &str) -> Option<&str> {
        self.map
            .get(id)
            .map(|rel| rel.target.as_str())
            .filter(|target| !target.is_empty())
    }

    /// Iterate relationships in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationshipTarget)> {
        self.order
            .iter()
            .filter_map(|id| self.map.get(id).map(|rel| (id.as_str(), rel)))
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A sheet declared in the workbook descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    /// Visible sheet name
    pub name: String,
    /// Relationship id pointing at the worksheet part
    pub rel_id: Option<String>,
}

/// Sheets declared by a workbook descriptor, in document order
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<SheetEntry>,
}

impl Workbook {
    /// Parse the workbook descriptor
    ///
    /// Only `sheet` elements nested in `sheets` are collected.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut workbook = Workbook::default();
        let mut in_sheets = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"sheets" => in_sheets = true,
                    b"sheet" if in_sheets => workbook.sheets.push(sheet_entry(e)?),
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    if in_sheets && e.local_name().as_ref() == b"sheet" {
                        workbook.sheets.push(sheet_entry(e)?);
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == b"sheets" {
                        in_sheets = false;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(workbook)
    }

    /// First declared sheet in document order
    pub fn first_sheet(&self) -> Option<&SheetEntry> {
        self.sheets.first()
    }
}

/// Read name and relationship id from a `<sheet>` element
///
/// The relationship id is the namespaced `id` attribute (`r:id` in practice,
/// but any prefix is accepted); the unprefixed `sheetId` is not it.
fn sheet_entry(e: &BytesStart) -> Result<SheetEntry> {
    let mut name = String::new();
    let mut rel_id = None;

    for attr in e.attributes().filter_map(|a| a.ok()) {
        if attr.key.as_ref() == b"name" {
            name = attribute_text(&attr)?;
        } else if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
            rel_id = Some(attribute_text(&attr)?);
        }
    }

    Ok(SheetEntry { name, rel_id })
}

/// Unescaped attribute value
pub(crate) fn attribute_text(attr: &Attribute) -> Result<String> {
    attr.unescape_value()
        .map(|s| s.to_string())
        .map_err(|e| XlsxError::Xml(e.into()))
}

/// Resolve the first declared sheet to its internal part path
///
/// Fails with [`XlsxError::NoSheetsDeclared`] when the descriptor lists no
/// sheets and [`XlsxError::UnresolvedRelationship`] when the sheet's id has
/// no matching target.
pub fn first_sheet_path(workbook_xml: &[u8], rels_xml: &[u8]) -> Result<String> {
    let workbook = Workbook::parse(workbook_xml)?;
    let rels = Relationships::parse(rels_xml)?;

    let sheet = workbook.first_sheet().ok_or(XlsxError::NoSheetsDeclared)?;
    let rel_id = sheet.rel_id.clone().unwrap_or_default();

    let target = rels
        .target(&rel_id)
        .ok_or_else(|| XlsxError::UnresolvedRelationship(rel_id.clone()))?;

    Ok(part_path(target))
}

/// Anchor a relationship target under the `xl/` folder
pub fn part_path(target: &str) -> String {
    let target = target.trim_start_matches('/');
    if target.starts_with(ROOT_FOLDER) {
        target.to_string()
    } else {
        format!("{}{}", ROOT_FOLDER, target)
    }
}
