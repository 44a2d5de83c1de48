//! Worksheet decoding into a dense row matrix
//!
//! Worksheet XML is sparse: rows list only the cells that exist, and each
//! cell may or may not carry an `r="B7"` reference. A per-row column cursor
//! places unreferenced cells right after their predecessor.
//!
//! ```xml
//! <sheetData>
//!   <row r="1">
//!     <c r="A1" t="s"><v>0</v></c>
//!     <c r="C1"><v>42</v></c>
//!     <c><v>43</v></c>              <!-- lands in D -->
//!   </row>
//! </sheetData>
//! ```
//!
//! Every row of the resulting [`RowMatrix`] has the same width: one past the
//! largest column index seen anywhere in the sheet.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::column::{column_index, split_cell_reference, MAX_COLUMNS};
use crate::error::{Result, XlsxError};
use crate::relationships::attribute_text;
use crate::shared_strings::SharedStrings;

/// A cell's value as stored, tagged by its `t` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// `t="s"`: the `<v>` text is an index into the shared-string pool
    SharedString(Option<String>),
    /// `t="inlineStr"`: text of the first `<t>` under the cell
    InlineString(Option<String>),
    /// Numbers, booleans and untyped cells: the `<v>` text as written
    Raw(Option<String>),
}

impl CellValue {
    /// Resolve to display text
    ///
    /// A shared-string index that does not parse or points past the end of
    /// the pool falls back to the raw `<v>` text.
    pub fn resolve(self, shared: &SharedStrings) -> Option<String> {
        match self {
            CellValue::SharedString(Some(raw)) => {
                let entry = raw
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| shared.get(index));
                match entry {
                    Some(text) => Some(text.to_string()),
                    None => Some(raw),
                }
            }
            CellValue::SharedString(None) => None,
            CellValue::InlineString(text) | CellValue::Raw(text) => text,
        }
    }
}

/// Kind of value a cell holds, from its `t` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    SharedString,
    InlineString,
    Raw,
}

impl CellKind {
    fn from_type_attr(value: Option<&str>) -> Self {
        match value {
            Some("s") => CellKind::SharedString,
            Some("inlineStr") => CellKind::InlineString,
            _ => CellKind::Raw,
        }
    }
}

/// Cell being decoded
#[derive(Debug)]
struct PendingCell {
    column: usize,
    kind: CellKind,
    value: Option<String>,
    inline: Option<String>,
    /// Whether the first `<t>` was already met
    inline_seen: bool,
}

impl PendingCell {
    fn new(column: usize, kind: CellKind) -> Self {
        Self {
            column,
            kind,
            value: None,
            inline: None,
            inline_seen: false,
        }
    }

    fn into_value(self) -> CellValue {
        // An empty <v></v> or <t></t> carries no text at all
        let value = self.value.filter(|s| !s.is_empty());
        let inline = self.inline.filter(|s| !s.is_empty());
        match self.kind {
            CellKind::SharedString => CellValue::SharedString(value),
            CellKind::InlineString => CellValue::InlineString(inline),
            CellKind::Raw => CellValue::Raw(value),
        }
    }
}

/// Text sink active while inside `<v>` or the first `<t>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Inline,
}

/// Dense rectangular matrix of optional cell texts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowMatrix {
    rows: Vec<Vec<Option<String>>>,
    width: usize,
}

impl RowMatrix {
    /// Decode worksheet XML against its shared-string pool
    pub fn build(xml: &[u8], shared: &SharedStrings) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut depth: usize = 0;
        let mut sheet_data_level: Option<usize> = None;
        let mut row_level: Option<usize> = None;
        let mut cell_level: Option<usize> = None;

        let mut sparse_rows: Vec<Vec<(usize, Option<String>)>> = Vec::new();
        let mut row_cells: Vec<(usize, Option<String>)> = Vec::new();
        let mut cursor: usize = 0;
        let mut cell: Option<PendingCell> = None;
        let mut text_target = TextTarget::None;
        let mut max_column: usize = 0;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.local_name();
                    match name.as_ref() {
                        b"sheetData" if sheet_data_level.is_none() => {
                            sheet_data_level = Some(depth);
                        }
                        b"row" if is_child(sheet_data_level, depth) => {
                            row_level = Some(depth);
                            row_cells.clear();
                            cursor = 0;
                        }
                        b"c" if is_child(row_level, depth) => {
                            cell = Some(start_cell(e, &mut cursor)?);
                            cell_level = Some(depth);
                        }
                        b"v" if is_child(cell_level, depth) => {
                            text_target = TextTarget::Value;
                            if let Some(ref mut c) = cell {
                                c.value.get_or_insert_with(String::new);
                            }
                        }
                        b"t" if cell_level.is_some() => {
                            if let Some(ref mut c) = cell {
                                if !c.inline_seen {
                                    c.inline_seen = true;
                                    c.inline = Some(String::new());
                                    text_target = TextTarget::Inline;
                                }
                            }
                        }
                        _ => {}
                    }
                    depth += 1;
                }
                Ok(Event::Empty(ref e)) => {
                    let name = e.local_name();
                    match name.as_ref() {
                        b"row" if is_child(sheet_data_level, depth) => {
                            if !sparse_rows.is_empty() {
                                sparse_rows.push(Vec::new());
                            }
                        }
                        b"c" if is_child(row_level, depth) => {
                            let pending = start_cell(e, &mut cursor)?;
                            max_column = max_column.max(pending.column);
                            row_cells.push((pending.column, None));
                        }
                        b"t" if cell_level.is_some() => {
                            if let Some(ref mut c) = cell {
                                c.inline_seen = true;
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) => {
                    depth = depth.saturating_sub(1);
                    let name = e.local_name();
                    match name.as_ref() {
                        b"v" | b"t" => text_target = TextTarget::None,
                        _ => {}
                    }

                    if cell_level == Some(depth) {
                        cell_level = None;
                        text_target = TextTarget::None;
                        if let Some(pending) = cell.take() {
                            let column = pending.column;
                            max_column = max_column.max(column);
                            row_cells.push((column, pending.into_value().resolve(shared)));
                        }
                    } else if row_level == Some(depth) {
                        row_level = None;
                        // Rows before the first one holding cells are not part of the table
                        if !(row_cells.is_empty() && sparse_rows.is_empty()) {
                            sparse_rows.push(std::mem::take(&mut row_cells));
                        }
                    } else if sheet_data_level == Some(depth) {
                        sheet_data_level = None;
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(ref mut c) = cell {
                        let target = match text_target {
                            TextTarget::Value => c.value.as_mut(),
                            TextTarget::Inline => c.inline.as_mut(),
                            TextTarget::None => None,
                        };
                        if let Some(text) = target {
                            let unescaped = e.unescape().map_err(|e| XlsxError::Xml(e.into()))?;
                            text.push_str(&unescaped);
                        }
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(ref mut c) = cell {
                        let target = match text_target {
                            TextTarget::Value => c.value.as_mut(),
                            TextTarget::Inline => c.inline.as_mut(),
                            TextTarget::None => None,
                        };
                        if let Some(text) = target {
                            text.push_str(&String::from_utf8_lossy(e));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if sparse_rows.is_empty() {
            return Ok(Self::default());
        }

        let width = max_column + 1;
        let rows = sparse_rows
            .into_iter()
            .map(|cells| {
                let mut row = vec![None; width];
                for (column, value) in cells {
                    // Repeated references to one column: last one wins
                    row[column] = value;
                }
                row
            })
            .collect();

        Ok(Self { rows, width })
    }

    /// Build a matrix from ragged rows, padding each to the widest one
    pub fn from_rows(rows: Vec<Vec<Option<String>>>) -> Self {
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { rows, width }
    }

    /// All rows, each exactly `width()` long
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Consume the matrix into its rows
    pub fn into_rows(self) -> Vec<Vec<Option<String>>> {
        self.rows
    }

    /// Common row width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the matrix has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Whether an element opened at `depth` is a direct child of `parent`
fn is_child(parent: Option<usize>, depth: usize) -> bool {
    parent.map(|level| level + 1) == Some(depth)
}

/// Place a `<c>` element and advance the row cursor past it
fn start_cell(e: &BytesStart, cursor: &mut usize) -> Result<PendingCell> {
    let mut reference = None;
    let mut type_attr = None;

    for attr in e.attributes().filter_map(|a| a.ok()) {
        match attr.key.as_ref() {
            b"r" => reference = Some(attribute_text(&attr)?),
            b"t" => type_attr = Some(attribute_text(&attr)?),
            _ => {}
        }
    }

    if let Some((letters, _row)) = reference.as_deref().and_then(split_cell_reference) {
        *cursor = column_index(letters)?;
    }

    let column = *cursor;
    if column >= MAX_COLUMNS {
        return Err(XlsxError::InvalidColumnLabel(
            reference.unwrap_or_else(|| format!("column {}", column + 1)),
        ));
    }
    *cursor += 1;

    Ok(PendingCell::new(
        column,
        CellKind::from_type_attr(type_attr.as_deref()),
    ))
}
