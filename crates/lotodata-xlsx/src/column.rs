//! Column label decoding
//!
//! Spreadsheet columns are addressed by bijective base-26 labels
//! (`A`..`Z`, `AA`..`ZZ`, `AAA`..). There is no zero digit, so `A` is 1 and
//! the result is shifted down to a zero-based index.

use crate::error::{Result, XlsxError};

/// Number of columns a worksheet can address (`A` through `XFD`)
pub const MAX_COLUMNS: usize = 16_384;

/// Convert column letters to a 0-indexed number (A=0, B=1, ..., Z=25, AA=26)
///
/// Lowercase ASCII letters are accepted and folded to uppercase. Labels
/// past `XFD` are rejected so a corrupt reference cannot inflate row width.
pub fn column_index(label: &str) -> Result<usize> {
    if label.is_empty() {
        return Err(XlsxError::InvalidColumnLabel(label.to_string()));
    }

    let mut result: usize = 0;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(XlsxError::InvalidColumnLabel(label.to_string()));
        }
        let value = (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        result = result * 26 + value;
        if result > MAX_COLUMNS {
            return Err(XlsxError::InvalidColumnLabel(label.to_string()));
        }
    }

    Ok(result - 1)
}

/// Split a cell reference like "AB12" into its column letters and row digits
///
/// Only uppercase letters count as the column part. Returns `None` unless the
/// reference starts with at least one letter followed by at least one digit.
/// Anything after the digits is ignored.
pub fn split_cell_reference(reference: &str) -> Option<(&str, &str)> {
    let letters = reference
        .bytes()
        .take_while(|b| b.is_ascii_uppercase())
        .count();
    if letters == 0 {
        return None;
    }

    let rest = &reference[letters..];
    let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }

    Some((&reference[..letters], &rest[..digits]))
}
