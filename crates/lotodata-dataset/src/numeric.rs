//! Lenient integer coercion for number columns.
//!
//! A value that does not coerce is not an error: the column is simply
//! left out of the record's derived numbers.

/// A cell value as seen by [`to_int`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(&'a str),
}

impl<'a> From<&'a str> for Scalar<'a> {
    fn from(value: &'a str) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar<'_> {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar<'_> {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

/// Coerce a value to an integer
///
/// - integers pass through
/// - floats only when they have no fractional part
/// - text only when, once trimmed, it is made of ASCII digits alone
///   (no sign, no separators) and fits in an `i64`
/// - booleans never coerce
pub fn to_int<'a>(value: impl Into<Scalar<'a>>) -> Option<i64> {
    match value.into() {
        Scalar::Int(n) => Some(n),
        Scalar::Float(f) => {
            if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                Some(f as i64)
            } else {
                None
            }
        }
        Scalar::Bool(_) => None,
        Scalar::Text(s) => {
            let s = s.trim();
            if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse::<i64>().ok()
            } else {
                None
            }
        }
    }
}
