//! Dataset transformer - turns a row matrix into draw records and statistics.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use lotodata_xlsx::RowMatrix;
use tracing::debug;

use crate::dataset::{Dataset, LastDraw, Meta, Record, Stats, NUMBERS_FIELD};
use crate::error::{DataError, Result};
use crate::headers::{trim_trailing_blank, HeaderSet, NumberColumnMatcher};
use crate::numeric::to_int;

/// Timestamp layout used in dataset metadata
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format a UTC timestamp the way datasets record it
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Converts a raw row matrix into a [`Dataset`]
///
/// Row 0 is the header row. A data row becomes a record unless it is
/// entirely blank or its first column (the draw identifier) is blank.
#[derive(Debug, Clone, Default)]
pub struct DatasetTransformer {
    matcher: NumberColumnMatcher,
}

impl DatasetTransformer {
    /// Transformer recognising the default number families
    pub fn new() -> Self {
        Self::default()
    }

    /// Transformer recognising the given number families
    pub fn with_families<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            matcher: NumberColumnMatcher::new(families),
        }
    }

    /// Transform a matrix, stamping the dataset with the current time
    pub fn transform(&self, matrix: &RowMatrix, game_name: &str, source_file: &str) -> Result<Dataset> {
        self.transform_at(matrix, game_name, source_file, Utc::now())
    }

    /// Transform a matrix with an explicit generation time
    pub fn transform_at(
        &self,
        matrix: &RowMatrix,
        game_name: &str,
        source_file: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<Dataset> {
        let (header_row, data_rows) = matrix
            .rows()
            .split_first()
            .ok_or(DataError::EmptyWorkbook)?;

        let headers = HeaderSet::clean(trim_trailing_blank(header_row));
        let number_columns = self.matcher.classify(&headers);

        let mut draws = Vec::new();
        let mut stats = Stats::default();

        for (offset, row) in data_rows.iter().enumerate() {
            let row = &row[..headers.len().min(row.len())];

            if row.iter().all(|v| is_blank(v.as_deref())) {
                continue;
            }
            if is_blank(row.first().and_then(|v| v.as_deref())) {
                debug!(row = offset + 1, "skipping row with blank identifier");
                continue;
            }

            let record = build_record(&headers, row, &number_columns);
            for &n in record.numbers() {
                stats.record(n);
            }
            draws.push(record);
        }

        let last = draws.last().map(LastDraw::from_record).unwrap_or_default();

        debug!(
            game = game_name,
            rows = draws.len(),
            number_columns = number_columns.len(),
            "dataset built"
        );

        Ok(Dataset {
            meta: Meta {
                game_name: game_name.to_string(),
                source_file: source_file.to_string(),
                generated_at_utc: format_timestamp(generated_at),
                rows: draws.len(),
                number_columns,
            },
            stats,
            last,
            draws,
        })
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

/// Build one record from a data row already cut to the header width
fn build_record(headers: &HeaderSet, row: &[Option<String>], number_columns: &[String]) -> Record {
    let mut fields = IndexMap::new();

    for (header, value) in headers.names().iter().zip(row) {
        let (Some(header), Some(value)) = (header, value) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        fields.insert(header.clone(), value.to_string());
    }

    let numbers: Vec<i64> = number_columns
        .iter()
        .filter_map(|column| fields.get(column))
        .filter_map(|value| to_int(value.as_str()))
        .collect();

    if numbers.is_empty() {
        return Record {
            fields,
            numbers: None,
        };
    }

    // The derived list takes the key over from a column of the same name
    fields.shift_remove(NUMBERS_FIELD);
    Record {
        fields,
        numbers: Some(numbers),
    }
}
