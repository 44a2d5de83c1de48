//! Dataset model serialized as the per-game JSON artifact.

use indexmap::IndexMap;
use serde::Serialize;

/// Field holding the draw's sequence number
pub const DRAW_NUMBER_FIELD: &str = "Concurso";

/// Key of the derived number list in a serialized record
pub const NUMBERS_FIELD: &str = "__numbers";

/// Spellings of the draw-date field, in lookup priority
pub const DRAW_DATE_FIELDS: [&str; 3] = ["Data do Sorteio", "Data de Sorteio", "Data de apuração"];

/// Dataset built from one archive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub meta: Meta,
    pub stats: Stats,
    pub last: LastDraw,
    pub draws: Vec<Record>,
}

/// Provenance and shape of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meta {
    /// Game name, taken from the archive's file stem
    pub game_name: String,
    /// Archive file name
    pub source_file: String,
    /// UTC timestamp, `YYYY-MM-DDTHH:MM:SSZ`
    pub generated_at_utc: String,
    /// Number of draws
    pub rows: usize,
    /// Number columns in header order
    pub number_columns: Vec<String>,
}

/// Frequency of every drawn number across the dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_numbers: u64,
    /// Count per number, keyed by its decimal text, in first-seen order
    pub number_counts: IndexMap<String, u64>,
}

impl Stats {
    /// Count one drawn number
    pub fn record(&mut self, number: i64) {
        *self.number_counts.entry(number.to_string()).or_insert(0) += 1;
        self.total_numbers += 1;
    }

    /// Times a number was drawn
    pub fn count(&self, number: i64) -> u64 {
        self.number_counts
            .get(&number.to_string())
            .copied()
            .unwrap_or(0)
    }
}

/// Identifying fields of the most recent draw
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LastDraw {
    #[serde(rename = "Concurso")]
    pub draw_number: Option<String>,
    #[serde(rename = "Data do Sorteio")]
    pub draw_date: Option<String>,
}

impl LastDraw {
    /// Identify a record; the date comes from the first spelling present
    pub fn from_record(record: &Record) -> Self {
        Self {
            draw_number: record.get(DRAW_NUMBER_FIELD).map(str::to_string),
            draw_date: DRAW_DATE_FIELDS
                .iter()
                .find_map(|field| record.get(field))
                .map(str::to_string),
        }
    }
}

/// One draw: header → trimmed text, plus the derived numbers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(flatten)]
    pub fields: IndexMap<String, String>,
    #[serde(rename = "__numbers", skip_serializing_if = "Option::is_none")]
    pub numbers: Option<Vec<i64>>,
}

impl Record {
    /// Text of a field
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields.get(header).map(|s| s.as_str())
    }

    /// Derived numbers, empty when none coerced
    pub fn numbers(&self) -> &[i64] {
        self.numbers.as_deref().unwrap_or(&[])
    }
}
