//! Manifest of generated datasets and file-name slugs.

use lotodata_dataset::Dataset;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Index written next to the datasets as `manifest.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub generated_at_utc: String,
    pub datasets: Vec<ManifestEntry>,
}

/// One generated dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Slug of the archive's file stem, also the dataset file stem
    pub id: String,
    /// Game name
    pub name: String,
    /// Published location of the dataset
    pub path: String,
    pub rows: usize,
    pub number_columns: Vec<String>,
    pub generated_at_utc: String,
}

impl ManifestEntry {
    /// Entry for a dataset published under `public_prefix`
    pub fn new(dataset: &Dataset, public_prefix: &str) -> Self {
        let id = slugify(&dataset.meta.game_name);
        let path = published_path(public_prefix, &dataset_file_name(&id));
        Self {
            id,
            name: dataset.meta.game_name.clone(),
            path,
            rows: dataset.meta.rows,
            number_columns: dataset.meta.number_columns.clone(),
            generated_at_utc: dataset.meta.generated_at_utc.clone(),
        }
    }
}

/// File name of the dataset with the given id
pub fn dataset_file_name(id: &str) -> String {
    format!("{}.json", id)
}

fn published_path(prefix: &str, file_name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", prefix, file_name)
    }
}

/// URL-safe identifier for a name
///
/// Accents are stripped, letters lowercased and every run of other
/// characters becomes a single `-`. Empty results become `dataset`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.nfkd().filter(|c| !is_combining_mark(*c)) {
        for c in c.to_lowercase() {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            } else {
                pending_dash = true;
            }
        }
    }

    if slug.is_empty() {
        "dataset".to_string()
    } else {
        slug
    }
}
