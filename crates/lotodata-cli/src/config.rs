//! Configuration settings
//!
//! Settings are loaded from `lotodata.toml` in the working directory (or the
//! file given with `--config`):
//!
//! ```toml
//! [paths]
//! raw_dir = "data/raw"
//! out_dir = "data/json"
//! pattern = "*.xlsx"
//! public_prefix = "data/json"
//!
//! [dataset]
//! number_families = ["Bola", "Trevo", "Coluna"]
//! ```
//!
//! Every key is optional; command-line flags override the file.

use std::path::PathBuf;

use lotodata_dataset::DEFAULT_NUMBER_FAMILIES;
use serde::{Deserialize, Serialize};

/// Default configuration file name
pub const CONFIG_FILE: &str = "lotodata.toml";

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Input and output locations
    pub paths: PathSettings,
    /// Dataset construction
    pub dataset: DatasetSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// Where archives are read from and datasets written to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathSettings {
    /// Directory holding the input archives
    pub raw_dir: PathBuf,
    /// Directory receiving one JSON file per archive plus the manifest
    pub out_dir: PathBuf,
    /// Glob matched against file names in `raw_dir`
    pub pattern: String,
    /// Prefix of dataset paths recorded in the manifest
    pub public_prefix: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            out_dir: PathBuf::from("data/json"),
            pattern: "*.xlsx".to_string(),
            public_prefix: "data/json".to_string(),
        }
    }
}

/// Dataset construction settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatasetSettings {
    /// Header prefixes of number columns (`Bola` matches `Bola 1`, `bola02`)
    pub number_families: Vec<String>,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            number_families: DEFAULT_NUMBER_FAMILIES
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}
