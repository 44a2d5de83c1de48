//! lotodata CLI - Command-line interface library
//!
//! This library provides the CLI functionality for lotodata:
//! - Build: convert every archive in a directory and write a manifest
//! - Convert: convert a single archive
//! - Inspect: show the sheet, headers and number columns of an archive
//!
//! # Library Usage
//!
//! ```ignore
//! use lotodata_cli::{build_command, Settings};
//!
//! let manifest = build_command(&Settings::default(), None)?;
//! println!("{} datasets", manifest.datasets.len());
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert data/raw/*.xlsx into data/json/
//! lotodata build
//!
//! # Convert one archive to stdout
//! lotodata convert "data/raw/Mega-Sena.xlsx"
//!
//! # Troubleshoot a spreadsheet
//! lotodata inspect "data/raw/Lotofácil.xlsx"
//! ```

pub mod app;
pub mod config;
pub mod manifest;
pub mod store;

// Re-export main entry point and types
pub use app::{build_command, convert_command, inspect_command, load_settings};
pub use app::{log_filter, run_cli, BuildOptions, DEFAULT_LOG_FILTER, MANIFEST_FILE};
pub use config::{DatasetSettings, PathSettings, Settings};
pub use manifest::{slugify, Manifest, ManifestEntry};
pub use store::{encode, FileStore, FsStore};
