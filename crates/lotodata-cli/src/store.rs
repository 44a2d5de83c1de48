//! File store and JSON serializer used by the commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use serde::Serialize;

/// Enumerates input archives and persists output files
pub trait FileStore {
    /// Files matching a glob pattern, sorted by path
    fn list(&self, pattern: &str) -> Result<Vec<PathBuf>>;

    /// Write a file, creating parent directories as needed
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// [`FileStore`] backed by a directory on the local filesystem
///
/// Patterns and relative paths are resolved against the root. The default
/// store is rooted at the working directory.
#[derive(Debug, Clone, Default)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute or root-relative location of `path`
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileStore for FsStore {
    fn list(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let full = pattern_in(&self.root, pattern);
        let mut paths = Vec::new();
        for entry in glob(&full).with_context(|| format!("Invalid glob pattern: {}", full))? {
            let path = entry.context("Failed to read directory entry")?;
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, bytes).with_context(|| format!("Failed to write: {}", path.display()))
    }
}

/// Glob pattern for files named `pattern` inside `dir`
fn pattern_in(dir: &Path, pattern: &str) -> String {
    let dir = glob::Pattern::escape(&dir.to_string_lossy());
    if dir.is_empty() {
        pattern.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), pattern)
    }
}

/// Encode a value as indented UTF-8 JSON (non-ASCII left unescaped)
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value).context("Failed to encode JSON")?;
    bytes.push(b'\n');
    Ok(bytes)
}
