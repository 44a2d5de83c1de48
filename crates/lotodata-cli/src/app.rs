//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use lotodata_dataset::headers::trim_trailing_blank;
use lotodata_dataset::{
    format_timestamp, DataEngine, Dataset, DatasetTransformer, HeaderSet, NumberColumnMatcher,
};
use lotodata_xlsx::{read_first_sheet, XlsxArchive};

use crate::config::{Settings, CONFIG_FILE};
use crate::manifest::{dataset_file_name, Manifest, ManifestEntry};
use crate::store::{encode, FileStore, FsStore};

/// Name of the manifest written next to the datasets
pub const MANIFEST_FILE: &str = "manifest.json";

/// Log filter used when `RUST_LOG` is unset, blank or unparseable
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser)]
#[command(name = "lotodata")]
#[command(author, version, about = "Lottery results spreadsheets to JSON datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every archive in the raw directory and write the manifest
    Build {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the XLSX archives
        #[arg(long)]
        raw_dir: Option<PathBuf>,

        /// Directory receiving the JSON datasets
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Number of archives converted in parallel (1 converts sequentially)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Convert a single archive
    Convert {
        /// Input XLSX file
        input: PathBuf,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show how an archive is read: sheet, dimensions, headers
    Inspect {
        /// Input XLSX file
        input: PathBuf,
    },
}

/// Overrides applied on top of the configuration file
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub raw_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
}

impl BuildOptions {
    fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.raw_dir {
            settings.paths.raw_dir = dir.clone();
        }
        if let Some(dir) = &self.out_dir {
            settings.paths.out_dir = dir.clone();
        }
    }
}

/// Run the CLI application
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            raw_dir,
            out_dir,
            jobs,
        } => {
            let options = BuildOptions {
                raw_dir,
                out_dir,
                jobs,
            };
            let mut settings = load_settings(config.as_deref())?;
            options.apply(&mut settings);
            build_command(&settings, options.jobs)?;
        }
        Commands::Convert {
            input,
            output,
            config,
        } => {
            let settings = load_settings(config.as_deref())?;
            convert_command(&input, output.as_deref(), &settings)?;
        }
        Commands::Inspect { input } => {
            let settings = load_settings(None)?;
            inspect_command(&input, &settings)?;
        }
    }

    Ok(())
}

/// Convert every archive matching the configured pattern and write the manifest
///
/// All archives are converted before anything is written, so a failing
/// archive leaves the output directory untouched.
pub fn build_command(settings: &Settings, jobs: Option<usize>) -> Result<Manifest> {
    let paths = &settings.paths;
    let input = FsStore::new(&paths.raw_dir);
    let output = FsStore::new(&paths.out_dir);

    let archives = input.list(&paths.pattern)?;
    if archives.is_empty() {
        anyhow::bail!(
            "No archives matching '{}' found in {}",
            paths.pattern,
            paths.raw_dir.display()
        );
    }
    info!(archives = archives.len(), raw_dir = %paths.raw_dir.display(), "converting");

    let engine = engine_for(settings);
    let datasets = convert_all(&engine, &archives, jobs)?;

    let mut entries = Vec::with_capacity(datasets.len());
    for (archive, dataset) in archives.iter().zip(&datasets) {
        let entry = ManifestEntry::new(dataset, &paths.public_prefix);
        let file = PathBuf::from(dataset_file_name(&entry.id));
        output.write(&file, &encode(dataset)?)?;
        info!(
            "[OK] {} -> {} ({} rows)",
            archive.display(),
            output.resolve(&file).display(),
            dataset.meta.rows
        );
        entries.push(entry);
    }

    let manifest = Manifest {
        generated_at_utc: format_timestamp(Utc::now()),
        datasets: entries,
    };
    let manifest_path = Path::new(MANIFEST_FILE);
    output.write(manifest_path, &encode(&manifest)?)?;
    info!(
        datasets = manifest.datasets.len(),
        "manifest written to {}",
        output.resolve(manifest_path).display()
    );

    Ok(manifest)
}

/// Convert one archive, writing the dataset to `output` or stdout
pub fn convert_command(input: &Path, output: Option<&Path>, settings: &Settings) -> Result<Dataset> {
    let dataset = engine_for(settings)
        .convert_file(input)
        .with_context(|| format!("Failed to convert {}", input.display()))?;
    let bytes = encode(&dataset)?;

    match output {
        Some(path) => {
            FsStore::default().write(path, &bytes)?;
            info!(
                "[OK] {} -> {} ({} rows)",
                input.display(),
                path.display(),
                dataset.meta.rows
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&bytes)
                .context("Failed to write to stdout")?;
            stdout.flush().context("Failed to write to stdout")?;
        }
    }

    Ok(dataset)
}

/// Print how an archive is read
pub fn inspect_command(input: &Path, settings: &Settings) -> Result<()> {
    let archive = XlsxArchive::open(input)
        .with_context(|| format!("Failed to open archive: {}", input.display()))?;
    let sheet_path = archive.first_sheet_path()?;
    let matrix = read_first_sheet(&archive)?;

    println!("Archive: {}", input.display());
    println!("  Sheet: {}", sheet_path);
    println!("  Rows: {}", matrix.len());
    println!("  Columns: {}", matrix.width());

    let Some(header_row) = matrix.rows().first() else {
        println!("  (sheet has no rows)");
        return Ok(());
    };

    let headers = HeaderSet::clean(trim_trailing_blank(header_row));
    let matcher = NumberColumnMatcher::new(&settings.dataset.number_families);
    let number_columns = matcher.classify(&headers);

    println!();
    println!("Headers:");
    for (index, header) in headers.names().iter().enumerate() {
        match header {
            Some(name) if number_columns.contains(name) => println!("  {:>3}  {}  [number]", index, name),
            Some(name) => println!("  {:>3}  {}", index, name),
            None => println!("  {:>3}  (blank)", index),
        }
    }
    println!();
    if number_columns.is_empty() {
        println!("No number columns recognised");
    } else {
        println!("Number columns: {}", number_columns.join(", "));
    }

    Ok(())
}

fn engine_for(settings: &Settings) -> DataEngine {
    DataEngine::with_transformer(DatasetTransformer::with_families(
        &settings.dataset.number_families,
    ))
}

/// Convert archives on a worker pool, keeping input order
fn convert_all(engine: &DataEngine, archives: &[PathBuf], jobs: Option<usize>) -> Result<Vec<Dataset>> {
    let convert = |path: &PathBuf| -> Result<Dataset> {
        debug!(archive = %path.display(), "converting");
        engine
            .convert_file(path)
            .with_context(|| format!("Failed to convert {}", path.display()))
    };

    match jobs {
        Some(1) => archives.iter().map(convert).collect(),
        _ => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs.unwrap_or(0))
                .build()
                .context("Failed to start worker pool")?;
            pool.install(|| archives.par_iter().map(convert).collect())
        }
    }
}

/// Log filter from `RUST_LOG`-style directives
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Load settings from the given file, or from `lotodata.toml` when present
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            read_settings(path)
        }
        None => {
            let candidate = Path::new(CONFIG_FILE);
            if candidate.is_file() {
                read_settings(candidate)
            } else {
                Ok(Settings::default())
            }
        }
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let settings = Settings::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    debug!(config = %path.display(), "settings loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_options_override_settings() {
        let mut settings = Settings::default();
        let options = BuildOptions {
            raw_dir: Some(PathBuf::from("in")),
            out_dir: None,
            jobs: Some(2),
        };
        options.apply(&mut settings);

        assert_eq!(settings.paths.raw_dir, PathBuf::from("in"));
        assert_eq!(settings.paths.out_dir, PathBuf::from("data/json"));
    }

    #[test]
    fn test_load_settings_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_settings(Some(temp_dir.path().join("absent.toml").as_path()));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_settings_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lotodata.toml");
        fs::write(&path, "[paths]\npattern = \"*.XLSX\"\n").unwrap();

        let settings = load_settings(Some(path.as_path())).unwrap();
        assert_eq!(settings.paths.pattern, "*.XLSX");
    }

    #[test]
    fn test_load_settings_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[paths\n").unwrap();

        let err = load_settings(Some(path.as_path())).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }

    #[test]
    fn test_cli_parses_build_flags() {
        let cli = Cli::try_parse_from([
            "lotodata", "build", "--raw-dir", "raw", "--out-dir", "out", "--jobs", "1",
        ])
        .unwrap();

        match cli.command {
            Commands::Build {
                raw_dir,
                out_dir,
                jobs,
                config,
            } => {
                assert_eq!(raw_dir, Some(PathBuf::from("raw")));
                assert_eq!(out_dir, Some(PathBuf::from("out")));
                assert_eq!(jobs, Some(1));
                assert!(config.is_none());
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_log_filter_honours_global_level() {
        assert_eq!(log_filter(Some("debug")).to_string(), "debug");
        assert_eq!(log_filter(Some("warn")).to_string(), "warn");
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("  ")).to_string(), "info");
    }

    #[test]
    fn test_cli_requires_convert_input() {
        assert!(Cli::try_parse_from(["lotodata", "convert"]).is_err());
    }
}
