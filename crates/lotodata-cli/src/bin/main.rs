//! lotodata CLI binary entry point
//!
//! Installs the log subscriber and calls the library's `run_cli()` function.

use anyhow::Result;
use lotodata_cli::{log_filter, run_cli};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    run_cli()
}
