//! Binary entry point: parse the command line, start logging and the async
//! runtime that carries catalog requests, then drive the Ratatui event loop
//! until the user exits.
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use book_finder::config::{DEFAULT_CATALOG_URL, DEFAULT_COVERS_URL, DEFAULT_RESULT_LIMIT};
use book_finder::logging::init_logging;
use book_finder::{run_app, App, Config};
use clap::Parser;
use tracing::info;

/// Search the Open Library catalog by title from the terminal
#[derive(Parser, Debug)]
#[command(name = "book-finder", version)]
struct Args {
    /// Title to search for on startup
    query: Option<String>,

    /// Catalog search endpoint
    #[arg(long, default_value = DEFAULT_CATALOG_URL)]
    catalog_url: String,

    /// Base URL for cover images
    #[arg(long, default_value = DEFAULT_COVERS_URL)]
    covers_url: String,

    /// Maximum number of results kept from each search (at least 1)
    #[arg(short, long, default_value_t = DEFAULT_RESULT_LIMIT)]
    limit: NonZeroUsize,

    /// Write the log here instead of ~/.book-finder/book-finder.log
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> (Config, Option<String>) {
        let config = Config {
            catalog_url: self.catalog_url,
            covers_url: self.covers_url,
            result_limit: self.limit,
            log_path: self.log_file,
            ..Config::default()
        };
        (config, self.query)
    }
}

fn main() -> Result<()> {
    let (config, initial_query) = Args::parse().into_config();

    init_logging(&config.resolved_log_path()?)?;
    info!(catalog = %config.catalog_url, limit = config.result_limit.get(), "starting book finder");

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    let mut app = App::new(&config, runtime.handle().clone());
    if let Some(query) = initial_query {
        app.start_search(&query);
    }

    let result = run_app(&mut app);
    info!("book finder exited");
    result
}
