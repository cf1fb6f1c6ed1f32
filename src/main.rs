mod app;
mod data;
mod error;
mod filter;
mod panels;
mod schema;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::data::{Datasets, TableId};
use crate::panels::Dashboard;

#[derive(Parser, Debug)]
#[command(name = "healthdash")]
#[command(about = "A TUI dashboard for California healthcare facility and county data", long_about = None)]
struct Args {
    /// Directory holding hospital.csv, county_level.csv, population.csv and revenue.csv
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Append logs to this file (level via RUST_LOG, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Load and validate the datasets, print one line per panel, then exit
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    // Load errors abort before the terminal is touched
    let datasets = Datasets::load(&args.data_dir)
        .with_context(|| format!("loading datasets from {}", args.data_dir.display()))?;
    let dashboard = Dashboard::compose(datasets);

    if args.check {
        return check(&dashboard);
    }

    // Initialize terminal
    let terminal = ratatui::init();

    // Run app
    let result = app::App::new(dashboard).run(terminal);

    // Restore terminal
    ratatui::restore();

    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn check(dashboard: &Dashboard) -> Result<()> {
    for &id in TableId::all() {
        println!("{:<14} {} rows", id.name(), dashboard.datasets().table(id).len());
    }
    for view in dashboard.views() {
        match &view.body {
            Ok(_) => println!("{:<40} ok", view.id.spec().title),
            Err(e) => println!("{:<40} {}", view.id.spec().title, e),
        }
    }

    let failed = dashboard.failures().len();
    if failed > 0 {
        bail!("{} panel(s) cannot be rendered", failed);
    }
    Ok(())
}
