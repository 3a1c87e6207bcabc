// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;
mod shell;

use anyhow::{Context, Result};
use car_catalog::{Catalog, CatalogConfig};
use clap::Parser;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use shell::Shell;

/// In-memory car catalog: grouped by category, sorted by price
#[derive(Parser, Debug)]
#[command(name = "car-catalog", version)]
struct Args {
    /// Open the terminal browser instead of the command shell
    #[arg(long)]
    tui: bool,

    /// Start with an empty catalog instead of the three sample cars
    #[arg(long)]
    no_samples: bool,

    /// Maximum number of cars the catalog accepts
    #[arg(long)]
    capacity: Option<usize>,

    /// Refuse a car whose make and model are already cataloged
    #[arg(long)]
    reject_duplicates: bool,

    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = CatalogConfig {
        capacity: args.capacity,
        allow_duplicates: !args.reject_duplicates,
    };
    log::debug!("catalog config: {:?}", config);

    let mut catalog = Catalog::with_config(config);
    if !args.no_samples {
        // A small --capacity may cut the samples short; keep what fits
        match catalog.add_samples() {
            Ok(()) => log::info!("loaded {} sample cars", catalog.len()),
            Err(err) => log::warn!("sample cars not fully loaded: {}", err),
        }
    }

    if args.tui {
        run_ui_mode(catalog)
    } else {
        run_shell_mode(&mut catalog)
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&args.log_level),
    );

    match &args.log_file {
        Some(path) => {
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(log_file)));
        }
        // Keep the terminal browser's screen clean
        None if args.tui => {
            builder.filter_level(log::LevelFilter::Off);
        }
        None => {}
    }

    builder.init();
    Ok(())
}

fn run_shell_mode(catalog: &mut Catalog) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(catalog, stdin.lock(), stdout.lock()).run()
}

#[cfg(feature = "tui")]
fn run_ui_mode(catalog: Catalog) -> Result<()> {
    let mut app = ui::App::new(catalog);
    ui::run_ui(&mut app)?;

    println!("\n✅ Browser closed ({} cars in catalog)", app.catalog.len());
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_catalog: Catalog) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the command shell: cargo run");
    std::process::exit(1);
}
