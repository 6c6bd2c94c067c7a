//! servicedesk - Service Desk Queue Monitor
//!
//! A terminal dashboard that shows the open ticket queue and alerts while
//! tickets sit unassigned.
//!
//! ## Usage
//!
//! ```bash
//! # Start the dashboard
//! servicedesk
//!
//! # Muted, refreshing every 5 seconds
//! servicedesk --mute --refresh-secs 5
//!
//! # Print one generated batch as JSON
//! servicedesk --dump --seed 7
//! ```

use std::io::Write;
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use desk_core::{Batch, DeskConfig, DeskError, LogGuard, TicketGenerator, init_logging};
use desk_tui::App;
use tracing::{error, info};

/// Service desk queue monitor
///
/// Shows open tickets, flashes and chimes while any are unassigned.
#[derive(Parser, Debug)]
#[command(name = "servicedesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.servicedesk/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Configuration file (defaults to ~/.servicedesk/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start with sound alerts muted
    #[arg(long)]
    mute: bool,

    /// Seed the ticket generator for a repeatable queue
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds between queue refreshes
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// Print one generated batch as JSON and exit
    #[arg(long)]
    dump: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {}", e);
            eprintln!("Error: {}", e);
            if let Some(hint) = e.guidance() {
                eprintln!("{hint}");
            }
            return ExitCode::from(if e.is_config_error() { 2 } else { 1 });
        }
    };

    if cli.dump {
        return dump_batch(&config);
    }

    install_panic_hook();

    info!("Starting service desk monitor");

    match run_app(&config) {
        Ok(()) => {
            info!("service desk monitor exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("service desk monitor error: {}", e);
            eprintln!("Error: {}", e);
            if let Some(hint) = error_hint(e.as_ref()) {
                eprintln!("{hint}");
            }
            ExitCode::from(1)
        }
    }
}

/// Restore the terminal before the default hook prints the panic.
fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

fn restore_terminal() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();

    let _ = crossterm::terminal::disable_raw_mode();
    crossterm::execute!(
        stdout,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    stdout.flush()?;

    Ok(())
}

fn setup_logging(cli: &Cli) -> desk_core::Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0)
}

/// Load configuration and apply command-line overrides.
fn load_config(cli: &Cli) -> desk_core::Result<DeskConfig> {
    let mut config = DeskConfig::load(cli.config.as_deref())?;

    if let Some(secs) = cli.refresh_secs {
        config = config.with_refresh_secs(secs);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if cli.mute {
        config = config.muted();
    }

    config.validate()?;
    Ok(config)
}

fn dump_batch(config: &DeskConfig) -> ExitCode {
    match render_batch(config) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: failed to serialize batch: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Generate one batch and render it as pretty JSON.
fn render_batch(config: &DeskConfig) -> serde_json::Result<String> {
    let mut generator = TicketGenerator::from_config(&config.generator);
    serde_json::to_string_pretty(&Batch::new(generator.generate_batch()))
}

/// Guidance for errors that carry it.
fn error_hint(e: &(dyn std::error::Error + 'static)) -> Option<&'static str> {
    e.downcast_ref::<DeskError>().and_then(DeskError::guidance)
}

/// Run the dashboard on a single-threaded runtime.
fn run_app(config: &DeskConfig) -> desk_tui::AppResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut app = App::new(config)?;
    runtime.block_on(app.run())
}
