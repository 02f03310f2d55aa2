//! # Kestrel
//!
//! Machine controller entry point: loads the machine configuration, runs the
//! ordered bring-up against the simulation backends, then hands the console
//! to the supervised command loop for the rest of the process lifetime.

use clap::Parser;
use kestrel_common::consts::{DEFAULT_CONFIG_PATH, DEFAULT_PAIRING_NAME};
use kestrel_machine::drivers::{self, simulation::ConsoleProcessor, simulation::SimRadio};
use kestrel_machine::loader::TomlConfigSource;
use kestrel_machine::recovery::ParkHalt;
use kestrel_machine::startup_log::StartupLog;
use kestrel_machine::{Bootstrap, HardwareRegistry, Supervisor, SystemState};
use std::path::PathBuf;
use std::process;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Kestrel machine controller
#[derive(Parser, Debug)]
#[command(name = "kestrel")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Multi-axis machine controller: ordered bring-up and supervised command loop")]
struct Args {
    /// Path to the machine configuration TOML.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Network to join in station mode. Without it the controller goes
    /// straight to pairing.
    #[arg(long)]
    ssid: Option<String>,

    /// Name advertised in pairing mode.
    #[arg(long, default_value = DEFAULT_PAIRING_NAME)]
    pairing_name: String,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let startup_log = StartupLog::new();
    setup_tracing(&args, startup_log.clone());

    info!("Kestrel v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = ctrlc::set_handler(|| {
        info!("Received shutdown signal");
        process::exit(0);
    }) {
        warn!("Signal handler not installed: {e}");
    }

    let mut registry = HardwareRegistry::new();
    drivers::register_all(&mut registry);

    let system = SystemState::new();
    let mut source = TomlConfigSource::from_path(&args.config, &registry);
    let mut radio = SimRadio::new(args.ssid.clone(), args.pairing_name.clone());

    let report = Bootstrap::new(&system)
        .with_startup_log(startup_log)
        .run(&mut source, &mut radio);
    info!(
        state = %report.state,
        channel = ?report.channel,
        startup_lines = report.startup_lines.len(),
        "Bootstrap complete"
    );

    let mut console = ConsoleProcessor::new(std::io::stdin().lock(), std::io::stdout());
    Supervisor::new(&system, report.machine).run_forever(&mut console, &mut ParkHalt)
}

fn setup_tracing(args: &Args, startup_log: StartupLog) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = if args.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().compact().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(startup_log)
        .init();
}
