use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use revoice_core::{AfsIndex, Config, Monitor, ProcessHandle};
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "revoice")]
#[command(about = "Plays the unused restaurant voice-over during its cutscene", version)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "revoice.ini")]
    config: PathBuf,

    /// Path to the voice archive (overrides the config)
    #[arg(short, long)]
    archive: Option<PathBuf>,

    /// Path to the optional log file; file logging is enabled only when it
    /// already exists
    #[arg(short, long, default_value = "revoice.log")]
    log: PathBuf,

    /// Attach to a specific process id instead of scanning for the game
    #[arg(long)]
    pid: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log)?;

    info!("Revoice starting...");

    // Load config
    let mut config = match Config::load(&args.config) {
        Ok(c) => {
            info!("Loaded config from {:?}", args.config);
            c
        }
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }
    };

    if let Some(archive) = args.archive {
        config.archive = archive;
    }

    // The archive index is loaded once; without it there is nothing to play.
    let index = match AfsIndex::load(&config.archive) {
        Ok(index) => {
            info!(
                "Loaded archive index from {:?} ({} entries)",
                config.archive,
                index.len()
            );
            index
        }
        Err(e) => {
            error!("Cannot load voice archive: {}", e);
            return Err(e.into());
        }
    };

    // Main loop: wait for process
    loop {
        info!("Waiting for game process...");

        let process = match args.pid {
            Some(pid) => ProcessHandle::open(pid),
            None => ProcessHandle::find_and_open(),
        };

        match process {
            Ok(process) => {
                info!("Found game process (base: {:#x})", process.base_address);

                let mut monitor = Monitor::new(config.clone(), index.clone());
                if let Err(e) = monitor.run(&process) {
                    error!("Monitor error: {}", e);
                }

                info!("Process disconnected, waiting for reconnect...");
            }
            Err(_) => {
                // Process not found, wait and retry
            }
        }

        thread::sleep(RECONNECT_DELAY);
    }
}

/// Set up tracing output. Console logging is always on; the log file is
/// appended to only when it already exists at startup, so leaving no file
/// behind keeps runs silent on disk.
fn init_logging(log_path: &PathBuf) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("revoice=info".parse()?)
        .add_directive("revoice_core=info".parse()?);

    let console = tracing_subscriber::fmt::layer();

    if log_path.exists() {
        let file = std::fs::OpenOptions::new().append(true).open(log_path)?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Arc::new(file));
        tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .init();
    }

    Ok(())
}
