//! sync-agent
//!
//! File-synchronization agent: loads the sync topology and serves peers.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file ──▶ loader ──▶ topology ──▶ SyncConfig (Arc, immutable)
//!                                                │
//!                                                ▼
//!                                       ServerSupervisor
//!                                   bind 0.0.0.0:port, backlog 1024
//!                                                │
//!                    ┌───────────────────────────┼───────────────────────────┐
//!                    ▼                           ▼                           ▼
//!            sync-worker-0               sync-worker-1        ...    sync-worker-N
//!         ConnectionScheduler         ConnectionScheduler          ConnectionScheduler
//!          accept ──▶ handler          accept ──▶ handler           accept ──▶ handler
//! ```

use std::path::PathBuf;

use clap::Parser;
use sync_agent::config::dump::DumpFormat;
use sync_agent::lifecycle::startup::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "sync-agent")]
#[command(about = "File-synchronization agent", long_about = None)]
struct Cli {
    /// Path to the agent's property file
    #[arg(short, long)]
    config: PathBuf,

    /// Worker threads (default: logical CPU count)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Print the loaded configuration before serving
    #[arg(long, value_enum)]
    dump: Option<DumpFormat>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    startup::run(StartupOptions {
        config_path: cli.config,
        workers: cli.workers,
        dump: cli.dump,
        check_only: cli.check,
    })?;

    Ok(())
}
