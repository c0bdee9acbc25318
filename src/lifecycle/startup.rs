//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the config file (fail closed)
//! - Initialize logging from the loaded config
//! - Bind the shared socket, then start serving
//!
//! Any error here is fatal: the caller never reaches the serving loop.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::dump::{self, DumpFormat};
use crate::config::{load_config, ConfigError};
use crate::observability::logging::{self, LoggingError};
use crate::server::{ServerContext, ServerError, ServerSupervisor};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("failed to render config dump: {0}")]
    Dump(#[from] serde_json::Error),
}

/// What the command line asked for.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub config_path: PathBuf,
    /// Worker thread override; defaults to the logical CPU count.
    pub workers: Option<usize>,
    pub dump: Option<DumpFormat>,
    /// Load and validate the config, then exit without serving.
    pub check_only: bool,
}

/// Run the agent until every worker has stopped.
pub fn run(options: StartupOptions) -> Result<(), StartupError> {
    let config = match load_config(&options.config_path) {
        Ok(config) => config,
        Err(e) => {
            logging::init_console_fallback();
            tracing::error!(
                path = %options.config_path.display(),
                error = %e,
                "Failed to load config"
            );
            return Err(e.into());
        }
    };

    logging::init_logging(&config)?;
    tracing::info!(
        path = %options.config_path.display(),
        port = config.port,
        watched = config.watch_set.len(),
        subscribers = config.subscribe_map.len(),
        servers = config.server_list.len(),
        "Configuration loaded"
    );

    if let Some(format) = options.dump {
        println!("{}", dump::render(&config, format)?);
    }
    if options.check_only {
        return Ok(());
    }

    if config.daemon {
        tracing::warn!("daemon = yes is not supported, running in the foreground");
    }

    let mut ctx = ServerContext::new(config);
    if let Some(workers) = options.workers {
        ctx = ctx.with_width(workers);
    }

    let supervisor = ServerSupervisor::bind(ctx)?;
    supervisor.run()?;

    tracing::info!("Shutdown complete");
    Ok(())
}
