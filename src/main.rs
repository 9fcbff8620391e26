//! Servlet Resolver Daemon
//!
//! Loads servlet and filter registrations from a TOML file, keeps them in a
//! lock-free registry and republishes the registry whenever the file changes.
//!
//! # Architecture Overview
//!
//! ```text
//!     resolver.toml
//!          │
//!          ▼
//!    ┌───────────┐     ┌────────────┐     ┌───────────────┐     ┌──────────────┐
//!    │  config   │────▶│ descriptor │────▶│   registry    │────▶│   snapshot   │
//!    │  loader   │     │ normalize  │     │ (ArcSwap)     │     │ (immutable)  │
//!    └─────▲─────┘     └────────────┘     └───────────────┘     └──────┬───────┘
//!          │                                                          │
//!    ┌─────┴─────┐                                                    ▼
//!    │  watcher  │                                          ┌──────────────────┐
//!    │ (notify)  │                                          │ routing: resolve │
//!    └───────────┘                                          │ + filter chain   │
//!                                                           └──────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use servlet_resolver::config::{load_config, ConfigWatcher};
use servlet_resolver::observability::init_logging;
use servlet_resolver::registry::{BindingRegistry, RegistrationReport};

#[derive(Parser)]
#[command(name = "servlet-resolver")]
#[command(about = "Servlet and filter resolution registry", long_about = None)]
struct Args {
    /// Path to the resolver configuration file.
    #[arg(short, long, default_value = "resolver.toml")]
    config: PathBuf,

    /// Load once and exit instead of watching for changes.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config)?;
    init_logging(&config.observability)?;

    tracing::info!(
        path = ?args.config,
        search_paths = ?config.resolver.search_paths,
        servlets = config.servlets.len(),
        filters = config.filters.len(),
        "Configuration loaded"
    );

    let (registry, report) = BindingRegistry::from_config(&config);
    log_report(&report);

    if args.once {
        return Ok(());
    }

    let (watcher, mut updates) = ConfigWatcher::new(&args.config);
    // Dropping the handle stops the watch
    let _watch = watcher.run()?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(new_config) = updates.recv() => {
                if new_config.observability != config.observability {
                    tracing::warn!("Observability settings changed, restart to apply them");
                }
                let report = registry.apply_config(&new_config);
                log_report(&report);
            }
            result = &mut shutdown => {
                result?;
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    tracing::info!(revision = registry.snapshot().revision(), "Shutdown complete");
    Ok(())
}

fn log_report(report: &RegistrationReport) {
    // Individual rejections are already logged by the registry
    tracing::info!(
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        "Registrations applied"
    );
}
