//! Student Service
//!
//! Accepts student records over HTTP, validates them, and persists them
//! through a swappable storage port.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                 STUDENT SERVICE                  │
//!                      │                                                  │
//!   Client Request     │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!   ───────────────────┼─▶│   net   │──▶│   http   │──▶│   students   │   │
//!                      │  │listener │   │ handlers │   │   validate   │   │
//!                      │  └─────────┘   └──────────┘   └──────┬───────┘   │
//!                      │                                      │           │
//!                      │                                      ▼           │
//!   Client Response    │                ┌──────────┐   ┌──────────────┐   │
//!   ◀──────────────────┼────────────────│ response │◀──│   storage    │   │
//!                      │                │ encoder  │   │ file|memory  │   │
//!                      │                └──────────┘   └──────────────┘   │
//!                      │                                                  │
//!                      │  ┌───────────┐  ┌─────────────────────────────┐  │
//!                      │  │  config   │  │          lifecycle          │  │
//!                      │  │  logging  │  │ signals → drain → stopped   │  │
//!                      │  └───────────┘  └─────────────────────────────┘  │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use student_service::config::load_config;
use student_service::lifecycle::startup;
use student_service::observability::logging;

#[derive(Parser)]
#[command(name = "student-service")]
#[command(about = "Create-and-validate HTTP service for student records", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("student-service: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("student-service: failed to initialise logging: {e}");
    }

    tracing::info!(
        env = %config.env,
        address = %config.http_server.address,
        driver = ?config.storage.driver,
        grace_period_secs = config.shutdown.grace_period_secs,
        "student-service v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    match startup::run(&config).await {
        Ok(outcome) => {
            tracing::info!(outcome = ?outcome, "Shutdown complete");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error, exiting");
            Err(e.into())
        }
    }
}
