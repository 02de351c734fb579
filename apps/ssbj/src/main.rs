//! # SSBJ Readiness Server
//!
//! The main binary for SSBJ disclosure readiness tracking.
//!
//! This application provides:
//! - HTTP JSON API server (axum-based)
//! - CLI interface for administration and reports
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │               apps/ssbj (THE BINARY)                 │
//! │                                                      │
//! │   ┌─────────────┐   ┌─────────────┐   ┌──────────┐   │
//! │   │    CLI      │   │  HTTP API   │   │  Config  │   │
//! │   │   (clap)    │   │   (axum)    │   │  (toml)  │   │
//! │   └──────┬──────┘   └──────┬──────┘   └────┬─────┘   │
//! │          └─────────────────┼───────────────┘         │
//! │                            ▼                         │
//! │                    ┌───────────────┐                 │
//! │                    │   ssbj-core   │                 │
//! │                    │  (THE LOGIC)  │                 │
//! │                    └───────────────┘                 │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Create a database and register users
//! ssbj init
//! ssbj user add ito --role assessor
//!
//! # Start the HTTP server
//! ssbj server --host 0.0.0.0 --port 8080
//!
//! # Reports
//! ssbj dashboard --as ito
//! ssbj assessment show 1 --json-mode
//! ```

use clap::Parser;
use ssbj::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // SSBJ_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SSBJ_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ssbj=info,ssbj_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!(kind = e.kind(), "Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗███████╗██████╗      ██╗
  ██╔════╝██╔════╝██╔══██╗     ██║
  ███████╗███████╗██████╔╝     ██║
  ╚════██║╚════██║██╔══██╗██   ██║
  ███████║███████║██████╔╝╚█████╔╝
  ╚══════╝╚══════╝╚═════╝  ╚════╝

  Disclosure Readiness v{}

  Assess • Review • Report
"#,
        env!("CARGO_PKG_VERSION")
    );
}
