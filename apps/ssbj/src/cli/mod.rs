//! # SSBJ CLI Module
//!
//! This module implements the command-line interface.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a new database with the default admin
//! - `compact` - Reclaim free space in the database file (admin only)
//! - `catalog` - Print the criteria catalog and assurance checklist
//! - `dashboard` - Show role-scoped statistics (the default)
//! - `user add|list` - Manage registered users
//! - `assessment list|show` - Inspect assessments
//! - `review show` - Inspect a review checklist

mod commands;

use crate::config::ServerConfig;
use clap::{Parser, Subcommand};
use ssbj_core::{SsbjError, primitives::DEFAULT_ADMIN_USERNAME};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// SSBJ readiness - sustainability disclosure gap assessments and
/// limited-assurance reviews.
#[derive(Parser, Debug)]
#[command(name = "ssbj")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the database (overrides the config file)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Path to a TOML config file (default: ./ssbj.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Username to act as
    #[arg(long = "as", global = true, default_value = DEFAULT_ADMIN_USERNAME)]
    pub as_user: String,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize a new database
    Init {
        /// Replace an existing database
        #[arg(short, long)]
        force: bool,
    },

    /// Compact the database file
    Compact,

    /// Print the criteria catalog, assurance checklist and maturity scale
    Catalog,

    /// Show dashboard statistics for the acting user
    Dashboard,

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Inspect assessments
    Assessment {
        #[command(subcommand)]
        action: AssessmentCommand,
    },

    /// Inspect reviews
    Review {
        #[command(subcommand)]
        action: ReviewCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a user (admin only)
    Add {
        username: String,

        /// admin, assessor or reviewer
        #[arg(short, long)]
        role: String,

        #[arg(long, default_value = "")]
        full_name: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        department: String,
    },

    /// List users (admin only)
    List,
}

#[derive(Subcommand, Debug)]
pub enum AssessmentCommand {
    /// List assessments visible to the acting user
    List,

    /// Show the report for one assessment
    Show { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum ReviewCommand {
    /// Show the checklist report for one review
    Show { id: u64 },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), SsbjError> {
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    let json_mode = cli.json_mode;
    let user = cli.as_user.as_str();

    if cli.verbose {
        tracing::info!(database = %config.database.display(), user, "Resolved configuration");
    }

    match cli.command {
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            cmd_server(config).await
        }
        Some(Commands::Init { force }) => cmd_init(&config.database, force),
        Some(Commands::Compact) => cmd_compact(&config.database, user),
        Some(Commands::Catalog) => cmd_catalog(json_mode),
        Some(Commands::User { action }) => match action {
            UserCommand::Add {
                username,
                role,
                full_name,
                email,
                department,
            } => cmd_user_add(
                &config.database,
                user,
                json_mode,
                &username,
                &role,
                &full_name,
                &email,
                &department,
            ),
            UserCommand::List => cmd_user_list(&config.database, user, json_mode),
        },
        Some(Commands::Assessment { action }) => match action {
            AssessmentCommand::List => cmd_assessment_list(&config.database, user, json_mode),
            AssessmentCommand::Show { id } => {
                cmd_assessment_show(&config.database, user, json_mode, id)
            }
        },
        Some(Commands::Review {
            action: ReviewCommand::Show { id },
        }) => cmd_review_show(&config.database, user, json_mode, id),
        Some(Commands::Dashboard) | None => cmd_dashboard(&config.database, user, json_mode),
    }
}
