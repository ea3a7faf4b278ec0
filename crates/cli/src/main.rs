//! Agency CLI - command-line admin client for the agency REST API.
//!
//! # Usage
//!
//! ```bash
//! # Check that the backend is reachable
//! agency health
//!
//! # Log in (password from --password or AGENCY_PASSWORD)
//! agency login -u admin
//!
//! # Inspect the inbox
//! agency submissions list --status new
//! agency submissions set-status 42 reviewed
//! ```
//!
//! # Commands
//!
//! - `health` - Probe the backend
//! - `login` / `logout` / `whoami` - Manage the stored session
//! - `stats` - Dashboard counters
//! - `submissions list` / `submissions set-status` - Submissions inbox
//!
//! The session is kept in `$HOME/.agency/session.json` unless
//! `--session-file` is given.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::time::Duration;

use agency_core::SubmissionId;
use agency_web::api::{ApiClient, DEFAULT_TIMEOUT};
use agency_web::config::DEFAULT_DEV_API_URL;
use clap::{Parser, Subcommand};
use secrecy::SecretString;

use crate::commands::{CliError, Context};
use crate::storage::FileStorage;

mod commands;
mod storage;

#[derive(Parser)]
#[command(name = "agency")]
#[command(author, version, about = "Agency Platform admin CLI")]
struct Cli {
    /// Base URL of the agency REST API
    #[arg(long, global = true, env = "AGENCY_API_URL", default_value = DEFAULT_DEV_API_URL)]
    api_url: String,

    /// Where the session token is stored
    #[arg(long, global = true, env = "AGENCY_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "AGENCY_API_TIMEOUT_SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is reachable
    Health,
    /// Log in and store the session token
    Login {
        /// Admin username
        #[arg(short, long)]
        username: String,

        /// Admin password
        #[arg(short, long, env = "AGENCY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show dashboard statistics
    Stats,
    /// Work with the submissions inbox
    Submissions {
        #[command(subcommand)]
        action: SubmissionsAction,
    },
}

#[derive(Subcommand)]
enum SubmissionsAction {
    /// List submissions
    List {
        /// Only this status (`new`, `reviewed`, `contacted`, `archived`)
        #[arg(long)]
        status: Option<String>,

        /// Only this service slug
        #[arg(long)]
        service: Option<String>,
    },
    /// Change a submission's status and show the refreshed list
    SetStatus {
        /// Submission ID
        id: SubmissionId,

        /// New status (`new`, `reviewed`, `contacted`, `archived`)
        new_status: String,

        /// Filter the refreshed list by status
        #[arg(long)]
        status: Option<String>,

        /// Filter the refreshed list by service slug
        #[arg(long)]
        service: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agency_cli=warn,agency_web=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let timeout = cli.timeout.map_or(DEFAULT_TIMEOUT, Duration::from_secs);
    let api = ApiClient::new(&cli.api_url, timeout)?;
    let session_file = cli
        .session_file
        .or_else(FileStorage::default_path)
        .ok_or(CliError::NoSessionFile)?;
    let ctx = Context {
        api,
        storage: FileStorage::new(session_file),
    };

    match cli.command {
        Commands::Health => commands::auth::health(&ctx).await?,
        Commands::Login { username, password } => {
            commands::auth::login(&ctx, username, SecretString::from(password)).await?;
        }
        Commands::Logout => commands::auth::logout(&ctx).await?,
        Commands::Whoami => commands::auth::whoami(&ctx).await?,
        Commands::Stats => commands::submissions::stats(&ctx).await?,
        Commands::Submissions { action } => match action {
            SubmissionsAction::List { status, service } => {
                let filter =
                    commands::submissions::parse_filter(status.as_deref(), service.as_deref())?;
                commands::submissions::list(&ctx, filter).await?;
            }
            SubmissionsAction::SetStatus {
                id,
                new_status,
                status,
                service,
            } => {
                let filter =
                    commands::submissions::parse_filter(status.as_deref(), service.as_deref())?;
                commands::submissions::set_status(&ctx, id, &new_status, filter).await?;
            }
        },
    }
    Ok(())
}
