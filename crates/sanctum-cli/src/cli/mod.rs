//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use sanctum_core::{config, interrupt, logging};

mod commands;

#[derive(Parser)]
#[command(name = "sanctum")]
#[command(version)]
#[command(about = "Terminal client for the Sanctum archive")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    #[command(flatten)]
    Backend(BackendCommands),
}

/// Commands that need the loaded config and a backend.
#[derive(clap::Subcommand)]
enum BackendCommands {
    /// Sign in with email and passphrase (passphrase read from stdin)
    Login {
        #[arg(long)]
        email: String,
    },

    /// Register a new identity (passphrase read from stdin)
    Signup {
        #[arg(long)]
        email: String,
        /// Designation shown to other operators
        #[arg(long)]
        username: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show who is signed in
    Status,

    /// Check that the backend is reachable
    Probe,

    /// Browse entities
    Entities {
        #[command(subcommand)]
        command: EntityCommands,
    },

    /// Browse the system event log
    Events {
        #[command(subcommand)]
        command: EventCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

#[derive(clap::Subcommand)]
enum EntityCommands {
    /// List entities, newest first
    List {
        /// Only entities you created
        #[arg(long)]
        mine: bool,
        /// Maximum rows (default: `ui.list_limit`)
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
}

#[derive(clap::Subcommand)]
enum EventCommands {
    /// List events, newest first
    List {
        /// Maximum rows (default: `ui.list_limit`)
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    interrupt::init()?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        // Config commands must work even when the file is broken.
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
        Some(Commands::Backend(command)) => {
            let (config, _log_guard) = startup()?;
            run_backend(command, &config).await
        }
        None => {
            let (config, _log_guard) = startup()?;
            commands::tui::run(config).await
        }
    }
}

fn startup() -> Result<(config::Config, logging::WorkerGuard)> {
    let config = config::Config::load().context("load config")?;
    let guard = logging::init(&config)?;
    Ok((config, guard))
}

async fn run_backend(command: BackendCommands, config: &config::Config) -> Result<()> {
    match command {
        BackendCommands::Login { email } => commands::auth::login(config, &email).await,
        BackendCommands::Signup { email, username } => {
            commands::auth::signup(config, &email, &username).await
        }
        BackendCommands::Logout => commands::auth::logout(config).await,
        BackendCommands::Status => commands::auth::status(config).await,
        BackendCommands::Probe => commands::probe::run(config).await,
        BackendCommands::Entities {
            command: EntityCommands::List { mine, limit },
        } => commands::data::list_entities(config, mine, limit).await,
        BackendCommands::Events {
            command: EventCommands::List { limit },
        } => commands::data::list_events(config, limit).await,
    }
}
