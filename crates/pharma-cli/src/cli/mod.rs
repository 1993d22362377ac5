//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use pharma_core::api::BackendClient;
use pharma_core::auth::{FileSessionStore, IdentityProvider, Section, SessionManager};
use pharma_core::{config, logging};

mod commands;

use commands::resources::ResourceCommands;

#[derive(Parser)]
#[command(name = "pharma")]
#[command(version)]
#[command(about = "PharmaChain delivery tracking CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with username and password
    Login {
        #[arg(short, long)]
        username: String,
        /// Password (prefer the environment variable over the flag)
        #[arg(short, long, env = "PHARMA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and forget the stored session
    Logout,
    /// Show the logged-in identity
    Whoami,
    /// List the dashboard sections your roles can open
    Sections,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Administrator accounts
    Admins {
        #[command(subcommand)]
        command: ResourceCommands,
    },
    /// Sector managers
    Managers {
        #[command(subcommand)]
        command: ResourceCommands,
    },
    /// Delivery drivers
    Drivers {
        #[command(subcommand)]
        command: ResourceCommands,
    },
    /// Pharmacy clients
    Clients {
        #[command(subcommand)]
        command: ResourceCommands,
    },
    /// Delivery manifests
    Bordereaux {
        #[command(subcommand)]
        command: ResourceCommands,
    },
    /// Delivery items (by BL number)
    DeliveryItems {
        #[command(subcommand)]
        command: ResourceCommands,
    },
    /// Bordereau handovers between drivers
    Transfers {
        #[command(subcommand)]
        command: TransferCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print the built-in defaults as TOML
    Generate,
}

#[derive(clap::Subcommand)]
enum TransferCommands {
    #[command(flatten)]
    Common(ResourceCommands),
    /// Accept or reject a transfer
    Status {
        #[arg(value_name = "ID")]
        id: String,
        /// PENDING, ACCEPTED or REJECTED
        #[arg(value_name = "STATUS")]
        status: String,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "login",
            Commands::Logout => "logout",
            Commands::Whoami => "whoami",
            Commands::Sections => "sections",
            Commands::Config { .. } => "config",
            Commands::Admins { .. } => "admins",
            Commands::Managers { .. } => "managers",
            Commands::Drivers { .. } => "drivers",
            Commands::Clients { .. } => "clients",
            Commands::Bordereaux { .. } => "bordereaux",
            Commands::DeliveryItems { .. } => "delivery-items",
            Commands::Transfers { .. } => "transfers",
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config.logging).context("init logging")?;
    tracing::debug!(
        command = cli.command.name(),
        api = %config.api.base_url,
        "Dispatching command"
    );

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli.command, &config).await })
}

/// Session backed by the default session file, already restored.
fn restored_session(provider: Option<IdentityProvider>) -> SessionManager {
    let store = FileSessionStore::default_location();
    let session = match provider {
        Some(provider) => SessionManager::with_provider(store, provider),
        None => SessionManager::new(store),
    };
    session.restore();
    session
}

fn backend(config: &config::Config) -> Result<BackendClient> {
    BackendClient::from_config(&config.api, restored_session(None))
}

async fn dispatch(command: Commands, config: &config::Config) -> Result<()> {
    match command {
        Commands::Login { username, password } => {
            let settings = config.identity.resolve().context("resolve identity provider")?;
            let session = restored_session(Some(IdentityProvider::new(settings)));
            commands::auth::login(&session, &username, &password).await
        }
        Commands::Logout => {
            commands::auth::logout(&restored_session(None));
            Ok(())
        }
        Commands::Whoami => commands::auth::whoami(&restored_session(None)),
        Commands::Sections => commands::auth::sections(&restored_session(None)),

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },

        Commands::Admins { command } => {
            commands::resources::run(&backend(config)?, Section::Admins, command).await
        }
        Commands::Managers { command } => {
            commands::resources::run(&backend(config)?, Section::Managers, command).await
        }
        Commands::Drivers { command } => {
            commands::resources::run(&backend(config)?, Section::Drivers, command).await
        }
        Commands::Clients { command } => {
            commands::resources::run(&backend(config)?, Section::Clients, command).await
        }
        Commands::Bordereaux { command } => {
            commands::resources::run(&backend(config)?, Section::Bordereaux, command).await
        }
        Commands::DeliveryItems { command } => {
            commands::resources::run(&backend(config)?, Section::DeliveryItems, command).await
        }
        Commands::Transfers { command } => {
            let client = backend(config)?;
            match command {
                TransferCommands::Common(command) => {
                    commands::resources::run(&client, Section::Transfers, command).await
                }
                TransferCommands::Status { id, status } => {
                    commands::resources::transfer_status(&client, &id, &status).await
                }
            }
        }
    }
}
