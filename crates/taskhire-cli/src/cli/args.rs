use crate::cli::{commands::Commands, handlers};
use crate::config::CliConfig;
use crate::error::Result;
use clap::Parser;
use clap_verbosity_flag::{OffLevel, Verbosity};
use std::path::PathBuf;

/// Taskhire CLI - hiring test tasks from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "taskhire",
    author = "Taskhire Team",
    version,
    about = "Taskhire CLI - hiring test tasks from the terminal",
    long_about = "Command-line client for the Taskhire API.

QUICK START:
  taskhire login                    # Exchange Telegram launch data for a token
  taskhire whoami                   # Show your profile
  taskhire tasks list               # List your test tasks

TASKS & PROJECTS:
  taskhire tasks create --title \"Landing page\"
  taskhire projects show <id>       # Project with client, tasks and candidates
  taskhire improve \"make a site\"    # Rewrite a task description

CONFIGURATION:
  taskhire config show              # Show effective configuration"
)]
pub struct Args {
    /// Configuration file path (default: platform config dir)
    #[arg(short, long, global = true, env = "TASKHIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<OffLevel>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Args {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let config = CliConfig::load(self.config.as_deref())?;

        match self.command {
            // Session
            Commands::Login => handlers::auth::handle_login(&config).await,
            Commands::Logout => handlers::auth::handle_logout(&config).await,
            Commands::Whoami { silent } => {
                handlers::auth::handle_whoami(&config, silent, self.json).await
            }
            Commands::User { id } => handlers::auth::handle_user(&config, &id, self.json).await,
            Commands::Profile { action } => {
                handlers::auth::handle_profile(&config, action, self.json).await
            }

            // Resources
            Commands::Tasks { action } => {
                handlers::tasks::handle_tasks(&config, action, self.json).await
            }
            Commands::Projects { action } => {
                handlers::projects::handle_projects(&config, action, self.json).await
            }

            // AI assists
            Commands::Improve { text } => {
                handlers::assist::handle_improve(&config, &text, self.json).await
            }
            Commands::Refine { answers } => {
                handlers::assist::handle_refine(&config, answers, self.json).await
            }

            Commands::Config { action } => {
                handlers::config::handle_config(&config, self.config.as_deref(), action, self.json)
            }
        }
    }
}
