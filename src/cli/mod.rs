//! Command-line interface for the scribe server.

use clap::{Parser, Subcommand};

/// Scribe - a small blogging backend
#[derive(Parser)]
#[command(name = "scribe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Write a default config.toml if none exists
    #[command(alias = "init")]
    InitConfig,

    /// Permanently delete a user and everything they wrote
    #[command(alias = "rm-user")]
    DeleteUser {
        /// Username of the account to delete
        username: String,
    },
}

impl Cli {
    #[must_use]
    pub fn command_or_default(self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}
