use std::path::PathBuf;
use std::time::Duration;

use chatpane_core::Config;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chatpane", version)]
#[command(about = "Terminal chat widget for an assistant chat server")]
pub struct Cli {
    /// Base URL of the chat server
    #[arg(short, long, env = "CHATPANE_SERVER")]
    pub server: Option<String>,

    /// Request timeout in seconds (0 disables it)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write logs here instead of the default log file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Send one message and print the reply
    Send {
        /// Message text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Clear the server-side conversation history
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Effective settings after layering CLI flags over the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub timeout: Option<Duration>,
    pub user_label: String,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        let server_url = cli
            .server
            .clone()
            .unwrap_or_else(|| config.server_url().to_string());

        let timeout = match cli.timeout {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => config.request_timeout(),
        };

        Self {
            server_url,
            timeout,
            user_label: config.user_label().to_string(),
        }
    }
}
