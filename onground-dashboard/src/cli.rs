//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Terminal dashboard for the OnGround multi-agent field operations workflow
#[derive(Parser, Debug, Clone)]
#[command(name = "onground-dashboard")]
#[command(about = "Terminal dashboard for the OnGround multi-agent workflow")]
#[command(version)]
pub struct Args {
    /// Path to a YAML config file
    ///
    /// Defaults to config.yaml in the platform config directory, when present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding config and ONGROUND_BASE_URL
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the interactive terminal dashboard (default)
    Tui,

    /// Load the dashboard, send one chat message and print what happened
    Send {
        /// Message for the agent
        message: String,

        /// Give up waiting after this many seconds
        #[arg(long, value_name = "SECS", default_value_t = 120)]
        timeout_secs: u64,
    },
}

impl Args {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Tui)
    }
}
