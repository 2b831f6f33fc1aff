//! CLI command definitions and dispatch for the `tangle` binary.
//!
//! Uses clap derive macros for argument parsing. The server is the main
//! surface; the CLI covers serving, token management, and shell completions.

pub mod mode;
pub mod token;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Conversation-graph server with collaborative editing.
#[derive(Parser)]
#[command(name = "tangle", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API and WebSocket server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "7740", env = "TANGLE_PORT")]
        port: u16,

        /// Host address to bind.
        #[arg(long, default_value = "127.0.0.1", env = "TANGLE_HOST")]
        host: String,

        /// Export spans via OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Mint an API token for a user, printed once.
    InitToken {
        /// Email identifying the user. Repeated emails share one user id.
        email: String,
    },

    /// Show or change the client view mode ("chat" or "mind").
    Mode {
        /// Select a mode explicitly.
        #[arg(long, value_name = "MODE", conflicts_with = "toggle")]
        set: Option<String>,

        /// Flip to the other mode.
        #[arg(long)]
        toggle: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}
