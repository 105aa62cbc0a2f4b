//! CLI module for hnetdb.
//!
//! Subcommands:
//! - `serve`: Run the HTTP API (default)
//! - `init`: Create the graph constraints

mod init;
mod serve;

use clap::{Parser, Subcommand};

/// hnetdb - HNET node registry
#[derive(Parser)]
#[command(name = "hnetdb")]
#[command(about = "REST backend for tracking HNET nodes and users")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Host address to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides configuration)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create uniqueness constraints for node names and user emails
    Init,
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Some(Command::Init) => self.run_init().await,
            Some(Command::Serve { ref host, port }) => self.run_serve(host.clone(), port).await,
            None => self.run_serve(None, None).await,
        }
    }

    /// Default tracing filter; `RUST_LOG` takes precedence.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
