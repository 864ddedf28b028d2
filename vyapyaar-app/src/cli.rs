use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vyapyaar")]
#[command(version, about = "Price range lookups for Meesho product searches")]
pub struct Cli {
    /// Configuration file; a missing file falls back to defaults
    #[arg(long, global = true, env = "VYAPYAAR_CONFIG", default_value = "vyapyaar.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve {
        /// Overrides `server.bind`
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Look up one product and print the JSON result
    Scrape { product: String },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Serve { bind: None })
    }
}
