use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use vyapyaar_common::observability::init_logging;
mod cli;
mod tether;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over the file)
    let cfg = tether::load_config(&cli.config)?;

    // 2) Logging from the `logging` section
    if let Some(path) = init_logging(tether::log_config(&cfg.logging))? {
        tracing::debug!(path = %path.display(), "logging to file");
    }

    match cli.command() {
        Command::Serve { bind } => tether::build_from_config(&cfg, bind)?.run().await,
        Command::Scrape { product } => {
            let outcome = tether::scrape_once(&cfg, &product).await?;
            println!("{}", serde_json::to_string(&outcome)?);
            Ok(())
        }
    }
}
