mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use healthtrack::{DEFAULT_STORE, Database, EngineConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::app::App;

/// Interactive SQL console for the patient registry.
#[derive(Parser)]
#[command(name = "healthtrack", version, about)]
struct Args {
    /// Path of the registry store
    #[arg(long, default_value = DEFAULT_STORE)]
    database: PathBuf,

    /// Run against a throwaway in-memory store
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they do not fight the terminal UI.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = if args.memory {
        EngineConfig::new().in_memory()
    } else {
        EngineConfig::new().at_path(args.database)
    };

    let db = Database::open(config).await?;
    let mut app = App::new(db);
    app.run().await?;
    Ok(())
}
