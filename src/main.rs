//! # notesmith CLI
//!
//! ```bash
//! notesmith --config ./config/notesmith.toml serve
//! notesmith check-config
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `notesmith serve` | Start the HTTP server |
//! | `notesmith check-config` | Validate and print the effective configuration |
//!
//! Log verbosity follows `RUST_LOG` (default `notesmith=info,tower_http=info`).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use notesmith::{config, server};

/// notesmith: notes with PDF-grounded chat and question generation.
#[derive(Parser)]
#[command(name = "notesmith", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional: built-in defaults apply when the file does not exist.
    #[arg(long, global = true, default_value = "./config/notesmith.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` (or `PORT`) and serves the notes, upload,
    /// chat and question endpoints.
    Serve,

    /// Validate the configuration and print it as TOML.
    ///
    /// The API key is never printed; only whether one was found.
    CheckConfig,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("notesmith=info,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // `.env` may carry RUST_LOG, so it is loaded before the subscriber.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::CheckConfig => {
            print!("{}", toml::to_string_pretty(&cfg)?);
            println!(
                "# api key ({}): {}",
                cfg.llm.api_key_env,
                if cfg.llm.api_key.is_some() { "set" } else { "not set" }
            );
        }
    }

    Ok(())
}
