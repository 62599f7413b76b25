//! # sitechat CLI
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sitechat serve` | Start the HTTP server |
//! | `sitechat sync <site-url>` | One-shot content sync, printed to stdout |
//!
//! Both commands accept `--config <path>` pointing to a TOML file; without it
//! the built-in defaults apply. `PORT` overrides the listening port.
//!
//! ```bash
//! # Run the server on port 8080
//! PORT=8080 sitechat serve
//!
//! # Smoke-test a customer site before embedding the widget
//! sitechat sync https://example.com --domain example.com
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sitechat::config::Config;
use sitechat::sitekey::resolve_site_key;
use sitechat::state::AppState;
use sitechat::{server, sync, urls};

/// Website chat-assistant backend with WordPress content sync and keyword
/// retrieval.
#[derive(Parser)]
#[command(name = "sitechat", about = "Website chat-assistant backend", version)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server.
    Serve,
    /// Fetch and index one site's content, then print the outcome.
    Sync {
        /// Base URL of the site, e.g. https://example.com
        site_url: String,
        /// Site identifier used for the index key when no domain is given.
        #[arg(long)]
        site_id: Option<String>,
        /// Domain used for the index key.
        #[arg(long)]
        domain: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let state = AppState::new(config)?;

    match cli.command {
        Command::Serve => server::run_server(state).await,
        Command::Sync {
            site_url,
            site_id,
            domain,
        } => {
            let base = match urls::normalize_base(&site_url) {
                Some(b) => b,
                None => {
                    eprintln!("Not an absolute http(s) URL: {}", site_url);
                    std::process::exit(1);
                }
            };
            let site_key = resolve_site_key(domain.as_deref(), site_id.as_deref());
            match sync::sync_site(&state, &base, &site_key).await {
                Ok(outcome) => {
                    println!(
                        "ok: {} documents indexed for {} at {}",
                        outcome.count, outcome.site_key, outcome.updated_at
                    );
                    Ok(())
                }
                Err(err) => {
                    eprintln!("sync failed: {}", err);
                    std::process::exit(1);
                }
            }
        }
    }
}
