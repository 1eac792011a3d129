//! Deeplink router CLI.
//!
//! ```text
//!   URL ──▶ classifier ──▶ dispatcher ──▶ Match { module, params }
//!                              │
//!                              └────────▶ ExternalUrl { url }
//!
//!   config file ──▶ flag watcher ──▶ Dispatcher::reload (atomic table swap)
//! ```

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use deeplink_router::config::loader::load_config;
use deeplink_router::config::watcher::FlagWatcher;
use deeplink_router::observability::{logging, metrics};
use deeplink_router::routing::PRIMARY_DOMAIN;
use deeplink_router::{Dispatcher, FeatureFlags, RouterConfig};

#[derive(Parser)]
#[command(name = "deeplink-router")]
#[command(about = "Resolve app URLs to screens or external links", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Force the new sale page regardless of config.
    #[arg(long)]
    new_sale_page: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve URLs and print one JSON result per line
    Resolve {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// List the routes for a host in priority order
    Routes {
        #[arg(long, default_value = PRIMARY_DOMAIN)]
        host: String,
    },
    /// Resolve URLs read from stdin, rebuilding tables when flags change
    Watch,
}

impl Cli {
    fn flags(&self, features: &FeatureFlags) -> FeatureFlags {
        let mut flags = features.clone();
        flags.new_sale_page |= self.new_sale_page;
        flags
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    logging::init(&config.observability.log_level);

    let dispatcher = Arc::new(Dispatcher::new(cli.flags(&config.features)));
    let map = dispatcher.warm_up()?;

    match &cli.command {
        Commands::Resolve { urls } => {
            for url in urls {
                println!("{}", serde_json::to_string(&dispatcher.dispatch(url))?);
            }
        }
        Commands::Routes { host } => match map.table_for(host) {
            Some(table) => {
                println!(
                    "{} ({} routes, new_sale_page={})",
                    table.name(),
                    table.len(),
                    map.flags().new_sale_page
                );
                for (priority, entry) in table.entries().iter().enumerate() {
                    let mapped = if entry.has_mapper() { " (mapped)" } else { "" };
                    println!(
                        "{:>4}  {:<60} {}{}",
                        priority + 1,
                        entry.pattern(),
                        entry.module(),
                        mapped
                    );
                }
            }
            None => {
                eprintln!(
                    "{host} is not a recognized domain; known hosts: {}",
                    map.hosts().join(", ")
                );
            }
        },
        Commands::Watch => watch(&cli, &config, dispatcher).await?,
    }

    Ok(())
}

async fn watch(
    cli: &Cli,
    config: &RouterConfig,
    dispatcher: Arc<Dispatcher>,
) -> Result<(), Box<dyn Error>> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // Keep the watcher alive for the duration of the loop.
    let (_watcher, mut updates) = match &cli.config {
        Some(path) => {
            let (watcher, rx) = FlagWatcher::new(path, config.features.clone());
            (Some(watcher.run()?), rx)
        }
        None => {
            let (_tx, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tracing::info!("Reading URLs from stdin");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let url = line.trim();
                if url.is_empty() {
                    continue;
                }
                println!("{}", serde_json::to_string(&dispatcher.dispatch(url))?);
            }
            Some(new_flags) = updates.recv() => {
                if let Err(e) = dispatcher.reload(cli.flags(&new_flags)) {
                    tracing::error!(error = %e, "Reload rejected, keeping current route tables");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    Ok(())
}
