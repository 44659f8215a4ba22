use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use hero_ratings::api::state::AppState;
use hero_ratings::cache::{BestWindowCache, BestWindowConfig};
use hero_ratings::config::AppConfig;
use hero_ratings::ingest::ingest_file;
use hero_ratings::storage::{SnapshotStore, StorageConfig};

#[derive(Parser)]
#[command(name = "hero-ratings")]
#[command(about = "Snapshot-based rating and trend engine for game leaderboards")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error; overrides config)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Ingest raw snapshot capture files
    Ingest {
        /// Capture files (heroes_YYYY-MM-DD_HH-MM-SS.json)
        paths: Vec<PathBuf>,
    },

    /// List ingested snapshots, newest first
    ListSnapshots,

    /// Rebuild the best-gain rankings
    RebuildBest,

    /// Drop old snapshots beyond the retention limit
    Prune {
        /// How many snapshots to keep (overrides config)
        #[arg(long)]
        keep: Option<usize>,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = if cli.config.exists() {
        AppConfig::from_file(&cli.config)?
    } else {
        AppConfig::default()
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn best_window_config(config: &AppConfig) -> BestWindowConfig {
    BestWindowConfig {
        window_days: config.limits.best_window_days,
        max_gap_hours: config.limits.max_gap_hours,
        cap: config.limits.max_list_len,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let fmt_layer = if cli.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();

    tracing::info!("Starting hero-ratings v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(SnapshotStore::new(StorageConfig::new(
        config.data_dir.clone(),
    )));

    match cli.command {
        Commands::Serve { host, port } => {
            let best = Arc::new(BestWindowCache::new(
                store.clone(),
                best_window_config(&config),
            ));

            // Warm the index so the first request doesn't pay for the build.
            if let Err(e) = best.rebuild() {
                tracing::warn!("Initial best-window build failed: {}", e);
            }

            let state = AppState {
                store,
                best,
                limits: config.limits.clone(),
            };
            let app = hero_ratings::api::build_router(state);

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Ingest { paths } => {
            if paths.is_empty() {
                eprintln!("No capture files given.");
                return Ok(());
            }

            let mut ingested = 0u32;
            let mut failed = 0u32;
            for path in &paths {
                match ingest_file(&store, path) {
                    Ok(result) => {
                        println!(
                            "Ingested {} ({} heroes)",
                            result.snapshot.id, result.heroes
                        );
                        ingested += 1;
                    }
                    Err(e) => {
                        tracing::error!("Failed to ingest {:?}: {}", path, e);
                        failed += 1;
                    }
                }
            }

            println!("\n=== Ingest Results ===");
            println!("Ingested: {}", ingested);
            println!("Failed:   {}", failed);
        }
        Commands::ListSnapshots => {
            let metas = store.list()?;
            if metas.is_empty() {
                println!("No snapshots ingested yet.");
            } else {
                println!("=== Snapshots ({}) ===\n", metas.len());
                for meta in &metas {
                    println!("  {}  captured {}", meta.id, meta.captured_at);
                }
            }
        }
        Commands::RebuildBest => {
            let best = BestWindowCache::new(store, best_window_config(&config));
            let index = best.rebuild()?;

            println!("\n=== Best-Window Rebuild ===");
            match &index.built_for {
                Some(id) => println!("Built for:  {}", id),
                None => println!("Built for:  (no snapshots)"),
            }
            println!("Pairs used: {}", index.pairs_used);
            if index.insufficient_history {
                println!("(window too thin — rankings span the full history)");
            }
        }
        Commands::Prune { keep } => {
            let keep = keep.unwrap_or(config.limits.keep_snapshots);
            let removed = store.prune(keep)?;
            if removed.is_empty() {
                println!("Nothing to prune ({} kept).", keep);
            } else {
                println!("Pruned {} snapshots:", removed.len());
                for id in &removed {
                    println!("  {}", id);
                }
            }
        }
    }

    Ok(())
}
