//! Cortex - Entry Point
//!
//! Thin clap front-end over the indexing engine. Exit codes: 0 success,
//! 1 generic failure, 2 cancelled, 3 configuration error.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use cortex::bootstrap::Project;
use cortex_domain::error::Error;
use cortex_infrastructure::config::ConfigLoader;
use cortex_infrastructure::logging::init_logging;
use cortex_infrastructure::watcher::FileWatcher;

const EXIT_FAILURE: u8 = 1;
const EXIT_CANCELLED: u8 = 2;
const EXIT_CONFIG: u8 = 3;

/// Command line interface for the Cortex indexing engine
#[derive(Parser, Debug)]
#[command(name = "cortex")]
#[command(about = "Cortex - incremental code indexing with per-branch stores")]
#[command(version)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Path to configuration file (defaults to <root>/cortex.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one index call over the project (incremental by default)
    Index {
        /// Print the stats as JSON
        #[arg(long)]
        json: bool,
    },
    /// Watch the project and index incrementally on change
    Watch,
    /// Prepare the store for a branch, copying from the nearest ancestor
    BranchPrepare {
        /// Branch name
        branch: String,
    },
}

/// Poll the embedding service's readiness endpoint. Failure is not fatal -
/// indexing surfaces per-file embedding errors in the stats.
async fn wait_for_embedder(project: &Project) {
    use cortex_domain::ports::providers::EmbeddingProvider;
    let embedder = project.embedder();
    if let Err(e) = embedder.wait_ready(Duration::from_secs(15)).await {
        warn!(error = %e, "embedding service not ready; files will fail until it is");
    }
}

fn exit_code_for(error: &Error) -> u8 {
    match error {
        Error::Cancelled => EXIT_CANCELLED,
        Error::Config { .. } => EXIT_CONFIG,
        _ => EXIT_FAILURE,
    }
}

async fn run(cli: Cli) -> Result<u8, Error> {
    let root = match &cli.path {
        Some(path) => path.clone(),
        None => std::env::current_dir()
            .map_err(|e| Error::io_with_source("failed to resolve current directory", e))?,
    };

    let mut loader = ConfigLoader::new();
    if let Some(config_path) = &cli.config {
        loader = loader.with_config_path(config_path);
    }
    let config = loader.load(&root)?;
    init_logging(&config.logging)?;

    let project = Project::open(&root, config)?;

    match cli.command {
        Command::Index { json } => {
            let branch = project.current_branch();
            let store_path = project.branch_synchronizer().prepare_store(&branch).await?;
            wait_for_embedder(&project).await;
            let indexer = project.indexer(&store_path)?;

            let token = CancellationToken::new();
            let cancel = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("cancellation requested");
                    cancel.cancel();
                }
            });

            let stats = indexer.index_with_cancellation(&[], &token).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!(
                    "indexed branch {branch}: +{} ~{} -{} ({} code files, {} docs, {} chunks, {} ms)",
                    stats.files_added,
                    stats.files_modified,
                    stats.files_deleted,
                    stats.code_files_processed,
                    stats.docs_processed,
                    stats.total_chunks(),
                    stats.indexing_time_ms,
                );
            }
            Ok(if stats.cancelled { EXIT_CANCELLED } else { 0 })
        }
        Command::Watch => {
            let branch = project.current_branch();
            let store_path = project.branch_synchronizer().prepare_store(&branch).await?;
            wait_for_embedder(&project).await;
            let indexer = Arc::new(project.indexer(&store_path)?);

            // Bring the store current before watching
            let stats = indexer.index(&[]).await?;
            info!(
                files_added = stats.files_added,
                files_modified = stats.files_modified,
                "initial index complete, watching for changes"
            );

            let debounce = Duration::from_millis(project.config.watch.debounce_ms);
            let mut watcher = FileWatcher::start(project.discovery()?, indexer, debounce)?;

            tokio::signal::ctrl_c()
                .await
                .map_err(|e| Error::io_with_source("failed to wait for ctrl-c", e))?;
            watcher.stop().await;
            Ok(0)
        }
        Command::BranchPrepare { branch } => {
            let store_path = project.branch_synchronizer().prepare_store(&branch).await?;
            println!("{}", store_path.display());
            Ok(0)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!(error = %e, "cortex failed");
            eprintln!("error: {e}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}
