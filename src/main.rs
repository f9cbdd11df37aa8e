//! Report review
//!
//! ```text
//!   report-review shell                       report-review serve
//!  ┌──────────────────────────────┐          ┌───────────────────────────────┐
//!  │ stdin commands               │          │ axum                          │
//!  │   → Navigator                │          │   RequestId → Timeout → Trace │
//!  │   → SessionHistory           │  /query  │   rate limit (query routes)   │
//!  │   → Dispatcher               │ ───────▶ │   → handlers                  │
//!  │       → registry / matcher   │          │   → OpenAI-compatible upstream│
//!  │       → views → #app surface │          │   → SQLite report store       │
//!  │       → NavigationState      │          └───────────────────────────────┘
//!  │       → title                │
//!  └──────────────────────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;

use report_review::config::{load_or_default, AppConfig};
use report_review::host::TerminalHost;
use report_review::lifecycle::{bootstrap, Shutdown};
use report_review::observability::{logging, metrics};
use report_review::review::{ReportForm, ReviewClient};
use report_review::views::StandardViews;
use report_review::{ReportStore, ReviewServer};

#[derive(Parser)]
#[command(name = "report-review")]
#[command(about = "Report review shell and LLM review backend", long_about = None)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the review backend
    Serve {
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Run the interactive application shell
    Shell {
        /// Override the configured start path
        #[arg(short, long)]
        path: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_or_default(cli.config.as_deref())?;
    logging::init(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "report-review starting");

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(serve(config))
        }
        Commands::Shell { path } => {
            if let Some(path) = path {
                config.shell.start_path = path;
            }
            // The shell is a single cooperative event loop
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(shell(config))
        }
    }
}

fn start_metrics(config: &AppConfig) {
    if !config.observability.metrics_enabled {
        return;
    }
    match config.observability.metrics_address.parse() {
        Ok(addr) => metrics::init_metrics(addr),
        Err(_) => tracing::error!(
            metrics_address = %config.observability.metrics_address,
            "Failed to parse metrics address"
        ),
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    start_metrics(&config);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        models = config.available_models().count(),
        rate_limit_per_hour = config.limits.query_per_hour,
        "Listening for connections"
    );

    let store = ReportStore::connect(&config.storage.database_url).await?;
    let shutdown = Shutdown::new();
    let server = ReviewServer::new(&config, store.clone())?;
    server.run(listener, shutdown.subscribe()).await?;
    store.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

const SHELL_HELP: &str = "commands: <path> | back | forward | state | models | review <file> | help | quit";

async fn shell(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    start_metrics(&config);

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let host = Arc::new(TerminalHost::new());
    let loader = Arc::new(StandardViews::new(Some(config.review.model.clone())));
    let app = bootstrap(&config.shell, host, loader, shutdown.subscribe()).await?;
    let navigator = app.navigator();
    let reviewer = ReviewClient::new(&config.review)?;

    println!("{}", SHELL_HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stop = shutdown.subscribe();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = stop.recv() => break,
        };
        let Some(line) = line else { break };
        let line = line.trim();

        let sent = match line.split_once(' ').unwrap_or((line, "")) {
            ("", _) => Ok(()),
            ("quit" | "exit", _) => break,
            ("help", _) => {
                println!("{}", SHELL_HELP);
                Ok(())
            }
            ("back", _) => navigator.back(),
            ("forward", _) => navigator.forward(),
            ("state", _) => {
                println!("{}", serde_json::to_string_pretty(&app.state())?);
                Ok(())
            }
            ("models", _) => {
                match reviewer.models().await {
                    Ok(models) => println!("{}", models.join("\n")),
                    Err(e) => eprintln!("Error: {}", e),
                }
                Ok(())
            }
            ("review", file) => {
                review_file(&reviewer, Path::new(file.trim())).await;
                Ok(())
            }
            (path, _) if path.starts_with('/') => navigator.push(path),
            _ => {
                println!("{}", SHELL_HELP);
                Ok(())
            }
        };
        if let Err(e) = sent {
            tracing::error!(error = %e, "Navigation request dropped");
            break;
        }
    }

    shutdown.trigger();
    app.join().await;
    Ok(())
}

async fn review_file(reviewer: &ReviewClient, path: &Path) {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", path.display(), e);
            return;
        }
    };
    let form = ReportForm::parse(&text);

    match reviewer.review(&form.render()).await {
        Ok(verdict) => println!("{}", verdict),
        Err(e) => eprintln!("Error: {}", e),
    }
}
