//! Application startup.
//!
//! # Responsibilities
//! - Find the root container (fatal when missing)
//! - Build the production route table (fatal on a bad table)
//! - Install the dispatcher behind the navigator
//! - Perform the initial navigation
//! - Run the navigation loop until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned before the loop starts
//! - Each request from the navigator is dispatched on its own task so a
//!   slow load can be superseded by the next request
//! - The navigation ticket is taken in the loop, in arrival order, so the
//!   newest request wins on any runtime flavor

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::ShellConfig;
use crate::host::Host;
use crate::routing::{
    table, Dispatcher, NavigationOutcome, NavigationRequest, NavigationState, Navigator,
    RegistryError, SessionHistory, StateReceiver,
};
use crate::views::{ViewLoader, ViewMountError};

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("root container '{0}' not found")]
    MissingRoot(String),

    #[error("invalid route table: {0}")]
    RouteTable(#[from] RegistryError),

    #[error("initial navigation failed: {0}")]
    InitialMount(#[from] ViewMountError),
}

/// A started application.
#[derive(Debug)]
pub struct App {
    dispatcher: Arc<Dispatcher>,
    navigator: Navigator,
    initial: NavigationOutcome,
    task: JoinHandle<()>,
}

impl App {
    /// Handle for history, link and programmatic navigation.
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn subscribe(&self) -> StateReceiver {
        self.dispatcher.subscribe()
    }

    pub fn state(&self) -> NavigationState {
        self.dispatcher.state()
    }

    /// Outcome of the startup navigation.
    pub fn initial(&self) -> &NavigationOutcome {
        &self.initial
    }

    /// Wait for the navigation loop to stop.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Navigation loop panicked");
        }
    }
}

/// Start the application inside `host`.
pub async fn bootstrap(
    config: &ShellConfig,
    host: Arc<dyn Host>,
    loader: Arc<dyn ViewLoader>,
    shutdown: broadcast::Receiver<()>,
) -> Result<App, StartupError> {
    let root = host
        .root_container(&config.root_selector)
        .ok_or_else(|| StartupError::MissingRoot(config.root_selector.clone()))?;

    let registry = table::production()?;
    for (a, b) in registry.ambiguities() {
        tracing::warn!(first = %a, second = %b, "Overlapping routes, first registered wins");
    }
    tracing::info!(routes = registry.len(), fallback = %registry.fallback(), "Route table built");

    let (navigator, requests) = Navigator::channel();
    let dispatcher = Arc::new(
        Dispatcher::new(Arc::new(registry), loader, host, root, navigator.clone())
            .with_default_title(config.default_title.clone()),
    );

    let initial = dispatcher.navigate(&config.start_path).await?;
    tracing::info!(path = %config.start_path, "Application mounted");

    let history = SessionHistory::new(config.start_path.clone());
    let task = tokio::spawn(navigation_loop(
        dispatcher.clone(),
        history,
        requests,
        shutdown,
    ));

    Ok(App {
        dispatcher,
        navigator,
        initial,
        task,
    })
}

async fn navigation_loop(
    dispatcher: Arc<Dispatcher>,
    mut history: SessionHistory,
    mut requests: mpsc::UnboundedReceiver<NavigationRequest>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            request = requests.recv() => {
                let Some(request) = request else { break };
                let Some(path) = history.apply(request.clone()) else {
                    tracing::debug!(request = ?request, "Nothing to navigate to");
                    continue;
                };

                // Reserve before spawning: spawned tasks may start in any order
                let ticket = dispatcher.begin();
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    if let Err(e) = dispatcher.complete(ticket, &path).await {
                        tracing::error!(path = %path, error = %e, "Navigation failed");
                    }
                });
            }
            _ = shutdown.recv() => {
                tracing::info!("Navigation loop stopping");
                break;
            }
        }
    }
}
