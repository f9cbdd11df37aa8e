//! Navigation dispatch.
//!
//! # Responsibilities
//! - Resolve a path against the registry (fallback view on no match)
//! - Load the target view, then swap it into the root container
//! - Publish the new NavigationState
//! - Run the title hook after the view is mounted
//!
//! # Design Decisions
//! - Every navigation holds a ticket; only the newest ticket may mount, so a
//!   load that resolves after a later navigation started is discarded
//! - Tickets can be reserved with `begin` ahead of `complete`, so callers
//!   that spawn navigations keep arrival order
//! - State is written only after the winning mount, never speculatively
//! - Render failures propagate to the caller and leave the previous view and
//!   state untouched
//! - The swap, state update and title hook run under one lock, with no
//!   awaits in between

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::host::{Host, Surface};
use crate::observability::metrics;
use crate::routing::history::Navigator;
use crate::routing::matcher::{match_path, Params};
use crate::routing::pattern::Location;
use crate::routing::registry::ViewRegistry;
use crate::routing::state::{self, NavigationState, StateReceiver};
use crate::views::{View, ViewContext, ViewId, ViewLoader, ViewMountError};

/// Title used when the resolved route has none.
pub const DEFAULT_TITLE: &str = "LLM审核答疑测试";

/// Result of a single `navigate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The view was mounted and state published.
    Mounted {
        view_id: ViewId,
        title: String,
        fallback: bool,
    },
    /// A later navigation took over before this one could mount.
    Superseded { path: String },
}

/// Position of one navigation in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Resolved navigation target.
#[derive(Debug)]
struct Target {
    view_id: ViewId,
    title: Option<String>,
    params: Params,
    forward_params: bool,
    fallback: bool,
}

/// Owns the mounted view and is the only writer of NavigationState.
pub struct Dispatcher {
    registry: Arc<ViewRegistry>,
    loader: Arc<dyn ViewLoader>,
    host: Arc<dyn Host>,
    root: Surface,
    navigator: Navigator,
    default_title: String,
    latest: AtomicU64,
    mounted: Mutex<Option<Box<dyn View>>>,
    state: watch::Sender<NavigationState>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.registry.len())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ViewRegistry>,
        loader: Arc<dyn ViewLoader>,
        host: Arc<dyn Host>,
        root: Surface,
        navigator: Navigator,
    ) -> Self {
        let (state, _) = state::channel();
        Self {
            registry,
            loader,
            host,
            root,
            navigator,
            default_title: DEFAULT_TITLE.to_string(),
            latest: AtomicU64::new(0),
            mounted: Mutex::new(None),
            state,
        }
    }

    /// Override the title used for routes without one.
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> StateReceiver {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    /// Navigate to `path`.
    pub async fn navigate(&self, path: &str) -> Result<NavigationOutcome, ViewMountError> {
        let ticket = self.begin();
        self.complete(ticket, path).await
    }

    /// Reserve the next navigation slot.
    ///
    /// Tickets order navigations: of all tickets handed out, only the newest
    /// may mount. Take the ticket where requests arrive, before any
    /// task is spawned.
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Run the navigation reserved by `ticket`.
    pub async fn complete(
        &self,
        ticket: Ticket,
        path: &str,
    ) -> Result<NavigationOutcome, ViewMountError> {
        let Ticket(ticket) = ticket;
        let target = self.resolve(path);
        let location = Location::parse(path);

        tracing::debug!(
            path = %path,
            view = %target.view_id,
            fallback = target.fallback,
            ticket,
            "Navigation started"
        );

        let context = ViewContext {
            params: target.forward_params.then(|| target.params.clone()),
            query: location.query.map(str::to_string),
            navigator: self.navigator.clone(),
        };

        let view = match self.loader.load(target.view_id, context).await {
            Ok(view) => view,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "View failed to load");
                metrics::record_navigation(target.view_id, "failed");
                return Err(e);
            }
        };

        if self.is_superseded(ticket) {
            return Ok(self.superseded(path, target.view_id));
        }

        let mut mounted = self.mounted.lock().expect("dispatcher mutex poisoned");
        if self.is_superseded(ticket) {
            return Ok(self.superseded(path, target.view_id));
        }

        let markup = match view.render() {
            Ok(markup) => markup,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "View failed to mount");
                metrics::record_navigation(target.view_id, "failed");
                return Err(e);
            }
        };

        if let Some(mut previous) = mounted.take() {
            previous.unmount();
        }
        self.root.replace(markup);
        *mounted = Some(view);

        self.state.send_replace(NavigationState {
            current_path: path.to_string(),
            current_params: target.params,
            mounted_view_id: Some(target.view_id),
        });

        let title = target.title.unwrap_or_else(|| self.default_title.clone());
        self.host.set_title(&title);
        drop(mounted);

        tracing::info!(path = %path, view = %target.view_id, title = %title, "Navigated");
        metrics::record_navigation(target.view_id, if target.fallback { "fallback" } else { "matched" });

        Ok(NavigationOutcome::Mounted {
            view_id: target.view_id,
            title,
            fallback: target.fallback,
        })
    }

    fn resolve(&self, path: &str) -> Target {
        match match_path(path, self.registry.all()) {
            Ok(m) => Target {
                view_id: m.entry.view_id,
                title: m.entry.title.clone(),
                params: m.params,
                forward_params: m.entry.props_from_params,
                fallback: false,
            },
            Err(no_match) => {
                tracing::debug!(reason = %no_match, fallback = %self.registry.fallback(), "Using fallback view");
                Target {
                    view_id: self.registry.fallback(),
                    title: None,
                    params: Params::new(),
                    forward_params: false,
                    fallback: true,
                }
            }
        }
    }

    fn is_superseded(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) != ticket
    }

    fn superseded(&self, path: &str, view_id: ViewId) -> NavigationOutcome {
        tracing::debug!(path = %path, view = %view_id, "Navigation superseded, discarding loaded view");
        metrics::record_navigation(view_id, "superseded");
        NavigationOutcome::Superseded {
            path: path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, ROOT_SELECTOR};
    use crate::views::StandardViews;
    use futures_util::future::BoxFuture;
    use futures_util::FutureExt;
    use std::collections::HashMap;
    use std::time::Duration;

    fn registry() -> Arc<ViewRegistry> {
        let mut registry = ViewRegistry::new(ViewId::Upload);
        registry
            .register("/", ViewId::Home, Some("主页"), false)
            .unwrap()
            .register("/edit/:object_name", ViewId::EditReport, Some("编辑报告"), true)
            .unwrap()
            .register("/test", ViewId::Test, Some("LLM审核答疑测试"), false)
            .unwrap();
        Arc::new(registry)
    }

    fn dispatcher(loader: Arc<dyn ViewLoader>) -> (Dispatcher, Arc<MemoryHost>) {
        let host = Arc::new(MemoryHost::new());
        let root = host.root_container(ROOT_SELECTOR).unwrap();
        let (navigator, _rx) = Navigator::channel();
        let dispatcher = Dispatcher::new(registry(), loader, host.clone(), root, navigator);
        (dispatcher, host)
    }

    /// Renders its id after an optional per-view delay.
    struct SlowViews {
        delays: HashMap<ViewId, Duration>,
    }

    struct Plain(ViewId);

    impl View for Plain {
        fn id(&self) -> ViewId {
            self.0
        }

        fn render(&self) -> Result<String, ViewMountError> {
            Ok(self.0.to_string())
        }
    }

    impl ViewLoader for SlowViews {
        fn load(
            &self,
            id: ViewId,
            _context: ViewContext,
        ) -> BoxFuture<'static, Result<Box<dyn View>, ViewMountError>> {
            let delay = self.delays.get(&id).copied();
            async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(Box::new(Plain(id)) as Box<dyn View>)
            }
            .boxed()
        }
    }

    struct Broken;

    impl View for Broken {
        fn id(&self) -> ViewId {
            ViewId::Test
        }

        fn render(&self) -> Result<String, ViewMountError> {
            Err(ViewMountError::new(ViewId::Test, "boom"))
        }
    }

    struct BrokenTest;

    impl ViewLoader for BrokenTest {
        fn load(
            &self,
            id: ViewId,
            _context: ViewContext,
        ) -> BoxFuture<'static, Result<Box<dyn View>, ViewMountError>> {
            async move {
                let view: Box<dyn View> = match id {
                    ViewId::Test => Box::new(Broken),
                    other => Box::new(Plain(other)),
                };
                Ok(view)
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_navigate_mounts_and_titles() {
        let (dispatcher, host) = dispatcher(Arc::new(StandardViews::default()));

        let outcome = dispatcher.navigate("/").await.unwrap();
        assert_eq!(
            outcome,
            NavigationOutcome::Mounted {
                view_id: ViewId::Home,
                title: "主页".into(),
                fallback: false,
            }
        );
        assert_eq!(host.title(), "主页");
        assert!(host.root_contents().starts_with("主页"));

        let state = dispatcher.state();
        assert_eq!(state.current_path, "/");
        assert_eq!(state.mounted_view_id, Some(ViewId::Home));
    }

    #[tokio::test]
    async fn test_params_published_and_forwarded() {
        let (dispatcher, host) = dispatcher(Arc::new(StandardViews::default()));

        dispatcher.navigate("/edit/abc123").await.unwrap();
        let state = dispatcher.state();
        assert_eq!(state.current_params.get("object_name").map(String::as_str), Some("abc123"));
        assert!(host.root_contents().contains("录音: abc123"));
        assert_eq!(host.title(), "编辑报告");
    }

    #[tokio::test]
    async fn test_fallback_uses_default_title() {
        let (dispatcher, host) = dispatcher(Arc::new(StandardViews::default()));

        let outcome = dispatcher.navigate("/nonexistent").await.unwrap();
        assert_eq!(
            outcome,
            NavigationOutcome::Mounted {
                view_id: ViewId::Upload,
                title: DEFAULT_TITLE.into(),
                fallback: true,
            }
        );
        assert_eq!(host.title(), DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn test_title_runs_after_mount() {
        let (dispatcher, host) = dispatcher(Arc::new(StandardViews::default()));
        dispatcher.navigate("/").await.unwrap();
        dispatcher.navigate("/test").await.unwrap();

        let changes = host.title_changes();
        assert_eq!(changes.len(), 2);
        assert!(changes[0].root_snapshot.starts_with("主页"));
        assert!(changes[1].root_snapshot.starts_with("LLM审核答疑测试"));
    }

    #[tokio::test]
    async fn test_render_failure_keeps_previous_view() {
        let (dispatcher, host) = dispatcher(Arc::new(BrokenTest));
        dispatcher.navigate("/").await.unwrap();

        let err = dispatcher.navigate("/test").await.unwrap_err();
        assert_eq!(err.reason, "boom");
        assert_eq!(dispatcher.state().mounted_view_id, Some(ViewId::Home));
        assert_eq!(host.root_contents(), "home");
        assert_eq!(host.title_changes().len(), 1);
    }

    #[tokio::test]
    async fn test_later_navigation_supersedes_slow_load() {
        let loader = SlowViews {
            delays: HashMap::from([(ViewId::Test, Duration::from_millis(200))]),
        };
        let (dispatcher, host) = dispatcher(Arc::new(loader));

        let (slow, fast) = tokio::join!(dispatcher.navigate("/test"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            dispatcher.navigate("/").await
        });

        assert_eq!(
            slow.unwrap(),
            NavigationOutcome::Superseded {
                path: "/test".into()
            }
        );
        assert!(matches!(fast.unwrap(), NavigationOutcome::Mounted { view_id: ViewId::Home, .. }));
        assert_eq!(dispatcher.state().current_path, "/");
        assert_eq!(host.title(), "主页");
        assert_eq!(host.root_contents(), "home");
    }

    #[tokio::test]
    async fn test_reserved_ticket_order_beats_run_order() {
        let (dispatcher, _host) = dispatcher(Arc::new(StandardViews::default()));
        let first = dispatcher.begin();
        let second = dispatcher.begin();
        assert!(first < second);

        // The later reservation runs first; the earlier one must not overwrite it
        let outcome = dispatcher.complete(second, "/test").await.unwrap();
        assert!(matches!(outcome, NavigationOutcome::Mounted { view_id: ViewId::Test, .. }));
        let stale = dispatcher.complete(first, "/").await.unwrap();

        assert_eq!(stale, NavigationOutcome::Superseded { path: "/".into() });
        assert_eq!(dispatcher.state().current_path, "/test");
    }
}
