//! Process-wide navigation state.

use serde::Serialize;
use tokio::sync::watch;

use crate::routing::matcher::Params;
use crate::views::ViewId;

/// What is mounted right now and which path produced it.
///
/// Replaced wholesale on every successful navigation, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    pub current_path: String,
    pub current_params: Params,
    pub mounted_view_id: Option<ViewId>,
}

/// Read-only subscription to [`NavigationState`] changes.
pub type StateReceiver = watch::Receiver<NavigationState>;

/// Write half, owned exclusively by the dispatcher.
pub(crate) fn channel() -> (watch::Sender<NavigationState>, StateReceiver) {
    watch::channel(NavigationState::default())
}
