//! Session history and navigation requests.
//!
//! # Responsibilities
//! - Keep a browser-like back/forward stack of visited paths
//! - Carry navigation requests from any source (shell, views) to the
//!   installed dispatcher
//!
//! # Design Decisions
//! - Push truncates forward entries
//! - Back/forward at either end are ignored, not errors
//! - The navigator is a cheap cloneable channel handle

use thiserror::Error;
use tokio::sync::mpsc;

/// A request to change the current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationRequest {
    /// Link activation or programmatic navigation.
    Push(String),
    /// Navigate without adding a history entry.
    Replace(String),
    Back,
    Forward,
}

/// The navigation loop is gone (application shut down).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("navigation handler is no longer running")]
pub struct NavigatorClosed;

/// Handle used to request navigation.
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: mpsc::UnboundedSender<NavigationRequest>,
}

impl Navigator {
    /// Create a navigator and the receiving end consumed by the navigation loop.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NavigationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn request(&self, request: NavigationRequest) -> Result<(), NavigatorClosed> {
        self.tx.send(request).map_err(|_| NavigatorClosed)
    }

    pub fn push(&self, path: impl Into<String>) -> Result<(), NavigatorClosed> {
        self.request(NavigationRequest::Push(path.into()))
    }

    pub fn replace(&self, path: impl Into<String>) -> Result<(), NavigatorClosed> {
        self.request(NavigationRequest::Replace(path.into()))
    }

    pub fn back(&self) -> Result<(), NavigatorClosed> {
        self.request(NavigationRequest::Back)
    }

    pub fn forward(&self) -> Result<(), NavigatorClosed> {
        self.request(NavigationRequest::Forward)
    }
}

/// Visited paths with a cursor on the current entry.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl SessionHistory {
    /// Start a history whose only entry is the start path.
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            entries: vec![start.into()],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.cursor]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn push(&mut self, path: impl Into<String>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(path.into());
        self.cursor += 1;
    }

    pub fn replace(&mut self, path: impl Into<String>) {
        self.entries[self.cursor] = path.into();
    }

    pub fn back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&str> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Apply a request and return the path to navigate to, if any.
    pub fn apply(&mut self, request: NavigationRequest) -> Option<String> {
        match request {
            NavigationRequest::Push(path) => {
                self.push(path);
                Some(self.current().to_string())
            }
            NavigationRequest::Replace(path) => {
                self.replace(path);
                Some(self.current().to_string())
            }
            NavigationRequest::Back => self.back().map(str::to_string),
            NavigationRequest::Forward => self.forward().map(str::to_string),
        }
    }
}
