//! Hosting environment seam.
//!
//! # Responsibilities
//! - Provide the root container the application mounts into
//! - Own the document title updated after each navigation
//!
//! # Design Decisions
//! - A container is a shared text surface; views write markup, hosts decide
//!   how to show it
//! - Hosts are `Send + Sync` so the dispatcher can be shared across tasks

pub mod memory;
pub mod terminal;

use std::fmt;
use std::sync::{Arc, Mutex};

pub use memory::MemoryHost;
pub use terminal::TerminalHost;

/// Default root container selector.
pub const ROOT_SELECTOR: &str = "#app";

type Observer = Arc<dyn Fn(&str) + Send + Sync>;

/// A container views render into.
#[derive(Clone, Default)]
pub struct Surface {
    content: Arc<Mutex<String>>,
    observer: Option<Observer>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface that reports every content change.
    pub fn with_observer<F>(observer: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            content: Arc::default(),
            observer: Some(Arc::new(observer)),
        }
    }

    pub fn replace(&self, markup: String) {
        let mut content = self.content.lock().expect("surface mutex poisoned");
        *content = markup;
        if let Some(observer) = &self.observer {
            observer(&content);
        }
    }

    pub fn contents(&self) -> String {
        self.content.lock().expect("surface mutex poisoned").clone()
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("len", &self.contents().len())
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

/// The environment the application runs in.
pub trait Host: Send + Sync {
    /// Look up a mount point by selector.
    fn root_container(&self, selector: &str) -> Option<Surface>;

    /// Set the process-wide document title.
    fn set_title(&self, title: &str);

    fn title(&self) -> String;
}
