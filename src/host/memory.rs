//! In-memory host for embedding and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::host::{Host, Surface, ROOT_SELECTOR};

/// A title change together with what the root container showed at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleChange {
    pub title: String,
    pub root_snapshot: String,
}

/// Host that keeps containers and title changes in memory.
#[derive(Debug, Default)]
pub struct MemoryHost {
    containers: HashMap<String, Surface>,
    titles: Mutex<Vec<TitleChange>>,
}

impl MemoryHost {
    /// A host with the standard root container.
    pub fn new() -> Self {
        Self::with_containers(&[ROOT_SELECTOR])
    }

    pub fn with_containers(selectors: &[&str]) -> Self {
        Self {
            containers: selectors
                .iter()
                .map(|s| (s.to_string(), Surface::new()))
                .collect(),
            titles: Mutex::new(Vec::new()),
        }
    }

    /// A host with no containers at all.
    pub fn empty() -> Self {
        Self::with_containers(&[])
    }

    pub fn title_changes(&self) -> Vec<TitleChange> {
        self.titles.lock().expect("title mutex poisoned").clone()
    }

    /// Contents of the standard root container.
    pub fn root_contents(&self) -> String {
        self.containers
            .get(ROOT_SELECTOR)
            .map(Surface::contents)
            .unwrap_or_default()
    }
}

impl Host for MemoryHost {
    fn root_container(&self, selector: &str) -> Option<Surface> {
        self.containers.get(selector).cloned()
    }

    fn set_title(&self, title: &str) {
        let change = TitleChange {
            title: title.to_string(),
            root_snapshot: self.root_contents(),
        };
        self.titles.lock().expect("title mutex poisoned").push(change);
    }

    fn title(&self) -> String {
        self.titles
            .lock()
            .expect("title mutex poisoned")
            .last()
            .map(|c| c.title.clone())
            .unwrap_or_default()
    }
}
