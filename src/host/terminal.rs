//! Terminal host for the interactive shell.

use std::sync::Mutex;

use crate::host::{Host, Surface, ROOT_SELECTOR};

/// Prints the root container whenever it changes and the title as a banner.
#[derive(Debug)]
pub struct TerminalHost {
    root: Surface,
    title: Mutex<String>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self {
            root: Surface::with_observer(|markup| {
                if !markup.is_empty() {
                    println!("{}", markup);
                }
            }),
            title: Mutex::new(String::new()),
        }
    }
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for TerminalHost {
    fn root_container(&self, selector: &str) -> Option<Surface> {
        (selector == ROOT_SELECTOR).then(|| self.root.clone())
    }

    fn set_title(&self, title: &str) {
        println!("== {} ==", title);
        *self.title.lock().expect("title mutex poisoned") = title.to_string();
    }

    fn title(&self) -> String {
        self.title.lock().expect("title mutex poisoned").clone()
    }
}
