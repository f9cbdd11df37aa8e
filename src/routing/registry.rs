//! View registry.
//!
//! # Responsibilities
//! - Store route entries in registration order
//! - Reject identical patterns registered twice
//! - Carry the designated fallback view for unmatched paths
//!
//! # Design Decisions
//! - Append-only; built once at startup, then shared immutably
//! - Ambiguous (non-identical) patterns are accepted here and reported by
//!   `ambiguities()` so the production table can be checked by tests

use thiserror::Error;

use crate::routing::pattern::{PatternError, RoutePattern};
use crate::views::ViewId;

/// Errors raised while building the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("pattern '{0}' is already registered")]
    DuplicatePattern(String),
}

/// A registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub pattern: RoutePattern,
    pub view_id: ViewId,
    pub title: Option<String>,
    pub props_from_params: bool,
}

/// Ordered route table.
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    entries: Vec<RouteEntry>,
    fallback: ViewId,
}

impl ViewRegistry {
    /// Create an empty registry that routes unmatched paths to `fallback`.
    pub fn new(fallback: ViewId) -> Self {
        Self {
            entries: Vec::new(),
            fallback,
        }
    }

    /// Append a route.
    pub fn register(
        &mut self,
        pattern: &str,
        view_id: ViewId,
        title: Option<&str>,
        props_from_params: bool,
    ) -> Result<&mut Self, RegistryError> {
        let pattern = RoutePattern::parse(pattern)?;
        if self.entries.iter().any(|e| e.pattern == pattern) {
            return Err(RegistryError::DuplicatePattern(pattern.to_string()));
        }

        tracing::debug!(pattern = %pattern, view = %view_id, "Route registered");
        self.entries.push(RouteEntry {
            pattern,
            view_id,
            title: title.map(str::to_string),
            props_from_params,
        });
        Ok(self)
    }

    pub fn all(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn fallback(&self) -> ViewId {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs of patterns that can match the same concrete path.
    pub fn ambiguities(&self) -> Vec<(&RoutePattern, &RoutePattern)> {
        let mut found = Vec::new();
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                if a.pattern.is_ambiguous_with(&b.pattern) {
                    found.push((&a.pattern, &b.pattern));
                }
            }
        }
        found
    }
}
