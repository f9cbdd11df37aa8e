//! Route matching logic.
//!
//! # Responsibilities
//! - Match a navigation path against registry entries
//! - Bind named parameters from parameterized segments
//! - Return the first full match or an explicit no-match
//!
//! # Design Decisions
//! - Entries with a different segment count are skipped outright
//! - Literal segments are case-sensitive
//! - Parameters never bind an empty value
//! - Query and fragment never take part in matching

use std::collections::BTreeMap;
use thiserror::Error;

use crate::routing::pattern::{Location, Segment};
use crate::routing::registry::RouteEntry;

/// Parameters bound by a match, keyed by name.
pub type Params = BTreeMap<String, String>;

/// No registry entry matches the path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no route matches '{path}'")]
pub struct NoMatch {
    pub path: String,
}

/// A matched entry with its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: Params,
}

/// Find the first entry, in registration order, that matches `path`.
pub fn match_path<'a>(path: &str, entries: &'a [RouteEntry]) -> Result<RouteMatch<'a>, NoMatch> {
    let segments = Location::parse(path).segments();

    entries
        .iter()
        .filter(|entry| entry.pattern.len() == segments.len())
        .find_map(|entry| {
            bind(entry.pattern.segments(), &segments).map(|params| RouteMatch { entry, params })
        })
        .ok_or_else(|| NoMatch {
            path: path.to_string(),
        })
}

/// Compare segment by segment; `None` on the first mismatch.
fn bind(pattern: &[Segment], path: &[&str]) -> Option<Params> {
    let mut params = Params::new();
    for (segment, value) in pattern.iter().zip(path) {
        match segment {
            Segment::Literal(literal) if literal == value => {}
            Segment::Param(name) if !value.is_empty() => {
                params.insert(name.clone(), (*value).to_string());
            }
            _ => return None,
        }
    }
    Some(params)
}
