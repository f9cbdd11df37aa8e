//! Route patterns and navigation locations.
//!
//! # Responsibilities
//! - Parse pattern text (`/edit/:object_name`) into typed segments
//! - Split a navigation path into the part used for matching and the
//!   query/fragment a mounted view may read separately
//!
//! # Design Decisions
//! - `/` is the zero-segment pattern
//! - One trailing slash is trimmed, nothing else is normalized
//! - Literal comparison is case-sensitive

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing pattern text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("pattern '{0}' has a parameter without a name")]
    EmptyParamName(String),

    #[error("pattern '{pattern}' binds parameter '{name}' twice")]
    DuplicateParam { pattern: String, name: String },
}

/// A single pattern segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Matches any non-empty path segment and binds it under this name.
    Param(String),
}

impl Segment {
    /// Whether both segments can match the same concrete path segment.
    pub fn overlaps(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            _ => true,
        }
    }
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse pattern text such as `/`, `/test` or `/edit/:object_name`.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let Some(rest) = text.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash(text.to_string()));
        };
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        if rest.is_empty() {
            return Ok(Self { segments: Vec::new() });
        }

        let mut segments = Vec::new();
        for raw in rest.split('/') {
            if raw.is_empty() {
                return Err(PatternError::EmptySegment(text.to_string()));
            }
            match raw.strip_prefix(':') {
                Some("") => return Err(PatternError::EmptyParamName(text.to_string())),
                Some(name) => {
                    let taken = segments
                        .iter()
                        .any(|s| matches!(s, Segment::Param(n) if n == name));
                    if taken {
                        return Err(PatternError::DuplicateParam {
                            pattern: text.to_string(),
                            name: name.to_string(),
                        });
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(raw.to_string())),
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Names of the parameters this pattern binds, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether some concrete path could match both patterns.
    pub fn is_ambiguous_with(&self, other: &RoutePattern) -> bool {
        self.len() == other.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.overlaps(b))
    }
}

impl FromStr for RoutePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => write!(f, "/{}", s)?,
                Segment::Param(name) => write!(f, "/:{}", name)?,
            }
        }
        Ok(())
    }
}

/// A navigation target split into path, query and fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl<'a> Location<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let (rest, fragment) = match raw.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (raw, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        Self { path, query, fragment }
    }

    /// Path segments used for matching.
    ///
    /// `/` yields no segments; `/edit/` yields `["edit"]`; `/edit//` yields
    /// `["edit", ""]`, which no parameter accepts.
    pub fn segments(&self) -> Vec<&'a str> {
        let path = self.path.strip_suffix('/').unwrap_or(self.path);
        let path = path.strip_prefix('/').unwrap_or(path);
        if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        }
    }
}
