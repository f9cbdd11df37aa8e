//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation request (history, link, view)
//!     → history.rs (session stack, resolve back/forward to a path)
//!     → dispatcher.rs (navigate)
//!         → matcher.rs (first matching registry entry, bound params)
//!         → views (load, render into root surface)
//!         → state.rs (publish NavigationState)
//!         → host title hook
//!
//! Route table (at startup):
//!     table.rs
//!     → registry.rs (ordered entries, duplicate check)
//!     → frozen in an Arc, shared with the dispatcher
//! ```
//!
//! # Design Decisions
//! - Registration order decides; first structural match wins
//! - Unmatched paths render the fallback view, never an error page
//! - Deterministic: same path always resolves to the same entry

pub mod dispatcher;
pub mod history;
pub mod matcher;
pub mod pattern;
pub mod registry;
pub mod state;
pub mod table;

pub use dispatcher::{Dispatcher, NavigationOutcome, Ticket, DEFAULT_TITLE};
pub use history::{NavigationRequest, Navigator, SessionHistory};
pub use matcher::{match_path, NoMatch, Params, RouteMatch};
pub use pattern::{Location, RoutePattern, Segment};
pub use registry::{RegistryError, RouteEntry, ViewRegistry};
pub use state::{NavigationState, StateReceiver};
