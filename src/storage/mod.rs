//! Storage subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/submit-final-report
//!     → reports.rs save (latest row per object name, plus history)
//!
//! GET /api/reports, /api/get-timestamps, /api/get-report-details
//!     → reports.rs reads
//! ```

pub mod reports;

pub use reports::{ReportRecord, ReportStore, ReportSubmission, StorageError};
