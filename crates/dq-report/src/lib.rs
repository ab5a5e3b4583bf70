//! Artifact persistence for data-quality runs.
//!
//! The store owns three per-source documents: the registered check suite,
//! the latest validation result per check, and a rendered HTML docs page.
//! All of them are idempotent by check name: re-running a check replaces
//! its entries rather than appending.

mod docs;
mod store;

pub use store::{RecordedOutcome, ReportStore, Suite, ValidationLog};
