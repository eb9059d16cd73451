//! Oldest-compatible-version search.
//!
//! - [`binary`] - Leftmost-true bisection over ordered candidates
//! - [`driver`] - Per-package driver producing [`ExperimentResult`]s
//! - [`result`] - The result record

pub mod binary;
pub mod driver;
pub mod result;

pub use binary::{find_oldest_compatible, SearchOutcome};
pub use driver::{CompatibilitySearch, NoopObserver, SearchObserver, SearchSettings};
pub use result::ExperimentResult;
