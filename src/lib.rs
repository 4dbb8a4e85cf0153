//! # SevOne exporter
//!
//! Polls the SevOne REST API once and prints the latest sample of every
//! indicator as a Wavefront metric line on stdout. Recurring execution is left
//! to an external scheduler running it every `time_interval` seconds.
//!
//! ## Architecture
//!
//! - **`hierarchy`**: device → object → indicator expansion with inherited attributes
//! - **`fixed`**: detail lookups for an explicitly declared indicator list
//! - **`sample`**: the run's time window and the latest-sample query
//! - **`format`**: metric name sanitization and line rendering
//! - **`pipeline`**: the [`Exporter`] sequencing a run under the total timeout
//! - **`report`**: per-branch failure accounting

pub mod fixed;
pub mod format;
pub mod hierarchy;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod sample;

#[cfg(test)]
mod fake;

pub use logging::init_logging;
pub use pipeline::{
    Exporter,
    Plan,
};
pub use report::RunReport;
