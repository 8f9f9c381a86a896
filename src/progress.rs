//! Progress-callback trait for per-report generation events.
//!
//! Inject an [`Arc<dyn ReportProgressCallback>`] via
//! [`crate::config::ReportConfigBuilder::progress_callback`] to receive
//! events as each sample report is rendered.
//!
//! # Example
//!
//! ```rust
//! use balloon2docx::{ReportConfig, ReportProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ReportProgressCallback for CountingCallback {
//!     fn on_report_complete(&self, sample: usize, total: usize, bytes: usize, pages: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Report {}/{} done ({} pages, {} bytes)", sample, total, pages, bytes);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ReportConfig::builder()
//!     .progress_callback(counter as Arc<dyn ReportProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the generator as it renders each sample report.
///
/// Reports render concurrently, so `on_report_start`, `on_report_complete`
/// and `on_report_error` may be called from different threads at once.
/// All methods default to no-ops.
pub trait ReportProgressCallback: Send + Sync {
    /// Called once before any report is rendered.
    ///
    /// # Arguments
    /// * `total_reports`: number of sample reports that will be produced
    fn on_generation_start(&self, total_reports: usize) {
        let _ = total_reports;
    }

    /// Called just before a report is laid out.
    ///
    /// # Arguments
    /// * `sample`: 1-based sample (report) number
    /// * `total`: total reports
    fn on_report_start(&self, sample: usize, total: usize) {
        let _ = (sample, total);
    }

    /// Called when a report has been serialized.
    ///
    /// # Arguments
    /// * `sample`: 1-based sample number
    /// * `total`: total reports
    /// * `bytes`: size of the DOCX byte stream
    /// * `pages`: pages in the report
    fn on_report_complete(&self, sample: usize, total: usize, bytes: usize, pages: usize) {
        let _ = (sample, total, bytes, pages);
    }

    /// Called when a report fails.
    ///
    /// # Arguments
    /// * `sample`: 1-based sample number
    /// * `total`: total reports
    /// * `error`: human-readable error description
    fn on_report_error(&self, sample: usize, total: usize, error: &str) {
        let _ = (sample, total, error);
    }

    /// Called once after every report has been attempted.
    ///
    /// # Arguments
    /// * `total`: total reports
    /// * `success_count`: reports produced without error
    fn on_generation_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl ReportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReportConfig`].
pub type ProgressCallback = Arc<dyn ReportProgressCallback>;
