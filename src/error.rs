//! Error types for the balloon2docx library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ReportError`] is **fatal**: generation cannot proceed at all
//!   (malformed payload, missing input file, invalid configuration).
//!   Returned as `Err(ReportError)` from the top-level `generate*` functions.
//!
//! * [`SampleError`] is **non-fatal**: one sample report failed to serialize
//!   or to reach its sink, but the other reports are fine. Collected in
//!   [`crate::output::GenerationOutput::failures`] so callers keep the
//!   partial success instead of losing every report to one bad one.
//!
//! Characteristic classification and pagination never fail, so neither
//! type has a variant for them.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the balloon2docx library.
///
/// Per-report failures use [`SampleError`] and are stored in
/// [`crate::output::GenerationOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The drawing payload is missing a required field or is not valid JSON.
    #[error("Malformed drawing data: {detail}")]
    MalformedInput { detail: String },

    /// Input file was not found at the given path.
    #[error("Drawing data file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Generation errors ─────────────────────────────────────────────────
    /// Every sample report failed; there is nothing to hand back.
    #[error("All {total} sample reports failed.\nFirst error: {first_error}")]
    AllReportsFailed { total: usize, first_error: String },

    /// Some reports succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::GenerationOutput::into_result`] when
    /// the caller wants to treat any report failure as an error.
    #[error("{failed}/{total} sample reports failed during generation")]
    PartialFailure {
        success: usize,
        failed: usize,
        total: usize,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory or write a report file.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single sample report.
///
/// `sample` is always the 1-based report number printed on the form, so the
/// message can be shown to a user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum SampleError {
    /// Building the DOCX byte stream failed.
    #[error("Sample {sample}: document serialization failed: {detail}")]
    SerializationFailed { sample: usize, detail: String },

    /// The report was built but the sink refused it.
    #[error("Sample {sample}: writing the report failed: {detail}")]
    WriteFailed { sample: usize, detail: String },

    /// The background render task panicked or was cancelled.
    #[error("Sample {sample}: render task failed: {detail}")]
    TaskFailed { sample: usize, detail: String },
}

impl SampleError {
    /// 1-based sample number the error belongs to.
    pub fn sample(&self) -> usize {
        match self {
            SampleError::SerializationFailed { sample, .. }
            | SampleError::WriteFailed { sample, .. }
            | SampleError::TaskFailed { sample, .. } => *sample,
        }
    }
}
