//! Streaming generation API: emit reports as they complete.
//!
//! Unlike the eager [`crate::generate::generate`], which returns only after
//! every sample is rendered, [`generate_stream`] yields each
//! [`ReportArtifact`] as soon as its serialization finishes. Reports render
//! concurrently, so they may arrive out of sample order (sort by `sample`
//! if order matters).

use crate::config::ReportConfig;
use crate::error::{ReportError, SampleError};
use crate::generate::{prepare, render_task};
use crate::model::{DrawingData, SAMPLE_COUNT};
use crate::output::ReportArtifact;
use crate::pipeline::input;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of report results.
pub type ReportStream = Pin<Box<dyn Stream<Item = Result<ReportArtifact, SampleError>> + Send>>;

/// Render the sample reports of a classified drawing, streaming each one.
///
/// The stream owns a copy of the drawing and the config, so it can outlive
/// both arguments.
pub fn generate_stream(drawing: &DrawingData, config: &ReportConfig) -> ReportStream {
    info!(
        "Starting streaming generation: {} ({} dimensions)",
        drawing.drawing_number,
        drawing.dimensions.len()
    );

    let shared = Arc::new(drawing.clone());
    let cfg = config.clone();
    let concurrency = config.concurrency.max(1);

    let s = stream::iter(1..=SAMPLE_COUNT)
        .map(move |sample| render_task(Arc::clone(&shared), sample, cfg.clone(), None))
        .buffer_unordered(concurrency);

    Box::pin(s)
}

/// Parse and classify a JSON payload, then stream its reports.
///
/// # Returns
/// - `Ok(ReportStream)`: a stream of `Result<ReportArtifact, SampleError>`
/// - `Err(ReportError)`: the payload was malformed
pub fn generate_stream_from_json(json: &str, config: &ReportConfig) -> Result<ReportStream, ReportError> {
    let drawing = prepare(&input::parse_drawing_json(json)?, config)?;
    Ok(generate_stream(&drawing, config))
}
