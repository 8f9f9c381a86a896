//! Eager generation entry points: render every sample report, then return.
//!
//! Use [`crate::stream::generate_stream`] instead to receive each report as
//! soon as it is serialized.
//!
//! Reports are independent: they share a read-only [`DrawingData`] and each
//! owns its layout, so they render in parallel on the blocking pool. A
//! failure in one report is recorded in [`GenerationOutput::failures`] and
//! never affects the others.

use crate::config::ReportConfig;
use crate::error::{ReportError, SampleError};
use crate::model::{DrawingData, DrawingInput, SAMPLE_COUNT};
use crate::output::{GenerationOutput, GenerationStats, ReportArtifact};
use crate::pipeline::{assemble, docx, input, layout, paginate, record};
use crate::sink::{DirectorySink, ReportSink};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Render one sample report (1-based `sample`) to DOCX bytes.
///
/// Synchronous and CPU-bound. The async entry points call it from
/// `spawn_blocking`.
pub fn render_report(
    drawing: &DrawingData,
    sample: usize,
    config: &ReportConfig,
) -> Result<ReportArtifact, SampleError> {
    let start = Instant::now();
    let index = sample
        .checked_sub(1)
        .filter(|i| *i < SAMPLE_COUNT)
        .ok_or_else(|| SampleError::TaskFailed {
            sample,
            detail: format!("no such sample; reports are numbered 1..={SAMPLE_COUNT}"),
        })?;

    let report = assemble::assemble(drawing, index, config.page_capacity);
    let document = layout::layout_report(&report, config);
    let bytes = docx::to_docx(&document).map_err(|e| SampleError::SerializationFailed {
        sample,
        detail: e.to_string(),
    })?;

    let artifact = ReportArtifact {
        sample,
        file_name: report.file_name(),
        page_count: report.page_count(),
        row_count: report.row_count(),
        bytes,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    debug!(
        "Rendered {} ({} pages, {} bytes)",
        artifact.file_name,
        artifact.page_count,
        artifact.bytes.len()
    );
    Ok(artifact)
}

/// Render all sample reports for a classified drawing.
///
/// # Returns
/// `Ok(GenerationOutput)` as long as at least one report succeeded; check
/// `output.failures` (or call [`GenerationOutput::into_result`]).
///
/// # Errors
/// [`ReportError::AllReportsFailed`] when no report could be produced.
pub async fn generate(
    drawing: &DrawingData,
    config: &ReportConfig,
) -> Result<GenerationOutput, ReportError> {
    run(drawing, config, None).await
}

/// Render all reports and hand each one to `sink` as it completes.
///
/// A sink error fails that report with [`SampleError::WriteFailed`].
pub async fn generate_to_sink(
    drawing: &DrawingData,
    sink: Arc<dyn ReportSink>,
    config: &ReportConfig,
) -> Result<GenerationOutput, ReportError> {
    run(drawing, config, Some(sink)).await
}

/// Render all reports into `dir`, creating it if needed.
///
/// Each file is written atomically (temp file + rename), so a reader never
/// sees a half-written report.
pub async fn generate_to_dir(
    drawing: &DrawingData,
    dir: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<GenerationOutput, ReportError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ReportError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
    let sink: Arc<dyn ReportSink> = Arc::new(DirectorySink::new(dir));
    generate_to_sink(drawing, sink, config).await
}

/// Parse an upstream JSON payload, classify it, and render the reports.
pub async fn generate_from_json(
    json: &str,
    config: &ReportConfig,
) -> Result<GenerationOutput, ReportError> {
    let drawing = prepare(&input::parse_drawing_json(json)?, config)?;
    generate(&drawing, config).await
}

/// Read a payload from a path (or `-` for stdin) and classify it.
pub async fn load_drawing(
    input_str: impl AsRef<str>,
    config: &ReportConfig,
) -> Result<DrawingData, ReportError> {
    let text = input::read_input_async(input_str.as_ref()).await?;
    prepare(&input::parse_drawing_json(&text)?, config)
}

/// Classify a parsed payload. Does not render anything.
pub fn prepare(input: &DrawingInput, config: &ReportConfig) -> Result<DrawingData, ReportError> {
    let drawing = record::build_drawing(input, config)?;
    info!(
        "Classified drawing {}: {} dimensions",
        drawing.drawing_number,
        drawing.dimensions.len()
    );
    Ok(drawing)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    drawing: &DrawingData,
    config: &ReportConfig,
) -> Result<GenerationOutput, ReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(drawing, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run(
    drawing: &DrawingData,
    config: &ReportConfig,
    sink: Option<Arc<dyn ReportSink>>,
) -> Result<GenerationOutput, ReportError> {
    let total_start = Instant::now();
    let pages_per_report = paginate::page_count(drawing.dimensions.len(), config.page_capacity);
    info!(
        "Generating {} reports for drawing {} ({} dimensions, {} pages each)",
        SAMPLE_COUNT,
        drawing.drawing_number,
        drawing.dimensions.len(),
        pages_per_report
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_start(SAMPLE_COUNT);
    }

    let shared = Arc::new(drawing.clone());
    let results: Vec<Result<ReportArtifact, SampleError>> =
        stream::iter((1..=SAMPLE_COUNT).map(|sample| {
            render_task(Arc::clone(&shared), sample, config.clone(), sink.clone())
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    let mut reports = Vec::with_capacity(SAMPLE_COUNT);
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(artifact) => reports.push(artifact),
            Err(e) => failures.push(e),
        }
    }
    reports.sort_by_key(|r| r.sample);
    failures.sort_by_key(|e| e.sample());

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(SAMPLE_COUNT, reports.len());
    }

    if reports.is_empty() {
        let first_error = failures
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(ReportError::AllReportsFailed {
            total: SAMPLE_COUNT,
            first_error,
        });
    }

    let stats = GenerationStats {
        total_reports: SAMPLE_COUNT,
        generated_reports: reports.len(),
        failed_reports: failures.len(),
        pages_per_report,
        dimensions: drawing.dimensions.len(),
        weld_rows: drawing.dimensions.iter().filter(|d| d.is_weld).count(),
        gdt_rows: drawing.dimensions.iter().filter(|d| d.is_gdt).count(),
        total_bytes: reports.iter().map(|r| r.bytes.len() as u64).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Generation complete: {}/{} reports, {}ms total",
        stats.generated_reports, stats.total_reports, stats.total_duration_ms
    );

    Ok(GenerationOutput {
        reports,
        failures,
        stats,
    })
}

/// Render one report on the blocking pool, deliver it to the sink, and fire
/// the per-report progress events.
pub(crate) fn render_task(
    drawing: Arc<DrawingData>,
    sample: usize,
    config: ReportConfig,
    sink: Option<Arc<dyn ReportSink>>,
) -> impl Future<Output = Result<ReportArtifact, SampleError>> + Send {
    async move {
        let callback = config.progress_callback.clone();
        if let Some(ref cb) = callback {
            cb.on_report_start(sample, SAMPLE_COUNT);
        }

        let result = tokio::task::spawn_blocking(move || -> Result<ReportArtifact, SampleError> {
            let artifact = render_report(&drawing, sample, &config)?;
            if let Some(sink) = sink {
                sink.write(&artifact).map_err(|e| SampleError::WriteFailed {
                    sample,
                    detail: e.to_string(),
                })?;
            }
            Ok(artifact)
        })
        .await
        .unwrap_or_else(|e| {
            Err(SampleError::TaskFailed {
                sample,
                detail: e.to_string(),
            })
        });

        match &result {
            Ok(artifact) => {
                if let Some(ref cb) = callback {
                    cb.on_report_complete(sample, SAMPLE_COUNT, artifact.bytes.len(), artifact.page_count);
                }
            }
            Err(e) => {
                warn!("{}", e);
                if let Some(ref cb) = callback {
                    cb.on_report_error(sample, SAMPLE_COUNT, &e.to_string());
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawDimension;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn drawing(count: usize) -> DrawingData {
        let input = DrawingInput {
            drawing_number: "D-100".into(),
            part_name: "Bracket".into(),
            report_date: Some("1.02.2025".into()),
            dimensions: (1..=count)
                .map(|i| {
                    RawDimension::new(i.to_string(), format!("{i}.5 ±0.1"))
                        .with_results(["a", "b", "c"])
                })
                .collect(),
        };
        record::build_drawing(&input, &ReportConfig::default()).unwrap()
    }

    #[test]
    fn test_render_report_single_page() {
        let artifact = render_report(&drawing(3), 2, &ReportConfig::default()).unwrap();
        assert_eq!(artifact.sample, 2);
        assert_eq!(artifact.file_name, "D-100_REPORT_SAMPLE_2.docx");
        assert_eq!(artifact.page_count, 1);
        assert_eq!(artifact.row_count, 3);
        assert!(artifact.bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_render_report_rejects_unknown_sample() {
        let d = drawing(1);
        let config = ReportConfig::default();
        assert!(matches!(render_report(&d, 0, &config), Err(SampleError::TaskFailed { sample: 0, .. })));
        assert!(render_report(&d, 4, &config).is_err());
    }

    #[tokio::test]
    async fn test_generate_three_reports_in_order() {
        let out = generate(&drawing(30), &ReportConfig::default()).await.unwrap();
        let samples: Vec<usize> = out.reports.iter().map(|r| r.sample).collect();
        assert_eq!(samples, vec![1, 2, 3]);
        assert!(out.failures.is_empty());
        assert_eq!(out.stats.pages_per_report, 2);
        assert_eq!(out.stats.generated_reports, 3);
        assert!(out.reports.iter().all(|r| r.page_count == 2 && r.row_count == 30));
    }

    #[tokio::test]
    async fn test_generate_is_deterministic() {
        let d = drawing(5);
        let config = ReportConfig::default();
        let a = generate(&d, &config).await.unwrap();
        let b = generate(&d, &config).await.unwrap();
        for (x, y) in a.reports.iter().zip(&b.reports) {
            assert_eq!(x.bytes, y.bytes);
        }
    }

    #[tokio::test]
    async fn test_sink_failure_is_isolated() {
        let sink: Arc<dyn ReportSink> = Arc::new(|a: &ReportArtifact| -> std::io::Result<()> {
            if a.sample == 2 {
                Err(std::io::Error::other("disk full"))
            } else {
                Ok(())
            }
        });
        let out = generate_to_sink(&drawing(2), sink, &ReportConfig::default()).await.unwrap();
        assert_eq!(out.reports.len(), 2);
        assert_eq!(out.failures.len(), 1);
        assert!(matches!(&out.failures[0], SampleError::WriteFailed { sample: 2, detail } if detail.contains("disk full")));
    }

    #[tokio::test]
    async fn test_all_reports_failed() {
        let sink: Arc<dyn ReportSink> =
            Arc::new(|_: &ReportArtifact| -> std::io::Result<()> { Err(std::io::Error::other("read-only")) });
        let err = generate_to_sink(&drawing(1), sink, &ReportConfig::default())
            .await
            .unwrap_err();
        match err {
            ReportError::AllReportsFailed { total, first_error } => {
                assert_eq!(total, 3);
                assert!(first_error.contains("Sample 1"), "{first_error}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_progress_events() {
        #[derive(Default)]
        struct Counter {
            started: AtomicUsize,
            completed: AtomicUsize,
            finished_with: AtomicUsize,
        }
        impl crate::progress::ReportProgressCallback for Counter {
            fn on_report_start(&self, _: usize, _: usize) {
                self.started.fetch_add(1, Ordering::SeqCst);
            }
            fn on_report_complete(&self, _: usize, _: usize, _: usize, _: usize) {
                self.completed.fetch_add(1, Ordering::SeqCst);
            }
            fn on_generation_complete(&self, _: usize, success: usize) {
                self.finished_with.store(success, Ordering::SeqCst);
            }
        }

        let counter = Arc::new(Counter::default());
        let config = ReportConfig::builder()
            .progress_callback(counter.clone())
            .build()
            .unwrap();
        generate(&drawing(1), &config).await.unwrap();
        assert_eq!(counter.started.load(Ordering::SeqCst), 3);
        assert_eq!(counter.completed.load(Ordering::SeqCst), 3);
        assert_eq!(counter.finished_with.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_generate_from_json_malformed() {
        let err = generate_from_json(r#"{"partName": "x"}"#, &ReportConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::MalformedInput { .. }));
    }

    #[test]
    fn test_generate_sync() {
        let out = generate_sync(&drawing(1), &ReportConfig::default()).unwrap();
        assert_eq!(out.reports.len(), 3);
    }
}
