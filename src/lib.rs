//! # balloon2docx
//!
//! Turn the balloon callouts of a technical drawing into canonical GD&T /
//! weld notation and lay them out as paginated DOCX inspection reports, one
//! per measured sample.
//!
//! ## Why this crate?
//!
//! Callouts read off a drawing arrive as free text: `"flatness 0.05 A"`,
//! `"Fillet weld a = 4"`, `"Diameter 12.5 mm"`. Inspection forms want the
//! drafting symbols (`⏥ | 0.05 | A`, `a4 ◺`, `⌀12.5`) and a fixed
//! number of rows per page. This crate does both deterministically: an
//! ordered rule table classifies each characteristic, and every report is
//! paginated and serialized the same way for the same input.
//!
//! ## Pipeline Overview
//!
//! ```text
//! JSON payload
//!  │
//!  ├─ 1. Input      file or stdin → DrawingInput
//!  ├─ 2. Classify   normalize text, match symbol rules → Dimension
//!  ├─ 3. Paginate   fixed-capacity pages (default 23 rows)
//!  ├─ 4. Assemble   one report per sample (3)
//!  ├─ 5. Layout     report → document tree
//!  └─ 6. Serialize  DOCX bytes, rendered concurrently, failures isolated
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use balloon2docx::{generate_from_json, ReportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let json = std::fs::read_to_string("drawing.json")?;
//!     let config = ReportConfig::default();
//!     let output = generate_from_json(&json, &config).await?;
//!     for report in &output.reports {
//!         std::fs::write(&report.file_name, &report.bytes)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `balloon2docx` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! balloon2docx = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod generate;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod sink;
pub mod stream;
pub mod template;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ReportConfig, ReportConfigBuilder};
pub use error::{ReportError, SampleError};
pub use generate::{
    generate, generate_from_json, generate_sync, generate_to_dir, generate_to_sink, load_drawing, prepare,
    render_report,
};
pub use model::{ClassificationKind, Dimension, DrawingData, DrawingInput, RawDimension, SAMPLE_COUNT};
pub use output::{GenerationOutput, GenerationStats, ReportArtifact};
pub use pipeline::classify::{Classification, Classifier};
pub use pipeline::normalize::{FillerConfig, Normalizer};
pub use pipeline::symbols::{SymbolCategory, SymbolFamily, SymbolRule, SymbolTable};
pub use pipeline::tsv::{to_tsv, tsv_row};
pub use progress::{NoopProgressCallback, ProgressCallback, ReportProgressCallback};
pub use sink::{DirectorySink, ReportSink};
pub use stream::{generate_stream, generate_stream_from_json, ReportStream};
pub use template::ReportTemplate;
