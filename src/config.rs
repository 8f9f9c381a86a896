//! Configuration types for report generation.
//!
//! Every behaviour knob lives in [`ReportConfig`], built via its
//! [`ReportConfigBuilder`]. The library never reads the process environment:
//! the CLI maps flags and `BALLOON2DOCX_*` variables onto the builder, and
//! library callers pass the same value to every call they want to behave
//! identically.

use crate::error::ReportError;
use crate::model::DEFAULT_PAGE_CAPACITY;
use crate::pipeline::classify::Classifier;
use crate::pipeline::normalize::{FillerConfig, Normalizer};
use crate::pipeline::symbols::SymbolTable;
use crate::progress::ProgressCallback;
use crate::template::ReportTemplate;
use std::fmt;

/// Configuration for classifying a drawing and rendering its reports.
///
/// Built via [`ReportConfig::builder()`] or using [`ReportConfig::default()`].
///
/// # Example
/// ```rust
/// use balloon2docx::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .page_capacity(20)
///     .acceptance_token("O.K.")
///     .report_date("1.02.2025")
///     .build()
///     .unwrap();
/// assert_eq!(config.page_capacity, 20);
/// ```
#[derive(Clone)]
pub struct ReportConfig {
    /// Inspection rows per report page. Default: 23.
    ///
    /// Every page of the inspection table is padded to exactly this many
    /// data rows so all pages print the same length.
    pub page_capacity: usize,

    /// Reports rendered in parallel on the blocking pool. Default: 3.
    pub concurrency: usize,

    /// Filler vocabulary removed during normalization.
    pub filler: FillerConfig,

    /// Ordered keyword/glyph table used by the classifier.
    pub symbols: SymbolTable,

    /// Result printed for every sample of a weld row. Default: `"OK"`.
    pub acceptance_token: String,

    /// Result printed for a GD&T row whose supplied result is blank.
    /// Default: `None` (blank stays blank).
    pub gdt_blank_result: Option<String>,

    /// Date printed in every page header. Overrides the payload's
    /// `reportDate`; when both are absent today's date is used.
    pub report_date: Option<String>,

    /// Printed texts of the report form.
    pub template: ReportTemplate,

    /// Optional progress callback, called once per report.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_capacity: DEFAULT_PAGE_CAPACITY,
            concurrency: 3,
            filler: FillerConfig::default(),
            symbols: SymbolTable::default(),
            acceptance_token: "OK".to_string(),
            gdt_blank_result: None,
            report_date: None,
            template: ReportTemplate::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("page_capacity", &self.page_capacity)
            .field("concurrency", &self.concurrency)
            .field("filler_words", &self.filler.words.len())
            .field("symbol_rules", &self.symbols.rules().len())
            .field("acceptance_token", &self.acceptance_token)
            .field("gdt_blank_result", &self.gdt_blank_result)
            .field("report_date", &self.report_date)
            .field("template", &self.template.organization_name)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ReportProgressCallback>"),
            )
            .finish()
    }
}

impl ReportConfig {
    /// Create a new builder for `ReportConfig`.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Classifier compiled from this configuration's symbol table and filler list.
    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.symbols.clone(), Normalizer::new(&self.filler))
    }
}

/// Builder for [`ReportConfig`].
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl fmt::Debug for ReportConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ReportConfigBuilder {
    pub fn page_capacity(mut self, rows: usize) -> Self {
        self.config.page_capacity = rows;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn filler(mut self, filler: FillerConfig) -> Self {
        self.config.filler = filler;
        self
    }

    pub fn symbols(mut self, table: SymbolTable) -> Self {
        self.config.symbols = table;
        self
    }

    pub fn acceptance_token(mut self, token: impl Into<String>) -> Self {
        self.config.acceptance_token = token.into();
        self
    }

    pub fn gdt_blank_result(mut self, token: impl Into<String>) -> Self {
        self.config.gdt_blank_result = Some(token.into());
        self
    }

    pub fn report_date(mut self, date: impl Into<String>) -> Self {
        self.config.report_date = Some(date.into());
        self
    }

    pub fn template(mut self, template: ReportTemplate) -> Self {
        self.config.template = template;
        self
    }

    /// Add an always-blank reviewer column with the given heading.
    pub fn reviewer_column(mut self, header: impl Into<String>) -> Self {
        self.config.template.reviewer_header = Some(header.into());
        self
    }

    pub fn show_footer(mut self, v: bool) -> Self {
        self.config.template.show_footer = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReportConfig, ReportError> {
        let c = &self.config;
        if c.page_capacity == 0 {
            return Err(ReportError::InvalidConfig(
                "Page capacity must be ≥ 1".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(ReportError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.acceptance_token.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "Acceptance token must not be blank".into(),
            ));
        }
        c.template.validate()?;
        Ok(self.config)
    }
}
