//! Generation results: the rendered reports plus what went wrong.

use crate::error::{ReportError, SampleError};
use serde::{Deserialize, Serialize};

/// One serialized sample report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportArtifact {
    /// 1-based sample (report) number.
    pub sample: usize,
    /// `<drawingNumber>_REPORT_SAMPLE_<n>.docx`
    pub file_name: String,
    /// DOCX package bytes.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Real (non-padding) inspection rows.
    pub row_count: usize,
    pub duration_ms: u64,
}

impl ReportArtifact {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Aggregate numbers for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub total_reports: usize,
    pub generated_reports: usize,
    pub failed_reports: usize,
    /// Pages per report; identical for every sample.
    pub pages_per_report: usize,
    pub dimensions: usize,
    pub weld_rows: usize,
    pub gdt_rows: usize,
    pub total_bytes: u64,
    pub total_duration_ms: u64,
}

/// Output of [`crate::generate()`]. Reports are sorted by sample number.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub reports: Vec<ReportArtifact>,
    pub failures: Vec<SampleError>,
    pub stats: GenerationStats,
}

impl GenerationOutput {
    /// The report for a 1-based sample number, if it was produced.
    pub fn report(&self, sample: usize) -> Option<&ReportArtifact> {
        self.reports.iter().find(|r| r.sample == sample)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Treat any per-report failure as an error.
    pub fn into_result(self) -> Result<Self, ReportError> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(ReportError::PartialFailure {
                success: self.reports.len(),
                failed: self.failures.len(),
                total: self.stats.total_reports,
            })
        }
    }
}
