//! Report assembly: one [`Report`] per sample, each paginated identically.
//!
//! Reports borrow the drawing; nothing is copied until layout turns rows
//! into document text.

use crate::model::{DrawingData, SAMPLE_COUNT};
use crate::pipeline::paginate::paginate;

/// A sample report ready for layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report<'a> {
    /// 1-based report (sample) number printed as "Rap. Nr".
    pub sample: usize,
    pub drawing: &'a DrawingData,
    pub pages: Vec<ReportPage<'a>>,
}

/// Everything one printed page needs, without reaching back into the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage<'a> {
    pub drawing: &'a DrawingData,
    pub sample: usize,
    /// 1-based page number.
    pub number: usize,
    pub total: usize,
    pub rows: Vec<ReportRow<'a>>,
}

/// One filled inspection row: the sample's own result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRow<'a> {
    pub balloon_id: &'a str,
    pub characteristic: &'a str,
    pub result: &'a str,
}

impl Report<'_> {
    /// `<drawingNumber>_REPORT_SAMPLE_<n>.docx`, safe on every file system.
    pub fn file_name(&self) -> String {
        report_file_name(&self.drawing.drawing_number, self.sample)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Rows with data (padding is added later, by layout).
    pub fn row_count(&self) -> usize {
        self.pages.iter().map(|p| p.rows.len()).sum()
    }
}

/// Build the report for a 0-based sample index.
pub fn assemble(drawing: &DrawingData, sample_index: usize, capacity: usize) -> Report<'_> {
    let sample = sample_index + 1;
    let pages = paginate(&drawing.dimensions, capacity)
        .into_iter()
        .map(|page| ReportPage {
            drawing,
            sample,
            number: page.number,
            total: page.total,
            rows: page
                .dimensions
                .iter()
                .map(|d| ReportRow {
                    balloon_id: &d.balloon_id,
                    characteristic: &d.normalized_characteristic,
                    result: d.result(sample_index),
                })
                .collect(),
        })
        .collect();

    Report {
        sample,
        drawing,
        pages,
    }
}

/// All [`SAMPLE_COUNT`] reports, in sample order.
pub fn assemble_all(drawing: &DrawingData, capacity: usize) -> Vec<Report<'_>> {
    (0..SAMPLE_COUNT).map(|s| assemble(drawing, s, capacity)).collect()
}

/// File name for a sample report. Characters outside `[A-Za-z0-9._-]` become
/// `_`; a blank drawing number becomes `DRAWING`.
pub fn report_file_name(drawing_number: &str, sample: usize) -> String {
    let mapped: String = drawing_number
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = mapped.trim_matches(['.', '_']);
    let stem = if stem.is_empty() { "DRAWING" } else { stem };
    format!("{stem}_REPORT_SAMPLE_{sample}.docx")
}
