//! Dimension record builder: raw payload rows → classified [`Dimension`]s.
//!
//! Rules applied per row, in order:
//!
//! 1. classify the characteristic text
//! 2. an upstream `isWeld: true` always makes the row a weld; `isGDT: true`
//!    only promotes a plain dimension, and never outranks a recognised weld
//! 3. results are trimmed, cut to [`SAMPLE_COUNT`], and back-filled by
//!    repeating the first entry (blank when none were supplied)
//! 4. weld rows print the acceptance token for every sample
//! 5. blank GD&T results optionally print `gdt_blank_result`

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::model::{ClassificationKind, Dimension, DrawingData, DrawingInput, RawDimension, SAMPLE_COUNT};
use crate::pipeline::classify::Classifier;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Result-override settings taken from [`ReportConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RecordOptions<'a> {
    pub acceptance_token: &'a str,
    pub gdt_blank_result: Option<&'a str>,
}

impl<'a> From<&'a ReportConfig> for RecordOptions<'a> {
    fn from(config: &'a ReportConfig) -> Self {
        Self {
            acceptance_token: &config.acceptance_token,
            gdt_blank_result: config.gdt_blank_result.as_deref(),
        }
    }
}

impl Default for RecordOptions<'_> {
    fn default() -> Self {
        Self {
            acceptance_token: "OK",
            gdt_blank_result: None,
        }
    }
}

/// Classify and validate a whole payload.
///
/// Fails only when the payload has no drawing number. The report date is
/// taken from the config override, then the payload, then today's date.
pub fn build_drawing(input: &DrawingInput, config: &ReportConfig) -> Result<DrawingData, ReportError> {
    let drawing_number = input.drawing_number.trim();
    if drawing_number.is_empty() {
        return Err(ReportError::MalformedInput {
            detail: "`drawingNumber` is blank".into(),
        });
    }

    let classifier = config.classifier();
    let options = RecordOptions::from(config);

    let mut seen = HashSet::with_capacity(input.dimensions.len());
    let dimensions: Vec<Dimension> = input
        .dimensions
        .iter()
        .map(|raw| {
            if !seen.insert(raw.balloon_id.trim()) {
                warn!(balloon = %raw.balloon_id, "Duplicate balloon id; keeping both rows in order");
            }
            build_dimension(raw, &classifier, &options)
        })
        .collect();

    Ok(DrawingData {
        drawing_number: drawing_number.to_string(),
        part_name: input.part_name.trim().to_string(),
        report_date: resolve_report_date(config.report_date.as_deref(), input.report_date.as_deref()),
        dimensions,
    })
}

/// Build one row.
pub fn build_dimension(raw: &RawDimension, classifier: &Classifier, options: &RecordOptions<'_>) -> Dimension {
    let text = raw.characteristic_text();
    let classification = classifier.classify(&text);
    let kind = reconcile_kind(raw, classification.kind);

    debug!(
        balloon = %raw.balloon_id,
        kind = %kind,
        raw = %text,
        normalized = %classification.text,
        "Classified characteristic"
    );

    let mut results = fill_results(&raw.results);
    match kind {
        ClassificationKind::WeldSymbol => {
            for r in results.iter_mut() {
                *r = options.acceptance_token.to_string();
            }
        }
        ClassificationKind::GdtFrame => {
            if let Some(token) = options.gdt_blank_result {
                for r in results.iter_mut().filter(|r| r.is_empty()) {
                    *r = token.to_string();
                }
            }
        }
        ClassificationKind::PlainDimension => {}
    }

    Dimension {
        balloon_id: raw.balloon_id.trim().to_string(),
        raw_characteristic: text,
        normalized_characteristic: classification.text,
        kind,
        results,
        is_weld: kind.is_weld(),
        is_gdt: kind.is_gdt(),
    }
}

fn reconcile_kind(raw: &RawDimension, classified: ClassificationKind) -> ClassificationKind {
    let weld_hint = raw.is_weld.unwrap_or(false);
    let gdt_hint = raw.is_gdt.unwrap_or(false);
    let recognised = classified != ClassificationKind::PlainDimension;

    if weld_hint {
        if recognised && !classified.is_weld() {
            warn!(
                balloon = %raw.balloon_id,
                classified = %classified,
                "Upstream marks a weld but the text reads as another symbol; treating it as a weld"
            );
        }
        return ClassificationKind::WeldSymbol;
    }
    if recognised {
        if (gdt_hint && !classified.is_gdt()) || (raw.is_weld == Some(false) && classified.is_weld()) {
            warn!(
                balloon = %raw.balloon_id,
                classified = %classified,
                is_weld = ?raw.is_weld,
                is_gdt = gdt_hint,
                "Upstream flags disagree with the recognised symbol; keeping the symbol"
            );
        }
        return classified;
    }
    if gdt_hint {
        ClassificationKind::GdtFrame
    } else {
        ClassificationKind::PlainDimension
    }
}

/// Exactly [`SAMPLE_COUNT`] trimmed results; missing slots repeat the first.
pub fn fill_results(results: &[String]) -> [String; SAMPLE_COUNT] {
    let first = results.first().map(|r| r.trim()).unwrap_or("");
    std::array::from_fn(|i| results.get(i).map(|r| r.trim()).unwrap_or(first).to_string())
}

/// Report date precedence: explicit override, payload, today (`d.mm.yyyy`).
pub fn resolve_report_date(override_date: Option<&str>, payload_date: Option<&str>) -> String {
    override_date
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .or_else(|| payload_date.map(str::trim).filter(|d| !d.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(today)
}

/// Today's local date, formatted like a Polish form (`18.10.2026`).
pub fn today() -> String {
    chrono::Local::now().format("%-d.%m.%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(raw: RawDimension) -> Dimension {
        build_dimension(&raw, &Classifier::default(), &RecordOptions::default())
    }

    #[test]
    fn results_backfilled_from_first() {
        assert_eq!(fill_results(&[]), ["", "", ""]);
        assert_eq!(fill_results(&["1.0".to_string()]), ["1.0", "1.0", "1.0"]);
        assert_eq!(fill_results(&["1.0".to_string(), " 2.0 ".to_string()]), ["1.0", "2.0", "1.0"]);
    }

    #[test]
    fn extra_results_truncated() {
        let r: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(fill_results(&r), ["a", "b", "c"]);
    }

    #[test]
    fn weld_rows_print_acceptance_token() {
        let d = build(RawDimension::new("4", "fillet weld 5").with_results(["3.1", "2.9"]));
        assert_eq!(d.kind, ClassificationKind::WeldSymbol);
        assert_eq!(d.results, ["OK", "OK", "OK"]);
        assert!(d.is_weld && !d.is_gdt);
    }

    #[test]
    fn custom_acceptance_token() {
        let opts = RecordOptions {
            acceptance_token: "O.K.",
            gdt_blank_result: None,
        };
        let d = build_dimension(&RawDimension::new("1", "a5 ◺"), &Classifier::default(), &opts);
        assert_eq!(d.results, ["O.K.", "O.K.", "O.K."]);
    }

    #[test]
    fn weld_hint_promotes_plain_dimension() {
        let mut raw = RawDimension::new("2", "a4").with_results(["x"]);
        raw.is_weld = Some(true);
        raw.is_gdt = Some(true);
        let d = build(raw);
        assert_eq!(d.kind, ClassificationKind::WeldSymbol);
        assert!(d.is_weld && !d.is_gdt);
        assert_eq!(d.results, ["OK", "OK", "OK"]);
    }

    #[test]
    fn weld_flag_wins_over_recognised_symbol() {
        let mut raw = RawDimension::new("3", "flatness 0.05 A").with_results(["0.04"]);
        raw.is_weld = Some(true);
        let d = build(raw);
        assert_eq!(d.kind, ClassificationKind::WeldSymbol);
        assert!(d.is_weld && !d.is_gdt);
        assert_eq!(d.results, ["OK", "OK", "OK"]);
    }

    #[test]
    fn flagged_all_around_weld_prints_acceptance_token() {
        let mut raw = RawDimension::new("7", "a5 fillet weld all around").with_results(["4.9", "5.1", "5.0"]);
        raw.is_weld = Some(true);
        let d = build(raw);
        assert_eq!(d.kind, ClassificationKind::WeldSymbol);
        assert!(d.is_weld && !d.is_gdt);
        assert_eq!(d.normalized_characteristic, "a5 ◺");
        assert_eq!(d.results, ["OK", "OK", "OK"]);
    }

    #[test]
    fn gdt_flag_does_not_override_weld_symbol() {
        let mut raw = RawDimension::new("8", "fillet weld 4").with_results(["x"]);
        raw.is_gdt = Some(true);
        let d = build(raw);
        assert_eq!(d.kind, ClassificationKind::WeldSymbol);
        assert_eq!(d.results, ["OK", "OK", "OK"]);
    }

    #[test]
    fn false_weld_flag_keeps_recognised_symbol() {
        let mut raw = RawDimension::new("9", "flatness 0.05 A").with_results(["0.04"]);
        raw.is_weld = Some(false);
        raw.is_gdt = Some(true);
        let d = build(raw);
        assert_eq!(d.kind, ClassificationKind::GdtFrame);
        assert_eq!(d.results, ["0.04", "0.04", "0.04"]);
    }

    #[test]
    fn gdt_blank_result_fills_only_blank_gdt_results() {
        let opts = RecordOptions {
            acceptance_token: "OK",
            gdt_blank_result: Some("ACCEPTED"),
        };
        let c = Classifier::default();
        let gdt = build_dimension(
            &RawDimension::new("1", "flatness 0.05").with_results(["0.01", "", ""]),
            &c,
            &opts,
        );
        assert_eq!(gdt.results, ["0.01", "ACCEPTED", "ACCEPTED"]);

        let plain = build_dimension(&RawDimension::new("2", "25 ±0.1"), &c, &opts);
        assert_eq!(plain.results, ["", "", ""]);
    }

    #[test]
    fn build_drawing_rejects_blank_number() {
        let input = DrawingInput {
            drawing_number: "  ".into(),
            ..DrawingInput::default()
        };
        let err = build_drawing(&input, &ReportConfig::default()).unwrap_err();
        assert!(matches!(err, ReportError::MalformedInput { .. }));
    }

    #[test]
    fn build_drawing_preserves_order_and_date_override() {
        let input = DrawingInput {
            drawing_number: "D-100".into(),
            part_name: "Bracket".into(),
            report_date: Some("2.01.2025".into()),
            dimensions: vec![
                RawDimension::new("2", "25 mm"),
                RawDimension::new("1", "flatness 0.05 A"),
            ],
        };
        let config = ReportConfig::builder().report_date("5.05.2025").build().unwrap();
        let data = build_drawing(&input, &config).unwrap();
        assert_eq!(data.report_date, "5.05.2025");
        let ids: Vec<&str> = data.dimensions.iter().map(|d| d.balloon_id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
        assert_eq!(data.dimensions[1].normalized_characteristic, "⏥ | 0.05 | A");
    }

    #[test]
    fn report_date_precedence() {
        assert_eq!(resolve_report_date(Some("1.01.2025"), Some("2.02.2025")), "1.01.2025");
        assert_eq!(resolve_report_date(None, Some("2.02.2025")), "2.02.2025");
        assert_eq!(resolve_report_date(Some(" "), None), today());
    }
}
