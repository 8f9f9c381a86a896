//! End-to-end tests: JSON payload → classified drawing → DOCX reports.
//!
//! Reports are read back by unzipping `word/document.xml` and walking its
//! tables with quick-xml, so the assertions check what Word would show.

use balloon2docx::{
    generate, generate_from_json, generate_stream, generate_to_dir, load_drawing, prepare, to_tsv, DrawingInput,
    RawDimension, ReportConfig, ReportError, SampleError,
};
use futures::StreamExt;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Tables of a document in document order (nested tables included), as
/// rows of cell texts.
struct ParsedDocx {
    tables: Vec<Vec<Vec<String>>>,
    sections: usize,
    xml: String,
}

impl ParsedDocx {
    /// Inspection tables: the ones whose header row starts with "Lp".
    fn inspection_tables(&self) -> Vec<&Vec<Vec<String>>> {
        self.tables
            .iter()
            .filter(|t| t.first().and_then(|row| row.first()).map(String::as_str) == Some("Lp"))
            .collect()
    }
}

fn read_part(docx: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).expect("valid zip");
    let mut file = archive.by_name(name).expect("part present");
    let mut xml = String::new();
    file.read_to_string(&mut xml).expect("utf-8 part");
    xml
}

fn parse_docx(docx: &[u8]) -> ParsedDocx {
    let xml = read_part(docx, "word/document.xml");
    let mut reader = Reader::from_str(&xml);
    let mut tables: Vec<Vec<Vec<String>>> = Vec::new();
    let mut open_tables: Vec<usize> = Vec::new();
    let mut open_cells: Vec<String> = Vec::new();
    let mut in_text = false;
    let mut sections = 0;

    loop {
        match reader.read_event().expect("well-formed document.xml") {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => {
                    tables.push(Vec::new());
                    open_tables.push(tables.len() - 1);
                }
                b"w:tr" => {
                    let t = *open_tables.last().expect("row inside table");
                    tables[t].push(Vec::new());
                }
                b"w:tc" => open_cells.push(String::new()),
                b"w:t" => in_text = true,
                b"w:sectPr" => sections += 1,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => {
                    open_tables.pop();
                }
                b"w:tc" => {
                    let text = open_cells.pop().expect("open cell");
                    let t = *open_tables.last().expect("cell inside table");
                    tables[t].last_mut().expect("cell inside row").push(text);
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(cell) = open_cells.last_mut() {
                    cell.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    ParsedDocx { tables, sections, xml }
}

fn dims(count: usize) -> Vec<RawDimension> {
    (1..=count)
        .map(|i| RawDimension::new(i.to_string(), format!("{i} mm ±0.1")).with_results(["x1", "x2", "x3"]))
        .collect()
}

fn input(dimensions: Vec<RawDimension>) -> DrawingInput {
    DrawingInput {
        drawing_number: "D-100".into(),
        part_name: "Bracket".into(),
        report_date: Some("1.02.2025".into()),
        dimensions,
    }
}

const FLATNESS: &str = r#"{
    "drawingNumber": "D-1",
    "partName": "Plate",
    "dimensions": [
        {"balloonId": "1", "characteristic": "flatness 0.05 A", "results": ["0.04", "0.06", "0.05"]}
    ]
}"#;

// ── End to end ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_single_flatness_row() {
    let output = generate_from_json(FLATNESS, &ReportConfig::default()).await.unwrap();
    assert_eq!(output.reports.len(), 3);
    assert!(output.failures.is_empty());

    let expected = ["0.04", "0.06", "0.05"];
    for (report, result) in output.reports.iter().zip(expected) {
        assert_eq!(report.page_count, 1);
        assert_eq!(report.file_name, format!("D-1_REPORT_SAMPLE_{}.docx", report.sample));

        let doc = parse_docx(&report.bytes);
        assert_eq!(doc.sections, 1);

        let tables = doc.inspection_tables();
        assert_eq!(tables.len(), 1);
        let rows = tables[0];
        assert_eq!(rows.len(), 1 + 23, "header plus padded rows");
        assert_eq!(rows[1], ["1", "⏥ | 0.05 | A", result]);
        assert!(rows[2..].iter().all(|r| r.iter().all(String::is_empty)));
    }
}

#[tokio::test]
async fn test_fifty_dimensions_paginate_to_three_pages() {
    let config = ReportConfig::default();
    let drawing = prepare(&input(dims(50)), &config).unwrap();
    let output = generate(&drawing, &config).await.unwrap();
    assert_eq!(output.stats.pages_per_report, 3);

    for report in &output.reports {
        assert_eq!(report.page_count, 3);
        assert_eq!(report.row_count, 50);

        let doc = parse_docx(&report.bytes);
        assert_eq!(doc.sections, 3);
        assert!(doc.xml.contains("1 / 3") && doc.xml.contains("3 / 3"));

        let tables = doc.inspection_tables();
        assert_eq!(tables.len(), 3);
        let real: Vec<usize> = tables
            .iter()
            .map(|t| t[1..].iter().filter(|r| !r[0].is_empty()).count())
            .collect();
        assert_eq!(real, vec![23, 23, 4]);
        assert!(tables.iter().all(|t| t.len() == 24));

        // Concatenated pages reproduce the balloon order.
        let ids: Vec<&str> = tables
            .iter()
            .flat_map(|t| t[1..].iter())
            .map(|r| r[0].as_str())
            .filter(|id| !id.is_empty())
            .collect();
        let want: Vec<String> = (1..=50).map(|i| i.to_string()).collect();
        assert_eq!(ids, want);
    }
}

#[tokio::test]
async fn test_empty_drawing_still_has_one_page() {
    let config = ReportConfig::default();
    let drawing = prepare(&input(Vec::new()), &config).unwrap();
    let output = generate(&drawing, &config).await.unwrap();
    for report in &output.reports {
        assert_eq!(report.page_count, 1);
        assert_eq!(parse_docx(&report.bytes).sections, 1);
    }
}

#[tokio::test]
async fn test_weld_rows_print_acceptance_token() {
    let raw = vec![RawDimension::new("7", "fillet weld 5").with_results(["4.9", "5.1", ""])];
    let config = ReportConfig::builder().acceptance_token("O.K.").build().unwrap();
    let drawing = prepare(&input(raw), &config).unwrap();
    assert!(drawing.dimensions[0].is_weld);

    let output = generate(&drawing, &config).await.unwrap();
    for report in &output.reports {
        let doc = parse_docx(&report.bytes);
        assert_eq!(doc.inspection_tables()[0][1], ["7", "a5 ◺", "O.K."]);
    }
}

#[tokio::test]
async fn test_flagged_weld_prints_acceptance_token() {
    let mut weld = RawDimension::new("7", "a5 fillet weld all around").with_results(["4.9", "5.1", "5.0"]);
    weld.is_weld = Some(true);
    let mut flagged_frame = RawDimension::new("8", "roundness 0.1").with_results(["0.05"]);
    flagged_frame.is_weld = Some(true);

    let config = ReportConfig::default();
    let drawing = prepare(&input(vec![weld, flagged_frame]), &config).unwrap();
    assert!(drawing.dimensions.iter().all(|d| d.is_weld && !d.is_gdt));

    let output = generate(&drawing, &config).await.unwrap();
    for report in &output.reports {
        let doc = parse_docx(&report.bytes);
        let table = doc.inspection_tables()[0];
        assert_eq!(table[1], ["7", "a5 ◺", "OK"]);
        assert_eq!(table[2][2], "OK");
    }
}

#[tokio::test]
async fn test_report_date_and_drawing_number_printed() {
    let output = generate_from_json(FLATNESS, &ReportConfig::builder().report_date("9.09.2025").build().unwrap())
        .await
        .unwrap();
    let doc = parse_docx(&output.reports[0].bytes);
    assert!(doc.xml.contains("9.09.2025"));
    assert!(doc.xml.contains("D-1"));
    assert!(doc.xml.contains("Plate"));
}

#[tokio::test]
async fn test_reports_are_deterministic() {
    let config = ReportConfig::builder().report_date("1.01.2025").build().unwrap();
    let a = generate_from_json(FLATNESS, &config).await.unwrap();
    let b = generate_from_json(FLATNESS, &config).await.unwrap();
    for (x, y) in a.reports.iter().zip(&b.reports) {
        assert_eq!(x.bytes, y.bytes, "sample {} differs", x.sample);
    }
}

// ── Failure isolation ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bad_character_fails_only_its_sample() {
    let raw = vec![RawDimension::new("1", "25 ±0.1").with_results(["25.0", "25\u{1}.1", "24.9"])];
    let config = ReportConfig::default();
    let drawing = prepare(&input(raw), &config).unwrap();
    let output = generate(&drawing, &config).await.unwrap();

    let samples: Vec<usize> = output.reports.iter().map(|r| r.sample).collect();
    assert_eq!(samples, vec![1, 3]);
    assert_eq!(output.failures.len(), 1);
    match &output.failures[0] {
        SampleError::SerializationFailed { sample, detail } => {
            assert_eq!(*sample, 2);
            assert!(detail.contains("U+0001"), "{detail}");
        }
        other => panic!("unexpected failure: {other:?}"),
    }

    match output.into_result() {
        Err(ReportError::PartialFailure { success, failed, total }) => assert_eq!((success, failed, total), (2, 1, 3)),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_character_everywhere_fails_all() {
    let raw = vec![RawDimension::new("1", "25").with_results(["\u{1}"])];
    let config = ReportConfig::default();
    let drawing = prepare(&input(raw), &config).unwrap();
    let err = generate(&drawing, &config).await.unwrap_err();
    assert!(matches!(err, ReportError::AllReportsFailed { total: 3, .. }));
}

// ── Output directory ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_to_dir_writes_three_files() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("nested").join("reports");
    let config = ReportConfig::default();
    let drawing = prepare(&input(dims(5)), &config).unwrap();

    let output = generate_to_dir(&drawing, &dir, &config).await.unwrap();
    assert_eq!(output.reports.len(), 3);

    let mut names: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        [
            "D-100_REPORT_SAMPLE_1.docx",
            "D-100_REPORT_SAMPLE_2.docx",
            "D-100_REPORT_SAMPLE_3.docx"
        ]
    );
    for report in &output.reports {
        let on_disk = std::fs::read(dir.join(&report.file_name)).unwrap();
        assert_eq!(on_disk, report.bytes);
    }
}

// ── Input errors ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_required_fields_are_malformed() {
    for payload in [
        r#"{"partName": "x", "dimensions": []}"#,
        r#"{"drawingNumber": "D-1", "partName": "x"}"#,
        r#"{"drawingNumber": "", "dimensions": []}"#,
        "[1, 2, 3]",
    ] {
        let err = generate_from_json(payload, &ReportConfig::default()).await.unwrap_err();
        assert!(matches!(err, ReportError::MalformedInput { .. }), "{payload}: {err}");
    }
}

#[tokio::test]
async fn test_load_drawing_from_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("drawing.json");
    std::fs::write(&path, FLATNESS).unwrap();

    let drawing = load_drawing(path.to_str().unwrap(), &ReportConfig::default()).await.unwrap();
    assert_eq!(drawing.dimensions[0].normalized_characteristic, "⏥ | 0.05 | A");

    let err = load_drawing(tmp.path().join("missing.json").to_str().unwrap(), &ReportConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::FileNotFound { .. }));
}

// ── Secondary outputs ────────────────────────────────────────────────────────

#[test]
fn test_tsv_of_classified_drawing() {
    let config = ReportConfig::default();
    let raw = vec![
        RawDimension::new("1", "flatness 0.05 A").with_results(["0.04", "0.06", "0.05"]),
        RawDimension::new("2", "Diameter 12.5 mm").with_results(["12.49"]),
    ];
    let drawing = prepare(&input(raw), &config).unwrap();
    assert_eq!(to_tsv(&drawing.dimensions, 2), "1\t⏥ | 0.05 | A\t0.05\n2\t⌀12.5\t12.49");
}

#[tokio::test]
async fn test_stream_matches_eager_bytes() {
    let config = ReportConfig::builder().report_date("1.01.2025").build().unwrap();
    let drawing = prepare(&serde_json::from_str(FLATNESS).unwrap(), &config).unwrap();

    let eager = generate(&drawing, &config).await.unwrap();
    let mut streamed: Vec<_> = generate_stream(&drawing, &config)
        .map(|r| r.unwrap())
        .collect()
        .await;
    streamed.sort_by_key(|r| r.sample);

    assert_eq!(streamed.len(), eager.reports.len());
    for (s, e) in streamed.iter().zip(&eager.reports) {
        assert_eq!(s.bytes, e.bytes);
    }
}
