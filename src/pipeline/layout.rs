//! Layout: one assembled [`Report`] → a [`Document`] with one section per page.
//!
//! Every page repeats the same blocks:
//!
//! ```text
//! ┌ form codes ─────────────────────────────────────────┐
//! │ organization │ title lines        │ Rap. Nr / Data / │
//! │              │                    │ Strona X / Y     │
//! ├ description heading ─────┬ part heading ────────────┤
//! │ change-kind checkboxes   │ Nr rys. / Nazwa części   │
//! ├ Lp ┬ Charakterystyka ────┬ Wynik dostawcy [┬ review] ┤
//! │ ×  page_capacity rows, blank-padded                  │
//! ├ attestation + remarks    │ decision matrix          │
//! └ signature line ─────────────────────────────────────┘
//! ```
//!
//! The layout never interprets the characteristic text; it prints whatever
//! the assembler hands it.

use crate::config::ReportConfig;
use crate::document::{
    Align, Block, CellMargins, Document, DocumentProperties, PageSetup, Paragraph, Run, Section, Table,
    TableCell, TableRow,
};
use crate::pipeline::assemble::{Report, ReportPage, ReportRow};
use crate::template::ReportTemplate;

// Font sizes in half-points.
const SIZE_CODES: u32 = 14;
const SIZE_ORG: u32 = 28;
const SIZE_ORG_SUB: u32 = 8;
const SIZE_TITLE: u32 = 22;
const SIZE_LABEL: u32 = 12;
const SIZE_VALUE: u32 = 14;
const SIZE_META_HEADING: u32 = 16;
const SIZE_META: u32 = 18;
const SIZE_CELL: u32 = 14;
const SIZE_ATTESTATION: u32 = 11;
const SIZE_FOOTER: u32 = 12;
const SIZE_DECISION_LABEL: u32 = 8;
const SIZE_DECISION_ROW: u32 = 10;

const DATA_CELL_MARGINS: CellMargins = CellMargins {
    top: 20,
    bottom: 20,
    left: 40,
    right: 40,
};

/// Lay out a whole report.
pub fn layout_report(report: &Report<'_>, config: &ReportConfig) -> Document {
    let template = &config.template;
    let drawing = report.drawing;
    Document {
        properties: DocumentProperties {
            title: format!(
                "{} {} {}",
                drawing.drawing_number, template.report_number_label, report.sample
            ),
            subject: template.title_lines.join(" "),
            creator: template.organization_name.clone(),
        },
        sections: report
            .pages
            .iter()
            .map(|page| layout_page(page, config))
            .collect(),
    }
}

fn layout_page(page: &ReportPage<'_>, config: &ReportConfig) -> Section {
    let t = &config.template;
    let mut blocks: Vec<Block> = Vec::with_capacity(10);
    if !t.form_codes.is_empty() {
        blocks.push(form_codes(t).into());
    }
    blocks.extend([
        Block::from(Paragraph::spacer(0, 50)),
        Block::from(header_table(page, t)),
        Block::from(meta_table(page, t)),
        Block::from(Paragraph::spacer(0, 50)),
        Block::from(inspection_table(&page.rows, config.page_capacity, t)),
        Block::from(Paragraph::spacer(0, 100)),
    ]);
    if t.show_footer {
        blocks.push(footer_table(t).into());
        blocks.push(signature_line(t).into());
    }
    Section {
        page: PageSetup::default(),
        blocks,
    }
}

fn text(t: &ReportTemplate, s: impl Into<String>, size: u32) -> Run {
    Run::new(s).size(size).font(t.body_font.clone())
}

// ── Header ───────────────────────────────────────────────────────────────────

fn form_codes(t: &ReportTemplate) -> Table {
    let last = t.form_codes.len().saturating_sub(1);
    let cells = t
        .form_codes
        .iter()
        .enumerate()
        .map(|(i, code)| {
            let align = match i {
                0 => Align::Left,
                i if i == last => Align::Right,
                _ => Align::Center,
            };
            TableCell::paragraph(Paragraph::new().run(text(t, code.as_str(), SIZE_CODES)).align(align))
        })
        .collect();
    Table::new(even_columns(t.form_codes.len() as u32))
        .borderless()
        .row(TableRow::new(cells))
}

fn header_table(page: &ReportPage<'_>, t: &ReportTemplate) -> Table {
    let org = TableCell::new()
        .width(30)
        .v_center()
        .block(
            Paragraph::new()
                .run(text(t, t.organization_name.as_str(), SIZE_ORG).bold())
                .align(Align::Center),
        )
        .block(
            Paragraph::new()
                .run(text(t, t.organization_subtitle.as_str(), SIZE_ORG_SUB))
                .align(Align::Center),
        );

    let title = t.title_lines.iter().fold(TableCell::new().width(45).v_center(), |cell, line| {
        cell.block(
            Paragraph::new()
                .run(text(t, line.as_str(), SIZE_TITLE).bold())
                .align(Align::Center),
        )
    });

    let labels = TableCell::new()
        .width(25)
        .block(label_value(t, &t.report_number_label, &page.sample.to_string()))
        .block(label_value(t, &t.date_label, &page.drawing.report_date))
        .block(label_value(t, &t.page_label, &format!("{} / {}", page.number, page.total)));

    Table::new(vec![30, 45, 25]).row(TableRow::new(vec![org, title, labels]))
}

fn label_value(t: &ReportTemplate, label: &str, value: &str) -> Paragraph {
    Paragraph::new()
        .run(text(t, format!("{label}: "), SIZE_LABEL))
        .run(text(t, value, SIZE_VALUE).bold())
        .spacing(10, 10)
}

fn meta_table(page: &ReportPage<'_>, t: &ReportTemplate) -> Table {
    let heading = |s: &str| {
        TableCell::paragraph(
            Paragraph::new()
                .run(text(t, s, SIZE_META_HEADING).bold())
                .align(Align::Center),
        )
        .shading(t.heading_fill.clone())
    };

    let part_name = if page.drawing.part_name.is_empty() {
        t.part_name_fallback.as_str()
    } else {
        page.drawing.part_name.as_str()
    };

    let change = TableCell::paragraph(
        Paragraph::new()
            .run(text(t, t.change_kind_line.as_str(), SIZE_CELL))
            .spacing(100, 100),
    );
    let part = TableCell::new()
        .block(
            Paragraph::new()
                .run(
                    text(
                        t,
                        format!("{}  {}", t.drawing_number_label, page.drawing.drawing_number),
                        SIZE_META,
                    )
                    .bold(),
                )
                .spacing(50, 0),
        )
        .block(
            Paragraph::new()
                .run(text(t, format!("{}  {}", t.part_name_label, part_name), SIZE_META).bold())
                .spacing(0, 50),
        );

    Table::new(vec![50, 50])
        .row(TableRow::new(vec![
            heading(&t.description_heading),
            heading(&t.part_heading),
        ]))
        .row(TableRow::new(vec![change, part]))
}

// ── Inspection table ─────────────────────────────────────────────────────────

/// Column widths (percent) for the inspection table.
fn inspection_columns(t: &ReportTemplate) -> Vec<u32> {
    if t.reviewer_header.is_some() {
        vec![8, 42, 25, 25]
    } else {
        vec![8, 52, 40]
    }
}

/// Header row plus exactly `capacity` data rows; rows past the page's real
/// dimensions are blank.
pub(crate) fn inspection_table(rows: &[ReportRow<'_>], capacity: usize, t: &ReportTemplate) -> Table {
    let columns = inspection_columns(t);

    let mut headers = vec![
        t.balloon_header.as_str(),
        t.characteristic_header.as_str(),
        t.result_header.as_str(),
    ];
    if let Some(reviewer) = &t.reviewer_header {
        headers.push(reviewer.as_str());
    }
    let header_cells = headers
        .iter()
        .zip(&columns)
        .map(|(h, w)| {
            TableCell::paragraph(
                Paragraph::new()
                    .run(text(t, *h, SIZE_CELL).bold())
                    .align(Align::Center),
            )
            .width(*w)
            .shading(t.heading_fill.clone())
            .v_center()
        })
        .collect();

    let mut table = Table::new(columns.clone()).row(TableRow::new(header_cells).header());

    let blank = ReportRow {
        balloon_id: "",
        characteristic: "",
        result: "",
    };
    for i in 0..capacity.max(rows.len()) {
        let row = rows.get(i).copied().unwrap_or(blank);
        table = table.row(data_row(&row, &columns, t));
    }
    table
}

fn data_row(row: &ReportRow<'_>, columns: &[u32], t: &ReportTemplate) -> TableRow {
    let cell = |run: Run, align: Align, width: u32| {
        TableCell::paragraph(Paragraph::new().run(run).align(align))
            .width(width)
            .margins(DATA_CELL_MARGINS)
            .v_center()
    };

    let mut cells = vec![
        cell(
            text(t, row.balloon_id, SIZE_CELL).bold_if(!row.balloon_id.is_empty()),
            Align::Center,
            columns[0],
        ),
        cell(
            Run::new(row.characteristic)
                .size(SIZE_CELL)
                .font(t.characteristic_font.clone()),
            Align::Left,
            columns[1],
        ),
        cell(text(t, row.result, SIZE_CELL), Align::Center, columns[2]),
    ];
    if let Some(&w) = columns.get(3) {
        cells.push(cell(text(t, "", SIZE_CELL), Align::Center, w));
    }
    TableRow::new(cells)
}

// ── Footer ───────────────────────────────────────────────────────────────────

fn footer_table(t: &ReportTemplate) -> Table {
    let mut remarks = TableCell::new()
        .width(60)
        .block(Paragraph::new().run(text(t, t.attestation.as_str(), SIZE_ATTESTATION).italic()))
        .block(Paragraph::spacer(100, 0));
    for line in &t.remarks_lines {
        remarks = remarks.block(Paragraph::new().run(text(t, line.as_str(), SIZE_FOOTER)));
    }

    let decisions = TableCell::new().width(40).block(decision_matrix(t));
    Table::new(vec![60, 40]).row(TableRow::new(vec![remarks, decisions]))
}

fn decision_matrix(t: &ReportTemplate) -> Table {
    let n = t.decision_columns.len() as u32;
    let mut columns = vec![20];
    columns.extend(split_evenly(80, n));

    let title = TableCell::paragraph(
        Paragraph::new()
            .run(text(t, t.decision_title.as_str(), SIZE_FOOTER).bold())
            .align(Align::Center),
    )
    .span(n + 1)
    .shading(t.heading_fill.clone());

    let mut labels = vec![TableCell::paragraph(Paragraph::new().run(text(t, "", SIZE_DECISION_LABEL)))];
    labels.extend(
        t.decision_columns
            .iter()
            .map(|c| TableCell::paragraph(Paragraph::new().run(text(t, c.as_str(), SIZE_DECISION_LABEL)))),
    );

    let mut table = Table::new(columns)
        .row(TableRow::new(vec![title]))
        .row(TableRow::new(labels));
    for name in &t.decision_rows {
        let mut cells = vec![TableCell::paragraph(
            Paragraph::new().run(text(t, name.as_str(), SIZE_DECISION_ROW)),
        )];
        cells.extend((0..n).map(|_| TableCell::new()));
        table = table.row(TableRow::new(cells));
    }
    table
}

fn signature_line(t: &ReportTemplate) -> Paragraph {
    t.signature_fields
        .iter()
        .enumerate()
        .fold(Paragraph::new().spacing(200, 0), |p, (i, field)| {
            let run = text(t, field.as_str(), SIZE_FOOTER);
            p.run(if i == 0 { run } else { run.tab() })
        })
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn even_columns(n: u32) -> Vec<u32> {
    split_evenly(100, n)
}

/// Split `total` into `n` integer parts that sum to `total`.
fn split_evenly(total: u32, n: u32) -> Vec<u32> {
    if n == 0 {
        return Vec::new();
    }
    let base = total / n;
    let extra = total % n;
    (0..n).map(|i| base + u32::from(i < extra)).collect()
}
