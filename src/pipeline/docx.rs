//! DOCX serializer: [`Document`] → WordprocessingML package bytes.
//!
//! A DOCX file is a ZIP archive of XML parts. This writer emits the minimum
//! set Word and LibreOffice need:
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! docProps/core.xml          title / subject / creator, no dates
//! docProps/app.xml
//! word/document.xml          body: one section per page
//! word/styles.xml            Arial defaults, zero paragraph spacing
//! word/_rels/document.xml.rels
//! ```
//!
//! Output is byte-for-byte reproducible: entries are written in a fixed
//! order with a fixed timestamp, and no part carries a creation date.
//!
//! Sections: every section but the last ends with a paragraph whose
//! properties hold its `w:sectPr`; the last section's `w:sectPr` is the
//! final child of `w:body`. The number of `w:sectPr` elements therefore
//! equals the number of pages.

use crate::document::{Align, Block, Document, PageSetup, Paragraph, Run, Table, TableCell, TableRow};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Why a document could not be serialized.
#[derive(Debug, Error)]
pub enum DocxError {
    /// Text contains a character XML 1.0 cannot represent.
    #[error("character U+{code:04X} is not allowed in XML (in {context:?})")]
    InvalidCharacter { code: u32, context: String },

    #[error("XML writer error: {0}")]
    Xml(String),

    #[error("ZIP container error: {0}")]
    Zip(String),
}

/// Serialize a document to DOCX bytes.
pub fn to_docx(doc: &Document) -> Result<Vec<u8>, DocxError> {
    let parts: [(&str, Vec<u8>); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes().to_vec()),
        ("docProps/core.xml", core_xml(doc)?),
        ("docProps/app.xml", app_xml(doc)?),
        ("word/document.xml", document_xml(doc)?),
        ("word/styles.xml", STYLES.as_bytes().to_vec()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes().to_vec()),
    ];

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in parts {
        zip.start_file(name, options).map_err(|e| DocxError::Zip(e.to_string()))?;
        zip.write_all(&bytes).map_err(|e| DocxError::Zip(e.to_string()))?;
    }
    let cursor = zip.finish().map_err(|e| DocxError::Zip(e.to_string()))?;
    Ok(cursor.into_inner())
}

// ── Static parts ─────────────────────────────────────────────────────────────

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial" w:eastAsia="Arial" w:cs="Arial"/><w:sz w:val="20"/><w:szCs w:val="20"/><w:lang w:val="pl-PL"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:before="0" w:after="0" w:line="240" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style></w:styles>"#;

// ── XML writer ───────────────────────────────────────────────────────────────

struct Xml {
    writer: Writer<Vec<u8>>,
}

impl Xml {
    fn new() -> Result<Self, DocxError> {
        let mut xml = Self {
            writer: Writer::new(Vec::new()),
        };
        xml.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(xml)
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), DocxError> {
        self.writer
            .write_event(event)
            .map_err(|e| DocxError::Xml(e.to_string()))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), DocxError> {
        let mut el = BytesStart::new(name);
        for attr in attrs {
            el.push_attribute(*attr);
        }
        self.event(Event::Start(el))
    }

    fn end(&mut self, name: &str) -> Result<(), DocxError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), DocxError> {
        let mut el = BytesStart::new(name);
        for attr in attrs {
            el.push_attribute(*attr);
        }
        self.event(Event::Empty(el))
    }

    fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), DocxError> {
        check_xml_chars(text)?;
        self.start(name, attrs)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// Reject characters outside the XML 1.0 `Char` production.
fn check_xml_chars(text: &str) -> Result<(), DocxError> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(DocxError::InvalidCharacter {
            code: c as u32,
            context: text.chars().take(40).filter(|&c| is_xml_char(c)).collect(),
        }),
        None => Ok(()),
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

// ── docProps ─────────────────────────────────────────────────────────────────

fn core_xml(doc: &Document) -> Result<Vec<u8>, DocxError> {
    let mut x = Xml::new()?;
    x.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    x.text_element("dc:title", &[], &doc.properties.title)?;
    x.text_element("dc:subject", &[], &doc.properties.subject)?;
    x.text_element("dc:creator", &[], &doc.properties.creator)?;
    x.end("cp:coreProperties")?;
    Ok(x.finish())
}

fn app_xml(doc: &Document) -> Result<Vec<u8>, DocxError> {
    let mut x = Xml::new()?;
    x.start(
        "Properties",
        &[(
            "xmlns",
            "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
        )],
    )?;
    x.text_element("Application", &[], concat!("balloon2docx ", env!("CARGO_PKG_VERSION")))?;
    x.text_element("Pages", &[], &doc.sections.len().to_string())?;
    x.end("Properties")?;
    Ok(x.finish())
}

// ── word/document.xml ────────────────────────────────────────────────────────

fn document_xml(doc: &Document) -> Result<Vec<u8>, DocxError> {
    let mut x = Xml::new()?;
    x.start("w:document", &[("xmlns:w", NS_W), ("xmlns:r", NS_R)])?;
    x.start("w:body", &[])?;

    let last = doc.sections.len().saturating_sub(1);
    for (i, section) in doc.sections.iter().enumerate() {
        write_blocks(&mut x, &section.blocks, section.page.text_width())?;
        if i != last {
            x.start("w:p", &[])?;
            x.start("w:pPr", &[])?;
            write_sect_pr(&mut x, &section.page)?;
            x.end("w:pPr")?;
            x.end("w:p")?;
        }
    }
    let final_page = doc.sections.last().map(|s| s.page).unwrap_or_default();
    write_sect_pr(&mut x, &final_page)?;

    x.end("w:body")?;
    x.end("w:document")?;
    Ok(x.finish())
}

fn write_sect_pr(x: &mut Xml, page: &PageSetup) -> Result<(), DocxError> {
    let w = page.width.to_string();
    let h = page.height.to_string();
    let m = page.margin.to_string();
    x.start("w:sectPr", &[])?;
    x.empty("w:type", &[("w:val", "nextPage")])?;
    x.empty("w:pgSz", &[("w:w", w.as_str()), ("w:h", h.as_str())])?;
    x.empty(
        "w:pgMar",
        &[
            ("w:top", m.as_str()),
            ("w:right", m.as_str()),
            ("w:bottom", m.as_str()),
            ("w:left", m.as_str()),
            ("w:header", "0"),
            ("w:footer", "0"),
            ("w:gutter", "0"),
        ],
    )?;
    x.end("w:sectPr")
}

/// `width` is the space available to the blocks, in twips.
fn write_blocks(x: &mut Xml, blocks: &[Block], width: u32) -> Result<(), DocxError> {
    for block in blocks {
        match block {
            Block::Paragraph(p) => write_paragraph(x, p)?,
            Block::Table(t) => write_table(x, t, width)?,
        }
    }
    Ok(())
}

fn write_paragraph(x: &mut Xml, p: &Paragraph) -> Result<(), DocxError> {
    x.start("w:p", &[])?;
    x.start("w:pPr", &[])?;
    let before = p.space_before.to_string();
    let after = p.space_after.to_string();
    x.empty("w:spacing", &[("w:before", before.as_str()), ("w:after", after.as_str())])?;
    match p.align {
        Align::Left => {}
        Align::Center => x.empty("w:jc", &[("w:val", "center")])?,
        Align::Right => x.empty("w:jc", &[("w:val", "right")])?,
    }
    x.end("w:pPr")?;
    for run in &p.runs {
        write_run(x, run)?;
    }
    x.end("w:p")
}

fn write_run(x: &mut Xml, run: &Run) -> Result<(), DocxError> {
    x.start("w:r", &[])?;
    x.start("w:rPr", &[])?;
    if let Some(font) = &run.font {
        check_xml_chars(font)?;
        x.empty(
            "w:rFonts",
            &[("w:ascii", font.as_str()), ("w:hAnsi", font.as_str()), ("w:cs", font.as_str())],
        )?;
    }
    if run.bold {
        x.empty("w:b", &[])?;
    }
    if run.italic {
        x.empty("w:i", &[])?;
    }
    let size = run.size.to_string();
    x.empty("w:sz", &[("w:val", size.as_str())])?;
    x.empty("w:szCs", &[("w:val", size.as_str())])?;
    x.end("w:rPr")?;
    if run.tab_before {
        x.empty("w:tab", &[])?;
    }
    if !run.text.is_empty() {
        x.text_element("w:t", &[("xml:space", "preserve")], &run.text)?;
    }
    x.end("w:r")
}

fn write_table(x: &mut Xml, table: &Table, width: u32) -> Result<(), DocxError> {
    x.start("w:tbl", &[])?;
    x.start("w:tblPr", &[])?;
    x.empty("w:tblW", &[("w:w", "5000"), ("w:type", "pct")])?;
    write_table_borders(x, table.borders)?;
    x.empty("w:tblLayout", &[("w:type", "fixed")])?;
    x.end("w:tblPr")?;

    let grid: Vec<u32> = table.columns.iter().map(|pct| width * pct / 100).collect();
    x.start("w:tblGrid", &[])?;
    for col in &grid {
        x.empty("w:gridCol", &[("w:w", col.to_string().as_str())])?;
    }
    x.end("w:tblGrid")?;

    for row in &table.rows {
        write_row(x, row, &grid)?;
    }
    x.end("w:tbl")
}

fn write_table_borders(x: &mut Xml, visible: bool) -> Result<(), DocxError> {
    let attrs: &[(&str, &str)] = if visible {
        &[("w:val", "single"), ("w:sz", "4"), ("w:space", "0"), ("w:color", "000000")]
    } else {
        &[("w:val", "nil")]
    };
    x.start("w:tblBorders", &[])?;
    for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        x.empty(edge, attrs)?;
    }
    x.end("w:tblBorders")
}

fn write_row(x: &mut Xml, row: &TableRow, grid: &[u32]) -> Result<(), DocxError> {
    x.start("w:tr", &[])?;
    if row.header {
        x.start("w:trPr", &[])?;
        x.empty("w:tblHeader", &[])?;
        x.end("w:trPr")?;
    }
    let mut col = 0usize;
    for cell in &row.cells {
        let span = cell.span.max(1) as usize;
        let end = (col + span).min(grid.len());
        let cell_width: u32 = grid.get(col..end).map(|w| w.iter().sum()).unwrap_or(0);
        write_cell(x, cell, cell_width)?;
        col += span;
    }
    x.end("w:tr")
}

fn write_cell(x: &mut Xml, cell: &TableCell, grid_width: u32) -> Result<(), DocxError> {
    x.start("w:tc", &[])?;
    x.start("w:tcPr", &[])?;
    match cell.width {
        // Percentages are expressed in fiftieths of a percent.
        Some(pct) => x.empty("w:tcW", &[("w:w", (pct * 50).to_string().as_str()), ("w:type", "pct")])?,
        None => x.empty("w:tcW", &[("w:w", grid_width.to_string().as_str()), ("w:type", "dxa")])?,
    }
    if cell.span > 1 {
        x.empty("w:gridSpan", &[("w:val", cell.span.to_string().as_str())])?;
    }
    if let Some(fill) = &cell.shading {
        x.empty("w:shd", &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", fill.as_str())])?;
    }
    if let Some(m) = &cell.margins {
        x.start("w:tcMar", &[])?;
        for (edge, value) in [("w:top", m.top), ("w:left", m.left), ("w:bottom", m.bottom), ("w:right", m.right)] {
            x.empty(edge, &[("w:w", value.to_string().as_str()), ("w:type", "dxa")])?;
        }
        x.end("w:tcMar")?;
    }
    if cell.v_center {
        x.empty("w:vAlign", &[("w:val", "center")])?;
    }
    x.end("w:tcPr")?;

    write_blocks(x, &cell.blocks, grid_width)?;
    // A cell must end with a paragraph, including empty cells and cells
    // whose last block is a nested table.
    if !matches!(cell.blocks.last(), Some(Block::Paragraph(_))) {
        x.empty("w:p", &[])?;
    }
    x.end("w:tc")
}
