//! Format-neutral document tree: sections of paragraphs and tables.
//!
//! [`crate::pipeline::layout`] builds it from a report and
//! [`crate::pipeline::docx`] serializes it. The tree knows nothing about
//! inspection reports; it is just text with a little formatting.

/// A4 portrait in twentieths of a point.
pub const A4_WIDTH_TWIPS: u32 = 11906;
pub const A4_HEIGHT_TWIPS: u32 = 16838;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub properties: DocumentProperties,
    /// One section per printed page.
    pub sections: Vec<Section>,
}

/// Package metadata. No timestamps: identical input must give identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentProperties {
    pub title: String,
    pub subject: String,
    pub creator: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub page: PageSetup,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    pub width: u32,
    pub height: u32,
    /// Same margin on all four sides.
    pub margin: u32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            width: A4_WIDTH_TWIPS,
            height: A4_HEIGHT_TWIPS,
            margin: 400,
        }
    }
}

impl PageSetup {
    /// Width available to content.
    pub fn text_width(&self) -> u32 {
        self.width.saturating_sub(2 * self.margin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

impl From<Paragraph> for Block {
    fn from(p: Paragraph) -> Self {
        Block::Paragraph(p)
    }
}

impl From<Table> for Block {
    fn from(t: Table) -> Self {
        Block::Table(t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

// ── Paragraphs ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub align: Align,
    /// Spacing in twips.
    pub space_before: u32,
    pub space_after: u32,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty paragraph used as a vertical spacer.
    pub fn spacer(before: u32, after: u32) -> Self {
        Self {
            space_before: before,
            space_after: after,
            ..Self::default()
        }
    }

    pub fn run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn spacing(mut self, before: u32, after: u32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    /// Concatenated run text, tabs as `\t`.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| if r.tab_before { format!("\t{}", r.text) } else { r.text.clone() })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// Font size in half-points.
    pub size: u32,
    pub font: Option<String>,
    /// Emit a tab stop before the text.
    pub tab_before: bool,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            size: 20,
            font: None,
            tab_before: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn bold_if(mut self, on: bool) -> Self {
        self.bold = on;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn size(mut self, half_points: u32) -> Self {
        self.size = half_points;
        self
    }

    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn tab(mut self) -> Self {
        self.tab_before = true;
        self
    }
}

// ── Tables ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column widths in percent of the table width.
    pub columns: Vec<u32>,
    pub borders: bool,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(columns: Vec<u32>) -> Self {
        Self {
            columns,
            borders: true,
            rows: Vec::new(),
        }
    }

    pub fn borderless(mut self) -> Self {
        self.borders = false;
        self
    }

    pub fn row(mut self, row: TableRow) -> Self {
        self.rows.push(row);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    /// Repeat this row at the top of every page the table spans.
    pub header: bool,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            header: false,
        }
    }

    pub fn header(mut self) -> Self {
        self.header = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMargins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCell {
    pub blocks: Vec<Block>,
    /// Width in percent of the table width; `None` follows the grid.
    pub width: Option<u32>,
    /// Number of grid columns spanned (1 when unset).
    pub span: u32,
    /// Hex fill colour.
    pub shading: Option<String>,
    pub margins: Option<CellMargins>,
    pub v_center: bool,
}

impl TableCell {
    pub fn new() -> Self {
        Self {
            span: 1,
            ..Self::default()
        }
    }

    /// A cell holding one paragraph.
    pub fn paragraph(p: Paragraph) -> Self {
        Self::new().block(p)
    }

    pub fn block(mut self, block: impl Into<Block>) -> Self {
        self.blocks.push(block.into());
        self
    }

    pub fn width(mut self, pct: u32) -> Self {
        self.width = Some(pct);
        self
    }

    pub fn span(mut self, columns: u32) -> Self {
        self.span = columns.max(1);
        self
    }

    pub fn shading(mut self, fill: impl Into<String>) -> Self {
        self.shading = Some(fill.into());
        self
    }

    pub fn margins(mut self, margins: CellMargins) -> Self {
        self.margins = Some(margins);
        self
    }

    pub fn v_center(mut self) -> Self {
        self.v_center = true;
        self
    }

    /// Text of every paragraph in the cell, joined by newlines.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.text()),
                Block::Table(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
