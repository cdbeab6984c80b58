/*!
 * In-memory document model shared by every document format.
 *
 * A document is an ordered list of body paragraphs followed by an ordered
 * list of tables. Each paragraph is a sequence of runs, the smallest spans of
 * independently formatted text. Formats only expose run text and the
 * page-break marker; styling stays in the format-specific representation.
 */

use serde::{Deserialize, Serialize};

/// Smallest independently formatted span of text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Text content of the run
    pub text: String,

    /// Whether the run carries a rendered page-break marker
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub page_break: bool,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page_break: false,
        }
    }

    /// Create a run that starts a new rendered page
    pub fn with_page_break(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page_break: true,
        }
    }
}

/// Ordered sequence of runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { runs }
    }

    /// Paragraph made of a single run
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![Run::new(text)])
    }

    /// Concatenation of all run texts
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Whether the paragraph has nothing to translate
    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// Whether any run carries a page-break marker
    pub fn has_page_break(&self) -> bool {
        self.runs.iter().any(|r| r.page_break)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

/// Position of a paragraph inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphLocation {
    /// Top-level paragraph of the document body
    Body(usize),
    /// Paragraph inside a table cell
    Cell {
        table: usize,
        row: usize,
        cell: usize,
        paragraph: usize,
    },
}

/// Structured document: body paragraphs plus tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,

    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Document {
    /// Every paragraph location in translation order
    ///
    /// Body paragraphs come first, then table paragraphs in table, row, cell
    /// order. Checkpoints index into this list, so the order must never
    /// depend on anything but the document structure.
    pub fn flatten(&self) -> Vec<ParagraphLocation> {
        let body = (0..self.paragraphs.len()).map(ParagraphLocation::Body);

        let cells = self.tables.iter().enumerate().flat_map(|(t, table)| {
            table.rows.iter().enumerate().flat_map(move |(r, row)| {
                row.cells.iter().enumerate().flat_map(move |(c, cell)| {
                    (0..cell.paragraphs.len()).map(move |p| ParagraphLocation::Cell {
                        table: t,
                        row: r,
                        cell: c,
                        paragraph: p,
                    })
                })
            })
        });

        body.chain(cells).collect()
    }

    /// Total number of translatable paragraphs
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
            + self
                .tables
                .iter()
                .flat_map(|t| &t.rows)
                .flat_map(|r| &r.cells)
                .map(|c| c.paragraphs.len())
                .sum::<usize>()
    }

    pub fn paragraph(&self, location: ParagraphLocation) -> Option<&Paragraph> {
        match location {
            ParagraphLocation::Body(index) => self.paragraphs.get(index),
            ParagraphLocation::Cell {
                table,
                row,
                cell,
                paragraph,
            } => self
                .tables
                .get(table)?
                .rows
                .get(row)?
                .cells
                .get(cell)?
                .paragraphs
                .get(paragraph),
        }
    }

    pub fn paragraph_mut(&mut self, location: ParagraphLocation) -> Option<&mut Paragraph> {
        match location {
            ParagraphLocation::Body(index) => self.paragraphs.get_mut(index),
            ParagraphLocation::Cell {
                table,
                row,
                cell,
                paragraph,
            } => self
                .tables
                .get_mut(table)?
                .rows
                .get_mut(row)?
                .cells
                .get_mut(cell)?
                .paragraphs
                .get_mut(paragraph),
        }
    }
}
