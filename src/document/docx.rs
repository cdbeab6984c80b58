/*!
 * WordprocessingML (`.docx`) support.
 *
 * The main document part is kept as a quick-xml event stream. Parsing records
 * where every run and every `w:t` element sits in that stream, and saving
 * replaces only the text of runs whose content changed. All other markup
 * (styles, properties, drawings, fields) is written back untouched and all
 * other package entries are copied without recompression.
 */

use anyhow::{Context, Result, anyhow};
use log::debug;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::DocumentError;
use crate::file_utils::FileManager;

use super::TranslatableDocument;
use super::model::{Document, Paragraph, ParagraphLocation, Run, Table, TableCell, TableRow};

/// Zip entry holding the document body
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Location of one `w:t` element in the event stream
#[derive(Debug, Clone, PartialEq)]
enum TextSlot {
    /// `<w:t>..</w:t>` with the indices of its text events
    Element { start: usize, texts: Vec<usize> },
    /// Self-closing `<w:t/>`
    Empty(usize),
}

/// Location of one run in the event stream
#[derive(Debug, Clone)]
struct RunSpan {
    /// Index of the `w:r` start (or empty) event
    open: usize,
    /// Index of the `w:r` end event, `None` for `<w:r/>`
    close: Option<usize>,
    slots: Vec<TextSlot>,
    /// Self-closing `w:tab`, `w:br` and `w:cr` events folded into the text
    controls: Vec<usize>,
    /// Text as read from the package
    original: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Body,
    Table(usize),
    Row(usize, usize),
    Cell(usize, usize, usize),
    Paragraph,
    Run,
    Text,
    Other,
}

/// Builds the model and the run index while the part is being read
#[derive(Default)]
struct PartIndexer {
    stack: Vec<Frame>,
    document: Document,
    spans: Vec<(ParagraphLocation, Vec<RunSpan>)>,
}

impl PartIndexer {
    fn open(&mut self, index: usize, element: &BytesStart, self_closing: bool) {
        let parent = self.stack.last().copied();
        let in_run = self.stack.contains(&Frame::Run);

        let frame = match (parent, element.name().as_ref()) {
            (_, b"w:body") => Frame::Body,
            (Some(Frame::Body), b"w:p") => {
                self.document.paragraphs.push(Paragraph::default());
                let location = ParagraphLocation::Body(self.document.paragraphs.len() - 1);
                self.spans.push((location, Vec::new()));
                Frame::Paragraph
            }
            (Some(Frame::Body), b"w:tbl") => {
                self.document.tables.push(Table::default());
                Frame::Table(self.document.tables.len() - 1)
            }
            (Some(Frame::Table(t)), b"w:tr") => {
                let rows = &mut self.document.tables[t].rows;
                rows.push(TableRow::default());
                Frame::Row(t, rows.len() - 1)
            }
            (Some(Frame::Row(t, r)), b"w:tc") => {
                let cells = &mut self.document.tables[t].rows[r].cells;
                cells.push(TableCell::default());
                Frame::Cell(t, r, cells.len() - 1)
            }
            (Some(Frame::Cell(t, r, c)), b"w:p") => {
                let paragraphs = &mut self.document.tables[t].rows[r].cells[c].paragraphs;
                paragraphs.push(Paragraph::default());
                let location = ParagraphLocation::Cell {
                    table: t,
                    row: r,
                    cell: c,
                    paragraph: paragraphs.len() - 1,
                };
                self.spans.push((location, Vec::new()));
                Frame::Paragraph
            }
            (Some(Frame::Paragraph), b"w:r") => {
                if let Some(paragraph) = self.current_paragraph_mut() {
                    paragraph.runs.push(Run::default());
                }
                if let Some((_, runs)) = self.spans.last_mut() {
                    runs.push(RunSpan {
                        open: index,
                        close: None,
                        slots: Vec::new(),
                        controls: Vec::new(),
                        original: String::new(),
                    });
                }
                Frame::Run
            }
            (Some(Frame::Run), b"w:t") => {
                let slot = if self_closing {
                    TextSlot::Empty(index)
                } else {
                    TextSlot::Element {
                        start: index,
                        texts: Vec::new(),
                    }
                };
                if let Some(span) = self.current_span_mut() {
                    span.slots.push(slot);
                }
                Frame::Text
            }
            (Some(Frame::Run), b"w:tab") if self_closing => {
                self.control(index, '\t');
                Frame::Other
            }
            (Some(Frame::Run), b"w:br" | b"w:cr") if self_closing && !is_page_break(element) => {
                self.control(index, '\n');
                Frame::Other
            }
            (_, b"w:lastRenderedPageBreak") if in_run => {
                self.mark_page_break();
                Frame::Other
            }
            (_, b"w:br") if in_run && is_page_break(element) => {
                self.mark_page_break();
                Frame::Other
            }
            _ => Frame::Other,
        };

        if !self_closing {
            self.stack.push(frame);
        }
    }

    fn close(&mut self, index: usize) {
        if self.stack.pop() == Some(Frame::Run) {
            if let Some(span) = self.current_span_mut() {
                span.close = Some(index);
            }
        }
    }

    fn text(&mut self, index: usize, value: &str) {
        if self.stack.last() != Some(&Frame::Text) {
            return;
        }

        if let Some(span) = self.current_span_mut() {
            if let Some(TextSlot::Element { texts, .. }) = span.slots.last_mut() {
                texts.push(index);
            }
            span.original.push_str(value);
        }
        if let Some(run) = self.current_paragraph_mut().and_then(|p| p.runs.last_mut()) {
            run.text.push_str(value);
        }
    }

    /// Tabs and line breaks inside a run read as `\t` and `\n`
    fn control(&mut self, index: usize, value: char) {
        if let Some(span) = self.current_span_mut() {
            span.controls.push(index);
            span.original.push(value);
        }
        if let Some(run) = self.current_paragraph_mut().and_then(|p| p.runs.last_mut()) {
            run.text.push(value);
        }
    }

    fn mark_page_break(&mut self) {
        if let Some(run) = self.current_paragraph_mut().and_then(|p| p.runs.last_mut()) {
            run.page_break = true;
        }
    }

    fn current_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        let location = self.spans.last()?.0;
        self.document.paragraph_mut(location)
    }

    fn current_span_mut(&mut self) -> Option<&mut RunSpan> {
        self.spans.last_mut()?.1.last_mut()
    }
}

fn is_page_break(element: &BytesStart) -> bool {
    element
        .try_get_attribute("w:type")
        .ok()
        .flatten()
        .is_some_and(|attr| attr.value.as_ref() == b"page")
}

fn preserved_text_start() -> Event<'static> {
    Event::Start(BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]))
}

fn text_event(value: &str) -> Event<'static> {
    Event::Text(BytesText::new(value).into_owned())
}

/// Text for the inside of an open `w:t`
///
/// Tabs and newlines close the element, emit `<w:tab/>` or `<w:br/>` and
/// open a new `w:t`, so the caller still closes exactly one element.
fn text_content(value: &str) -> Vec<Event<'static>> {
    let mut events = Vec::new();
    let mut segment = String::new();

    for c in value.chars() {
        let control = match c {
            '\t' => "w:tab",
            '\n' => "w:br",
            _ => {
                segment.push(c);
                continue;
            }
        };
        events.push(text_event(&segment));
        segment.clear();
        events.push(Event::End(BytesEnd::new("w:t")));
        events.push(Event::Empty(BytesStart::new(control)));
        events.push(preserved_text_start());
    }
    events.push(text_event(&segment));
    events
}

fn text_element(value: &str) -> Vec<Event<'static>> {
    let mut events = vec![preserved_text_start()];
    events.extend(text_content(value));
    events.push(Event::End(BytesEnd::new("w:t")));
    events
}

impl RunSpan {
    /// Record the event replacements that give this run the text `value`
    ///
    /// The first `w:t` receives the whole value and any further `w:t` in
    /// the run is emptied. A run without `w:t` gets one appended. Tab and
    /// break elements are dropped and rebuilt from the value.
    fn plan_edits(
        &self,
        value: &str,
        events: &[Event<'static>],
        edits: &mut HashMap<usize, Vec<Event<'static>>>,
    ) {
        for control in &self.controls {
            edits.insert(*control, Vec::new());
        }

        if self.slots.is_empty() {
            if value.is_empty() {
                return;
            }
            match self.close {
                Some(close) => {
                    let mut replacement = text_element(value);
                    replacement.push(events[close].clone());
                    edits.insert(close, replacement);
                }
                None => {
                    if let Event::Empty(run) = &events[self.open] {
                        let mut replacement = vec![Event::Start(run.clone())];
                        replacement.extend(text_element(value));
                        replacement.push(Event::End(BytesEnd::new("w:r")));
                        edits.insert(self.open, replacement);
                    }
                }
            }
            return;
        }

        for (position, slot) in self.slots.iter().enumerate() {
            let slot_value = if position == 0 { value } else { "" };
            match slot {
                TextSlot::Element { start, texts } => match texts.split_first() {
                    Some((first, rest)) => {
                        edits.insert(*start, vec![preserved_text_start()]);
                        edits.insert(*first, text_content(slot_value));
                        for extra in rest {
                            edits.insert(*extra, Vec::new());
                        }
                    }
                    None => {
                        let mut replacement = vec![preserved_text_start()];
                        replacement.extend(text_content(slot_value));
                        edits.insert(*start, replacement);
                    }
                },
                TextSlot::Empty(index) => {
                    edits.insert(*index, text_element(slot_value));
                }
            }
        }
    }
}

/// An opened `.docx` package
pub struct DocxDocument {
    package: Vec<u8>,
    events: Vec<Event<'static>>,
    spans: Vec<(ParagraphLocation, Vec<RunSpan>)>,
    document: Document,
}

impl std::fmt::Debug for DocxDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxDocument")
            .field("package_bytes", &self.package.len())
            .field("events", &self.events.len())
            .field("paragraphs", &self.spans.len())
            .finish()
    }
}

impl DocxDocument {
    /// Open a `.docx` file
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let package = std::fs::read(path).map_err(|e| DocumentError::read(path, e))?;
        Self::from_package(package).map_err(|e| DocumentError::read(path, format!("{:#}", e)))
    }

    /// Parse a `.docx` package held in memory
    pub fn from_package(package: Vec<u8>) -> Result<Self> {
        let xml = {
            let mut archive = ZipArchive::new(Cursor::new(package.as_slice()))
                .context("Not a valid zip package")?;
            let mut entry = archive
                .by_name(DOCUMENT_PART)
                .with_context(|| format!("Package has no {}", DOCUMENT_PART))?;
            let mut xml = String::new();
            entry
                .read_to_string(&mut xml)
                .with_context(|| format!("Failed to read {}", DOCUMENT_PART))?;
            xml
        };

        let mut reader = Reader::from_str(&xml);
        let mut indexer = PartIndexer::default();
        let mut events = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| anyhow!("Malformed {}: {}", DOCUMENT_PART, e))?;
            let index = events.len();

            match &event {
                Event::Eof => break,
                Event::Start(element) => indexer.open(index, element, false),
                Event::Empty(element) => indexer.open(index, element, true),
                Event::End(_) => indexer.close(index),
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|e| anyhow!("Invalid text in {}: {}", DOCUMENT_PART, e))?;
                    indexer.text(index, &value);
                }
                Event::CData(data) => indexer.text(index, &String::from_utf8_lossy(data)),
                _ => {}
            }

            events.push(event.into_owned());
        }

        debug!(
            "Parsed {}: {} events, {} paragraphs, {} tables",
            DOCUMENT_PART,
            events.len(),
            indexer.document.paragraph_count(),
            indexer.document.tables.len()
        );

        Ok(Self {
            package,
            events,
            spans: indexer.spans,
            document: indexer.document,
        })
    }

    /// Serialize the main document part with the current run texts
    pub fn render_document_xml(&self) -> Result<Vec<u8>> {
        let mut edits: HashMap<usize, Vec<Event<'static>>> = HashMap::new();

        for (location, runs) in &self.spans {
            let Some(paragraph) = self.document.paragraph(*location) else {
                continue;
            };
            for (span, run) in runs.iter().zip(&paragraph.runs) {
                if run.text != span.original {
                    span.plan_edits(&run.text, &self.events, &mut edits);
                }
            }
        }

        let mut writer = Writer::new(Vec::with_capacity(self.package.len()));
        for (index, event) in self.events.iter().enumerate() {
            match edits.get(&index) {
                Some(replacement) => {
                    for edit in replacement {
                        writer
                            .write_event(edit.borrow())
                            .map_err(|e| anyhow!("Failed to write XML: {}", e))?;
                    }
                }
                None => writer
                    .write_event(event.borrow())
                    .map_err(|e| anyhow!("Failed to write XML: {}", e))?,
            }
        }

        Ok(writer.into_inner())
    }

    /// Build the full package with the rewritten document part
    pub fn to_package(&self) -> Result<Vec<u8>> {
        let xml = self.render_document_xml()?;
        let mut archive = ZipArchive::new(Cursor::new(self.package.as_slice()))
            .context("Not a valid zip package")?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(self.package.len())));

        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index)?;
            if entry.name() == DOCUMENT_PART {
                drop(entry);
                writer.start_file(
                    DOCUMENT_PART,
                    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
                )?;
                writer.write_all(&xml)?;
            } else {
                writer.raw_copy_file(entry)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}

impl TranslatableDocument for DocxDocument {
    fn content(&self) -> &Document {
        &self.document
    }

    fn content_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let package = self
            .to_package()
            .map_err(|e| DocumentError::write(path, format!("{:#}", e)))?;
        FileManager::write_atomically(path, &package)
            .map_err(|e| DocumentError::write(path, format!("{:#}", e)))
    }
}
