/*!
 * Page tracking over the flattened paragraph sequence.
 *
 * Pages are derived purely from rendered page-break markers stored in the
 * document. No layout is performed, so the count matches whatever the last
 * application that rendered the file saw.
 */

use serde::{Deserialize, Serialize};

use crate::document::Paragraph;

/// First page number
pub const FIRST_PAGE: u32 = 1;

/// How the page counter is restored when a job resumes from a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageResumePolicy {
    /// Re-derive the page by scanning the paragraphs before the checkpoint
    #[default]
    Replay,
    /// Restart counting at page 1 from the checkpoint
    Reset,
}

/// Running page counter fed one paragraph at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBreakTracker {
    page: u32,
}

impl Default for PageBreakTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PageBreakTracker {
    pub fn new() -> Self {
        Self { page: FIRST_PAGE }
    }

    /// Current page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page of `paragraph` given the page before it
    pub fn next_page(paragraph: &Paragraph, current_page: u32) -> u32 {
        if paragraph.has_page_break() {
            current_page + 1
        } else {
            current_page
        }
    }

    /// Advance past `paragraph` and return its page
    pub fn on_paragraph(&mut self, paragraph: &Paragraph) -> u32 {
        self.page = Self::next_page(paragraph, self.page);
        self.page
    }

    /// Feed every paragraph in order, returning the final page
    pub fn replay<'a>(&mut self, paragraphs: impl IntoIterator<Item = &'a Paragraph>) -> u32 {
        for paragraph in paragraphs {
            self.on_paragraph(paragraph);
        }
        self.page
    }
}
