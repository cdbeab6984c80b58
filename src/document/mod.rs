/*!
 * Document formats understood by the translation pipeline.
 *
 * - `model`: format independent paragraphs, runs and tables
 * - `docx`: WordprocessingML packages (`.docx`)
 * - `json`: serde representation of the model (`.json`)
 */

use std::path::Path;

use crate::errors::DocumentError;

pub mod docx;
pub mod json;
pub mod model;

pub use self::docx::DocxDocument;
pub use self::json::JsonDocument;
pub use self::model::{Document, Paragraph, ParagraphLocation, Run, Table, TableCell, TableRow};

/// An opened document that the pipeline can mutate and save
pub trait TranslatableDocument: Send {
    /// Read-only view of the structure
    fn content(&self) -> &Document;

    /// Mutable view used to rewrite run text
    fn content_mut(&mut self) -> &mut Document;

    /// Write the document, including every run text change, to `path`
    fn save(&self, path: &Path) -> Result<(), DocumentError>;
}

/// Supported document formats, selected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    Json,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_string_lossy().to_lowercase();
        match extension.as_str() {
            "docx" => Some(Self::Docx),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Json => "json",
        }
    }

    /// Open a document of this kind
    pub fn open(&self, path: &Path) -> Result<Box<dyn TranslatableDocument>, DocumentError> {
        match self {
            Self::Docx => Ok(Box::new(DocxDocument::open(path)?)),
            Self::Json => Ok(Box::new(JsonDocument::open(path)?)),
        }
    }
}

/// Open any supported document, choosing the format from its extension
pub fn open(path: &Path) -> Result<Box<dyn TranslatableDocument>, DocumentError> {
    if !path.is_file() {
        return Err(DocumentError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let kind = DocumentKind::from_path(path).ok_or_else(|| DocumentError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    kind.open(path)
}
