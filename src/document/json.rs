use std::path::Path;

use crate::errors::DocumentError;
use crate::file_utils::FileManager;

use super::TranslatableDocument;
use super::model::Document;

/// Document stored as the JSON form of the model
#[derive(Debug, Clone)]
pub struct JsonDocument {
    document: Document,
}

impl JsonDocument {
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|e| DocumentError::read(path, e))?;
        let document: Document =
            serde_json::from_str(&content).map_err(|e| DocumentError::read(path, e))?;
        Ok(Self { document })
    }
}

impl TranslatableDocument for JsonDocument {
    fn content(&self) -> &Document {
        &self.document
    }

    fn content_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let json = serde_json::to_string_pretty(&self.document)
            .map_err(|e| DocumentError::write(path, e))?;
        FileManager::write_atomically(path, json.as_bytes())
            .map_err(|e| DocumentError::write(path, format!("{:#}", e)))
    }
}
