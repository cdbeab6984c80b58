/*!
 * Side-car progress checkpoint.
 *
 * A checkpoint is a plain text file next to the output document holding the
 * decimal index of the next paragraph to process. It exists only while a job
 * is unfinished.
 */

use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::errors::DocumentError;
use crate::file_utils::FileManager;

/// Suffix appended to the output path
pub const CHECKPOINT_SUFFIX: &str = ".checkpoint";

/// Checkpoint file bound to one output document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Store at an explicit checkpoint path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for the checkpoint of `output`
    pub fn for_output(output: &Path) -> Self {
        Self::new(Self::path_for(output))
    }

    /// `<output>.checkpoint`
    pub fn path_for(output: &Path) -> PathBuf {
        let mut path = output.as_os_str().to_owned();
        path.push(CHECKPOINT_SUFFIX);
        PathBuf::from(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        FileManager::file_exists(&self.path)
    }

    /// Next paragraph index, or 0 when the file is absent or unreadable
    pub fn load(&self) -> usize {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(e) => {
                warn!("Ignoring unreadable checkpoint {:?}: {}", self.path, e);
                return 0;
            }
        };

        match content.trim().parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                warn!("Ignoring corrupt checkpoint {:?}: {:?}", self.path, content.trim());
                0
            }
        }
    }

    /// Persist `index` as the whole file content
    pub fn save(&self, index: usize) -> Result<(), DocumentError> {
        FileManager::write_atomically(&self.path, index.to_string().as_bytes())
            .map_err(|e| DocumentError::write(&self.path, format!("{:#}", e)))?;
        debug!("Checkpoint {:?} -> {}", self.path, index);
        Ok(())
    }

    /// Remove the checkpoint; a missing file is not an error
    pub fn delete(&self) -> Result<(), DocumentError> {
        FileManager::remove_if_exists(&self.path)
            .map(|_| ())
            .map_err(|e| DocumentError::write(&self.path, format!("{:#}", e)))
    }
}
