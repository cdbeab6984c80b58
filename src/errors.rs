/*!
 * Error types for the doctrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when calling a translation engine
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The engine answered but reported that it could not translate
    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    /// The engine is missing required settings (endpoint, credentials)
    #[error("Engine not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether the failure means the service could not be reached at all
    pub fn is_service_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError(_) | Self::Timeout(_) | Self::RateLimitExceeded(_)
        )
    }
}

/// Errors raised while loading, translating or saving a document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The input path does not resolve to an existing file
    #[error("Document not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The input exists but could not be opened or parsed
    #[error("Failed to read document {}: {reason}", path.display())]
    ReadError { path: PathBuf, reason: String },

    /// No document format is registered for the file extension
    #[error("Unsupported document format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Saving the document or its checkpoint failed
    #[error("Failed to write {}: {reason}", path.display())]
    WriteError { path: PathBuf, reason: String },

    /// Translating a specific paragraph failed
    #[error("Failed to translate paragraph {paragraph}: {source}")]
    ParagraphTranslation {
        /// 1-based position in the flattened paragraph list
        paragraph: usize,
        #[source]
        source: ProviderError,
    },
}

impl DocumentError {
    pub(crate) fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ReadError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::WriteError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a translation engine
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document processing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
