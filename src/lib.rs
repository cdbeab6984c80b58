/*!
 * # doctrans - resumable document translation
 *
 * A Rust library for translating structured documents paragraph by paragraph
 * through online translation engines.
 *
 * ## Features
 *
 * - Word (`.docx`) documents are rewritten in place, keeping formatting runs,
 *   tables and every untouched part of the package
 * - Translation engines:
 *   - MyMemory (free public API)
 *   - Magic Loops (user endpoint)
 *   - Google Cloud Translation
 *   - DeepL
 * - Word-bounded chunking for engines with request size limits
 * - Direct (per run) or proportional redistribution of translated text
 * - Page exclusion driven by rendered page-break markers
 * - Checkpointing after every paragraph so interrupted jobs resume
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Document model and the `.docx` / `.json` formats
 * - `translation`: Chunking, run distribution and the pipeline:
 *   - `translation::core`: Engine selection and request pacing
 *   - `translation::pipeline`: Resumable, page-aware orchestration
 * - `session`: Progress checkpoints
 * - `providers`: Clients for the supported translation engines
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod session;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::{Document, Paragraph, Run, TranslatableDocument};
pub use errors::{AppError, DocumentError, ProviderError};
pub use language_utils::{get_language_name, language_codes_match};
pub use session::CheckpointStore;
pub use translation::{
    CancellationToken, PipelineConfig, PipelineReport, TranslationJob, TranslationPipeline,
    TranslationService,
};
