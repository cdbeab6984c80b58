/*!
 * Document translation using external translation engines.
 *
 * This module is split into several submodules:
 *
 * - `core`: engine selection and request pacing (`TranslationService`)
 * - `chunking`: word-bounded splitting of text for size-limited engines
 * - `distribution`: writing translated text back into formatting runs
 * - `paragraph`: translation of a single paragraph in place
 * - `pipeline`: the resumable, page-aware document pipeline
 */

// Re-export main types for easier usage
pub use self::chunking::split_into_chunks;
pub use self::core::TranslationService;
pub use self::distribution::DistributionMode;
pub use self::paragraph::{ParagraphOutcome, ParagraphTranslator};
pub use self::pipeline::{
    CancellationToken, PipelineConfig, PipelineOutcome, PipelineReport, ProgressCallback,
    TranslationJob, TranslationPipeline,
};

// Submodules
pub mod chunking;
pub mod core;
pub mod distribution;
pub mod paragraph;
pub mod pipeline;
