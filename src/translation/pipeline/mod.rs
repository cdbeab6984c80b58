/*!
 * Resumable document translation pipeline.
 *
 * - `orchestrator`: job lifecycle, checkpointing, progress and cancellation
 * - `pages`: page counting from rendered page-break markers
 */

pub mod orchestrator;
pub mod pages;

// Re-export types used externally
pub use orchestrator::{
    CancellationToken, PipelineConfig, PipelineOutcome, PipelineReport, PipelineState,
    ProgressCallback, TranslationJob, TranslationPipeline,
};
pub use pages::{PageBreakTracker, PageResumePolicy};
