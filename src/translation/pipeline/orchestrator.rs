/*!
 * Pipeline orchestrator for resumable document translation.
 *
 * The orchestrator drives one job from start to finish:
 * 1. Loading: open the document (or the partial output of an earlier run),
 *    flatten it and restore the checkpoint and page counter
 * 2. Running: translate paragraphs one at a time in flattened order,
 *    skipping excluded pages and persisting progress after each step
 * 3. Completion: save the output and drop the checkpoint
 *
 * A failure saves what has been done so far, so the next run of the same job
 * continues after the last paragraph that made it to disk.
 */

use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::document::{self, DocumentKind, ParagraphLocation, TranslatableDocument};
use crate::errors::DocumentError;
use crate::providers::Provider;
use crate::session::CheckpointStore;
use crate::translation::distribution::DistributionMode;
use crate::translation::paragraph::{ParagraphOutcome, ParagraphTranslator};

use super::pages::{PageBreakTracker, PageResumePolicy};

/// Receives `(paragraphs_done, total_paragraphs)` after each processed paragraph
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Configuration for the translation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Largest chunk sent to the engine in one request
    pub max_chunk_chars: usize,

    /// How translations are written back into runs
    pub distribution: DistributionMode,

    /// How the page counter is restored on resume
    pub page_resume: PageResumePolicy,

    /// Save the output every N translated paragraphs (0 saves only at the end)
    pub autosave_interval: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 5000,
            distribution: DistributionMode::default(),
            page_resume: PageResumePolicy::default(),
            autosave_interval: 1,
        }
    }
}

impl PipelineConfig {
    /// Derive the pipeline settings from the application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_chunk_chars: config.translation.get_max_chars_per_request(),
            distribution: config.document.distribution,
            page_resume: config.document.page_resume,
            autosave_interval: config.document.autosave_interval,
        }
    }

    pub fn with_max_chunk_chars(mut self, max_chunk_chars: usize) -> Self {
        self.max_chunk_chars = max_chunk_chars;
        self
    }

    pub fn with_distribution(mut self, distribution: DistributionMode) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn with_page_resume(mut self, page_resume: PageResumePolicy) -> Self {
        self.page_resume = page_resume;
        self
    }

    pub fn with_autosave_interval(mut self, autosave_interval: usize) -> Self {
        self.autosave_interval = autosave_interval;
        self
    }
}

/// One document to translate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub source_language: String,
    pub target_language: String,
    /// 1-based pages left untranslated
    pub skip_pages: BTreeSet<u32>,
}

impl TranslationJob {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            skip_pages: BTreeSet::new(),
        }
    }

    pub fn with_skip_pages(mut self, pages: impl IntoIterator<Item = u32>) -> Self {
        self.skip_pages = pages.into_iter().collect();
        self
    }

    /// Checkpoint store for this job's output
    pub fn checkpoint(&self) -> CheckpointStore {
        CheckpointStore::for_output(&self.output_path)
    }
}

/// Cooperative cancellation flag shared between caller and pipeline
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the pipeline to stop before the next paragraph
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lifecycle of one `process` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Loading,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Loading)
                | (Loading, Running)
                | (Loading, Failed)
                | (Running, Completed)
                | (Running, Cancelled)
                | (Running, Failed)
        )
    }
}

/// How a `process` call ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every paragraph processed, output saved, checkpoint removed
    Completed,
    /// Stopped on request; output saved and checkpoint kept
    Cancelled,
}

/// Summary of a `process` call
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub outcome: PipelineOutcome,
    /// Size of the flattened paragraph list
    pub total_paragraphs: usize,
    /// Index the run started at (0 for a fresh run)
    pub resumed_from: usize,
    /// Paragraphs whose runs were rewritten
    pub translated: usize,
    /// Paragraphs left alone because their page is excluded
    pub skipped_pages: usize,
    /// Paragraphs with nothing to translate
    pub blank: usize,
    /// Engine requests issued
    pub requests: usize,
    /// Page of the last paragraph visited
    pub last_page: u32,
    pub duration: Duration,
}

impl PipelineReport {
    fn new(total_paragraphs: usize, resumed_from: usize) -> Self {
        Self {
            outcome: PipelineOutcome::Completed,
            total_paragraphs,
            resumed_from,
            translated: 0,
            skipped_pages: 0,
            blank: 0,
            requests: 0,
            last_page: PageBreakTracker::new().page(),
            duration: Duration::ZERO,
        }
    }

    /// Get a summary of the run.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "{} translated, {} skipped, {} blank of {} paragraphs",
            self.translated, self.skipped_pages, self.blank, self.total_paragraphs
        )];
        if self.resumed_from > 0 {
            parts.push(format!("resumed at paragraph {}", self.resumed_from + 1));
        }
        parts.push(format!("{} requests", self.requests));
        parts.push(format!("{:.2}s", self.duration.as_secs_f32()));
        parts.join(" | ")
    }
}

/// Everything `process` needs once loading succeeded
struct LoadedJob {
    document: Box<dyn TranslatableDocument>,
    locations: Vec<ParagraphLocation>,
    start: usize,
    tracker: PageBreakTracker,
    checkpoint: CheckpointStore,
}

/// The resumable translation pipeline.
#[derive(Debug)]
pub struct TranslationPipeline<P: Provider> {
    config: PipelineConfig,
    provider: P,
}

impl<P: Provider> TranslationPipeline<P> {
    /// Create a new pipeline with the given configuration.
    pub fn new(config: PipelineConfig, provider: P) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Translate `job`, resuming from its checkpoint when one exists
    pub async fn process(
        &self,
        job: &TranslationJob,
        progress: Option<ProgressCallback>,
        cancel: Option<CancellationToken>,
    ) -> Result<PipelineReport, DocumentError> {
        let started = Instant::now();
        let mut state = PipelineState::Idle;

        transition(&mut state, PipelineState::Loading);
        let loaded = match self.load(job) {
            Ok(loaded) => loaded,
            Err(e) => {
                transition(&mut state, PipelineState::Failed);
                return Err(e);
            }
        };

        transition(&mut state, PipelineState::Running);
        let result = self.run(job, loaded, progress, cancel).await;

        match &result {
            Ok(report) if report.outcome == PipelineOutcome::Cancelled => {
                transition(&mut state, PipelineState::Cancelled)
            }
            Ok(_) => transition(&mut state, PipelineState::Completed),
            Err(_) => transition(&mut state, PipelineState::Failed),
        }

        result.map(|mut report| {
            report.duration = started.elapsed();
            report
        })
    }

    fn load(&self, job: &TranslationJob) -> Result<LoadedJob, DocumentError> {
        if !job.input_path.is_file() {
            return Err(DocumentError::NotFound {
                path: job.input_path.clone(),
            });
        }

        let input_kind = DocumentKind::from_path(&job.input_path);
        if input_kind.is_none() || input_kind != DocumentKind::from_path(&job.output_path) {
            return Err(DocumentError::UnsupportedFormat {
                path: job.output_path.clone(),
            });
        }

        let checkpoint = job.checkpoint();
        let mut start = checkpoint.load();

        let mut document = if start > 0 && job.output_path.is_file() {
            document::open(&job.output_path)?
        } else {
            if start > 0 {
                warn!(
                    "Checkpoint {:?} points at paragraph {} but {:?} is missing, starting over",
                    checkpoint.path(),
                    start + 1,
                    job.output_path
                );
                start = 0;
            }
            document::open(&job.input_path)?
        };

        let mut locations = document.content().flatten();
        if start > locations.len() {
            warn!(
                "Checkpoint {} is beyond the {} paragraphs of {:?}, starting over",
                start,
                locations.len(),
                job.output_path
            );
            start = 0;
            document = document::open(&job.input_path)?;
            locations = document.content().flatten();
        }

        let mut tracker = PageBreakTracker::new();
        if start > 0 {
            info!(
                "Resuming {:?} at paragraph {}/{}",
                job.output_path,
                start + 1,
                locations.len()
            );
            if self.config.page_resume == PageResumePolicy::Replay {
                let content = document.content();
                let page = tracker.replay(
                    locations[..start]
                        .iter()
                        .filter_map(|location| content.paragraph(*location)),
                );
                debug!("Page counter restored to {}", page);
            }
        }

        Ok(LoadedJob {
            document,
            locations,
            start,
            tracker,
            checkpoint,
        })
    }

    async fn run(
        &self,
        job: &TranslationJob,
        loaded: LoadedJob,
        progress: Option<ProgressCallback>,
        cancel: Option<CancellationToken>,
    ) -> Result<PipelineReport, DocumentError> {
        let LoadedJob {
            mut document,
            locations,
            start,
            mut tracker,
            checkpoint,
        } = loaded;

        let total = locations.len();
        let translator = ParagraphTranslator::new(
            &self.provider,
            self.config.max_chunk_chars,
            self.config.distribution,
        );
        let mut report = PipelineReport::new(total, start);

        // Translated paragraphs not yet written to the output. The checkpoint
        // only advances while this is zero so it never runs ahead of the file.
        let mut unsaved = 0usize;

        for (index, location) in locations.iter().enumerate().skip(start) {
            if cancel.as_ref().is_some_and(|token| token.is_cancelled()) {
                info!("Cancelled before paragraph {}/{}", index + 1, total);
                document.save(&job.output_path)?;
                checkpoint.save(index)?;
                report.outcome = PipelineOutcome::Cancelled;
                return Ok(report);
            }

            let paragraph = document
                .content_mut()
                .paragraph_mut(*location)
                .ok_or_else(|| {
                    DocumentError::read(&job.input_path, format!("paragraph {} is missing", index + 1))
                })?;

            let page = tracker.on_paragraph(paragraph);
            report.last_page = page;

            if job.skip_pages.contains(&page) {
                debug!("Skipping paragraph {} on page {}", index + 1, page);
                report.skipped_pages += 1;
                if unsaved == 0 {
                    checkpoint.save(index + 1)?;
                }
                continue;
            }

            match translator
                .translate(paragraph, &job.source_language, &job.target_language)
                .await
            {
                Ok(ParagraphOutcome::Blank) => {
                    report.blank += 1;
                    if unsaved == 0 {
                        checkpoint.save(index + 1)?;
                    }
                }
                Ok(ParagraphOutcome::Translated { requests }) => {
                    report.translated += 1;
                    report.requests += requests;
                    unsaved += 1;

                    if self.config.autosave_interval > 0 && unsaved >= self.config.autosave_interval {
                        document.save(&job.output_path)?;
                        unsaved = 0;
                        checkpoint.save(index + 1)?;
                    }
                }
                Err(source) => {
                    warn!(
                        "Paragraph {}/{} failed, saving progress: {}",
                        index + 1,
                        total,
                        source
                    );
                    save_partial(document.as_ref(), job, &checkpoint, index);
                    return Err(DocumentError::ParagraphTranslation {
                        paragraph: index + 1,
                        source,
                    });
                }
            }

            if let Some(callback) = &progress {
                callback(index + 1, total);
            }
        }

        document.save(&job.output_path)?;
        if let Err(e) = checkpoint.delete() {
            warn!("Translation finished but the checkpoint was not removed: {}", e);
        }
        info!("Finished {:?}: {}", job.output_path, report.summary());

        Ok(report)
    }
}

/// Best-effort save after a paragraph failure
///
/// The checkpoint is only moved when the document itself was saved.
fn save_partial(
    document: &dyn TranslatableDocument,
    job: &TranslationJob,
    checkpoint: &CheckpointStore,
    index: usize,
) {
    if let Err(e) = document.save(&job.output_path) {
        warn!("Could not save partial output: {}", e);
        return;
    }
    if let Err(e) = checkpoint.save(index) {
        warn!("Could not save checkpoint: {}", e);
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid pipeline transition {:?} -> {:?}",
        state,
        next
    );
    debug!("Pipeline {:?} -> {:?}", state, next);
    *state = next;
}
