use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::document::DocumentKind;
use crate::errors::DocumentError;
use crate::file_utils::FileManager;
use crate::providers::Provider;
use crate::translation::TranslationService;
use crate::translation::pipeline::{
    CancellationToken, PipelineConfig, PipelineOutcome, PipelineReport, ProgressCallback,
    TranslationJob, TranslationPipeline,
};

// @module: Application controller for document translation

/// Extensions picked up when translating a folder
pub const SUPPORTED_EXTENSIONS: &[&str] = &["docx", "json"];

/// What happened to one input file
#[derive(Debug, Clone)]
pub enum FileStatus {
    /// The pipeline ran to completion
    Translated(PipelineReport),
    /// The pipeline stopped on request; the checkpoint allows a resume
    Cancelled(PipelineReport),
    /// The output already exists and no resume was pending
    Skipped,
}

/// Counts for a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Engine override (tests, embedding)
    provider: Option<Arc<dyn Provider>>,

    // @field: Shared cancellation flag
    cancel: CancellationToken,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            provider: None,
            cancel: CancellationToken::new(),
        })
    }

    // @method: Create a controller that uses `provider` instead of the configured engine
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Result<Self> {
        let mut controller = Self::with_config(config)?;
        controller.provider = Some(provider);
        Ok(controller)
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_language.is_empty()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token that stops the current and any following file
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn provider(&self) -> Result<Arc<dyn Provider>> {
        if let Some(provider) = &self.provider {
            return Ok(Arc::clone(provider));
        }
        let service = TranslationService::new(self.config.translation.clone())
            .context("Failed to create translation service")?;
        Ok(Arc::new(service))
    }

    /// Default output path: `<stem>.<target>.<ext>` next to the input
    pub fn default_output_path(&self, input_file: &Path) -> Result<PathBuf> {
        let kind = DocumentKind::from_path(input_file)
            .ok_or_else(|| anyhow!("Unsupported document format: {:?}", input_file))?;
        let output_dir = input_file.parent().unwrap_or_else(|| Path::new(""));
        Ok(FileManager::generate_output_path(
            input_file,
            output_dir,
            &self.config.target_language,
            kind.extension(),
        ))
    }

    /// Job for `input_file` using the configured languages and skip pages
    pub fn build_job(&self, input_file: &Path, output_path: &Path) -> TranslationJob {
        TranslationJob::new(
            input_file,
            output_path,
            &self.config.source_language,
            &self.config.target_language,
        )
        .with_skip_pages(self.config.document.skip_page_set())
    }

    /// Translate one document
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_path: Option<PathBuf>,
        force_overwrite: bool,
        restart: bool,
    ) -> Result<FileStatus> {
        let multi_progress = MultiProgress::new();
        let provider = self.provider()?;
        self.run_with_progress(&input_file, output_path, force_overwrite, restart, provider, &multi_progress)
            .await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_path: Option<PathBuf>,
        force_overwrite: bool,
        restart: bool,
        provider: Arc<dyn Provider>,
        multi_progress: &MultiProgress,
    ) -> Result<FileStatus> {
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = match output_path {
            Some(path) => path,
            None => self.default_output_path(input_file)?,
        };
        let job = self.build_job(input_file, &output_path);
        let checkpoint = job.checkpoint();

        // A pending checkpoint marks the output as ours to finish or redo
        if output_path.exists() && !checkpoint.exists() && !force_overwrite {
            warn!(
                "Skipping {:?}, translation already exists (use -f to force overwrite)",
                input_file
            );
            return Ok(FileStatus::Skipped);
        }

        if restart && checkpoint.exists() {
            info!("Discarding checkpoint {:?}", checkpoint.path());
            checkpoint.delete()?;
        }

        info!(
            "Translating {:?} -> {:?} with {} ({} -> {})",
            input_file,
            output_path,
            provider.name(),
            self.config.source_language,
            self.config.target_language
        );

        let progress_bar = multi_progress.add(ProgressBar::new(0));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} paragraphs ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        let pb = progress_bar.clone();
        let on_progress: ProgressCallback = Arc::new(move |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        });

        // Ctrl-C asks the pipeline to stop after the current paragraph
        let cancel = self.cancel.clone();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping after the current paragraph");
                    cancel.cancel();
                }
            })
        };

        let pipeline = TranslationPipeline::new(PipelineConfig::from_config(&self.config), provider);
        let worker = tokio::spawn(async move { pipeline.process(&job, Some(on_progress), Some(cancel)).await });
        let result = worker.await;

        interrupt.abort();
        progress_bar.finish_and_clear();

        let report = result.context("Translation task panicked")??;

        match report.outcome {
            PipelineOutcome::Completed => {
                info!(
                    "Success: {} ({}; {})",
                    output_path.display(),
                    report.summary(),
                    Self::format_duration(start_time.elapsed())
                );
                Ok(FileStatus::Translated(report))
            }
            PipelineOutcome::Cancelled => {
                warn!(
                    "Stopped at paragraph {}/{}; run again to resume",
                    report.resumed_from + report.translated + report.skipped_pages + report.blank + 1,
                    report.total_paragraphs
                );
                Ok(FileStatus::Cancelled(report))
            }
        }
    }

    /// Translate every supported document below `input_dir`
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        force_overwrite: bool,
        restart: bool,
    ) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let documents: Vec<PathBuf> = FileManager::find_files(&input_dir, SUPPORTED_EXTENSIONS)?
            .into_iter()
            .filter(|path| !FileManager::is_translated_output(path, &self.config.target_language))
            .filter(|path| {
                // Word lock files
                !path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with("~$"))
            })
            .collect();

        if documents.is_empty() {
            return Err(anyhow!("No documents found in directory: {:?}", input_dir));
        }

        let provider = self.provider()?;
        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(documents.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));

        let mut summary = FolderSummary::default();

        for document in &documents {
            let file_name = document
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self
                .run_with_progress(
                    document,
                    None,
                    force_overwrite,
                    restart,
                    Arc::clone(&provider),
                    &multi_progress,
                )
                .await
            {
                Ok(FileStatus::Translated(_)) => summary.translated += 1,
                Ok(FileStatus::Skipped) => summary.skipped += 1,
                Ok(FileStatus::Cancelled(_)) => {
                    summary.cancelled = true;
                    break;
                }
                Err(e) => {
                    error!("Failed to translate {:?}: {:#}", document, e);
                    summary.failed += 1;

                    // Remaining files would fail the same way
                    if Self::is_engine_unavailable(&e)
                        && provider
                            .test_connection(&self.config.source_language, &self.config.target_language)
                            .await
                            .is_err()
                    {
                        error!("{} is unreachable, stopping the folder run", provider.name());
                        folder_pb.inc(1);
                        break;
                    }
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_and_clear();

        info!(
            "Folder done in {}: {} translated, {} skipped, {} failed",
            Self::format_duration(start_time.elapsed()),
            summary.translated,
            summary.skipped,
            summary.failed
        );

        Ok(summary)
    }

    /// Whether a failed run was caused by an engine that could not be reached
    fn is_engine_unavailable(error: &anyhow::Error) -> bool {
        error.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<DocumentError>(),
                Some(DocumentError::ParagraphTranslation { source, .. }) if source.is_service_unavailable()
            )
        })
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
