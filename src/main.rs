// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;

use doctrans::app_config::{self, Config, TranslationEngine, parse_page_selection};
use doctrans::app_controller::{Controller, FileStatus};
use doctrans::errors::AppError;
use doctrans::file_utils::FileManager;
use doctrans::translation::DistributionMode;

/// CLI Wrapper for TranslationEngine to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliEngine {
    #[value(name = "mymemory")]
    MyMemory,
    #[value(name = "magicloops")]
    MagicLoops,
    Google,
    #[value(name = "deepl")]
    DeepL,
}

impl From<CliEngine> for TranslationEngine {
    fn from(cli_engine: CliEngine) -> Self {
        match cli_engine {
            CliEngine::MyMemory => TranslationEngine::MyMemory,
            CliEngine::MagicLoops => TranslationEngine::MagicLoops,
            CliEngine::Google => TranslationEngine::Google,
            CliEngine::DeepL => TranslationEngine::DeepL,
        }
    }
}

/// CLI Wrapper for DistributionMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliDistribution {
    Direct,
    Proportional,
}

impl From<CliDistribution> for DistributionMode {
    fn from(mode: CliDistribution) -> Self {
        match mode {
            CliDistribution::Direct => DistributionMode::Direct,
            CliDistribution::Proportional => DistributionMode::Proportional,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a document or every document in a folder (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for doctrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input document (.docx, .json) or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    #[command(flatten)]
    options: TranslateOptions,
}

#[derive(Args, Debug, Clone)]
struct TranslateOptions {
    /// Output document (single file only; default `<name>.<target>.<ext>`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Translation engine to use
    #[arg(short, long, value_enum)]
    engine: Option<CliEngine>,

    /// API key for the selected engine
    #[arg(long, env = "DOCTRANS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Pages to leave untranslated, e.g. '2,5-7'
    #[arg(long, value_name = "PAGES")]
    skip_pages: Option<String>,

    /// Leave the cover page (page 1) untranslated
    #[arg(long)]
    skip_cover: bool,

    /// How translations are written back into formatting runs
    #[arg(short = 'm', long, value_enum)]
    distribution: Option<CliDistribution>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Overwrite existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Ignore any saved progress and start from the first paragraph
    #[arg(long)]
    restart: bool,
}

/// doctrans - resumable document translation
///
/// Translates Word documents paragraph by paragraph through an online
/// translation engine, keeping run formatting and resuming interrupted jobs.
#[derive(Parser, Debug)]
#[command(name = "doctrans")]
#[command(version)]
#[command(about = "Resumable, formatting-preserving document translation")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "doctrans translates .docx documents paragraph by paragraph, keeping formatting runs and resuming interrupted jobs from a checkpoint.

EXAMPLES:
    doctrans report.docx                          # Translate using default config
    doctrans -s en -t fr report.docx              # English to French
    doctrans -e deepl --api-key KEY report.docx   # Use DeepL
    doctrans --skip-cover --skip-pages 10-12 a.docx   # Leave pages 1 and 10-12 untouched
    doctrans -m proportional report.docx          # Translate whole paragraphs
    doctrans --restart report.docx                # Ignore saved progress
    doctrans /documents/                          # Translate every document in a folder
    doctrans completions bash > doctrans.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED ENGINES:
    mymemory   - MyMemory public API (default, no key)
    magicloops - Magic Loops endpoint (endpoint URL in config)
    google     - Google Cloud Translation (requires API key)
    deepl      - DeepL API (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input document (.docx, .json) or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: TranslateOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself accepts everything; `set_max_level` does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;
            run_translate(TranslateArgs {
                input_path,
                options: cli.options,
            })
            .await
        }
    }
}

/// Load `conf.json`, writing a default one when it does not exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if FileManager::file_exists(config_path) {
        let content = FileManager::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&content)
            .context(format!("Failed to parse config file: {}", config_path))?;
        return Ok(config);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    let config_json = serde_json::to_string_pretty(&config)
        .context("Failed to serialize default config to JSON")?;
    FileManager::write_to_file(config_path, &config_json)
        .context(format!("Failed to write default config to file: {}", config_path))?;
    Ok(config)
}

/// Apply command line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, options: &TranslateOptions) -> Result<()> {
    if let Some(engine) = &options.engine {
        config.translation.engine = engine.clone().into();
    }
    if let Some(api_key) = &options.api_key {
        let engine = config.translation.engine;
        config.translation.engine_config_mut(engine).api_key = api_key.clone();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(mode) = &options.distribution {
        config.document.distribution = mode.clone().into();
    }
    if let Some(selection) = &options.skip_pages {
        config.document.skip_pages = parse_page_selection(selection)
            .context("Invalid --skip-pages value")?
            .into_iter()
            .collect();
    }
    if options.skip_cover && !config.document.skip_pages.contains(&1) {
        config.document.skip_pages.insert(0, 1);
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    Ok(())
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let options = &args.options;

    // Apply a command line log level before anything is logged
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, options)?;

    config
        .validate()
        .map_err(|e| AppError::Config(format!("{:#}", e)))
        .context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if args.input_path.is_file() {
        let status = controller
            .run(
                args.input_path.clone(),
                options.output.clone(),
                options.force_overwrite,
                options.restart,
            )
            .await?;
        if let FileStatus::Cancelled(_) = status {
            info!("Progress saved; run the same command again to continue.");
        }
    } else if args.input_path.is_dir() {
        if options.output.is_some() {
            return Err(AppError::Config("--output cannot be used with a directory input".to_string()).into());
        }
        controller
            .run_folder(args.input_path.clone(), options.force_overwrite, options.restart)
            .await?;
    } else {
        return Err(AppError::File(format!("Input path does not exist: {:?}", args.input_path)).into());
    }

    Ok(())
}
