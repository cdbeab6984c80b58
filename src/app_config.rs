use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::default::Default;

use crate::language_utils;
use crate::translation::distribution::DistributionMode;
use crate::translation::pipeline::pages::PageResumePolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Document handling config
    #[serde(default)]
    pub document: DocumentConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation engine type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationEngine {
    // @engine: MyMemory public API
    #[default]
    MyMemory,
    // @engine: Magic Loops user-hosted endpoint
    MagicLoops,
    // @engine: Google Cloud Translation v2
    Google,
    // @engine: DeepL API
    DeepL,
}

impl TranslationEngine {
    // @returns: Human readable engine name
    pub fn display_name(&self) -> &str {
        match self {
            Self::MyMemory => "MyMemory",
            Self::MagicLoops => "Magic Loops",
            Self::Google => "Google Translate",
            Self::DeepL => "DeepL",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::MyMemory => "mymemory".to_string(),
            Self::MagicLoops => "magicloops".to_string(),
            Self::Google => "google".to_string(),
            Self::DeepL => "deepl".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "mymemory" => Ok(Self::MyMemory),
            "magicloops" => Ok(Self::MagicLoops),
            "google" => Ok(Self::Google),
            "deepl" => Ok(Self::DeepL),
            _ => Err(anyhow!("Invalid engine type: {}", s)),
        }
    }
}

/// Engine configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    // @field: Engine type identifier
    #[serde(rename = "type")]
    pub engine_type: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max chars per request (chunk size)
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl EngineConfig {
    // @param engine: Engine enum
    // @returns: Engine config with defaults
    pub fn new(engine: TranslationEngine) -> Self {
        Self {
            engine_type: engine.to_lowercase_string(),
            api_key: String::new(),
            endpoint: default_endpoint(engine),
            max_chars_per_request: default_max_chars_for(engine),
            timeout_secs: default_timeout_secs(),
            rate_limit: default_rate_limit(engine),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation engine to use
    #[serde(default)]
    pub engine: TranslationEngine,

    /// Available translation engines
    #[serde(default)]
    pub available_engines: Vec<EngineConfig>,
}

/// Document processing settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DocumentConfig {
    /// How translated text is written back into formatting runs
    #[serde(default)]
    pub distribution: DistributionMode,

    /// Pages (1-based) that are left untranslated
    #[serde(default)]
    pub skip_pages: Vec<u32>,

    /// How the page counter is restored when a job resumes
    #[serde(default)]
    pub page_resume: PageResumePolicy,

    /// Save the output every N translated paragraphs (0 disables)
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            distribution: DistributionMode::default(),
            skip_pages: Vec::new(),
            page_resume: PageResumePolicy::default(),
            autosave_interval: default_autosave_interval(),
        }
    }
}

impl DocumentConfig {
    /// Skip pages as a set
    pub fn skip_page_set(&self) -> BTreeSet<u32> {
        self.skip_pages.iter().copied().collect()
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_max_chars_per_request() -> usize {
    5000
}

fn default_max_chars_for(engine: TranslationEngine) -> usize {
    match engine {
        // MyMemory rejects long queries on the anonymous tier
        TranslationEngine::MyMemory => 200,
        _ => default_max_chars_per_request(),
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_autosave_interval() -> usize {
    1
}

fn default_endpoint(engine: TranslationEngine) -> String {
    match engine {
        TranslationEngine::MyMemory => "https://api.mymemory.translated.net/get".to_string(),
        // Magic Loops endpoints are created per user
        TranslationEngine::MagicLoops => String::new(),
        TranslationEngine::Google => {
            "https://translation.googleapis.com/language/translate/v2".to_string()
        }
        TranslationEngine::DeepL => "https://api-free.deepl.com/v2/translate".to_string(),
    }
}

fn default_rate_limit(engine: TranslationEngine) -> Option<u32> {
    match engine {
        TranslationEngine::MyMemory => Some(60),
        TranslationEngine::MagicLoops => None,
        TranslationEngine::Google => None,
        TranslationEngine::DeepL => Some(120),
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        language_utils::validate_language_code(&self.source_language)
            .with_context(|| format!("Invalid source language '{}'", self.source_language))?;
        language_utils::validate_language_code(&self.target_language)
            .with_context(|| format!("Invalid target language '{}'", self.target_language))?;
        if language_utils::language_codes_match(&self.source_language, &self.target_language) {
            log::warn!(
                "Source and target language are both {}",
                language_utils::get_language_name(&self.source_language)?
            );
        }

        match self.translation.engine {
            TranslationEngine::Google | TranslationEngine::DeepL => {
                if self.translation.get_api_key().is_empty() {
                    return Err(anyhow!(
                        "Translation API key is required for {}",
                        self.translation.engine.display_name()
                    ));
                }
            }
            TranslationEngine::MagicLoops => {
                if self.translation.get_endpoint().is_empty() {
                    return Err(anyhow!("Magic Loops endpoint URL is not configured"));
                }
            }
            TranslationEngine::MyMemory => {}
        }

        if self.translation.get_max_chars_per_request() == 0 {
            return Err(anyhow!("max_chars_per_request must be at least 1"));
        }

        if self.document.skip_pages.contains(&0) {
            return Err(anyhow!("Skip pages are 1-based; page 0 does not exist"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            translation: TranslationConfig::default(),
            document: DocumentConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active engine configuration from the available_engines array
    pub fn get_active_engine_config(&self) -> Option<&EngineConfig> {
        self.get_engine_config(&self.engine)
    }

    /// Get a specific engine configuration by type
    pub fn get_engine_config(&self, engine: &TranslationEngine) -> Option<&EngineConfig> {
        self.available_engines
            .iter()
            .find(|e| e.engine_type.parse::<TranslationEngine>().ok() == Some(*engine))
    }

    /// Get a mutable engine configuration, inserting defaults when missing
    pub fn engine_config_mut(&mut self, engine: TranslationEngine) -> &mut EngineConfig {
        let position = self
            .available_engines
            .iter()
            .position(|e| e.engine_type.parse::<TranslationEngine>().ok() == Some(engine));

        let index = match position {
            Some(index) => index,
            None => {
                self.available_engines.push(EngineConfig::new(engine));
                self.available_engines.len() - 1
            }
        };
        &mut self.available_engines[index]
    }

    /// Get the API key for the active engine
    pub fn get_api_key(&self) -> String {
        self.get_active_engine_config()
            .map(|e| e.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active engine
    pub fn get_endpoint(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.endpoint.is_empty() {
                return engine_config.endpoint.clone();
            }
        }

        default_endpoint(self.engine)
    }

    /// Get the max chars per request (chunk size) for the active engine
    pub fn get_max_chars_per_request(&self) -> usize {
        self.get_active_engine_config()
            .map(|e| e.max_chars_per_request)
            .unwrap_or_else(|| default_max_chars_for(self.engine))
    }

    /// Get the request timeout for the active engine
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_engine_config() {
            Some(e) if e.timeout_secs > 0 => e.timeout_secs,
            _ => default_timeout_secs(),
        }
    }

    /// Get the rate limit for the active engine
    pub fn get_rate_limit(&self) -> Option<u32> {
        match self.get_active_engine_config() {
            Some(engine_config) => engine_config.rate_limit,
            None => default_rate_limit(self.engine),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            engine: TranslationEngine::default(),
            available_engines: vec![
                EngineConfig::new(TranslationEngine::MyMemory),
                EngineConfig::new(TranslationEngine::MagicLoops),
                EngineConfig::new(TranslationEngine::Google),
                EngineConfig::new(TranslationEngine::DeepL),
            ],
        }
    }
}

/// Highest page number accepted in a page selection
pub const MAX_PAGE: u32 = 100_000;

/// Parse a page selection such as `1,3-5,9` into a set of 1-based pages
///
/// Ranges are inclusive and must not run backwards; a bare number selects a
/// single page. Pages above [`MAX_PAGE`] are rejected.
pub fn parse_page_selection(selection: &str) -> Result<BTreeSet<u32>> {
    let mut pages = BTreeSet::new();

    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (start.trim(), end.trim()),
            None => (part, part),
        };

        let start: u32 = start
            .parse()
            .map_err(|_| anyhow!("Invalid page number '{}' in '{}'", start, part))?;
        let end: u32 = if end.is_empty() {
            start
        } else {
            end.parse()
                .map_err(|_| anyhow!("Invalid page number '{}' in '{}'", end, part))?
        };

        if start == 0 {
            return Err(anyhow!("Pages start at 1, got '{}'", part));
        }
        if end < start {
            return Err(anyhow!("Page range '{}' ends before it starts", part));
        }
        if end > MAX_PAGE {
            return Err(anyhow!("Page range '{}' goes past page {}", part, MAX_PAGE));
        }

        pages.extend(start..=end);
    }

    Ok(pages)
}
