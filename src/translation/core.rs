/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService struct, which selects one engine
 * client from the configuration and exposes it through the `Provider` trait
 * with client-side request pacing and language code normalisation.
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::app_config::{TranslationConfig, TranslationEngine};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::Provider;
use crate::providers::deepl::DeepL;
use crate::providers::google::GoogleTranslate;
use crate::providers::magic_loops::MagicLoops;
use crate::providers::mymemory::MyMemory;

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// MyMemory public API
    MyMemory {
        /// Client instance
        client: MyMemory,
    },

    /// User-hosted Magic Loops endpoint
    MagicLoops {
        /// Client instance
        client: MagicLoops,
    },

    /// Google Cloud Translation
    Google {
        /// Client instance
        client: GoogleTranslate,
    },

    /// DeepL API
    DeepL {
        /// Client instance
        client: DeepL,
    },
}

impl TranslationProviderImpl {
    fn as_provider(&self) -> &dyn Provider {
        match self {
            Self::MyMemory { client } => client,
            Self::MagicLoops { client } => client,
            Self::Google { client } => client,
            Self::DeepL { client } => client,
        }
    }
}

/// Translation service backed by the configured engine
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Minimum spacing between two requests
    min_interval: Option<Duration>,

    /// Start time reserved by the latest request
    last_request: Mutex<Option<Instant>>,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let timeout = config.get_timeout_secs();
        let endpoint = config.get_endpoint();

        let provider = match config.engine {
            TranslationEngine::MyMemory => TranslationProviderImpl::MyMemory {
                client: MyMemory::new(endpoint, timeout),
            },
            TranslationEngine::MagicLoops => {
                if endpoint.trim().is_empty() {
                    return Err(anyhow!("Magic Loops endpoint URL is not configured"));
                }
                url::Url::parse(&endpoint)
                    .map_err(|e| anyhow!("Invalid Magic Loops endpoint '{}': {}", endpoint, e))?;
                TranslationProviderImpl::MagicLoops {
                    client: MagicLoops::new(endpoint, timeout),
                }
            }
            TranslationEngine::Google => TranslationProviderImpl::Google {
                client: GoogleTranslate::new(config.get_api_key(), endpoint, timeout),
            },
            TranslationEngine::DeepL => TranslationProviderImpl::DeepL {
                client: DeepL::new(config.get_api_key(), endpoint, timeout),
            },
        };

        let min_interval = config
            .get_rate_limit()
            .filter(|&per_minute| per_minute > 0)
            .map(|per_minute| Duration::from_secs_f64(60.0 / f64::from(per_minute)));

        debug!(
            "Using {} (timeout {}s, pacing {:?})",
            config.engine.display_name(),
            timeout,
            min_interval
        );

        Ok(Self {
            provider,
            config,
            min_interval,
            last_request: Mutex::new(None),
        })
    }

    /// Largest chunk the active engine accepts
    pub fn max_chunk_chars(&self) -> usize {
        self.config.get_max_chars_per_request()
    }

    /// Wait until the rate limit allows another request
    async fn pace(&self) {
        let Some(interval) = self.min_interval else {
            return;
        };

        let wait = {
            let mut last = self.last_request.lock();
            let now = Instant::now();
            let start = match *last {
                Some(previous) => (previous + interval).max(now),
                None => now,
            };
            *last = Some(start);
            start - now
        };

        if !wait.is_zero() {
            debug!("Rate limit: waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}

/// Engines expect ISO 639-1 where it exists; fall back to the caller's code
fn engine_language_code(code: &str) -> String {
    match language_utils::normalize_to_part1_or_part2t(code) {
        Ok(normalized) => normalized,
        Err(e) => {
            warn!("Passing unrecognised language code '{}' through: {}", code, e);
            code.to_string()
        }
    }
}

#[async_trait]
impl Provider for TranslationService {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let source = engine_language_code(source_language);
        let target = engine_language_code(target_language);

        self.pace().await;
        let started = Instant::now();
        let result = self
            .provider
            .as_provider()
            .translate(text, &source, &target)
            .await;
        debug!(
            "{} answered in {:?} ({})",
            self.name(),
            started.elapsed(),
            if result.is_ok() { "ok" } else { "error" }
        );
        result
    }

    fn name(&self) -> &str {
        self.provider.as_provider().name()
    }
}
