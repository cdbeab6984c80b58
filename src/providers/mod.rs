/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported engines:
 * - MyMemory: free public translation memory
 * - Magic Loops: user-hosted translation endpoint
 * - Google: Google Cloud Translation v2
 * - DeepL: DeepL REST API
 * - Mock: deterministic provider for tests and benchmarks
 */

use async_trait::async_trait;
use log::error;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;

/// Common trait for all translation engines
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation pipeline.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate `text` from `source_language` to `target_language`
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or the reason it is missing
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Human readable engine name used in logs
    fn name(&self) -> &str;

    /// Test the connection to the provider with a tiny translation
    async fn test_connection(
        &self,
        source_language: &str,
        target_language: &str,
    ) -> Result<(), ProviderError> {
        self.translate("Hello", source_language, target_language)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        (**self).translate(text, source_language, target_language).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn test_connection(
        &self,
        source_language: &str,
        target_language: &str,
    ) -> Result<(), ProviderError> {
        (**self).test_connection(source_language, target_language).await
    }
}

/// Build an HTTP client with the engine timeout
pub(crate) fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

/// Classify a transport-level failure
pub(crate) fn transport_error(engine: &str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(format!("{} did not answer in time", engine))
    } else if err.is_connect() {
        ProviderError::ConnectionError(format!("Failed to reach {}: {}", engine, err))
    } else {
        ProviderError::RequestFailed(format!("Request to {} failed: {}", engine, err))
    }
}

/// Turn a non-success HTTP status into the matching error
pub(crate) async fn check_status(engine: &str, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    error!("{} API error ({}): {}", engine, status, message);

    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::AuthenticationError(message)
        }
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message,
        },
    })
}

/// Decode a JSON body, reporting malformed payloads as `ParseError`
pub(crate) async fn decode_json<T: DeserializeOwned>(
    engine: &str,
    response: Response,
) -> Result<T, ProviderError> {
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(engine, e))?;
    serde_json::from_str(&body).map_err(|e| {
        ProviderError::ParseError(format!("Unexpected {} response ({}): {}", engine, e, body))
    })
}

pub mod deepl;
pub mod google;
pub mod magic_loops;
pub mod mock;
pub mod mymemory;
