use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::providers::{Provider, build_client, check_status, decode_json, transport_error};

const ENGINE: &str = "Google Translate";

/// Google Cloud Translation (v2, API key auth)
#[derive(Debug)]
pub struct GoogleTranslate {
    api_key: String,
    endpoint: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    data: Option<GoogleData>,
}

#[derive(Debug, Deserialize)]
struct GoogleData {
    #[serde(default)]
    translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
struct GoogleTranslation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl GoogleTranslate {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            client: build_client(timeout_secs),
        }
    }
}

#[async_trait]
impl Provider for GoogleTranslate {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::AuthenticationError(
                "Google Translate API key is missing".to_string(),
            ));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("q", text),
                ("source", source_language),
                ("target", target_language),
                ("format", "text"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(ENGINE, e))?;

        let response = check_status(ENGINE, response).await?;
        let payload: GoogleResponse = decode_json(ENGINE, response).await?;

        payload
            .data
            .and_then(|d| d.translations.into_iter().next())
            .map(|t| t.translated_text)
            .ok_or_else(|| {
                ProviderError::TranslationFailed("Google Translate returned no translations".to_string())
            })
    }

    fn name(&self) -> &str {
        ENGINE
    }
}
