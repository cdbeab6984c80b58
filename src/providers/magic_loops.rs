use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{Provider, build_client, check_status, decode_json, transport_error};

const ENGINE: &str = "Magic Loops";

/// Client for a user-created Magic Loops translation loop
#[derive(Debug)]
pub struct MagicLoops {
    endpoint: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MagicLoopsRequest<'a> {
    text: &'a str,
    source: &'a str,
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct MagicLoopsResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

impl MagicLoops {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: build_client(timeout_secs),
        }
    }
}

#[async_trait]
impl Provider for MagicLoops {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        if self.endpoint.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Magic Loops endpoint URL is not configured".to_string(),
            ));
        }

        // The loop reads its input from a JSON body on a GET request
        let response = self
            .client
            .get(&self.endpoint)
            .json(&MagicLoopsRequest {
                text,
                source: source_language,
                target: target_language,
            })
            .send()
            .await
            .map_err(|e| transport_error(ENGINE, e))?;

        let response = check_status(ENGINE, response).await?;
        let payload: MagicLoopsResponse = decode_json(ENGINE, response).await?;

        payload
            .translated_text
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ProviderError::TranslationFailed("Response has no 'translatedText'".to_string())
            })
    }

    fn name(&self) -> &str {
        ENGINE
    }
}
