use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::providers::{Provider, build_client, check_status, decode_json, transport_error};

const ENGINE: &str = "MyMemory";

/// MyMemory client for the public `get` endpoint
#[derive(Debug)]
pub struct MyMemory {
    /// Endpoint URL
    endpoint: String,
    /// HTTP client for making requests
    client: Client,
}

/// Response payload of the `get` endpoint
#[derive(Debug, Deserialize)]
pub struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    pub response_data: Option<MyMemoryData>,
    /// Numeric on success, sometimes a string on failure
    #[serde(rename = "responseStatus", default)]
    pub response_status: Value,
    #[serde(rename = "responseDetails", default)]
    pub response_details: Value,
}

#[derive(Debug, Deserialize)]
pub struct MyMemoryData {
    #[serde(rename = "translatedText")]
    pub translated_text: Option<String>,
}

impl MyMemoryResponse {
    fn status(&self) -> Option<u64> {
        match &self.response_status {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn details(&self) -> String {
        match &self.response_details {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Null => "Unknown MyMemory error".to_string(),
            other => other.to_string(),
        }
    }

    /// Translated text when the service reports success
    pub fn into_translation(self) -> Result<String, ProviderError> {
        match self.status() {
            Some(200) => self
                .response_data
                .and_then(|d| d.translated_text)
                .ok_or_else(|| ProviderError::ParseError("Missing responseData.translatedText".to_string())),
            Some(429) => Err(ProviderError::RateLimitExceeded(self.details())),
            _ => Err(ProviderError::TranslationFailed(self.details())),
        }
    }
}

impl MyMemory {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: build_client(timeout_secs),
        }
    }
}

#[async_trait]
impl Provider for MyMemory {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let langpair = format!("{}|{}", source_language, target_language);
        debug!("{} request: {} chars, {}", ENGINE, text.chars().count(), langpair);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(ENGINE, e))?;

        let response = check_status(ENGINE, response).await?;
        let payload: MyMemoryResponse = decode_json(ENGINE, response).await?;
        payload.into_translation()
    }

    fn name(&self) -> &str {
        ENGINE
    }
}
