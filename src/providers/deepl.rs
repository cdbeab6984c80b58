use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::providers::{Provider, build_client, check_status, decode_json, transport_error};

const ENGINE: &str = "DeepL";

/// DeepL REST client (free or pro endpoint)
#[derive(Debug)]
pub struct DeepL {
    api_key: String,
    endpoint: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    #[serde(default)]
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

impl DeepL {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            client: build_client(timeout_secs),
        }
    }
}

#[async_trait]
impl Provider for DeepL {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::AuthenticationError(
                "DeepL API key is missing".to_string(),
            ));
        }

        let source = source_language.to_uppercase();
        let target = target_language.to_uppercase();

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&[
                ("text", text),
                ("source_lang", source.as_str()),
                ("target_lang", target.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(ENGINE, e))?;

        let response = check_status(ENGINE, response).await?;
        let payload: DeepLResponse = decode_json(ENGINE, response).await?;

        payload
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| ProviderError::TranslationFailed("DeepL returned no translations".to_string()))
    }

    fn name(&self) -> &str {
        ENGINE
    }
}
