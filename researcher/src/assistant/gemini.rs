//! Google Gemini `generateContent` client used to format the final report.
//!
//! The API key travels in the `x-goog-api-key` header rather than the
//! `?key=` query parameter so it never shows up in request URLs.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::configuration::Configuration;
use super::error::ProviderError;
use super::providers::{status_error, CompletionProvider};

const PROVIDER: &str = "gemini";

pub struct GeminiClient {
    api_key: String,
    client: Client,
    endpoint: String,
    temperature: f64,
    max_output_tokens: u32,
}

impl GeminiClient {
    pub fn new(config: &Configuration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        Ok(Self {
            api_key: config.gemini_api_key.clone(),
            client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.gemini_base_url.as_str().trim_end_matches('/'),
                config.gemini_model
            ),
            temperature: 0.3,
            max_output_tokens: 4096,
        })
    }

    fn build_request_body(&self, system: &str, prompt: &str) -> Value {
        let mut body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
            },
        });
        if !system.is_empty() {
            body["system_instruction"] = json!({ "parts": [{ "text": system }] });
        }
        body
    }

    pub async fn generate(&self, system: &str, prompt: &str) -> Result<String, ProviderError> {
        debug!(endpoint = %self.endpoint, prompt_chars = prompt.len(), "sending gemini request");
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request_body(system, prompt))
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let data = response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::Malformed {
                provider: PROVIDER,
                detail: e.to_string(),
            })?;

        parse_generate_content(&data)
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ProviderError> {
        self.generate(system, prompt).await
    }
}

/// Joins the text parts of the first candidate.
fn parse_generate_content(data: &Value) -> Result<String, ProviderError> {
    if let Some(reason) = data["promptFeedback"]["blockReason"].as_str() {
        warn!(reason, "gemini blocked the prompt");
        return Err(ProviderError::Empty { provider: PROVIDER });
    }

    let parts = data["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| ProviderError::Malformed {
            provider: PROVIDER,
            detail: "missing candidates[0].content.parts".to_string(),
        })?;

    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(ProviderError::Empty { provider: PROVIDER });
    }
    Ok(text.trim().to_string())
}
