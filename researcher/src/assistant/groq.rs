use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::configuration::Configuration;
use super::error::ProviderError;
use super::providers::{status_error, CompletionProvider};

const PROVIDER: &str = "groq";

/// Fast-inference chat completions over Groq's OpenAI-compatible API.
pub struct GroqClient {
    api_key: String,
    client: Client,
    endpoint: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl GroqClient {
    pub fn new(config: &Configuration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        Ok(Self {
            api_key: config.groq_api_key.clone(),
            client,
            endpoint: format!(
                "{}/openai/v1/chat/completions",
                config.groq_base_url.as_str().trim_end_matches('/')
            ),
            model: config.groq_model.clone(),
            temperature: 0.1,
            max_tokens: 1024,
        })
    }

    pub async fn generate(&self, system: &str, prompt: &str) -> Result<String, ProviderError> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "sending groq completion");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": system
                    },
                    {
                        "role": "user",
                        "content": prompt
                    }
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens
            }))
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

        parse_completion(&data)
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ProviderError> {
        self.generate(system, prompt).await
    }
}

fn parse_completion(data: &Value) -> Result<String, ProviderError> {
    let content = data["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| ProviderError::Malformed {
            provider: PROVIDER,
            detail: "missing choices[0].message.content".to_string(),
        })?;

    if content.trim().is_empty() {
        return Err(ProviderError::Empty { provider: PROVIDER });
    }
    Ok(content.trim().to_string())
}
