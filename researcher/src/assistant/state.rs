use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::error::ResearchError;

pub const MAX_TOPIC_CHARS: usize = 500;

/// A validated research topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic(String);

impl Topic {
    pub fn parse(raw: &str) -> Result<Self, ResearchError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ResearchError::InvalidInput("topic is empty".to_string()));
        }
        if trimmed.chars().count() > MAX_TOPIC_CHARS {
            return Err(ResearchError::InvalidInput(format!(
                "topic is longer than {MAX_TOPIC_CHARS} characters"
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ResearchError::InvalidInput(
                "topic contains control characters".to_string(),
            ));
        }
        Ok(Topic(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stands in for a field the search provider left out or sent as null.
pub const MISSING_FIELD: &str = "N/A";

fn missing_field() -> String {
    MISSING_FIELD.to_string()
}

fn or_missing<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(missing_field))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default = "missing_field", deserialize_with = "or_missing")]
    pub title: String,
    #[serde(default = "missing_field", deserialize_with = "or_missing")]
    pub url: String,
    #[serde(rename = "content", default = "missing_field", deserialize_with = "or_missing")]
    pub snippet: String,
}

/// One search query and what the provider returned for it, in order.
#[derive(Debug, Clone)]
pub struct SearchBatch {
    pub query: String,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone)]
pub struct SynthesizedFindings {
    pub text: String,
    pub sources: Vec<SearchResult>,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub topic: Topic,
    pub markdown: String,
    pub generated_at: DateTime<Local>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResearchRequest {
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResponse {
    pub topic: String,
    pub report: String,
    pub html: String,
    pub completed_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub topic: String,
    pub report: String,
}
