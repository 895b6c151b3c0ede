use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::configuration::Configuration;
use super::error::ProviderError;
use super::providers::{status_error, SearchProvider};
use super::state::SearchResult;

const PROVIDER: &str = "tavily";

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

pub struct TavilyClient {
    api_key: String,
    client: Client,
    endpoint: String,
    max_results: usize,
}

impl TavilyClient {
    pub fn new(config: &Configuration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        Ok(Self {
            api_key: config.tavily_api_key.clone(),
            client,
            endpoint: format!("{}/search", config.tavily_base_url.as_str().trim_end_matches('/')),
            max_results: config.search_max_results,
        })
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ProviderError> {
        debug!(query, max_results = self.max_results, "sending tavily search");
        let request = TavilySearchRequest {
            query,
            search_depth: "advanced",
            max_results: self.max_results,
            include_raw_content: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;
        parse_search_response(&body)
    }
}

fn parse_search_response(body: &str) -> Result<Vec<SearchResult>, ProviderError> {
    let parsed: TavilySearchResponse = serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
        provider: PROVIDER,
        detail: e.to_string(),
    })?;
    Ok(parsed.results)
}
