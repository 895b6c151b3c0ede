use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, instrument};

use super::configuration::Configuration;
use super::error::{ProviderError, ResearchError};
use super::gemini::GeminiClient;
use super::groq::GroqClient;
use super::prompts::{
    format_report_prompt, format_synthesis_prompt, search_queries, ANALYST_SYSTEM_PROMPT,
    RESEARCH_SYSTEM_PROMPT,
};
use super::providers::{CompletionProvider, SearchProvider};
use super::state::{Report, SearchBatch, SynthesizedFindings, Topic};
use super::tavily::TavilyClient;
use super::utils::{deduplicate_batches, format_search_batches, format_sources, MAX_SNIPPET_CHARS};

/// Searches the web for a topic and has the fast LLM synthesize the results.
pub struct ResearchNode {
    search: Arc<dyn SearchProvider>,
    llm: Arc<dyn CompletionProvider>,
}

impl ResearchNode {
    pub fn new(search: Arc<dyn SearchProvider>, llm: Arc<dyn CompletionProvider>) -> Self {
        Self { search, llm }
    }

    #[instrument(skip(self), fields(topic = %topic))]
    pub async fn process(&self, topic: &Topic) -> Result<SynthesizedFindings, ResearchError> {
        let mut batches = Vec::new();
        for query in search_queries(topic.as_str()) {
            info!(%query, "running sub-query");
            let results = self
                .search
                .search(&query)
                .await
                .map_err(ResearchError::RetrievalFailure)?;
            if results.is_empty() {
                info!(%query, "no results, skipping");
                continue;
            }
            info!(%query, count = results.len(), "search results received");
            batches.push(SearchBatch { query, results });
        }

        let batches = deduplicate_batches(batches);
        if batches.is_empty() {
            return Err(ResearchError::RetrievalFailure(ProviderError::Empty {
                provider: "search",
            }));
        }

        let search_data = format_search_batches(&batches, MAX_SNIPPET_CHARS);
        let prompt = format_synthesis_prompt(topic.as_str(), &search_data);
        let text = self
            .llm
            .complete(RESEARCH_SYSTEM_PROMPT, &prompt)
            .await
            .map_err(ResearchError::RetrievalFailure)?;

        if text.trim().is_empty() {
            return Err(ResearchError::RetrievalFailure(ProviderError::Empty {
                provider: "synthesis",
            }));
        }

        let sources = batches.into_iter().flat_map(|b| b.results).collect::<Vec<_>>();
        info!(chars = text.len(), sources = sources.len(), "findings synthesized");
        Ok(SynthesizedFindings {
            text: text.trim().to_string(),
            sources,
        })
    }
}

/// Turns synthesized findings into the final markdown report.
pub struct AnalystNode {
    llm: Arc<dyn CompletionProvider>,
}

impl AnalystNode {
    pub fn new(llm: Arc<dyn CompletionProvider>) -> Self {
        Self { llm }
    }

    #[instrument(skip(self, findings), fields(topic = %topic))]
    pub async fn process(&self, topic: &Topic, findings: &SynthesizedFindings) -> Result<Report, ResearchError> {
        if findings.text.trim().is_empty() {
            return Err(ResearchError::InvalidInput("findings are empty".to_string()));
        }

        let generated_at = Local::now();
        let prompt = format_report_prompt(
            topic.as_str(),
            &findings.text,
            &generated_at.format("%Y-%m-%d").to_string(),
        );
        let body = self
            .llm
            .complete(ANALYST_SYSTEM_PROMPT, &prompt)
            .await
            .map_err(ResearchError::FormattingFailure)?;

        let body = body.trim();
        if body.is_empty() {
            return Err(ResearchError::FormattingFailure(ProviderError::Empty {
                provider: "formatting",
            }));
        }

        let mut markdown = if body.contains(topic.as_str()) {
            body.to_string()
        } else {
            format!("# {}\n\n{}", topic, body)
        };
        if !findings.sources.is_empty() {
            markdown.push_str("\n\n## Sources\n");
            markdown.push_str(&format_sources(&findings.sources));
        }

        info!(chars = markdown.len(), "report generated");
        Ok(Report {
            topic: topic.clone(),
            markdown,
            generated_at,
        })
    }
}

/// Runs the research step and then the analysis step for one topic.
pub struct ResearchGraph {
    researcher: ResearchNode,
    analyst: AnalystNode,
}

impl ResearchGraph {
    pub fn new(config: &Configuration) -> Result<Self, ProviderError> {
        let search: Arc<dyn SearchProvider> = Arc::new(TavilyClient::new(config)?);
        let fast_llm: Arc<dyn CompletionProvider> = Arc::new(GroqClient::new(config)?);
        let formatter: Arc<dyn CompletionProvider> = Arc::new(GeminiClient::new(config)?);
        info!(
            groq_model = %config.groq_model,
            gemini_model = %config.gemini_model,
            "research graph initialized"
        );
        Ok(Self::with_providers(search, fast_llm, formatter))
    }

    pub fn with_providers(
        search: Arc<dyn SearchProvider>,
        fast_llm: Arc<dyn CompletionProvider>,
        formatter: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            researcher: ResearchNode::new(search, fast_llm),
            analyst: AnalystNode::new(formatter),
        }
    }

    pub async fn process_research(&self, raw_topic: &str) -> Result<Report, ResearchError> {
        let topic = Topic::parse(raw_topic)?;
        info!(%topic, "starting full research process");

        let findings = self
            .researcher
            .process(&topic)
            .await
            .map_err(|e| log_failure("research", e))?;
        info!("research data collection and summarization complete");

        let report = self
            .analyst
            .process(&topic, &findings)
            .await
            .map_err(|e| log_failure("analysis", e))?;
        info!("full research process completed");
        Ok(report)
    }
}

fn log_failure(step: &str, err: ResearchError) -> ResearchError {
    match std::error::Error::source(&err) {
        Some(cause) => error!(step, error = %err, %cause, "pipeline step failed"),
        None => error!(step, error = %err, "pipeline step failed"),
    }
    err
}
