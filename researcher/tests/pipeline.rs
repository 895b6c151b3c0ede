use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nitro_research::{
    CompletionProvider, Configuration, ConfigurationError, ProviderError, ResearchError, ResearchGraph,
    SearchProvider, SearchResult,
};

type CallLog = Arc<Mutex<Vec<String>>>;

struct CannedSearch {
    log: CallLog,
    fail: bool,
}

#[async_trait]
impl SearchProvider for CannedSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ProviderError> {
        self.log.lock().unwrap().push(format!("search:{query}"));
        if self.fail {
            return Err(ProviderError::Timeout { provider: "tavily" });
        }
        Ok(vec![
            SearchResult {
                title: format!("{query} overview"),
                url: format!("https://news.example/{}", query.replace(' ', "-")),
                snippet: "Battery electric vehicles took 18% of global new car sales.".to_string(),
            },
            SearchResult {
                title: "Charging networks".to_string(),
                url: "https://charging.example/report".to_string(),
                snippet: "Public chargers grew 40% year on year.".to_string(),
            },
        ])
    }
}

struct CannedLlm {
    name: &'static str,
    reply: &'static str,
    log: CallLog,
}

#[async_trait]
impl CompletionProvider for CannedLlm {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, ProviderError> {
        self.log.lock().unwrap().push(format!("{}:{}", self.name, prompt));
        Ok(self.reply.to_string())
    }
}

fn graph(log: &CallLog, search_fails: bool, synthesis: &'static str) -> ResearchGraph {
    ResearchGraph::with_providers(
        Arc::new(CannedSearch {
            log: log.clone(),
            fail: search_fails,
        }),
        Arc::new(CannedLlm {
            name: "groq",
            reply: synthesis,
            log: log.clone(),
        }),
        Arc::new(CannedLlm {
            name: "gemini",
            reply: "## Executive Summary\nEV adoption keeps accelerating.\n\n## Key Findings\n* Sales up\n* Chargers up",
            log: log.clone(),
        }),
    )
}

fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[tokio::test]
async fn blank_topics_fail_without_outbound_calls() {
    let log = CallLog::default();
    let graph = graph(&log, false, "findings");

    for topic in ["", "   ", "\n\t "] {
        let err = graph.process_research(topic).await.unwrap_err();
        assert!(matches!(err, ResearchError::InvalidInput(_)), "{topic:?}");
    }
    assert!(calls(&log).is_empty());
}

#[tokio::test]
async fn research_completes_before_analysis_starts() {
    let log = CallLog::default();
    let graph = graph(&log, false, "Findings: EV sales climbed.");

    graph.process_research("Electric Vehicle Market Trends 2024").await.unwrap();

    let calls = calls(&log);
    let kinds: Vec<&str> = calls.iter().map(|c| c.split(':').next().unwrap()).collect();
    assert_eq!(kinds, vec!["search", "search", "search", "groq", "gemini"]);
    // The analysis prompt is built from the synthesized findings.
    assert!(calls[4].contains("Findings: EV sales climbed."));
}

#[tokio::test]
async fn search_failure_short_circuits_pipeline() {
    let log = CallLog::default();
    let graph = graph(&log, true, "findings");

    let err = graph.process_research("Electric Vehicle Market Trends 2024").await.unwrap_err();

    assert!(matches!(err, ResearchError::RetrievalFailure(ProviderError::Timeout { .. })));
    let calls = calls(&log);
    assert_eq!(calls.len(), 1);
    assert!(calls.iter().all(|c| !c.starts_with("gemini:")));
}

#[tokio::test]
async fn empty_synthesis_never_reaches_analysis() {
    let log = CallLog::default();
    let graph = graph(&log, false, "   ");

    let err = graph.process_research("Electric Vehicle Market Trends 2024").await.unwrap_err();

    assert!(matches!(err, ResearchError::RetrievalFailure(_)));
    assert!(calls(&log).iter().all(|c| !c.starts_with("gemini:")));
}

#[tokio::test]
async fn canned_responses_produce_report_with_topic() {
    let log = CallLog::default();
    let graph = graph(&log, false, "EV sales grew strongly while charging build-out continued.");
    let topic = "Electric Vehicle Market Trends 2024";

    let report = graph.process_research(topic).await.unwrap();

    assert!(report.markdown.contains(topic));
    let body = report.markdown.replace(topic, "");
    assert!(body.contains("EV adoption keeps accelerating."));
    assert!(report.markdown.contains("## Sources"));
    // The shared charging source appears once even though every query returned it.
    assert_eq!(report.markdown.matches("https://charging.example/report").count(), 1);
}

#[test]
fn missing_credentials_prevent_startup() {
    let err = Configuration::from_lookup(|var| match var {
        "TAVILY_API_KEY" => Some("tvly".to_string()),
        "GROQ_API_KEY" => Some("gsk".to_string()),
        _ => None,
    })
    .unwrap_err();
    assert_eq!(err, ConfigurationError::MissingCredential("GEMINI_API_KEY"));
}
