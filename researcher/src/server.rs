use axum::{
    extract::{rejection::JsonRejection, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use http::{header, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::assistant::{
    configuration::Configuration,
    error::ResearchError,
    graph::ResearchGraph,
    markdown::markdown_to_html,
    state::{DownloadRequest, ResearchRequest, ResearchResponse},
};

pub struct AppState {
    graph: ResearchGraph,
}

impl AppState {
    pub fn new(graph: ResearchGraph) -> Self {
        Self { graph }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

// Custom error type for our API
pub struct ApiError(ResearchError);

impl From<ResearchError> for ApiError {
    fn from(err: ResearchError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        info!(reason = %rejection.body_text(), "rejected request body");
        ApiError(ResearchError::InvalidInput(
            "the request body must be JSON with a text \"topic\" field".to_string(),
        ))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ResearchError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ResearchError::RetrievalFailure(_) | ResearchError::FormattingFailure(_) => StatusCode::BAD_GATEWAY,
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.user_message(),
            }),
        )
            .into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/health", get(health))
        .route("/research", post(handle_research))
        .route("/report/download", post(handle_download))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(config: Configuration) -> anyhow::Result<()> {
    let graph = ResearchGraph::new(&config)?;
    let state = Arc::new(AppState::new(graph));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

async fn handle_research(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Json<ResearchResponse>, ApiError> {
    let Json(request) = payload?;
    let report = state.graph.process_research(&request.topic).await?;
    let html = markdown_to_html(&report.markdown);

    Ok(Json(ResearchResponse {
        topic: report.topic.to_string(),
        completed_at: report.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        report: report.markdown,
        html,
    }))
}

async fn handle_download(payload: Result<Json<DownloadRequest>, JsonRejection>) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        info!(reason = %rejection.body_text(), "rejected download body");
        ApiError(ResearchError::InvalidInput(
            "the request body must be JSON with a text \"report\" field".to_string(),
        ))
    })?;
    if request.report.trim().is_empty() {
        return Err(ResearchError::InvalidInput("there is no report to download".to_string()).into());
    }

    let file_name = format!("AI_Report_{}.md", Local::now().format("%Y%m%d"));
    info!(topic = %request.topic, %file_name, "report download");

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        request.report,
    )
        .into_response())
}

async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Nitro AI Research</title>
    <style>
        body { font-family: 'Segoe UI', sans-serif; background: #121212; color: #e0e0e0; max-width: 960px; margin: 0 auto; padding: 20px; }
        .hero { background: linear-gradient(135deg, #667eea, #764ba2); padding: 60px 20px; text-align: center; color: #fff; border-radius: 12px; margin-bottom: 40px; }
        .input-area, .report-box { background: #1e1e1e; padding: 30px; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.5); margin-bottom: 30px; }
        .stats-area { display: flex; gap: 20px; margin-bottom: 40px; }
        .stat-card { flex: 1; background: #1e1e1e; padding: 20px; border-radius: 8px; text-align: center; box-shadow: 0 1px 6px rgba(0,0,0,0.5); color: #fff; }
        .stat-card h3 { margin: 0; font-size: 24px; }
        .stat-card p { margin: 5px 0 0; color: #a0a0a0; }
        .report-box h1, .report-box h2, .report-box h3 { color: #fff; margin-top: 16px; }
        .report-box strong { font-weight: bold; color: #fff; }
        .report-box em { font-style: italic; color: #ccc; }
        .report-box ul { padding-left: 20px; margin: 8px 0; }
        .report-box li { margin-bottom: 5px; }
        input[type=text] { width: 100%; box-sizing: border-box; padding: 12px; background: #2a2a2a; color: #e0e0e0; border: none; border-radius: 6px; font-size: 16px; margin: 10px 0; }
        button { background: #667eea; color: #fff; padding: 12px 24px; border: none; border-radius: 6px; font-size: 16px; cursor: pointer; }
        button:disabled { opacity: 0.5; cursor: wait; }
        #status { margin-top: 15px; }
        #status.error { color: #ff6b6b; }
        #status.success { color: #51cf66; }
        .spinner { display: none; width: 24px; height: 24px; border: 3px solid #444; border-top-color: #667eea; border-radius: 50%; animation: spin 1s linear infinite; vertical-align: middle; margin-left: 12px; }
        @keyframes spin { to { transform: rotate(360deg); } }
        #result { display: none; }
        .footer { text-align: center; color: #888; padding: 40px 0; }
    </style>
</head>
<body>
    <div class="hero">
        <h1>🚀 Nitro-Powered AI Research Agent</h1>
        <p>Get instant, AI-driven research reports in seconds.</p>
    </div>

    <div class="input-area">
        <label for="topic">Enter your research topic</label>
        <input type="text" id="topic" placeholder="e.g., AI in Healthcare 2025">
        <button id="start" onclick="startResearch()">Start Research</button>
        <span class="spinner" id="spinner"></span>
        <div id="status"></div>
    </div>

    <div class="stats-area">
        <div class="stat-card"><h3>⚡ Fast</h3><p>Reports in 30s</p></div>
        <div class="stat-card"><h3>🆓 Free</h3><p>Always free tier</p></div>
        <div class="stat-card"><h3>🔄 Live</h3><p>Up-to-date data</p></div>
    </div>

    <div id="result">
        <div class="report-box" id="report"></div>
        <button onclick="downloadReport()">Download Report</button>
    </div>

    <div class="footer">Powered by Groq • Google Gemini • Tavily</div>

    <script>
    let lastReport = null;

    function setStatus(text, kind) {
        const status = document.getElementById('status');
        status.textContent = text;
        status.className = kind || '';
    }

    function setBusy(busy) {
        document.getElementById('start').disabled = busy;
        document.getElementById('spinner').style.display = busy ? 'inline-block' : 'none';
    }

    async function startResearch() {
        const topic = document.getElementById('topic').value;
        if (!topic.trim()) {
            setStatus('Please enter a research topic.', 'error');
            return;
        }

        setBusy(true);
        setStatus('Generating report...');
        try {
            const response = await fetch('/research', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ topic }),
            });
            const data = await response.json();
            if (!response.ok) {
                setStatus(data.error || 'Something went wrong.', 'error');
                return;
            }
            lastReport = data;
            document.getElementById('report').innerHTML = data.html;
            document.getElementById('result').style.display = 'block';
            setStatus(`Completed at ${data.completed_at}`, 'success');
        } catch (error) {
            setStatus('Could not reach the server. Please try again.', 'error');
        } finally {
            setBusy(false);
        }
    }

    async function downloadReport() {
        if (!lastReport) return;
        const response = await fetch('/report/download', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ topic: lastReport.topic, report: lastReport.report }),
        });
        if (!response.ok) {
            setStatus('Download failed.', 'error');
            return;
        }
        const disposition = response.headers.get('Content-Disposition') || '';
        const match = disposition.match(/filename="([^"]+)"/);
        const blob = await response.blob();
        const link = document.createElement('a');
        link.href = URL.createObjectURL(blob);
        link.download = match ? match[1] : 'AI_Report.md';
        link.click();
        URL.revokeObjectURL(link.href);
    }

    document.getElementById('topic').addEventListener('keydown', (event) => {
        if (event.key === 'Enter') startResearch();
    });
    </script>
</body>
</html>
"#;
