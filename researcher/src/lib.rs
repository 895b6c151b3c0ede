pub mod assistant;
pub mod server;

pub use assistant::configuration::{Configuration, ConfigurationError};
pub use assistant::error::{ProviderError, ResearchError};
pub use assistant::graph::ResearchGraph;
pub use assistant::providers::{CompletionProvider, SearchProvider};
pub use assistant::state::{Report, SearchResult, SynthesizedFindings, Topic};

use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

/// Loads `.env` into the process environment, if present.
pub fn init() {
    dotenv().ok();
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nitro_research=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
