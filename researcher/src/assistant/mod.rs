pub mod configuration;
pub mod error;
pub mod gemini;
pub mod graph;
pub mod groq;
pub mod markdown;
pub mod prompts;
pub mod providers;
pub mod state;
pub mod tavily;
pub mod utils;
