use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";
pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

const MAX_SEARCH_RESULTS: usize = 20;

/// Every variable the configuration reads, in the order it is logged.
const ENV_VARS: [&str; 12] = [
    TAVILY_API_KEY,
    GROQ_API_KEY,
    GEMINI_API_KEY,
    "GROQ_MODEL",
    "GEMINI_MODEL",
    "TAVILY_BASE_URL",
    "GROQ_BASE_URL",
    "GEMINI_BASE_URL",
    "SEARCH_MAX_RESULTS",
    "REQUEST_TIMEOUT_SECS",
    "HOST",
    "PORT",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{0} environment variable not found - please add this to your .env file")]
    MissingCredential(&'static str),
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct Configuration {
    pub tavily_api_key: String,
    pub groq_api_key: String,
    pub gemini_api_key: String,
    pub groq_model: String,
    pub gemini_model: String,
    pub tavily_base_url: Url,
    pub groq_base_url: Url,
    pub gemini_base_url: Url,
    pub search_max_results: usize,
    pub request_timeout: Duration,
    pub bind_addr: SocketAddr,
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_search_max_results() -> usize {
    3
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(120)
}

impl Configuration {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name
    /// to its value. Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        for var in ENV_VARS {
            match get(var) {
                Some(value) => {
                    let shown = if var.contains("KEY") { "***" } else { value.as_str() };
                    info!(var, value = shown, "found env var");
                }
                None if var.contains("KEY") => warn!(var, "required env var not found"),
                None => info!(var, "env var not set, using default"),
            }
        }

        let credential = |var: &'static str| {
            get(var)
                .map(|v| v.trim().to_string())
                .ok_or(ConfigurationError::MissingCredential(var))
        };
        let tavily_api_key = credential(TAVILY_API_KEY)?;
        let groq_api_key = credential(GROQ_API_KEY)?;
        let gemini_api_key = credential(GEMINI_API_KEY)?;

        let groq_model = get("GROQ_MODEL")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(default_groq_model);
        let gemini_model = get("GEMINI_MODEL")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(default_gemini_model);

        let tavily_base_url = parse_url("TAVILY_BASE_URL", get("TAVILY_BASE_URL"), "https://api.tavily.com")?;
        let groq_base_url = parse_url("GROQ_BASE_URL", get("GROQ_BASE_URL"), "https://api.groq.com")?;
        let gemini_base_url = parse_url(
            "GEMINI_BASE_URL",
            get("GEMINI_BASE_URL"),
            "https://generativelanguage.googleapis.com",
        )?;

        let search_max_results = match get("SEARCH_MAX_RESULTS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if (1..=MAX_SEARCH_RESULTS).contains(&n) => n,
                _ => {
                    return Err(ConfigurationError::InvalidValue {
                        var: "SEARCH_MAX_RESULTS",
                        value: raw,
                        reason: format!("expected an integer between 1 and {MAX_SEARCH_RESULTS}"),
                    })
                }
            },
            None => default_search_max_results(),
        };

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigurationError::InvalidValue {
                        var: "REQUEST_TIMEOUT_SECS",
                        value: raw,
                        reason: "expected a positive number of seconds".to_string(),
                    })
                }
            },
            None => default_request_timeout(),
        };

        let host = match get("HOST") {
            Some(raw) => raw.trim().parse::<IpAddr>().map_err(|e| ConfigurationError::InvalidValue {
                var: "HOST",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigurationError::InvalidValue {
                var: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => 3000,
        };

        Ok(Configuration {
            tavily_api_key,
            groq_api_key,
            gemini_api_key,
            groq_model,
            gemini_model,
            tavily_base_url,
            groq_base_url,
            gemini_base_url,
            search_max_results,
            request_timeout,
            bind_addr: SocketAddr::new(host, port),
        })
    }
}

fn parse_url(var: &'static str, raw: Option<String>, default: &str) -> Result<Url, ConfigurationError> {
    let raw = raw.unwrap_or_else(|| default.to_string());
    let url = Url::parse(raw.trim()).map_err(|e| ConfigurationError::InvalidValue {
        var,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigurationError::InvalidValue {
            var,
            value: raw,
            reason: "expected an http or https URL".to_string(),
        });
    }
    Ok(url)
}

// Keys never reach logs through `{:?}`.
impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("tavily_api_key", &"***")
            .field("groq_api_key", &"***")
            .field("gemini_api_key", &"***")
            .field("groq_model", &self.groq_model)
            .field("gemini_model", &self.gemini_model)
            .field("tavily_base_url", &self.tavily_base_url.as_str())
            .field("groq_base_url", &self.groq_base_url.as_str())
            .field("gemini_base_url", &self.gemini_base_url.as_str())
            .field("search_max_results", &self.search_max_results)
            .field("request_timeout", &self.request_timeout)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}
