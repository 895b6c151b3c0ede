use thiserror::Error;

/// Failure of a single outbound call to a hosted provider.
///
/// The payload may contain provider detail, so it is logged but never
/// shown to end users.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} request timed out")]
    Timeout { provider: &'static str },
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("{provider} returned a malformed response: {detail}")]
    Malformed {
        provider: &'static str,
        detail: String,
    },
    #[error("{provider} returned no usable content")]
    Empty { provider: &'static str },
}

impl ProviderError {
    pub fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout { provider }
        } else {
            // The URL can carry query parameters; keep it out of the logs.
            ProviderError::Transport {
                provider,
                source: err.without_url(),
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("research step failed")]
    RetrievalFailure(#[source] ProviderError),
    #[error("report formatting failed")]
    FormattingFailure(#[source] ProviderError),
}

impl ResearchError {
    /// Text that is safe to show to the person who submitted the topic.
    pub fn user_message(&self) -> String {
        match self {
            ResearchError::InvalidInput(reason) => format!("Please enter a valid research topic: {reason}."),
            ResearchError::RetrievalFailure(_) => {
                "We couldn't gather research for this topic right now. Please try again shortly.".to_string()
            }
            ResearchError::FormattingFailure(_) => {
                "Research was gathered but the report could not be generated. Please try again shortly."
                    .to_string()
            }
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ResearchError::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_do_not_echo_provider_detail() {
        let secret = "upstream said: key gsk-123 rejected";
        for err in [
            ResearchError::RetrievalFailure(ProviderError::Status {
                provider: "groq",
                status: 401,
                body: secret.to_string(),
            }),
            ResearchError::FormattingFailure(ProviderError::Malformed {
                provider: "gemini",
                detail: secret.to_string(),
            }),
        ] {
            assert!(!err.user_message().contains("gsk-123"));
            assert!(!err.to_string().contains("gsk-123"));
        }
    }

    #[test]
    fn source_chain_keeps_provider_detail_for_logs() {
        let err = ResearchError::RetrievalFailure(ProviderError::Status {
            provider: "tavily",
            status: 500,
            body: "boom".to_string(),
        });
        let source = std::error::Error::source(&err).unwrap().to_string();
        assert_eq!(source, "tavily returned HTTP 500: boom");
    }

    #[test]
    fn invalid_input_message_includes_reason() {
        let err = ResearchError::InvalidInput("topic is empty".to_string());
        assert!(err.is_invalid_input());
        assert_eq!(err.user_message(), "Please enter a valid research topic: topic is empty.");
    }
}
