use thiserror::Error;

/// Failures of the text generation call. Never reach the views: the
/// requester turns every one of them into the fallback tip.
#[derive(Debug, Error)]
pub enum CoachError {
    #[error("no API key configured (set API_KEY)")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("parse error: {0}")]
    Parse(String),
}
