//! LLM error types.

use std::time::Duration;

use thiserror::Error;

/// Reasons a single provider attempt can fail.
///
/// Every variant is treated the same way by the dispatcher: the attempt is
/// logged and the next provider is tried.
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request failed (connect, TLS, body decode)
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned a non-2xx response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Attempt exceeded the per-attempt deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Well-formed response without any message content
    #[error("returned empty response")]
    EmptyResponse,
}

impl LLMError {
    /// Upper bound on how much of an upstream error body is kept.
    const MAX_MESSAGE_LEN: usize = 200;

    /// Build an `Api` error, truncating the upstream body.
    pub fn api(status: u16, body: &str) -> Self {
        let message = match body.char_indices().nth(Self::MAX_MESSAGE_LEN) {
            Some((idx, _)) => body[..idx].to_string(),
            None => body.to_string(),
        };
        LLMError::Api { status, message }
    }
}
