//! Completion dispatcher.
//!
//! One dispatch walks the provider table in order and returns the first
//! usable completion:
//!
//! 1. Assemble turns (system persona or override, history, trailing user message)
//! 2. Compute the try-order (preferred provider first, if known)
//! 3. Attempt each provider once, bounded by the per-attempt timeout
//! 4. Return the first success, or `Exhausted` with the collected failures
//!
//! Attempts are strictly sequential. Nothing is retried.

use std::time::Duration;

use thiserror::Error;
use tracing::{Instrument, debug, info, info_span, warn};
use ulid::Ulid;

use crate::config::DispatchConfig;
use crate::llm::{ChatRequest, LLMError, Message, ProviderEntry, ProviderRegistry, Role};

/// Highest temperature forwarded upstream; larger values are clamped.
pub const MAX_TEMPERATURE: f32 = 2.0;

// ============================================================================
// Types
// ============================================================================

/// One logical chat-completion request.
#[derive(Debug, Clone, Default)]
pub struct DispatchRequest {
    /// Single message appended as the final user turn.
    pub message: Option<String>,
    /// Prior conversation turns.
    pub messages: Vec<Message>,
    /// Model override; otherwise each provider's default model is used.
    pub model: Option<String>,
    /// Provider key to try first.
    pub provider: Option<String>,
    pub temperature: Option<f32>,
    /// Replaces the default persona as the leading system turn.
    pub system_prompt: Option<String>,
}

impl DispatchRequest {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    fn single_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Result of a dispatch that got past input validation.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Completed(Completion),
    Exhausted(Exhausted),
}

/// A successful completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub response: String,
    /// Display name of the provider that answered.
    pub provider: String,
    pub provider_key: String,
    /// Model reported upstream, else the model that was requested.
    pub model: String,
}

/// Every provider in the try-order failed.
#[derive(Debug, Clone)]
pub struct Exhausted {
    /// Message of the most recent failure.
    pub last_error: Option<String>,
    /// All configured provider keys, whether attempted or not.
    pub providers: Vec<String>,
    /// Failures in the order they happened.
    pub attempts: Vec<AttemptFailure>,
}

impl Exhausted {
    /// Keys of the providers actually attempted.
    pub fn attempted(&self) -> Vec<String> {
        self.attempts.iter().map(|a| a.provider.clone()).collect()
    }
}

/// A single failed provider attempt.
#[derive(Debug, Clone)]
pub struct AttemptFailure {
    pub provider: String,
    pub error: String,
}

/// Errors surfaced before any provider is contacted.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Walks the provider table for each request.
pub struct Dispatcher {
    registry: ProviderRegistry,
    attempt_timeout: Duration,
    default_temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl Dispatcher {
    pub fn new(registry: ProviderRegistry, config: &DispatchConfig) -> Self {
        Self {
            registry,
            attempt_timeout: Duration::from_secs(config.attempt_timeout_seconds),
            default_temperature: config.default_temperature,
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        }
    }

    #[must_use]
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Build the outbound turn sequence.
    ///
    /// The result starts with exactly one system turn: the caller's override,
    /// an existing leading system turn, or the default persona.
    pub fn assemble_turns(&self, request: &DispatchRequest) -> Vec<Message> {
        let mut turns = request.messages.clone();
        let leads_with_system = turns.first().is_some_and(|t| t.role == Role::System);

        match request.system_prompt.as_deref().filter(|p| !p.is_empty()) {
            Some(prompt) if leads_with_system => turns[0].content = prompt.to_string(),
            Some(prompt) => turns.insert(0, Message::system(prompt)),
            None if leads_with_system => {}
            None => turns.insert(0, Message::system(self.system_prompt.clone())),
        }

        if let Some(message) = request.single_message() {
            turns.push(Message::user(message));
        }
        turns
    }

    /// Clamp the caller's temperature into the accepted range.
    pub fn resolve_temperature(&self, temperature: Option<f32>) -> f32 {
        match temperature {
            Some(t) if t.is_finite() => t.clamp(0.0, MAX_TEMPERATURE),
            _ => self.default_temperature,
        }
    }

    /// Run one dispatch.
    pub async fn dispatch(
        &self,
        request: DispatchRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        if request.single_message().is_none() && request.messages.is_empty() {
            return Err(DispatchError::InvalidRequest(
                "message or messages required".to_string(),
            ));
        }

        let span = info_span!("dispatch", dispatch_id = %Ulid::new());
        Ok(self.run_chain(request).instrument(span).await)
    }

    async fn run_chain(&self, request: DispatchRequest) -> DispatchOutcome {
        let turns = self.assemble_turns(&request);
        let temperature = self.resolve_temperature(request.temperature);
        let order = self.registry.try_order(request.provider.as_deref());

        debug!(
            turns = turns.len(),
            providers = order.len(),
            preferred = request.provider.as_deref().unwrap_or("-"),
            "Starting fallback chain"
        );

        let mut attempts = Vec::with_capacity(order.len());
        for entry in order {
            match self
                .attempt(entry, &turns, request.model.as_deref(), temperature)
                .await
            {
                Ok(completion) => {
                    info!(
                        provider = %completion.provider_key,
                        model = %completion.model,
                        failed_attempts = attempts.len(),
                        "Completion served"
                    );
                    return DispatchOutcome::Completed(completion);
                }
                Err(e) => {
                    warn!(provider = %entry.key(), error = %e, "Provider attempt failed");
                    attempts.push(AttemptFailure {
                        provider: entry.key().to_string(),
                        error: format!("{}: {}", entry.name(), e),
                    });
                }
            }
        }

        warn!(attempts = attempts.len(), "All providers failed");
        DispatchOutcome::Exhausted(Exhausted {
            last_error: attempts.last().map(|a| a.error.clone()),
            providers: self.registry.keys(),
            attempts,
        })
    }

    /// A single provider attempt under the per-attempt deadline.
    async fn attempt(
        &self,
        entry: &ProviderEntry,
        turns: &[Message],
        model: Option<&str>,
        temperature: f32,
    ) -> Result<Completion, LLMError> {
        let model = model
            .filter(|m| !m.is_empty())
            .or_else(|| entry.config.default_model())
            .unwrap_or_default()
            .to_string();

        let request = ChatRequest {
            model: model.clone(),
            messages: turns.to_vec(),
            temperature: Some(temperature),
            max_tokens: Some(self.max_tokens),
        };

        let response = tokio::time::timeout(self.attempt_timeout, entry.provider.chat(request))
            .await
            .map_err(|_| LLMError::Timeout(self.attempt_timeout))??;

        let content = response.content().ok_or(LLMError::EmptyResponse)?;

        Ok(Completion {
            response: content.to_string(),
            provider: entry.name().to_string(),
            provider_key: entry.key().to_string(),
            model: response.model.clone().filter(|m| !m.is_empty()).unwrap_or(model),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
