//! LLM provider trait and the OpenAI-compatible implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;

use super::error::LLMError;
use super::types::{ChatRequest, ChatResponse};

/// Trait for upstream chat-completion providers.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Make a chat completion request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError>;
}

/// OpenAI-compatible provider (MegaLLM, OpenRouter, AgentRouter, Routeway, ...).
pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    headers: BTreeMap<String, String>,
}

impl OpenAICompatibleProvider {
    #[must_use]
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            headers: BTreeMap::new(),
        }
    }

    /// Extra headers sent with every request (e.g. `HTTP-Referer`).
    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError> {
        let mut req = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json");

        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }
        for (name, value) in &self.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req.json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::api(status, &body));
        }

        Ok(response.json().await?)
    }
}
