//! Provider registry: the ordered, immutable provider table.

use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use super::provider::{LLMProvider, OpenAICompatibleProvider};
use crate::config::ProviderConfig;

/// A configured provider paired with the client that talks to it.
#[derive(Clone)]
pub struct ProviderEntry {
    pub config: ProviderConfig,
    pub provider: Arc<dyn LLMProvider>,
}

impl ProviderEntry {
    pub fn key(&self) -> &str {
        &self.config.key
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}

/// Registry of LLM providers in their fixed fallback order.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    entries: Vec<ProviderEntry>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build OpenAI-compatible providers for every configured entry.
    ///
    /// All providers share one HTTP client (and its connection pool).
    pub fn from_config(configs: &[ProviderConfig]) -> Self {
        let client = Client::new();
        let mut registry = Self::new();

        for config in configs {
            let api_key = config.credential();
            if api_key.is_none() {
                warn!(
                    provider = %config.key,
                    env = config.api_key_env.as_deref().unwrap_or("-"),
                    "No credential configured; requests will be sent unauthenticated"
                );
            }

            let provider =
                OpenAICompatibleProvider::new(client.clone(), &config.base_url, api_key)
                    .with_headers(config.headers.clone());
            registry.register(config.clone(), Arc::new(provider));
            info!(provider = %config.key, base_url = %config.base_url, "Registered provider");
        }

        registry
    }

    /// Register a provider implementation.
    ///
    /// A provider with an already-registered key replaces the old entry in
    /// place, keeping its position in the order.
    pub fn register(&mut self, config: ProviderConfig, implementation: Arc<dyn LLMProvider>) {
        let entry = ProviderEntry {
            config,
            provider: implementation,
        };
        match self.entries.iter_mut().find(|e| e.key() == entry.key()) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Get a provider by key.
    pub fn get(&self, key: &str) -> Option<&ProviderEntry> {
        self.entries.iter().find(|e| e.key() == key)
    }

    /// All entries in static order.
    pub fn entries(&self) -> &[ProviderEntry] {
        &self.entries
    }

    /// Configured provider keys in static order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.config.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Order in which providers are attempted for one dispatch.
    ///
    /// A known `preferred` key moves to the front; everything else keeps its
    /// static position. Unknown keys are ignored.
    pub fn try_order(&self, preferred: Option<&str>) -> Vec<&ProviderEntry> {
        let Some(first) = preferred.and_then(|key| self.get(key)) else {
            return self.entries.iter().collect();
        };

        std::iter::once(first)
            .chain(self.entries.iter().filter(|e| e.key() != first.key()))
            .collect()
    }
}
