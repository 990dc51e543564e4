use std::collections::{BTreeMap, HashSet};
use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            dispatch: DispatchConfig::default(),
            providers: default_providers(),
        }
    }
}

impl Config {
    /// Load and validate a config file. A missing file yields defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let config: Self = serde_saphyr::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if !seen.insert(provider.key.as_str()) {
                return Err(ConfigError::DuplicateProvider(provider.key.clone()));
            }
            if let Err(e) = url::Url::parse(&provider.base_url) {
                return Err(ConfigError::InvalidBaseUrl {
                    key: provider.key.clone(),
                    reason: e.to_string(),
                });
            }
            if provider.models.is_empty() {
                return Err(ConfigError::NoModels(provider.key.clone()));
            }
        }

        if self.dispatch.attempt_timeout_seconds == 0 {
            return Err(ConfigError::ZeroAttemptTimeout);
        }

        // Every provider may use its full attempt budget, and the 503 must still
        // be written before the server deadline fires.
        let chain = self.chain_timeout_seconds();
        if self.server.request_timeout_seconds <= chain {
            return Err(ConfigError::RequestTimeoutTooShort {
                request: self.server.request_timeout_seconds,
                chain,
                providers: self.providers.len(),
            });
        }
        Ok(())
    }

    /// Worst-case duration of a full fallback chain.
    pub fn chain_timeout_seconds(&self) -> u64 {
        u64::try_from(self.providers.len())
            .unwrap_or(u64::MAX)
            .saturating_mul(self.dispatch.attempt_timeout_seconds)
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whole-request deadline. Must cover a full fallback chain.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    120
}

// ============================================================================
// DispatchConfig
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_seconds: u64,
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Persona prepended when a conversation has no system turn.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_seconds: default_attempt_timeout(),
            default_temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_attempt_timeout() -> u64 {
    15
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

pub fn default_system_prompt() -> String {
    "You are a helpful AI assistant for Grudge Studio game development. You help with code \
     generation, game design, Three.js, Socket.io, combat systems, terrain generation, and all \
     aspects of building multiplayer 3D games."
        .to_string()
}

// ============================================================================
// ProviderConfig
// ============================================================================

/// One upstream chat-completion endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Stable identifier used in requests (`provider` field).
    pub key: String,
    /// Display name reported back to callers.
    pub name: String,
    pub base_url: String,
    /// Inline credential. Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the credential.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Supported models; the first is the default.
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ProviderConfig {
    /// Resolve the credential from config or environment.
    pub fn credential(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| {
                self.api_key_env
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|k| !k.is_empty())
            })
    }

    pub fn default_model(&self) -> Option<&str> {
        self.models.first().map(String::as_str)
    }
}

/// Built-in provider table, in fallback order.
pub fn default_providers() -> Vec<ProviderConfig> {
    let headers = BTreeMap::from([
        (
            "HTTP-Referer".to_string(),
            "https://grudachain.vercel.app".to_string(),
        ),
        ("X-Title".to_string(), "GrudaChain Grudge Studio".to_string()),
    ]);

    let provider = |key: &str, name: &str, base_url: &str, env: &str, models: &[&str]| {
        ProviderConfig {
            key: key.to_string(),
            name: name.to_string(),
            base_url: base_url.to_string(),
            api_key: None,
            api_key_env: Some(env.to_string()),
            models: models.iter().map(|m| m.to_string()).collect(),
            headers: headers.clone(),
        }
    };

    vec![
        provider(
            "megallm",
            "MegaLLM",
            "https://ai.megallm.io/v1",
            "MEGALLM_API_KEY",
            &["gpt-4o-mini", "gpt-3.5-turbo", "claude-3-haiku", "deepseek-chat"],
        ),
        provider(
            "openrouter",
            "OpenRouter",
            "https://openrouter.ai/api/v1",
            "OPENROUTER_API_KEY",
            &[
                "meta-llama/llama-3.1-8b-instruct:free",
                "microsoft/phi-3-mini-128k-instruct:free",
            ],
        ),
        provider(
            "agentrouter",
            "AgentRouter",
            "https://agentrouter.org/v1",
            "AGENTROUTER_API_KEY",
            &["gpt-4o-mini", "claude-3-haiku"],
        ),
        provider(
            "routeway",
            "Routeway",
            "https://api.routeway.ai/v1",
            "ROUTEWAY_API_KEY",
            &["gpt-4o-mini", "claude-3-haiku"],
        ),
    ]
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("no providers configured")]
    NoProviders,

    #[error("duplicate provider key '{0}'")]
    DuplicateProvider(String),

    #[error("provider '{key}' has an invalid base_url: {reason}")]
    InvalidBaseUrl { key: String, reason: String },

    #[error("provider '{0}' lists no models")]
    NoModels(String),

    #[error("dispatch.attempt_timeout_seconds must be greater than zero")]
    ZeroAttemptTimeout,

    #[error(
        "server.request_timeout_seconds ({request}) must exceed a full fallback chain \
         ({providers} providers, {chain}s)"
    )]
    RequestTimeoutTooShort {
        request: u64,
        chain: u64,
        providers: usize,
    },
}

// ============================================================================
// Tests
// ============================================================================
