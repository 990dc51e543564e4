//! LLM provider client for chat completions.

mod error;
mod provider;
mod registry;
mod types;

pub use error::LLMError;
pub use provider::{LLMProvider, OpenAICompatibleProvider};
pub use registry::{ProviderEntry, ProviderRegistry};
pub use types::{ChatRequest, ChatResponse, Choice, Message, ResponseMessage, Role, Usage};
