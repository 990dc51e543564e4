//! Gruda - chat-completion relay that falls back across hosted providers.

pub mod config;
pub mod dispatch;
pub mod fallback;
pub mod handlers;
pub mod healthcheck;
pub mod llm;
pub mod response;
pub mod server;
