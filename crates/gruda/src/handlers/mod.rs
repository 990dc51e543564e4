//! HTTP request handlers.

mod assist;
mod health;
mod vibe;
mod version;

pub use assist::{analyze_file, chat, generate_code};
pub use health::{health, livez, readyz, status};
pub use vibe::{vibe_chat, vibe_providers};
pub use version::version;
