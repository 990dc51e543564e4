//! Multi-provider chat endpoints.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::dispatch::{DispatchError, DispatchOutcome, DispatchRequest};
use crate::llm::Message;
use crate::response::{self, timestamp};
use crate::server::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeChatRequest {
    message: Option<String>,
    messages: Option<Vec<Message>>,
    model: Option<String>,
    provider: Option<String>,
    temperature: Option<f32>,
    system_prompt: Option<String>,
}

impl From<VibeChatRequest> for DispatchRequest {
    fn from(req: VibeChatRequest) -> Self {
        DispatchRequest {
            message: req.message,
            messages: req.messages.unwrap_or_default(),
            model: req.model,
            provider: req.provider,
            temperature: req.temperature,
            system_prompt: req.system_prompt,
        }
    }
}

#[derive(Serialize)]
pub struct VibeChatResponse {
    success: bool,
    response: String,
    provider: String,
    model: String,
    timestamp: String,
}

#[derive(Serialize)]
pub struct ProvidersUnavailable {
    error: &'static str,
    details: Option<String>,
    providers: Vec<String>,
    attempted: Vec<String>,
    timestamp: String,
}

#[derive(Serialize)]
pub struct ProviderInfo {
    name: String,
    status: &'static str,
    models: Vec<String>,
}

#[derive(Serialize)]
pub struct ProvidersResponse {
    success: bool,
    providers: BTreeMap<String, ProviderInfo>,
    order: Vec<String>,
    timestamp: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/vibe/chat
pub async fn vibe_chat(
    State(state): State<AppState>,
    Json(req): Json<VibeChatRequest>,
) -> Response {
    let outcome = match state.dispatcher.dispatch(req.into()).await {
        Ok(outcome) => outcome,
        Err(DispatchError::InvalidRequest(msg)) => return response::bad_request(msg),
    };

    match outcome {
        DispatchOutcome::Completed(completion) => {
            let body = VibeChatResponse {
                success: true,
                response: completion.response,
                provider: completion.provider,
                model: completion.model,
                timestamp: timestamp(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        DispatchOutcome::Exhausted(exhausted) => {
            let body = ProvidersUnavailable {
                error: "All AI providers temporarily unavailable",
                attempted: exhausted.attempted(),
                details: exhausted.last_error,
                providers: exhausted.providers,
                timestamp: timestamp(),
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

/// GET /api/vibe/providers
pub async fn vibe_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    let registry = state.dispatcher.registry();
    let providers = registry
        .entries()
        .iter()
        .map(|e| {
            let info = ProviderInfo {
                name: e.config.name.clone(),
                status: "active",
                models: e.config.models.clone(),
            };
            (e.config.key.clone(), info)
        })
        .collect();

    Json(ProvidersResponse {
        success: true,
        providers,
        order: registry.keys(),
        timestamp: timestamp(),
    })
}
