use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::response::timestamp;
use crate::server::AppState;

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

pub async fn readyz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[derive(Serialize)]
pub struct ProviderSummary {
    key: String,
    name: String,
    models: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    uptime_ms: u64,
    providers: Vec<ProviderSummary>,
    timestamp: String,
}

#[derive(Serialize)]
pub struct SystemStatus {
    server: &'static str,
    ai: &'static str,
    uptime_ms: u64,
}

#[derive(Serialize)]
pub struct StatusResponse {
    success: bool,
    system: SystemStatus,
    providers: Vec<ProviderSummary>,
    timestamp: String,
}

fn summaries(state: &AppState) -> Vec<ProviderSummary> {
    state
        .dispatcher
        .registry()
        .entries()
        .iter()
        .map(|e| ProviderSummary {
            key: e.config.key.clone(),
            name: e.config.name.clone(),
            models: e.config.models.clone(),
        })
        .collect()
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        uptime_ms: state.uptime_ms(),
        providers: summaries(&state),
        timestamp: timestamp(),
    })
}

/// GET /api/status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let ai = if state.dispatcher.registry().is_empty() {
        "unconfigured"
    } else {
        "ready"
    };

    Json(StatusResponse {
        success: true,
        system: SystemStatus {
            server: "running",
            ai,
            uptime_ms: state.uptime_ms(),
        },
        providers: summaries(&state),
        timestamp: timestamp(),
    })
}
