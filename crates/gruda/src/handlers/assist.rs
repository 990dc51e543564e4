//! Single-prompt convenience endpoints with local fallback text.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dispatch::{Completion, DispatchError, DispatchOutcome, DispatchRequest};
use crate::fallback;
use crate::response::{self, timestamp};
use crate::server::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct ChatRequestBody {
    #[serde(default)]
    message: String,
    model: Option<String>,
    temperature: Option<f32>,
}

#[derive(Serialize)]
pub struct ChatResponseBody {
    success: bool,
    response: String,
    /// Provider key that answered, or `local`.
    service: String,
    model: String,
    timestamp: String,
}

#[derive(Deserialize)]
pub struct GenerateCodeRequest {
    #[serde(default)]
    description: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_framework")]
    framework: String,
}

fn default_language() -> String {
    "javascript".to_string()
}

fn default_framework() -> String {
    "vanilla".to_string()
}

#[derive(Serialize)]
pub struct GenerateCodeResponse {
    success: bool,
    code: String,
    language: String,
    framework: String,
    provider: String,
    timestamp: String,
}

#[derive(Deserialize)]
pub struct AnalyzeFileRequest {
    #[serde(default)]
    content: String,
    #[serde(default)]
    filename: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyzeFileResponse {
    success: bool,
    analysis: String,
    filename: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    provider: String,
    timestamp: String,
}

#[derive(Serialize)]
pub struct FailedWithFallback {
    error: &'static str,
    fallback: String,
    timestamp: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/chat
///
/// Never reports provider exhaustion: callers get canned local text instead.
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequestBody>) -> Response {
    if req.message.trim().is_empty() {
        return response::bad_request("Message is required");
    }

    // "auto" is the dashboard's way of saying "no preference".
    let model = req.model.filter(|m| !m.is_empty() && m != "auto");
    let request = DispatchRequest {
        model: model.clone(),
        temperature: req.temperature,
        ..DispatchRequest::message(req.message.clone())
    };

    let body = match run(&state, request).await {
        Ok(Some(completion)) => ChatResponseBody {
            success: true,
            response: completion.response,
            service: completion.provider_key,
            model: completion.model,
            timestamp: timestamp(),
        },
        Ok(None) => ChatResponseBody {
            success: true,
            response: fallback::local_response(&req.message),
            service: "local".to_string(),
            model: model.unwrap_or_else(|| "auto".to_string()),
            timestamp: timestamp(),
        },
        Err(resp) => return resp,
    };

    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/generate-code
pub async fn generate_code(
    State(state): State<AppState>,
    Json(req): Json<GenerateCodeRequest>,
) -> Response {
    let prompt = code_prompt(&req.description, &req.language, &req.framework);

    match run(&state, DispatchRequest::message(prompt)).await {
        Ok(Some(completion)) => {
            let body = GenerateCodeResponse {
                success: true,
                code: completion.response,
                language: req.language,
                framework: req.framework,
                provider: completion.provider,
                timestamp: timestamp(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(None) => failed(
            "Code generation failed",
            fallback::code_fallback(&req.description, &req.language),
        ),
        Err(resp) => resp,
    }
}

/// POST /api/analyze-file
pub async fn analyze_file(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeFileRequest>,
) -> Response {
    let kind = req.kind.as_deref().unwrap_or("file");
    let prompt = analysis_prompt(&req.content, &req.filename, kind);

    match run(&state, DispatchRequest::message(prompt)).await {
        Ok(Some(completion)) => {
            let body = AnalyzeFileResponse {
                success: true,
                analysis: completion.response,
                filename: req.filename,
                kind: req.kind,
                provider: completion.provider,
                timestamp: timestamp(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(None) => failed(
            "File analysis failed",
            fallback::analysis_fallback(&req.filename, kind),
        ),
        Err(resp) => resp,
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Dispatch and collapse the outcome: `None` means every provider failed.
async fn run(state: &AppState, request: DispatchRequest) -> Result<Option<Completion>, Response> {
    match state.dispatcher.dispatch(request).await {
        Ok(DispatchOutcome::Completed(completion)) => Ok(Some(completion)),
        Ok(DispatchOutcome::Exhausted(exhausted)) => {
            warn!(
                last_error = exhausted.last_error.as_deref().unwrap_or("-"),
                "Serving local fallback"
            );
            Ok(None)
        }
        Err(DispatchError::InvalidRequest(msg)) => Err(response::bad_request(msg)),
    }
}

fn failed(error: &'static str, fallback: String) -> Response {
    let body = FailedWithFallback {
        error,
        fallback,
        timestamp: timestamp(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn code_prompt(description: &str, language: &str, framework: &str) -> String {
    format!(
        "Generate {language} code for: {description}\n\
         \n\
         Requirements:\n\
         - Use {framework} framework\n\
         - Include error handling\n\
         - Add comments and documentation\n\
         - Follow best practices\n\
         - Make it production-ready\n\
         \n\
         Return only the code, no explanations."
    )
}

fn analysis_prompt(content: &str, filename: &str, kind: &str) -> String {
    format!(
        "Analyze this {kind} ({filename}):\n\
         \n\
         {content}\n\
         \n\
         Provide:\n\
         1. Code quality assessment\n\
         2. Security analysis\n\
         3. Performance recommendations\n\
         4. Best practices suggestions\n\
         5. Potential improvements\n\
         \n\
         Be concise but thorough."
    )
}
