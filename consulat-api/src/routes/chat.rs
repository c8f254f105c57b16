/// AI assistant endpoint
///
/// Forwards the citizen's message (plus short optional history) to the
/// chat-completions provider, seeded with context derived from the
/// caller's profile so answers can reference their consulate situation.
///
/// # Endpoints
///
/// - `POST /v1/chat`

use crate::{
    app::AppState,
    assistant::ChatMessage,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use consulat_shared::{auth::middleware::AuthContext, models::profile::Profile};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Chat request body
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    /// The user's message
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,

    /// Prior turns of this conversation (client-held; the server keeps no
    /// chat state)
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The assistant's reply text
    pub reply: String,
}

/// Maximum history turns forwarded to the provider
const MAX_HISTORY: usize = 20;

/// Sends a chat turn to the assistant
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `503 Service Unavailable`: The provider failed
pub async fn chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    req.validate().map_err(validation_error)?;

    // Profile context is best-effort; a missing profile just means no
    // personalization
    let context = Profile::find_by_user(&state.db, auth.user_id)
        .await?
        .map(|p| p.assistant_context())
        .unwrap_or_default();

    let history: Vec<ChatMessage> = req
        .history
        .into_iter()
        .rev()
        .take(MAX_HISTORY)
        .rev()
        .collect();

    let reply = state
        .assistant
        .chat(&context, &history, &req.message)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %auth.user_id, error = %e, "Assistant call failed");
            ApiError::ServiceUnavailable("The assistant is currently unavailable".to_string())
        })?;

    Ok(Json(ChatResponse { reply }))
}
