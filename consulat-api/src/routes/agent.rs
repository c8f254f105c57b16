/// Staff request-handling endpoints
///
/// Everything under `/v1/agent` is restricted by the route guard to
/// agents, admins, and superadmins. Lookups are scoped to a consulate:
/// staff see their own consulate's requests (drafts excluded), and
/// superadmins may name any consulate explicitly.
///
/// # Endpoints
///
/// - `GET /v1/agent/requests` - List the consulate's requests
/// - `GET /v1/agent/requests/:id` - Request detail
/// - `PATCH /v1/agent/requests/:id/status` - Move a request to a new status
/// - `GET /v1/agent/requests/:id/notes` - Internal notes
/// - `POST /v1/agent/requests/:id/notes` - Add an internal note

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use consulat_shared::{
    auth::{authorization::require_consulate, middleware::AuthContext},
    models::{
        note::Note,
        request::{Request, RequestStatus},
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Query parameters for the consulate request list
#[derive(Debug, Deserialize)]
pub struct RequestListQuery {
    /// Filter to a single status
    pub status: Option<RequestStatus>,

    /// Consulate override (superadmins only; others default to their own)
    pub consulate_id: Option<Uuid>,

    #[serde(default = "default_limit")]
    pub limit: i64,

    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Body for the status change endpoint
#[derive(Debug, Deserialize)]
pub struct SetStatusBody {
    /// Target status (no transition table is enforced)
    pub status: RequestStatus,
}

/// Body for posting an internal note
#[derive(Debug, Deserialize, Validate)]
pub struct PostNoteBody {
    /// Note text
    #[validate(length(min = 1, max = 4000, message = "Note must be 1-4000 characters"))]
    pub body: String,
}

/// Resolves which consulate the caller operates on
///
/// Staff act on their own consulate; superadmins may name any. Naming a
/// foreign consulate as a non-superadmin is a 403.
fn resolve_consulate(auth: &AuthContext, requested: Option<Uuid>) -> ApiResult<Uuid> {
    match requested {
        Some(id) => {
            require_consulate(auth, id)?;
            Ok(id)
        }
        None => auth
            .consulate_id
            .ok_or_else(|| ApiError::BadRequest("consulate_id is required".to_string())),
    }
}

/// Lists a consulate's requests (drafts excluded), oldest first
pub async fn list_consulate_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<Json<Vec<Request>>> {
    // Drafts stay private to the citizen until submission
    if query.status == Some(RequestStatus::Draft) {
        return Err(ApiError::BadRequest(
            "Draft requests are not visible to staff".to_string(),
        ));
    }

    let consulate_id = resolve_consulate(&auth, query.consulate_id)?;
    let limit = query.limit.clamp(1, 200);
    let offset = query.offset.max(0);

    let requests =
        Request::list_by_consulate(&state.db, consulate_id, query.status, limit, offset).await?;

    Ok(Json(requests))
}

/// Returns one request of the caller's consulate
pub async fn get_consulate_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Request>> {
    let request = find_for_staff(&state, &auth, id).await?;
    Ok(Json(request))
}

/// Moves a request to a new status
///
/// Transitions to `submitted`/`completed` stamp their timestamps; already
/// set stamps are kept.
pub async fn set_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetStatusBody>,
) -> ApiResult<Json<Request>> {
    // Staff never move a request back into the citizen's private draft state
    if body.status == RequestStatus::Draft {
        return Err(ApiError::BadRequest(
            "Requests cannot be moved back to draft".to_string(),
        ));
    }

    let consulate_id = resolve_consulate(&auth, None)?;

    let request = Request::set_status_for_consulate(&state.db, id, consulate_id, body.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

    tracing::info!(
        request_id = %request.id,
        status = request.status.as_str(),
        "Request status changed"
    );

    Ok(Json(request))
}

/// Lists a request's internal notes
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Note>>> {
    let request = find_for_staff(&state, &auth, id).await?;
    let notes = Note::list_by_request(&state.db, request.id).await?;

    Ok(Json(notes))
}

/// Adds an internal note to a request
pub async fn post_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<PostNoteBody>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    body.validate().map_err(validation_error)?;

    let request = find_for_staff(&state, &auth, id).await?;
    let note = Note::create(&state.db, request.id, auth.user_id, body.body).await?;

    Ok((StatusCode::CREATED, Json(note)))
}

/// Staff-scoped request lookup (consulate match, drafts excluded)
async fn find_for_staff(state: &AppState, auth: &AuthContext, id: Uuid) -> ApiResult<Request> {
    let consulate_id = resolve_consulate(auth, None)?;

    Request::find_by_id_and_consulate(&state.db, id, consulate_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))
}
