/// Citizen request endpoints
///
/// The request lifecycle from the citizen's side: open a draft against an
/// active procedure, fill in form data, submit, and follow the message
/// thread with the consulate.
///
/// Every lookup is scoped to the caller: a request owned by someone else
/// is indistinguishable from one that does not exist.
///
/// # Endpoints
///
/// - `POST /v1/requests` - Open a draft request
/// - `GET /v1/requests` - List own requests
/// - `GET /v1/requests/:id` - Request detail
/// - `PATCH /v1/requests/:id` - Update form data and/or status
/// - `DELETE /v1/requests/:id` - Delete own request
/// - `GET /v1/requests/:id/messages` - Message thread
/// - `POST /v1/requests/:id/messages` - Post a message

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
    auth::middleware::AuthContext,
    models::{
        message::Message,
        procedure::Procedure,
        request::{CreateRequest, Request, RequestStatus},
    },
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct Pagination {
    /// Page size (default 50, max 200)
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Offset into the result set
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Pagination {
    /// Clamps the page size to sane bounds
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 200)
    }

    /// Clamps the offset to be non-negative
    ///
    /// Postgres rejects a negative OFFSET, so a hostile query string must
    /// not reach the database unclamped.
    pub fn offset(&self) -> i64 {
        self.offset.max(0)
    }
}

/// Body for opening a request
#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    /// Procedure to open the request against
    pub procedure_id: Uuid,

    /// Initial form data (defaults to an empty object)
    pub form_data: Option<JsonValue>,
}

/// Body for updating a request
///
/// Both fields are optional but at least one must be present. The status
/// field accepts any target status; no transition table is enforced.
#[derive(Debug, Deserialize)]
pub struct UpdateRequestBody {
    /// Replacement form data
    pub form_data: Option<JsonValue>,

    /// Target status
    pub status: Option<RequestStatus>,
}

/// Body for posting a thread message
#[derive(Debug, Deserialize, Validate)]
pub struct PostMessageBody {
    /// Message text
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub body: String,
}

/// Opens a draft request against an active procedure
///
/// The procedure must be active and belong to the caller's consulate.
///
/// # Errors
///
/// - `404 Not Found`: Unknown, inactive, or foreign procedure
pub async fn create_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateRequestBody>,
) -> ApiResult<(StatusCode, Json<Request>)> {
    let procedure = Procedure::find_by_id(&state.db, req.procedure_id)
        .await?
        .filter(|p| p.active && Some(p.consulate_id) == auth.consulate_id)
        .ok_or_else(|| ApiError::NotFound("Procedure not found".to_string()))?;

    let request = Request::create(
        &state.db,
        CreateRequest {
            procedure_id: procedure.id,
            user_id: auth.user_id,
            consulate_id: procedure.consulate_id,
            form_data: req.form_data.unwrap_or_else(|| serde_json::json!({})),
        },
    )
    .await?;

    tracing::info!(request_id = %request.id, procedure_id = %procedure.id, "Request opened");

    Ok((StatusCode::CREATED, Json(request)))
}

/// Lists the caller's requests, newest first
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<Request>>> {
    let requests =
        Request::list_by_user(&state.db, auth.user_id, page.limit(), page.offset()).await?;

    Ok(Json(requests))
}

/// Returns one of the caller's requests
pub async fn get_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Request>> {
    let request = Request::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

    Ok(Json(request))
}

/// Updates form data and/or status of the caller's request
///
/// Moving to `submitted` stamps `submitted_at`; moving to `completed`
/// stamps `completed_at`. A non-owned id updates nothing and yields 404.
///
/// # Errors
///
/// - `400 Bad Request`: Neither form data nor status supplied
/// - `404 Not Found`: Unknown or non-owned request
pub async fn update_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequestBody>,
) -> ApiResult<Json<Request>> {
    if req.form_data.is_none() && req.status.is_none() {
        return Err(ApiError::BadRequest(
            "Provide form_data and/or status".to_string(),
        ));
    }

    let request = Request::update_owned(&state.db, id, auth.user_id, req.form_data, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

    Ok(Json(request))
}

/// Deletes one of the caller's requests
pub async fn delete_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Request::delete_owned(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Request not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Lists the message thread of a request
///
/// Visible to the owning citizen and to staff of the handling consulate.
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Message>>> {
    let request = resolve_thread_request(&state, &auth, id).await?;
    let messages = Message::list_by_request(&state.db, request.id).await?;

    Ok(Json(messages))
}

/// Posts a message to a request thread
pub async fn post_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<PostMessageBody>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    req.validate().map_err(validation_error)?;

    let request = resolve_thread_request(&state, &auth, id).await?;
    let message = Message::create(&state.db, request.id, auth.user_id, req.body).await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Resolves a request for thread access: owner first, then consulate staff
async fn resolve_thread_request(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
) -> ApiResult<Request> {
    if let Some(request) = Request::find_by_id_and_user(&state.db, id, auth.user_id).await? {
        return Ok(request);
    }

    if auth.is_staff() {
        if let Some(consulate_id) = auth.consulate_id {
            if let Some(request) =
                Request::find_by_id_and_consulate(&state.db, id, consulate_id).await?
            {
                return Ok(request);
            }
        }
    }

    Err(ApiError::NotFound("Request not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps_limit() {
        let page = Pagination {
            limit: 0,
            offset: 0,
        };
        assert_eq!(page.limit(), 1);

        let page = Pagination {
            limit: 10_000,
            offset: 0,
        };
        assert_eq!(page.limit(), 200);

        let page = Pagination {
            limit: 25,
            offset: 0,
        };
        assert_eq!(page.limit(), 25);
    }

    #[test]
    fn test_pagination_clamps_negative_offset() {
        let page = Pagination {
            limit: 50,
            offset: -1,
        };
        assert_eq!(page.offset(), 0);

        let page = Pagination {
            limit: 50,
            offset: 120,
        };
        assert_eq!(page.offset(), 120);
    }
}
