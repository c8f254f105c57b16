/// Administration endpoints
///
/// Everything under `/v1/admin` is restricted by the route guard to
/// admins and superadmins. Admins manage their own consulate's catalog
/// and notifications; consulate management itself is superadmin-only.
///
/// # Endpoints
///
/// - `POST /v1/admin/procedures` - Create a procedure
/// - `PUT /v1/admin/procedures/:id` - Update a procedure
/// - `DELETE /v1/admin/procedures/:id` - Delete or deactivate a procedure
/// - `POST /v1/admin/consulates` - Create a consulate (superadmin)
/// - `PUT /v1/admin/consulates/:id` - Update a consulate (superadmin)
/// - `POST /v1/admin/notifications` - Fan a notification out

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use consulat_shared::{
    auth::{
        authorization::{require_consulate, require_role},
        middleware::AuthContext,
    },
    models::{
        consulate::{Consulate, CreateConsulate, UpdateConsulate},
        notification::{CreateNotification, Notification},
        procedure::{CreateProcedure, Procedure, ProcedureRemoval, UpdateProcedure},
        user::{User, UserRole},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Body for creating a procedure
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProcedureBody {
    /// Owning consulate (defaults to the caller's)
    pub consulate_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    pub description: Option<String>,

    /// Names of documents the citizen must attach
    #[serde(default)]
    pub required_documents: Vec<String>,
}

/// Body for updating a procedure; absent fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProcedureBody {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    pub description: Option<Option<String>>,

    pub required_documents: Option<Vec<String>>,

    pub active: Option<bool>,
}

/// Response for the procedure delete endpoint
#[derive(Debug, Serialize)]
pub struct ProcedureRemovalResponse {
    /// `deleted` when no requests referenced the procedure, `deactivated`
    /// otherwise
    pub outcome: ProcedureRemoval,
}

/// Body for creating a consulate
#[derive(Debug, Deserialize, Validate)]
pub struct CreateConsulateBody {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[serde(default)]
    pub country_codes: Vec<String>,

    pub address: Option<String>,
}

/// Body for updating a consulate; absent fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateConsulateBody {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    pub country_codes: Option<Vec<String>>,

    pub address: Option<Option<String>>,
}

/// Body for fanning out a notification
///
/// Recipients are either an explicit id list or every user of a consulate;
/// supplying neither targets the caller's own consulate.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationBody {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: String,

    /// Category string ("info", "reminder", "alert", ...)
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Explicit recipient list; takes precedence over consulate targeting
    pub recipient_ids: Option<Vec<Uuid>>,

    /// Consulate whose users should all receive the notification
    pub consulate_id: Option<Uuid>,
}

fn default_kind() -> String {
    "info".to_string()
}

/// Resolves the consulate an admin operation applies to
///
/// Admins act on their own consulate; superadmins may name any.
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

/// Creates a procedure in the caller's (or a named) consulate
pub async fn create_procedure(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateProcedureBody>,
) -> ApiResult<(StatusCode, Json<Procedure>)> {
    body.validate().map_err(validation_error)?;

    let consulate_id = resolve_consulate(&auth, body.consulate_id)?;

    Consulate::find_by_id(&state.db, consulate_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Consulate not found".to_string()))?;

    let procedure = Procedure::create(
        &state.db,
        CreateProcedure {
            consulate_id,
            title: body.title,
            description: body.description,
            required_documents: body.required_documents,
        },
    )
    .await?;

    tracing::info!(procedure_id = %procedure.id, "Procedure created");

    Ok((StatusCode::CREATED, Json(procedure)))
}

/// Updates a procedure of the caller's consulate
pub async fn update_procedure(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProcedureBody>,
) -> ApiResult<Json<Procedure>> {
    body.validate().map_err(validation_error)?;

    let existing = find_scoped_procedure(&state, &auth, id).await?;

    let procedure = Procedure::update(
        &state.db,
        existing.id,
        UpdateProcedure {
            title: body.title,
            description: body.description,
            required_documents: body.required_documents,
            active: body.active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Procedure not found".to_string()))?;

    Ok(Json(procedure))
}

/// Removes a procedure, or deactivates it when requests reference it
///
/// # Errors
///
/// - `404 Not Found`: Unknown procedure, or one outside the caller's
///   consulate
pub async fn delete_procedure(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProcedureRemovalResponse>> {
    let existing = find_scoped_procedure(&state, &auth, id).await?;

    let outcome = Procedure::delete_or_deactivate(&state.db, existing.id).await?;
    if outcome == ProcedureRemoval::NotFound {
        return Err(ApiError::NotFound("Procedure not found".to_string()));
    }

    tracing::info!(procedure_id = %id, outcome = ?outcome, "Procedure removed");

    Ok(Json(ProcedureRemovalResponse { outcome }))
}

/// Creates a consulate (superadmin only)
pub async fn create_consulate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateConsulateBody>,
) -> ApiResult<(StatusCode, Json<Consulate>)> {
    require_role(&auth, UserRole::Superadmin)?;
    body.validate().map_err(validation_error)?;

    let consulate = Consulate::create(
        &state.db,
        CreateConsulate {
            name: body.name,
            country_codes: body.country_codes,
            address: body.address,
        },
    )
    .await?;

    tracing::info!(consulate_id = %consulate.id, "Consulate created");

    Ok((StatusCode::CREATED, Json(consulate)))
}

/// Updates a consulate (superadmin only)
pub async fn update_consulate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateConsulateBody>,
) -> ApiResult<Json<Consulate>> {
    require_role(&auth, UserRole::Superadmin)?;
    body.validate().map_err(validation_error)?;

    let consulate = Consulate::update(
        &state.db,
        id,
        UpdateConsulate {
            name: body.name,
            country_codes: body.country_codes,
            address: body.address,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Consulate not found".to_string()))?;

    Ok(Json(consulate))
}

/// Creates a notification and fans it out
///
/// The recipient set is resolved once, here: an explicit id list as-is, or
/// a consulate id expanded to every user of that consulate. Users created
/// later never see it.
///
/// # Errors
///
/// - `400 Bad Request`: Recipient resolution produced an empty set
pub async fn create_notification(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateNotificationBody>,
) -> ApiResult<(StatusCode, Json<Notification>)> {
    body.validate().map_err(validation_error)?;

    let (recipient_ids, consulate_id) = match body.recipient_ids {
        Some(ids) => (ids, None),
        None => {
            let consulate_id = resolve_consulate(&auth, body.consulate_id)?;
            let users = User::list_by_consulate(&state.db, consulate_id).await?;
            let ids = users.into_iter().map(|u| u.id).collect();
            (ids, Some(consulate_id))
        }
    };

    if recipient_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "Notification has no recipients".to_string(),
        ));
    }

    let notification = Notification::create(
        &state.db,
        CreateNotification {
            title: body.title,
            content: body.content,
            kind: body.kind,
            consulate_id,
            recipient_ids,
        },
    )
    .await?;

    tracing::info!(
        notification_id = %notification.id,
        recipients = notification.recipient_ids.len(),
        "Notification created"
    );

    Ok((StatusCode::CREATED, Json(notification)))
}

/// Consulate-scoped procedure lookup
async fn find_scoped_procedure(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
) -> ApiResult<Procedure> {
    let procedure = Procedure::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Procedure not found".to_string()))?;

    require_consulate(auth, procedure.consulate_id)
        .map_err(|_| ApiError::NotFound("Procedure not found".to_string()))?;

    Ok(procedure)
}
